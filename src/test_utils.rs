//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のカタログデータを提供します。
#![cfg(test)]

use crate::types::{
    ContextBlock,
    Location,
    Message,
    MessageStatus,
    Translation,
    TsDocument,
};

/// テスト用のドイツ語カタログを作成する
///
/// 実際の `vym.de_DE.ts` から抜粋したメッセージに、複数形メッセージを追加したもの。
/// obsolete / vanished / unfinished / 空の翻訳をすべて含む。
pub(crate) fn sample_document() -> TsDocument {
    let mut credits = Message::new("Credits", "Danke").with_comment("Help->About vym dialog");
    credits.locations.push(Location::new("../aboutdialog.cpp", 106));

    let mut open_readonly = Message::new("Open readonly", "Nur zum Lesen öffnen")
        .with_status(MessageStatus::Unfinished);
    open_readonly.locations.push(Location::new("../lockedfiledialog.ui", 123));
    open_readonly.locations.push(Location::new("../lockedfiledialog.cpp", 6));

    let selected = Message {
        source: "%n object(s) selected".to_string(),
        translation: Translation::Numerus(vec![
            "%n Objekt ausgewählt".to_string(),
            "%n Objekte ausgewählt".to_string(),
        ]),
        ..Message::default()
    };

    TsDocument::new("de_DE")
        .with_context(
            ContextBlock::new("AboutDialog")
                .with_message(Message::new("Ok", "Ok").with_status(MessageStatus::Obsolete))
                .with_message(credits)
                .with_message(Message::new("Ok", "Ok").with_comment("Ok Button")),
        )
        .with_context(
            ContextBlock::new("AboutTextBrowser")
                .with_message(
                    Message::new("Warning", "Warnung").with_status(MessageStatus::Obsolete),
                )
                .with_message(Message::new("Warning", "Warnung").with_comment("About window"))
                .with_message(
                    Message::new(
                        "Couldn't find a viewer to open %1.\n",
                        "Konnte kein Programm zum Öffnen von %1 finden.",
                    )
                    .with_comment("About window"),
                ),
        )
        .with_context(
            ContextBlock::new("HistoryWindow")
                .with_message(Message::new("Time", ""))
                .with_message(Message::new("Comment", "")),
        )
        .with_context(
            ContextBlock::new("LockedFileDialog")
                .with_message(open_readonly)
                .with_message(
                    Message::new("Delete lockfile", "").with_status(MessageStatus::Unfinished),
                ),
        )
        .with_context(
            ContextBlock::new("MainWindow")
                .with_message(
                    Message::new("Export as %1", "Exportieren als %1")
                        .with_status(MessageStatus::Vanished),
                )
                .with_message(selected),
        )
}
