//! ts-catalog
//!
//! Qt Linguist `.ts` 翻訳カタログの読み込み・検索・書き出しを行うライブラリ

pub mod check;
pub mod config;
pub mod indexer;
pub mod input;
pub mod locale;
pub mod output;
pub mod resolver;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use input::CatalogParseError;
pub use locale::LocaleId;
pub use resolver::{
    Resolver,
    Translator,
};
pub use store::CatalogStore;
pub use types::{
    Message,
    MessageKey,
    MessageStatus,
    TsDocument,
};
