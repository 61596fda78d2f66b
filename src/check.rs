//! Catalog statistics and translator-facing checks.

use std::collections::BTreeSet;
use std::fmt;

use crate::locale::LocaleId;
use crate::resolver::PluralRule;
use crate::types::{
    Message,
    MessageKey,
    MessageStatus,
    Translation,
    TsDocument,
};

/// Message counts by completion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogStats {
    pub finished: usize,
    /// Unfinished messages that already have text.
    pub unfinished: usize,
    /// Unfinished messages without any text.
    pub untranslated: usize,
    pub obsolete: usize,
    pub vanished: usize,
}

impl CatalogStats {
    /// Messages that take part in runtime resolution.
    #[must_use]
    pub const fn active(&self) -> usize {
        self.finished + self.unfinished + self.untranslated
    }

    /// Share of active messages that are finished, rounded down.
    #[must_use]
    pub const fn percent_finished(&self) -> usize {
        match self.active() {
            0 => 100,
            active => self.finished * 100 / active,
        }
    }
}

impl fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} translation(s) ({} finished and {} unfinished), {} untranslated, {} obsolete, {} vanished",
            self.finished + self.unfinished,
            self.finished,
            self.unfinished,
            self.untranslated,
            self.obsolete,
            self.vanished
        )
    }
}

/// Counts the messages of `document` by state.
#[must_use]
pub fn stats(document: &TsDocument) -> CatalogStats {
    let mut stats = CatalogStats::default();
    for (_, message) in document.messages() {
        match message.status {
            MessageStatus::Finished => stats.finished += 1,
            MessageStatus::Unfinished if message.translation.is_empty() => stats.untranslated += 1,
            MessageStatus::Unfinished => stats.unfinished += 1,
            MessageStatus::Obsolete => stats.obsolete += 1,
            MessageStatus::Vanished => stats.vanished += 1,
        }
    }
    stats
}

/// How serious a [`Diagnostic`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
}

/// What a [`Diagnostic`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// `%1`-style placeholders differ between source and translation.
    PlaceholderMismatch,
    /// Only one of source and translation ends with a line break.
    TrailingNewline,
    /// Unfinished message that already has text and awaits review.
    NeedsReview,
    /// Plural message with the wrong number of forms for the catalog language.
    PluralFormCount,
}

/// A finding about one active message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub key: MessageKey,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
        };
        write!(f, "{level}: {}: {}", self.key, self.message)
    }
}

/// Checks every active, translated message of `document`.
///
/// Obsolete and vanished messages are not checked.
#[must_use]
pub fn check_document(document: &TsDocument) -> Vec<Diagnostic> {
    let plural_rule = document
        .language
        .as_deref()
        .and_then(LocaleId::parse)
        .map(|locale| PluralRule::for_locale(&locale));

    let mut diagnostics = Vec::new();
    for (context, message) in document.messages() {
        if !message.status.is_active() || message.translation.is_empty() {
            continue;
        }
        check_message(context, message, plural_rule, &mut diagnostics);
    }

    tracing::debug!(count = diagnostics.len(), "Checked catalog");
    diagnostics
}

/// Appends the findings for one message.
fn check_message(
    context: &str,
    message: &Message,
    plural_rule: Option<PluralRule>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut push = |severity, kind, text: String| {
        diagnostics.push(Diagnostic { severity, kind, key: message.key(context), message: text });
    };

    // Plural forms may spell out the count ("ein Objekt").
    let numerus = message.is_numerus();
    let significant = |text: &str| {
        let mut set = placeholders(text);
        if numerus {
            set.remove("%n");
        }
        set
    };

    let expected = significant(&message.source);
    let texts: Vec<&str> = match &message.translation {
        Translation::Single(text) => vec![text.as_str()],
        Translation::Numerus(forms) => {
            forms.iter().map(String::as_str).filter(|f| !f.is_empty()).collect()
        }
    };

    for text in &texts {
        let found = significant(text);
        if found != expected {
            push(
                Severity::Warning,
                DiagnosticKind::PlaceholderMismatch,
                format!(
                    "placeholders differ: source has {}, translation has {}",
                    format_set(&expected),
                    format_set(&found)
                ),
            );
        }
        if message.source.ends_with('\n') != text.ends_with('\n') {
            push(
                Severity::Info,
                DiagnosticKind::TrailingNewline,
                "trailing line break differs from source".to_string(),
            );
        }
    }

    if message.status == MessageStatus::Unfinished {
        push(
            Severity::Info,
            DiagnosticKind::NeedsReview,
            "translation is marked unfinished".to_string(),
        );
    }

    if let (Translation::Numerus(forms), Some(rule)) = (&message.translation, plural_rule)
        && forms.len() != rule.form_count()
    {
        push(
            Severity::Warning,
            DiagnosticKind::PluralFormCount,
            format!("expected {} plural forms, found {}", rule.form_count(), forms.len()),
        );
    }
}

/// Placeholders (`%1`…`%99`, `%L1`, `%n`) used in `text`.
///
/// `%L1` is reported as `%1`.
#[must_use]
pub fn placeholders(text: &str) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    let bytes = text.as_bytes();
    let mut pos = 0;

    while let Some(offset) = bytes.get(pos..).and_then(|rest| rest.iter().position(|&b| b == b'%')) {
        let mut cursor = pos + offset + 1;
        if bytes.get(cursor) == Some(&b'n') {
            found.insert("%n".to_string());
            pos = cursor + 1;
            continue;
        }
        if bytes.get(cursor) == Some(&b'L') {
            cursor += 1;
        }
        let digits: Vec<u8> = bytes
            .get(cursor..)
            .unwrap_or_default()
            .iter()
            .take(2)
            .take_while(|b| b.is_ascii_digit())
            .map(|b| b - b'0')
            .collect();
        let number = digits.iter().fold(0u8, |acc, d| acc * 10 + d);
        if number > 0 {
            found.insert(format!("%{number}"));
        }
        pos = cursor + digits.len();
    }

    found
}

/// Comma-separated placeholder list, or `none`.
fn format_set(set: &BTreeSet<String>) -> String {
    if set.is_empty() {
        return "none".to_string();
    }
    set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
