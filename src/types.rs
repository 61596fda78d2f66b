//! Core catalog types used throughout the project.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{
    Hash,
    Hasher,
};

/// Explicit composite lookup key: `(context, source text, disambiguation comment)`.
///
/// An empty disambiguation comment is the same key as no comment at all.
///
/// Equality, hashing and ordering go through [`MessageKey::comment`], so a key
/// built with `comment: Some(String::new())` still matches its bare form.
#[derive(Debug, Clone)]
pub struct MessageKey {
    pub context: String,
    pub source: String,
    pub comment: Option<String>,
}

impl MessageKey {
    #[must_use]
    pub fn new(context: impl Into<String>, source: impl Into<String>) -> Self {
        Self { context: context.into(), source: source.into(), comment: None }
    }

    /// Adds a disambiguation comment; an empty comment leaves the key unchanged.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = normalize_comment(Some(comment.into()));
        self
    }

    /// Disambiguation comment as it is used for lookups.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref().filter(|c| !c.is_empty())
    }
}

impl MessageKey {
    /// Fields compared by every key trait.
    fn parts(&self) -> (&str, &str, Option<&str>) {
        (&self.context, &self.source, self.comment())
    }
}

impl PartialEq for MessageKey {
    fn eq(&self, other: &Self) -> bool {
        self.parts() == other.parts()
    }
}

impl Eq for MessageKey {}

impl Hash for MessageKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts().hash(state);
    }
}

impl PartialOrd for MessageKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MessageKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts().cmp(&other.parts())
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.comment() {
            Some(comment) => write!(f, "{}::{:?} ({comment})", self.context, self.source),
            None => write!(f, "{}::{:?}", self.context, self.source),
        }
    }
}

/// Collapses `Some("")` into `None`.
pub(crate) fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment.filter(|c| !c.is_empty())
}

/// Completion state of a message, taken from the `type` attribute of `<translation>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageStatus {
    /// No `type` attribute: current and translated.
    #[default]
    Finished,
    Unfinished,
    /// No longer referenced by the application sources.
    Obsolete,
    Vanished,
}

impl MessageStatus {
    /// Parses the `type` attribute value. Unknown values yield `None`.
    #[must_use]
    pub fn from_type_attr(value: Option<&str>) -> Option<Self> {
        match value {
            None => Some(Self::Finished),
            Some("unfinished") => Some(Self::Unfinished),
            Some("obsolete") => Some(Self::Obsolete),
            Some("vanished") => Some(Self::Vanished),
            Some(_) => None,
        }
    }

    /// Value written back into the `type` attribute.
    #[must_use]
    pub const fn type_attr(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Obsolete => Some("obsolete"),
            Self::Vanished => Some("vanished"),
        }
    }

    /// Whether messages with this status take part in runtime resolution.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Finished | Self::Unfinished)
    }
}

/// Provenance hint for translation tooling. Never used at runtime.
///
/// Catalogs written with relative locations omit the file name when it
/// repeats and store line offsets (`line="+4"`) instead of line numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub filename: Option<String>,
    pub line: Option<LineRef>,
}

impl Location {
    #[must_use]
    pub fn new(filename: impl Into<String>, line: u32) -> Self {
        Self { filename: Some(filename.into()), line: Some(LineRef::Absolute(line)) }
    }
}

/// Value of the `line` attribute of `<location>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineRef {
    Absolute(u32),
    /// Offset from the previous location; always written with a sign.
    Relative(i32),
}

impl LineRef {
    /// Parses `"12"`, `"+3"` or `"-2"`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value.starts_with(['+', '-']) {
            value.parse().ok().map(Self::Relative)
        } else {
            value.parse().ok().map(Self::Absolute)
        }
    }
}

impl fmt::Display for LineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(line) => write!(f, "{line}"),
            Self::Relative(offset) => write!(f, "{offset:+}"),
        }
    }
}

/// Translated text of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Single(String),
    /// One entry per plural form of the target language (`numerus="yes"`).
    Numerus(Vec<String>),
}

impl Default for Translation {
    fn default() -> Self {
        Self::Single(String::new())
    }
}

impl Translation {
    /// Text used for non-plural lookups; the first form of a plural message.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Single(text) => text,
            Self::Numerus(forms) => forms.first().map_or("", String::as_str),
        }
    }

    /// Plural form at `index`, or `None` if the catalog does not define it.
    #[must_use]
    pub fn form(&self, index: usize) -> Option<&str> {
        match self {
            Self::Single(text) => (index == 0).then_some(text.as_str()),
            Self::Numerus(forms) => forms.get(index).map(String::as_str),
        }
    }

    /// True when no text has been entered at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(text) => text.is_empty(),
            Self::Numerus(forms) => forms.iter().all(String::is_empty),
        }
    }
}

/// One `<message>` record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    /// Optional `id` attribute (id-based catalogs).
    pub id: Option<String>,
    pub source: String,
    pub old_source: Option<String>,
    /// Disambiguation comment.
    pub comment: Option<String>,
    pub old_comment: Option<String>,
    /// Developer note for translators (`<extracomment>`).
    pub extra_comment: Option<String>,
    /// Translator's own note (`<translatorcomment>`).
    pub translator_comment: Option<String>,
    pub translation: Translation,
    pub status: MessageStatus,
    pub locations: Vec<Location>,
}

impl Message {
    #[must_use]
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translation: Translation::Single(translation.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = normalize_comment(Some(comment.into()));
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub const fn is_numerus(&self) -> bool {
        matches!(self.translation, Translation::Numerus(_))
    }

    /// Disambiguation comment as it is used for lookups.
    #[must_use]
    pub fn disambiguation(&self) -> Option<&str> {
        self.comment.as_deref().filter(|c| !c.is_empty())
    }

    /// Key of this message inside `context`.
    #[must_use]
    pub fn key(&self, context: &str) -> MessageKey {
        MessageKey {
            context: context.to_string(),
            source: self.source.clone(),
            comment: self.disambiguation().map(str::to_string),
        }
    }
}

/// A `<context>` block: every message extracted from one UI class.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextBlock {
    pub name: String,
    /// Context-level `<comment>`, rarely used.
    pub comment: Option<String>,
    pub messages: Vec<Message>,
}

impl ContextBlock {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}

/// A whole `.ts` document for one target locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsDocument {
    pub version: String,
    /// Target locale, e.g. `de_DE`. Absent in template catalogs.
    pub language: Option<String>,
    pub source_language: Option<String>,
    pub contexts: Vec<ContextBlock>,
}

impl Default for TsDocument {
    fn default() -> Self {
        Self {
            version: DEFAULT_TS_VERSION.to_string(),
            language: None,
            source_language: None,
            contexts: Vec::new(),
        }
    }
}

/// Format version written by current Qt Linguist tools.
pub const DEFAULT_TS_VERSION: &str = "2.1";

impl TsDocument {
    #[must_use]
    pub fn new(language: impl Into<String>) -> Self {
        Self { language: Some(language.into()), ..Self::default() }
    }

    #[must_use]
    pub fn with_context(mut self, context: ContextBlock) -> Self {
        self.contexts.push(context);
        self
    }

    /// Iterates `(context name, message)` pairs in document order.
    pub fn messages(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.contexts
            .iter()
            .flat_map(|ctx| ctx.messages.iter().map(move |msg| (ctx.name.as_str(), msg)))
    }
}
