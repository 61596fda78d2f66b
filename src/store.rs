//! In-memory catalog for one target locale.
//!
//! # Invariants
//!
//! 1. Within a context, `(source, disambiguation)` identifies at most one
//!    active message; a second active message with the same key fails the load.
//! 2. Obsolete and vanished messages stay in the document (so it can be
//!    saved back unchanged) but never enter the lookup index.
//! 3. The store is immutable once built and can be shared across threads.

use std::collections::HashMap;
use std::path::Path;

use crate::input::{
    Block,
    CatalogParseError,
    load_document,
    parse_document,
};
use crate::locale::LocaleId;
use crate::output::save_document;
use crate::types::{
    Message,
    MessageKey,
    TsDocument,
};

/// Position of an active message inside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    /// Index into `TsDocument::contexts`.
    context: usize,
    /// Index into `ContextBlock::messages`.
    message: usize,
}

/// Messages sharing one source text, distinguished by their comment.
type Variants = Vec<(Option<String>, Slot)>;

/// Loaded catalog plus its runtime lookup index.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    /// Full document, inactive messages included.
    document: TsDocument,
    locale: Option<LocaleId>,
    /// context → source text → variants.
    index: HashMap<String, HashMap<String, Variants>>,
    /// Number of indexed messages.
    active: usize,
}

impl CatalogStore {
    /// Builds the lookup index over `document`.
    ///
    /// # Errors
    /// Returns `CatalogParseError::DuplicateMessage` when two active messages
    /// share a key.
    pub fn from_document(document: TsDocument) -> Result<Self, CatalogParseError> {
        let mut index: HashMap<String, HashMap<String, Variants>> = HashMap::new();
        let mut active = 0;

        for (context_pos, context) in document.contexts.iter().enumerate() {
            let by_source = index.entry(context.name.clone()).or_default();

            for (message_pos, message) in context.messages.iter().enumerate() {
                if !message.status.is_active() {
                    continue;
                }

                let comment = message.disambiguation().map(str::to_string);
                let variants = by_source.entry(message.source.clone()).or_default();
                if variants.iter().any(|(existing, _)| *existing == comment) {
                    return Err(CatalogParseError::DuplicateMessage {
                        block: Block::Message {
                            context: Some(context.name.clone()),
                            index: message_pos,
                            source: Some(message.source.clone()),
                        },
                        source_text: message.source.clone(),
                    });
                }
                variants.push((comment, Slot { context: context_pos, message: message_pos }));
                active += 1;
            }
        }

        let locale = document.language.as_deref().and_then(LocaleId::parse);
        if document.language.is_some() && locale.is_none() {
            tracing::warn!(language = ?document.language, "Catalog declares an unrecognized language");
        }

        tracing::debug!(
            locale = ?locale.as_ref().map(ToString::to_string),
            active,
            contexts = index.len(),
            "Built catalog index"
        );

        Ok(Self { document, locale, index, active })
    }

    /// Parses `.ts` text and indexes it.
    ///
    /// # Errors
    /// See [`parse_document`] and [`Self::from_document`].
    pub fn parse(text: &str) -> Result<Self, CatalogParseError> {
        Self::from_document(parse_document(text)?)
    }

    /// Loads and indexes a `.ts` file.
    ///
    /// # Errors
    /// See [`load_document`] and [`Self::from_document`].
    pub fn load(path: &Path) -> Result<Self, CatalogParseError> {
        let store = Self::from_document(load_document(path)?)?;
        tracing::info!(
            path = %path.display(),
            locale = ?store.locale.as_ref().map(ToString::to_string),
            messages = store.active,
            "Loaded catalog"
        );
        Ok(store)
    }

    /// Writes the full document back out, obsolete entries included.
    ///
    /// # Errors
    /// Returns the underlying I/O error.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        save_document(path, &self.document)
    }

    /// Active message for `(context, source, comment)`.
    ///
    /// An empty `comment` is the same as `None`.
    #[must_use]
    pub fn get(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&Message> {
        let comment = comment.filter(|c| !c.is_empty());
        let variants = self.index.get(context)?.get(source)?;
        let (_, slot) = variants.iter().find(|(candidate, _)| candidate.as_deref() == comment)?;
        self.document.contexts.get(slot.context)?.messages.get(slot.message)
    }

    /// Active message for `key`.
    #[must_use]
    pub fn get_key(&self, key: &MessageKey) -> Option<&Message> {
        self.get(&key.context, &key.source, key.comment())
    }

    #[must_use]
    pub const fn document(&self) -> &TsDocument {
        &self.document
    }

    /// Target locale declared by the document.
    #[must_use]
    pub const fn locale(&self) -> Option<&LocaleId> {
        self.locale.as_ref()
    }

    /// Number of indexed (active) messages.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.active
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Names of the contexts in document order.
    pub fn contexts(&self) -> impl Iterator<Item = &str> {
        self.document.contexts.iter().map(|context| context.name.as_str())
    }

    /// Keys of every active message, in document order.
    pub fn active_keys(&self) -> impl Iterator<Item = MessageKey> + '_ {
        self.document
            .messages()
            .filter(|(_, message)| message.status.is_active())
            .map(|(context, message)| message.key(context))
    }
}
