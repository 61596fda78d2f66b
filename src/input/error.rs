//! Catalog load errors.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The part of the document a structural error was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// The `<TS>` root or anything outside a context.
    Document,
    Context {
        /// 0-based position among the `<context>` elements.
        index: usize,
        /// `None` when the error precedes `<name>`.
        name: Option<String>,
    },
    Message {
        context: Option<String>,
        /// 0-based position inside its context.
        index: usize,
        /// Source text, when it has been read already.
        source: Option<String>,
    },
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Context { index, name: Some(name) } => write!(f, "context #{index} '{name}'"),
            Self::Context { index, name: None } => write!(f, "context #{index}"),
            Self::Message { context, index, source } => {
                write!(f, "message #{index}")?;
                if let Some(source) = source {
                    write!(f, " {source:?}")?;
                }
                if let Some(context) = context {
                    write!(f, " in context '{context}'")?;
                }
                Ok(())
            }
        }
    }
}

/// Failure to turn a `.ts` document into a catalog.
///
/// Callers recover by keeping whatever catalog was active before.
#[derive(Error, Debug)]
pub enum CatalogParseError {
    #[error("Failed to read catalog '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed XML in {block} at byte {position}: {source}")]
    Xml {
        block: Block,
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Invalid catalog structure in {block} at byte {position}: {message}")]
    Structure { block: Block, position: u64, message: String },

    #[error("Duplicate message {source_text:?} in {block}")]
    DuplicateMessage { block: Block, source_text: String },
}

impl CatalogParseError {
    /// The block the error points at, if it is tied to one.
    #[must_use]
    pub const fn block(&self) -> Option<&Block> {
        match self {
            Self::Io { .. } => None,
            Self::Xml { block, .. }
            | Self::Structure { block, .. }
            | Self::DuplicateMessage { block, .. } => Some(block),
        }
    }
}
