//! Reading `.ts` catalog documents.
/// Load error types
pub mod error;
/// `.ts` pull parser
pub mod reader;

pub use error::{
    Block,
    CatalogParseError,
};
pub use reader::{
    load_document,
    parse_document,
};
