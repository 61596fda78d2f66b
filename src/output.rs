//! Writing `.ts` catalog documents.
/// `.ts` serializer
pub mod writer;

pub use writer::{
    save_document,
    write_document,
};
