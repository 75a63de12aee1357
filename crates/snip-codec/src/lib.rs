//! Salted, reversible id <-> token encoding.
//!
//! [`HashidsCodec`] implements the Hashids scheme: tokens are short, built
//! from a URL-safe alphabet, padded to a minimum length and shuffled by a
//! secret salt so consecutive ids do not look consecutive. It obscures
//! ordinality; it is not encryption.

pub mod error;
mod hashids;

pub use error::CodecError;
pub use hashids::{CodecSettings, HashidsCodec, DEFAULT_ALPHABET};
