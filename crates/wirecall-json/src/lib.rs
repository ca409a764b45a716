//! Streaming JSON for wirecall.
//!
//! [`JsonWriter`] emits a document front to back with correct comma placement
//! tracked by a single depth/last-value pair instead of a per-level stack.
//! [`JsonReader`] is a pull tokenizer: each `parse()` advances a forward-only
//! cursor and overwrites the current token. Neither holds shared state; one
//! instance belongs to exactly one logical serialize or parse operation.

pub mod error;
pub mod tokenizer;
pub mod writer;

pub use error::{JsonError, Result};
pub use tokenizer::{JsonReader, StringMode, TokenKind};
pub use writer::JsonWriter;
