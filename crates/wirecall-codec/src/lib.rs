//! Binary read/write primitives for wirecall wire values.
//!
//! Integers use little-endian base-128 varints: 7 payload bits per byte with
//! the continuation bit set on every byte but the last. Signed values are
//! written as their unsigned bit pattern. On top of that sit length-prefixed
//! text, raw byte sequences, a packed (count, tag) header for collection
//! fields, and field-indexed object framing for generated codecs.
//!
//! [`WireWriter`] appends to a growable buffer; [`WireReader`] is a forward
//! cursor over a byte slice and hands out zero-copy [`ByteSeq`] windows where
//! it can.
//!
//! [`ByteSeq`]: wirecall_bytes::ByteSeq

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{CodecError, Result};
pub use reader::WireReader;
pub use writer::WireWriter;

/// Low bits of a packed count+tag varlong reserved for the tag.
pub const TAG_BITS: u32 = 3;

/// Largest tag value that fits in the packed encoding.
pub const MAX_TAG: u8 = (1 << TAG_BITS) - 1;
