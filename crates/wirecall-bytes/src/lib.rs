//! Immutable byte sequences for wire values.
//!
//! Every value that crosses the wirecall wire is ultimately a [`ByteSeq`]:
//! either an owned buffer or a zero-copy window into a larger caller-owned
//! buffer. Equality and hashing are content-based, so the two variants are
//! interchangeable as map keys and in comparisons.

pub mod seq;

pub use seq::ByteSeq;
