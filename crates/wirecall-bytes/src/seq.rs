use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::Utf8Error;

use bytes::BufMut;

/// An immutable sequence of bytes.
///
/// Two backing strategies share one API: `Owned` exclusively owns its storage,
/// `Borrowed` is a non-owning window into a buffer owned elsewhere. A borrowed
/// sequence never outlives the buffer it views; the borrow checker enforces
/// this through the `'a` lifetime.
///
/// Equality and hashing compare contents element-wise, so an owned and a
/// borrowed sequence with the same bytes are equal and hash identically.
#[derive(Clone)]
pub struct ByteSeq<'a> {
    repr: Repr<'a>,
}

#[derive(Clone)]
enum Repr<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a [u8]),
}

impl ByteSeq<'static> {
    /// Create an owned sequence from a byte vector.
    pub fn owned(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            repr: Repr::Owned(bytes.into()),
        }
    }

    /// Create an owned sequence from text via UTF-8 encoding.
    pub fn from_text(text: &str) -> Self {
        Self::owned(text.as_bytes().to_vec())
    }
}

impl<'a> ByteSeq<'a> {
    /// Create a borrowed, zero-copy sequence over an existing buffer.
    pub fn borrowed(bytes: &'a [u8]) -> Self {
        Self {
            repr: Repr::Borrowed(bytes),
        }
    }

    /// Number of bytes in the sequence.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// The byte at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn byte(&self, index: usize) -> u8 {
        self.as_slice()[index]
    }

    /// The byte at `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<u8> {
        self.as_slice().get(index).copied()
    }

    /// Whether `byte` occurs anywhere in the sequence (linear scan).
    pub fn contains(&self, byte: u8) -> bool {
        self.as_slice().contains(&byte)
    }

    /// Index of the first occurrence of `byte`.
    pub fn index_of(&self, byte: u8) -> Option<usize> {
        self.as_slice().iter().position(|&b| b == byte)
    }

    /// Index of the last occurrence of `byte`.
    pub fn last_index_of(&self, byte: u8) -> Option<usize> {
        self.as_slice().iter().rposition(|&b| b == byte)
    }

    /// Sub-range `[start, end)` of this sequence.
    ///
    /// For a borrowed sequence this is another view over the same storage
    /// (no copy). For an owned sequence the range is copied into a new owned
    /// sequence, since the result cannot share the exclusive backing.
    ///
    /// # Panics
    ///
    /// Panics unless `start <= end <= len()`.
    pub fn slice(&self, start: usize, end: usize) -> ByteSeq<'a> {
        assert!(
            start <= end && end <= self.len(),
            "slice range {start}..{end} out of bounds for length {}",
            self.len()
        );
        match &self.repr {
            Repr::Borrowed(bytes) => ByteSeq::borrowed(&bytes[start..end]),
            Repr::Owned(bytes) => ByteSeq::owned(bytes[start..end].to_vec()),
        }
    }

    /// View the contents as a plain byte slice.
    pub fn as_slice(&self) -> &[u8] {
        match &self.repr {
            Repr::Owned(bytes) => bytes,
            Repr::Borrowed(bytes) => bytes,
        }
    }

    /// Decode the contents as UTF-8 text (copies).
    pub fn to_text(&self) -> Result<String, Utf8Error> {
        std::str::from_utf8(self.as_slice()).map(str::to_owned)
    }

    /// Append the raw bytes to an output buffer.
    pub fn write_to(&self, dst: &mut impl BufMut) {
        dst.put_slice(self.as_slice());
    }

    /// Convert into an owned sequence, copying if currently borrowed.
    pub fn into_owned(self) -> ByteSeq<'static> {
        match self.repr {
            Repr::Owned(bytes) => ByteSeq::owned(bytes),
            Repr::Borrowed(bytes) => ByteSeq::owned(bytes.to_vec()),
        }
    }

    /// Whether this sequence owns its backing storage.
    pub fn is_owned(&self) -> bool {
        matches!(self.repr, Repr::Owned(_))
    }
}

impl PartialEq for ByteSeq<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for ByteSeq<'_> {}

impl Hash for ByteSeq<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Content hash only: both variants must hash identically, so the
        // accumulation runs over the bytes and nothing else.
        for &byte in self.as_slice() {
            state.write_u8(byte);
        }
    }
}

impl AsRef<[u8]> for ByteSeq<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl<'a> From<&'a [u8]> for ByteSeq<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        ByteSeq::borrowed(bytes)
    }
}

impl From<Vec<u8>> for ByteSeq<'static> {
    fn from(bytes: Vec<u8>) -> Self {
        ByteSeq::owned(bytes)
    }
}

impl fmt::Debug for ByteSeq<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_owned() { "owned" } else { "borrowed" };
        write!(f, "ByteSeq<{kind}, {} bytes>", self.len())
    }
}
