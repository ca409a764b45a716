use bytes::{BufMut, Bytes, BytesMut};
use wirecall_bytes::ByteSeq;

use crate::{MAX_TAG, TAG_BITS};

const CONTINUATION: u8 = 0x80;
const PAYLOAD_MASK: u64 = 0x7f;

/// Appends wire-encoded values to a growable buffer.
///
/// All writes are infallible; invalid arguments (a tag wider than
/// [`TAG_BITS`], a count that collides with it) are programmer errors and
/// panic.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Write an unsigned varint.
    pub fn put_varint(&mut self, mut value: u64) {
        loop {
            let byte = (value & PAYLOAD_MASK) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.put_u8(byte);
                return;
            }
            self.buf.put_u8(byte | CONTINUATION);
        }
    }

    /// Write an unsigned 32-bit varint.
    pub fn put_varint32(&mut self, value: u32) {
        self.put_varint(u64::from(value));
    }

    /// Write a signed value as its unsigned bit pattern.
    pub fn put_varint_i64(&mut self, value: i64) {
        self.put_varint(value as u64);
    }

    /// Write a packed (count, tag) header: count in the high bits, tag in
    /// the low [`TAG_BITS`] bits of one varlong.
    ///
    /// # Panics
    ///
    /// Panics if `tag` exceeds [`MAX_TAG`] or `count` does not fit in the
    /// remaining bits.
    pub fn put_count_tag(&mut self, count: u64, tag: u8) {
        assert!(tag <= MAX_TAG, "tag {tag} exceeds {TAG_BITS} bits");
        assert!(
            count <= u64::MAX >> TAG_BITS,
            "count {count} does not fit beside a {TAG_BITS}-bit tag"
        );
        self.put_varint((count << TAG_BITS) | u64::from(tag));
    }

    /// Write length-prefixed UTF-8 text.
    pub fn put_text(&mut self, text: &str) {
        self.put_varint(text.len() as u64);
        self.buf.put_slice(text.as_bytes());
    }

    /// Write a length-prefixed byte sequence.
    pub fn put_byte_seq(&mut self, seq: &ByteSeq<'_>) {
        self.put_varint(seq.len() as u64);
        seq.write_to(&mut self.buf);
    }

    /// Write raw bytes with no length prefix.
    pub fn put_raw(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Write a boolean as a single byte (0 or 1).
    pub fn put_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    /// Write a single raw byte.
    pub fn put_u8(&mut self, byte: u8) {
        self.buf.put_u8(byte);
    }

    /// Open a field at `index` inside an object.
    ///
    /// Field headers are `varint(index + 1)`; index 0 is reserved for the
    /// object terminator written by [`end_object`](Self::end_object). The
    /// field value follows immediately.
    pub fn field_header(&mut self, index: u32) {
        self.put_varint(u64::from(index) + 1);
    }

    /// Terminate the current object.
    pub fn end_object(&mut self) {
        self.put_varint(0);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Discard everything written so far, keeping the allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Freeze the written bytes into an immutable buffer.
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }

    /// Consume the writer and return the underlying buffer.
    pub fn into_inner(self) -> BytesMut {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_single_byte_values() {
        let mut w = WireWriter::new();
        w.put_varint(0);
        w.put_varint(1);
        w.put_varint(127);
        assert_eq!(w.as_slice(), &[0x00, 0x01, 0x7f]);
    }

    #[test]
    fn varint_continuation_boundary() {
        let mut w = WireWriter::new();
        w.put_varint(128);
        assert_eq!(w.as_slice(), &[0x80, 0x01]);

        let mut w = WireWriter::new();
        w.put_varint(300);
        assert_eq!(w.as_slice(), &[0xac, 0x02]);
    }

    #[test]
    fn varint_max_is_ten_bytes() {
        let mut w = WireWriter::new();
        w.put_varint(u64::MAX);
        assert_eq!(w.len(), 10);
        assert_eq!(w.as_slice()[9], 0x01);
    }

    #[test]
    fn signed_uses_bit_pattern() {
        let mut w = WireWriter::new();
        w.put_varint_i64(-1);
        // -1 as u64 is u64::MAX: ten bytes, not a short zig-zag form.
        assert_eq!(w.len(), 10);
    }

    #[test]
    fn count_tag_packs_low_bits() {
        let mut w = WireWriter::new();
        w.put_count_tag(5, 3);
        assert_eq!(w.as_slice(), &[(5 << TAG_BITS) | 3]);
    }

    #[test]
    #[should_panic(expected = "exceeds")]
    fn count_tag_rejects_wide_tag() {
        let mut w = WireWriter::new();
        w.put_count_tag(1, MAX_TAG + 1);
    }

    #[test]
    fn text_is_length_prefixed() {
        let mut w = WireWriter::new();
        w.put_text("abc");
        assert_eq!(w.as_slice(), &[3, b'a', b'b', b'c']);
    }

    #[test]
    fn object_framing_bytes() {
        let mut w = WireWriter::new();
        w.field_header(0);
        w.put_bool(true);
        w.field_header(2);
        w.put_varint(9);
        w.end_object();
        assert_eq!(w.as_slice(), &[1, 1, 3, 9, 0]);
    }

    #[test]
    fn clear_retains_nothing() {
        let mut w = WireWriter::new();
        w.put_text("junk");
        w.clear();
        assert!(w.is_empty());
    }
}
