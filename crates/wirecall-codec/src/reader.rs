use wirecall_bytes::ByteSeq;

use crate::error::{CodecError, Result};
use crate::TAG_BITS;

const CONTINUATION: u8 = 0x80;

/// Forward-only cursor over a wire-encoded byte slice.
///
/// Length-prefixed byte sequences come back as borrowed [`ByteSeq`] windows
/// over the input, so decoding a payload does not copy it.
#[derive(Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Current cursor position from the start of the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Read one raw byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = *self
            .buf
            .get(self.pos)
            .ok_or(CodecError::UnexpectedEof { needed: 1 })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read an unsigned varint.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            if shift > 63 {
                return Err(CodecError::VarintOverflow);
            }
            value |= u64::from(byte & !CONTINUATION) << shift;
            if byte & CONTINUATION == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// Read an unsigned 32-bit varint.
    pub fn read_varint32(&mut self) -> Result<u32> {
        let value = self.read_varint()?;
        u32::try_from(value).map_err(|_| CodecError::ValueOutOfRange { value, width: 32 })
    }

    /// Read a signed value written as its unsigned bit pattern.
    pub fn read_varint_i64(&mut self) -> Result<i64> {
        Ok(self.read_varint()? as i64)
    }

    /// Read a packed (count, tag) header.
    pub fn read_count_tag(&mut self) -> Result<(u64, u8)> {
        let packed = self.read_varint()?;
        let tag = (packed & ((1 << TAG_BITS) - 1)) as u8;
        Ok((packed >> TAG_BITS, tag))
    }

    /// Read length-prefixed UTF-8 text (copies into a `String`).
    pub fn read_text(&mut self) -> Result<String> {
        let bytes = self.read_length_prefixed()?;
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }

    /// Read a length-prefixed byte sequence as a zero-copy window.
    pub fn read_byte_seq(&mut self) -> Result<ByteSeq<'a>> {
        Ok(ByteSeq::borrowed(self.read_length_prefixed()?))
    }

    /// Read exactly `len` raw bytes.
    pub fn read_raw(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                needed: len - self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a boolean byte; anything other than 0 or 1 is malformed.
    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidBool(other)),
        }
    }

    /// Everything after the cursor, without consuming it.
    pub fn tail(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Read an object, invoking `visit` once per discovered field index
    /// until the object terminator.
    ///
    /// Generated codecs layer on this: the callback receives the field index
    /// and the reader positioned at the field value, and must consume exactly
    /// that value.
    pub fn read_object<F>(&mut self, mut visit: F) -> Result<()>
    where
        F: FnMut(u32, &mut WireReader<'a>) -> Result<()>,
    {
        loop {
            let header = self.read_varint()?;
            if header == 0 {
                return Ok(());
            }
            let index = u32::try_from(header - 1).map_err(|_| CodecError::ValueOutOfRange {
                value: header - 1,
                width: 32,
            })?;
            visit(index, self)?;
        }
    }

    fn read_length_prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint()?;
        let remaining = self.remaining();
        if len > remaining as u64 {
            return Err(CodecError::LengthOutOfRange { len, remaining });
        }
        self.read_raw(len as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::WireWriter;

    #[test]
    fn varint_round_trip_boundaries() {
        let values = [0u64, 1, 127, 128, 300, 16_383, 16_384, u64::MAX];
        let mut w = WireWriter::new();
        for &v in &values {
            w.put_varint(v);
        }

        let encoded = w.freeze();
        let mut r = WireReader::new(&encoded);
        for &v in &values {
            assert_eq!(r.read_varint().unwrap(), v);
        }
        assert!(r.is_empty());
    }

    #[test]
    fn signed_bit_pattern_round_trip() {
        let values = [0i64, -1, 1, i64::MIN, i64::MAX, -123_456_789];
        let mut w = WireWriter::new();
        for &v in &values {
            w.put_varint_i64(v);
        }

        let encoded = w.freeze();
        let mut r = WireReader::new(&encoded);
        for &v in &values {
            assert_eq!(r.read_varint_i64().unwrap(), v);
        }
    }

    #[test]
    fn varint_overflow_rejected() {
        // Eleven continuation bytes push past 64 bits.
        let bytes = [0xFFu8; 11];
        let mut r = WireReader::new(&bytes);
        assert!(matches!(r.read_varint(), Err(CodecError::VarintOverflow)));
    }

    #[test]
    fn varint32_range_check() {
        let mut w = WireWriter::new();
        w.put_varint(u64::from(u32::MAX) + 1);
        let encoded = w.freeze();
        let mut r = WireReader::new(&encoded);
        assert!(matches!(
            r.read_varint32(),
            Err(CodecError::ValueOutOfRange { width: 32, .. })
        ));
    }

    #[test]
    fn count_tag_round_trip() {
        let mut w = WireWriter::new();
        w.put_count_tag(0, 0);
        w.put_count_tag(1, 7);
        w.put_count_tag(1 << 40, 2);

        let encoded = w.freeze();
        let mut r = WireReader::new(&encoded);
        assert_eq!(r.read_count_tag().unwrap(), (0, 0));
        assert_eq!(r.read_count_tag().unwrap(), (1, 7));
        assert_eq!(r.read_count_tag().unwrap(), (1 << 40, 2));
    }

    #[test]
    fn text_round_trip() {
        let mut w = WireWriter::new();
        w.put_text("héllo wire");
        let encoded = w.freeze();
        let mut r = WireReader::new(&encoded);
        assert_eq!(r.read_text().unwrap(), "héllo wire");
    }

    #[test]
    fn byte_seq_is_borrowed_window() {
        let mut w = WireWriter::new();
        w.put_byte_seq(&wirecall_bytes::ByteSeq::owned(b"payload".to_vec()));
        let encoded = w.freeze();

        let mut r = WireReader::new(&encoded);
        let seq = r.read_byte_seq().unwrap();
        assert_eq!(seq.as_slice(), b"payload");
        assert!(!seq.is_owned());
        assert_eq!(seq.as_slice().as_ptr(), encoded[1..].as_ptr());
    }

    #[test]
    fn length_prefix_past_end_rejected() {
        let bytes = [5u8, b'a', b'b'];
        let mut r = WireReader::new(&bytes);
        assert!(matches!(
            r.read_byte_seq(),
            Err(CodecError::LengthOutOfRange { len: 5, .. })
        ));
    }

    #[test]
    fn bool_validation() {
        let mut w = WireWriter::new();
        w.put_bool(true);
        w.put_bool(false);
        w.put_u8(2);

        let encoded = w.freeze();
        let mut r = WireReader::new(&encoded);
        assert!(r.read_bool().unwrap());
        assert!(!r.read_bool().unwrap());
        assert!(matches!(r.read_bool(), Err(CodecError::InvalidBool(2))));
    }

    #[test]
    fn object_field_callback() {
        let mut w = WireWriter::new();
        w.field_header(0);
        w.put_varint(42);
        w.field_header(3);
        w.put_text("name");
        w.end_object();

        let encoded = w.freeze();
        let mut r = WireReader::new(&encoded);
        let mut seen = Vec::new();
        r.read_object(|index, r| {
            match index {
                0 => {
                    assert_eq!(r.read_varint()?, 42);
                }
                3 => {
                    assert_eq!(r.read_text()?, "name");
                }
                other => panic!("unexpected field {other}"),
            }
            seen.push(index);
            Ok(())
        })
        .unwrap();

        assert_eq!(seen, vec![0, 3]);
        assert!(r.is_empty());
    }

    #[test]
    fn truncated_input_reports_eof() {
        let mut r = WireReader::new(&[0x80]);
        assert!(matches!(
            r.read_varint(),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }
}
