use wirecall_bytes::ByteSeq;

use crate::error::{JsonError, Result};

/// Kind of the token most recently produced by [`JsonReader::parse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    String,
    Number,
    Bool,
    Null,
    FieldName,
}

/// How parsed string payloads are retained.
///
/// `Text` validates each string as UTF-8 while parsing; `Bytes` keeps the
/// raw decoded bytes and defers any text interpretation to the caller.
/// Retention affects payload representation only, never parsing itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StringMode {
    #[default]
    Text,
    Bytes,
}

const HEX_INVALID: u8 = 0xFF;

// Keyed by `byte - b'0'`, covering '0' through 'f'. Any byte mapping to a
// value above 15 is not a hex digit.
#[rustfmt::skip]
const HEX_TABLE: [u8; 55] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9,
    HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID,
    10, 11, 12, 13, 14, 15,
    HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID,
    HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID,
    HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID,
    HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID, HEX_INVALID,
    10, 11, 12, 13, 14, 15,
];

/// Pull-based streaming JSON tokenizer.
///
/// A single forward-only cursor over an input slice; each [`parse`] call
/// advances it and overwrites the current token state. Not restartable, and
/// owned exclusively by one logical parse operation.
///
/// [`parse`]: Self::parse
#[derive(Debug)]
pub struct JsonReader<'a> {
    buf: &'a [u8],
    pos: usize,
    mode: StringMode,
    str_buf: Vec<u8>,
    number: f64,
    boolean: bool,
}

impl<'a> JsonReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_mode(buf, StringMode::Text)
    }

    pub fn with_mode(buf: &'a [u8], mode: StringMode) -> Self {
        Self {
            buf,
            pos: 0,
            mode,
            str_buf: Vec::new(),
            number: 0.0,
            boolean: false,
        }
    }

    /// Current cursor offset from the start of the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Advance to the next token and return its kind.
    pub fn parse(&mut self) -> Result<TokenKind> {
        self.skip_whitespace();
        let byte = self.next_byte()?;
        match byte {
            b'[' => Ok(TokenKind::StartArray),
            b'{' => Ok(TokenKind::StartObject),
            b']' => {
                self.consume_trailing_comma();
                Ok(TokenKind::EndArray)
            }
            b'}' => {
                self.consume_trailing_comma();
                Ok(TokenKind::EndObject)
            }
            _ => self.parse_value(byte),
        }
    }

    /// Parse the next token and fail unless it matches `expected`, with an
    /// exemption for `Null` when `allow_null` is set.
    pub fn expect(&mut self, expected: TokenKind, allow_null: bool) -> Result<TokenKind> {
        let found = self.parse()?;
        if found == expected || (allow_null && found == TokenKind::Null) {
            Ok(found)
        } else {
            Err(JsonError::UnexpectedToken { expected, found })
        }
    }

    /// Parse one value and, if it opened a container, skip to its matching
    /// close, validating element shape on the way.
    pub fn skip_value(&mut self) -> Result<()> {
        let token = self.parse()?;
        self.skip_parsed(token)
    }

    /// If the next non-whitespace byte closes an array, consume it and
    /// report true. Used by repeated-element readers as their loop guard.
    pub fn peek_array_end(&mut self) -> Result<bool> {
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.consume_trailing_comma();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Payload of the current `String`/`FieldName` token as text.
    pub fn str_value(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.str_buf)?)
    }

    /// Payload of the current `String`/`FieldName` token as raw bytes.
    pub fn bytes_value(&self) -> ByteSeq<'_> {
        ByteSeq::borrowed(&self.str_buf)
    }

    /// Payload of the current `Number` token.
    pub fn number_value(&self) -> f64 {
        self.number
    }

    /// Payload of the current `Bool` token.
    pub fn bool_value(&self) -> bool {
        self.boolean
    }

    fn skip_parsed(&mut self, token: TokenKind) -> Result<()> {
        match token {
            TokenKind::StartArray => loop {
                let element = self.parse()?;
                if element == TokenKind::EndArray {
                    return Ok(());
                }
                if element == TokenKind::FieldName {
                    return Err(JsonError::MalformedStructure(self.pos));
                }
                self.skip_parsed(element)?;
            },
            TokenKind::StartObject => loop {
                let name = self.parse()?;
                if name == TokenKind::EndObject {
                    return Ok(());
                }
                if name != TokenKind::FieldName {
                    return Err(JsonError::MalformedStructure(self.pos));
                }
                let value = self.parse()?;
                if matches!(
                    value,
                    TokenKind::EndObject | TokenKind::EndArray | TokenKind::FieldName
                ) {
                    return Err(JsonError::MalformedStructure(self.pos));
                }
                self.skip_parsed(value)?;
            },
            // A bare close (or stray field name) where a value was expected.
            TokenKind::EndArray | TokenKind::EndObject | TokenKind::FieldName => {
                Err(JsonError::MalformedStructure(self.pos))
            }
            _ => Ok(()),
        }
    }

    fn parse_value(&mut self, byte: u8) -> Result<TokenKind> {
        match byte {
            b'"' => self.parse_string_token(),
            b'-' | b'+' | b'0'..=b'9' => self.parse_number(byte),
            b't' | b'f' | b'n' => self.parse_keyword(byte),
            other => Err(JsonError::UnexpectedByte {
                byte: other,
                offset: self.pos - 1,
            }),
        }
    }

    fn parse_string_token(&mut self) -> Result<TokenKind> {
        self.read_string_body()?;
        // A string immediately followed by ':' is a field name; the colon
        // is consumed here.
        if self.peek() == Some(b':') {
            self.pos += 1;
            return Ok(TokenKind::FieldName);
        }
        self.consume_trailing_comma();
        Ok(TokenKind::String)
    }

    fn read_string_body(&mut self) -> Result<()> {
        self.str_buf.clear();
        loop {
            let byte = self.next_byte()?;
            match byte {
                b'"' => break,
                b'\\' => {
                    let escape = self.next_byte()?;
                    match escape {
                        b'"' | b'\\' | b'/' => self.str_buf.push(escape),
                        b'b' => self.str_buf.push(0x08),
                        b'f' => self.str_buf.push(0x0C),
                        b'n' => self.str_buf.push(b'\n'),
                        b'r' => self.str_buf.push(b'\r'),
                        b't' => self.str_buf.push(b'\t'),
                        b'u' => {
                            // One UTF-16 code unit per escape; surrogate
                            // pairs are not reconstructed, so an unpaired
                            // unit degrades to U+FFFD.
                            let unit = self.read_hex4()?;
                            let ch = char::from_u32(u32::from(unit)).unwrap_or('\u{FFFD}');
                            let mut utf8 = [0u8; 4];
                            self.str_buf
                                .extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                        }
                        other => return Err(JsonError::InvalidEscape { byte: other }),
                    }
                }
                _ => self.str_buf.push(byte),
            }
        }
        if self.mode == StringMode::Text {
            std::str::from_utf8(&self.str_buf)?;
        }
        Ok(())
    }

    fn read_hex4(&mut self) -> Result<u16> {
        let mut unit = 0u16;
        for _ in 0..4 {
            let byte = self.next_byte()?;
            let index = usize::from(byte.wrapping_sub(b'0'));
            let value = HEX_TABLE.get(index).copied().unwrap_or(HEX_INVALID);
            if value > 15 {
                return Err(JsonError::InvalidHexDigit { byte });
            }
            unit = (unit << 4) | u16::from(value);
        }
        Ok(unit)
    }

    fn parse_number(&mut self, first: u8) -> Result<TokenKind> {
        let mut byte = first;
        let negative = byte == b'-';
        if byte == b'-' || byte == b'+' {
            byte = self.next_byte()?;
        }

        let mut value = 0f64;
        let mut cursor = Some(byte);
        while let Some(digit) = cursor.filter(u8::is_ascii_digit) {
            value = value * 10.0 + f64::from(digit - b'0');
            cursor = self.take_byte();
        }

        if cursor == Some(b'.') {
            let mut fraction = 0f64;
            let mut digits = 0i32;
            cursor = self.take_byte();
            while let Some(digit) = cursor.filter(u8::is_ascii_digit) {
                fraction = fraction * 10.0 + f64::from(digit - b'0');
                digits += 1;
                cursor = self.take_byte();
            }
            // Floating exponentiation keeps arbitrary fraction lengths exact
            // enough without an integer power table.
            value += fraction / 10f64.powi(digits);
        }

        if matches!(cursor, Some(b'e') | Some(b'E')) {
            cursor = self.take_byte();
            let exponent_negative = cursor == Some(b'-');
            if matches!(cursor, Some(b'-') | Some(b'+')) {
                cursor = self.take_byte();
            }
            let mut exponent = 0i32;
            while let Some(digit) = cursor.filter(u8::is_ascii_digit) {
                exponent = exponent * 10 + i32::from(digit - b'0');
                cursor = self.take_byte();
            }
            value *= 10f64.powi(if exponent_negative {
                -exponent
            } else {
                exponent
            });
        }

        // The terminating byte was one byte of lookahead; put it back.
        if cursor.is_some() {
            self.pos -= 1;
        }

        self.number = if negative { -value } else { value };
        self.consume_trailing_comma();
        Ok(TokenKind::Number)
    }

    fn parse_keyword(&mut self, first: u8) -> Result<TokenKind> {
        let start = self.pos - 1;
        let (rest, kind, truth): (&[u8], TokenKind, bool) = match first {
            b't' => (b"rue", TokenKind::Bool, true),
            b'f' => (b"alse", TokenKind::Bool, false),
            _ => (b"ull", TokenKind::Null, false),
        };
        for &expected in rest {
            let byte = self
                .next_byte()
                .map_err(|_| JsonError::InvalidLiteral(start))?;
            if byte != expected {
                return Err(JsonError::InvalidLiteral(start));
            }
        }
        self.boolean = truth;
        self.consume_trailing_comma();
        Ok(kind)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r')) {
            self.pos += 1;
        }
    }

    fn consume_trailing_comma(&mut self) {
        if self.peek() == Some(b',') {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn take_byte(&mut self) -> Option<u8> {
        let byte = self.peek();
        if byte.is_some() {
            self.pos += 1;
        }
        byte
    }

    fn next_byte(&mut self) -> Result<u8> {
        self.take_byte().ok_or(JsonError::UnexpectedEnd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::JsonWriter;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn tokenizes_flat_object() {
        let doc = br#"{"a":1,"b":"two","c":true,"d":null}"#;
        let mut r = JsonReader::new(doc);

        assert_eq!(r.parse().unwrap(), TokenKind::StartObject);
        assert_eq!(r.parse().unwrap(), TokenKind::FieldName);
        assert_eq!(r.str_value().unwrap(), "a");
        assert_eq!(r.parse().unwrap(), TokenKind::Number);
        assert_close(r.number_value(), 1.0);
        assert_eq!(r.parse().unwrap(), TokenKind::FieldName);
        assert_eq!(r.parse().unwrap(), TokenKind::String);
        assert_eq!(r.str_value().unwrap(), "two");
        assert_eq!(r.parse().unwrap(), TokenKind::FieldName);
        assert_eq!(r.parse().unwrap(), TokenKind::Bool);
        assert!(r.bool_value());
        assert_eq!(r.parse().unwrap(), TokenKind::FieldName);
        assert_eq!(r.parse().unwrap(), TokenKind::Null);
        assert_eq!(r.parse().unwrap(), TokenKind::EndObject);
    }

    #[test]
    fn string_then_colon_becomes_field_name() {
        let mut r = JsonReader::new(br#""name":"value""#);
        assert_eq!(r.parse().unwrap(), TokenKind::FieldName);
        assert_eq!(r.str_value().unwrap(), "name");
        assert_eq!(r.parse().unwrap(), TokenKind::String);
        assert_eq!(r.str_value().unwrap(), "value");
    }

    #[test]
    fn number_negative_fraction() {
        let mut r = JsonReader::new(b"-12.340");
        assert_eq!(r.parse().unwrap(), TokenKind::Number);
        assert_close(r.number_value(), -12.34);
    }

    #[test]
    fn number_exponents() {
        let mut r = JsonReader::new(b"[2e3,25e-1,1.5E+2]");
        assert_eq!(r.parse().unwrap(), TokenKind::StartArray);
        r.parse().unwrap();
        assert_close(r.number_value(), 2000.0);
        r.parse().unwrap();
        assert_close(r.number_value(), 2.5);
        r.parse().unwrap();
        assert_close(r.number_value(), 150.0);
        assert_eq!(r.parse().unwrap(), TokenKind::EndArray);
    }

    #[test]
    fn number_leading_plus_and_tenth() {
        let mut r = JsonReader::new(b"+5");
        r.parse().unwrap();
        assert_close(r.number_value(), 5.0);

        let mut r = JsonReader::new(b"0.1");
        r.parse().unwrap();
        assert_close(r.number_value(), 0.1);
    }

    #[test]
    fn number_lookahead_steps_back() {
        // The ']' terminating the number must still be delivered as a token.
        let mut r = JsonReader::new(b"[42]");
        assert_eq!(r.parse().unwrap(), TokenKind::StartArray);
        assert_eq!(r.parse().unwrap(), TokenKind::Number);
        assert_close(r.number_value(), 42.0);
        assert_eq!(r.parse().unwrap(), TokenKind::EndArray);
    }

    #[test]
    fn keywords_must_match_exactly() {
        let mut r = JsonReader::new(b"truth");
        assert!(matches!(r.parse(), Err(JsonError::InvalidLiteral(0))));

        let mut r = JsonReader::new(b"nul");
        assert!(matches!(r.parse(), Err(JsonError::InvalidLiteral(0))));
    }

    #[test]
    fn escapes_decode() {
        let mut r = JsonReader::new(br#""q\"b\\s\/b\bf\ff\nn\rr\tt""#);
        assert_eq!(r.parse().unwrap(), TokenKind::String);
        assert_eq!(
            r.str_value().unwrap(),
            "q\"b\\s/b\u{8}f\u{c}f\nn\rr\tt"
        );
    }

    #[test]
    fn unicode_escape_single_unit() {
        let mut r = JsonReader::new(r#""Aé世""#.as_bytes());
        assert_eq!(r.parse().unwrap(), TokenKind::String);
        assert_eq!(r.str_value().unwrap(), "A\u{e9}\u{4e16}");
    }

    #[test]
    fn unpaired_surrogate_degrades() {
        // Above-BMP code points arrive as surrogate pairs; the tokenizer
        // decodes one unit at a time, so each half becomes U+FFFD.
        let mut r = JsonReader::new(br#""\uD83D\uDE00""#);
        assert_eq!(r.parse().unwrap(), TokenKind::String);
        assert_eq!(r.str_value().unwrap(), "\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn invalid_hex_digit_rejected() {
        let mut r = JsonReader::new(br#""\u00Zf""#);
        assert!(matches!(
            r.parse(),
            Err(JsonError::InvalidHexDigit { byte: b'Z' })
        ));
    }

    #[test]
    fn invalid_escape_rejected() {
        let mut r = JsonReader::new(br#""\x""#);
        assert!(matches!(
            r.parse(),
            Err(JsonError::InvalidEscape { byte: b'x' })
        ));
    }

    #[test]
    fn bytes_mode_keeps_raw_payload() {
        // 0xFF inside a string is not UTF-8; bytes mode passes it through.
        let doc = [b'"', 0xFF, b'"'];
        let mut r = JsonReader::with_mode(&doc, StringMode::Bytes);
        assert_eq!(r.parse().unwrap(), TokenKind::String);
        assert_eq!(r.bytes_value().as_slice(), &[0xFF]);
        assert!(r.str_value().is_err());

        let mut r = JsonReader::new(&doc);
        assert!(matches!(r.parse(), Err(JsonError::InvalidUtf8(_))));
    }

    #[test]
    fn expect_matches_and_allows_null() {
        let mut r = JsonReader::new(b"[null,5]");
        r.parse().unwrap();
        assert_eq!(
            r.expect(TokenKind::Number, true).unwrap(),
            TokenKind::Null
        );
        assert_eq!(
            r.expect(TokenKind::Number, false).unwrap(),
            TokenKind::Number
        );
    }

    #[test]
    fn expect_mismatch_fails() {
        let mut r = JsonReader::new(b"true");
        assert!(matches!(
            r.expect(TokenKind::String, false),
            Err(JsonError::UnexpectedToken {
                expected: TokenKind::String,
                found: TokenKind::Bool,
            })
        ));
    }

    #[test]
    fn skip_value_over_nested_containers() {
        let doc = br#"{"skip":{"xs":[1,[2,3],{"y":"z"}],"b":true},"after":7}"#;
        let mut r = JsonReader::new(doc);
        assert_eq!(r.parse().unwrap(), TokenKind::StartObject);
        assert_eq!(r.parse().unwrap(), TokenKind::FieldName);
        r.skip_value().unwrap();
        assert_eq!(r.parse().unwrap(), TokenKind::FieldName);
        assert_eq!(r.str_value().unwrap(), "after");
        assert_eq!(r.parse().unwrap(), TokenKind::Number);
        assert_close(r.number_value(), 7.0);
    }

    #[test]
    fn skip_rejects_bare_close() {
        let mut r = JsonReader::new(b"]");
        assert!(matches!(
            r.skip_value(),
            Err(JsonError::MalformedStructure(_))
        ));
    }

    #[test]
    fn skip_rejects_field_name_in_array() {
        let mut r = JsonReader::new(br#"["a":1]"#);
        assert!(matches!(
            r.skip_value(),
            Err(JsonError::MalformedStructure(_))
        ));
    }

    #[test]
    fn peek_array_end_consumes_close() {
        let mut r = JsonReader::new(b"[1,2]");
        assert_eq!(r.parse().unwrap(), TokenKind::StartArray);
        assert!(!r.peek_array_end().unwrap());
        r.parse().unwrap();
        assert!(!r.peek_array_end().unwrap());
        r.parse().unwrap();
        assert!(r.peek_array_end().unwrap());
    }

    #[test]
    fn writer_reader_round_trip() {
        let mut w = JsonWriter::new();
        w.start_object();
        w.field_str("title", "tab\there \"and\" back\\slash");
        w.array_field("nums");
        w.value_f64(-12.34);
        w.value_f64(2000.0);
        w.value_f64(0.1);
        w.end_array();
        w.object_field("flags");
        w.field_bool("on", true);
        w.field_null("off");
        w.end_object();
        w.end_object();

        let doc = w.finish();
        let mut r = JsonReader::new(&doc);
        assert_eq!(r.parse().unwrap(), TokenKind::StartObject);
        assert_eq!(r.parse().unwrap(), TokenKind::FieldName);
        assert_eq!(r.parse().unwrap(), TokenKind::String);
        assert_eq!(r.str_value().unwrap(), "tab\there \"and\" back\\slash");
        assert_eq!(r.parse().unwrap(), TokenKind::FieldName);
        assert_eq!(r.parse().unwrap(), TokenKind::StartArray);
        r.parse().unwrap();
        assert_close(r.number_value(), -12.34);
        r.parse().unwrap();
        assert_close(r.number_value(), 2000.0);
        r.parse().unwrap();
        assert_close(r.number_value(), 0.1);
        assert_eq!(r.parse().unwrap(), TokenKind::EndArray);
        assert_eq!(r.parse().unwrap(), TokenKind::FieldName);
        assert_eq!(r.parse().unwrap(), TokenKind::StartObject);
        assert_eq!(r.parse().unwrap(), TokenKind::FieldName);
        assert_eq!(r.parse().unwrap(), TokenKind::Bool);
        assert!(r.bool_value());
        assert_eq!(r.parse().unwrap(), TokenKind::FieldName);
        assert_eq!(r.parse().unwrap(), TokenKind::Null);
        assert_eq!(r.parse().unwrap(), TokenKind::EndObject);
        assert_eq!(r.parse().unwrap(), TokenKind::EndObject);
    }

    #[test]
    fn truncated_string_fails() {
        let mut r = JsonReader::new(br#""unterminated"#);
        assert!(matches!(r.parse(), Err(JsonError::UnexpectedEnd)));
    }
}
