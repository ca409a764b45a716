use bytes::{BufMut, Bytes, BytesMut};

/// Streaming JSON emitter with depth-tracked comma placement.
///
/// Because the active path through a JSON document is always a single chain
/// (two siblings are never open at once), one integer recording the deepest
/// level that most recently completed a value replaces a per-level stack.
/// A separator is needed before an item exactly when that level already
/// produced a value at the current depth.
#[derive(Debug)]
pub struct JsonWriter {
    buf: BytesMut,
    depth: i32,
    last_value_depth: i32,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
            depth: 0,
            last_value_depth: -1,
        }
    }

    /// Open an object in value position (document root or array element).
    pub fn start_object(&mut self) {
        self.separator();
        self.buf.put_u8(b'{');
        self.depth += 1;
    }

    /// Close the innermost object.
    pub fn end_object(&mut self) {
        self.depth -= 1;
        self.last_value_depth = self.depth;
        self.buf.put_u8(b'}');
    }

    /// Open an array in value position.
    pub fn start_array(&mut self) {
        self.separator();
        self.buf.put_u8(b'[');
        self.depth += 1;
    }

    /// Close the innermost array.
    pub fn end_array(&mut self) {
        self.depth -= 1;
        self.last_value_depth = self.depth;
        self.buf.put_u8(b']');
    }

    /// Open `"name": {` — an object-valued field.
    pub fn object_field(&mut self, name: &str) {
        self.field_prefix(name);
        self.buf.put_u8(b'{');
        self.depth += 1;
    }

    /// Open `"name": [` — an array-valued field.
    pub fn array_field(&mut self, name: &str) {
        self.field_prefix(name);
        self.buf.put_u8(b'[');
        self.depth += 1;
    }

    /// Write a string-valued field.
    pub fn field_str(&mut self, name: &str, value: &str) {
        self.field_prefix(name);
        self.push_string(value);
    }

    /// Write a number-valued field.
    pub fn field_f64(&mut self, name: &str, value: f64) {
        self.field_prefix(name);
        self.push_number(value);
    }

    /// Write a boolean-valued field.
    pub fn field_bool(&mut self, name: &str, value: bool) {
        self.field_prefix(name);
        self.push_literal(value);
    }

    /// Write a null-valued field.
    pub fn field_null(&mut self, name: &str) {
        self.field_prefix(name);
        self.buf.put_slice(b"null");
    }

    /// Write a string in value position.
    pub fn value_str(&mut self, value: &str) {
        self.separator();
        self.push_string(value);
    }

    /// Write a number in value position.
    pub fn value_f64(&mut self, value: f64) {
        self.separator();
        self.push_number(value);
    }

    /// Write a boolean in value position.
    pub fn value_bool(&mut self, value: bool) {
        self.separator();
        self.push_literal(value);
    }

    /// Write null in value position.
    pub fn value_null(&mut self) {
        self.separator();
        self.buf.put_slice(b"null");
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

    /// The emitted document as text. The writer only ever appends valid
    /// UTF-8, so this cannot fail.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.buf).expect("writer emitted non-UTF-8")
    }

    /// Freeze the emitted bytes.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    /// Separator rule: if the current level produced no value yet, mark it
    /// and emit nothing; otherwise a sibling precedes us and a comma goes in.
    fn separator(&mut self) {
        if self.last_value_depth < self.depth {
            self.last_value_depth = self.depth;
        } else {
            self.buf.put_u8(b',');
        }
    }

    fn field_prefix(&mut self, name: &str) {
        self.separator();
        self.push_string(name);
        self.buf.put_u8(b':');
    }

    fn push_string(&mut self, value: &str) {
        self.buf.put_u8(b'"');
        for &byte in value.as_bytes() {
            match byte {
                b'"' => self.buf.put_slice(b"\\\""),
                b'\\' => self.buf.put_slice(b"\\\\"),
                0x08 => self.buf.put_slice(b"\\b"),
                0x0C => self.buf.put_slice(b"\\f"),
                b'\n' => self.buf.put_slice(b"\\n"),
                b'\r' => self.buf.put_slice(b"\\r"),
                b'\t' => self.buf.put_slice(b"\\t"),
                // Remaining control bytes have no short escape and are
                // dropped; everything from 0x20 up passes through.
                0x00..=0x1F => {}
                _ => self.buf.put_u8(byte),
            }
        }
        self.buf.put_u8(b'"');
    }

    fn push_number(&mut self, value: f64) {
        if !value.is_finite() {
            // JSON has no encoding for NaN or infinities.
            self.buf.put_slice(b"null");
            return;
        }
        let text = if value == value.trunc() && value.abs() < 9.007_199_254_740_992e15 {
            format!("{}", value as i64)
        } else {
            format!("{value}")
        };
        self.buf.put_slice(text.as_bytes());
    }

    fn push_literal(&mut self, value: bool) {
        self.buf
            .put_slice(if value { b"true" } else { b"false" });
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_placement_nested() {
        let mut w = JsonWriter::new();
        w.start_object();
        w.field_f64("a", 1.0);
        w.object_field("b");
        w.field_f64("c", 2.0);
        w.end_object();
        w.field_f64("d", 3.0);
        w.end_object();

        assert_eq!(w.as_str(), r#"{"a":1,"b":{"c":2},"d":3}"#);
    }

    #[test]
    fn array_elements_separated() {
        let mut w = JsonWriter::new();
        w.start_array();
        w.value_f64(1.0);
        w.value_f64(2.0);
        w.start_array();
        w.value_f64(3.0);
        w.end_array();
        w.value_f64(4.0);
        w.end_array();

        assert_eq!(w.as_str(), "[1,2,[3],4]");
    }

    #[test]
    fn empty_containers() {
        let mut w = JsonWriter::new();
        w.start_object();
        w.array_field("xs");
        w.end_array();
        w.object_field("o");
        w.end_object();
        w.end_object();

        assert_eq!(w.as_str(), r#"{"xs":[],"o":{}}"#);
    }

    #[test]
    fn sibling_after_closed_container() {
        // The level being returned to must count as populated.
        let mut w = JsonWriter::new();
        w.start_array();
        w.start_object();
        w.end_object();
        w.start_object();
        w.end_object();
        w.end_array();

        assert_eq!(w.as_str(), "[{},{}]");
    }

    #[test]
    fn string_escapes() {
        let mut w = JsonWriter::new();
        w.value_str("a\"b\\c\td\ne\rf\u{8}g\u{c}h");
        assert_eq!(w.as_str(), r#""a\"b\\c\td\ne\rf\bg\fh""#);
    }

    #[test]
    fn unmapped_control_bytes_dropped() {
        let mut w = JsonWriter::new();
        w.value_str("a\u{1}b\u{1f}c");
        assert_eq!(w.as_str(), r#""abc""#);
    }

    #[test]
    fn number_forms() {
        let mut w = JsonWriter::new();
        w.start_array();
        w.value_f64(0.0);
        w.value_f64(-7.0);
        w.value_f64(0.1);
        w.value_f64(2000.0);
        w.value_f64(-12.34);
        w.end_array();

        assert_eq!(w.as_str(), "[0,-7,0.1,2000,-12.34]");
    }

    #[test]
    fn literals_and_null() {
        let mut w = JsonWriter::new();
        w.start_object();
        w.field_bool("yes", true);
        w.field_bool("no", false);
        w.field_null("nothing");
        w.end_object();

        assert_eq!(w.as_str(), r#"{"yes":true,"no":false,"nothing":null}"#);
    }

    #[test]
    fn as_str_round_trips_multibyte_text() {
        let mut w = JsonWriter::new();
        w.value_str("héllo \u{4e16}\u{754c}");
        assert_eq!(w.as_str(), "\"héllo \u{4e16}\u{754c}\"");
        assert_eq!(w.as_str().as_bytes(), w.as_slice());
    }

    #[test]
    fn output_is_valid_json() {
        let mut w = JsonWriter::new();
        w.start_object();
        w.field_str("name", "wire\u{7f}call \"quoted\"");
        w.array_field("values");
        w.value_f64(1.5);
        w.value_null();
        w.value_bool(true);
        w.end_array();
        w.object_field("nested");
        w.field_f64("n", -3.25);
        w.end_object();
        w.end_object();

        let parsed: serde_json::Value =
            serde_json::from_str(w.as_str()).expect("writer output should be valid JSON");
        assert_eq!(parsed["values"][0], serde_json::json!(1.5));
        assert_eq!(parsed["nested"]["n"], serde_json::json!(-3.25));
    }
}
