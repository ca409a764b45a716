/// Errors that can occur while decoding binary wire data.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The input ended before the value was complete.
    #[error("unexpected end of input ({needed} more bytes needed)")]
    UnexpectedEof { needed: usize },

    /// A varint ran past 64 bits of payload.
    #[error("varint exceeds 64 bits")]
    VarintOverflow,

    /// A varint value does not fit the requested integer width.
    #[error("varint value {value} out of range for {width}-bit field")]
    ValueOutOfRange { value: u64, width: u32 },

    /// A length prefix points past the end of the input.
    #[error("length {len} exceeds remaining input ({remaining} bytes)")]
    LengthOutOfRange { len: u64, remaining: usize },

    /// A boolean byte was neither 0 nor 1.
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    /// A text field did not decode as UTF-8.
    #[error("invalid UTF-8 in text field")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;
