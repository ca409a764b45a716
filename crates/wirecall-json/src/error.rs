use crate::tokenizer::TokenKind;

/// Errors from JSON tokenizing. Always fatal to the current parse.
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    /// A byte that cannot start or continue a token at this position.
    #[error("unexpected byte {byte:#04x} at offset {offset}")]
    UnexpectedByte { byte: u8, offset: usize },

    /// Input ended inside a token or where a token was required.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A `t`/`f`/`n` keyword did not complete `true`/`false`/`null`.
    #[error("invalid literal at offset {0}")]
    InvalidLiteral(usize),

    /// A `\u` escape contained a byte outside `[0-9A-Fa-f]`.
    #[error("invalid hex digit {byte:#04x} in unicode escape")]
    InvalidHexDigit { byte: u8 },

    /// An unknown byte followed a backslash.
    #[error("invalid escape \\{byte:#04x}")]
    InvalidEscape { byte: u8 },

    /// `expect` parsed a token of the wrong kind.
    #[error("expected {expected:?}, found {found:?}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
    },

    /// A container body violated object/array shape while skipping.
    #[error("malformed document structure at offset {0}")]
    MalformedStructure(usize),

    /// A string value was not valid UTF-8 in text retention mode.
    #[error("invalid UTF-8 in string value")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

pub type Result<T> = std::result::Result<T, JsonError>;
