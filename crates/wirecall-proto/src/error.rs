use crate::code::ResponseCode;

/// Failure outcome of a single call, as delivered to its completion handler.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// The peer rejected the request itself (bad arguments or no such
    /// route); correctable by the caller.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The peer refused the call on authorization grounds.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The addressed resource does not exist on the peer.
    #[error("not found: {0}")]
    NotFound(String),

    /// The connection went away while the request was outstanding.
    /// Synthesized locally; never read off the wire.
    #[error("connection closed")]
    ConnectionClosed,

    /// A reserved or unrecognized failure code.
    #[error("remote failure (code {code}): {message}")]
    Other { code: u8, message: String },

    /// The response body could not be decoded.
    #[error("response decode failed: {0}")]
    Decode(#[from] wirecall_codec::CodecError),
}

impl CallError {
    /// Map a non-success wire code and its error message to an error kind.
    pub fn from_wire(code: ResponseCode, message: String) -> Self {
        match code {
            ResponseCode::InvalidArgs | ResponseCode::NoRoute => Self::Rejected(message),
            ResponseCode::NoPermission => Self::Unauthorized(message),
            ResponseCode::NotFound => Self::NotFound(message),
            ResponseCode::Other(code) => Self::Other { code, message },
            // Success never reaches the error path; treat it as opaque if it
            // somehow does rather than panicking on protocol misuse.
            ResponseCode::Success => Self::Other { code: 0, message },
        }
    }
}

pub type Result<T> = std::result::Result<T, CallError>;
