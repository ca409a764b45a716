use std::path::PathBuf;

/// Errors from the delivery layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind the listening socket.
    #[error("failed to bind to {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to connect to a listening socket.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// An I/O error on an established stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The socket path exceeds the platform's `sun_path` limit.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },

    /// A frame payload exceeds the configured maximum.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The peer closed the connection, possibly mid-frame.
    #[error("connection closed")]
    ConnectionClosed,
}

impl TransportError {
    /// Collapse into a plain `io::Error` for callers behind `std::io` seams.
    pub fn into_io(self) -> std::io::Error {
        match self {
            Self::Io(io) | Self::Accept(io) => io,
            Self::Bind { source, .. } | Self::Connect { source, .. } => source,
            Self::ConnectionClosed => {
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "connection closed")
            }
            other => std::io::Error::other(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
