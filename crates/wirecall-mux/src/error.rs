/// Errors from submitting work to a [`Multiplexer`](crate::Multiplexer).
///
/// Failures of the requests themselves arrive through completion handlers
/// as [`CallError`](wirecall_proto::CallError), not here.
#[derive(Debug, thiserror::Error)]
pub enum MuxError {
    /// The connection has not been reported active yet.
    #[error("connection not established")]
    NotConnected,

    /// The multiplexer saw the connection close; it accepts no more work.
    #[error("connection closed")]
    Closed,

    /// The caller's argument writer failed while building the frame.
    #[error("failed to encode call arguments: {0}")]
    Encode(#[from] wirecall_codec::CodecError),

    /// The delivery layer refused the outbound frame.
    #[error("failed to send frame: {0}")]
    Sink(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MuxError>;
