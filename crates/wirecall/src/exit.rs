use std::fmt;
use std::io;

use wirecall_mux::MuxError;
use wirecall_proto::CallError;
use wirecall_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
#[allow(dead_code)]
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Bind { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Accept(source)
        | TransportError::Io(source) => io_error(context, source),
        TransportError::FrameTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        TransportError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn call_error(context: &str, err: CallError) -> CliError {
    match err {
        CallError::Rejected(_) => CliError::new(USAGE, format!("{context}: {err}")),
        CallError::Unauthorized(_) => CliError::new(PERMISSION_DENIED, format!("{context}: {err}")),
        CallError::NotFound(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        CallError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        CallError::Decode(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        CallError::Other { .. } => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

pub fn mux_error(context: &str, err: MuxError) -> CliError {
    match err {
        MuxError::Sink(source) => io_error(context, source),
        MuxError::Encode(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        MuxError::NotConnected | MuxError::Closed => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
    }
}
