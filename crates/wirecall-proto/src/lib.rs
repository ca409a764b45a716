//! Binary call/response protocol for wirecall.
//!
//! A frame's payload (after the delivery layer strips its length prefix) is
//! `request_id (varint) || body`. For a call the body is
//! `route (varint) || argument bytes`; for a response it is a response-code
//! byte followed by either result bytes (success) or a length-prefixed error
//! message (failure). Exact code ordinals are part of the wire contract.

pub mod code;
pub mod error;
pub mod frame;
pub mod sink;

pub use code::ResponseCode;
pub use error::{CallError, Result};
pub use frame::{
    read_call, read_response, write_call, write_err_response, write_ok_response, Call, Response,
    ResponseBody,
};
pub use sink::FrameSink;
