//! Delivery layer for wirecall: Unix domain socket streams plus
//! length-prefix frame assembly.
//!
//! This layer moves opaque frame payloads; it knows nothing about request
//! ids or routes. [`FrameWriter`] implements the protocol's
//! [`FrameSink`](wirecall_proto::FrameSink), so a multiplexer can write
//! straight through it.

pub mod error;

#[cfg(unix)]
pub mod framed;
#[cfg(unix)]
pub mod stream;
#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};

#[cfg(unix)]
pub use framed::{DeliveryConfig, FrameReader, FrameWriter, DEFAULT_MAX_PAYLOAD};
#[cfg(unix)]
pub use stream::WireStream;
#[cfg(unix)]
pub use uds::SocketListener;
