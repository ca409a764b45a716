//! Binary RPC over local sockets.
//!
//! wirecall invokes named remote routes over a length-framed binary
//! protocol, multiplexing many in-flight calls (including long-lived push
//! subscriptions) on one connection.
//!
//! # Crate Structure
//!
//! - [`bytes`] — byte-sequence abstraction with owned and zero-copy views
//! - [`codec`] — varint/varlong wire primitives for generated codecs
//! - [`json`] — streaming JSON tokenizer and writer
//! - [`proto`] — call/response frame layout and response codes
//! - [`mux`] — client-side request multiplexer
//! - [`transport`] — Unix socket delivery layer and frame assembly

/// Re-export byte-sequence types.
pub mod bytes {
    pub use wirecall_bytes::*;
}

/// Re-export binary codec types.
pub mod codec {
    pub use wirecall_codec::*;
}

/// Re-export streaming JSON types.
pub mod json {
    pub use wirecall_json::*;
}

/// Re-export protocol types.
pub mod proto {
    pub use wirecall_proto::*;
}

/// Re-export multiplexer types.
pub mod mux {
    pub use wirecall_mux::*;
}

/// Re-export transport types.
pub mod transport {
    pub use wirecall_transport::*;
}
