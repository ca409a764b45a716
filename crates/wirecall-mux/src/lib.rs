//! Client-side request multiplexing for wirecall.
//!
//! A [`Multiplexer`] owns one connection's table of in-flight requests,
//! keyed by small reused integer ids. Plain calls occupy a slot until their
//! first response; subscriptions keep theirs across pushed frames until
//! unsubscribed or the connection goes away. All state lives behind `&mut
//! self` on the connection's own sequential context, so there is no locking
//! anywhere in this layer.

pub mod error;
pub mod mux;
mod slots;

pub use error::{MuxError, Result};
pub use mux::{LinkState, Multiplexer};
