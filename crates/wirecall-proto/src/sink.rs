use std::io;

/// Outbound half of the delivery layer as the multiplexer sees it.
///
/// One `send_frame` call emits one complete frame: the implementation owns
/// the length prefix and must never interleave two payloads.
pub trait FrameSink {
    fn send_frame(&mut self, payload: &[u8]) -> io::Result<()>;

    /// Ask the delivery layer to shut the connection down. Completion is
    /// reported back through the connection-inactive event, not here.
    fn shutdown(&mut self) -> io::Result<()>;
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn send_frame(&mut self, payload: &[u8]) -> io::Result<()> {
        (**self).send_frame(payload)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        (**self).shutdown()
    }
}
