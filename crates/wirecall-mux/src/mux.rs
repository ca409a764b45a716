use std::time::{Duration, Instant};

use wirecall_codec::{Result as CodecResult, WireReader, WireWriter};
use wirecall_proto::{frame, CallError, FrameSink, ResponseBody};

use crate::error::{MuxError, Result};
use crate::slots::{Completion, PendingRequest, SlotTable};

/// Connection lifecycle as seen by the multiplexer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connected,
    Closed,
}

/// Per-connection request multiplexer.
///
/// Outbound calls are assigned a slot id, framed, and handed to the
/// [`FrameSink`]; inbound frames are resolved against the slot table and
/// dispatched to the stored completion. The delivery layer drives the three
/// events [`on_active`], [`on_inactive`], and [`on_frame`].
///
/// [`on_active`]: Self::on_active
/// [`on_inactive`]: Self::on_inactive
/// [`on_frame`]: Self::on_frame
pub struct Multiplexer<S> {
    sink: S,
    state: LinkState,
    slots: SlotTable,
    last_activity: Instant,
    stray_frames: u64,
}

impl<S: FrameSink> Multiplexer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: LinkState::Disconnected,
            slots: SlotTable::new(),
            last_activity: Instant::now(),
            stray_frames: 0,
        }
    }

    /// The transport reports the connection established.
    pub fn on_active(&mut self) {
        self.state = LinkState::Connected;
        self.last_activity = Instant::now();
        tracing::debug!("connection active");
    }

    /// The transport reports the connection gone. Every live entry,
    /// subscriptions included, receives `ConnectionClosed` exactly once and
    /// the table is cleared. The multiplexer accepts no further work.
    pub fn on_inactive(&mut self) {
        if self.state == LinkState::Closed {
            return;
        }
        self.state = LinkState::Closed;
        let entries = self.slots.drain();
        let aborted = entries.len();
        for mut entry in entries {
            (entry.handler)(Err(CallError::ConnectionClosed));
        }
        tracing::debug!(aborted, "connection closed");
    }

    /// One complete inbound frame payload (request id included, length
    /// prefix already stripped).
    ///
    /// Frames for unknown ids are dropped and counted, not fatal: a late
    /// response to an already-unsubscribed or completed id is expected
    /// traffic. An undecodable envelope is an error on the connection.
    pub fn on_frame(&mut self, payload: &[u8]) -> CodecResult<()> {
        self.last_activity = Instant::now();
        let response = frame::read_response(payload)?;
        let id = response.request_id;
        let Some(entry) = self.slots.get_mut(id) else {
            self.stray_frames += 1;
            tracing::debug!(request_id = id, "dropping frame for unknown request id");
            return Ok(());
        };
        let is_push = entry.is_push;
        match response.body {
            ResponseBody::Success(result) => (entry.handler)(Ok(result)),
            ResponseBody::Failure { code, message } => {
                (entry.handler)(Err(CallError::from_wire(code, message)));
            }
        }
        if !is_push {
            self.slots.remove(id);
        }
        Ok(())
    }

    /// Invoke `route` once. The argument writer appends into the call frame;
    /// on response, `decoder` runs over the result bytes and `on_complete`
    /// receives the outcome. Returns the assigned request id.
    pub fn call<A, T, D, H>(&mut self, route: u64, args: A, decoder: D, on_complete: H) -> Result<u64>
    where
        A: FnOnce(&mut WireWriter) -> CodecResult<()>,
        D: FnMut(&mut WireReader<'_>) -> CodecResult<T> + 'static,
        H: FnOnce(std::result::Result<T, CallError>) + 'static,
    {
        self.submit(
            route,
            args,
            PendingRequest {
                handler: fuse_once(decoder, on_complete),
                is_push: false,
            },
        )
    }

    /// Invoke `route` as a push subscription: the slot stays live and
    /// `on_push` fires once per inbound frame until [`unsubscribe`] or the
    /// connection closes.
    ///
    /// [`unsubscribe`]: Self::unsubscribe
    pub fn subscribe<A, T, D, H>(&mut self, route: u64, args: A, decoder: D, on_push: H) -> Result<u64>
    where
        A: FnOnce(&mut WireWriter) -> CodecResult<()>,
        D: FnMut(&mut WireReader<'_>) -> CodecResult<T> + 'static,
        H: FnMut(std::result::Result<T, CallError>) + 'static,
    {
        self.submit(
            route,
            args,
            PendingRequest {
                handler: fuse_push(decoder, on_push),
                is_push: true,
            },
        )
    }

    /// Release a subscription's local slot. No message is sent to the peer,
    /// so frames it keeps pushing for this id are dropped as stray.
    pub fn unsubscribe(&mut self, id: u64) -> bool {
        let removed = self.slots.remove(id).is_some();
        if removed {
            tracing::debug!(request_id = id, "subscription released");
        }
        removed
    }

    /// Ask the delivery layer to shut the connection down. The transition
    /// to `Closed` arrives through [`on_inactive`](Self::on_inactive).
    pub fn close(&mut self) -> Result<()> {
        if self.state == LinkState::Closed {
            return Ok(());
        }
        self.sink.shutdown().map_err(MuxError::Sink)
    }

    pub fn connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Elapsed time since the last inbound activity, for an external
    /// watchdog. This layer itself never times a request out.
    pub fn response_timer(&self) -> Duration {
        self.last_activity.elapsed()
    }

    pub fn pending_requests(&self) -> usize {
        self.slots.live()
    }

    /// Inbound frames dropped because no slot matched their request id.
    pub fn stray_frames(&self) -> u64 {
        self.stray_frames
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn submit<A>(&mut self, route: u64, args: A, entry: PendingRequest) -> Result<u64>
    where
        A: FnOnce(&mut WireWriter) -> CodecResult<()>,
    {
        match self.state {
            LinkState::Connected => {}
            LinkState::Disconnected => return Err(MuxError::NotConnected),
            LinkState::Closed => return Err(MuxError::Closed),
        }
        let id = self.slots.insert(entry);
        let frame = match frame::write_call(id, route, args) {
            Ok(frame) => frame,
            Err(err) => {
                self.slots.remove(id);
                return Err(MuxError::Encode(err));
            }
        };
        if let Err(err) = self.sink.send_frame(&frame) {
            self.slots.remove(id);
            return Err(MuxError::Sink(err));
        }
        tracing::trace!(request_id = id, route, bytes = frame.len(), "call frame sent");
        Ok(id)
    }
}

/// Fuse decoder and one-shot completion into the stored slot closure. The
/// `Option` guards against a second invocation ever reaching the caller.
fn fuse_once<T, D, H>(mut decoder: D, on_complete: H) -> Completion
where
    D: FnMut(&mut WireReader<'_>) -> CodecResult<T> + 'static,
    H: FnOnce(std::result::Result<T, CallError>) + 'static,
{
    let mut on_complete = Some(on_complete);
    Box::new(move |outcome| {
        let Some(on_complete) = on_complete.take() else {
            return;
        };
        match outcome {
            Ok(bytes) => {
                let mut reader = WireReader::new(bytes);
                match decoder(&mut reader) {
                    Ok(value) => on_complete(Ok(value)),
                    Err(err) => on_complete(Err(CallError::Decode(err))),
                }
            }
            Err(err) => on_complete(Err(err)),
        }
    })
}

fn fuse_push<T, D, H>(mut decoder: D, mut on_push: H) -> Completion
where
    D: FnMut(&mut WireReader<'_>) -> CodecResult<T> + 'static,
    H: FnMut(std::result::Result<T, CallError>) + 'static,
{
    Box::new(move |outcome| match outcome {
        Ok(bytes) => {
            let mut reader = WireReader::new(bytes);
            match decoder(&mut reader) {
                Ok(value) => on_push(Ok(value)),
                Err(err) => on_push(Err(CallError::Decode(err))),
            }
        }
        Err(err) => on_push(Err(err)),
    })
}
