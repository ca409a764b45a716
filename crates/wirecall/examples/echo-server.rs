//! Minimal route server: echoes the text argument back on route 1.
//!
//! Run with `cargo run --example echo-server -- /tmp/wirecall-echo.sock`,
//! then call it with `wirecall call /tmp/wirecall-echo.sock 1 --data hi`.

use wirecall::codec::{WireReader, WireWriter};
use wirecall::proto::{read_call, write_err_response, ResponseCode};
use wirecall::transport::{FrameReader, FrameWriter, SocketListener, TransportError};

const ROUTE_ECHO: u64 = 1;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/tmp/wirecall-echo.sock".to_string());
    let listener = SocketListener::bind(&path)?;
    eprintln!("listening on {path}");

    loop {
        let stream = listener.accept()?;
        let writer_stream = stream.try_clone()?;
        let mut reader = FrameReader::new(stream);
        let mut writer = FrameWriter::new(writer_stream);

        loop {
            let frame = match reader.read_frame() {
                Ok(frame) => frame,
                Err(TransportError::ConnectionClosed) => break,
                Err(err) => return Err(err.into()),
            };
            let call = read_call(&frame)?;

            if call.route != ROUTE_ECHO {
                writer.send(&write_err_response(
                    call.request_id,
                    ResponseCode::NoRoute,
                    &format!("no route {}", call.route),
                ))?;
                continue;
            }

            let text = WireReader::new(call.args).read_text()?;
            let mut body = WireWriter::new();
            body.put_varint(call.request_id);
            body.put_u8(ResponseCode::Success.to_wire());
            body.put_text(&text);
            writer.send(&body.freeze())?;
        }
    }
}
