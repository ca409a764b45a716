use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use wirecall_codec::{WireReader, WireWriter};
use wirecall_proto::{read_call, Call, ResponseCode};
use wirecall_transport::{FrameReader, FrameWriter, SocketListener, TransportError, WireStream};

use crate::cmd::{parse_duration, ServeArgs};
use crate::exit::{transport_error, CliError, CliResult, INTERNAL, SUCCESS};

/// Demo route table.
pub const ROUTE_ECHO: u64 = 1;
pub const ROUTE_REVERSE: u64 = 2;
pub const ROUTE_TICKER: u64 = 3;
pub const ROUTE_LOOKUP: u64 = 4;

pub fn run(args: ServeArgs) -> CliResult<i32> {
    let tick_interval = parse_duration(&args.tick_interval)?;
    let listener =
        SocketListener::bind(&args.path).map_err(|err| transport_error("bind failed", err))?;
    info!(path = ?args.path, "serving demo routes");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    while running.load(Ordering::SeqCst) {
        let stream = match listener.accept() {
            Ok(stream) => stream,
            Err(err) => return Err(transport_error("accept failed", err)),
        };
        if let Err(err) = serve_connection(stream, tick_interval) {
            warn!(error = %err, "connection ended with error");
        }
    }

    Ok(SUCCESS)
}

fn serve_connection(
    stream: WireStream,
    tick_interval: Duration,
) -> wirecall_transport::Result<()> {
    let writer_stream = stream.try_clone()?;
    let mut reader = FrameReader::new(stream);
    let mut writer = FrameWriter::new(writer_stream);

    loop {
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(TransportError::ConnectionClosed) => {
                debug!("peer disconnected");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let call = match read_call(&frame) {
            Ok(call) => call,
            Err(err) => {
                warn!(error = %err, "dropping undecodable call frame");
                continue;
            }
        };
        dispatch(&mut writer, call, tick_interval)?;
    }
}

fn dispatch(
    writer: &mut FrameWriter<WireStream>,
    call: Call<'_>,
    tick_interval: Duration,
) -> wirecall_transport::Result<()> {
    debug!(request_id = call.request_id, route = call.route, "dispatching call");

    let text = match WireReader::new(call.args).read_text() {
        Ok(text) => text,
        Err(err) => {
            return send_failure(
                writer,
                call.request_id,
                ResponseCode::InvalidArgs,
                &format!("argument must be a length-prefixed string: {err}"),
            );
        }
    };

    match call.route {
        ROUTE_ECHO => send_text(writer, call.request_id, &text),
        ROUTE_REVERSE => {
            let reversed: String = text.chars().rev().collect();
            send_text(writer, call.request_id, &reversed)
        }
        ROUTE_TICKER => {
            // Push one frame per tick on the same request id; the slot on
            // the client side stays live between pushes.
            let ticks: u64 = text.parse().unwrap_or(5);
            for tick in 0..ticks {
                let mut body = WireWriter::new();
                body.put_varint(call.request_id);
                body.put_u8(ResponseCode::Success.to_wire());
                body.put_text(&format!("tick {tick}"));
                writer.send(&body.freeze())?;
                std::thread::sleep(tick_interval);
            }
            Ok(())
        }
        ROUTE_LOOKUP => match lookup(&text) {
            Lookup::Found(value) => send_text(writer, call.request_id, value),
            Lookup::Missing => send_failure(
                writer,
                call.request_id,
                ResponseCode::NotFound,
                &format!("no entry for key {text:?}"),
            ),
            Lookup::Restricted => send_failure(
                writer,
                call.request_id,
                ResponseCode::NoPermission,
                &format!("key {text:?} is restricted"),
            ),
        },
        unknown => send_failure(
            writer,
            call.request_id,
            ResponseCode::NoRoute,
            &format!("no route {unknown}"),
        ),
    }
}

enum Lookup {
    Found(&'static str),
    Missing,
    Restricted,
}

fn lookup(key: &str) -> Lookup {
    match key {
        "motd" => Lookup::Found("local sockets are fast"),
        "protocol" => Lookup::Found("wirecall/1"),
        "secret" => Lookup::Restricted,
        _ => Lookup::Missing,
    }
}

fn send_text(
    writer: &mut FrameWriter<WireStream>,
    request_id: u64,
    text: &str,
) -> wirecall_transport::Result<()> {
    let mut body = WireWriter::new();
    body.put_varint(request_id);
    body.put_u8(ResponseCode::Success.to_wire());
    body.put_text(text);
    writer.send(&body.freeze())
}

fn send_failure(
    writer: &mut FrameWriter<WireStream>,
    request_id: u64,
    code: ResponseCode,
    message: &str,
) -> wirecall_transport::Result<()> {
    let frame = wirecall_proto::write_err_response(request_id, code, message);
    writer.send(&frame)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(INTERNAL, format!("signal handler setup failed: {err}"))
    })
}
