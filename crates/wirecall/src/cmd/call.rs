use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use std::time::Instant;

use wirecall_mux::Multiplexer;
use wirecall_proto::CallError;
use wirecall_transport::{
    DeliveryConfig, FrameReader, FrameWriter, SocketListener, TransportError,
};

use crate::cmd::{parse_duration, CallArgs};
use crate::exit::{call_error, mux_error, transport_error, CliError, CliResult, DATA_INVALID, INTERNAL, SUCCESS};
use crate::output::{print_response, OutputFormat};

pub fn run(args: CallArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let config = DeliveryConfig {
        read_timeout: Some(timeout),
        write_timeout: Some(timeout),
        ..Default::default()
    };

    let payload = resolve_payload(&args)?;

    let stream = SocketListener::connect(&args.path)
        .map_err(|err| transport_error("connect failed", err))?;
    let reader_stream = stream
        .try_clone()
        .map_err(|err| transport_error("connect failed", err))?;
    let mut reader = FrameReader::with_config_stream(reader_stream, config.clone())
        .map_err(|err| transport_error("connect failed", err))?;
    let writer = FrameWriter::with_config_stream(stream, config)
        .map_err(|err| transport_error("connect failed", err))?;

    let mut mux = Multiplexer::new(writer);
    mux.on_active();

    let outcome: Rc<RefCell<Option<Result<Vec<u8>, CallError>>>> = Rc::new(RefCell::new(None));
    let outcome_slot = Rc::clone(&outcome);
    let started = Instant::now();

    let request_id = mux
        .call(
            args.route,
            |w| {
                w.put_text(&payload);
                Ok(())
            },
            |r| Ok(r.tail().to_vec()),
            move |result| {
                *outcome_slot.borrow_mut() = Some(result);
            },
        )
        .map_err(|err| mux_error("call failed", err))?;

    while outcome.borrow().is_none() {
        match reader.read_frame() {
            Ok(frame) => mux.on_frame(&frame).map_err(|err| {
                CliError::new(DATA_INVALID, format!("bad inbound frame: {err}"))
            })?,
            Err(TransportError::ConnectionClosed) => mux.on_inactive(),
            Err(err) => return Err(transport_error("receive failed", err)),
        }
    }

    match outcome.borrow_mut().take() {
        Some(Ok(result)) => {
            print_response(
                args.route,
                request_id,
                &result,
                started.elapsed().as_millis(),
                format,
            );
            Ok(SUCCESS)
        }
        Some(Err(err)) => Err(call_error("call failed", err)),
        None => Err(CliError::new(INTERNAL, "call completed without an outcome")),
    }
}

fn resolve_payload(args: &CallArgs) -> CliResult<String> {
    if let Some(data) = &args.data {
        return Ok(data.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        });
    }
    Ok(String::new())
}
