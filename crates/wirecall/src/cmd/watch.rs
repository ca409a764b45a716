use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use wirecall_mux::Multiplexer;
use wirecall_proto::CallError;
use wirecall_transport::{
    DeliveryConfig, FrameReader, FrameWriter, SocketListener, TransportError,
};

use crate::cmd::{parse_duration, WatchArgs};
use crate::exit::{call_error, mux_error, transport_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_response, OutputFormat};

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let config = DeliveryConfig {
        read_timeout: Some(timeout),
        write_timeout: Some(timeout),
        ..Default::default()
    };

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

    let pushes: Rc<RefCell<Vec<Vec<u8>>>> = Rc::new(RefCell::new(Vec::new()));
    let failure: Rc<RefCell<Option<CallError>>> = Rc::new(RefCell::new(None));
    let started = Instant::now();

    let route = args.route;
    let payload = args.data.clone().unwrap_or_default();
    let pushes_slot = Rc::clone(&pushes);
    let failure_slot = Rc::clone(&failure);

    let id = mux
        .subscribe(
            route,
            |w| {
                w.put_text(&payload);
                Ok(())
            },
            |r| Ok(r.tail().to_vec()),
            move |result: Result<Vec<u8>, CallError>| match result {
                Ok(push) => pushes_slot.borrow_mut().push(push),
                Err(err) => {
                    *failure_slot.borrow_mut() = Some(err);
                }
            },
        )
        .map_err(|err| mux_error("subscribe failed", err))?;

    let mut printed = 0usize;
    while printed < args.count && failure.borrow().is_none() {
        match reader.read_frame() {
            Ok(frame) => mux.on_frame(&frame).map_err(|err| {
                CliError::new(DATA_INVALID, format!("bad inbound frame: {err}"))
            })?,
            Err(TransportError::ConnectionClosed) => {
                mux.on_inactive();
                break;
            }
            Err(err) => return Err(transport_error("receive failed", err)),
        }
        for push in pushes.borrow_mut().drain(..) {
            print_response(route, id, &push, started.elapsed().as_millis(), format);
            printed += 1;
        }
    }

    if mux.connected() {
        mux.unsubscribe(id);
    }

    if let Some(err) = failure.borrow_mut().take() {
        return Err(call_error("subscription failed", err));
    }
    Ok(SUCCESS)
}
