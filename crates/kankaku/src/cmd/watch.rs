use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use kankaku_frame::{FrameConfig, FrameReader};
use kankaku_ink::{open, pump, InkSink};
use kankaku_transport::{connect, default_channel_path, IpcStream, TransportError};

use crate::cmd::{parse_duration, EventPrinter, WatchArgs};
use crate::exit::{
    frame_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS, TIMEOUT,
};
use crate::output::{print_summary, OutputFormat};

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let connect_timeout = parse_duration(&args.connect_timeout, false)?;
    let poll_interval = parse_duration(&args.poll_interval, false)?;
    let path = args.path.unwrap_or_else(default_channel_path);

    let stream = connect_with_timeout(&path, connect_timeout)?;
    let config = FrameConfig {
        read_chunk_size: args.chunk_size,
        read_timeout: Some(poll_interval),
    };
    let mut reader = FrameReader::from_ipc(stream, config)
        .map_err(|err| frame_error("channel setup failed", err))?;

    // Until the header arrives, Ctrl-C keeps its default behavior.
    let mut session = open(&mut reader).map_err(|err| frame_error("device header", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printer = EventPrinter::new(format, args.summary_only)
        .with_limit(args.count)
        .with_stop_flag(running);
    printer.on_dimensions(session.dimensions());

    let end = pump(&mut reader, &mut session, &mut printer)
        .map_err(|err| frame_error("session failed", err))?;
    print_summary(&session, end, format);
    Ok(SUCCESS)
}

fn connect_with_timeout(path: &Path, timeout: Duration) -> CliResult<IpcStream> {
    let start = Instant::now();
    loop {
        match connect(path) {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                if !is_retryable_connect_error(&err) {
                    return Err(transport_error("connect failed", err));
                }
                if start.elapsed() >= timeout {
                    return Err(CliError::new(
                        TIMEOUT,
                        format!("no touchpad daemon at {} after {timeout:?}", path.display()),
                    ));
                }
                std::thread::sleep(Duration::from_millis(50));
            }
        }
    }
}

fn is_retryable_connect_error(err: &TransportError) -> bool {
    match err {
        TransportError::Connect { source, .. } => matches!(
            source.kind(),
            std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused
        ),
        _ => false,
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
