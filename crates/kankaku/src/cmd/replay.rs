use crate::cmd::ReplayArgs;
use crate::exit::CliResult;

#[cfg(unix)]
pub fn run(args: ReplayArgs) -> CliResult<i32> {
    use std::fs::File;

    use kankaku_frame::{FrameReader, FrameWriter};
    use kankaku_transport::{ReadSource, UnixDomainSocket};
    use tracing::info;

    use crate::cmd::parse_duration;
    use crate::exit::{frame_error, io_error, transport_error, SUCCESS};

    let interval = parse_duration(&args.interval, true)?;
    let file = File::open(&args.input)
        .map_err(|err| io_error(&format!("failed opening {}", args.input.display()), err))?;
    let mut capture = FrameReader::new(ReadSource::new(file));
    let dims = capture
        .read_dimensions()
        .map_err(|err| frame_error("capture header", err))?;

    let listener =
        UnixDomainSocket::bind(&args.socket).map_err(|err| transport_error("bind failed", err))?;
    let stream = listener
        .accept()
        .map_err(|err| transport_error("accept failed", err))?;
    let mut writer = FrameWriter::new(stream);
    writer
        .write_dimensions(dims)
        .map_err(|err| frame_error("send failed", err))?;

    let mut sent = 0usize;
    for sample in capture.samples() {
        let sample = sample.map_err(|err| frame_error("capture read failed", err))?;
        writer
            .write_contact(&sample)
            .map_err(|err| frame_error("send failed", err))?;
        sent += 1;
        if !interval.is_zero() {
            std::thread::sleep(interval);
        }
    }

    info!(sent, width = dims.width, height = dims.height, "capture replayed");
    Ok(SUCCESS)
}

#[cfg(not(unix))]
pub fn run(_args: ReplayArgs) -> CliResult<i32> {
    Err(crate::exit::CliError::new(
        crate::exit::USAGE,
        "replay needs Unix domain sockets; the named pipe server belongs to the daemon",
    ))
}
