use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use clap::builder::RangedU64ValueParser;
use kankaku_frame::{DeviceDimensions, DEFAULT_READ_CHUNK_SIZE, MAX_READ_CHUNK_SIZE};
use kankaku_ink::{InkSink, Stroke, TouchEvent};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::{print_dimensions, print_update, OutputFormat};

pub mod decode;
pub mod replay;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to the touchpad daemon and print touch events.
    Watch(WatchArgs),
    /// Decode a captured touchpad byte stream.
    Decode(DecodeArgs),
    /// Serve a captured stream to one client, like the daemon would.
    Replay(ReplayArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Watch(args) => watch::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Replay(args) => replay::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Channel path (Unix socket, or named pipe on Windows). Defaults to the
    /// daemon's well-known path.
    pub path: Option<PathBuf>,
    /// Exit after printing N events.
    #[arg(long)]
    pub count: Option<usize>,
    /// Bytes requested per channel read.
    #[arg(long, default_value_t = DEFAULT_READ_CHUNK_SIZE, value_parser = chunk_size_parser())]
    pub chunk_size: usize,
    /// How long to keep retrying while the daemon is not up (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub connect_timeout: String,
    /// How often a blocked read wakes up to check for Ctrl-C.
    #[arg(long, default_value = "250ms")]
    pub poll_interval: String,
    /// Print only the end-of-session summary.
    #[arg(long)]
    pub summary_only: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file, or `-` for stdin.
    pub input: PathBuf,
    /// Bytes requested per read.
    #[arg(long, default_value_t = DEFAULT_READ_CHUNK_SIZE, value_parser = chunk_size_parser())]
    pub chunk_size: usize,
    /// Print only the end-of-session summary.
    #[arg(long)]
    pub summary_only: bool,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Capture file to serve.
    pub input: PathBuf,
    /// Socket path to bind.
    pub socket: PathBuf,
    /// Pause between contact records (e.g. 8ms, 0s).
    #[arg(long, default_value = "0ms")]
    pub interval: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Prints everything a session produces and decides when to stop.
pub struct EventPrinter {
    format: OutputFormat,
    quiet: bool,
    limit: Option<usize>,
    printed: usize,
    running: Option<Arc<AtomicBool>>,
}

impl EventPrinter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self {
            format,
            quiet,
            limit: None,
            printed: 0,
            running: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_stop_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = Some(running);
        self
    }
}

impl InkSink for EventPrinter {
    fn on_dimensions(&mut self, dims: DeviceDimensions) {
        if !self.quiet {
            print_dimensions(dims, self.format);
        }
    }

    fn on_update(&mut self, event: &TouchEvent, stroke: Option<&Stroke>) {
        if !self.quiet {
            print_update(event, stroke, self.format);
        }
        self.printed = self.printed.saturating_add(1);
    }

    fn keep_going(&self) -> bool {
        let running = self
            .running
            .as_ref()
            .is_none_or(|flag| flag.load(Ordering::SeqCst));
        running && self.limit.is_none_or(|limit| self.printed < limit)
    }
}

fn chunk_size_parser() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(1..=MAX_READ_CHUNK_SIZE as u64)
}

/// Parse `5s`, `250ms` or a bare number of seconds.
pub fn parse_duration(input: &str, allow_zero: bool) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input}")))?;
    if value == 0 && !allow_zero {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use kankaku_frame::ContactSample;

    use super::*;

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("5s", false).unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("2", false).unwrap(), Duration::from_secs(2));
        assert_eq!(
            parse_duration("150ms", false).unwrap(),
            Duration::from_millis(150)
        );
    }

    #[test]
    fn parse_duration_rejects_bad_input() {
        assert!(parse_duration("0s", false).is_err());
        assert!(parse_duration("", true).is_err());
        assert!(parse_duration("soon", true).is_err());
        assert_eq!(parse_duration("0ms", true).unwrap(), Duration::ZERO);
    }

    #[test]
    fn printer_stops_at_limit_or_flag() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut printer = EventPrinter::new(OutputFormat::Json, true)
            .with_limit(Some(2))
            .with_stop_flag(flag.clone());
        let event = TouchEvent::Down(ContactSample::new(1, true, 0, 0));

        assert!(printer.keep_going());
        printer.on_update(&event, None);
        assert!(printer.keep_going());
        flag.store(false, Ordering::SeqCst);
        assert!(!printer.keep_going());

        flag.store(true, Ordering::SeqCst);
        printer.on_update(&event, None);
        assert!(!printer.keep_going());
    }
}
