mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "kankaku", version, about = "Touchpad ink client")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_watch_with_defaults() {
        let cli = Cli::try_parse_from(["kankaku", "watch"]).expect("watch args should parse");
        match cli.command {
            Command::Watch(args) => {
                assert!(args.path.is_none());
                assert_eq!(args.chunk_size, kankaku_frame::DEFAULT_READ_CHUNK_SIZE);
                assert_eq!(args.poll_interval, "250ms");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_decode_from_stdin() {
        let cli = Cli::try_parse_from(["kankaku", "--format", "json", "decode", "-"])
            .expect("decode args should parse");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.command, Command::Decode(ref args) if args.input.as_os_str() == "-"));
    }

    #[test]
    fn chunk_size_is_bounded() {
        let err = Cli::try_parse_from([
            "kankaku",
            "decode",
            "-",
            "--chunk-size",
            "18446744073709551615",
        ])
        .expect_err("oversized chunk size should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let err = Cli::try_parse_from(["kankaku", "watch", "--chunk-size", "0"])
            .expect_err("zero chunk size should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let cli = Cli::try_parse_from(["kankaku", "decode", "-", "--chunk-size", "65536"])
            .expect("largest chunk size should parse");
        assert!(matches!(cli.command, Command::Decode(ref args) if args.chunk_size == 65536));
    }

    #[test]
    fn replay_requires_socket() {
        let err = Cli::try_parse_from(["kankaku", "replay", "capture.bin"])
            .expect_err("missing socket should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
