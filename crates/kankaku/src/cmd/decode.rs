use std::fs::File;
use std::io::Read;

use kankaku_frame::{FrameConfig, FrameReader};
use kankaku_transport::ReadSource;

use crate::cmd::{DecodeArgs, EventPrinter};
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_summary, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = FrameConfig {
        read_chunk_size: args.chunk_size,
        ..FrameConfig::default()
    };
    let mut printer = EventPrinter::new(format, args.summary_only);

    if args.input.as_os_str() == "-" {
        decode(std::io::stdin().lock(), config, &mut printer, format)
    } else {
        let file = File::open(&args.input).map_err(|err| {
            io_error(&format!("failed opening {}", args.input.display()), err)
        })?;
        decode(file, config, &mut printer, format)
    }
}

fn decode<R: Read>(
    input: R,
    config: FrameConfig,
    printer: &mut EventPrinter,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut reader = FrameReader::with_config(ReadSource::new(input), config);
    let (session, end) =
        kankaku_ink::run(&mut reader, printer).map_err(|err| frame_error("decode failed", err))?;
    print_summary(&session, end, format);
    Ok(SUCCESS)
}
