use std::fs::File;
use std::io::{self, Read};

use hdlclink_frame::{FrameConfig, FrameError, FrameReader};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::hexstr::parse_hex;
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, config: FrameConfig, format: OutputFormat) -> CliResult<i32> {
    let found = if let Some(hex) = &args.hex {
        let wire = parse_hex(hex)?;
        decode_stream(wire.as_slice(), &args, config, format)?
    } else if let Some(path) = &args.file {
        let file = File::open(path)
            .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
        decode_stream(file, &args, config, format)?
    } else {
        decode_stream(io::stdin().lock(), &args, config, format)?
    };

    if let Some(expected) = args.expect {
        if found < expected {
            return Err(CliError::new(
                DATA_INVALID,
                format!("expected {expected} frame(s), decoded {found}"),
            ));
        }
    }

    Ok(SUCCESS)
}

fn decode_stream<R: Read>(
    input: R,
    args: &DecodeArgs,
    config: FrameConfig,
    format: OutputFormat,
) -> CliResult<usize> {
    let mut reader = FrameReader::with_config(input, config)
        .map_err(|err| frame_error("invalid frame configuration", err))?;

    let mut printed = 0usize;
    loop {
        if args.count.is_some_and(|count| printed >= count) {
            break;
        }

        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => return Err(frame_error("read failed", err)),
        };

        print_frame(&frame, printed, format);
        printed = printed.saturating_add(1);
    }

    let stats = reader.stats();
    tracing::debug!(
        frames = stats.frames,
        crc_errors = stats.crc_errors,
        overflows = stats.overflows,
        aborted_escapes = stats.aborted_escapes,
        runts = stats.runts,
        "decode finished"
    );
    if stats.dropped() > 0 {
        tracing::warn!(dropped = stats.dropped(), "stream contained invalid frames");
    }

    Ok(printed)
}
