use std::fs;

use hdlclink_frame::{crc, encode_to_vec, FrameConfig, FrameError, MIN_FRAME_CAPACITY};

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::hexstr::to_hex;
use crate::output::{fcs_string, print_encoded, EncodedOutput, OutputFormat};

pub fn run(args: EncodeArgs, config: FrameConfig, format: OutputFormat) -> CliResult<i32> {
    if config.max_frame_length < MIN_FRAME_CAPACITY {
        return Err(frame_error(
            "invalid frame configuration",
            FrameError::InvalidCapacity {
                capacity: config.max_frame_length,
                min: MIN_FRAME_CAPACITY,
            },
        ));
    }

    let payload = args.payload.resolve()?;

    let max = config.max_payload();
    if payload.len() > max {
        return Err(frame_error(
            "encode failed",
            FrameError::PayloadTooLarge {
                size: payload.len(),
                max,
            },
        ));
    }

    let wire = encode_to_vec(&payload);
    tracing::debug!(
        payload_len = payload.len(),
        wire_len = wire.len(),
        "payload framed"
    );

    let summary = EncodedOutput {
        event: "encoded",
        payload_len: payload.len(),
        fcs: fcs_string(crc::compute(&payload)),
        wire_len: wire.len(),
        wire_hex: to_hex(&wire),
    };

    if let Some(path) = &args.out {
        fs::write(path, &wire)
            .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;
        if format != OutputFormat::Raw {
            print_encoded(&summary, &wire, format);
        }
        return Ok(SUCCESS);
    }

    print_encoded(&summary, &wire, format);
    Ok(SUCCESS)
}
