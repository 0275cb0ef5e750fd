use hdlclink_frame::crc;

use crate::cmd::CrcArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{fcs_string, print_checksum, ChecksumOutput, OutputFormat};

pub fn run(args: CrcArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = args.payload.resolve()?;

    let out = ChecksumOutput {
        event: "crc",
        algorithm: "CRC-16/CCITT-FALSE",
        len: payload.len(),
        fcs: fcs_string(crc::compute(&payload)),
    };
    print_checksum(&out, format);

    Ok(SUCCESS)
}
