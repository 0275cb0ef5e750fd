use hex::FromHexError;

use crate::exit::{CliError, CliResult, USAGE};

/// Parse a hex byte string. Whitespace, `:`, `-` and `,` separators and
/// `0x` prefixes are accepted (`"7e 41 42"`, `"7E:41:42"`, `"0x7e0x41"`).
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input
        .split(|c: char| c.is_whitespace() || c == ':' || c == '-' || c == ',')
        .flat_map(|chunk| chunk.split("0x").flat_map(|c| c.split("0X")))
        .collect();

    hex::decode(&digits).map_err(|err| match err {
        FromHexError::OddLength => CliError::new(
            USAGE,
            format!("hex input has an odd number of digits: {input}"),
        ),
        FromHexError::InvalidHexCharacter { c, .. } => {
            CliError::new(USAGE, format!("invalid hex digit '{c}' in input"))
        }
        other => CliError::new(USAGE, format!("invalid hex input: {other}")),
    })
}

/// Space-separated lowercase hex, as printed in frame listings.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .chunks(1)
        .map(hex::encode)
        .collect::<Vec<_>>()
        .join(" ")
}
