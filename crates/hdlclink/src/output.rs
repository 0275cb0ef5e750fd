use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use hdlclink_frame::Frame;
use serde::Serialize;

use crate::hexstr::to_hex;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    event: &'a str,
    index: usize,
    payload_len: usize,
    raw_len: usize,
    fcs: String,
    payload: String,
    payload_hex: String,
}

#[derive(Serialize)]
pub struct EncodedOutput {
    pub event: &'static str,
    pub payload_len: usize,
    pub fcs: String,
    pub wire_len: usize,
    pub wire_hex: String,
}

#[derive(Serialize)]
pub struct ChecksumOutput {
    pub event: &'static str,
    pub algorithm: &'static str,
    pub len: usize,
    pub fcs: String,
}

pub fn print_frame(frame: &Frame, index: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                event: "frame",
                index,
                payload_len: frame.payload_len(),
                raw_len: frame.raw_len(),
                fcs: fcs_string(frame.fcs()),
                payload: payload_preview(frame.payload()),
                payload_hex: to_hex(frame.payload()),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "SIZE", "RAW", "FCS", "PAYLOAD"])
                .add_row(vec![
                    index.to_string(),
                    frame.payload_len().to_string(),
                    frame.raw_len().to_string(),
                    fcs_string(frame.fcs()),
                    payload_preview(frame.payload()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "frame={} size={} raw={} fcs={} payload={}",
                index,
                frame.payload_len(),
                frame.raw_len(),
                fcs_string(frame.fcs()),
                payload_preview(frame.payload())
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.payload());
        }
    }
}

pub fn print_encoded(out: &EncodedOutput, wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PAYLOAD", "FCS", "WIRE", "BYTES"])
                .add_row(vec![
                    out.payload_len.to_string(),
                    out.fcs.clone(),
                    out.wire_len.to_string(),
                    out.wire_hex.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", out.wire_hex),
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_checksum(out: &ChecksumOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("{} ({} bytes): {}", out.algorithm, out.len, out.fcs);
        }
        OutputFormat::Raw => println!("{}", out.fcs),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn fcs_string(fcs: u16) -> String {
    format!("{fcs:#06x}")
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) if !text.chars().any(char::is_control) => text.to_string(),
        _ => format!("<binary {} bytes>", payload.len()),
    }
}
