use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use smppio_codec::Pdu;

#[derive(Clone, Debug, Copy, ValueEnum)]
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
struct PduOutput<'a> {
    command: String,
    command_id: String,
    status: u32,
    sequence: u32,
    body_size: usize,
    body: String,
    peer: &'a str,
    timestamp: String,
}

pub fn print_pdu(pdu: &Pdu, peer: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = PduOutput {
                command: command_name(pdu.command_id),
                command_id: format!("{:#010x}", pdu.command_id),
                status: pdu.command_status,
                sequence: pdu.sequence_number,
                body_size: pdu.body.len(),
                body: body_preview(pdu.body.as_ref()),
                peer,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COMMAND", "STATUS", "SEQ", "PEER", "BODY"])
                .add_row(vec![
                    command_name(pdu.command_id),
                    pdu.command_status.to_string(),
                    pdu.sequence_number.to_string(),
                    peer.to_string(),
                    body_preview(pdu.body.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "command={} ({:#010x}) status={} seq={} peer={} body={}",
                command_name(pdu.command_id),
                pdu.command_id,
                pdu.command_status,
                pdu.sequence_number,
                peer,
                body_preview(pdu.body.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(pdu.body.as_ref());
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn command_name(command_id: u32) -> String {
    smppio_defs::command_by_id(command_id)
        .map(|def| def.name.into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

fn body_preview(body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) if text.chars().all(|c| !c.is_control() || c.is_whitespace()) => text.to_string(),
        _ => format!("<binary {} bytes>", body.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
