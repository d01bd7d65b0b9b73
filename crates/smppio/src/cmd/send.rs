use std::fs;

use bytes::Bytes;
use smppio_session::connect_with;
use tokio::time::timeout;

use crate::cmd::{connect_config, parse_duration, SendArgs};
use crate::exit::{session_error, CliError, CliResult, SUCCESS, TIMEOUT, USAGE};
use crate::output::{print_pdu, OutputFormat};

pub async fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let wait = parse_duration(&args.timeout)?;
    let body = resolve_body(&args)?;

    let config = connect_config(args.ca.as_deref())?;
    let (session, _events) = connect_with(&args.url, config)
        .await
        .map_err(|err| session_error("connect failed", err))?;

    let outcome = timeout(wait, session.send_command(&args.command, Bytes::from(body))).await;
    let response = match outcome {
        Err(_elapsed) => {
            session.destroy().await;
            return Err(CliError::new(
                TIMEOUT,
                format!("no response within {}", args.timeout),
            ));
        }
        Ok(result) => result.map_err(|err| session_error("send failed", err))?,
    };

    let peer = session
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    print_pdu(&response, &peer, format);

    session.destroy().await;
    Ok(SUCCESS)
}

fn resolve_body(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(body) = &args.body {
        return Ok(body.as_bytes().to_vec());
    }
    if let Some(hex) = &args.body_hex {
        return parse_hex(hex);
    }
    if let Some(path) = &args.file {
        return fs::read(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        });
    }
    Ok(Vec::new())
}

fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() % 2 != 0 {
        return Err(CliError::new(
            USAGE,
            "--body-hex must contain an even number of hex digits",
        ));
    }
    (0..cleaned.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&cleaned[i..i + 2], 16)
                .map_err(|_| CliError::new(USAGE, format!("invalid hex in --body-hex: {input}")))
        })
        .collect()
}
