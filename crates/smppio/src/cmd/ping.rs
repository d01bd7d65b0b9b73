use std::time::Instant;

use serde::Serialize;
use smppio_session::connect_with;
use tokio::time::{sleep, timeout};

use crate::cmd::{connect_config, parse_duration, PingArgs};
use crate::exit::{session_error, CliResult, FAILURE, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct ProbeOutput<'a> {
    url: &'a str,
    probe: usize,
    rtt_ms: Option<u128>,
}

pub async fn run(args: PingArgs, format: OutputFormat) -> CliResult<i32> {
    let wait = parse_duration(&args.timeout)?;
    let interval = parse_duration(&args.interval)?;

    let config = connect_config(args.ca.as_deref())?;
    let (session, _events) = connect_with(&args.url, config)
        .await
        .map_err(|err| session_error("connect failed", err))?;

    let mut lost = 0usize;
    for probe in 1..=args.count {
        let started = Instant::now();
        let rtt = match timeout(wait, session.enquire_link()).await {
            Ok(Ok(_response)) => Some(started.elapsed().as_millis()),
            Ok(Err(err)) => {
                session.destroy().await;
                return Err(session_error("probe failed", err));
            }
            Err(_elapsed) => None,
        };
        if rtt.is_none() {
            lost += 1;
        }
        print_probe(&args.url, probe, rtt, format);

        if probe < args.count {
            sleep(interval).await;
        }
    }

    session.destroy().await;
    Ok(if lost == 0 { SUCCESS } else { FAILURE })
}

fn print_probe(url: &str, probe: usize, rtt_ms: Option<u128>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ProbeOutput { url, probe, rtt_ms };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        _ => match rtt_ms {
            Some(ms) => println!("enquire_link from {url}: probe={probe} time={ms}ms"),
            None => println!("enquire_link from {url}: probe={probe} timed out"),
        },
    }
}
