use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod listen;
pub mod ping;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Accept sessions, answer requests, and print received PDUs.
    Listen(ListenArgs),
    /// Send a single request and print its response.
    Send(SendArgs),
    /// Measure enquire_link round-trip time.
    Ping(PingArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub async fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, format).await,
        Command::Send(args) => send::run(args, format).await,
        Command::Ping(args) => ping::run(args, format).await,
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Bind address. Default: 0.0.0.0:2775, or 0.0.0.0:3550 with TLS.
    pub addr: Option<SocketAddr>,
    /// PEM certificate chain; enables TLS (requires --key).
    #[arg(long, value_name = "FILE", requires = "key")]
    pub cert: Option<PathBuf>,
    /// PEM private key; enables TLS (requires --cert).
    #[arg(long, value_name = "FILE", requires = "cert")]
    pub key: Option<PathBuf>,
    /// Send an enquire_link to each session at this interval (e.g. 30s).
    #[arg(long, value_name = "DURATION")]
    pub enquire_link: Option<String>,
    /// Exit after printing N request PDUs.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Endpoint URL (smpp://host[:port] or ssmpp://host[:port]).
    pub url: String,
    /// Command name to send (built-in or registered extension).
    #[arg(long, short = 'c', default_value = "enquire_link")]
    pub command: String,
    /// Raw string body.
    #[arg(long, conflicts_with_all = ["body_hex", "file"])]
    pub body: Option<String>,
    /// Hex-encoded body.
    #[arg(long, conflicts_with_all = ["body", "file"])]
    pub body_hex: Option<String>,
    /// Read body from file.
    #[arg(long, conflicts_with_all = ["body", "body_hex"])]
    pub file: Option<PathBuf>,
    /// Maximum time to wait for the response (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
    /// PEM CA bundle to trust for ssmpp:// endpoints.
    #[arg(long, value_name = "FILE")]
    pub ca: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PingArgs {
    /// Endpoint URL (smpp://host[:port] or ssmpp://host[:port]).
    pub url: String,
    /// Number of probes to send.
    #[arg(long, short = 'n', default_value = "4")]
    pub count: usize,
    /// Delay between probes (e.g. 1s, 200ms).
    #[arg(long, default_value = "1s")]
    pub interval: String,
    /// Maximum time to wait for each response (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
    /// PEM CA bundle to trust for ssmpp:// endpoints.
    #[arg(long, value_name = "FILE")]
    pub ca: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn connect_config(ca: Option<&std::path::Path>) -> CliResult<smppio_session::ConnectConfig> {
    let mut config = smppio_session::ConnectConfig::default();
    if let Some(path) = ca {
        let pem = std::fs::read(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        })?;
        let tls = smppio_transport::client_config_from_ca_pem(&pem)
            .map_err(|err| crate::exit::transport_error("invalid CA bundle", err))?;
        config.tls = Some(tls);
    }
    Ok(config)
}

/// Parse `5s`, `500ms`, or a bare number of seconds.
pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    let (digits, millis_per_unit) = match input.strip_suffix("ms") {
        Some(digits) => (digits, 1),
        None => (input.strip_suffix('s').unwrap_or(input), 1000),
    };

    let value = digits
        .parse::<u64>()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input:?}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }
    Ok(Duration::from_millis(value * millis_per_unit))
}
