use smppio_codec::Pdu;
use smppio_defs::{command, status};
use smppio_session::{Server, ServerConfig, Session, SessionConfig, SessionEvent, SessionEvents};
use smppio_transport::TlsIdentity;
use tokio::sync::mpsc;

use crate::cmd::{parse_duration, ListenArgs};
use crate::exit::{session_error, transport_error, CliResult, SUCCESS};
use crate::output::{print_pdu, OutputFormat};

pub async fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let enquire_link_period = match &args.enquire_link {
        Some(period) => Some(parse_duration(period)?),
        None => None,
    };
    // clap enforces that --cert and --key come as a pair.
    let tls = match (&args.cert, &args.key) {
        (Some(cert), Some(key)) => Some(
            TlsIdentity::from_pem_files(cert, key)
                .map_err(|err| transport_error("invalid TLS identity", err))?,
        ),
        _ => None,
    };

    let server = Server::bind(ServerConfig {
        addr: args.addr,
        tls,
        session: SessionConfig {
            enquire_link_period,
            ..SessionConfig::default()
        },
    })
    .await
    .map_err(|err| session_error("bind failed", err))?;

    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let _ = server
            .serve(move |session, events| {
                tokio::spawn(answer_session(session, events, seen_tx.clone()));
            })
            .await;
    });

    let mut printed = 0usize;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            received = seen_rx.recv() => {
                let Some((peer, pdu)) = received else { break };
                print_pdu(&pdu, &peer, format);
                printed = printed.saturating_add(1);
                if args.count.is_some_and(|count| printed >= count) {
                    break;
                }
            }
        }
    }

    Ok(SUCCESS)
}

/// Answer every request on a session: known commands get their matching
/// response, unknown ones a generic_nack with an invalid-command status.
async fn answer_session(
    session: Session,
    mut events: SessionEvents,
    seen: mpsc::UnboundedSender<(String, Pdu)>,
) {
    let peer = session
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "-".to_string());

    while let Some(event) = events.recv().await {
        let SessionEvent::Pdu(pdu) = event else {
            continue;
        };
        if pdu.is_response() {
            continue;
        }

        let reply = match smppio_defs::command_by_id(pdu.command_id) {
            Some(_) => pdu.response(),
            None => {
                let mut nack = pdu.response_with_status(status::ESME_RINVCMDID);
                nack.command_id = command::GENERIC_NACK;
                nack
            }
        };
        if session.send(reply).await.is_err() {
            break;
        }
        if seen.send((peer.clone(), pdu)).is_err() {
            break;
        }
    }
}
