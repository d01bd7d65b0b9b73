use std::sync::Arc;

use rustls::{ClientConfig, RootCertStore};
use smppio_transport::{connect_plain, connect_tls, SMPP_PORT, SSMPP_PORT};
use url::Url;

use crate::error::{Result, SessionError};
use crate::event::{SessionEvent, SessionEvents};
use crate::session::{Session, SessionConfig};

/// Configuration for client-initiated connections.
#[derive(Default, Clone)]
pub struct ConnectConfig {
    /// TLS client configuration for `ssmpp://` URLs. When absent, an
    /// empty-root-store configuration is used, so the peer certificate must
    /// be explicitly trusted for a secure connection to ever succeed.
    pub tls: Option<Arc<ClientConfig>>,
    /// Configuration applied to the resulting session.
    pub session: SessionConfig,
}

/// Connect to an SMPP endpoint by URL with default configuration.
///
/// `smpp://host[:port]` selects the plain transport (default port 2775),
/// `ssmpp://host[:port]` selects TLS (default port 3550). Any other scheme is
/// rejected before any network activity.
pub async fn connect(url: &str) -> Result<(Session, SessionEvents)> {
    connect_with(url, ConnectConfig::default()).await
}

/// Connect with explicit configuration.
///
/// The returned future resolves with the session once the transport signals
/// readiness — the TCP connect for plain, the completed handshake for TLS —
/// and rejects on any transport error observed before that signal. Errors
/// after that point surface as session events, not connector failures.
pub async fn connect_with(url: &str, config: ConnectConfig) -> Result<(Session, SessionEvents)> {
    let parsed = Url::parse(url).map_err(|err| SessionError::InvalidUrl(err.to_string()))?;
    let secure = match parsed.scheme() {
        "smpp" => false,
        "ssmpp" => true,
        other => return Err(SessionError::UnsupportedScheme(other.to_string())),
    };
    let host = parsed
        .host_str()
        .ok_or_else(|| SessionError::InvalidUrl(format!("missing host in {url:?}")))?
        .to_string();
    let port = parsed
        .port()
        .unwrap_or(if secure { SSMPP_PORT } else { SMPP_PORT });

    let stream = if secure {
        let tls = config.tls.clone().unwrap_or_else(empty_trust_config);
        connect_tls(&host, port, tls).await?
    } else {
        connect_plain(&host, port).await?
    };

    let connected = if secure {
        SessionEvent::SecureConnected
    } else {
        SessionEvent::Connected
    };
    Ok(Session::spawn(stream, config.session, None, Some(connected)))
}

fn empty_trust_config() -> Arc<ClientConfig> {
    let config = ClientConfig::builder()
        .with_root_certificates(RootCertStore::empty())
        .with_no_client_auth();
    Arc::new(config)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use smppio_transport::{client_config_from_ca_pem, TlsIdentity};
    use tokio::time::timeout;

    use super::*;
    use crate::server::{Server, ServerConfig};

    const CA_CERT_PEM: &[u8] = include_bytes!("../tests/fixtures/ca.crt");
    const SERVER_CERT_PEM: &[u8] = include_bytes!("../tests/fixtures/server.crt");
    const SERVER_KEY_PEM: &[u8] = include_bytes!("../tests/fixtures/server.key");

    async fn plain_server() -> Server {
        Server::bind(ServerConfig {
            addr: Some("127.0.0.1:0".parse().expect("addr should parse")),
            ..ServerConfig::default()
        })
        .await
        .expect("server should bind")
    }

    fn echo_responses(mut events: SessionEvents, session: Session) {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if let SessionEvent::Pdu(pdu) = event {
                    if !pdu.is_response() {
                        let _ = session.send(pdu.response()).await;
                    }
                }
            }
        });
    }

    #[tokio::test]
    async fn rejects_unknown_scheme_before_io() {
        let err = connect("http://localhost:2775")
            .await
            .expect_err("scheme should be rejected");
        assert!(matches!(err, SessionError::UnsupportedScheme(scheme) if scheme == "http"));
    }

    #[tokio::test]
    async fn rejects_url_without_host() {
        let err = connect("smpp:///nohost")
            .await
            .expect_err("missing host should be rejected");
        assert!(matches!(err, SessionError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn plain_connect_resolves_usable_session() {
        let server = plain_server().await;
        let port = server.local_addr().expect("addr should resolve").port();
        tokio::spawn(async move {
            let (session, events) = server.accept().await.expect("accept should succeed");
            echo_responses(events, session);
            // Keep the server alive for the duration of the test.
            std::future::pending::<()>().await;
        });

        let (session, mut events) = connect(&format!("smpp://127.0.0.1:{port}"))
            .await
            .expect("connect should succeed");
        assert!(matches!(events.recv().await, Some(SessionEvent::Connected)));
        assert!(!session.is_secure());

        let response = session.enquire_link().await.expect("probe should resolve");
        assert!(response.is_response());
    }

    #[tokio::test]
    async fn connected_event_precedes_immediate_traffic() {
        use bytes::{Bytes, BytesMut};
        use smppio_codec::{encode_pdu, Pdu, DEFAULT_MAX_PDU_SIZE};
        use smppio_defs::command;
        use tokio::io::AsyncWriteExt as _;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let port = listener.local_addr().expect("addr should resolve").port();

        // The peer starts transmitting the instant the connection opens.
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept should succeed");
            let pdu = Pdu::request(command::OUTBIND, Bytes::new()).with_sequence(1);
            let mut wire = BytesMut::new();
            encode_pdu(&pdu, &mut wire, DEFAULT_MAX_PDU_SIZE).expect("encode should succeed");
            stream.write_all(&wire).await.expect("write should succeed");
            std::future::pending::<()>().await;
        });

        let (_session, mut events) = connect(&format!("smpp://127.0.0.1:{port}"))
            .await
            .expect("connect should succeed");

        let first = timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("event should arrive")
            .expect("stream should stay open");
        assert!(
            matches!(first, SessionEvent::Connected),
            "first event must announce the connection, got {first:?}"
        );

        let second = timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("event should arrive")
            .expect("stream should stay open");
        match second {
            SessionEvent::Pdu(pdu) => assert_eq!(pdu.command_id, command::OUTBIND),
            other => panic!("expected the peer's PDU, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tls_connect_round_trip() {
        let identity = TlsIdentity::from_pem(SERVER_CERT_PEM, SERVER_KEY_PEM)
            .expect("identity should load");
        let server = Server::bind(ServerConfig {
            addr: Some("127.0.0.1:0".parse().expect("addr should parse")),
            tls: Some(identity),
            ..ServerConfig::default()
        })
        .await
        .expect("secure server should bind");
        assert!(server.is_secure());
        let port = server.local_addr().expect("addr should resolve").port();

        tokio::spawn(async move {
            let (session, events) = server.accept().await.expect("accept should succeed");
            assert!(session.is_secure());
            echo_responses(events, session);
            std::future::pending::<()>().await;
        });

        let tls = client_config_from_ca_pem(CA_CERT_PEM).expect("CA should load");
        let (session, mut events) = connect_with(
            &format!("ssmpp://localhost:{port}"),
            ConnectConfig {
                tls: Some(tls),
                ..ConnectConfig::default()
            },
        )
        .await
        .expect("secure connect should succeed");
        assert!(matches!(
            events.recv().await,
            Some(SessionEvent::SecureConnected)
        ));
        assert!(session.is_secure());

        let response = session.enquire_link().await.expect("probe should resolve");
        assert!(response.is_response());
    }

    #[tokio::test]
    async fn ssmpp_to_plain_endpoint_does_not_downgrade() {
        let server = plain_server().await;
        let port = server.local_addr().expect("addr should resolve").port();
        tokio::spawn(async move {
            // Accept and ignore: a plain endpoint never answers a TLS hello.
            let _accepted = server.accept().await;
            std::future::pending::<()>().await;
        });

        let tls = client_config_from_ca_pem(CA_CERT_PEM).expect("CA should load");
        let attempt = timeout(
            Duration::from_millis(500),
            connect_with(
                &format!("ssmpp://localhost:{port}"),
                ConnectConfig {
                    tls: Some(tls),
                    ..ConnectConfig::default()
                },
            ),
        )
        .await;

        // Either the handshake errors out or it never completes; it must not
        // hand back a usable session.
        match attempt {
            Err(_elapsed) => {}
            Ok(result) => assert!(result.is_err(), "TLS connect must not silently downgrade"),
        }
    }
}
