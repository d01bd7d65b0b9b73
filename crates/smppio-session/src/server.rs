use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use smppio_transport::{Binding, TlsIdentity, SMPP_PORT, SSMPP_PORT};
use tracing::info;

use crate::error::Result;
use crate::event::SessionEvents;
use crate::session::{Session, SessionConfig};

static NEXT_SERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Configuration for an accepting endpoint.
///
/// Plain vs. TLS is a construction-time decision: supplying a [`TlsIdentity`]
/// selects the secure transport and the secure default port.
#[derive(Default)]
pub struct ServerConfig {
    /// Bind address. Defaults to the canonical plain port (2775), or the
    /// canonical TLS port (3550) when an identity is supplied.
    pub addr: Option<SocketAddr>,
    /// TLS credentials; present means every accepted connection is TLS.
    pub tls: Option<TlsIdentity>,
    /// Configuration applied to each accepted session.
    pub session: SessionConfig,
}

impl ServerConfig {
    pub(crate) fn effective_addr(&self) -> SocketAddr {
        self.addr.unwrap_or_else(|| {
            let port = if self.tls.is_some() { SSMPP_PORT } else { SMPP_PORT };
            SocketAddr::from(([0, 0, 0, 0], port))
        })
    }
}

/// Accepts connections and produces [`Session`]s.
///
/// Keeps a registry of active sessions: each accepted session is added
/// exactly once and removed exactly once when its connection closes. Nothing
/// else mutates the registry.
pub struct Server {
    id: u64,
    binding: Binding,
    session_config: SessionConfig,
    sessions: Arc<Mutex<Vec<Session>>>,
}

impl Server {
    /// Bind a server. TLS is selected by the presence of credentials in the
    /// config.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let addr = config.effective_addr();
        let binding = Binding::bind(addr, config.tls).await?;
        info!(%addr, secure = binding.is_secure(), "server listening");
        Ok(Self {
            id: NEXT_SERVER_ID.fetch_add(1, Ordering::Relaxed),
            binding,
            session_config: config.session,
            sessions: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Process-unique server identifier, recorded on each accepted session.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// True when accepted connections are TLS-wrapped.
    pub fn is_secure(&self) -> bool {
        self.binding.is_secure()
    }

    /// The locally bound address (useful after binding port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.binding.local_addr().map_err(Into::into)
    }

    /// Snapshot of the currently active sessions, in accept order.
    pub fn sessions(&self) -> Vec<Session> {
        self.sessions.lock().expect("session registry poisoned").clone()
    }

    /// Accept the next connection and wrap it into a session.
    ///
    /// The session joins the registry before this returns and leaves it,
    /// exactly once, when its connection closes.
    pub async fn accept(&self) -> Result<(Session, SessionEvents)> {
        let (stream, peer) = self.binding.accept().await?;
        let (session, events) =
            Session::spawn(stream, self.session_config.clone(), Some(self.id), None);

        self.sessions
            .lock()
            .expect("session registry poisoned")
            .push(session.clone());

        let registry = self.sessions.clone();
        let watched = session.clone();
        tokio::spawn(async move {
            watched.closed().await;
            registry
                .lock()
                .expect("session registry poisoned")
                .retain(|entry| entry.id() != watched.id());
        });

        info!(%peer, session = session.id(), "session accepted");
        Ok((session, events))
    }

    /// Accept loop: invoke the callback for every new session.
    pub async fn serve<F>(&self, mut on_session: F) -> Result<()>
    where
        F: FnMut(Session, SessionEvents),
    {
        loop {
            let (session, events) = self.accept().await?;
            on_session(session, events);
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("id", &self.id)
            .field("secure", &self.is_secure())
            .finish()
    }
}
