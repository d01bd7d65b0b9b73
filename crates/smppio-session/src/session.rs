use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use smppio_codec::{encode_pdu, read_pdu, read_pdu_length, Pdu, DEFAULT_MAX_PDU_SIZE, MAX_SEQUENCE};
use smppio_defs::command;
use smppio_transport::SmppStream;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{mpsc, oneshot, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::{Result, SessionError};
use crate::event::{SessionEvent, SessionEvents};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum accepted command_length. Default: 64 KiB.
    pub max_pdu_size: usize,
    /// When set, a keepalive timer is installed at construction, sending an
    /// enquire_link each period.
    pub enquire_link_period: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_pdu_size: DEFAULT_MAX_PDU_SIZE,
            enquire_link_period: None,
        }
    }
}

struct Shared {
    id: u64,
    server_id: Option<u64>,
    peer_addr: Option<SocketAddr>,
    secure: bool,
    max_pdu_size: usize,
    /// Last allocated sequence number, in [0, MAX_SEQUENCE].
    sequence: Mutex<u32>,
    /// Correlation table: sequence number -> single-shot completion handle.
    pending: Mutex<HashMap<u32, oneshot::Sender<Pdu>>>,
    writer: tokio::sync::Mutex<WriteHalf<SmppStream>>,
    writable: AtomicBool,
    paused: AtomicBool,
    resume: Notify,
    events: mpsc::UnboundedSender<SessionEvent>,
    keepalive: Mutex<Option<JoinHandle<()>>>,
    /// Cancelled by destroy(): the read task aborts immediately.
    shutdown: CancellationToken,
    /// Cancelled once the connection has actually closed.
    closed: CancellationToken,
}

/// One SMPP session over a plain or TLS connection.
///
/// Cloneable handle; all clones share the same connection. A dedicated read
/// task owns the extraction loop exclusively, so inbound PDUs are emitted in
/// arrival order with no duplicates and no partial frames.
#[derive(Clone)]
pub struct Session {
    shared: Arc<Shared>,
}

impl Session {
    /// Wrap a connected stream into a session and spawn its read task.
    ///
    /// `connected` is enqueued before the read task exists, so it is always
    /// the first event even when the peer transmits immediately.
    pub(crate) fn spawn(
        stream: SmppStream,
        config: SessionConfig,
        server_id: Option<u64>,
        connected: Option<SessionEvent>,
    ) -> (Session, SessionEvents) {
        let peer_addr = stream.peer_addr().ok();
        let secure = stream.is_secure();
        let (reader, writer) = tokio::io::split(stream);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        if let Some(event) = connected {
            let _ = events_tx.send(event);
        }

        let shared = Arc::new(Shared {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            server_id,
            peer_addr,
            secure,
            max_pdu_size: config.max_pdu_size,
            sequence: Mutex::new(0),
            pending: Mutex::new(HashMap::new()),
            writer: tokio::sync::Mutex::new(writer),
            writable: AtomicBool::new(true),
            paused: AtomicBool::new(false),
            resume: Notify::new(),
            events: events_tx,
            keepalive: Mutex::new(None),
            shutdown: CancellationToken::new(),
            closed: CancellationToken::new(),
        });

        let session = Session { shared };
        tokio::spawn(read_loop(session.shared.clone(), reader));

        if let Some(period) = config.enquire_link_period {
            session.set_enquire_link_period(Some(period));
        }

        (session, events_rx)
    }

    /// Process-unique session identifier.
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    /// Identifier of the server this session was accepted by, if any.
    pub fn server_id(&self) -> Option<u64> {
        self.shared.server_id
    }

    /// Address of the remote endpoint, when still resolvable at wrap time.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.shared.peer_addr
    }

    /// True when the session runs over TLS.
    pub fn is_secure(&self) -> bool {
        self.shared.secure
    }

    /// True once the connection has closed (gracefully or not).
    pub fn is_closed(&self) -> bool {
        self.shared.closed.is_cancelled()
    }

    /// Resolves once the underlying connection has actually closed.
    pub async fn closed(&self) {
        self.shared.closed.cancelled().await;
    }

    /// Send a PDU.
    ///
    /// Fails immediately with [`SessionError::NotWritable`] when the
    /// transport is no longer writable. For requests, a sequence number is
    /// allocated unless one is pre-set (proxy relay), a correlation entry is
    /// registered, and the returned future resolves with the matching
    /// response — `Ok(Some(response))`. Response PDUs need no correlation and
    /// resolve with `Ok(None)` once flushed. A `Sent` event fires after the
    /// write completes, carrying the PDU actually transmitted.
    pub async fn send(&self, mut pdu: Pdu) -> Result<Option<Pdu>> {
        if !self.shared.writable.load(Ordering::Acquire) {
            return Err(SessionError::NotWritable);
        }

        let response_rx = if pdu.is_response() {
            None
        } else {
            if pdu.sequence_number == 0 {
                pdu.sequence_number = self.allocate_sequence();
            }
            let (tx, rx) = oneshot::channel();
            let mut pending = self.shared.pending.lock().expect("correlation table poisoned");
            if pending.contains_key(&pdu.sequence_number) {
                return Err(SessionError::SequenceInUse(pdu.sequence_number));
            }
            pending.insert(pdu.sequence_number, tx);
            Some(rx)
        };

        let mut wire = BytesMut::with_capacity(pdu.wire_size());
        if let Err(err) = encode_pdu(&pdu, &mut wire, self.shared.max_pdu_size) {
            self.forget_pending(&pdu);
            return Err(err.into());
        }

        {
            let mut writer = self.shared.writer.lock().await;
            if let Err(err) = writer.write_all(&wire).await {
                self.forget_pending(&pdu);
                return Err(err.into());
            }
            if let Err(err) = writer.flush().await {
                self.forget_pending(&pdu);
                return Err(err.into());
            }
        }
        self.emit(SessionEvent::Sent(pdu.clone()));
        trace!(
            session = self.shared.id,
            command_id = format_args!("{:#010x}", pdu.command_id),
            sequence = pdu.sequence_number,
            "PDU sent"
        );

        match response_rx {
            None => Ok(None),
            Some(rx) => rx.await.map(Some).map_err(|_| SessionError::Closed),
        }
    }

    /// Send a request by registered command name (built-in or extension).
    pub async fn send_command(&self, name: &str, body: impl Into<Bytes>) -> Result<Pdu> {
        let def = smppio_defs::command_by_name(name)
            .ok_or_else(|| SessionError::UnknownCommand(name.to_string()))?;
        self.request(def.id, body.into()).await
    }

    /// Suspend emission of further PDUs. Already-buffered bytes are retained.
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::Release);
    }

    /// Resume extraction, draining anything buffered while paused, in
    /// original arrival order.
    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::Release);
        self.shared.resume.notify_one();
    }

    /// (Re)install the keepalive timer, or remove it with `None`. Each tick
    /// sends an enquire_link; a failed probe is logged without terminating
    /// the session. Any previous timer is cancelled first.
    pub fn set_enquire_link_period(&self, period: Option<Duration>) {
        let mut slot = self.shared.keepalive.lock().expect("keepalive slot poisoned");
        if let Some(handle) = slot.take() {
            handle.abort();
        }
        let Some(period) = period else {
            return;
        };

        let session = self.clone();
        *slot = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            interval.tick().await; // first tick completes immediately
            loop {
                interval.tick().await;
                let probe = session.clone();
                // Fire-and-forget so a slow peer never delays the next tick.
                tokio::spawn(async move {
                    if let Err(err) = probe.enquire_link().await {
                        warn!(session = probe.shared.id, %err, "keepalive enquire_link failed");
                    }
                });
            }
        }));
    }

    /// Graceful termination: shut the write side down and wait for the peer
    /// to finish. The keepalive timer is cancelled and pending correlation
    /// entries are rejected once the connection has closed.
    pub async fn close(&self) {
        self.shared.writable.store(false, Ordering::Release);
        self.cancel_keepalive();
        {
            let mut writer = self.shared.writer.lock().await;
            let _ = writer.shutdown().await;
        }
        self.shared.closed.cancelled().await;
    }

    /// Abrupt termination: abort the read task and tear the connection down
    /// without waiting for the peer.
    pub async fn destroy(&self) {
        self.shared.writable.store(false, Ordering::Release);
        self.cancel_keepalive();
        self.shared.shutdown.cancel();
        {
            let mut writer = self.shared.writer.lock().await;
            let _ = writer.shutdown().await;
        }
        self.shared.closed.cancelled().await;
    }

    // Well-known operations. Each builds the request PDU and resolves with
    // its correlated response.

    pub async fn bind_transmitter(&self, body: impl Into<Bytes>) -> Result<Pdu> {
        self.request(command::BIND_TRANSMITTER, body.into()).await
    }

    pub async fn bind_receiver(&self, body: impl Into<Bytes>) -> Result<Pdu> {
        self.request(command::BIND_RECEIVER, body.into()).await
    }

    pub async fn bind_transceiver(&self, body: impl Into<Bytes>) -> Result<Pdu> {
        self.request(command::BIND_TRANSCEIVER, body.into()).await
    }

    pub async fn submit_sm(&self, body: impl Into<Bytes>) -> Result<Pdu> {
        self.request(command::SUBMIT_SM, body.into()).await
    }

    pub async fn deliver_sm(&self, body: impl Into<Bytes>) -> Result<Pdu> {
        self.request(command::DELIVER_SM, body.into()).await
    }

    pub async fn data_sm(&self, body: impl Into<Bytes>) -> Result<Pdu> {
        self.request(command::DATA_SM, body.into()).await
    }

    pub async fn query_sm(&self, body: impl Into<Bytes>) -> Result<Pdu> {
        self.request(command::QUERY_SM, body.into()).await
    }

    pub async fn cancel_sm(&self, body: impl Into<Bytes>) -> Result<Pdu> {
        self.request(command::CANCEL_SM, body.into()).await
    }

    pub async fn replace_sm(&self, body: impl Into<Bytes>) -> Result<Pdu> {
        self.request(command::REPLACE_SM, body.into()).await
    }

    pub async fn unbind(&self) -> Result<Pdu> {
        self.request(command::UNBIND, Bytes::new()).await
    }

    pub async fn enquire_link(&self) -> Result<Pdu> {
        self.request(command::ENQUIRE_LINK, Bytes::new()).await
    }

    async fn request(&self, command_id: u32, body: Bytes) -> Result<Pdu> {
        match self.send(Pdu::request(command_id, body)).await? {
            Some(response) => Ok(response),
            // Requests always register a correlation entry.
            None => Err(SessionError::Closed),
        }
    }

    fn allocate_sequence(&self) -> u32 {
        let mut sequence = self.shared.sequence.lock().expect("sequence counter poisoned");
        if *sequence == MAX_SEQUENCE {
            *sequence = 0;
        }
        *sequence += 1;
        *sequence
    }

    fn forget_pending(&self, pdu: &Pdu) {
        if !pdu.is_response() {
            self.shared
                .pending
                .lock()
                .expect("correlation table poisoned")
                .remove(&pdu.sequence_number);
        }
    }

    fn cancel_keepalive(&self) {
        if let Some(handle) = self
            .shared
            .keepalive
            .lock()
            .expect("keepalive slot poisoned")
            .take()
        {
            handle.abort();
        }
    }

    fn emit(&self, event: SessionEvent) {
        self.shared.emit(event);
    }

    #[cfg(test)]
    pub(crate) fn set_sequence(&self, value: u32) {
        *self.shared.sequence.lock().expect("sequence counter poisoned") = value;
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.shared.pending.lock().expect("correlation table poisoned").len()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.shared.id)
            .field("peer", &self.shared.peer_addr)
            .field("secure", &self.shared.secure)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Shared {
    fn emit(&self, event: SessionEvent) {
        // The application may have dropped its receiver; events are advisory.
        let _ = self.events.send(event);
    }

    /// Route one extracted PDU: generic notification, then command-specific,
    /// then correlation — in that order, before the next PDU is decoded.
    fn dispatch(&self, pdu: Pdu) {
        self.emit(SessionEvent::Pdu(pdu.clone()));
        if let Some(def) = smppio_defs::command_by_id(pdu.command_id) {
            self.emit(SessionEvent::Command {
                name: def.name.into_owned(),
                pdu: pdu.clone(),
            });
        }

        if pdu.is_response() {
            let waiter = self
                .pending
                .lock()
                .expect("correlation table poisoned")
                .remove(&pdu.sequence_number);
            match waiter {
                Some(tx) => {
                    // Receiver may have been dropped by a cancelled caller.
                    let _ = tx.send(pdu);
                }
                None => {
                    // Benign under network reordering; never an error.
                    trace!(
                        session = self.id,
                        sequence = pdu.sequence_number,
                        "unmatched response dropped"
                    );
                }
            }
        }
    }

    /// Terminal cleanup, run exactly once when the read task ends.
    fn finish(&self) {
        self.writable.store(false, Ordering::Release);
        if let Some(handle) = self.keepalive.lock().expect("keepalive slot poisoned").take() {
            handle.abort();
        }
        // Dropping the senders rejects every pending request with Closed.
        self.pending
            .lock()
            .expect("correlation table poisoned")
            .clear();
        self.emit(SessionEvent::Closed);
        self.closed.cancel();
        debug!(session = self.id, "session closed");
    }
}

/// The extraction loop: sole consumer of the session's inbound bytes.
///
/// Two-phase decoding mirrors the codec: the announced length survives
/// suspensions so a header is never re-parsed while its body trickles in.
async fn read_loop(shared: Arc<Shared>, mut reader: ReadHalf<SmppStream>) {
    let mut buf = BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY);
    let mut announced_len: Option<u32> = None;

    'connection: loop {
        // Drain every complete PDU already buffered.
        loop {
            if shared.paused.load(Ordering::Acquire) {
                tokio::select! {
                    _ = shared.resume.notified() => continue,
                    _ = shared.shutdown.cancelled() => break 'connection,
                }
            }

            let len = match announced_len {
                Some(len) => len,
                None => match read_pdu_length(&buf, shared.max_pdu_size) {
                    Ok(Some(len)) => {
                        announced_len = Some(len);
                        len
                    }
                    Ok(None) => break, // header incomplete, wait for bytes
                    Err(err) => {
                        shared.emit(SessionEvent::Error(err.to_string()));
                        drain_until_closed(&shared, reader).await;
                        return;
                    }
                },
            };

            match read_pdu(&mut buf, len) {
                Ok(Some(pdu)) => {
                    announced_len = None;
                    shared.dispatch(pdu);
                }
                Ok(None) => break, // body incomplete, keep the known length
                Err(err) => {
                    shared.emit(SessionEvent::Error(err.to_string()));
                    drain_until_closed(&shared, reader).await;
                    return;
                }
            }
        }

        tokio::select! {
            _ = shared.shutdown.cancelled() => break,
            read = reader.read_buf(&mut buf) => match read {
                Ok(0) => break, // EOF
                Ok(_) => {}
                Err(err) => {
                    shared.emit(SessionEvent::Error(err.to_string()));
                    break;
                }
            },
        }
    }

    shared.finish();
}

/// After a framing error extraction never resumes; keep consuming (and
/// discarding) bytes only so the peer's close is still observed.
async fn drain_until_closed(shared: &Arc<Shared>, mut reader: ReadHalf<SmppStream>) {
    let mut scratch = [0u8; 1024];
    loop {
        tokio::select! {
            _ = shared.shutdown.cancelled() => break,
            read = reader.read(&mut scratch) => match read {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            },
        }
    }
    shared.finish();
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use smppio_codec::HEADER_SIZE;
    use tokio::io::AsyncWriteExt as _;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::time::{sleep, timeout};

    use super::*;

    async fn session_pair() -> (Session, SessionEvents, Session, SessionEvents) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let addr = listener.local_addr().expect("addr should resolve");

        let client = TcpStream::connect(addr).await.expect("connect should succeed");
        let (accepted, _) = listener.accept().await.expect("accept should succeed");

        let (left, left_events) =
            Session::spawn(SmppStream::Plain(client), SessionConfig::default(), None, None);
        let (right, right_events) =
            Session::spawn(SmppStream::Plain(accepted), SessionConfig::default(), None, None);
        (left, left_events, right, right_events)
    }

    async fn session_with_raw_peer() -> (Session, SessionEvents, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let addr = listener.local_addr().expect("addr should resolve");

        let raw = TcpStream::connect(addr).await.expect("connect should succeed");
        let (accepted, _) = listener.accept().await.expect("accept should succeed");

        let (session, events) =
            Session::spawn(SmppStream::Plain(accepted), SessionConfig::default(), None, None);
        (session, events, raw)
    }

    /// Answer every inbound request with its matching response.
    fn echo_responses(session: Session, mut events: SessionEvents) {
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

    fn encode(pdu: &Pdu) -> BytesMut {
        let mut wire = BytesMut::new();
        encode_pdu(pdu, &mut wire, DEFAULT_MAX_PDU_SIZE).expect("encode should succeed");
        wire
    }

    async fn next_pdu(events: &mut SessionEvents) -> Pdu {
        loop {
            let event = timeout(Duration::from_secs(2), events.recv())
                .await
                .expect("event should arrive")
                .expect("event stream should stay open");
            if let SessionEvent::Pdu(pdu) = event {
                return pdu;
            }
        }
    }

    #[tokio::test]
    async fn sequence_allocation_wraps_to_one() {
        let (left, _left_events, right, right_events) = session_pair().await;
        echo_responses(right, right_events);

        left.set_sequence(MAX_SEQUENCE - 1);
        let at_edge = left.enquire_link().await.expect("probe should resolve");
        assert_eq!(at_edge.sequence_number, MAX_SEQUENCE);

        let wrapped = left.enquire_link().await.expect("probe should resolve");
        assert_eq!(wrapped.sequence_number, 1);
    }

    #[tokio::test]
    async fn request_correlates_exactly_once() {
        let (left, _left_events, right, right_events) = session_pair().await;
        echo_responses(right, right_events);

        let response = left
            .submit_sm(&b"short message"[..])
            .await
            .expect("request should resolve");
        assert!(response.is_response());
        assert_eq!(response.sequence_number, 1);
        assert_eq!(left.pending_len(), 0);
    }

    #[tokio::test]
    async fn preset_sequence_number_is_preserved() {
        let (session, mut events, mut raw) = session_with_raw_peer().await;

        // The raw peer inspects the wire, then answers by hand.
        let relayed = Pdu::request(command::SUBMIT_SM, Bytes::new()).with_sequence(4242);
        let sender = session.clone();
        let send = tokio::spawn(async move { sender.send(relayed).await });

        let mut header = [0u8; HEADER_SIZE];
        raw.read_exact(&mut header)
            .await
            .expect("header should arrive");
        let wire_sequence = u32::from_be_bytes([header[12], header[13], header[14], header[15]]);
        assert_eq!(wire_sequence, 4242);

        let response = Pdu::request(command::SUBMIT_SM, Bytes::new())
            .with_sequence(4242)
            .response();
        raw.write_all(&encode(&response))
            .await
            .expect("response should send");

        let resolved = send
            .await
            .expect("send task should finish")
            .expect("send should resolve");
        assert_eq!(
            resolved.expect("request resolves with a response").sequence_number,
            4242
        );
        events.close();
    }

    #[tokio::test]
    async fn split_delivery_emits_nothing_early() {
        let (_session, mut events, mut raw) = session_with_raw_peer().await;

        let pdu = Pdu::request(command::DELIVER_SM, &b"fragmented body"[..]).with_sequence(7);
        let wire = encode(&pdu);

        // Header split mid-field, then body split again.
        raw.write_all(&wire[..3]).await.expect("chunk should send");
        sleep(Duration::from_millis(50)).await;
        assert!(events.try_recv().is_err(), "no event before the header completes");

        raw.write_all(&wire[3..HEADER_SIZE + 4])
            .await
            .expect("chunk should send");
        sleep(Duration::from_millis(50)).await;
        assert!(events.try_recv().is_err(), "no event before the body completes");

        raw.write_all(&wire[HEADER_SIZE + 4..])
            .await
            .expect("chunk should send");
        let extracted = next_pdu(&mut events).await;
        assert_eq!(extracted, pdu);
    }

    #[tokio::test]
    async fn two_pdus_in_one_chunk_emit_in_order() {
        let (_session, mut events, mut raw) = session_with_raw_peer().await;

        let first = Pdu::request(command::ENQUIRE_LINK, Bytes::new()).with_sequence(1);
        let second = Pdu::request(command::SUBMIT_SM, &b"x"[..]).with_sequence(2);
        let mut wire = encode(&first);
        wire.extend_from_slice(&encode(&second));
        raw.write_all(&wire).await.expect("chunk should send");

        assert_eq!(next_pdu(&mut events).await, first);
        assert_eq!(next_pdu(&mut events).await, second);
    }

    #[tokio::test]
    async fn generic_event_precedes_command_event() {
        let (_session, mut events, mut raw) = session_with_raw_peer().await;

        let pdu = Pdu::request(command::ENQUIRE_LINK, Bytes::new()).with_sequence(1);
        raw.write_all(&encode(&pdu)).await.expect("pdu should send");

        let first = timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("event should arrive")
            .expect("stream should stay open");
        assert!(matches!(first, SessionEvent::Pdu(_)));

        let second = timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("event should arrive")
            .expect("stream should stay open");
        match second {
            SessionEvent::Command { name, pdu: inner } => {
                assert_eq!(name, "enquire_link");
                assert_eq!(inner, pdu);
            }
            other => panic!("expected command event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn pause_buffers_and_resume_drains_in_order() {
        let (session, mut events, mut raw) = session_with_raw_peer().await;

        session.pause();
        // Give the read task a moment to observe the flag.
        sleep(Duration::from_millis(20)).await;

        let first = Pdu::request(command::SUBMIT_SM, &b"one"[..]).with_sequence(1);
        let second = Pdu::request(command::SUBMIT_SM, &b"two"[..]).with_sequence(2);
        raw.write_all(&encode(&first)).await.expect("pdu should send");
        raw.write_all(&encode(&second)).await.expect("pdu should send");

        sleep(Duration::from_millis(100)).await;
        assert!(events.try_recv().is_err(), "paused session must not emit");

        session.resume();
        assert_eq!(next_pdu(&mut events).await, first);
        assert_eq!(next_pdu(&mut events).await, second);
    }

    #[tokio::test]
    async fn unmatched_response_is_dropped_silently() {
        let (session, mut events, mut raw) = session_with_raw_peer().await;

        let sender = session.clone();
        let inflight = tokio::spawn(async move { sender.enquire_link().await });

        // Consume the request so the wire stays clean.
        let mut header = [0u8; HEADER_SIZE];
        raw.read_exact(&mut header)
            .await
            .expect("request should arrive");

        // A response nobody asked for, then the real one.
        let stray = Pdu::request(command::SUBMIT_SM, Bytes::new())
            .with_sequence(999)
            .response();
        raw.write_all(&encode(&stray)).await.expect("stray should send");

        let real = Pdu::request(command::ENQUIRE_LINK, Bytes::new())
            .with_sequence(1)
            .response();
        raw.write_all(&encode(&real)).await.expect("response should send");

        let resolved = inflight
            .await
            .expect("task should finish")
            .expect("request should still resolve");
        assert_eq!(resolved.sequence_number, 1);

        // The stray produced PDU events but no error.
        while let Ok(event) = events.try_recv() {
            assert!(!matches!(event, SessionEvent::Error(_)));
        }
    }

    #[tokio::test]
    async fn framing_error_stops_extraction_permanently() {
        let (_session, mut events, mut raw) = session_with_raw_peer().await;

        // command_length below the header size.
        raw.write_all(&[0x00, 0x00, 0x00, 0x01])
            .await
            .expect("garbage should send");

        let event = timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("error should arrive")
            .expect("stream should stay open");
        assert!(matches!(event, SessionEvent::Error(_)));

        // A valid PDU afterwards must never be extracted.
        let valid = Pdu::request(command::ENQUIRE_LINK, Bytes::new()).with_sequence(5);
        raw.write_all(&encode(&valid)).await.expect("pdu should send");
        sleep(Duration::from_millis(100)).await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn keepalive_is_silent_after_destroy() {
        let (left, mut left_events, right, right_events) = session_pair().await;
        echo_responses(right, right_events);

        left.set_enquire_link_period(Some(Duration::from_millis(50)));

        // At least one probe goes out.
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let event = timeout(Duration::from_secs(2), left_events.recv())
                .await
                .expect("event should arrive")
                .expect("stream should stay open");
            if matches!(&event, SessionEvent::Sent(pdu) if pdu.command_id == command::ENQUIRE_LINK)
            {
                break;
            }
            assert!(tokio::time::Instant::now() < deadline, "no probe observed");
        }

        left.destroy().await;

        // Drain up to the terminal event, then confirm silence.
        while let Ok(event) = left_events.try_recv() {
            if matches!(event, SessionEvent::Closed) {
                break;
            }
        }
        sleep(Duration::from_millis(150)).await;
        assert!(
            left_events.try_recv().is_err(),
            "no event may follow close, least of all a keepalive probe"
        );
    }

    #[tokio::test]
    async fn destroy_rejects_pending_requests() {
        let (left, _left_events, _right, _right_events) = session_pair().await;

        let sender = left.clone();
        let inflight = tokio::spawn(async move { sender.enquire_link().await });
        sleep(Duration::from_millis(50)).await;

        left.destroy().await;
        let result = inflight.await.expect("task should finish");
        assert!(matches!(result, Err(SessionError::Closed)));
    }

    #[tokio::test]
    async fn send_fails_fast_once_closed() {
        let (left, _left_events, _right, _right_events) = session_pair().await;
        left.destroy().await;

        let err = left
            .enquire_link()
            .await
            .expect_err("send after close should fail");
        assert!(matches!(err, SessionError::NotWritable));
    }

    #[tokio::test]
    async fn graceful_close_completes_once_peer_finishes() {
        let (left, _left_events, right, mut right_events) = session_pair().await;

        let closer = left.clone();
        let closing = tokio::spawn(async move { closer.close().await });

        // The peer sees EOF and closes in turn.
        loop {
            let event = timeout(Duration::from_secs(2), right_events.recv())
                .await
                .expect("event should arrive")
                .expect("stream should stay open");
            if matches!(event, SessionEvent::Closed) {
                break;
            }
        }
        drop(right);
        drop(right_events);

        timeout(Duration::from_secs(2), closing)
            .await
            .expect("close should complete")
            .expect("close task should finish");
        assert!(left.is_closed());
    }

    #[tokio::test]
    async fn extension_command_is_sendable_by_name() {
        let (left, _left_events, right, right_events) = session_pair().await;
        echo_responses(right, right_events);

        smppio_defs::add_command("vendor_heartbeat", 0x0001_0200)
            .expect("registration should succeed");
        let response = left
            .send_command("vendor_heartbeat", Bytes::new())
            .await
            .expect("extension command should resolve");
        assert_eq!(response.command_id, 0x0001_0200 | 0x8000_0000);
    }

    #[tokio::test]
    async fn unknown_command_name_is_rejected() {
        let (left, _left_events, _right, _right_events) = session_pair().await;
        let err = left
            .send_command("no_such_command", Bytes::new())
            .await
            .expect_err("unknown name should fail");
        assert!(matches!(err, SessionError::UnknownCommand(_)));
    }

    #[tokio::test]
    async fn sequence_collision_is_a_caller_error() {
        let (left, _left_events, _right, _right_events) = session_pair().await;

        let first = left.clone();
        let _inflight = tokio::spawn(async move {
            first
                .send(Pdu::request(command::SUBMIT_SM, Bytes::new()).with_sequence(77))
                .await
        });
        sleep(Duration::from_millis(50)).await;

        let err = left
            .send(Pdu::request(command::SUBMIT_SM, Bytes::new()).with_sequence(77))
            .await
            .expect_err("collision should fail");
        assert!(matches!(err, SessionError::SequenceInUse(77)));
    }
}

