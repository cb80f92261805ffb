//! Stream transport client.
//!
//! One `TransportClient` per connection attempt, driving the lifecycle
//! `Idle → Resolving → Connecting → Active → Halted`. `Halted` is terminal
//! and reachable from every state; every asynchronous completion checks the
//! halted flag before acting so a stopped client never touches released
//! resources.
//!
//! The client owns its socket exclusively and, once connected, exactly one
//! [`StreamLink`]. Configuration, statistics and the endpoint cache are
//! shared by reference across however many clients a config produces.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::net::{lookup_host, TcpSocket};
use tracing::{debug, warn};

use super::buffer::PoolBuffer;
use super::endpoint::EndpointCache;
use super::link::{LinkHandler, StreamLink};
use crate::core::{
    SessionStats, TransportError, DEFAULT_FREE_LIST_MAX_SIZE, DEFAULT_READ_FRAME_SIZE,
    DEFAULT_SEND_QUEUE_MAX_SIZE, FRAME_LENGTH_PREFIX_SIZE,
};

/// Raw platform socket handle passed to the protection hook.
#[cfg(unix)]
pub type RawSocketHandle = std::os::fd::RawFd;

/// Raw platform socket handle passed to the protection hook.
#[cfg(windows)]
pub type RawSocketHandle = std::os::windows::io::RawSocket;

/// Platform hook invoked with the raw socket handle after the socket is
/// opened and before it connects.
///
/// Used where the tunnel's own traffic must be excluded from being routed
/// back through the tunnel. Returning `false` aborts the connection
/// attempt.
pub trait SocketProtect: Send + Sync {
    /// Exempt the socket from tunnel routing. `false` aborts the connect.
    fn protect(&self, socket: RawSocketHandle) -> bool;
}

/// Owner callbacks for transport lifecycle events.
///
/// All callbacks fire in issue order for a given client: `pre_resolve`
/// before resolution starts, `wait` before the connect attempt, and
/// `connecting` once the connection is established. After `error` the
/// client has halted and emits nothing further.
pub trait TransportParent: Send + Sync + 'static {
    /// Name resolution is about to start.
    fn pre_resolve(&self) {}

    /// A connect attempt is about to start.
    fn wait(&self) {}

    /// The connection is established and the link is running.
    fn connecting(&self) {}

    /// An inbound frame, delivered unchanged and in wire order.
    fn recv(&self, frame: PoolBuffer);

    /// A fatal condition; reported exactly once.
    fn error(&self, err: TransportError);
}

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Not yet started.
    Idle,
    /// Asynchronous name resolution in flight.
    Resolving,
    /// Connect attempt in flight.
    Connecting,
    /// Connected; the stream link is running.
    Active,
    /// Terminal. Repeated stop requests are no-ops.
    Halted,
}

/// Immutable connection parameters, shared by reference across every
/// client produced from them.
#[derive(Clone)]
pub struct ClientConfig {
    /// Server host name or address literal.
    pub server_host: String,
    /// Server port.
    pub server_port: u16,
    /// Outbound queue bound, in buffers.
    pub send_queue_max_size: usize,
    /// Reusable-buffer free list bound.
    pub free_list_max_size: usize,
    /// Size of a single raw-mode read.
    pub read_frame_size: usize,
    /// Statistics sink shared across clients.
    pub stats: Arc<SessionStats>,
    /// Optional platform socket-protection hook.
    pub socket_protect: Option<Arc<dyn SocketProtect>>,
    /// Optional cache of previously connected endpoints.
    pub endpoint_cache: Option<Arc<EndpointCache>>,
}

impl ClientConfig {
    /// Start building a config.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Produce a new transport client bound to this config.
    ///
    /// The I/O execution context is the ambient tokio runtime.
    pub fn new_client(self: &Arc<Self>, parent: Arc<dyn TransportParent>) -> TransportClient {
        TransportClient {
            config: Arc::clone(self),
            parent,
            state: ClientState::Idle,
            halted: Arc::new(AtomicBool::new(false)),
            link: None,
            server_endpoint: None,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("send_queue_max_size", &self.send_queue_max_size)
            .field("free_list_max_size", &self.free_list_max_size)
            .field("read_frame_size", &self.read_frame_size)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a builder with protocol defaults.
    pub fn new() -> Self {
        Self {
            config: ClientConfig {
                server_host: "localhost".to_string(),
                server_port: 1194,
                send_queue_max_size: DEFAULT_SEND_QUEUE_MAX_SIZE,
                free_list_max_size: DEFAULT_FREE_LIST_MAX_SIZE,
                read_frame_size: DEFAULT_READ_FRAME_SIZE,
                stats: Arc::new(SessionStats::new()),
                socket_protect: None,
                endpoint_cache: None,
            },
        }
    }

    /// Set the server host.
    pub fn server_host(mut self, host: impl Into<String>) -> Self {
        self.config.server_host = host.into();
        self
    }

    /// Set the server port.
    pub fn server_port(mut self, port: u16) -> Self {
        self.config.server_port = port;
        self
    }

    /// Bound the outbound queue (buffers, not bytes).
    pub fn send_queue_max_size(mut self, size: usize) -> Self {
        self.config.send_queue_max_size = size;
        self
    }

    /// Bound the reusable-buffer free list.
    pub fn free_list_max_size(mut self, size: usize) -> Self {
        self.config.free_list_max_size = size;
        self
    }

    /// Set the raw-mode read size.
    pub fn read_frame_size(mut self, size: usize) -> Self {
        self.config.read_frame_size = size;
        self
    }

    /// Use a shared statistics sink.
    pub fn stats(mut self, stats: Arc<SessionStats>) -> Self {
        self.config.stats = stats;
        self
    }

    /// Install a socket-protection hook.
    pub fn socket_protect(mut self, protect: Arc<dyn SocketProtect>) -> Self {
        self.config.socket_protect = Some(protect);
        self
    }

    /// Use a shared endpoint cache.
    pub fn endpoint_cache(mut self, cache: Arc<EndpointCache>) -> Self {
        self.config.endpoint_cache = Some(cache);
        self
    }

    /// Finish the config.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolved server endpoint details for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpointInfo {
    /// Configured host.
    pub host: String,
    /// Configured port.
    pub port: u16,
    /// Transport protocol tag ("TCPv4"/"TCPv6").
    pub protocol: String,
    /// Resolved address literal, empty before resolution.
    pub ip_addr: String,
}

/// Bridges link callbacks up to the owner, suppressing everything once the
/// shared halted flag is set and counting failures into the stats sink.
struct ClientLinkEvents {
    parent: Arc<dyn TransportParent>,
    stats: Arc<SessionStats>,
    halted: Arc<AtomicBool>,
    server_host: String,
}

impl LinkHandler for ClientLinkEvents {
    fn link_recv(&self, frame: PoolBuffer) {
        if !self.halted.load(Ordering::SeqCst) {
            self.parent.recv(frame);
        }
    }

    fn link_eof(&self) {
        if !self.halted.swap(true, Ordering::SeqCst) {
            let err = TransportError::NetworkEof;
            self.stats.error(&err);
            self.parent.error(err);
        }
    }

    fn link_error(&self, err: io::Error) {
        if !self.halted.swap(true, Ordering::SeqCst) {
            let err = TransportError::Transport(format!(
                "transport error on '{}': {err}",
                self.server_host
            ));
            self.stats.error(&err);
            self.parent.error(err);
        }
    }
}

/// Connection-lifecycle state machine for one outbound stream session.
pub struct TransportClient {
    config: Arc<ClientConfig>,
    parent: Arc<dyn TransportParent>,
    state: ClientState,
    halted: Arc<AtomicBool>,
    link: Option<StreamLink>,
    server_endpoint: Option<SocketAddr>,
}

impl TransportClient {
    /// Start the connection lifecycle.
    ///
    /// A cache hit for (host, port) skips resolution (`pre_resolve` is not
    /// invoked) and proceeds straight to the connect attempt. Calling
    /// `start` in any state but `Idle` is a no-op; a client is one
    /// connection attempt.
    pub async fn start(&mut self) {
        if self.state != ClientState::Idle || self.halted.load(Ordering::SeqCst) {
            return;
        }

        let host = self.config.server_host.clone();
        let port = self.config.server_port;

        let cached = self
            .config
            .endpoint_cache
            .as_ref()
            .and_then(|cache| cache.get(&host, port));

        let endpoint = match cached {
            Some(endpoint) => {
                debug!(%endpoint, "endpoint cache hit, skipping resolution");
                endpoint
            }
            None => {
                self.state = ClientState::Resolving;
                self.parent.pre_resolve();
                let resolved = lookup_host((host.as_str(), port)).await;
                if self.halted.load(Ordering::SeqCst) {
                    return;
                }
                let first = match resolved {
                    Ok(mut addrs) => addrs.next(),
                    Err(err) => {
                        self.fail(TransportError::Resolve(format!(
                            "DNS resolve error on '{host}' for stream session: {err}"
                        )));
                        return;
                    }
                };
                match first {
                    Some(endpoint) => endpoint,
                    None => {
                        self.fail(TransportError::Resolve(format!(
                            "DNS resolve error on '{host}': no addresses"
                        )));
                        return;
                    }
                }
            }
        };

        self.server_endpoint = Some(endpoint);
        self.connect(endpoint).await;
    }

    /// Open a socket for the endpoint's address family, run the protection
    /// hook, connect, and hand the stream to a fresh link.
    async fn connect(&mut self, endpoint: SocketAddr) {
        self.state = ClientState::Connecting;
        self.parent.wait();

        let socket = if endpoint.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        };
        let socket = match socket {
            Ok(socket) => socket,
            Err(err) => {
                self.fail(TransportError::Connect(format!("socket open error: {err}")));
                return;
            }
        };

        #[cfg(unix)]
        if let Some(protect) = &self.config.socket_protect {
            use std::os::fd::AsRawFd;
            if !protect.protect(socket.as_raw_fd()) {
                self.fail(TransportError::SocketProtect);
                return;
            }
        }

        let connected = socket.connect(endpoint).await;
        if self.halted.load(Ordering::SeqCst) {
            return;
        }
        let stream = match connected {
            Ok(stream) => stream,
            Err(err) => {
                self.fail(TransportError::Connect(format!(
                    "connect error on '{}:{}': {err}",
                    self.config.server_host, self.config.server_port
                )));
                return;
            }
        };

        // favor latency over throughput on the control path
        if let Err(err) = stream.set_nodelay(true) {
            warn!(%err, "failed to disable send coalescing");
        }

        if let Some(cache) = &self.config.endpoint_cache {
            cache.set(&self.config.server_host, self.config.server_port, endpoint);
        }

        let events = Arc::new(ClientLinkEvents {
            parent: Arc::clone(&self.parent),
            stats: Arc::clone(&self.config.stats),
            halted: Arc::clone(&self.halted),
            server_host: self.config.server_host.clone(),
        });
        let mut link = StreamLink::new(
            stream,
            self.config.send_queue_max_size,
            self.config.free_list_max_size,
            self.config.read_frame_size,
            events,
            Arc::clone(&self.config.stats),
        );
        link.reset_align_adjust(FRAME_LENGTH_PREFIX_SIZE);
        link.start();
        self.link = Some(link);

        self.parent.connecting();
        self.state = ClientState::Active;
        debug!(%endpoint, "transport connected");
    }

    /// Cancel any in-flight work, stop and release the link, and move to
    /// `Halted`. Safe to call in any state and any number of times,
    /// including from the owner's teardown path.
    pub fn stop(&mut self) {
        self.halted.store(true, Ordering::SeqCst);
        self.state = ClientState::Halted;
        if let Some(mut link) = self.link.take() {
            link.stop();
        }
    }

    /// Forward an owned buffer to the link.
    ///
    /// Returns `false` (not an error) when the client is not `Active` or
    /// the link's queue is full; the owner treats this as backpressure.
    pub fn transport_send(&self, buf: PoolBuffer) -> bool {
        if !self.sendable() {
            return false;
        }
        match &self.link {
            Some(link) => link.send(buf),
            None => false,
        }
    }

    /// Copy `data` into a pooled buffer and forward it to the link.
    pub fn transport_send_const(&self, data: &[u8]) -> bool {
        if !self.sendable() {
            return false;
        }
        match &self.link {
            Some(link) => link.send_copy(data),
            None => false,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ClientState {
        if self.halted.load(Ordering::SeqCst) {
            ClientState::Halted
        } else {
            self.state
        }
    }

    /// Resolved server address, once known.
    pub fn server_endpoint_addr(&self) -> Option<SocketAddr> {
        self.server_endpoint
    }

    /// Host, port, protocol and address details for display.
    pub fn server_endpoint_info(&self) -> ServerEndpointInfo {
        let (protocol, ip_addr) = match self.server_endpoint {
            Some(SocketAddr::V4(addr)) => ("TCPv4".to_string(), addr.ip().to_string()),
            Some(SocketAddr::V6(addr)) => ("TCPv6".to_string(), addr.ip().to_string()),
            None => ("TCP".to_string(), String::new()),
        };
        ServerEndpointInfo {
            host: self.config.server_host.clone(),
            port: self.config.server_port,
            protocol,
            ip_addr,
        }
    }

    fn sendable(&self) -> bool {
        self.state == ClientState::Active && !self.halted.load(Ordering::SeqCst)
    }

    /// Report a connection-fatal error once: count it, halt, then tell the
    /// owner.
    fn fail(&mut self, err: TransportError) {
        warn!(%err, "transport client failed");
        self.config.stats.error(&err);
        self.stop();
        self.parent.error(err);
    }
}

impl Drop for TransportClient {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        PreResolve,
        Wait,
        Connecting,
        Recv(Vec<u8>),
        Error(TransportError),
    }

    #[derive(Default)]
    struct TestParent {
        events: Mutex<Vec<Event>>,
    }

    impl TestParent {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl TransportParent for TestParent {
        fn pre_resolve(&self) {
            self.push(Event::PreResolve);
        }

        fn wait(&self) {
            self.push(Event::Wait);
        }

        fn connecting(&self) {
            self.push(Event::Connecting);
        }

        fn recv(&self, frame: PoolBuffer) {
            self.push(Event::Recv(frame.as_slice().to_vec()));
        }

        fn error(&self, err: TransportError) {
            self.push(Event::Error(err));
        }
    }

    fn test_config(port: u16, cache: Option<Arc<EndpointCache>>) -> Arc<ClientConfig> {
        let mut builder = ClientConfig::builder()
            .server_host("127.0.0.1")
            .server_port(port);
        if let Some(cache) = cache {
            builder = builder.endpoint_cache(cache);
        }
        Arc::new(builder.build())
    }

    async fn wait_for<F: Fn() -> bool>(cond: F) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached within timeout");
    }

    #[tokio::test]
    async fn test_stop_before_start_is_noop() {
        let config = test_config(1, None);
        let parent = Arc::new(TestParent::default());
        let mut client = config.new_client(parent.clone());

        client.stop();
        assert_eq!(client.state(), ClientState::Halted);
        assert!(parent.events().is_empty());

        // a stopped client never starts
        client.start().await;
        assert!(parent.events().is_empty());
    }

    #[tokio::test]
    async fn test_send_before_active_returns_not_sent() {
        let config = test_config(1, None);
        let parent = Arc::new(TestParent::default());
        let client = config.new_client(parent.clone());

        assert!(!client.transport_send_const(b"early"));
        assert!(!client.transport_send(PoolBuffer::from_slice(b"early", 0)));
        assert!(parent.events().is_empty());
    }

    #[tokio::test]
    async fn test_connect_lifecycle_and_cache_population() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let cache = Arc::new(EndpointCache::new());
        let config = test_config(port, Some(Arc::clone(&cache)));
        let parent = Arc::new(TestParent::default());

        let mut client = config.new_client(parent.clone());
        assert!(cache.is_empty());
        client.start().await;

        assert_eq!(client.state(), ClientState::Active);
        assert_eq!(
            parent.events(),
            vec![Event::PreResolve, Event::Wait, Event::Connecting]
        );
        assert_eq!(
            cache.get("127.0.0.1", port),
            client.server_endpoint_addr()
        );

        let info = client.server_endpoint_info();
        assert_eq!(info.host, "127.0.0.1");
        assert_eq!(info.port, port);
        assert_eq!(info.protocol, "TCPv4");
        assert_eq!(info.ip_addr, "127.0.0.1");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_resolution() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let cache = Arc::new(EndpointCache::new());
        cache.set("127.0.0.1", addr.port(), addr);
        let config = test_config(addr.port(), Some(cache));
        let parent = Arc::new(TestParent::default());

        let mut client = config.new_client(parent.clone());
        client.start().await;

        assert_eq!(client.state(), ClientState::Active);
        assert_eq!(parent.events(), vec![Event::Wait, Event::Connecting]);
    }

    #[tokio::test]
    async fn test_second_client_skips_resolution_after_first_connect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = test_config(port, Some(Arc::new(EndpointCache::new())));

        let first_parent = Arc::new(TestParent::default());
        let mut first = config.new_client(first_parent.clone());
        first.start().await;
        assert!(first_parent.events().contains(&Event::PreResolve));

        let second_parent = Arc::new(TestParent::default());
        let mut second = config.new_client(second_parent.clone());
        second.start().await;
        assert_eq!(second_parent.events(), vec![Event::Wait, Event::Connecting]);
    }

    #[tokio::test]
    async fn test_resolve_error_halts() {
        let config = Arc::new(
            ClientConfig::builder()
                .server_host("invalid.invalid")
                .server_port(1)
                .build(),
        );
        let parent = Arc::new(TestParent::default());
        let mut client = config.new_client(parent.clone());

        client.start().await;

        assert_eq!(client.state(), ClientState::Halted);
        let events = parent.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::PreResolve);
        assert!(matches!(
            events[1],
            Event::Error(TransportError::Resolve(_))
        ));
        assert_eq!(config.stats.snapshot().resolve_errors, 1);
    }

    #[tokio::test]
    async fn test_connect_error_halts() {
        // grab a port with no listener behind it
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = test_config(port, None);
        let parent = Arc::new(TestParent::default());
        let mut client = config.new_client(parent.clone());

        client.start().await;

        assert_eq!(client.state(), ClientState::Halted);
        let events = parent.events();
        assert_eq!(events.len(), 3);
        assert_eq!(&events[..2], &[Event::PreResolve, Event::Wait]);
        assert!(matches!(
            events[2],
            Event::Error(TransportError::Connect(_))
        ));
        assert_eq!(config.stats.snapshot().connect_errors, 1);
    }

    #[tokio::test]
    async fn test_stop_twice_emits_nothing_extra() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = test_config(port, None);
        let parent = Arc::new(TestParent::default());

        let mut client = config.new_client(parent.clone());
        client.start().await;
        let events_after_start = parent.events();

        client.stop();
        client.stop();
        assert_eq!(client.state(), ClientState::Halted);
        assert_eq!(parent.events(), events_after_start);
        assert!(!client.transport_send_const(b"late"));
    }

    #[tokio::test]
    async fn test_active_send_reaches_wire_framed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = test_config(port, None);
        let parent = Arc::new(TestParent::default());

        let mut client = config.new_client(parent.clone());
        client.start().await;
        let (mut server, _) = listener.accept().await.unwrap();

        assert!(client.transport_send_const(b"hello"));

        let mut wire = [0u8; 7];
        server.read_exact(&mut wire).await.unwrap();
        assert_eq!(&wire[..2], &[0x00, 0x05]);
        assert_eq!(&wire[2..], b"hello");
        wait_for(|| config.stats.snapshot().bytes_sent >= 5).await;
    }

    #[tokio::test]
    async fn test_inbound_frames_forwarded_to_parent() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = test_config(port, None);
        let parent = Arc::new(TestParent::default());

        let mut client = config.new_client(parent.clone());
        client.start().await;
        let (mut server, _) = listener.accept().await.unwrap();

        server.write_all(&[0x00, 0x03, b'a', b'b', b'c']).await.unwrap();

        wait_for(|| parent.events().contains(&Event::Recv(b"abc".to_vec()))).await;
        drop(client);
    }

    #[tokio::test]
    async fn test_peer_close_reports_network_eof_once() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = test_config(port, None);
        let parent = Arc::new(TestParent::default());

        let mut client = config.new_client(parent.clone());
        client.start().await;
        let (server, _) = listener.accept().await.unwrap();
        drop(server);

        wait_for(|| {
            parent
                .events()
                .contains(&Event::Error(TransportError::NetworkEof))
        })
        .await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let errors: Vec<_> = parent
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Error(_)))
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(config.stats.snapshot().network_eof, 1);

        // halted: sends refuse, stop stays quiet
        assert!(!client.transport_send_const(b"late"));
        client.stop();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_socket_protect_rejection_halts() {
        struct RejectAll;
        impl SocketProtect for RejectAll {
            fn protect(&self, _socket: RawSocketHandle) -> bool {
                false
            }
        }

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = Arc::new(
            ClientConfig::builder()
                .server_host("127.0.0.1")
                .server_port(port)
                .socket_protect(Arc::new(RejectAll))
                .build(),
        );
        let parent = Arc::new(TestParent::default());
        let mut client = config.new_client(parent.clone());

        client.start().await;

        assert_eq!(client.state(), ClientState::Halted);
        let events = parent.events();
        assert_eq!(
            events.last(),
            Some(&Event::Error(TransportError::SocketProtect))
        );
        assert_eq!(config.stats.snapshot().socket_protect_errors, 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_socket_protect_accept_proceeds() {
        struct AcceptAll;
        impl SocketProtect for AcceptAll {
            fn protect(&self, socket: RawSocketHandle) -> bool {
                socket >= 0
            }
        }

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = Arc::new(
            ClientConfig::builder()
                .server_host("127.0.0.1")
                .server_port(port)
                .socket_protect(Arc::new(AcceptAll))
                .build(),
        );
        let parent = Arc::new(TestParent::default());
        let mut client = config.new_client(parent.clone());

        client.start().await;
        assert_eq!(client.state(), ClientState::Active);
    }
}
