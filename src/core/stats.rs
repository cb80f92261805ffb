//! Session statistics sink.
//!
//! One `SessionStats` instance is shared by reference across every
//! transport client produced from a config. Counters use atomic-increment
//! semantics so concurrent readers and the event path never contend.

use std::sync::atomic::{AtomicU64, Ordering};

use super::error::TransportError;

/// Atomic counters for transport events.
///
/// Cheap to share (`Arc<SessionStats>`); all operations are relaxed
/// increments. Use [`snapshot`](Self::snapshot) for a consistent-enough
/// read-out.
#[derive(Debug, Default)]
pub struct SessionStats {
    resolve_errors: AtomicU64,
    connect_errors: AtomicU64,
    socket_protect_errors: AtomicU64,
    network_eof: AtomicU64,
    transport_errors: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_recv: AtomicU64,
    frames_sent: AtomicU64,
    frames_recv: AtomicU64,
}

impl SessionStats {
    /// Create a zeroed statistics sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of a transport error.
    pub fn error(&self, err: &TransportError) {
        let counter = match err {
            TransportError::Resolve(_) => &self.resolve_errors,
            TransportError::Connect(_) => &self.connect_errors,
            TransportError::SocketProtect => &self.socket_protect_errors,
            TransportError::NetworkEof => &self.network_eof,
            TransportError::Transport(_) => &self.transport_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an outbound frame of `bytes` payload bytes.
    pub fn frame_sent(&self, bytes: usize) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record an inbound frame of `bytes` payload bytes.
    pub fn frame_recv(&self, bytes: usize) {
        self.frames_recv.fetch_add(1, Ordering::Relaxed);
        self.bytes_recv.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Read all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            resolve_errors: self.resolve_errors.load(Ordering::Relaxed),
            connect_errors: self.connect_errors.load(Ordering::Relaxed),
            socket_protect_errors: self.socket_protect_errors.load(Ordering::Relaxed),
            network_eof: self.network_eof.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_recv: self.bytes_recv.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            frames_recv: self.frames_recv.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SessionStats`] counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Name-resolution failures.
    pub resolve_errors: u64,
    /// Stream connect failures.
    pub connect_errors: u64,
    /// Socket-protection hook rejections.
    pub socket_protect_errors: u64,
    /// Peer-closed-stream events.
    pub network_eof: u64,
    /// Other fatal transport conditions.
    pub transport_errors: u64,
    /// Payload bytes written to the wire.
    pub bytes_sent: u64,
    /// Payload bytes delivered from the wire.
    pub bytes_recv: u64,
    /// Frames written to the wire.
    pub frames_sent: u64,
    /// Frames delivered from the wire.
    pub frames_recv: u64,
}
