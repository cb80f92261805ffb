//! Endpoint cache for resolved server addresses.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;

/// Cache of the most recently successfully-connected address per
/// (host, port) key.
///
/// Read before resolution is attempted (a hit skips the resolver) and
/// written only after a successful connect, so a stale entry can cost at
/// most one failed connect before normal overwrite-on-success repairs it.
/// Safe to share across clients; the map carries its own lock.
#[derive(Debug, Default)]
pub struct EndpointCache {
    map: Mutex<HashMap<(String, u16), SocketAddr>>,
}

impl EndpointCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the last known-good address for (host, port).
    pub fn get(&self, host: &str, port: u16) -> Option<SocketAddr> {
        self.map
            .lock()
            .expect("endpoint cache lock")
            .get(&(host.to_string(), port))
            .copied()
    }

    /// Record `addr` as the last known-good address for (host, port),
    /// overwriting any prior entry.
    pub fn set(&self, host: &str, port: u16, addr: SocketAddr) {
        self.map
            .lock()
            .expect("endpoint cache lock")
            .insert((host.to_string(), port), addr);
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.map.lock().expect("endpoint cache lock").len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
