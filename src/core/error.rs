//! Error types for the PASSAGE transport.

use thiserror::Error;

/// Errors from the packet authentication engine.
///
/// These are caller-configuration errors: fatal to the operation that
/// raised them, never to the process. Verification failure is *not* an
/// error; `verify` returns a boolean and the control layer decides policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Key material is shorter than the algorithm requires.
    #[error("key too short: algorithm requires {required} bytes, got {provided}")]
    KeyTooShort {
        /// Bytes the algorithm requires.
        required: usize,
        /// Bytes the caller supplied.
        provided: usize,
    },

    /// Packet layout is inconsistent with the buffer or the digest size.
    #[error("bad packet layout: header {header_len} + tag {tag_len} + packet-id {pid_len} does not fit buffer of {buf_len} bytes (digest size {digest_size})")]
    BadLayout {
        /// Leading header length.
        header_len: usize,
        /// Tag slot length.
        tag_len: usize,
        /// Packet-id field length.
        pid_len: usize,
        /// Total buffer length.
        buf_len: usize,
        /// The engine's digest output size.
        digest_size: usize,
    },

    /// The outbound packet-id sequence space is exhausted.
    #[error("packet-id space exhausted")]
    PacketIdExhausted,
}

/// Connection-fatal transport errors.
///
/// Each is reported exactly once to the owner, after which the client has
/// halted. Retry and reconnect policy belongs to the owner.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Name resolution failed.
    #[error("resolve error: {0}")]
    Resolve(String),

    /// The stream connect attempt failed.
    #[error("connect error: {0}")]
    Connect(String),

    /// The platform socket-protection hook rejected the socket.
    #[error("socket protect error")]
    SocketProtect,

    /// The peer closed the stream.
    #[error("network EOF")]
    NetworkEof,

    /// Any other fatal transport condition.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Top-level PASSAGE errors.
#[derive(Debug, Error)]
pub enum PassageError {
    /// Authentication engine error.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
