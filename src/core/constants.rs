//! Protocol constants for the PASSAGE transport.
//!
//! These values are fixed by the protocol and MUST NOT be changed.

// =============================================================================
// AUTHENTICATION
// =============================================================================

/// Largest digest output produced by any supported algorithm (SHA-512).
///
/// Sizes the scratch tag buffer used during verification.
pub const MAX_DIGEST_SIZE: usize = 64;

// =============================================================================
// PACKET IDS
// =============================================================================

/// Short (32-bit) packet-id wire size.
pub const PACKET_ID_SHORT_SIZE: usize = 4;

/// Wide (64-bit) packet-id wire size.
pub const PACKET_ID_LONG_SIZE: usize = 8;

/// Short packet-id level at which the sender should warn the upper layer
/// that the sequence space is nearing exhaustion.
pub const PACKET_ID_WRAP_WARN: u64 = 0xFF00_0000;

/// Receive-side replay window size in bits.
pub const REPLAY_WINDOW_SIZE: usize = 2048;

// =============================================================================
// STREAM LINK
// =============================================================================

/// Wire size of the length prefix in framed mode (16-bit big-endian).
pub const FRAME_LENGTH_PREFIX_SIZE: usize = 2;

/// Largest frame expressible by the length prefix.
pub const MAX_FRAME_SIZE: usize = u16::MAX as usize;

/// Default bound on the outbound queue (buffers, not bytes).
pub const DEFAULT_SEND_QUEUE_MAX_SIZE: usize = 1024;

/// Default bound on the reusable-buffer free list.
pub const DEFAULT_FREE_LIST_MAX_SIZE: usize = 8;

/// Default size of a single raw-mode read.
pub const DEFAULT_READ_FRAME_SIZE: usize = 2048;
