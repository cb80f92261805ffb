//! PASSAGE Protocol - Packet Authentication Layer
//!
//! Implements the keyed integrity engine for control-channel packets:
//!
//! - **Algorithm registry**: [`DigestAlgorithm`] with key/output sizing
//! - **Key material**: [`StaticKey`], zeroized on drop
//! - **Authentication engine**: [`PacketAuthenticator`] with the
//!   control-packet byte reordering and timing-safe verification
//! - **Packet ids**: [`PacketId`], [`PacketIdSender`], [`ReplayGuard`]
//!
//! The engine signs and verifies packets laid out as
//! `[header][tag][packet-id][payload...]`; it authenticates the packet id
//! and header but never interprets them. Replay and ordering policy
//! belongs to the control-channel layer above.

mod algs;
mod hmac;
mod key;
mod packet_id;

pub use self::algs::DigestAlgorithm;
pub use self::hmac::{PacketAuthenticator, PacketLayout};
pub use self::key::StaticKey;
pub use self::packet_id::{PacketId, PacketIdSender, ReplayGuard};
