//! # PASSAGE Protocol
//!
//! **P**acket-**A**uthenticated **S**ecure **S**tream **A**ccess
//! **G**ateway **E**ngine
//!
//! PASSAGE is the transport core of a stream-based tunneling protocol
//! client. It provides:
//!
//! - **Connection lifecycle**: async resolve → protect → connect state
//!   machine with an endpoint cache for fast reconnects
//! - **Framed transport**: length-delimited stream framing with bounded
//!   outbound queues and explicit backpressure
//! - **Packet authentication**: keyed HMAC over the protocol's
//!   control-packet layout with timing-safe verification
//! - **Replay screening**: packet-id sequencing with a sliding-window
//!   replay guard
//!
//! Encryption, key negotiation and the control-channel session protocol
//! live above this crate; PASSAGE moves and authenticates packets, it
//! never interprets them.
//!
//! ## Feature Flags
//!
//! - `transport` (default): Stream transport (client, link, cache, buffers)
//! - `auth` (default): Packet authentication (HMAC engine, packet ids)
//!
//! ## Modules
//!
//! - [`core`]: Errors, constants, and statistics (always included)
//! - [`transport`]: Transport layer (requires `transport` feature)
//! - [`auth`]: Authentication layer (requires `auth` feature)
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use passage_protocol::prelude::*;
//!
//! struct Session;
//!
//! impl TransportParent for Session {
//!     fn recv(&self, frame: PoolBuffer) {
//!         println!("got {} bytes", frame.len());
//!     }
//!
//!     fn error(&self, err: TransportError) {
//!         eprintln!("transport down: {err}");
//!     }
//! }
//!
//! # async fn run() {
//! let config = Arc::new(
//!     ClientConfig::builder()
//!         .server_host("vpn.example.com")
//!         .server_port(1194)
//!         .endpoint_cache(Arc::new(EndpointCache::new()))
//!         .build(),
//! );
//!
//! let mut client = config.new_client(Arc::new(Session));
//! client.start().await;
//! client.transport_send_const(b"control packet");
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Transport layer (feature-gated)
#[cfg(feature = "transport")]
#[cfg_attr(docsrs, doc(cfg(feature = "transport")))]
pub mod transport;

// Authentication layer (feature-gated)
#[cfg(feature = "auth")]
#[cfg_attr(docsrs, doc(cfg(feature = "auth")))]
pub mod auth;

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use crate::core::*;

    // Transport types (when enabled)
    #[cfg(feature = "transport")]
    pub use crate::transport::{
        BufferPool, ClientConfig, ClientConfigBuilder, ClientState, EndpointCache, LinkHandler,
        PoolBuffer, RawSocketHandle, ServerEndpointInfo, SocketProtect, StreamLink,
        TransportClient, TransportParent,
    };

    // Authentication types (when enabled)
    #[cfg(feature = "auth")]
    pub use crate::auth::*;
}

// Re-export commonly used items at crate root
pub use crate::core::{AuthError, PassageError, SessionStats, TransportError};

#[cfg(feature = "auth")]
pub use crate::auth::{DigestAlgorithm, PacketAuthenticator, PacketLayout, StaticKey};

#[cfg(feature = "transport")]
pub use crate::transport::{
    ClientConfig, EndpointCache, StreamLink, TransportClient, TransportParent,
};
