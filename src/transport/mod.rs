//! PASSAGE Protocol - Stream Transport Layer
//!
//! This module implements the client side of the stream transport:
//!
//! - **Connection lifecycle**: [`TransportClient`] state machine driving
//!   resolution, socket protection, connect and link hand-off
//! - **Framed I/O**: [`StreamLink`] with bounded-queue backpressure and
//!   length-delimited framing (or raw pass-through)
//! - **Endpoint cache**: [`EndpointCache`] so reconnects skip resolution
//! - **Buffer reuse**: [`PoolBuffer`] / [`BufferPool`] with prepend headroom
//!
//! # Architecture
//!
//! The transport sits below the control-channel session layer and above
//! the operating system's stream sockets. It moves authenticated packets;
//! it never interprets them.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Control-channel session          │
//! ├─────────────────────────────────────────┤
//! │          Transport client               │  ← this module
//! │   resolve, connect, frame, backpressure │
//! ├─────────────────────────────────────────┤
//! │              TCP stream                 │
//! └─────────────────────────────────────────┘
//! ```
//!
//! All lifecycle transitions for one client happen on a single logical
//! thread of control; the link's reader and writer are cooperative tasks
//! silenced by a shared halted flag once the client stops.

mod buffer;
mod client;
mod endpoint;
mod link;

pub use buffer::{BufferPool, PoolBuffer};
pub use client::{
    ClientConfig, ClientConfigBuilder, ClientState, RawSocketHandle, ServerEndpointInfo,
    SocketProtect, TransportClient, TransportParent,
};
pub use endpoint::EndpointCache;
pub use link::{LinkHandler, StreamLink};
