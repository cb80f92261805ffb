//! Framed stream link.
//!
//! Owns the connected socket once the client hands it off: serializes
//! outbound buffers respecting a bounded queue, reassembles inbound frames,
//! and reports failures upward through [`LinkHandler`] callbacks, since
//! there is no synchronous caller to receive an error return inside async
//! completion handling.
//!
//! The underlying transport is a byte stream with no message boundaries,
//! so framed mode prefixes every outbound buffer with a 16-bit big-endian
//! length and buffers partial inbound frames until complete. Raw mode
//! bypasses the prefix for protocols that impose their own framing, e.g.
//! during a handshake phase.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::buffer::{BufferPool, PoolBuffer};
use crate::core::{SessionStats, FRAME_LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE};

/// Callbacks a link owner implements to receive link events.
///
/// Invoked from the link's I/O tasks; implementations must not block.
pub trait LinkHandler: Send + Sync + 'static {
    /// A complete inbound frame (framed mode) or read chunk (raw mode).
    fn link_recv(&self, frame: PoolBuffer);

    /// The peer closed the stream.
    fn link_eof(&self);

    /// A socket-level failure; the link has stopped issuing I/O.
    fn link_error(&self, err: io::Error);
}

/// State shared between the link facade and its I/O tasks.
struct LinkShared {
    handler: Arc<dyn LinkHandler>,
    pool: Arc<BufferPool>,
    stats: Arc<SessionStats>,
    raw_mode: AtomicBool,
    halted: AtomicBool,
    shutdown: watch::Sender<bool>,
}

impl LinkShared {
    /// Stop both I/O tasks; further sends fail. Returns `true` for the one
    /// caller that performed the transition.
    fn trigger_shutdown(&self) -> bool {
        let already = self.halted.swap(true, Ordering::SeqCst);
        let _ = self.shutdown.send(true);
        !already
    }

    fn halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }
}

/// Framed send/receive engine over a connected stream socket.
pub struct StreamLink {
    shared: Arc<LinkShared>,
    tx: mpsc::Sender<PoolBuffer>,
    // taken by start()
    rx: Option<mpsc::Receiver<PoolBuffer>>,
    stream: Option<TcpStream>,
    shutdown_rx: watch::Receiver<bool>,
    read_frame_size: usize,
    tasks: Vec<JoinHandle<()>>,
}

impl StreamLink {
    /// Bind a link to an already-connected stream.
    ///
    /// `send_queue_max` bounds the outbound queue in buffers (not bytes);
    /// `free_list_max` bounds the reusable-buffer pool;
    /// `read_frame_size` sizes raw-mode reads. I/O does not begin until
    /// [`start`](Self::start).
    pub fn new(
        stream: TcpStream,
        send_queue_max: usize,
        free_list_max: usize,
        read_frame_size: usize,
        handler: Arc<dyn LinkHandler>,
        stats: Arc<SessionStats>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(send_queue_max.max(1));
        let (shutdown, shutdown_rx) = watch::channel(false);
        Self {
            shared: Arc::new(LinkShared {
                handler,
                pool: Arc::new(BufferPool::new(free_list_max)),
                stats,
                raw_mode: AtomicBool::new(false),
                halted: AtomicBool::new(false),
                shutdown,
            }),
            tx,
            rx: Some(rx),
            stream: Some(stream),
            shutdown_rx,
            read_frame_size,
            tasks: Vec::new(),
        }
    }

    /// Begin issuing asynchronous read and write operations.
    ///
    /// Calling again after the first start is a no-op.
    pub fn start(&mut self) {
        let (Some(stream), Some(rx)) = (self.stream.take(), self.rx.take()) else {
            return;
        };
        let (read_half, write_half) = stream.into_split();

        let shared = Arc::clone(&self.shared);
        let shutdown = self.shutdown_rx.clone();
        self.tasks
            .push(tokio::spawn(writer_task(shared, rx, write_half, shutdown)));

        let shared = Arc::clone(&self.shared);
        let shutdown = self.shutdown_rx.clone();
        let read_frame_size = self.read_frame_size;
        self.tasks.push(tokio::spawn(reader_task(
            shared,
            read_half,
            shutdown,
            read_frame_size,
        )));
    }

    /// Cease all I/O. Safe to call from any state, any number of times;
    /// the link never resumes afterward.
    pub fn stop(&mut self) {
        self.shared.trigger_shutdown();
        for task in self.tasks.drain(..) {
            task.abort();
        }
        // release any un-started socket so it closes now
        self.stream = None;
        self.rx = None;
    }

    /// Enqueue a buffer for transmission.
    ///
    /// Returns `false` without blocking when the queue is at its bound
    /// (backpressure) or the link has stopped; the caller owns retry
    /// policy. A refused buffer is recycled, not transmitted.
    pub fn send(&self, buf: PoolBuffer) -> bool {
        if self.shared.halted() {
            return false;
        }
        match self.tx.try_send(buf) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(buf))
            | Err(mpsc::error::TrySendError::Closed(buf)) => {
                self.shared.pool.release(buf);
                false
            }
        }
    }

    /// Copy `data` into a pooled buffer and enqueue it.
    pub fn send_copy(&self, data: &[u8]) -> bool {
        if self.shared.halted() {
            return false;
        }
        self.send(self.shared.pool.alloc_copy(data))
    }

    /// Whether the outbound queue is empty.
    pub fn send_queue_empty(&self) -> bool {
        self.send_queue_size() == 0
    }

    /// Buffers currently waiting in the outbound queue.
    pub fn send_queue_size(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    /// Reserve `align_adjust` bytes of headroom at the front of freshly
    /// allocated buffers so higher layers can prepend without
    /// reallocating. Purely a layout optimization.
    pub fn reset_align_adjust(&self, align_adjust: usize) {
        self.shared.pool.set_headroom(align_adjust);
    }

    /// Toggle length-delimited framing.
    ///
    /// Raw mode passes bytes through unframed in both directions.
    pub fn set_raw_mode(&self, raw: bool) {
        self.shared.raw_mode.store(raw, Ordering::SeqCst);
    }

    /// Allocate an outbound buffer from the link's pool.
    pub fn alloc_buffer(&self, capacity: usize) -> PoolBuffer {
        self.shared.pool.alloc(capacity)
    }
}

impl Drop for StreamLink {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Drain the outbound queue onto the socket, in `send` order.
async fn writer_task(
    shared: Arc<LinkShared>,
    mut rx: mpsc::Receiver<PoolBuffer>,
    mut write_half: OwnedWriteHalf,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let buf = tokio::select! {
            _ = shutdown.changed() => break,
            buf = rx.recv() => match buf {
                Some(buf) => buf,
                None => break,
            },
        };
        if shared.halted() {
            break;
        }

        let payload_len = buf.len();
        let framed = !shared.raw_mode.load(Ordering::SeqCst);
        if framed && payload_len > MAX_FRAME_SIZE {
            warn!(payload_len, "outbound frame exceeds length-prefix range");
            deliver_error(
                &shared,
                io::Error::new(io::ErrorKind::InvalidData, "outbound frame too large"),
            );
            break;
        }

        let result = write_buffer(&mut write_half, buf, framed, payload_len).await;
        match result {
            Ok(buf) => {
                shared.stats.frame_sent(payload_len);
                shared.pool.release(buf);
            }
            Err(err) => {
                deliver_error(&shared, err);
                break;
            }
        }
    }
}

/// Write one buffer, prefixing its length in framed mode. Returns the
/// buffer for recycling.
async fn write_buffer(
    write_half: &mut OwnedWriteHalf,
    mut buf: PoolBuffer,
    framed: bool,
    payload_len: usize,
) -> io::Result<PoolBuffer> {
    if framed {
        let prefix: [u8; FRAME_LENGTH_PREFIX_SIZE] = (payload_len as u16).to_be_bytes();
        // prepend into headroom when available, one write instead of two
        if !buf.prepend(&prefix) {
            write_half.write_all(&prefix).await?;
        }
    }
    write_half.write_all(buf.as_slice()).await?;
    Ok(buf)
}

/// Issue reads and deliver complete frames upward, in wire order.
async fn reader_task(
    shared: Arc<LinkShared>,
    mut read_half: OwnedReadHalf,
    mut shutdown: watch::Receiver<bool>,
    read_frame_size: usize,
) {
    loop {
        if shared.halted() {
            break;
        }

        if shared.raw_mode.load(Ordering::SeqCst) {
            let mut buf = shared.pool.alloc(read_frame_size);
            buf.resize_payload(read_frame_size);
            let n = tokio::select! {
                _ = shutdown.changed() => break,
                r = read_half.read(buf.as_mut_slice()) => match r {
                    Ok(0) => {
                        deliver_eof(&shared);
                        break;
                    }
                    Ok(n) => n,
                    Err(err) => {
                        deliver_error(&shared, err);
                        break;
                    }
                },
            };
            buf.truncate_payload(n);
            shared.stats.frame_recv(n);
            shared.handler.link_recv(buf);
        } else {
            // length prefix, then the complete frame; partial frames stay
            // buffered in the socket until read_exact finishes them
            let frame_len = tokio::select! {
                _ = shutdown.changed() => break,
                r = read_half.read_u16() => match r {
                    Ok(len) => len as usize,
                    Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                        deliver_eof(&shared);
                        break;
                    }
                    Err(err) => {
                        deliver_error(&shared, err);
                        break;
                    }
                },
            };
            let mut buf = shared.pool.alloc(frame_len);
            buf.resize_payload(frame_len);
            tokio::select! {
                _ = shutdown.changed() => break,
                r = read_half.read_exact(buf.as_mut_slice()) => match r {
                    Ok(_) => {}
                    Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                        deliver_eof(&shared);
                        break;
                    }
                    Err(err) => {
                        deliver_error(&shared, err);
                        break;
                    }
                },
            }
            shared.stats.frame_recv(frame_len);
            shared.handler.link_recv(buf);
        }
    }
}

fn deliver_eof(shared: &LinkShared) {
    if shared.trigger_shutdown() {
        debug!("stream link: peer closed");
        shared.handler.link_eof();
    }
}

fn deliver_error(shared: &LinkShared, err: io::Error) {
    if shared.trigger_shutdown() {
        warn!(%err, "stream link: socket error");
        shared.handler.link_error(err);
    }
}
