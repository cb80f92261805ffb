//! Reusable buffers for the stream link.
//!
//! `PoolBuffer` keeps configurable headroom at the front so higher layers
//! can prepend framing or headers without reallocating. `BufferPool` is a
//! bounded free list; buffers that fall off the bound are simply dropped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// An owned byte buffer with reserved front headroom.
#[derive(Debug, Default)]
pub struct PoolBuffer {
    data: Vec<u8>,
    start: usize,
}

impl PoolBuffer {
    /// Allocate an empty buffer with `headroom` bytes reserved in front
    /// and capacity for `capacity` payload bytes.
    pub fn with_headroom(headroom: usize, capacity: usize) -> Self {
        let mut data = Vec::with_capacity(headroom + capacity);
        data.resize(headroom, 0);
        Self {
            data,
            start: headroom,
        }
    }

    /// Allocate a buffer holding a copy of `bytes`, with `headroom`
    /// reserved in front of it.
    pub fn from_slice(bytes: &[u8], headroom: usize) -> Self {
        let mut buf = Self::with_headroom(headroom, bytes.len());
        buf.append(bytes);
        buf
    }

    /// Payload length.
    pub fn len(&self) -> usize {
        self.data.len() - self.start
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remaining headroom available for prepends.
    pub fn headroom(&self) -> usize {
        self.start
    }

    /// Append bytes to the payload.
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Prepend bytes into the headroom.
    ///
    /// Returns `false` without writing if the headroom cannot hold them.
    pub fn prepend(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() > self.start {
            return false;
        }
        self.start -= bytes.len();
        self.data[self.start..self.start + bytes.len()].copy_from_slice(bytes);
        true
    }

    /// Grow the payload to exactly `len` bytes, zero-filling new space.
    pub fn resize_payload(&mut self, len: usize) {
        self.data.resize(self.start + len, 0);
    }

    /// Shrink the payload to `len` bytes; no-op if already shorter.
    pub fn truncate_payload(&mut self, len: usize) {
        if len < self.len() {
            self.data.truncate(self.start + len);
        }
    }

    /// Payload bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.start..]
    }

    /// Mutable payload bytes.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data[self.start..]
    }

    /// Clear the payload and re-establish `headroom` bytes of headroom,
    /// keeping the allocation.
    fn reset(&mut self, headroom: usize) {
        self.data.clear();
        self.data.resize(headroom, 0);
        self.start = headroom;
    }
}

impl AsRef<[u8]> for PoolBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Bounded free list of reusable buffers.
///
/// Shared between the link and its I/O tasks; the headroom applied to
/// fresh allocations can be adjusted at runtime via
/// [`set_headroom`](Self::set_headroom).
#[derive(Debug)]
pub struct BufferPool {
    free: Mutex<Vec<PoolBuffer>>,
    max_free: usize,
    headroom: AtomicUsize,
}

impl BufferPool {
    /// Create a pool keeping at most `max_free` buffers.
    pub fn new(max_free: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_free,
            headroom: AtomicUsize::new(0),
        }
    }

    /// Set the headroom reserved at the front of buffers handed out from
    /// now on.
    pub fn set_headroom(&self, headroom: usize) {
        self.headroom.store(headroom, Ordering::Relaxed);
    }

    /// Current headroom setting.
    pub fn headroom(&self) -> usize {
        self.headroom.load(Ordering::Relaxed)
    }

    /// Take a buffer from the free list, or allocate one sized for
    /// `capacity` payload bytes.
    pub fn alloc(&self, capacity: usize) -> PoolBuffer {
        let headroom = self.headroom();
        let recycled = self.free.lock().expect("buffer pool lock").pop();
        match recycled {
            Some(mut buf) => {
                buf.reset(headroom);
                buf
            }
            None => PoolBuffer::with_headroom(headroom, capacity),
        }
    }

    /// Copy `bytes` into a pooled buffer.
    pub fn alloc_copy(&self, bytes: &[u8]) -> PoolBuffer {
        let mut buf = self.alloc(bytes.len());
        buf.append(bytes);
        buf
    }

    /// Return a buffer to the free list; dropped if the list is full.
    pub fn release(&self, buf: PoolBuffer) {
        let mut free = self.free.lock().expect("buffer pool lock");
        if free.len() < self.max_free {
            free.push(buf);
        }
    }

    /// Number of buffers currently parked in the free list.
    pub fn free_count(&self) -> usize {
        self.free.lock().expect("buffer pool lock").len()
    }
}
