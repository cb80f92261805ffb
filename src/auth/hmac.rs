//! Keyed packet authentication for the control channel.
//!
//! Control packets are laid out `[header][tag][packet-id][payload...]` on
//! the wire. The tag is computed over a reordered view of the packet:
//! packet-id first, then the leading header, then everything after the
//! packet-id field. The tag slot itself is never hashed, which breaks the
//! circular dependency of a tag over its own bytes while still binding the
//! packet id and header together for the receiver.

use hmac::{Hmac, Mac};
use sha2::{Sha224, Sha256, Sha384, Sha512};

use super::algs::DigestAlgorithm;
use super::key::StaticKey;
use crate::core::{AuthError, MAX_DIGEST_SIZE};

/// Per-call description of a control packet's layout.
///
/// `header_len` bytes of opcode + session id at the start of the buffer,
/// a `tag_len`-byte tag slot, then a `pid_len`-byte packet-id field.
/// Anything after the packet id is payload. Validated on every call,
/// never stored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketLayout {
    /// Leading header length (opcode + session id).
    pub header_len: usize,
    /// Tag slot length; must equal the engine's digest size.
    pub tag_len: usize,
    /// Packet-id field length, immediately after the tag slot.
    pub pid_len: usize,
}

impl PacketLayout {
    /// Describe a packet layout.
    pub const fn new(header_len: usize, tag_len: usize, pid_len: usize) -> Self {
        Self {
            header_len,
            tag_len,
            pid_len,
        }
    }

    /// Combined length of header, tag slot and packet id, if it fits usize.
    pub fn total(&self) -> Option<usize> {
        self.header_len
            .checked_add(self.tag_len)?
            .checked_add(self.pid_len)
    }
}

/// One initialized HMAC context, dispatched over the supported backends.
///
/// All backends are known at build time, so a tagged union avoids dynamic
/// dispatch on the per-packet path.
enum MacCtx {
    Sha224(Hmac<Sha224>),
    Sha256(Hmac<Sha256>),
    Sha384(Hmac<Sha384>),
    Sha512(Hmac<Sha512>),
}

impl MacCtx {
    fn update(&mut self, data: &[u8]) {
        match self {
            MacCtx::Sha224(m) => m.update(data),
            MacCtx::Sha256(m) => m.update(data),
            MacCtx::Sha384(m) => m.update(data),
            MacCtx::Sha512(m) => m.update(data),
        }
    }

    /// Finalize into `out`, reset the context for reuse, return digest len.
    fn finalize_reset_into(&mut self, out: &mut [u8]) -> usize {
        match self {
            MacCtx::Sha224(m) => {
                let tag = m.finalize_reset().into_bytes();
                out[..tag.len()].copy_from_slice(&tag);
                tag.len()
            }
            MacCtx::Sha256(m) => {
                let tag = m.finalize_reset().into_bytes();
                out[..tag.len()].copy_from_slice(&tag);
                tag.len()
            }
            MacCtx::Sha384(m) => {
                let tag = m.finalize_reset().into_bytes();
                out[..tag.len()].copy_from_slice(&tag);
                tag.len()
            }
            MacCtx::Sha512(m) => {
                let tag = m.finalize_reset().into_bytes();
                out[..tag.len()].copy_from_slice(&tag);
                tag.len()
            }
        }
    }
}

/// Keyed integrity engine for control-channel packets.
///
/// Owns one incremental HMAC context bound to one algorithm and one key.
/// Reusable across any number of operations; each operation leaves the
/// context reset. Not for concurrent use; operations take `&mut self`.
pub struct PacketAuthenticator {
    algorithm: DigestAlgorithm,
    ctx: MacCtx,
}

impl PacketAuthenticator {
    /// Bind an HMAC context to `algorithm` using the first
    /// [`key_size()`](DigestAlgorithm::key_size) bytes of `key`.
    ///
    /// Fails with [`AuthError::KeyTooShort`] if the key cannot cover the
    /// algorithm's requirement.
    pub fn new(algorithm: DigestAlgorithm, key: &StaticKey) -> Result<Self, AuthError> {
        let required = algorithm.key_size();
        if key.len() < required {
            return Err(AuthError::KeyTooShort {
                required,
                provided: key.len(),
            });
        }
        let key = &key.as_bytes()[..required];

        // HMAC itself accepts any key length, so construction cannot fail
        // once the protocol's own size check has passed.
        let ctx = match algorithm {
            DigestAlgorithm::Sha224 => {
                MacCtx::Sha224(Hmac::new_from_slice(key).expect("hmac accepts any key length"))
            }
            DigestAlgorithm::Sha256 => {
                MacCtx::Sha256(Hmac::new_from_slice(key).expect("hmac accepts any key length"))
            }
            DigestAlgorithm::Sha384 => {
                MacCtx::Sha384(Hmac::new_from_slice(key).expect("hmac accepts any key length"))
            }
            DigestAlgorithm::Sha512 => {
                MacCtx::Sha512(Hmac::new_from_slice(key).expect("hmac accepts any key length"))
            }
        };

        Ok(Self { algorithm, ctx })
    }

    /// The bound algorithm.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Fixed tag length produced by this engine; callers size tag slots
    /// with this.
    pub fn digest_size(&self) -> usize {
        self.algorithm.output_size()
    }

    /// Compute the packet tag and write it into the tag slot in place.
    ///
    /// Hash input order: packet-id field, then the leading header, then all
    /// bytes after the packet-id field. The tag slot is excluded.
    pub fn generate(&mut self, buf: &mut [u8], layout: PacketLayout) -> Result<(), AuthError> {
        if !self.layout_ok(buf.len(), layout) {
            return Err(AuthError::BadLayout {
                header_len: layout.header_len,
                tag_len: layout.tag_len,
                pid_len: layout.pid_len,
                buf_len: buf.len(),
                digest_size: self.digest_size(),
            });
        }

        self.update_reordered(buf, layout);
        let mut tag = [0u8; MAX_DIGEST_SIZE];
        let n = self.ctx.finalize_reset_into(&mut tag);
        buf[layout.header_len..layout.header_len + layout.tag_len].copy_from_slice(&tag[..n]);
        Ok(())
    }

    /// Recompute the tag with the identical reordering and compare it
    /// against the tag slot.
    ///
    /// Returns `false` (never an error) on layout violations, so a
    /// malformed packet is indistinguishable from a forged one. The
    /// comparison is timing-safe and non-short-circuiting.
    pub fn verify(&mut self, buf: &[u8], layout: PacketLayout) -> bool {
        if !self.layout_ok(buf.len(), layout) {
            return false;
        }

        self.update_reordered(buf, layout);
        let mut local = [0u8; MAX_DIGEST_SIZE];
        let n = self.ctx.finalize_reset_into(&mut local);
        let slot = &buf[layout.header_len..layout.header_len + layout.tag_len];
        constant_time_eq(slot, &local[..n])
    }

    fn layout_ok(&self, buf_len: usize, layout: PacketLayout) -> bool {
        match layout.total() {
            Some(total) => total <= buf_len && layout.tag_len == self.digest_size(),
            None => false,
        }
    }

    /// Feed the reordered packet view to the context.
    ///
    /// Caller must have validated the layout; the context is left mid-hash
    /// and must be finalized by the caller.
    fn update_reordered(&mut self, buf: &[u8], layout: PacketLayout) {
        let l1 = layout.header_len;
        let l2 = layout.tag_len;
        let lsum = l1 + l2 + layout.pid_len;
        self.ctx.update(&buf[l1 + l2..lsum]);
        self.ctx.update(&buf[..l1]);
        self.ctx.update(&buf[lsum..]);
    }
}

impl std::fmt::Debug for PacketAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PacketAuthenticator({})", self.algorithm)
    }
}

/// Timing-safe equality: running time is independent of where the first
/// differing byte occurs.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
