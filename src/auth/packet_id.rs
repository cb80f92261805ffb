//! Packet-id sequencing and replay detection.
//!
//! The packet id is the field the authentication engine binds most
//! prominently (it is hashed first). This module produces outbound ids and
//! screens inbound ones; what to do with a rejected id is the control
//! layer's decision.
//!
//! A short id is a 32-bit sequence number, a wide id is 64-bit. Ids travel
//! in network byte order and zero is never a legal value.

use crate::core::{
    AuthError, PACKET_ID_LONG_SIZE, PACKET_ID_SHORT_SIZE, PACKET_ID_WRAP_WARN, REPLAY_WINDOW_SIZE,
};

/// A packet sequence number as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketId {
    /// Sequence number; legal values are 1 through the id-width maximum.
    pub id: u64,
    /// Whether this id uses the 64-bit wire format.
    pub wide: bool,
}

impl PacketId {
    /// Wire size of an id of the given width.
    pub const fn size(wide: bool) -> usize {
        if wide {
            PACKET_ID_LONG_SIZE
        } else {
            PACKET_ID_SHORT_SIZE
        }
    }

    /// Wire size of this id.
    pub const fn size_bytes(&self) -> usize {
        Self::size(self.wide)
    }

    /// Zero ids are reserved and never valid on the wire.
    pub const fn is_valid(&self) -> bool {
        self.id != 0
    }

    /// Parse an id from the start of `data` in network byte order.
    ///
    /// Returns `None` if `data` is too short for the chosen width.
    pub fn read_from(data: &[u8], wide: bool) -> Option<Self> {
        if wide {
            let bytes: [u8; PACKET_ID_LONG_SIZE] = data.get(..PACKET_ID_LONG_SIZE)?.try_into().ok()?;
            Some(Self {
                id: u64::from_be_bytes(bytes),
                wide,
            })
        } else {
            let bytes: [u8; PACKET_ID_SHORT_SIZE] =
                data.get(..PACKET_ID_SHORT_SIZE)?.try_into().ok()?;
            Some(Self {
                id: u64::from(u32::from_be_bytes(bytes)),
                wide,
            })
        }
    }

    /// Append this id to `buf` in network byte order.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        if self.wide {
            buf.extend_from_slice(&self.id.to_be_bytes());
        } else {
            buf.extend_from_slice(&(self.id as u32).to_be_bytes());
        }
    }
}

/// Monotone outbound packet-id source.
#[derive(Debug)]
pub struct PacketIdSender {
    id: u64,
    wide: bool,
}

impl PacketIdSender {
    /// Create a sender starting at id 1.
    pub fn new(wide: bool) -> Self {
        Self { id: 0, wide }
    }

    /// Increment and return the next id to use.
    ///
    /// Fails with [`AuthError::PacketIdExhausted`] when the sequence space
    /// is used up; the session must terminate rather than reuse an id.
    pub fn next(&mut self) -> Result<PacketId, AuthError> {
        let limit = if self.wide {
            u64::MAX
        } else {
            u64::from(u32::MAX)
        };
        if self.id.saturating_add(1) >= limit {
            // keep failing rather than wrap back onto used ids
            return Err(AuthError::PacketIdExhausted);
        }
        self.id += 1;
        Ok(PacketId {
            id: self.id,
            wide: self.wide,
        })
    }

    /// Increment and append the next id to `buf`.
    pub fn write_next(&mut self, buf: &mut Vec<u8>) -> Result<(), AuthError> {
        let pid = self.next()?;
        pid.write_to(buf);
        Ok(())
    }

    /// Whether a short-id sender is close enough to wrapping that the
    /// upper layer should start renegotiating.
    pub fn wrap_warning(&self) -> bool {
        !self.wide && self.id >= PACKET_ID_WRAP_WARN
    }

    /// Wire size of ids produced by this sender.
    pub const fn size_bytes(&self) -> usize {
        PacketId::size(self.wide)
    }
}

/// Receive-side replay screen: a sliding bitmap over recent packet ids.
///
/// Accepts each id at most once, tolerates reordering inside the window,
/// and rejects anything older than the window.
#[derive(Debug, Clone)]
pub struct ReplayGuard {
    /// Highest id seen so far.
    highest: u64,
    /// Bitfield for ids below highest (bit i = highest - 1 - i).
    window: [u64; REPLAY_WINDOW_SIZE / 64],
    initialized: bool,
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayGuard {
    /// Create an empty replay guard.
    pub fn new() -> Self {
        Self {
            highest: 0,
            window: [0; REPLAY_WINDOW_SIZE / 64],
            initialized: false,
        }
    }

    /// Check whether `pid` is acceptable and record it as seen.
    ///
    /// Returns `true` exactly when the id is non-zero, inside the window,
    /// and not previously accepted.
    pub fn check_and_mark(&mut self, pid: &PacketId) -> bool {
        if !pid.is_valid() {
            return false;
        }
        let id = pid.id;

        if !self.initialized {
            self.initialized = true;
            self.highest = id;
            return true;
        }

        if id > self.highest {
            let shift = (id - self.highest) as usize;
            self.shift_window(shift);
            self.highest = id;
            true
        } else if id == self.highest {
            false
        } else {
            let offset = (self.highest - id) as usize;
            if offset > REPLAY_WINDOW_SIZE {
                // too old, outside the window
                return false;
            }

            let offset = offset - 1;
            let word = offset / 64;
            let bit = offset % 64;
            let mask = 1u64 << bit;

            if self.window[word] & mask != 0 {
                false
            } else {
                self.window[word] |= mask;
                true
            }
        }
    }

    /// Slide the window forward by `shift` positions, marking the old
    /// highest id as seen.
    fn shift_window(&mut self, shift: usize) {
        const WORDS: usize = REPLAY_WINDOW_SIZE / 64;

        if shift >= REPLAY_WINDOW_SIZE {
            self.window = [0; WORDS];
            return;
        }

        let word_shift = shift / 64;
        let bit_shift = shift % 64;

        if word_shift > 0 {
            for i in (word_shift..WORDS).rev() {
                self.window[i] = self.window[i - word_shift];
            }
            for w in &mut self.window[..word_shift] {
                *w = 0;
            }
        }

        if bit_shift > 0 {
            let mut carry = 0u64;
            for w in &mut self.window {
                let new_carry = *w << (64 - bit_shift);
                *w = (*w >> bit_shift) | carry;
                carry = new_carry;
            }
        }

        if shift > 0 {
            let offset = shift - 1;
            if offset < REPLAY_WINDOW_SIZE {
                self.window[offset / 64] |= 1u64 << (offset % 64);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_roundtrip() {
        let pid = PacketId { id: 0x01020304, wide: false };
        let mut buf = Vec::new();
        pid.write_to(&mut buf);
        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(PacketId::read_from(&buf, false), Some(pid));
    }

    #[test]
    fn test_wide_id_roundtrip() {
        let pid = PacketId { id: 0x0102030405060708, wide: true };
        let mut buf = Vec::new();
        pid.write_to(&mut buf);
        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(PacketId::read_from(&buf, true), Some(pid));
    }

    #[test]
    fn test_read_short_data() {
        assert_eq!(PacketId::read_from(&[1, 2, 3], false), None);
        assert_eq!(PacketId::read_from(&[1, 2, 3, 4, 5, 6, 7], true), None);
    }

    #[test]
    fn test_sender_is_monotone_from_one() {
        let mut sender = PacketIdSender::new(false);
        assert_eq!(sender.next().unwrap().id, 1);
        assert_eq!(sender.next().unwrap().id, 2);
        assert_eq!(sender.next().unwrap().id, 3);
    }

    #[test]
    fn test_sender_exhaustion_short() {
        let mut sender = PacketIdSender::new(false);
        sender.id = u64::from(u32::MAX) - 2;
        assert!(sender.next().is_ok());
        assert_eq!(sender.next().unwrap_err(), AuthError::PacketIdExhausted);
    }

    #[test]
    fn test_sender_exhaustion_wide() {
        let mut sender = PacketIdSender::new(true);
        sender.id = u64::MAX - 2;
        assert!(sender.next().is_ok());
        assert_eq!(sender.next().unwrap_err(), AuthError::PacketIdExhausted);
    }

    #[test]
    fn test_wrap_warning() {
        let mut sender = PacketIdSender::new(false);
        assert!(!sender.wrap_warning());
        sender.id = PACKET_ID_WRAP_WARN;
        assert!(sender.wrap_warning());

        let mut wide = PacketIdSender::new(true);
        wide.id = u64::from(u32::MAX);
        assert!(!wide.wrap_warning());
    }

    #[test]
    fn test_write_next() {
        let mut sender = PacketIdSender::new(false);
        let mut buf = Vec::new();
        sender.write_next(&mut buf).unwrap();
        assert_eq!(buf, [0, 0, 0, 1]);
    }

    fn short(id: u64) -> PacketId {
        PacketId { id, wide: false }
    }

    #[test]
    fn test_guard_rejects_zero() {
        let mut guard = ReplayGuard::new();
        assert!(!guard.check_and_mark(&short(0)));
    }

    #[test]
    fn test_guard_in_order_sequence() {
        let mut guard = ReplayGuard::new();
        for id in 1..=100 {
            assert!(guard.check_and_mark(&short(id)), "id {id} rejected");
        }
    }

    #[test]
    fn test_guard_rejects_duplicates() {
        let mut guard = ReplayGuard::new();
        assert!(guard.check_and_mark(&short(5)));
        assert!(!guard.check_and_mark(&short(5)));
    }

    #[test]
    fn test_guard_accepts_reordered_once() {
        let mut guard = ReplayGuard::new();
        assert!(guard.check_and_mark(&short(1)));
        assert!(guard.check_and_mark(&short(4)));
        // 2 and 3 arrive late, each accepted exactly once
        assert!(guard.check_and_mark(&short(3)));
        assert!(guard.check_and_mark(&short(2)));
        assert!(!guard.check_and_mark(&short(3)));
        assert!(!guard.check_and_mark(&short(2)));
    }

    #[test]
    fn test_guard_rejects_below_window() {
        let mut guard = ReplayGuard::new();
        let high = REPLAY_WINDOW_SIZE as u64 + 10;
        assert!(guard.check_and_mark(&short(high)));
        // just inside the window
        assert!(guard.check_and_mark(&short(high - REPLAY_WINDOW_SIZE as u64)));
        // beyond it
        assert!(!guard.check_and_mark(&short(9)));
    }

    #[test]
    fn test_guard_large_jump_resets_window() {
        let mut guard = ReplayGuard::new();
        assert!(guard.check_and_mark(&short(1)));
        let far = 1 + 2 * REPLAY_WINDOW_SIZE as u64;
        assert!(guard.check_and_mark(&short(far)));
        assert!(!guard.check_and_mark(&short(far)));
        assert!(!guard.check_and_mark(&short(1)));
    }

    #[test]
    fn test_guard_marks_old_highest_on_advance() {
        let mut guard = ReplayGuard::new();
        assert!(guard.check_and_mark(&short(1)));
        assert!(guard.check_and_mark(&short(2)));
        assert!(!guard.check_and_mark(&short(1)));
    }
}
