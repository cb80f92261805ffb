//! Static key material.

use zeroize::Zeroize;

/// Opaque key material for the packet authentication engine.
///
/// The bytes are zeroized on drop. A key may be longer than an algorithm
/// requires; the engine uses only the leading `key_size()` bytes.
#[derive(Clone)]
pub struct StaticKey {
    bytes: Vec<u8>,
}

impl StaticKey {
    /// Wrap caller-supplied key bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Copy key bytes from a slice.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the key is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw key bytes.
    ///
    /// # Security
    /// Handle with care - this exposes sensitive key material.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for StaticKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for StaticKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print key bytes
        write!(f, "StaticKey({} bytes)", self.bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_accessors() {
        let key = StaticKey::from_slice(&[1, 2, 3]);
        assert_eq!(key.len(), 3);
        assert!(!key.is_empty());
        assert_eq!(key.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_debug_hides_bytes() {
        let key = StaticKey::from_slice(&[0xAA; 16]);
        let debug = format!("{key:?}");
        assert!(!debug.contains("170"));
        assert!(!debug.contains("aa"));
        assert!(debug.contains("16 bytes"));
    }
}
