//! Digest algorithm registry.
//!
//! Maps protocol algorithm identifiers to their key and output sizing.
//! The negotiation layer selects an algorithm at runtime; the registry is
//! how the rest of the crate sizes tag slots and validates key material.

/// A supported digest algorithm for packet authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// HMAC-SHA224 (28-byte tags).
    Sha224,
    /// HMAC-SHA256 (32-byte tags).
    Sha256,
    /// HMAC-SHA384 (48-byte tags).
    Sha384,
    /// HMAC-SHA512 (64-byte tags).
    Sha512,
}

impl DigestAlgorithm {
    /// Every supported algorithm, in preference order.
    pub const ALL: [DigestAlgorithm; 4] = [
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha512,
        DigestAlgorithm::Sha384,
        DigestAlgorithm::Sha224,
    ];

    /// Fixed digest output length in bytes.
    pub const fn output_size(self) -> usize {
        match self {
            DigestAlgorithm::Sha224 => 28,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    /// Required key length in bytes.
    ///
    /// The protocol keys each HMAC with exactly one digest-length of
    /// material; longer caller-supplied keys are truncated to this.
    pub const fn key_size(self) -> usize {
        self.output_size()
    }

    /// Canonical protocol name.
    pub const fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha224 => "SHA224",
            DigestAlgorithm::Sha256 => "SHA256",
            DigestAlgorithm::Sha384 => "SHA384",
            DigestAlgorithm::Sha512 => "SHA512",
        }
    }

    /// Look up an algorithm by its protocol name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SHA224" => Some(DigestAlgorithm::Sha224),
            "SHA256" => Some(DigestAlgorithm::Sha256),
            "SHA384" => Some(DigestAlgorithm::Sha384),
            "SHA512" => Some(DigestAlgorithm::Sha512),
            _ => None,
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MAX_DIGEST_SIZE;

    #[test]
    fn test_sizes() {
        assert_eq!(DigestAlgorithm::Sha224.output_size(), 28);
        assert_eq!(DigestAlgorithm::Sha256.output_size(), 32);
        assert_eq!(DigestAlgorithm::Sha384.output_size(), 48);
        assert_eq!(DigestAlgorithm::Sha512.output_size(), 64);
    }

    #[test]
    fn test_key_size_matches_output() {
        for alg in DigestAlgorithm::ALL {
            assert_eq!(alg.key_size(), alg.output_size());
        }
    }

    #[test]
    fn test_max_digest_size_covers_all() {
        for alg in DigestAlgorithm::ALL {
            assert!(alg.output_size() <= MAX_DIGEST_SIZE);
        }
    }

    #[test]
    fn test_name_roundtrip() {
        for alg in DigestAlgorithm::ALL {
            assert_eq!(DigestAlgorithm::from_name(alg.name()), Some(alg));
        }
        assert_eq!(DigestAlgorithm::from_name("sha256"), Some(DigestAlgorithm::Sha256));
        assert_eq!(DigestAlgorithm::from_name("MD5"), None);
    }
}
