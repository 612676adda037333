//! Static override credential
//!
//! A configured token that authenticates without a store lookup. It is a
//! privileged credential: removing records from the store does not revoke it,
//! only changing the configuration and restarting does.

use sha2::{Digest, Sha256};

/// Configured override token, compared in constant time
#[derive(Clone)]
pub struct OverrideKey {
    digest: [u8; 32],
}

impl OverrideKey {
    /// Build from configuration; empty or absent disables the override
    pub fn from_config(value: Option<&str>) -> Option<Self> {
        match value {
            Some(value) if !value.is_empty() => Some(Self {
                digest: digest(value),
            }),
            _ => None,
        }
    }

    /// Check whether a presented token equals the override.
    ///
    /// Both sides are reduced to SHA-256 digests first so the comparison
    /// time depends on neither the contents nor the length of the token.
    pub fn matches(&self, presented: &str) -> bool {
        constant_time_compare(&self.digest, &digest(presented))
    }
}

impl std::fmt::Debug for OverrideKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OverrideKey([REDACTED])")
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

/// Constant-time comparison of fixed-size digests
fn constant_time_compare(a: &[u8; 32], b: &[u8; 32]) -> bool {
    let mut result = 0u8;

    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}
