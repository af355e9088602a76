//! ID generation utilities.

use rand::RngCore;
use ulid::Ulid;

/// Number of random bytes behind an approval token.
const APPROVAL_TOKEN_BYTES: usize = 16;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Monotonically increasing within the same millisecond
    /// - Shorter than UUIDs when represented as strings
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate an opaque approval token: 16 random bytes, lowercase hex.
    #[must_use]
    pub fn generate_token(&self) -> String {
        let mut bytes = [0u8; APPROVAL_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}
