//! ObjectId Generation
//!
//! The Dida365 desktop client addresses focus operations with 24-hex-digit
//! ids in the MongoDB ObjectId layout. Replies echo ids in the same format,
//! so generated ids must follow it byte for byte:
//! - 4 bytes: Unix timestamp in seconds, big-endian
//! - 5 bytes: random value fixed per generator
//! - 3 bytes: counter, randomly seeded, incremented mod 2^24

use parking_lot::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

const COUNTER_MAX: u32 = 0xFF_FFFF;

/// Thread-safe ObjectId generator.
///
/// Uniqueness is per-process only, which is all the operation log needs:
/// the remote side never compares ids issued by different clients.
pub struct ObjectIdGenerator {
    rand_bytes: [u8; 5],
    counter: Mutex<u32>,
}

impl ObjectIdGenerator {
    pub fn new() -> Self {
        Self {
            rand_bytes: rand::random(),
            counter: Mutex::new(rand::random::<u32>() & COUNTER_MAX),
        }
    }

    /// Generate a new 24-character lowercase hex id. Never fails.
    pub fn generate(&self) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);

        let counter = {
            let mut guard = self.counter.lock();
            let current = *guard;
            *guard = (current + 1) & COUNTER_MAX;
            current
        };

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(&self.rand_bytes);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);

        let mut out = String::with_capacity(24);
        for byte in bytes {
            out.push_str(&format!("{:02x}", byte));
        }
        out
    }
}

impl Default for ObjectIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_is_24_hex_chars() {
        let generator = ObjectIdGenerator::new();
        let id = generator.generate();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, id.to_lowercase());
    }

    #[test]
    fn test_successive_ids_are_unique() {
        let generator = ObjectIdGenerator::new();
        let first = generator.generate();
        let second = generator.generate();
        assert_ne!(first, second);
    }

    #[test]
    fn test_counter_wraps_without_panicking() {
        let generator = ObjectIdGenerator::new();
        *generator.counter.lock() = COUNTER_MAX;
        let at_max = generator.generate();
        let wrapped = generator.generate();
        assert!(at_max.ends_with("ffffff"));
        assert!(wrapped.ends_with("000000"));
    }

    #[test]
    fn test_timestamp_prefix_matches_current_time() {
        let generator = ObjectIdGenerator::new();
        let id = generator.generate();
        let encoded = u32::from_str_radix(&id[..8], 16).unwrap();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as u32;
        assert!(now.abs_diff(encoded) <= 1);
    }
}
