//! Record identifiers.
//!
//! An `ObjectId` is a 12-byte value laid out as:
//! - 4 bytes: seconds since the Unix epoch (big-endian)
//! - 5 bytes: random value chosen once per process
//! - 3 bytes: counter, seeded randomly and incremented per id (big-endian)
//!
//! It is rendered as a 24-character lowercase hex string in URLs and responses.

use chrono::Utc;
use rand::Rng;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use thiserror::Error;

/// Length of an id in bytes
pub const OBJECT_ID_LEN: usize = 12;

/// Length of an id rendered as hex
pub const OBJECT_ID_HEX_LEN: usize = OBJECT_ID_LEN * 2;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid object id {0:?}: expected 24 hex characters")]
pub struct InvalidObjectId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        let timestamp = Utc::now().timestamp() as u32;
        Self::from_parts(timestamp, *process_unique(), next_count())
    }

    fn from_parts(timestamp: u32, process: [u8; 5], count: u32) -> Self {
        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(&process);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    /// Render as 24 lowercase hex characters
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Parse a 24-character hex string (either case)
    pub fn parse_hex(s: &str) -> Result<Self, InvalidObjectId> {
        if !is_valid_hex(s) {
            return Err(InvalidObjectId(s.to_string()));
        }

        let mut bytes = [0u8; OBJECT_ID_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| InvalidObjectId(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

/// Check whether `s` is a syntactically valid id, without allocating
pub fn is_valid_hex(s: &str) -> bool {
    s.len() == OBJECT_ID_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn process_unique() -> &'static [u8; 5] {
    PROCESS_UNIQUE.get_or_init(|| {
        let mut bytes = [0u8; 5];
        rand::rng().fill(&mut bytes);
        bytes
    })
}

fn next_count() -> u32 {
    let counter = COUNTER.get_or_init(|| AtomicU32::new(rand::random::<u32>() & COUNTER_MASK));
    counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK
}
