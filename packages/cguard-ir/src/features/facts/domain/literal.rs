//! String literal facts

use serde::{Deserialize, Serialize};

/// Byte length of a string literal, terminating NUL included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringLiteralFact {
    byte_len: u64,
}

impl StringLiteralFact {
    /// Fact for a decoded literal body
    pub fn of(contents: &str) -> Self {
        Self {
            byte_len: contents.len() as u64 + 1,
        }
    }

    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    /// Whether the literal, terminator included, fits `capacity` bytes
    pub fn fits(&self, capacity: u64) -> bool {
        self.byte_len <= capacity
    }
}
