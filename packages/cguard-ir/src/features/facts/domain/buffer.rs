/*
 * Buffers
 *
 * Capacity is counted in elements; `element_size` converts to bytes for
 * string and memory APIs. A capacity is never silently zero: anything that
 * cannot be computed is `Unknown`.
 */

use serde::{Deserialize, Serialize};

/// Element capacity of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capacity {
    Known(u64),
    /// Storage extends past anything the analysis can see (flexible array member)
    Unbounded,
    Unknown,
}

impl Capacity {
    pub fn known(&self) -> Option<u64> {
        match self {
            Capacity::Known(n) => Some(*n),
            _ => None,
        }
    }

    /// Branch join: agreeing capacities survive, anything else is unknown
    pub fn join(self, other: Capacity) -> Capacity {
        if self == other {
            self
        } else {
            Capacity::Unknown
        }
    }
}

impl std::fmt::Display for Capacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capacity::Known(n) => write!(f, "{}", n),
            Capacity::Unbounded => write!(f, "unbounded"),
            Capacity::Unknown => write!(f, "unknown"),
        }
    }
}

/// Where a buffer's storage comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferOrigin {
    FixedArray,
    HeapAllocation,
    Unknown,
}

/// Named storage location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buffer {
    pub name: String,
    pub origin: BufferOrigin,
    pub capacity: Capacity,
    /// Bytes per element; `None` for struct elements
    pub element_size: Option<u64>,
}

impl Buffer {
    /// Declared array of `dimension` elements
    pub fn fixed(name: impl Into<String>, dimension: u64, element_size: Option<u64>) -> Self {
        Self {
            name: name.into(),
            origin: BufferOrigin::FixedArray,
            capacity: Capacity::Known(dimension),
            element_size,
        }
    }

    /// Heap block of `bytes` bytes addressed through a pointer to
    /// `element_size`-byte elements. A trailing partial element is not
    /// addressable and is dropped.
    pub fn heap(name: impl Into<String>, bytes: Capacity, element_size: Option<u64>) -> Self {
        let elem = element_size.filter(|s| *s > 0).unwrap_or(1);
        let capacity = match bytes {
            Capacity::Known(b) => Capacity::Known(b / elem),
            other => other,
        };
        Self {
            name: name.into(),
            origin: BufferOrigin::HeapAllocation,
            capacity,
            element_size: Some(elem),
        }
    }

    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: BufferOrigin::Unknown,
            capacity: Capacity::Unknown,
            element_size: None,
        }
    }

    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// Capacity in elements
    pub fn element_capacity(&self) -> Capacity {
        self.capacity
    }

    /// Capacity in bytes
    pub fn byte_capacity(&self) -> Capacity {
        match (self.capacity, self.element_size) {
            (Capacity::Known(n), Some(size)) => n
                .checked_mul(size)
                .map(Capacity::Known)
                .unwrap_or(Capacity::Unknown),
            (Capacity::Known(_), None) => Capacity::Unknown,
            (other, _) => other,
        }
    }

    /// Branch join of two facts about the same name
    pub fn join(&self, other: &Buffer) -> Buffer {
        if self == other {
            return self.clone();
        }
        Buffer {
            name: self.name.clone(),
            origin: if self.origin == other.origin {
                self.origin
            } else {
                BufferOrigin::Unknown
            },
            capacity: self.capacity.join(other.capacity),
            element_size: if self.element_size == other.element_size {
                self.element_size
            } else {
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_byte_capacity() {
        let ints = Buffer::fixed("arr", 10, Some(4));
        assert_eq!(ints.element_capacity(), Capacity::Known(10));
        assert_eq!(ints.byte_capacity(), Capacity::Known(40));

        let records = Buffer::fixed("board", 10, None);
        assert_eq!(records.element_capacity(), Capacity::Known(10));
        assert_eq!(records.byte_capacity(), Capacity::Unknown);
    }

    #[test]
    fn test_heap_element_capacity() {
        let numbers = Buffer::heap("numbers", Capacity::Known(400), Some(4));
        assert_eq!(numbers.element_capacity(), Capacity::Known(100));
        assert_eq!(numbers.byte_capacity(), Capacity::Known(400));

        let odd = Buffer::heap("p", Capacity::Known(10), Some(4));
        assert_eq!(odd.element_capacity(), Capacity::Known(2));

        let unknown = Buffer::heap("q", Capacity::Unknown, Some(1));
        assert_eq!(unknown.byte_capacity(), Capacity::Unknown);
    }

    #[test]
    fn test_join_disagreeing_capacity() {
        let a = Buffer::heap("p", Capacity::Known(10), Some(1));
        let b = Buffer::heap("p", Capacity::Known(20), Some(1));
        assert_eq!(a.join(&b).capacity, Capacity::Unknown);
        assert_eq!(a.join(&a), a);
    }
}
