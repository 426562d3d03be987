//! Target selection and the fixed-width bit-string encoding.
//!
//! Bit `i` of the index is qubit `i`; in the rendered label qubit 0 is the
//! rightmost character, so index 5 of an 8-entry range is `"101"`.

use std::fmt;
use std::str::FromStr;

use grover_hal::bit_label;
use rand::Rng;

use crate::error::{SearchError, SearchResult};

/// Largest search register. The ancilla-free multi-controlled Z grows
/// roughly threefold per extra qubit.
pub const MAX_SEARCH_QUBITS: u32 = 12;

/// A string of `0`/`1` characters, most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitString(String);

impl BitString {
    pub fn parse(bits: &str) -> SearchResult<Self> {
        if bits.is_empty() || !bits.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(SearchError::InvalidBitString(bits.to_string()));
        }
        Ok(Self(bits.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn width(&self) -> usize {
        self.0.len()
    }

    /// Bit values indexed by qubit, qubit 0 first.
    pub fn qubit_bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.bytes().rev().map(|b| b == b'1')
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BitString {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for BitString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for BitString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BitString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The hidden entry a search looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub index: u64,
    pub bits: BitString,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.bits, self.index)
    }
}

/// Draws targets from `[0, range_size)` and encodes them at a fixed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSelector {
    range_size: u64,
    width: u32,
}

impl TargetSelector {
    /// Selector for a range of `range_size` entries.
    ///
    /// The width is `ceil(log2(range_size))`.
    pub fn new(range_size: u64) -> SearchResult<Self> {
        if range_size < 2 {
            return Err(SearchError::RangeTooSmall(range_size));
        }
        let width = u64::BITS - (range_size - 1).leading_zeros();
        if width > MAX_SEARCH_QUBITS {
            return Err(SearchError::InvalidWidth(width));
        }
        Ok(Self { range_size, width })
    }

    /// Selector over the full `2^num_qubits` range.
    pub fn for_qubits(num_qubits: u32) -> SearchResult<Self> {
        if num_qubits == 0 || num_qubits > MAX_SEARCH_QUBITS {
            return Err(SearchError::InvalidWidth(num_qubits));
        }
        Self::new(1 << num_qubits)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn range_size(&self) -> u64 {
        self.range_size
    }

    pub fn encode(&self, index: u64) -> SearchResult<BitString> {
        self.check(index)?;
        Ok(BitString(bit_label(index, self.width as usize)))
    }

    pub fn decode(&self, bits: &BitString) -> SearchResult<u64> {
        if bits.width() != self.width as usize {
            return Err(SearchError::WidthMismatch {
                bits: bits.to_string(),
                expected: self.width,
                got: bits.width(),
            });
        }
        let index = u64::from_str_radix(bits.as_str(), 2)
            .map_err(|_| SearchError::InvalidBitString(bits.to_string()))?;
        self.check(index)?;
        Ok(index)
    }

    /// The target at a caller-chosen index.
    pub fn target(&self, index: u64) -> SearchResult<Target> {
        Ok(Target {
            index,
            bits: self.encode(index)?,
        })
    }

    /// A uniformly random target.
    pub fn pick(&self, rng: &mut impl Rng) -> Target {
        let index = rng.gen_range(0..self.range_size);
        Target {
            index,
            bits: BitString(bit_label(index, self.width as usize)),
        }
    }

    pub fn pick_random(&self) -> Target {
        self.pick(&mut rand::thread_rng())
    }

    fn check(&self, index: u64) -> SearchResult<()> {
        if index >= self.range_size {
            return Err(SearchError::TargetOutOfRange {
                index,
                range_size: self.range_size,
            });
        }
        Ok(())
    }
}
