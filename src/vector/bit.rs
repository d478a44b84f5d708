//! Packed binary vectors
//!
//! Bits are packed 64 to a word, so the dot product is the Hamming weight of
//! the AND of two vectors and the squared distance is the Hamming distance
//! (popcount of the XOR). Both run one `count_ones` per word.

use crate::core::{Result, SVMError};
use serde::{Deserialize, Serialize};

const WORD_BITS: usize = u64::BITS as usize;

/// A vector of binary elements packed into 64-bit words
///
/// Bits at positions `len` and above in the last word are always zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PackedBits")]
pub struct BitVector {
    words: Vec<u64>,
    len: usize,
}

/// Unchecked wire form of a [`BitVector`]
#[derive(Deserialize)]
struct PackedBits {
    words: Vec<u64>,
    len: usize,
}

impl TryFrom<PackedBits> for BitVector {
    type Error = SVMError;

    fn try_from(packed: PackedBits) -> Result<Self> {
        BitVector::from_packed(packed.words, packed.len)
    }
}

impl BitVector {
    /// Pack a slice of bits. Element `i` is stored in bit `i % 64` of word `i / 64`.
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut words = vec![0u64; bits.len().div_ceil(WORD_BITS)];
        for (i, &bit) in bits.iter().enumerate() {
            if bit {
                words[i / WORD_BITS] |= 1u64 << (i % WORD_BITS);
            }
        }
        Self {
            words,
            len: bits.len(),
        }
    }

    /// Wrap already packed words; the vector is `64 * words.len()` bits long
    pub fn from_words(words: Vec<u64>) -> Self {
        let len = words.len() * WORD_BITS;
        Self { words, len }
    }

    /// Wrap packed words holding a vector of `len` bits
    ///
    /// Fails unless `words` has exactly as many words as `len` bits need and
    /// every bit above `len` is clear.
    pub fn from_packed(words: Vec<u64>, len: usize) -> Result<Self> {
        if words.len() != len.div_ceil(WORD_BITS) {
            return Err(SVMError::InvalidParameter(format!(
                "{len} bits need {} words, got {}",
                len.div_ceil(WORD_BITS),
                words.len()
            )));
        }
        let used = len % WORD_BITS;
        if let Some(&last) = words.last() {
            if used != 0 && last >> used != 0 {
                return Err(SVMError::InvalidParameter(format!(
                    "Bits set beyond the length {len}"
                )));
            }
        }
        Ok(Self { words, len })
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the bit at `index`
    ///
    /// # Panics
    /// Panics if index >= len()
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "Bit index {index} out of range");
        self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    /// Number of set bits
    pub fn hamming_weight(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Number of positions where both vectors have a set bit
    pub fn dot_product(&self, other: &BitVector) -> Result<u32> {
        self.check_len(other)?;
        Ok(self
            .words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (a & b).count_ones())
            .sum())
    }

    /// Number of positions where the vectors differ
    pub fn hamming_distance(&self, other: &BitVector) -> Result<u32> {
        self.check_len(other)?;
        Ok(self
            .words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum())
    }

    fn check_len(&self, other: &BitVector) -> Result<()> {
        if self.len != other.len {
            return Err(SVMError::DimensionMismatch {
                expected: self.len,
                actual: other.len,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.len {
            f.write_str(if self.get(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}
