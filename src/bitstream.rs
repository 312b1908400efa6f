use crate::code::PrefixCode;
use crate::error::HuffmanError;

type ElementType = u64;
const NUM_BITS: usize = std::mem::size_of::<ElementType>() * 8;

/// An encoded stream: code words concatenated in input order.
///
/// Bits are packed into words starting from the least significant bit, which
/// lets a whole [`PrefixCode`] be appended with at most two word updates.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct BitStream {
    data: Vec<ElementType>,
    len: usize,
}

impl BitStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let len = (capacity + NUM_BITS - 1) / NUM_BITS;
        BitStream {
            data: Vec::with_capacity(len),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, bit: bool) {
        let word_idx = self.len / NUM_BITS;
        let bit_idx = self.len % NUM_BITS;

        if word_idx >= self.data.len() {
            self.data.push(0);
        }

        self.data[word_idx] |= (bit as ElementType) << bit_idx;
        self.len += 1;
    }

    pub fn push_code(&mut self, code: &PrefixCode) {
        let length = code.len();
        if length == 0 {
            return;
        }

        let word_idx = self.len / NUM_BITS;
        let bit_idx = self.len % NUM_BITS;

        let words_needed = (self.len + length + NUM_BITS - 1) / NUM_BITS;
        if words_needed > self.data.len() {
            self.data.resize(words_needed, 0);
        }

        self.data[word_idx] |= code.bits() << bit_idx;
        // Spill the upper part of the code word into the next word.
        if bit_idx + length > NUM_BITS {
            self.data[word_idx + 1] |= code.bits() >> (NUM_BITS - bit_idx);
        }

        self.len += length;
    }

    pub fn get(&self, idx: usize) -> Option<bool> {
        if idx >= self.len {
            return None;
        }

        Some((self.data[idx / NUM_BITS] >> (idx % NUM_BITS)) & 1 == 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|idx| (self.data[idx / NUM_BITS] >> (idx % NUM_BITS)) & 1 == 1)
    }

    pub fn count_ones(&self) -> usize {
        self.data
            .iter()
            .map(|element| element.count_ones() as usize)
            .sum()
    }
}

impl std::fmt::Display for BitStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for BitStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BitStream({self})")
    }
}

impl std::str::FromStr for BitStream {
    type Err = HuffmanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut stream = BitStream::with_capacity(s.len());

        for (position, found) in s.chars().enumerate() {
            match found {
                '0' => stream.push(false),
                '1' => stream.push(true),
                _ => return Err(HuffmanError::InvalidBit { position, found }),
            }
        }

        Ok(stream)
    }
}

impl FromIterator<bool> for BitStream {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut stream = BitStream::new();
        for bit in iter {
            stream.push(bit);
        }
        stream
    }
}
