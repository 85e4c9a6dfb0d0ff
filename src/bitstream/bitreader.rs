//! BitReader: reads a packed bitstream, most significant bit of each byte first.
//!
//! Reading never runs past the buffer. Every read returns None once the bits are gone, so the
//! huffman decoder can tell a truncated stream from one that ended at its eob symbol.

/// Reads bits from a byte slice.
#[derive(Debug)]
pub struct BitReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
    bit_index: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            cursor: 0,
            bit_index: 0,
        }
    }

    /// Return bit as Option<usize> (1 or 0), or None if there is no more data to read
    pub fn bit(&mut self) -> Option<usize> {
        let byte = *self.buffer.get(self.cursor)?;
        let bit = (byte >> (7 - self.bit_index)) & 1;
        self.bit_index += 1;
        if self.bit_index == 8 {
            self.bit_index = 0;
            self.cursor += 1;
        }
        Some(bit as usize)
    }

    /// Return Option<Bool> *true* if the next bit is 1, *false* if 0, consuming the bit,
    /// or None if there is no more data to read
    pub fn bool_bit(&mut self) -> Option<bool> {
        self.bit().map(|bit| bit == 1)
    }

    /// Return Option<usize> of the next n bits, or None if there is no more data to read.
    pub fn bint(&mut self, mut n: usize) -> Option<usize> {
        // Whole bytes can be taken directly when we are on a byte boundary
        let mut result = 0_usize;
        while n >= 8 && self.bit_index == 0 {
            result = result << 8 | *self.buffer.get(self.cursor)? as usize;
            self.cursor += 1;
            n -= 8;
        }
        for _ in 0..n {
            result = result << 1 | self.bit()?;
        }
        Some(result)
    }

    /// Returns a byte as an Option<u8>, or None if there is no more data to read.
    pub fn byte(&mut self) -> Option<u8> {
        self.bint(8).map(|byte| byte as u8)
    }

    /// Returns an Option<Vec<u8>> of n bytes, or None if fewer than n bytes remain.
    pub fn bytes(&mut self, n: usize) -> Option<Vec<u8>> {
        (0..n).map(|_| self.byte()).collect()
    }

    /// Number of bits consumed so far.
    pub fn position(&self) -> usize {
        self.cursor * 8 + self.bit_index
    }

    /// True when every bit has been read.
    pub fn is_empty(&self) -> bool {
        self.cursor >= self.buffer.len()
    }

    /// Debugging function. Report current position in the buffer.
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.cursor, self.bit_index)
    }
}
