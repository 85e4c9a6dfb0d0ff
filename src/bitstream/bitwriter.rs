//! BitWriter: packs codewords and frame fields into bytes, most significant bit first.

/// Writes a bitstream into an in-memory buffer.
#[derive(Debug, Default)]
pub struct BitWriter {
    /// Output buffer used to write the bitstream.
    pub output: Vec<u8>,
    /// Private queue to hold bits that are waiting to be put as bytes into the output buffer.
    queue: u64,
    /// Count of valid bits in the queue.
    q_bits: u8,
}

impl BitWriter {
    /// Create a new BitWriter with an output buffer of the capacity specified.
    pub fn new(capacity: usize) -> Self {
        Self {
            output: Vec::with_capacity(capacity),
            queue: 0,
            q_bits: 0,
        }
    }

    /// Internal bitstream write function common to all out.XX functions.
    fn push_queue(&mut self) {
        // Make room for up to 32 more bits by writing all full bytes to the output buffer.
        if self.q_bits > 24 {
            while self.q_bits > 7 {
                let byte = (self.queue >> (self.q_bits - 8)) as u8;
                self.output.push(byte); //push the packed byte out
                self.q_bits -= 8; //adjust the count of bits left in the queue
            }
        }
    }

    /// Put the low `len` bits of `bits` on the stream, highest of them first.
    pub fn out_bits(&mut self, bits: u64, len: u8) {
        if len > 32 {
            self.out_bits(bits >> 32, len - 32);
            self.out_bits(bits & 0xffff_ffff, 32);
            return;
        }
        self.push_queue();
        let mask = (1_u64 << len) - 1;
        self.queue <<= len;
        self.queue |= bits & mask;
        self.q_bits += len;
    }

    /// Put a single bit on the stream.
    pub fn out_bit(&mut self, bit: bool) {
        self.out_bits(bit as u64, 1);
    }

    /// Put a byte on the stream.
    pub fn out8(&mut self, data: u8) {
        self.out_bits(data as u64, 8);
    }

    /// Put 16 bits on the stream, big-endian.
    pub fn out16(&mut self, data: u16) {
        self.out_bits(data as u64, 16);
    }

    /// Put 32 bits on the stream, big-endian.
    pub fn out32(&mut self, data: u32) {
        self.out_bits(data as u64, 32);
    }

    /// Total bits written so far, including those still in the queue.
    pub fn bit_len(&self) -> usize {
        self.output.len() * 8 + self.q_bits as usize
    }

    /// Flushes the remaining bits (1-7) from the queue, padding with 0s in the least
    /// signficant bits. Returns how many padding bits were added. Flush MUST be called before
    /// reading the output or data may be left in the internal queue.
    pub fn flush(&mut self) -> u8 {
        // First push out all the full bytes
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte);
            self.q_bits -= 8;
        }
        // Then push out the remaining bits
        let mut padding = 0;
        if self.q_bits > 0 {
            padding = 8 - self.q_bits;
            let byte = ((self.queue & (0xff >> padding)) as u8) << padding;
            self.output.push(byte);
            self.q_bits = 0;
        }
        padding
    }

    /// Flush and hand back the packed bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.flush();
        self.output
    }

    /// Debugging function. Report current position as [bytes.bits].
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.output.len(), self.q_bits)
    }
}
