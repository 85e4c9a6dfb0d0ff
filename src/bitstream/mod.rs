//! The bitstream module forms the bit level I/O subsystem of the block compressor.
//!
//! Huffman codewords are packed most significant bit first, and the last byte of a block is
//! padded with zeros. The padding is never decoded: the huffman decoder stops at its eob
//! symbol. The same reader and writer also handle the fixed width fields of the file frames.
//!
pub mod bitreader;
pub mod bitwriter;
