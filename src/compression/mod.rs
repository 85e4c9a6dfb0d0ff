//! The compression module holds the block pipeline and the file level drivers.
//!
//! Each block is compressed in the following steps:
//! - Burrows-Wheeler Transform: Sort all rotations of the block, with a unique end marker appended,
//!   and keep the last column plus the row of the marker.
//! - Move To Front transform: Replace each symbol with its rank in a list of recently seen symbols.
//!   Repeated symbols become runs of rank 0.
//! - Run Length Encoding 2: Replace every run of rank 0 with its length in bijective base 2.
//! - Huffman coding: Build a tree from the token frequencies and pack the codewords, ending with
//!   the end-of-block symbol.
//!
//! Decompression follows the inverse of the compression process. The huffman tree is rebuilt from
//! the frequency table stored with every block.
//!
//! A compressed file is a short header followed by one frame per block and an end frame.

pub mod compress;
pub mod compress_block;
pub mod decompress;
