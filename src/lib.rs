//! A block-sorting compressor.
//!
//! Every block runs through a Burrows-Wheeler transform, a move-to-front transform, zero run
//! length encoding and a huffman coder. Each stage is exposed on its own and has an exact inverse.
//!
//! Basic usage to compress a file is as follows:
//!
//! `$> bwzip -z test.txt`
//!
//! This will compress the file and create the file test.txt.bwz.
//! The original file will be deleted unless -k is given.
//!
pub mod alphabet;
pub mod bitstream;
pub mod bwt_algorithms;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use alphabet::Alphabet;
pub use compression::compress_block::{compress_block, decompress_block, Block, CompressedBlock};
pub use error::{BzError, Result};
