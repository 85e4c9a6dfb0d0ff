//! The tools module provides the helper stages and the command line handling for the block
//! compressor.
//!
//! The tools are:
//! - cli: Command line interface and program options.
//! - freq_count: Frequency count of a symbol stream.
//! - mtf: Move-To-Front transform over a fixed rank list.
//! - rle2: Run-Length-Encoding of zero ranks with bijective base 2 run digits.
//!
pub mod cli;
pub mod freq_count;
pub mod mtf;
pub mod rle2;
