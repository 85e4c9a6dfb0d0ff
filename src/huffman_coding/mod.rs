//! The huffman module is the entropy coding stage of the block compressor.
//!
//! One huffman tree is built per block from the symbol frequencies, with an extra eob symbol
//! counted once. The tree is an index addressed arena built with the min-heap in
//! priority_queue. Codes are read off the tree (left edge 0, right edge 1), and the decoder walks
//! the same tree bit by bit until it reaches the eob leaf.
//!
//! Only the frequency table needs to be stored next to the bitstream. Leaves are queued in
//! ascending symbol order, so the decoder rebuilds the identical tree from that table.
//!
//! The process of encoding and decoding each block is inherently sequential.
//!

pub mod huffman;
pub mod priority_queue;
