//! The bwt_algorithms module holds the rotation sorter for the block compressor.
//!
//! The Burrow-Wheeler Transform reorders a block so that runs of similar symbols are more likely
//! to occur, which the later stages turn into small ranks and long zero runs.
//!
//! Sorting is done with repeated stable counting sorts over rotation offsets. That keeps the
//! transform simple and exactly invertible, at O(n^2) cost per block, so blocks are kept small.
//!
pub mod bwt_sort;
