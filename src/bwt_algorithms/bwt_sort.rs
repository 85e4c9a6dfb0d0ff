use crate::alphabet::Alphabet;
use crate::error::{BzError, Result};
use log::{debug, trace};

/// Burrows-Wheeler-Transform of one block.
///
/// The marker is appended, then every cyclic rotation is ordered by its starting offset alone
/// (rotations are never materialized). Returns the last column and the row holding the marker,
/// which is the row of the original block and is needed by `bwt_decode`.
pub fn bwt_encode(block: &[u16], alphabet: &Alphabet) -> Result<(Vec<u16>, usize)> {
    let marker = alphabet.marker();

    // The marker must be unique, so reject it before doing any work.
    for (position, &symbol) in block.iter().enumerate() {
        if symbol == marker {
            return Err(BzError::DuplicateMarker { symbol, position });
        }
        if symbol > marker {
            return Err(BzError::UnknownSymbol(symbol));
        }
    }

    let mut text = Vec::with_capacity(block.len() + 1);
    text.extend_from_slice(block);
    text.push(marker);
    let n = text.len();

    let index = sort_rotations(&text, alphabet.rank_list_len())?;

    // Get key and BWT output. The last column holds the symbol just before each rotation.
    let mut key = 0_usize;
    let mut bwt = Vec::with_capacity(n);
    for (row, &offset) in index.iter().enumerate() {
        if offset == 0 {
            key = row;
        }
        bwt.push(text[(offset as usize + n - 1) % n]);
    }
    debug!("BWT of {} symbols, key is {}", n, key);
    Ok((bwt, key))
}

/// Length of a block as stored in the rotation index and the frame header.
/// Fails with `BlockTooLarge` when it does not fit a u32.
pub fn block_len(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| BzError::BlockTooLarge(n))
}

/// Order the starting offsets of all rotations of `text` lexicographically.
///
/// This is an LSD radix sort over fixed length cyclic strings: one stable counting sort per
/// shift, from the last position down to the first. `radix` must exceed every symbol in `text`.
pub fn sort_rotations(text: &[u16], radix: usize) -> Result<Vec<u32>> {
    let n = text.len();
    let mut index = (0..block_len(n)?).collect::<Vec<u32>>();
    let mut sorted = vec![0_u32; n];
    let mut counts = vec![0_usize; radix];

    for shift in (0..n).rev() {
        counting_pass(text, shift, &index, &mut sorted, &mut counts);
        std::mem::swap(&mut index, &mut sorted);
        debug_assert!(is_permutation(&index), "pass {} broke the rotation index", shift);
    }
    trace!("Sorted {} rotations in {} passes", n, n);
    Ok(index)
}

/// One stable counting sort of `src` into `dst`, keyed on the symbol `shift` places after
/// each offset.
fn counting_pass(text: &[u16], shift: usize, src: &[u32], dst: &mut [u32], counts: &mut [usize]) {
    let n = text.len();
    counts.iter_mut().for_each(|c| *c = 0);
    for &offset in src {
        counts[text[(offset as usize + shift) % n] as usize] += 1;
    }

    // Turn the counts into the first output slot of each symbol
    let mut sum = 0;
    for c in counts.iter_mut() {
        let count = *c;
        *c = sum;
        sum += count;
    }

    // Walking src front to back keeps equal keys in their previous order
    for &offset in src {
        let symbol = text[(offset as usize + shift) % n] as usize;
        dst[counts[symbol]] = offset;
        counts[symbol] += 1;
    }
}

fn is_permutation(index: &[u32]) -> bool {
    let mut seen = vec![false; index.len()];
    for &i in index {
        match seen.get_mut(i as usize) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

/// Build the LF mapping of a last column.
///
/// Position i of the last column holds the r-th occurrence of its symbol s. The same occurrence
/// sits in the sorted first column at (number of symbols smaller than s) + r.
fn lf_mapping(bwt: &[u16], radix: usize) -> Vec<u32> {
    // Occurrence rank of every last column position
    let mut seen = vec![0_u32; radix];
    let mut last_rank = Vec::with_capacity(bwt.len());
    for &s in bwt {
        last_rank.push(seen[s as usize]);
        seen[s as usize] += 1;
    }

    // Where each symbol's run starts in the first column
    let mut first_start = vec![0_u32; radix];
    let mut sum = 0_u32;
    for (start, &count) in first_start.iter_mut().zip(&seen) {
        *start = sum;
        sum += count;
    }

    bwt.iter()
        .zip(&last_rank)
        .map(|(&s, &rank)| first_start[s as usize] + rank)
        .collect()
}

/// Invert the transform. `key` is the row holding the marker, as returned by `bwt_encode`.
pub fn bwt_decode(bwt: &[u16], key: usize, alphabet: &Alphabet) -> Result<Vec<u16>> {
    let n = bwt.len();
    let marker = alphabet.marker();

    if key >= n || bwt[key] != marker {
        return Err(BzError::InvalidMarkerRow { row: key, len: n });
    }
    for (position, &symbol) in bwt.iter().enumerate() {
        if symbol > marker {
            return Err(BzError::UnknownSymbol(symbol));
        }
        if symbol == marker && position != key {
            return Err(BzError::DuplicateMarker { symbol, position });
        }
    }

    block_len(n)?;
    let lf = lf_mapping(bwt, alphabet.rank_list_len());

    // Following LF from the marker row walks the block backwards
    let mut out = Vec::with_capacity(n);
    let mut row = key;
    for _ in 0..n {
        out.push(bwt[row]);
        row = lf[row] as usize;
    }
    out.reverse();

    // The first symbol emitted was the marker, so it is now last. Seeing it anywhere else
    // means the walk cycled early and the column was not a real transform.
    out.pop();
    if let Some(position) = out.iter().position(|&s| s == marker) {
        return Err(BzError::DuplicateMarker {
            symbol: marker,
            position,
        });
    }
    Ok(out)
}
