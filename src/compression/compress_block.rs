use log::{debug, trace};

use crate::alphabet::Alphabet;
use crate::bwt_algorithms::bwt_sort::{block_len, bwt_decode, bwt_encode};
use crate::error::{BzError, Result};
use crate::huffman_coding::huffman::{
    build_tree, derive_code_table, huf_decode, huf_encode, HuffmanTree,
};
use crate::tools::mtf::{mtf_decode, mtf_encode};
use crate::tools::rle2::{zrle_decode, zrle_encode};

/// One block of symbols, the unit every stage works on. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    symbols: Vec<u16>,
}

impl Block {
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            symbols: data.iter().map(|&b| b as u16).collect(),
        }
    }

    pub fn from_symbols(symbols: Vec<u16>) -> Self {
        Self { symbols }
    }

    pub fn symbols(&self) -> &[u16] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Back to bytes. Fails if a symbol does not fit in a byte.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.symbols
            .iter()
            .map(|&s| u8::try_from(s).map_err(|_| BzError::UnknownSymbol(s)))
            .collect()
    }
}

/// Everything needed to restore one block: the marker row, the huffman frequency table and the
/// packed bitstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedBlock {
    /// Symbols in the source block. Only used to check the decoded result.
    pub len: u32,
    /// Row of the BWT marker.
    pub key: u32,
    /// Non-zero huffman frequencies as (symbol, count), ascending by symbol.
    pub freqs: Vec<(u16, u32)>,
    pub payload: Vec<u8>,
}

/// Run one block through BWT, MTF, RLE2 and huffman coding.
pub fn compress_block(block: &Block, alphabet: &Alphabet) -> Result<CompressedBlock> {
    let (bwt, key) = bwt_encode(block.symbols(), alphabet)?;
    trace!("Key is {}", key);

    let ranks = mtf_encode(&bwt, alphabet)?;
    let tokens = zrle_encode(&ranks, alphabet)?;

    // Now for the compression - the Huffman encoding
    let tree = build_tree(&tokens, alphabet)?;
    let table = derive_code_table(&tree);
    let payload = huf_encode(&tokens, &table, alphabet)?;

    debug!(
        "{} symbols in block, {} after MTF & RLE2 coding, {} syms in use, {} bytes out",
        block.len(),
        tokens.len(),
        table.len(),
        payload.len()
    );

    let freqs = tree
        .leaves()
        .into_iter()
        .map(|(s, w)| {
            u32::try_from(w)
                .map(|w| (s, w))
                .map_err(|_| BzError::BlockTooLarge(block.len()))
        })
        .collect::<Result<Vec<(u16, u32)>>>()?;

    Ok(CompressedBlock {
        len: block_len(block.len())?,
        key: block_len(key)?,
        freqs,
        payload,
    })
}

/// Exact inverse of `compress_block`.
pub fn decompress_block(compressed: &CompressedBlock, alphabet: &Alphabet) -> Result<Block> {
    // Rebuild the encoder's tree from the frequency table
    let mut counts = vec![0_u32; alphabet.width()];
    for &(symbol, count) in &compressed.freqs {
        *counts
            .get_mut(symbol as usize)
            .ok_or(BzError::UnknownSymbol(symbol))? = count;
    }
    let tree = HuffmanTree::from_freqs(&counts)?;

    // The BWT output is one longer than the block because of the marker
    let expected = compressed.len as usize + 1;
    let tokens = huf_decode(&compressed.payload, &tree, alphabet)?;
    let ranks = zrle_decode(&tokens, alphabet, expected)?;
    if ranks.len() != expected {
        return Err(BzError::InvalidFrame(format!(
            "expected {} symbols, decoded {}",
            expected,
            ranks.len()
        )));
    }

    let bwt = mtf_decode(&ranks, alphabet)?;
    let symbols = bwt_decode(&bwt, compressed.key as usize, alphabet)?;
    trace!("Restored block of {} symbols", symbols.len());
    Ok(Block::from_symbols(symbols))
}
