//! Move-To-Front transform over the symbols of one alphabet.
//!
//! Both directions start from the same canonical list, ascending symbol values
//! `0..=marker`, so encoder and decoder never have to exchange it.

use crate::alphabet::Alphabet;
use crate::error::{BzError, Result};
use log::trace;

/// Recency ordered list of every alphabet symbol, most recently used first.
#[derive(Debug, Clone)]
pub struct RankList {
    index: Vec<u16>,
}

impl RankList {
    /// Canonical starting order: ascending symbol values.
    pub fn new(alphabet: &Alphabet) -> Self {
        Self {
            index: (0..alphabet.rank_list_len() as u16).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    /// Current order of the list.
    #[cfg(test)]
    fn symbols(&self) -> &[u16] {
        &self.index
    }

    /// Return the current rank of `symbol` and move it to the front.
    pub fn encode(&mut self, symbol: u16) -> Result<u16> {
        let idx = self
            .index
            .iter()
            .position(|&s| s == symbol)
            .ok_or(BzError::UnknownSymbol(symbol))?;
        self.move_to_front(idx);
        Ok(idx as u16)
    }

    /// Return the symbol at `rank` and move it to the front.
    pub fn decode(&mut self, rank: u16) -> Result<u16> {
        let idx = rank as usize;
        let symbol = *self.index.get(idx).ok_or(BzError::InvalidRank {
            rank,
            size: self.len(),
        })?;
        self.move_to_front(idx);
        Ok(symbol)
    }

    /// Everything in front of idx shifts back by one, and the symbol at idx lands at 0.
    fn move_to_front(&mut self, idx: usize) {
        self.index[..=idx].rotate_right(1);
    }
}

/// Encode a symbol stream as move-to-front ranks.
pub fn mtf_encode(data: &[u16], alphabet: &Alphabet) -> Result<Vec<u16>> {
    let mut list = RankList::new(alphabet);
    let ranks = data
        .iter()
        .map(|&symbol| list.encode(symbol))
        .collect::<Result<Vec<u16>>>()?;
    trace!(
        "MTF: {} of {} ranks are zero",
        ranks.iter().filter(|&&r| r == 0).count(),
        ranks.len()
    );
    Ok(ranks)
}

/// Decode move-to-front ranks back into symbols.
pub fn mtf_decode(ranks: &[u16], alphabet: &Alphabet) -> Result<Vec<u16>> {
    let mut list = RankList::new(alphabet);
    ranks.iter().map(|&rank| list.decode(rank)).collect()
}
