//! Reserved symbol values used by the block pipeline.
//!
//! Each stage receives the alphabet explicitly, so blocks using different alphabets can be
//! processed side by side. Ordinary block symbols are `0..marker`. The marker itself sorts
//! strictly greatest during the rotation sort, and everything above it is reserved for the
//! run digits and the huffman end-of-block symbol.

use crate::error::{BzError, Result};

/// Reserved markers of one alphabet. Build with `Alphabet::new` so the layout is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alphabet {
    marker: u16,
    run_a: u16,
    run_b: u16,
    eob: u16,
}

impl Alphabet {
    /// Validate and create an alphabet. The run digits and the eob symbol must sit above the
    /// marker (so they never collide with a rank) and must be distinct.
    pub fn new(marker: u16, run_a: u16, run_b: u16, eob: u16) -> Result<Self> {
        if run_a <= marker || run_b <= marker || eob <= marker {
            return Err(BzError::InvalidAlphabet(
                "run digits and eob must be greater than the marker",
            ));
        }
        if run_a == run_b || run_a == eob || run_b == eob {
            return Err(BzError::InvalidAlphabet(
                "run digits and eob must be distinct",
            ));
        }
        Ok(Self {
            marker,
            run_a,
            run_b,
            eob,
        })
    }

    /// Symbol appended to a block before the rotation sort.
    pub fn marker(&self) -> u16 {
        self.marker
    }

    /// Digit marker for bijective digit 1.
    pub fn run_a(&self) -> u16 {
        self.run_a
    }

    /// Digit marker for bijective digit 2.
    pub fn run_b(&self) -> u16 {
        self.run_b
    }

    /// Huffman end-of-block symbol.
    pub fn eob(&self) -> u16 {
        self.eob
    }

    /// Number of symbols held by the rank list: every block symbol plus the marker.
    pub fn rank_list_len(&self) -> usize {
        self.marker as usize + 1
    }

    /// One past the largest reserved value. Frequency tables use this size.
    pub fn width(&self) -> usize {
        self.run_a.max(self.run_b).max(self.eob) as usize + 1
    }

    pub fn is_run_digit(&self, symbol: u16) -> bool {
        symbol == self.run_a || symbol == self.run_b
    }

    /// Map a bijective digit (1 or 2) to its marker.
    pub(crate) fn digit_symbol(&self, digit: usize) -> u16 {
        if digit == 1 {
            self.run_a
        } else {
            self.run_b
        }
    }

    /// Map a digit marker back to its value. Returns None for ordinary symbols.
    pub(crate) fn digit_value(&self, symbol: u16) -> Option<usize> {
        match symbol {
            s if s == self.run_a => Some(1),
            s if s == self.run_b => Some(2),
            _ => None,
        }
    }
}

impl Default for Alphabet {
    /// Byte alphabet: marker 256, run digits 257 and 258, eob 259.
    fn default() -> Self {
        Self {
            marker: 256,
            run_a: 257,
            run_b: 258,
            eob: 259,
        }
    }
}

#[cfg(test)]
mod test {
    use super::Alphabet;
    use crate::error::BzError;

    #[test]
    fn default_layout_test() {
        let a = Alphabet::default();
        assert_eq!(a.rank_list_len(), 257);
        assert_eq!(a.width(), 260);
        assert_eq!(a, Alphabet::new(256, 257, 258, 259).unwrap());
    }

    #[test]
    fn small_alphabet_test() {
        let a = Alphabet::new(4, 5, 6, 7).unwrap();
        assert_eq!(a.rank_list_len(), 5);
        assert_eq!(a.width(), 8);
        assert!(a.is_run_digit(5));
        assert!(!a.is_run_digit(7));
        assert_eq!(a.digit_value(6), Some(2));
        assert_eq!(a.digit_value(3), None);
    }

    #[test]
    fn reject_overlapping_test() {
        assert!(matches!(
            Alphabet::new(256, 255, 258, 259),
            Err(BzError::InvalidAlphabet(_))
        ));
        assert!(matches!(
            Alphabet::new(256, 257, 257, 259),
            Err(BzError::InvalidAlphabet(_))
        ));
        assert!(matches!(
            Alphabet::new(256, 257, 258, 258),
            Err(BzError::InvalidAlphabet(_))
        ));
    }
}
