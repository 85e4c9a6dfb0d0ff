//! Zero run-length encoding, the stage after the move-to-front transform.
//!
//! Move-to-front turns runs of a repeated symbol into runs of rank 0. Each maximal run of k
//! zeros is replaced by k written in bijective base 2, using the alphabet's two run digit
//! markers for digit values 1 and 2. The numeral system has no zero digit, so every positive k
//! has exactly one representation and no run needs a length field or a terminator.
//!
//! Every other rank passes through unchanged.

use crate::alphabet::Alphabet;
use crate::error::{BzError, Result};
use log::{error, trace};

/// Longest run accepted while decoding. Anything above this is treated as hostile input.
const ZERO_BOMB: usize = 16 * 1024 * 1024;

/// Bijective base 2 digits (each 1 or 2) of a positive run length, most significant first.
pub fn encode_run(run: usize) -> Result<Vec<usize>> {
    if run == 0 {
        return Err(BzError::InvalidRunLength(run));
    }
    let mut digits = vec![];
    let mut x = run;
    while x > 0 {
        let q = (x + 1) / 2 - 1;
        digits.push(x - 2 * q);
        x = q;
    }
    digits.reverse();
    Ok(digits)
}

/// Fold bijective base 2 digits, most significant first, back into a run length.
/// `at` is the token position reported on overflow.
fn decode_run(digits: &[usize], at: usize) -> Result<usize> {
    let run = digits.iter().try_fold(0_usize, |x, &d| {
        x.checked_mul(2)
            .and_then(|x| x.checked_add(d))
            .ok_or(BzError::RunOverflow(at))
    })?;
    if run > ZERO_BOMB {
        error!("Run of {} zeros at token {}, probably an input bomb.", run, at);
        return Err(BzError::RunOverflow(at));
    }
    Ok(run)
}

/// Replace every maximal run of rank 0 with its digit markers.
pub fn zrle_encode(ranks: &[u16], alphabet: &Alphabet) -> Result<Vec<u16>> {
    let mut out = Vec::with_capacity(ranks.len());
    let mut zeros = 0_usize;

    for (position, &rank) in ranks.iter().enumerate() {
        // A rank equal to a digit marker could not be told apart from a run
        if alphabet.is_run_digit(rank) {
            error!("Rank {} at {} collides with a run digit marker", rank, position);
            return Err(BzError::UnknownSymbol(rank));
        }
        if rank == 0 {
            zeros += 1;
            continue;
        }
        // Not a zero, so output any pending zeros first
        if zeros > 0 {
            push_run(&mut out, zeros, alphabet)?;
            zeros = 0;
        }
        out.push(rank);
    }
    // Write any trailing zeros
    if zeros > 0 {
        push_run(&mut out, zeros, alphabet)?;
    }
    trace!("ZRLE: {} ranks became {} tokens", ranks.len(), out.len());
    Ok(out)
}

fn push_run(out: &mut Vec<u16>, zeros: usize, alphabet: &Alphabet) -> Result<()> {
    for digit in encode_run(zeros)? {
        out.push(alphabet.digit_symbol(digit));
    }
    Ok(())
}

/// Expand digit marker sequences back into runs of rank 0.
///
/// `limit` is the most ranks the caller expects. Output is checked against it before anything
/// is added, so a short stream cannot expand into a huge one.
pub fn zrle_decode(tokens: &[u16], alphabet: &Alphabet, limit: usize) -> Result<Vec<u16>> {
    let mut out = Vec::with_capacity(tokens.len().min(limit));
    let mut digits = Vec::new();

    for (at, &token) in tokens.iter().enumerate() {
        if let Some(d) = alphabet.digit_value(token) {
            digits.push(d);
            continue;
        }
        // Found a "normal" rank, so the digits collected so far are one complete run
        if !digits.is_empty() {
            push_zeros(&mut out, decode_run(&digits, at)?, limit)?;
            digits.clear();
        }
        check_limit(out.len() + 1, limit)?;
        out.push(token);
    }
    if !digits.is_empty() {
        push_zeros(&mut out, decode_run(&digits, tokens.len())?, limit)?;
    }
    Ok(out)
}

fn push_zeros(out: &mut Vec<u16>, run: usize, limit: usize) -> Result<()> {
    check_limit(out.len() + run, limit)?;
    out.resize(out.len() + run, 0);
    Ok(())
}

fn check_limit(len: usize, limit: usize) -> Result<()> {
    if len > limit {
        error!("ZRLE output would grow to {} ranks, expected at most {}", len, limit);
        return Err(BzError::InvalidFrame(format!(
            "zero runs expand past {} ranks",
            limit
        )));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tools::mtf::{mtf_decode, mtf_encode};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const A: u16 = 257;
    const B: u16 = 258;

    #[test]
    fn known_digits_test() {
        assert_eq!(encode_run(1).unwrap(), vec![1]);
        assert_eq!(encode_run(2).unwrap(), vec![2]);
        assert_eq!(encode_run(3).unwrap(), vec![1, 1]);
        assert_eq!(encode_run(4).unwrap(), vec![1, 2]);
        assert_eq!(encode_run(5).unwrap(), vec![2, 1]);
        assert_eq!(encode_run(6).unwrap(), vec![2, 2]);
        assert_eq!(encode_run(10).unwrap(), vec![1, 2, 2]);
        assert_eq!(encode_run(12).unwrap(), vec![2, 1, 2]);
    }

    #[test]
    fn zero_run_rejected_test() {
        assert!(matches!(encode_run(0), Err(BzError::InvalidRunLength(0))));
    }

    #[test]
    fn bijective_unique_test() {
        // Every digit string of length <= 10 is hit exactly once by 1..=2046
        let mut seen = std::collections::HashSet::new();
        for x in 1..=2046_usize {
            let digits = encode_run(x).unwrap();
            assert!(digits.iter().all(|&d| d == 1 || d == 2));
            assert_eq!(decode_run(&digits, 0).unwrap(), x);
            assert!(seen.insert(digits));
        }
        // Lengths grow as floor(log2(x + 1))
        assert_eq!(encode_run(2046).unwrap().len(), 10);
        assert_eq!(encode_run(2047).unwrap().len(), 11);
    }

    #[test]
    fn long_run_test() {
        let x = 1_000_003;
        assert_eq!(decode_run(&encode_run(x).unwrap(), 0).unwrap(), x);
    }

    #[test]
    fn zero_bomb_test() {
        let digits = encode_run(ZERO_BOMB + 1).unwrap();
        assert!(matches!(
            decode_run(&digits, 4),
            Err(BzError::RunOverflow(4))
        ));
    }

    #[test]
    fn overflow_test() {
        let digits = vec![2_usize; usize::BITS as usize + 1];
        assert!(matches!(
            decode_run(&digits, 9),
            Err(BzError::RunOverflow(9))
        ));
    }

    #[test]
    fn encode_stream_test() {
        let alphabet = Alphabet::default();
        assert_eq!(
            zrle_encode(&[0, 0, 0, 4, 0, 5, 0, 0], &alphabet).unwrap(),
            vec![A, A, 4, A, 5, B]
        );
        assert!(zrle_encode(&[], &alphabet).unwrap().is_empty());
        assert_eq!(zrle_encode(&[3, 1], &alphabet).unwrap(), vec![3, 1]);
        assert!(matches!(
            zrle_encode(&[3, 0, A], &alphabet),
            Err(BzError::UnknownSymbol(A))
        ));
    }

    #[test]
    fn decode_stream_test() {
        let alphabet = Alphabet::default();
        assert_eq!(
            zrle_decode(&[A, A, 4, A, 5, B], &alphabet, 8).unwrap(),
            vec![0, 0, 0, 4, 0, 5, 0, 0]
        );
        assert_eq!(
            zrle_decode(&[B, B, 9], &alphabet, 100).unwrap(),
            vec![0, 0, 0, 0, 0, 0, 9]
        );
    }

    #[test]
    fn mtf_then_zrle_test() {
        let alphabet = Alphabet::default();
        let input = [1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2];
        let ranks = mtf_encode(&input, &alphabet).unwrap();
        let tokens = zrle_encode(&ranks, &alphabet).unwrap();
        // Rank of the first 2, then ten zeros written as digits 1 2 2
        assert_eq!(tokens, vec![1, 2, A, B, B]);

        let ranks_back = zrle_decode(&tokens, &alphabet, ranks.len()).unwrap();
        assert_eq!(ranks_back, ranks);
        assert_eq!(mtf_decode(&ranks_back, &alphabet).unwrap(), input);
    }

    #[test]
    fn random_round_trip_test() {
        let alphabet = Alphabet::new(4, 5, 6, 7).unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        for len in 0..300 {
            // Mostly zeros, so runs of every length turn up
            let ranks = (0..len)
                .map(|_| if rng.gen_bool(0.8) { 0 } else { rng.gen_range(1..5) })
                .collect::<Vec<u16>>();
            let tokens = zrle_encode(&ranks, &alphabet).unwrap();
            assert!(!tokens.contains(&0));
            assert_eq!(zrle_decode(&tokens, &alphabet, ranks.len()).unwrap(), ranks);
        }
    }

    #[test]
    fn decode_limit_test() {
        let alphabet = Alphabet::default();
        // Six zeros then a 9 need seven slots
        assert!(zrle_decode(&[B, B, 9], &alphabet, 7).is_ok());
        assert!(matches!(
            zrle_decode(&[B, B, 9], &alphabet, 6),
            Err(BzError::InvalidFrame(_))
        ));
        assert!(matches!(
            zrle_decode(&[B, B], &alphabet, 5),
            Err(BzError::InvalidFrame(_))
        ));
        assert!(matches!(
            zrle_decode(&[3, 4, 5], &alphabet, 2),
            Err(BzError::InvalidFrame(_))
        ));
    }

    #[test]
    fn many_long_runs_rejected_test() {
        // Twelve maximal runs, each followed by a rank, against a two rank budget. The first run
        // is refused before any zeros are written.
        let alphabet = Alphabet::default();
        let run = encode_run(ZERO_BOMB).unwrap();
        let mut tokens = vec![];
        for _ in 0..12 {
            tokens.extend(run.iter().map(|&d| alphabet.digit_symbol(d)));
            tokens.push(1);
        }
        assert!(matches!(
            zrle_decode(&tokens, &alphabet, 2),
            Err(BzError::InvalidFrame(_))
        ));
    }
}
