use crate::error::{BzError, Result};

/// Returns a frequency count of the input data, indexed by symbol. `width` is the size of the
/// table; any symbol at or above it is rejected.
pub fn freqs(data: &[u16], width: usize) -> Result<Vec<u32>> {
    let mut freqs = vec![0_u32; width];
    for &el in data {
        match freqs.get_mut(el as usize) {
            Some(f) => *f += 1,
            None => return Err(BzError::UnknownSymbol(el)),
        }
    }
    Ok(freqs)
}

#[test]
fn freqs_test() {
    let f = freqs(&[3, 1, 3, 0, 3], 5).unwrap();
    assert_eq!(f, vec![1, 1, 0, 3, 0]);
}

#[test]
fn freqs_out_of_range_test() {
    assert!(matches!(freqs(&[1, 9], 5), Err(BzError::UnknownSymbol(9))));
}
