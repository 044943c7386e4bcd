use num_bigint::BigUint;

/// Number of pairs in the rows before row `i` of the upper triangle (diagonal
/// included) of an `n`×`n` matrix.
///
/// ```text
/// offset(i) = i * (2n - i + 1) / 2
/// ```
pub fn triangular_offset(i: u64, n: u64) -> u64 {
    debug_assert!(i <= n);
    i * (2 * n - i + 1) / 2
}

/// Triangular pairing of `(i, j)` with `i <= j < n` onto `0..n*(n+1)/2`.
///
/// Row `i` holds `(i, i), (i, i+1), ..., (i, n-1)`, rows are laid out one after
/// another. This is the order in which a nested loop enumerates self-pairs and
/// 2-combinations.
///
/// ```text
/// (i, j) -> offset(i) + (j - i)
/// ```
pub fn pairing_triangular(i: u64, j: u64, n: u64) -> u64 {
    assert!(i <= j && j < n, "Invalid triangular pair ({}, {}) for n = {}", i, j, n);
    triangular_offset(i, n) + (j - i)
}

/// Inverse of [`pairing_triangular`].
pub fn unpairing_triangular(k: u64, n: u64) -> (u64, u64) {
    assert!(k < triangle_size(n), "Triangular index {} out of range for n = {}", k, n);
    // Binary search for the last row whose offset is <= k.
    let (mut lo, mut hi) = (0, n);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if triangular_offset(mid, n) <= k {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let i = lo;
    (i, i + (k - triangular_offset(i, n)))
}

/// Number of self-pairs and 2-combinations of `n` elements, `n + C(n, 2)`.
pub fn triangle_size(n: u64) -> u64 {
    n * (n + 1) / 2
}

/// Exact size of the pair universe over `n` literals, without overflow.
pub fn pair_universe_size(n: usize) -> BigUint {
    let n = BigUint::from(n);
    &n * (&n + 1u32) / 2u32
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_triangular_layout() {
        // n = 3:
        //   (0,0)=0 (0,1)=1 (0,2)=2
        //           (1,1)=3 (1,2)=4
        //                   (2,2)=5
        let n = 3;
        assert_eq!(pairing_triangular(0, 0, n), 0);
        assert_eq!(pairing_triangular(0, 2, n), 2);
        assert_eq!(pairing_triangular(1, 1, n), 3);
        assert_eq!(pairing_triangular(1, 2, n), 4);
        assert_eq!(pairing_triangular(2, 2, n), 5);
        assert_eq!(triangle_size(n), 6);
    }

    #[test]
    fn test_unpairing_inverts_pairing() {
        for n in 1..20 {
            let mut k = 0;
            for i in 0..n {
                for j in i..n {
                    assert_eq!(pairing_triangular(i, j, n), k);
                    assert_eq!(unpairing_triangular(k, n), (i, j));
                    k += 1;
                }
            }
            assert_eq!(k, triangle_size(n));
        }
    }

    #[test]
    #[should_panic(expected = "Invalid triangular pair")]
    fn test_pairing_rejects_lower_triangle() {
        pairing_triangular(2, 1, 3);
    }

    #[test]
    fn test_pair_universe_size() {
        assert_eq!(pair_universe_size(0), BigUint::from(0u32));
        assert_eq!(pair_universe_size(4), BigUint::from(10u32));
        // Far beyond u64: 2^40 literals.
        let big = pair_universe_size(1 << 40);
        assert!(big > BigUint::from(u64::MAX >> 1));
    }
}
