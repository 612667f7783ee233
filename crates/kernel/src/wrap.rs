/// Shift `value` by a multiple of `hi - lo` so it lands in `[lo, hi)`.
///
/// A degenerate range (`hi <= lo`) collapses to `lo`.
pub fn wrap(lo: f64, hi: f64, value: f64) -> f64 {
    let range = hi - lo;
    if !(range > 0.0) {
        return lo;
    }
    let mut r = (value - lo).rem_euclid(range);
    // rem_euclid can round up to exactly `range` for tiny negative inputs.
    if r >= range {
        r = 0.0;
    }
    lo + r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inside_range_is_identity() {
        assert_eq!(wrap(-100.0, 200.0, 50.0), 50.0);
        assert_eq!(wrap(-100.0, 200.0, -100.0), -100.0);
    }

    #[test]
    fn upper_bound_wraps_to_lower() {
        assert_eq!(wrap(-100.0, 200.0, 200.0), -100.0);
    }

    #[test]
    fn wraps_both_directions() {
        assert_eq!(wrap(0.0, 10.0, 25.0), 5.0);
        assert_eq!(wrap(0.0, 10.0, -3.0), 7.0);
        assert_eq!(wrap(-5.0, 5.0, 12.0), 2.0);
    }

    #[test]
    fn always_within_half_open_range() {
        let ranges = [(-1000.0, 320.0), (0.0, 1.0), (-0.5, 0.25), (10.0, 1e6)];
        let mut v = -1.0e7;
        while v < 1.0e7 {
            for (lo, hi) in ranges {
                let w = wrap(lo, hi, v);
                assert!(w >= lo && w < hi, "wrap({lo}, {hi}, {v}) = {w}");
            }
            v += 12_345.678;
        }
    }

    #[test]
    fn tiny_negative_offset_stays_below_hi() {
        let w = wrap(0.0, 10.0, -1e-17);
        assert!((0.0..10.0).contains(&w));
    }

    #[test]
    fn degenerate_range_collapses() {
        assert_eq!(wrap(5.0, 5.0, 42.0), 5.0);
        assert_eq!(wrap(5.0, 1.0, 42.0), 5.0);
    }
}
