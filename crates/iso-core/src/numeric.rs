/// Index and value of the entry with the largest magnitude among `candidates`.
///
/// Ties keep the first candidate, matching a left-to-right argmax.
pub fn argmax_abs<I>(values: &[f64], candidates: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = usize>,
{
    let mut best: Option<(usize, f64)> = None;
    for i in candidates {
        let v = values[i];
        match best {
            Some((_, b)) if v.abs() <= b.abs() => {}
            _ => best = Some((i, v)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn argmax_abs_prefers_magnitude_and_first_tie() {
        let values = [0.5, -2.0, 2.0, 1.0];
        assert_eq!(argmax_abs(&values, 0..4), Some((1, -2.0)));
        assert_eq!(argmax_abs(&values, [0, 3]), Some((3, 1.0)));
        assert_eq!(argmax_abs(&values, std::iter::empty()), None);
    }

    #[test]
    fn argmax_abs_skips_non_candidates() {
        let values = [100.0, -3.0, 0.0];
        assert_eq!(argmax_abs(&values, [1, 2]), Some((1, -3.0)));
    }

    proptest! {
        #[test]
        fn argmax_abs_dominates_every_candidate(
            values in prop::collection::vec(-1e6f64..1e6, 1..40),
        ) {
            let (i, v) = argmax_abs(&values, 0..values.len()).unwrap();
            prop_assert_eq!(values[i], v);
            for &x in &values {
                prop_assert!(x.abs() <= v.abs());
            }
        }
    }
}
