//! Binning and counting ahead of charting

use serde::Serialize;
use std::collections::BTreeMap;

/// Number of bins in every age histogram
pub const AGE_BINS: usize = 10;

/// Range used when there are no ages to bin
const EMPTY_DOMAIN: (f64, f64) = (0.0, 100.0);

/// Half-open `[start, end)` histogram bin; the last bin also holds `end`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram with exactly [`AGE_BINS`] bins.
///
/// Bins start at the floor of the smallest value and use a whole-number
/// step of at least 1, so edges stay readable ages.
pub fn histogram(values: impl IntoIterator<Item = f64>) -> Vec<Bin> {
    let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();

    let (start, step) = match (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) {
        (Some(min), Some(max)) => {
            let start = min.floor();
            let step = ((max - start) / AGE_BINS as f64).ceil().max(1.0);
            (start, step)
        }
        _ => (EMPTY_DOMAIN.0, (EMPTY_DOMAIN.1 - EMPTY_DOMAIN.0) / AGE_BINS as f64),
    };

    let mut counts = [0usize; AGE_BINS];
    for v in &values {
        let i = ((v - start) / step).floor() as usize;
        counts[i.min(AGE_BINS - 1)] += 1;
    }

    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| Bin {
            start: start + step * i as f64,
            end: start + step * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Occurrences of each label, ordered by label
pub fn count_by<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_histogram_edges() {
        let bins = histogram([20.0, 80.0, 50.0]);
        assert_eq!(bins.len(), AGE_BINS);
        assert_eq!(bins[0].start, 20.0);
        assert_eq!(bins[0].end, 26.0);
        assert_eq!(bins[9].end, 80.0);
        // 80 sits on the upper edge and lands in the last bin
        assert_eq!(bins[9].count, 1);
        assert_eq!(bins[5].count, 1);
    }

    #[test]
    fn test_histogram_rounds_step_up() {
        let bins = histogram([14.5, 87.0]);
        assert_eq!(bins[0].start, 14.0);
        assert_eq!(bins[0].end - bins[0].start, 8.0);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_histogram_single_value() {
        let bins = histogram([42.0, 42.0]);
        assert_eq!(bins.len(), AGE_BINS);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[0].end - bins[0].start, 1.0);
    }

    #[test]
    fn test_histogram_empty() {
        let bins = histogram(std::iter::empty());
        assert_eq!(bins.len(), AGE_BINS);
        assert!(bins.iter().all(|b| b.count == 0));
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[9].end, 100.0);
    }

    #[test]
    fn test_count_by_sorted() {
        let counts = count_by(["White", "Black", "White", "Asian Indian"]);
        assert_eq!(
            counts,
            vec![
                ("Asian Indian".to_string(), 1),
                ("Black".to_string(), 1),
                ("White".to_string(), 2),
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_histogram_has_fixed_bins(ages in proptest::collection::vec(0.0f64..110.0, 0..300)) {
            let bins = histogram(ages.iter().copied());
            prop_assert_eq!(bins.len(), AGE_BINS);
            prop_assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), ages.len());
            if let (Some(first), Some(last)) = (bins.first(), bins.last()) {
                prop_assert!(ages.iter().all(|&a| a >= first.start && a <= last.end));
            }
        }
    }
}
