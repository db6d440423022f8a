//! First-wins extremum selection shared by every peak/quiet metric.

use std::cmp::Ordering;

/// Which end of the ordering to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Max,
    Min,
}

impl Extremum {
    /// True when `candidate` strictly beats `best` in this direction.
    fn beats<K: PartialOrd>(self, candidate: &K, best: &K) -> bool {
        let wanted = match self {
            Self::Max => Ordering::Greater,
            Self::Min => Ordering::Less,
        };
        candidate.partial_cmp(best) == Some(wanted)
    }
}

/// Select the item with the extreme key, keeping the earliest item on ties.
///
/// A later item only replaces the current pick when its key is strictly
/// better, so equal keys never move the selection forward. Items whose key
/// is unordered (NaN) are never selected over an existing pick.
pub fn first_extremum<T, K, F>(
    items: impl IntoIterator<Item = T>,
    direction: Extremum,
    key: F,
) -> Option<T>
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    let mut best: Option<(T, K)> = None;
    for item in items {
        let item_key = key(&item);
        let replace = match &best {
            None => true,
            Some((_, best_key)) => direction.beats(&item_key, best_key),
        };
        if replace {
            best = Some((item, item_key));
        }
    }
    best.map(|(item, _)| item)
}

/// Index of the first bucket holding the largest positive count.
pub fn peak_bucket(counts: &[usize]) -> Option<(usize, usize)> {
    first_extremum(
        counts.iter().copied().enumerate().filter(|&(_, count)| count > 0),
        Extremum::Max,
        |&(_, count)| count,
    )
}

/// Index of the first bucket holding the smallest positive count.
pub fn low_bucket(counts: &[usize]) -> Option<(usize, usize)> {
    first_extremum(
        counts.iter().copied().enumerate().filter(|&(_, count)| count > 0),
        Extremum::Min,
        |&(_, count)| count,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_keep_first_occurrence() {
        let items = [("a", 3), ("b", 5), ("c", 5), ("d", 1), ("e", 1)];
        assert_eq!(
            first_extremum(items, Extremum::Max, |item| item.1),
            Some(("b", 5))
        );
        assert_eq!(
            first_extremum(items, Extremum::Min, |item| item.1),
            Some(("d", 1))
        );
    }

    #[test]
    fn empty_input_has_no_extremum() {
        assert_eq!(
            first_extremum(Vec::<u32>::new(), Extremum::Max, |v| *v),
            None
        );
    }

    #[test]
    fn peak_ignores_all_zero_buckets() {
        assert_eq!(peak_bucket(&[0; 24]), None);
        assert_eq!(peak_bucket(&[0, 4, 2, 4]), Some((1, 4)));
    }

    #[test]
    fn low_skips_zero_buckets() {
        assert_eq!(low_bucket(&[0, 4, 2, 0, 2]), Some((2, 2)));
        assert_eq!(low_bucket(&[0, 0]), None);
    }

    #[test]
    fn float_keys_work() {
        let values = [1.5_f64, 2.5, 2.5, 0.5];
        assert_eq!(
            first_extremum(values.iter().enumerate(), Extremum::Max, |(_, v)| **v),
            Some((1, &2.5))
        );
    }
}
