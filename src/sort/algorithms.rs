//! Quick sort, merge sort and binary search.
//!
//! Both sorts order a permutation of indices and then materialize it, so
//! items are cloned exactly once and never moved during partitioning.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::errors::SortError;

/// Sorting strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAlgorithm {
    /// First-element pivot, explicit work stack, stable
    Quick,
    /// Bottom-up, stable
    #[default]
    Merge,
}

impl SortAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortAlgorithm::Quick => "quick",
            SortAlgorithm::Merge => "merge",
        }
    }
}

impl fmt::Display for SortAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortAlgorithm {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" | "quicksort" => Ok(SortAlgorithm::Quick),
            "merge" | "mergesort" => Ok(SortAlgorithm::Merge),
            _ => Err(SortError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Sorts a copy of `items` with the chosen algorithm.
pub fn sort_by<T, F>(items: &[T], algorithm: SortAlgorithm, compare: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    match algorithm {
        SortAlgorithm::Quick => quick_sort_by(items, compare),
        SortAlgorithm::Merge => merge_sort_by(items, compare),
    }
}

/// Quick sort with the first element of each partition as pivot.
///
/// Not in place: the input is left untouched and a permutation of indices
/// is sorted instead, then cloned out. Each partition is rebuilt from two
/// scratch buffers, `less` and `rest`, filled in input order. Elements
/// equal to the pivot go to `rest`, to the right of the pivot, which is
/// also where they came from. Since neither buffer reorders its elements,
/// equal elements keep their input order and the sort is stable.
pub fn quick_sort_by<T, F>(items: &[T], compare: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    let mut order: Vec<usize> = (0..items.len()).collect();
    let mut less = Vec::new();
    let mut rest = Vec::new();
    let mut stack = vec![(0, order.len())];

    while let Some((lo, hi)) = stack.pop() {
        if hi - lo < 2 {
            continue;
        }

        let pivot = order[lo];
        less.clear();
        rest.clear();
        for &i in &order[lo + 1..hi] {
            if compare(&items[i], &items[pivot]) == Ordering::Less {
                less.push(i);
            } else {
                rest.push(i);
            }
        }

        let split = lo + less.len();
        order[lo..split].copy_from_slice(&less);
        order[split] = pivot;
        order[split + 1..hi].copy_from_slice(&rest);

        stack.push((split + 1, hi));
        stack.push((lo, split));
    }

    order.into_iter().map(|i| items[i].clone()).collect()
}

/// Bottom-up merge sort; ties keep their input order.
pub fn merge_sort_by<T, F>(items: &[T], compare: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    let len = items.len();
    let mut order: Vec<usize> = (0..len).collect();
    let mut buffer = vec![0; len];
    let mut width = 1;

    while width < len {
        for start in (0..len).step_by(2 * width) {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);

            let (mut left, mut right) = (start, mid);
            for slot in &mut buffer[start..end] {
                let take_left = right >= end
                    || (left < mid
                        && compare(&items[order[left]], &items[order[right]]) != Ordering::Greater);
                if take_left {
                    *slot = order[left];
                    left += 1;
                } else {
                    *slot = order[right];
                    right += 1;
                }
            }
        }
        std::mem::swap(&mut order, &mut buffer);
        width *= 2;
    }

    order.into_iter().map(|i| items[i].clone()).collect()
}

/// Returns the index of the first item for which `locate` is `Equal`.
///
/// `items` must be sorted so that `locate` is `Less` on a prefix, `Equal` on
/// a middle run and `Greater` on the rest. `locate` compares an item against
/// the target.
pub fn binary_search_by<T, F>(items: &[T], locate: F) -> Option<usize>
where
    F: Fn(&T) -> Ordering,
{
    let first = items.partition_point(|item| locate(item) == Ordering::Less);
    match items.get(first) {
        Some(item) if locate(item) == Ordering::Equal => Some(first),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_key(a: &(i32, char), b: &(i32, char)) -> Ordering {
        a.0.cmp(&b.0)
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("quick".parse::<SortAlgorithm>().unwrap(), SortAlgorithm::Quick);
        assert_eq!("Merge".parse::<SortAlgorithm>().unwrap(), SortAlgorithm::Merge);
        assert_eq!(
            "bubble".parse::<SortAlgorithm>().unwrap_err(),
            SortError::UnknownAlgorithm("bubble".into())
        );
    }

    #[test]
    fn test_quick_sort() {
        let items = [5, 3, 9, 1, 3, 7, 0];
        assert_eq!(quick_sort_by(&items, i32::cmp), vec![0, 1, 3, 3, 5, 7, 9]);
    }

    #[test]
    fn test_merge_sort() {
        let items = [5, 3, 9, 1, 3, 7, 0, 2];
        assert_eq!(merge_sort_by(&items, i32::cmp), vec![0, 1, 2, 3, 3, 5, 7, 9]);
    }

    #[test]
    fn test_both_sorts_are_stable() {
        let items = [(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd'), (2, 'e')];
        let expected = vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c'), (2, 'e')];

        assert_eq!(quick_sort_by(&items, by_key), expected);
        assert_eq!(merge_sort_by(&items, by_key), expected);
    }

    #[test]
    fn test_quick_sort_ties_stay_right_of_pivot() {
        let items = [(1, 'a'), (1, 'b'), (0, 'c'), (1, 'd'), (0, 'e')];
        assert_eq!(
            quick_sort_by(&items, by_key),
            vec![(0, 'c'), (0, 'e'), (1, 'a'), (1, 'b'), (1, 'd')]
        );
        assert_eq!(items[0], (1, 'a'));
    }

    #[test]
    fn test_empty_and_single() {
        let empty: [i32; 0] = [];
        assert!(quick_sort_by(&empty, i32::cmp).is_empty());
        assert!(merge_sort_by(&empty, i32::cmp).is_empty());
        assert_eq!(sort_by(&[4], SortAlgorithm::Quick, i32::cmp), vec![4]);
    }

    #[test]
    fn test_already_sorted_input() {
        let items: Vec<i32> = (0..500).collect();
        assert_eq!(quick_sort_by(&items, i32::cmp), items);
        assert_eq!(merge_sort_by(&items, i32::cmp), items);
    }

    #[test]
    fn test_binary_search_finds_first_match() {
        let items = [1, 3, 3, 3, 8];
        assert_eq!(binary_search_by(&items, |x| x.cmp(&3)), Some(1));
        assert_eq!(binary_search_by(&items, |x| x.cmp(&8)), Some(4));
        assert_eq!(binary_search_by(&items, |x| x.cmp(&4)), None);
        assert_eq!(binary_search_by(&items, |x| x.cmp(&9)), None);
        assert_eq!(binary_search_by(&[] as &[i32], |x| x.cmp(&1)), None);
    }
}
