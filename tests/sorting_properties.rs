//! Sorting Tests
//!
//! Tests for the sorting and search utilities:
//! - Quicksort and merge sort agree with a stable reference sort
//! - Equal keys keep their original order
//! - Binary search finds the first match

use std::cmp::Ordering;

use folio::catalog::Catalog;
use folio::record::Record;
use folio::sort::{
    binary_search, binary_search_by, merge_sort_by, quick_sort_by, sort, SortAlgorithm, SortField,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// =============================================================================
// Helper Functions
// =============================================================================

const FIELDS: [SortField; 4] = [
    SortField::Title,
    SortField::Author,
    SortField::Genre,
    SortField::Year,
];

const ALGORITHMS: [SortAlgorithm; 2] = [SortAlgorithm::Quick, SortAlgorithm::Merge];

fn random_records(seed: u64, n: usize) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    let names = ["alpha", "Beta", "gamma", "Delta", "epsilon"];
    (0..n)
        .map(|i| {
            Record::new(
                format!("{} {}", names[rng.gen_range(0..names.len())], i),
                names[rng.gen_range(0..names.len())],
                names[rng.gen_range(0..3)],
                rng.gen_range(1990..1996),
            )
        })
        .collect()
}

/// Identity of each record in order, so stability is visible
fn identities(records: &[Record]) -> Vec<(String, String, i32)> {
    records
        .iter()
        .map(|r| (r.title.clone(), r.author.clone(), r.year))
        .collect()
}

// =============================================================================
// Algorithm Agreement
// =============================================================================

/// Both algorithms match the standard library's stable sort.
#[test]
fn test_algorithms_match_stable_reference() {
    for seed in 0..10 {
        let records = random_records(seed, 120);
        for field in FIELDS {
            let mut expected = records.clone();
            expected.sort_by(|a, b| field.compare(a, b));

            for algorithm in ALGORITHMS {
                let sorted = sort(&records, field, algorithm);
                assert_eq!(
                    identities(&sorted),
                    identities(&expected),
                    "seed {} field {} algorithm {}",
                    seed,
                    field,
                    algorithm
                );
            }
        }
    }
}

/// The input slice is never reordered.
#[test]
fn test_sort_returns_new_ordering() {
    let records = random_records(1, 30);
    let before = identities(&records);
    let _ = sort(&records, SortField::Year, SortAlgorithm::Quick);
    assert_eq!(identities(&records), before);
}

#[test]
fn test_generic_sorts_on_integers() {
    let mut rng = StdRng::seed_from_u64(3);
    let values: Vec<i64> = (0..500).map(|_| rng.gen_range(-50..50)).collect();
    let mut expected = values.clone();
    expected.sort();

    assert_eq!(quick_sort_by(&values, |a, b| a.cmp(b)), expected);
    assert_eq!(merge_sort_by(&values, |a, b| a.cmp(b)), expected);
    assert!(quick_sort_by(&Vec::<i64>::new(), |a, b| a.cmp(b)).is_empty());
}

// =============================================================================
// Stability
// =============================================================================

#[test]
fn test_merge_sort_year_scenario() {
    let records = vec![
        Record::new("C", "x", "g", 1969),
        Record::new("A", "x", "g", 1965),
        Record::new("B", "x", "g", 1965),
    ];

    for algorithm in ALGORITHMS {
        let sorted = sort(&records, SortField::Year, algorithm);
        let titles: Vec<&str> = sorted.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"], "{}", algorithm);
    }
}

#[test]
fn test_catalog_sort_is_stable_by_insertion() {
    let mut catalog = Catalog::default();
    for (title, year) in [("Zeta", 2001), ("Alpha", 2000), ("Mid", 2001), ("Beta", 2000)] {
        catalog.insert(Record::new(title, "x", "g", year)).unwrap();
    }

    let sorted = catalog.sort_by(SortField::Year, SortAlgorithm::Quick);
    let titles: Vec<&str> = sorted.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha", "Beta", "Zeta", "Mid"]);
}

// =============================================================================
// Binary Search
// =============================================================================

/// On random data the search returns the first matching position.
#[test]
fn test_binary_search_finds_first_match() {
    let records = random_records(17, 200);
    let sorted = sort(&records, SortField::Year, SortAlgorithm::Merge);

    for year in 1985..2000 {
        let expected = sorted.iter().position(|r| r.year == year);
        let found = binary_search(&sorted, SortField::Year, &year.to_string()).unwrap();
        assert_eq!(found, expected, "year {}", year);
    }
}

#[test]
fn test_binary_search_text_ignores_case() {
    let records = random_records(5, 60);
    let sorted = sort(&records, SortField::Author, SortAlgorithm::Quick);

    let found = binary_search(&sorted, SortField::Author, "BETA").unwrap().unwrap();
    assert_eq!(sorted[found].author, "Beta");
    assert!(found == 0 || sorted[found - 1].author.to_lowercase() != "beta");
    assert_eq!(binary_search(&sorted, SortField::Author, "omega").unwrap(), None);
}

#[test]
fn test_binary_search_by_comparator() {
    let values = [1, 3, 3, 3, 8];
    assert_eq!(binary_search_by(&values, |v| v.cmp(&3)), Some(1));
    assert_eq!(binary_search_by(&values, |v| v.cmp(&4)), None);
    assert_eq!(binary_search_by(&[] as &[i32], |v| v.cmp(&4)), None);
    assert_eq!(
        binary_search_by(&values, |_| Ordering::Greater),
        None
    );
}
