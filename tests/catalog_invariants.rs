//! Catalog Invariant Tests
//!
//! Tests for the catalog facade:
//! - Every dimension finds every record regardless of insertion order
//! - Removal cascades to every index
//! - A rejected insert leaves every index unchanged
//! - Relation scenarios from shared authors and genres
//! - Verified loads stay fast when every record shares a genre

use std::time::{Duration, Instant};

use folio::catalog::{Catalog, CatalogConfig, Query};
use folio::index::{HashKey, RelationKind};
use folio::record::{Record, RecordKey};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

// =============================================================================
// Helper Functions
// =============================================================================

fn verified_catalog() -> Catalog {
    Catalog::new(CatalogConfig {
        verify_invariants: true,
        ..CatalogConfig::default()
    })
}

fn library() -> Vec<Record> {
    vec![
        Record::new("Dune", "Frank Herbert", "Fiction/SciFi", 1965),
        Record::new("Dune Messiah", "Frank Herbert", "Fiction/SciFi", 1969),
        Record::new("Dust", "Hugh Howey", "Fiction/SciFi", 2015),
        Record::new("Emma", "Jane Austen", "Fiction/Classic", 1815),
        Record::new("Persuasion", "Jane Austen", "Fiction/Classic", 1817),
        Record::new("Solaris", "Stanislaw Lem", "Fiction/SciFi", 1961),
        Record::new("The Cyberiad", "Stanislaw Lem", "Fiction/SciFi/Humor", 1965),
        Record::new("Cosmos", "Carl Sagan", "Science", 1980),
        Record::new("Poems", "John Keats", "Poetry", 1817),
        Record::new("Poems", "Percy Shelley", "Poetry", 1820),
    ]
}

fn titles(records: &[&Record]) -> Vec<String> {
    let mut titles: Vec<String> = records.iter().map(|r| r.title.clone()).collect();
    titles.sort();
    titles
}

fn contains(records: &[&Record], record: &Record) -> bool {
    records.iter().any(|r| r.same_book(record))
}

// =============================================================================
// Round Trip
// =============================================================================

/// Exact lookups on every dimension find every record in any order.
#[test]
fn test_every_record_found_in_any_insertion_order() {
    for seed in 0..8 {
        let mut records = library();
        records.shuffle(&mut StdRng::seed_from_u64(seed));

        let mut catalog = verified_catalog();
        for record in &records {
            catalog.insert(record.clone()).unwrap();
        }
        catalog.check_invariants().unwrap();

        for record in &records {
            assert!(contains(&catalog.get_by_title(&record.title), record));
            assert!(contains(&catalog.find_by_title(&record.title), record));
            assert!(contains(&catalog.find_by_author(&record.author), record));
            assert!(contains(&catalog.find_by_year(record.year), record));
            assert!(contains(&catalog.find_by_genre(&record.genre), record));
            assert!(contains(
                &catalog.find_by_year_range(record.year, record.year),
                record
            ));
            assert!(contains(
                &catalog.lookup(&HashKey::Title(record.title.clone())),
                record
            ));
            assert!(contains(&catalog.lookup(&HashKey::Genre(record.genre.clone())), record));
        }
    }
}

/// Query results keep the order of insertion within one bucket.
#[test]
fn test_year_bucket_keeps_insertion_order() {
    let mut catalog = verified_catalog();
    catalog.insert_all(library()).unwrap();

    let found: Vec<&str> = catalog
        .find(&Query::Year(1965))
        .iter()
        .map(|r| r.title.as_str())
        .collect();
    assert_eq!(found, vec!["Dune", "The Cyberiad"]);
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_herbert_scenario() {
    let mut catalog = verified_catalog();
    catalog
        .insert(Record::new("Dune", "Herbert", "SciFi", 1965))
        .unwrap();
    catalog
        .insert(Record::new("Dune Messiah", "Herbert", "SciFi", 1969))
        .unwrap();

    assert_eq!(
        titles(&catalog.find_by_author("Herbert")),
        vec!["Dune", "Dune Messiah"]
    );

    let related: Vec<(String, RelationKind)> = catalog
        .related_to("Dune")
        .into_iter()
        .map(|(r, kind)| (r.title.clone(), kind))
        .collect();
    assert!(related.contains(&("Dune Messiah".to_string(), RelationKind::Author)));
    assert!(related.contains(&("Dune Messiah".to_string(), RelationKind::Genre)));
    assert!(!related.contains(&("Dune Messiah".to_string(), RelationKind::Year)));
}

#[test]
fn test_prefix_scenario() {
    let mut catalog = verified_catalog();
    catalog.insert(Record::new("Dune", "Herbert", "SciFi", 1965)).unwrap();
    catalog.insert(Record::new("Dust", "Howey", "SciFi", 2015)).unwrap();

    assert_eq!(titles(&catalog.find_by_title("Du")), vec!["Dune", "Dust"]);
    assert_eq!(titles(&catalog.find_by_title("Dun")), vec!["Dune"]);
}

#[test]
fn test_genre_subtree_query() {
    let mut catalog = verified_catalog();
    catalog.insert_all(library()).unwrap();

    assert_eq!(catalog.find_by_genre("fiction/scifi").len(), 4);
    assert_eq!(catalog.find_by_genre_tree("fiction/scifi").len(), 5);
    assert_eq!(catalog.find_by_genre_tree("Fiction").len(), 7);
    assert!(catalog.find_by_genre("Fiction").is_empty());
}

// =============================================================================
// Removal Cascade
// =============================================================================

/// After removal no query on any dimension returns the record.
#[test]
fn test_removal_cascades_to_every_index() {
    let records = library();
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(99));

    let mut catalog = verified_catalog();
    catalog.insert_all(records.clone()).unwrap();

    for (removed_count, &i) in order.iter().enumerate() {
        let target = &records[i];
        let removed = catalog.remove_record(&target.key()).unwrap().unwrap();
        assert!(removed.same_book(target));

        assert!(!contains(&catalog.get_by_title(&target.title), target));
        assert!(!contains(&catalog.find_by_title(&target.title), target));
        assert!(!contains(&catalog.find_by_author(&target.author), target));
        assert!(!contains(&catalog.find_by_year(target.year), target));
        assert!(!contains(&catalog.find_by_genre_tree(""), target));
        assert!(!contains(&catalog.find_by_year_range(i32::MIN, i32::MAX), target));
        assert!(!contains(&catalog.lookup(&HashKey::Year(target.year)), target));
        assert!(!contains(&catalog.search_keyword(&target.title), target));
        for other in catalog.records() {
            if let Some(other_id) = catalog.id_of(&other.key()) {
                assert!(catalog
                    .related(other_id)
                    .iter()
                    .all(|(r, _)| !r.same_book(target)));
            }
        }

        assert_eq!(catalog.len(), records.len() - removed_count - 1);
        catalog.check_invariants().unwrap();
    }

    assert!(catalog.is_empty());
    let stats = catalog.stats();
    assert_eq!(stats.indexes.hash.entries, 0);
    assert_eq!(stats.indexes.graph_edges, 0);
    assert_eq!(stats.indexes.range_entries, 0);
    assert_eq!(stats.indexes.title_trie_nodes, 1);
}

#[test]
fn test_remove_by_title_takes_earliest() {
    let mut catalog = verified_catalog();
    catalog.insert_all(library()).unwrap();

    let first = catalog.remove("Poems").unwrap().unwrap();
    assert_eq!(first.author, "John Keats");
    let second = catalog.remove("Poems").unwrap().unwrap();
    assert_eq!(second.author, "Percy Shelley");
    assert_eq!(catalog.remove("Poems").unwrap(), None);
}

// =============================================================================
// Fan-out Atomicity
// =============================================================================

/// A rejected insert leaves every index exactly as it was.
#[test]
fn test_rejected_insert_leaves_indexes_unchanged() {
    let mut catalog = verified_catalog();
    catalog.insert_all(library()).unwrap();
    let before = catalog.stats();

    let rejected = [
        Record::new("Dune", "Frank Herbert", "Other", 1965),
        Record::new("", "Anyone", "SciFi", 2000),
        Record::new("Later", "Anyone", "SciFi", 10_000),
    ];
    for record in rejected {
        let err = catalog.insert(record).unwrap_err();
        assert!(!err.is_fatal());
    }

    let after = catalog.stats();
    assert_eq!(after.indexes, before.indexes);
    assert_eq!(after.records, before.records);
    assert_eq!(after.metrics.rejected_inserts, before.metrics.rejected_inserts + 3);
    assert!(!catalog.is_poisoned());
}

/// Configured year bounds are applied on insert.
#[test]
fn test_year_bounds_from_config() {
    let mut catalog = Catalog::new(CatalogConfig {
        min_year: 1900,
        max_year: 2000,
        verify_invariants: true,
        ..CatalogConfig::default()
    });

    let summary = catalog.insert_all(library()).unwrap();
    assert_eq!(summary.inserted, 5);
    assert_eq!(summary.rejected, 5);
    assert!(catalog.find_by_year_range(i32::MIN, 1899).is_empty());
}

/// Identity is the (title, author, year) triple.
#[test]
fn test_identity_ignores_genre_and_preview() {
    let mut catalog = verified_catalog();
    catalog
        .insert(Record::new("Dune", "Herbert", "SciFi", 1965).with_preview("Arrakis"))
        .unwrap();

    let err = catalog
        .insert(Record::new("Dune", "Herbert", "Fantasy", 1965))
        .unwrap_err();
    assert_eq!(err.code(), "FOLIO_DUPLICATE_RECORD");

    catalog
        .insert(Record::new("Dune", "Herbert", "SciFi", 1966))
        .unwrap();
    assert!(catalog
        .id_of(&RecordKey::new("Dune", "Herbert", 1966))
        .is_some());
}

/// Custom separators and hash sizes are honored.
#[test]
fn test_custom_index_options() {
    let config = CatalogConfig::from_json(
        r#"{"hash_slots": 5, "range_order": 3, "genre_separator": ">", "verify_invariants": true}"#,
    )
    .unwrap();
    let mut catalog = Catalog::new(config);
    catalog
        .insert(Record::new("Dune", "Herbert", "Fiction>SciFi", 1965))
        .unwrap();
    catalog
        .insert(Record::new("Emma", "Austen", "Fiction>Classic", 1815))
        .unwrap();

    assert_eq!(catalog.find_by_genre_tree("fiction").len(), 2);
    assert_eq!(catalog.subgenres("Fiction"), vec!["Classic", "SciFi"]);
    assert_eq!(catalog.stats().indexes.hash.slots, 5);
}

// =============================================================================
// Verified Load Cost
// =============================================================================

/// Every pair of records shares the genre, so the relation graph is dense;
/// checking after each insert must not walk the whole graph.
#[test]
fn test_verified_load_of_one_genre_finishes() {
    let records: Vec<Record> = (0..2000)
        .map(|n| {
            Record::new(
                format!("Book {}", n),
                format!("Author {}", n % 40),
                "Fiction/SciFi",
                1900 + n % 120,
            )
        })
        .collect();

    let started = Instant::now();
    let mut catalog = verified_catalog();
    let summary = catalog.insert_all(records).unwrap();
    assert_eq!(summary.inserted, 2000);

    for n in (0..2000).step_by(50) {
        assert!(catalog.remove(&format!("Book {}", n)).unwrap().is_some());
    }
    assert!(started.elapsed() < Duration::from_secs(60));

    let stats = catalog.stats();
    assert_eq!(stats.records, 1960);
    assert_eq!(stats.metrics.invariant_checks, 2040);
    assert!(!stats.poisoned);
    assert_eq!(catalog.find_by_genre("fiction/scifi").len(), 1960);
    catalog.check_invariants().unwrap();
}
