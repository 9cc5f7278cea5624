//! Catalog facade
//!
//! The catalog owns the authoritative record list and one `IndexSet`. It is
//! the only code that mutates indexes: every insert and remove is applied
//! to every index before the call returns, and every query is answered by
//! a single index.
//!
//! # Failure model
//!
//! - Validation runs before any index is touched. A rejected record leaves
//!   the catalog exactly as it was.
//! - With `verify_invariants` on, every mutation is followed by a structure
//!   check: every index in full, and the relation graph around the record
//!   that changed. A failed check poisons the catalog: reads still work,
//!   mutations return `FOLIO_CATALOG_POISONED`.
//! - A removal that finds an index not holding the record poisons the
//!   catalog whether or not `verify_invariants` is on.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::config::CatalogConfig;
use super::errors::{CatalogError, CatalogResult};
use super::query::Query;
use crate::index::{HashKey, IndexError, IndexResult, IndexSet, IndexStats, RelationKind};
use crate::observability::{log_event_with_fields, CatalogMetrics, Event, MetricsSnapshot};
use crate::record::{Record, RecordError, RecordId, RecordKey, RecordValidator};
use crate::sort::{self, SortAlgorithm, SortField, SortResult};

/// Counts reported by `Catalog::insert_all`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LoadSummary {
    pub inserted: usize,
    pub rejected: usize,
}

/// Catalog size, index shapes and counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub records: usize,
    pub poisoned: bool,
    pub indexes: IndexStats,
    pub metrics: MetricsSnapshot,
}

/// An in-memory multi-index book catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    config: CatalogConfig,
    validator: RecordValidator,
    records: BTreeMap<RecordId, Record>,
    keys: HashMap<RecordKey, RecordId>,
    indexes: IndexSet,
    next_id: u64,
    poisoned: Option<String>,
    metrics: CatalogMetrics,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(CatalogConfig::default())
    }
}

impl Catalog {
    /// Creates an empty catalog.
    ///
    /// `config` is expected to have passed `CatalogConfig::validate`.
    pub fn new(config: CatalogConfig) -> Self {
        let catalog = Self {
            validator: config.validator(),
            indexes: IndexSet::new(config.index_options()),
            config,
            records: BTreeMap::new(),
            keys: HashMap::new(),
            next_id: 1,
            poisoned: None,
            metrics: CatalogMetrics::new(),
        };

        let slots = catalog.config.hash_slots.to_string();
        let order = catalog.config.range_order.to_string();
        log_event_with_fields(
            Event::CatalogCreated,
            &[("hash_slots", slots.as_str()), ("range_order", order.as_str())],
        );
        catalog
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    // ==================================================================
    // Mutations
    // ==================================================================

    /// Validates `record` and files it in every index.
    ///
    /// # Errors
    ///
    /// - `FOLIO_INVALID_RECORD` / `FOLIO_DUPLICATE_RECORD`: nothing changed
    /// - `FOLIO_STRUCTURAL_INVARIANT_VIOLATION`: the record was filed but a
    ///   structure check failed; the catalog is now poisoned
    /// - `FOLIO_CATALOG_POISONED`: an earlier mutation failed its check
    pub fn insert(&mut self, record: Record) -> CatalogResult<RecordId> {
        self.ensure_writable()?;

        if let Err(e) = self.admit(&record) {
            self.metrics.increment_rejected_inserts();
            log_event_with_fields(
                Event::RecordRejected,
                &[("code", e.code().code()), ("title", record.title.as_str())],
            );
            return Err(e.into());
        }

        let id = RecordId::new(self.next_id);
        self.next_id += 1;

        self.indexes
            .apply_insert(id, &record, self.records.iter().map(|(&k, v)| (k, v)));
        self.keys.insert(record.key(), id);

        let id_field = id.to_string();
        log_event_with_fields(
            Event::RecordInserted,
            &[("id", id_field.as_str()), ("title", record.title.as_str())],
        );
        self.records.insert(id, record);
        self.metrics.increment_inserts();

        self.verify_after_mutation(id)?;
        Ok(id)
    }

    fn admit(&self, record: &Record) -> Result<(), RecordError> {
        self.validator.validate(record)?;
        if self.keys.contains_key(&record.key()) {
            return Err(RecordError::duplicate(
                &record.title,
                &record.author,
                record.year,
            ));
        }
        Ok(())
    }

    /// Inserts every record in order.
    ///
    /// Rejected records are skipped and counted. A fatal error stops the
    /// load and is returned.
    pub fn insert_all(
        &mut self,
        records: impl IntoIterator<Item = Record>,
    ) -> CatalogResult<LoadSummary> {
        let mut summary = LoadSummary::default();
        for record in records {
            match self.insert(record) {
                Ok(_) => summary.inserted += 1,
                Err(CatalogError::Record(_)) => summary.rejected += 1,
                Err(e) => return Err(e),
            }
        }

        let inserted = summary.inserted.to_string();
        let rejected = summary.rejected.to_string();
        log_event_with_fields(
            Event::RecordsLoaded,
            &[("inserted", inserted.as_str()), ("rejected", rejected.as_str())],
        );
        Ok(summary)
    }

    /// Removes the earliest inserted record titled exactly `title`.
    ///
    /// Returns `Ok(None)` if no record has that title.
    pub fn remove(&mut self, title: &str) -> CatalogResult<Option<Record>> {
        self.ensure_writable()?;
        match self.indexes.titles().search(title).first().copied() {
            Some(id) => self.detach(id),
            None => Ok(None),
        }
    }

    /// Removes the record with the given identity.
    pub fn remove_record(&mut self, key: &RecordKey) -> CatalogResult<Option<Record>> {
        self.ensure_writable()?;
        match self.keys.get(key).copied() {
            Some(id) => self.detach(id),
            None => Ok(None),
        }
    }

    fn detach(&mut self, id: RecordId) -> CatalogResult<Option<Record>> {
        let Some(record) = self.records.remove(&id) else {
            return Ok(None);
        };
        let cascade = self.indexes.apply_remove(id, &record);
        self.keys.remove(&record.key());
        if let Err(e) = cascade {
            return Err(self.poison(e));
        }
        self.metrics.increment_removes();

        let id_field = id.to_string();
        log_event_with_fields(
            Event::RecordRemoved,
            &[("id", id_field.as_str()), ("title", record.title.as_str())],
        );

        self.verify_after_mutation(id)?;
        Ok(Some(record))
    }

    fn ensure_writable(&self) -> CatalogResult<()> {
        match &self.poisoned {
            Some(reason) => Err(CatalogError::Poisoned(reason.clone())),
            None => Ok(()),
        }
    }

    fn verify_after_mutation(&mut self, id: RecordId) -> CatalogResult<()> {
        if !self.config.verify_invariants {
            return Ok(());
        }
        self.metrics.increment_invariant_checks();
        let checked = self
            .indexes
            .check_after_mutation(id)
            .and_then(|()| self.check_counts());
        checked.map_err(|e| self.poison(e))
    }

    fn poison(&mut self, e: IndexError) -> CatalogError {
        log_event_with_fields(
            Event::InvariantViolation,
            &[("structure", e.structure()), ("reason", e.message())],
        );
        self.poisoned = Some(e.to_string());
        e.into()
    }

    // ==================================================================
    // Queries
    // ==================================================================

    fn resolve(&self, ids: &[RecordId]) -> Vec<&Record> {
        ids.iter().filter_map(|id| self.records.get(id)).collect()
    }

    fn observe(&self, by: &str, found: usize) {
        self.metrics.increment_queries();
        let found = found.to_string();
        log_event_with_fields(Event::QueryExecuted, &[("by", by), ("found", found.as_str())]);
    }

    /// Answers `query` from the one index that owns its dimension.
    pub fn find(&self, query: &Query) -> Vec<&Record> {
        let result = match query {
            Query::Title(prefix) => self.resolve(&self.indexes.title_trie().search(prefix)),
            Query::Author(prefix) => self.resolve(&self.indexes.author_trie().search(prefix)),
            Query::Genre(path) => self.resolve(self.indexes.genres().search(path)),
            Query::Year(year) => self.resolve(self.indexes.years().search(*year)),
        };
        self.observe(query.dimension(), result.len());
        result
    }

    /// Records whose title starts with `prefix`, ignoring case
    pub fn find_by_title(&self, prefix: &str) -> Vec<&Record> {
        self.find(&Query::title(prefix))
    }

    /// Records whose author starts with `prefix`, ignoring case
    pub fn find_by_author(&self, prefix: &str) -> Vec<&Record> {
        self.find(&Query::author(prefix))
    }

    /// Records filed exactly at genre `path`
    pub fn find_by_genre(&self, path: &str) -> Vec<&Record> {
        self.find(&Query::genre(path))
    }

    pub fn find_by_year(&self, year: i32) -> Vec<&Record> {
        self.find(&Query::year(year))
    }

    /// Records titled exactly `title`, in insertion order
    pub fn get_by_title(&self, title: &str) -> Vec<&Record> {
        let result = self.resolve(self.indexes.titles().search(title));
        self.observe("exact_title", result.len());
        result
    }

    pub fn lookup(&self, key: &HashKey) -> Vec<&Record> {
        let result = self.resolve(self.indexes.hash().search(key));
        self.observe("hash", result.len());
        result
    }

    /// Records filed at genre `path` or anywhere below it
    pub fn find_by_genre_tree(&self, path: &str) -> Vec<&Record> {
        let result = self.resolve(&self.indexes.genres().search_with_subgenres(path));
        self.observe("genre_tree", result.len());
        result
    }

    /// Records published in `lo..=hi`, ordered by year then insertion.
    /// An inverted range is empty.
    pub fn find_by_year_range(&self, lo: i32, hi: i32) -> Vec<&Record> {
        let result = self.resolve(&self.indexes.ranges().range(lo, hi));
        self.observe("year_range", result.len());
        result
    }

    /// Records from `year` whose author contains `author`, ignoring case
    pub fn find_by_author_and_year(&self, author: &str, year: i32) -> Vec<&Record> {
        let needle = author.to_lowercase();
        let result: Vec<&Record> = self
            .resolve(self.indexes.years().search(year))
            .into_iter()
            .filter(|r| r.author.to_lowercase().contains(&needle))
            .collect();
        self.observe("author_and_year", result.len());
        result
    }

    /// Records whose title starts with `title` and whose author contains
    /// `author`, both ignoring case
    pub fn find_by_title_and_author(&self, title: &str, author: &str) -> Vec<&Record> {
        let needle = author.to_lowercase();
        let result: Vec<&Record> = self
            .resolve(&self.indexes.title_trie().search(title))
            .into_iter()
            .filter(|r| r.author.to_lowercase().contains(&needle))
            .collect();
        self.observe("title_and_author", result.len());
        result
    }

    /// Case-insensitive substring search over title, author and preview.
    ///
    /// Scans the record list in insertion order.
    pub fn search_keyword(&self, keyword: &str) -> Vec<&Record> {
        let result: Vec<&Record> = self.records.values().filter(|r| r.mentions(keyword)).collect();
        self.observe("keyword", result.len());
        result
    }

    /// Neighbours of the record with id `id`, one entry per edge
    pub fn related(&self, id: RecordId) -> Vec<(&Record, RelationKind)> {
        let result: Vec<(&Record, RelationKind)> = self
            .indexes
            .graph()
            .related(id)
            .iter()
            .filter_map(|&(other, kind)| self.records.get(&other).map(|r| (r, kind)))
            .collect();
        self.observe("related", result.len());
        result
    }

    /// Neighbours of the earliest record titled exactly `title`
    pub fn related_to(&self, title: &str) -> Vec<(&Record, RelationKind)> {
        match self.indexes.titles().search(title).first() {
            Some(&id) => self.related(id),
            None => {
                self.observe("related", 0);
                Vec::new()
            }
        }
    }

    /// A copy of the record list ordered by `field`
    pub fn sort_by(&self, field: SortField, algorithm: SortAlgorithm) -> Vec<Record> {
        self.metrics.increment_sorts();
        let refs: Vec<&Record> = self.records.values().collect();
        sort::sort(&refs, field, algorithm)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Sorts by `field`, then binary-searches for `value`.
    ///
    /// Returns the first record in sorted order whose field equals `value`.
    ///
    /// # Errors
    ///
    /// `SortError::InvalidYear` when `field` is year and `value` is not an
    /// integer.
    pub fn search_sorted(
        &self,
        field: SortField,
        algorithm: SortAlgorithm,
        value: &str,
    ) -> SortResult<Option<&Record>> {
        self.metrics.increment_sorts();
        let refs: Vec<&Record> = self.records.values().collect();
        let sorted = sort::sort(&refs, field, algorithm);
        let found = sort::binary_search(&sorted, field, value)?.map(|i| sorted[i]);
        self.observe("sorted", usize::from(found.is_some()));
        Ok(found)
    }

    // ==================================================================
    // Inspection
    // ==================================================================

    /// Every record, in insertion order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Every record with its id, in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (RecordId, &Record)> {
        self.records.iter().map(|(&id, r)| (id, r))
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    pub fn id_of(&self, key: &RecordKey) -> Option<RecordId> {
        self.keys.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records per genre string, ordered by genre
    pub fn genre_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in self.records.values() {
            *counts.entry(record.genre.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Labels of the direct subgenres of `path`
    pub fn subgenres(&self, path: &str) -> Vec<&str> {
        self.indexes.genres().subgenres(path)
    }

    pub fn indexes(&self) -> &IndexSet {
        &self.indexes
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            records: self.records.len(),
            poisoned: self.is_poisoned(),
            indexes: self.indexes.stats(),
            metrics: self.metrics.snapshot(),
        }
    }

    /// Runs every structure check plus the record-count cross check.
    ///
    /// Does not poison the catalog; only a failed check after a mutation
    /// does.
    pub fn check_invariants(&self) -> CatalogResult<()> {
        self.metrics.increment_invariant_checks();
        self.verify().map_err(CatalogError::from)
    }

    fn verify(&self) -> IndexResult<()> {
        self.indexes.check_invariants()?;
        self.check_counts()
    }

    /// Every index holds exactly the cataloged records.
    fn check_counts(&self) -> IndexResult<()> {
        let expected = self.records.len();
        let counts = [
            ("year_tree", self.indexes.years().record_count()),
            ("title_tree", self.indexes.titles().record_count()),
            ("genre_tree", self.indexes.genres().record_count()),
            ("title_trie", self.indexes.title_trie().record_count()),
            ("author_trie", self.indexes.author_trie().record_count()),
            ("range_index", self.indexes.ranges().len()),
            ("relation_graph", self.indexes.graph().node_count()),
            ("identity_map", self.keys.len()),
        ];
        for (structure, count) in counts {
            if count != expected {
                return Err(IndexError::invariant_violation(
                    structure,
                    format!("holds {} records, catalog holds {}", count, expected),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verified() -> Catalog {
        Catalog::new(CatalogConfig {
            verify_invariants: true,
            ..CatalogConfig::default()
        })
    }

    fn titles(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.title.clone()).collect()
    }

    fn herbert_shelf() -> Catalog {
        let mut catalog = verified();
        catalog
            .insert(Record::new("Dune", "Frank Herbert", "SciFi", 1965))
            .unwrap();
        catalog
            .insert(Record::new("Dune Messiah", "Frank Herbert", "SciFi", 1969))
            .unwrap();
        catalog
            .insert(Record::new("Emma", "Jane Austen", "Classic/Romance", 1815))
            .unwrap();
        catalog
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let mut catalog = verified();
        let a = catalog.insert(Record::new("A", "x", "g", 1)).unwrap();
        let b = catalog.insert(Record::new("B", "x", "g", 2)).unwrap();

        assert!(a < b);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(a).unwrap().title, "A");
    }

    #[test]
    fn test_find_routes_each_dimension() {
        let catalog = herbert_shelf();

        assert_eq!(titles(&catalog.find_by_title("du")), vec!["Dune", "Dune Messiah"]);
        assert_eq!(titles(&catalog.find_by_title("Dune ")), vec!["Dune Messiah"]);
        assert_eq!(titles(&catalog.find_by_author("jane")), vec!["Emma"]);
        assert_eq!(titles(&catalog.find_by_genre("classic/romance")), vec!["Emma"]);
        assert!(catalog.find_by_genre("Classic").is_empty());
        assert_eq!(titles(&catalog.find_by_year(1969)), vec!["Dune Messiah"]);
        assert_eq!(
            titles(&catalog.find(&Query::Year(1965))),
            titles(&catalog.find_by_year(1965))
        );
    }

    #[test]
    fn test_exact_and_hash_lookups() {
        let catalog = herbert_shelf();

        assert_eq!(titles(&catalog.get_by_title("Dune")), vec!["Dune"]);
        assert!(catalog.get_by_title("dune").is_empty());
        assert_eq!(catalog.lookup(&HashKey::Genre("SciFi".into())).len(), 2);
        assert_eq!(titles(&catalog.lookup(&HashKey::Year(1815))), vec!["Emma"]);
        assert!(catalog.lookup(&HashKey::Title("Solaris".into())).is_empty());
    }

    #[test]
    fn test_genre_tree_and_ranges() {
        let catalog = herbert_shelf();

        assert_eq!(titles(&catalog.find_by_genre_tree("Classic")), vec!["Emma"]);
        assert_eq!(catalog.subgenres("Classic"), vec!["Romance"]);
        assert_eq!(
            titles(&catalog.find_by_year_range(1800, 1966)),
            vec!["Emma", "Dune"]
        );
        assert!(catalog.find_by_year_range(1970, 1960).is_empty());
    }

    #[test]
    fn test_combined_lookups() {
        let catalog = herbert_shelf();

        assert_eq!(
            titles(&catalog.find_by_author_and_year("herbert", 1969)),
            vec!["Dune Messiah"]
        );
        assert!(catalog.find_by_author_and_year("austen", 1969).is_empty());
        assert_eq!(
            titles(&catalog.find_by_title_and_author("dune", "FRANK")),
            vec!["Dune", "Dune Messiah"]
        );
    }

    #[test]
    fn test_keyword_search_reads_preview() {
        let mut catalog = verified();
        catalog
            .insert(Record::new("Solaris", "Lem", "SciFi", 1961).with_preview("An ocean planet"))
            .unwrap();

        assert_eq!(catalog.search_keyword("OCEAN").len(), 1);
        assert_eq!(catalog.search_keyword("lem").len(), 1);
        assert!(catalog.search_keyword("desert").is_empty());
    }

    #[test]
    fn test_related_to_lists_shared_attributes() {
        let catalog = herbert_shelf();

        let related: Vec<(String, RelationKind)> = catalog
            .related_to("Dune")
            .into_iter()
            .map(|(r, kind)| (r.title.clone(), kind))
            .collect();

        assert!(related.contains(&("Dune Messiah".into(), RelationKind::Author)));
        assert!(related.contains(&("Dune Messiah".into(), RelationKind::Genre)));
        assert!(related.iter().all(|(title, _)| title != "Emma"));
        assert!(catalog.related_to("Missing").is_empty());
    }

    #[test]
    fn test_rejected_insert_changes_nothing() {
        let mut catalog = herbert_shelf();
        let before = catalog.indexes().stats();

        let dup = catalog.insert(Record::new("Dune", "Frank Herbert", "Other", 1965));
        assert_eq!(dup.unwrap_err().code(), "FOLIO_DUPLICATE_RECORD");

        let blank = catalog.insert(Record::new("  ", "Nobody", "SciFi", 2000));
        assert_eq!(blank.unwrap_err().code(), "FOLIO_INVALID_RECORD");

        let late = catalog.insert(Record::new("Far", "Future", "SciFi", 12000));
        assert_eq!(late.unwrap_err().code(), "FOLIO_INVALID_RECORD");

        assert_eq!(catalog.indexes().stats(), before);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.stats().metrics.rejected_inserts, 3);
        assert!(!catalog.is_poisoned());
    }

    #[test]
    fn test_remove_cascades() {
        let mut catalog = herbert_shelf();

        let removed = catalog.remove("Dune").unwrap().unwrap();
        assert_eq!(removed.year, 1965);

        assert!(catalog.get_by_title("Dune").is_empty());
        assert_eq!(titles(&catalog.find_by_title("dune")), vec!["Dune Messiah"]);
        assert!(catalog.find_by_year(1965).is_empty());
        assert!(catalog.find_by_year_range(1965, 1965).is_empty());
        assert!(catalog.lookup(&HashKey::Title("Dune".into())).is_empty());
        assert_eq!(catalog.find_by_genre("SciFi").len(), 1);
        assert!(catalog.related_to("Dune Messiah").is_empty());
        assert!(catalog.search_keyword("Dune").iter().all(|r| r.title != "Dune"));

        assert_eq!(catalog.remove("Dune").unwrap(), None);
        catalog.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_takes_earliest_same_title() {
        let mut catalog = verified();
        catalog.insert(Record::new("Poems", "Keats", "Poetry", 1817)).unwrap();
        catalog.insert(Record::new("Poems", "Shelley", "Poetry", 1820)).unwrap();

        let removed = catalog.remove("Poems").unwrap().unwrap();
        assert_eq!(removed.author, "Keats");
        assert_eq!(catalog.get_by_title("Poems")[0].author, "Shelley");
    }

    #[test]
    fn test_remove_record_by_identity() {
        let mut catalog = herbert_shelf();

        let key = RecordKey::new("Emma", "Jane Austen", 1815);
        assert!(catalog.id_of(&key).is_some());
        assert_eq!(catalog.remove_record(&key).unwrap().unwrap().title, "Emma");
        assert_eq!(catalog.remove_record(&key).unwrap(), None);
        assert!(catalog.id_of(&key).is_none());

        // the same identity may be inserted again
        catalog.insert(Record::new("Emma", "Jane Austen", "Classic", 1815)).unwrap();
    }

    #[test]
    fn test_insert_all_skips_rejections() {
        let mut catalog = verified();
        let summary = catalog
            .insert_all(vec![
                Record::new("Dune", "Herbert", "SciFi", 1965),
                Record::new("Dune", "Herbert", "SciFi", 1965),
                Record::new("", "Herbert", "SciFi", 1965),
                Record::new("Emma", "Austen", "Classic", 1815),
            ])
            .unwrap();

        assert_eq!(summary, LoadSummary { inserted: 2, rejected: 2 });
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_sort_and_search_sorted() {
        let catalog = herbert_shelf();

        let by_year = catalog.sort_by(SortField::Year, SortAlgorithm::Merge);
        let years: Vec<i32> = by_year.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![1815, 1965, 1969]);

        let hit = catalog
            .search_sorted(SortField::Author, SortAlgorithm::Quick, "frank herbert")
            .unwrap()
            .unwrap();
        assert_eq!(hit.title, "Dune");
        assert!(catalog
            .search_sorted(SortField::Year, SortAlgorithm::Quick, "2001")
            .unwrap()
            .is_none());
        assert!(catalog
            .search_sorted(SortField::Year, SortAlgorithm::Quick, "soon")
            .is_err());

        // sorting leaves insertion order alone
        let order: Vec<&str> = catalog.records().map(|r| r.title.as_str()).collect();
        assert_eq!(order, vec!["Dune", "Dune Messiah", "Emma"]);
    }

    #[test]
    fn test_genre_counts() {
        let catalog = herbert_shelf();
        let counts = catalog.genre_counts();

        assert_eq!(counts.get("SciFi"), Some(&2));
        assert_eq!(counts.get("Classic/Romance"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_stats_count_operations() {
        let catalog = herbert_shelf();
        catalog.find_by_year(1965);
        catalog.sort_by(SortField::Title, SortAlgorithm::Quick);

        let stats = catalog.stats();
        assert_eq!(stats.records, 3);
        assert_eq!(stats.metrics.inserts, 3);
        assert_eq!(stats.metrics.queries, 1);
        assert_eq!(stats.metrics.sorts, 1);
        assert_eq!(stats.indexes.distinct_years, 3);
        assert!(!stats.poisoned);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["records"], 3);
    }

    #[test]
    fn test_inconsistency_poisons_catalog() {
        let mut catalog = herbert_shelf();

        // drop a record behind the indexes' back
        let first = catalog.entries().next().map(|(id, _)| id).unwrap();
        catalog.records.remove(&first);
        assert!(catalog.check_invariants().is_err());
        assert!(!catalog.is_poisoned());

        let err = catalog
            .insert(Record::new("Solaris", "Lem", "SciFi", 1961))
            .unwrap_err();
        assert_eq!(err.code(), "FOLIO_STRUCTURAL_INVARIANT_VIOLATION");
        assert!(catalog.is_poisoned());

        let err = catalog.remove("Emma").unwrap_err();
        assert_eq!(err.code(), "FOLIO_CATALOG_POISONED");
        assert!(err.is_fatal());

        // reads keep working
        assert_eq!(catalog.find_by_author("lem").len(), 1);
    }

    #[test]
    fn test_missed_index_on_remove_poisons_unverified_catalog() {
        let mut catalog = Catalog::new(CatalogConfig {
            verify_invariants: false,
            ..CatalogConfig::default()
        });
        catalog
            .insert(Record::new("Dune", "Frank Herbert", "SciFi", 1965))
            .unwrap();
        catalog
            .insert(Record::new("Emma", "Jane Austen", "Classic", 1815))
            .unwrap();

        // pull the record out of the indexes but leave the identity map
        let key = RecordKey::new("Dune", "Frank Herbert", 1965);
        let id = catalog.id_of(&key).unwrap();
        let record = catalog.get(id).unwrap().clone();
        catalog.indexes.apply_remove(id, &record).unwrap();

        let err = catalog.remove_record(&key).unwrap_err();
        assert_eq!(err.code(), "FOLIO_STRUCTURAL_INVARIANT_VIOLATION");
        assert!(catalog.is_poisoned());
        assert!(catalog.get(id).is_none());

        let err = catalog.remove("Emma").unwrap_err();
        assert_eq!(err.code(), "FOLIO_CATALOG_POISONED");
    }

    #[test]
    fn test_unverified_catalog_skips_checks() {
        let mut catalog = Catalog::new(CatalogConfig {
            verify_invariants: false,
            ..CatalogConfig::default()
        });
        catalog.insert(Record::new("A", "x", "g", 1)).unwrap();
        assert_eq!(catalog.stats().metrics.invariant_checks, 0);
    }
}
