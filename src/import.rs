//! Import reconciliation.
//!
//! An incoming batch of parsed candidates is partitioned into `new` and
//! `duplicate` by normalized-name lookup against a snapshot of existing
//! names taken once, before any write. The snapshot is not refreshed
//! mid-run, so a name inserted by a concurrent session during the import
//! goes undetected; that race is accepted.
//!
//! Application is best-effort, not transactional: writes go out in
//! fixed-size batches, a failed batch is logged and skipped, and later
//! batches still run. A monotonically increasing progress counter advances
//! after each batch so callers can report records processed so far.

use std::sync::atomic::{AtomicUsize, Ordering};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogStore;
use crate::model::{name_key, NewPlant};

/// Records per write request.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// What to do with records whose name already exists in the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Leave existing records untouched (the default).
    #[default]
    Skip,
    /// Overwrite the non-key fields of each matching record.
    Update,
}

/// Incoming candidates partitioned against the existing-name snapshot.
#[derive(Debug, Default)]
pub struct Reconciliation {
    pub new: Vec<NewPlant>,
    pub duplicates: Vec<NewPlant>,
}

impl Reconciliation {
    pub fn total(&self) -> usize {
        self.new.len() + self.duplicates.len()
    }
}

/// Partition `candidates` by normalized-name membership in `existing_names`.
///
/// Every candidate lands in exactly one partition. Classification uses only
/// the snapshot: two incoming rows with the same new name are both `new`.
pub fn reconcile(candidates: Vec<NewPlant>, existing_names: &[String]) -> Reconciliation {
    let snapshot: FxHashSet<String> = existing_names.iter().map(|name| name_key(name)).collect();

    let mut reconciliation = Reconciliation::default();
    for candidate in candidates {
        if snapshot.contains(&name_key(&candidate.name_ar)) {
            reconciliation.duplicates.push(candidate);
        } else {
            reconciliation.new.push(candidate);
        }
    }
    reconciliation
}

/// Progress of an import run, readable while the run is in flight.
#[derive(Debug, Default)]
pub struct ImportProgress {
    processed: AtomicUsize,
    total: AtomicUsize,
}

impl ImportProgress {
    /// Reset for a new run over `total` planned records.
    pub fn begin(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
        self.processed.store(0, Ordering::SeqCst);
    }

    /// Advance by `n` processed records; returns the new count.
    pub fn advance(&self, n: usize) -> usize {
        self.processed.fetch_add(n, Ordering::SeqCst) + n
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

/// Counts reported after an import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub total: usize,
    pub new: usize,
    pub duplicates: usize,
    pub inserted: usize,
    pub updated: usize,
    pub failed_batches: usize,
}

/// Apply a reconciliation to the store.
///
/// Inserts every `new` record; under [`DuplicatePolicy::Update`] also sends
/// each duplicate to the update interface exactly once. Under `Skip`,
/// duplicates never reach the write interface. The progress counter counts
/// records processed, including those in failed batches.
pub fn apply(
    reconciliation: &Reconciliation,
    policy: DuplicatePolicy,
    store: &dyn CatalogStore,
    progress: &ImportProgress,
    batch_size: usize,
) -> ImportOutcome {
    let batch_size = batch_size.max(1);
    let planned = reconciliation.new.len()
        + match policy {
            DuplicatePolicy::Update => reconciliation.duplicates.len(),
            DuplicatePolicy::Skip => 0,
        };
    progress.begin(planned);

    let mut inserted = 0;
    let mut updated = 0;
    let mut failed_batches = 0;

    for batch in reconciliation.new.chunks(batch_size) {
        match store.insert_batch(batch) {
            Ok(()) => inserted += batch.len(),
            Err(e) => {
                tracing::warn!("Insert batch of {} records failed: {}", batch.len(), e);
                failed_batches += 1;
            }
        }
        let done = progress.advance(batch.len());
        tracing::info!("Imported {}/{} records", done, planned);
    }

    if policy == DuplicatePolicy::Update {
        for batch in reconciliation.duplicates.chunks(batch_size) {
            match store.update_batch(batch) {
                Ok(touched) => updated += touched,
                Err(e) => {
                    tracing::warn!("Update batch of {} records failed: {}", batch.len(), e);
                    failed_batches += 1;
                }
            }
            let done = progress.advance(batch.len());
            tracing::info!("Imported {}/{} records", done, planned);
        }
    }

    ImportOutcome {
        total: reconciliation.total(),
        new: reconciliation.new.len(),
        duplicates: reconciliation.duplicates.len(),
        inserted,
        updated,
        failed_batches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::error::{CatalogError, Result};
    use std::sync::Mutex;

    fn candidate(name: &str) -> NewPlant {
        NewPlant {
            name_ar: name.to_string(),
            water_ml: 100,
            ..Default::default()
        }
    }

    #[test]
    fn classification_is_case_and_whitespace_insensitive() {
        let existing = vec!["Rose".to_string()];
        let incoming = vec![candidate("rose"), candidate(" ROSE "), candidate("Tulip")];

        let reconciliation = reconcile(incoming, &existing);

        assert_eq!(reconciliation.duplicates.len(), 2);
        assert_eq!(reconciliation.new.len(), 1);
        assert_eq!(reconciliation.new[0].name_ar, "Tulip");
        assert_eq!(reconciliation.total(), 3);
    }

    #[test]
    fn classification_uses_only_the_snapshot() {
        // Two incoming rows with the same unseen name are both new; the
        // snapshot is not extended mid-batch.
        let reconciliation = reconcile(vec![candidate("Fern"), candidate("fern")], &[]);
        assert_eq!(reconciliation.new.len(), 2);
        assert!(reconciliation.duplicates.is_empty());
    }

    /// Store that records batch sizes and can fail on request.
    #[derive(Default)]
    struct RecordingStore {
        insert_batches: Mutex<Vec<usize>>,
        update_batches: Mutex<Vec<usize>>,
        fail_inserts: bool,
    }

    impl CatalogStore for RecordingStore {
        fn records(&self) -> Vec<crate::model::PlantRecord> {
            Vec::new()
        }
        fn get(&self, _id: &str) -> Option<crate::model::PlantRecord> {
            None
        }
        fn names(&self) -> Vec<String> {
            Vec::new()
        }
        fn insert_batch(&self, batch: &[NewPlant]) -> Result<()> {
            self.insert_batches.lock().unwrap().push(batch.len());
            if self.fail_inserts {
                Err(CatalogError::Store("insert rejected".to_string()))
            } else {
                Ok(())
            }
        }
        fn update_batch(&self, batch: &[NewPlant]) -> Result<usize> {
            self.update_batches.lock().unwrap().push(batch.len());
            Ok(batch.len())
        }
    }

    #[test]
    fn batches_are_fixed_size_and_progress_reaches_total() {
        let incoming: Vec<NewPlant> = (0..250).map(|i| candidate(&format!("p{i}"))).collect();
        let reconciliation = reconcile(incoming, &[]);

        let store = RecordingStore::default();
        let progress = ImportProgress::default();
        let outcome = apply(
            &reconciliation,
            DuplicatePolicy::Skip,
            &store,
            &progress,
            DEFAULT_BATCH_SIZE,
        );

        assert_eq!(*store.insert_batches.lock().unwrap(), vec![100, 100, 50]);
        assert_eq!(progress.processed(), 250);
        assert_eq!(progress.total(), 250);
        assert_eq!(outcome.inserted, 250);
        assert_eq!(outcome.failed_batches, 0);
    }

    #[test]
    fn skip_policy_never_touches_the_update_interface() {
        let existing = vec!["Rose".to_string()];
        let reconciliation = reconcile(vec![candidate("rose"), candidate("Tulip")], &existing);

        let store = RecordingStore::default();
        let progress = ImportProgress::default();
        let outcome = apply(
            &reconciliation,
            DuplicatePolicy::Skip,
            &store,
            &progress,
            DEFAULT_BATCH_SIZE,
        );

        assert!(store.update_batches.lock().unwrap().is_empty());
        assert_eq!(*store.insert_batches.lock().unwrap(), vec![1]);
        assert_eq!(outcome.updated, 0);
        assert_eq!(progress.total(), 1);
    }

    #[test]
    fn update_policy_sends_each_duplicate_exactly_once() {
        let existing = vec!["Rose".to_string(), "Mint".to_string()];
        let incoming = vec![candidate("rose"), candidate("MINT"), candidate("Tulip")];
        let reconciliation = reconcile(incoming, &existing);

        let store = RecordingStore::default();
        let progress = ImportProgress::default();
        let outcome = apply(
            &reconciliation,
            DuplicatePolicy::Update,
            &store,
            &progress,
            DEFAULT_BATCH_SIZE,
        );

        assert_eq!(store.update_batches.lock().unwrap().iter().sum::<usize>(), 2);
        assert_eq!(outcome.updated, 2);
        assert_eq!(outcome.inserted, 1);
        assert_eq!(progress.processed(), 3);
    }

    #[test]
    fn failed_batch_is_skipped_and_the_run_continues() {
        let incoming: Vec<NewPlant> = (0..150).map(|i| candidate(&format!("p{i}"))).collect();
        let reconciliation = reconcile(incoming, &[]);

        let store = RecordingStore {
            fail_inserts: true,
            ..Default::default()
        };
        let progress = ImportProgress::default();
        let outcome = apply(
            &reconciliation,
            DuplicatePolicy::Skip,
            &store,
            &progress,
            DEFAULT_BATCH_SIZE,
        );

        // Both batches were attempted despite the first failing
        assert_eq!(*store.insert_batches.lock().unwrap(), vec![100, 50]);
        assert_eq!(outcome.failed_batches, 2);
        assert_eq!(outcome.inserted, 0);
        // Progress counts processed records, failed batches included
        assert_eq!(progress.processed(), 150);
    }

    #[test]
    fn update_applies_incoming_fields_to_the_catalog() {
        let catalog = MemoryCatalog::seeded(vec![candidate("Rose")]);

        let mut incoming = candidate(" rose ");
        incoming.water_ml = 999;
        let reconciliation = reconcile(vec![incoming], &catalog.names());

        let progress = ImportProgress::default();
        let outcome = apply(
            &reconciliation,
            DuplicatePolicy::Update,
            &catalog,
            &progress,
            DEFAULT_BATCH_SIZE,
        );

        assert_eq!(outcome.updated, 1);
        assert_eq!(catalog.get("1").unwrap().water_ml, 999);
        assert_eq!(catalog.get("1").unwrap().name_ar, "Rose");
    }
}
