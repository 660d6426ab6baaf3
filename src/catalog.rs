//! Catalog store: the insert/update collaborator behind the import and
//! browse paths.
//!
//! The hosted backend stays out of scope; everything that writes records
//! goes through `CatalogStore`, and the bundled `MemoryCatalog` backs the
//! service and the tests. Updates key on the normalized display name, the
//! same key the reconciler partitions by.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::model::{name_key, NewPlant, PlantRecord};

/// Read and write surface of the plant dataset.
pub trait CatalogStore: Send + Sync {
    /// Snapshot of all records, in insertion order.
    fn records(&self) -> Vec<PlantRecord>;

    /// Single record by identifier.
    fn get(&self, id: &str) -> Option<PlantRecord>;

    /// Snapshot of all display names, taken in one call so the reconciler
    /// partitions against a single consistent view.
    fn names(&self) -> Vec<String>;

    /// Insert a batch of new records.
    fn insert_batch(&self, batch: &[NewPlant]) -> Result<()>;

    /// Overwrite the non-key fields of existing records, matched by
    /// normalized name. Returns the number of records touched.
    fn update_batch(&self, batch: &[NewPlant]) -> Result<usize>;
}

/// In-memory catalog with sequential identifier assignment.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    records: RwLock<Vec<PlantRecord>>,
    next_id: AtomicU64,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog pre-populated with `plants`.
    pub fn seeded(plants: Vec<NewPlant>) -> Self {
        let catalog = Self::new();
        catalog.push_all(&plants);
        catalog
    }

    fn push_all(&self, batch: &[NewPlant]) {
        let mut records = self.records.write().expect("catalog lock poisoned");
        for plant in batch {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
            records.push(plant.clone().into_record(id.to_string()));
        }
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.read().expect("catalog lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CatalogStore for MemoryCatalog {
    fn records(&self) -> Vec<PlantRecord> {
        self.records.read().expect("catalog lock poisoned").clone()
    }

    fn get(&self, id: &str) -> Option<PlantRecord> {
        self.records
            .read()
            .expect("catalog lock poisoned")
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    fn names(&self) -> Vec<String> {
        self.records
            .read()
            .expect("catalog lock poisoned")
            .iter()
            .map(|record| record.name_ar.clone())
            .collect()
    }

    fn insert_batch(&self, batch: &[NewPlant]) -> Result<()> {
        self.push_all(batch);
        Ok(())
    }

    fn update_batch(&self, batch: &[NewPlant]) -> Result<usize> {
        let mut records = self.records.write().expect("catalog lock poisoned");

        // Index records by name key once per batch
        let mut by_name: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (idx, record) in records.iter().enumerate() {
            by_name.entry(name_key(&record.name_ar)).or_default().push(idx);
        }

        let mut touched = 0;
        for plant in batch {
            let Some(positions) = by_name.get(&name_key(&plant.name_ar)) else {
                continue;
            };
            for &pos in positions {
                // Identifier and stored name are the keys; everything else
                // comes from the incoming payload.
                let id = records[pos].id.clone();
                let name = records[pos].name_ar.clone();
                let mut updated = plant.clone().into_record(id);
                updated.name_ar = name;
                records[pos] = updated;
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plant(name: &str, water_ml: u32) -> NewPlant {
        NewPlant {
            name_ar: name.to_string(),
            water_ml,
            season: "Summer".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let catalog = MemoryCatalog::new();
        catalog
            .insert_batch(&[plant("Rose", 100), plant("Tulip", 150)])
            .unwrap();
        catalog.insert_batch(&[plant("Mint", 200)]).unwrap();

        let records = catalog.records();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(catalog.get("2").unwrap().name_ar, "Tulip");
        assert!(catalog.get("99").is_none());
    }

    #[test]
    fn update_matches_by_normalized_name_and_keeps_keys() {
        let catalog = MemoryCatalog::seeded(vec![plant("Rose", 100)]);

        let touched = catalog.update_batch(&[plant(" ROSE ", 400)]).unwrap();
        assert_eq!(touched, 1);

        let updated = catalog.get("1").unwrap();
        assert_eq!(updated.id, "1");
        assert_eq!(updated.name_ar, "Rose");
        assert_eq!(updated.water_ml, 400);
    }

    #[test]
    fn update_of_unknown_name_touches_nothing() {
        let catalog = MemoryCatalog::seeded(vec![plant("Rose", 100)]);
        let touched = catalog.update_batch(&[plant("Orchid", 50)]).unwrap();
        assert_eq!(touched, 0);
        assert_eq!(catalog.get("1").unwrap().water_ml, 100);
    }
}
