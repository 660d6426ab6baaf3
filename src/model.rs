//! Plant record types shared across the catalog.
//!
//! A `PlantRecord` is one plant's attribute set as stored in the catalog;
//! `NewPlant` is the identifier-less insert payload produced by the CSV
//! sources and consumed by the store. The favorite flag is derived at the
//! view seam (see `favorites`), never stored on the record.

use serde::{Deserialize, Serialize};

/// One plant in the catalog.
///
/// `id` is unique within a dataset snapshot and assigned by the store at
/// insert time. Display names are Arabic in the source data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantRecord {
    pub id: String,
    pub name_ar: String,
    pub season: String,
    pub temperature: String,
    pub water_ml: u32,
    pub pot_size: String,
    pub soil_type: String,
    pub light_type: String,
    pub growth_requirements: String,
    pub care_instructions: String,
    pub growth_tracker: String,
    pub benefit: String,
}

/// Insert payload: a `PlantRecord` without an identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlant {
    pub name_ar: String,
    pub season: String,
    pub temperature: String,
    pub water_ml: u32,
    pub pot_size: String,
    pub soil_type: String,
    pub light_type: String,
    pub growth_requirements: String,
    pub care_instructions: String,
    pub growth_tracker: String,
    pub benefit: String,
}

impl NewPlant {
    /// Attach a store-assigned identifier.
    pub fn into_record(self, id: String) -> PlantRecord {
        PlantRecord {
            id,
            name_ar: self.name_ar,
            season: self.season,
            temperature: self.temperature,
            water_ml: self.water_ml,
            pot_size: self.pot_size,
            soil_type: self.soil_type,
            light_type: self.light_type,
            growth_requirements: self.growth_requirements,
            care_instructions: self.care_instructions,
            growth_tracker: self.growth_tracker,
            benefit: self.benefit,
        }
    }
}

/// Normalized name key used for duplicate detection and update matching.
///
/// Two names are "the same plant" iff their keys are equal: whitespace
/// trimmed, lowercased.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
