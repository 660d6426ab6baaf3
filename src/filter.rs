//! Plant filter evaluation.
//!
//! One optional constraint per filterable attribute. An empty or absent
//! value places no constraint on that attribute, so the all-empty filter set
//! accepts every record. Categorical attributes (pot size, soil type, light
//! type, season) match exactly; temperature matches by substring so a bound
//! like "13" selects the "13–19" range; benefit matches by case-insensitive
//! substring.

use serde::Deserialize;

use crate::model::PlantRecord;

/// Filter set over catalog records.
///
/// Deserializes directly from query strings, where an omitted parameter and
/// an empty `?season=` both mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlantFilters {
    pub pot_size: Option<String>,
    pub soil_type: Option<String>,
    pub light_type: Option<String>,
    pub temperature: Option<String>,
    pub season: Option<String>,
    pub benefit: Option<String>,
}

/// Treat `None` and whitespace-only values as "no constraint".
fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl PlantFilters {
    /// True when no attribute is constrained (the identity filter).
    pub fn is_empty(&self) -> bool {
        active(&self.pot_size).is_none()
            && active(&self.soil_type).is_none()
            && active(&self.light_type).is_none()
            && active(&self.temperature).is_none()
            && active(&self.season).is_none()
            && active(&self.benefit).is_none()
    }

    /// True iff the record satisfies every constrained attribute.
    ///
    /// A record whose attribute is empty never matches a set constraint;
    /// there is no error path for missing fields.
    pub fn matches(&self, plant: &PlantRecord) -> bool {
        if let Some(pot) = active(&self.pot_size) {
            if plant.pot_size != pot {
                return false;
            }
        }
        if let Some(soil) = active(&self.soil_type) {
            if plant.soil_type != soil {
                return false;
            }
        }
        if let Some(light) = active(&self.light_type) {
            if plant.light_type != light {
                return false;
            }
        }
        if let Some(season) = active(&self.season) {
            if plant.season != season {
                return false;
            }
        }
        if let Some(temp) = active(&self.temperature) {
            if !plant.temperature.contains(temp) {
                return false;
            }
        }
        if let Some(benefit) = active(&self.benefit) {
            if !plant
                .benefit
                .to_lowercase()
                .contains(&benefit.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewPlant;

    fn sample() -> PlantRecord {
        NewPlant {
            name_ar: "الريحان".to_string(),
            season: "Summer".to_string(),
            temperature: "17–26".to_string(),
            water_ml: 250,
            pot_size: "small".to_string(),
            soil_type: "Loamy".to_string(),
            light_type: "Full sun".to_string(),
            benefit: "Aromatic herb".to_string(),
            ..Default::default()
        }
        .into_record("1".to_string())
    }

    #[test]
    fn empty_filters_match_every_record() {
        let filters = PlantFilters::default();
        assert!(filters.is_empty());
        assert!(filters.matches(&sample()));

        // Whitespace-only values are also "no constraint"
        let filters = PlantFilters {
            season: Some("  ".to_string()),
            pot_size: Some(String::new()),
            ..Default::default()
        };
        assert!(filters.is_empty());
        assert!(filters.matches(&sample()));
    }

    #[test]
    fn agreeing_filters_match() {
        let filters = PlantFilters {
            pot_size: Some("small".to_string()),
            soil_type: Some("Loamy".to_string()),
            light_type: Some("Full sun".to_string()),
            season: Some("Summer".to_string()),
            temperature: Some("17".to_string()),
            benefit: None,
        };
        assert!(filters.matches(&sample()));
    }

    #[test]
    fn any_disagreeing_attribute_rejects() {
        let matching = PlantFilters {
            pot_size: Some("small".to_string()),
            season: Some("Summer".to_string()),
            ..Default::default()
        };
        assert!(matching.matches(&sample()));

        let mut wrong_pot = matching.clone();
        wrong_pot.pot_size = Some("large".to_string());
        assert!(!wrong_pot.matches(&sample()));

        let mut wrong_season = matching;
        wrong_season.season = Some("Winter".to_string());
        assert!(!wrong_season.matches(&sample()));
    }

    #[test]
    fn temperature_matches_by_substring() {
        let filters = PlantFilters {
            temperature: Some("17".to_string()),
            ..Default::default()
        };
        assert!(filters.matches(&sample()));

        let filters = PlantFilters {
            temperature: Some("13".to_string()),
            ..Default::default()
        };
        assert!(!filters.matches(&sample()));
    }

    #[test]
    fn benefit_matches_case_insensitive_substring() {
        let filters = PlantFilters {
            benefit: Some("aromatic".to_string()),
            ..Default::default()
        };
        assert!(filters.matches(&sample()));

        let filters = PlantFilters {
            benefit: Some("Air purifying".to_string()),
            ..Default::default()
        };
        assert!(!filters.matches(&sample()));
    }

    #[test]
    fn absent_record_attribute_never_matches_a_set_filter() {
        let mut bare = sample();
        bare.season = String::new();

        let filters = PlantFilters {
            season: Some("Summer".to_string()),
            ..Default::default()
        };
        assert!(!filters.matches(&bare));
    }
}
