//! In-memory filter engine for the kindergarten directory.
//!
//! The catalog is small and fully loaded, so filtering is a pure function of
//! `(catalog, FilterState)` recomputed on every request. All dimensions are
//! ANDed together, and the multi-select services dimension is itself an AND:
//! an entry must offer every selected service.

use serde::Deserialize;

use crate::models::kindergarten::Kindergarten;

/// Inclusive `[min, max]` bounds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RangeFilter {
    pub min: f64,
    pub max: f64,
}

impl RangeFilter {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterState {
    /// Case-insensitive substring over name, description and neighborhood.
    pub query: Option<String>,
    pub neighborhood: Option<String>,
    /// Every selected service must be offered.
    pub services: Vec<String>,
    pub monthly_fee: Option<RangeFilter>,
    /// Child age must fall inside the entry's accepted range.
    pub child_age_months: Option<i32>,
    pub has_transport: Option<bool>,
    pub open_weekends: Option<bool>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.neighborhood.is_none()
            && self.services.is_empty()
            && self.monthly_fee.is_none()
            && self.child_age_months.is_none()
            && self.has_transport.is_none()
            && self.open_weekends.is_none()
    }
}

pub fn matches(entry: &Kindergarten, filters: &FilterState) -> bool {
    if let Some(query) = &filters.query {
        let needle = query.to_lowercase();
        let haystack = format!(
            "{} {} {}",
            entry.name, entry.description, entry.neighborhood
        )
        .to_lowercase();
        if !haystack.contains(&needle) {
            return false;
        }
    }

    if let Some(neighborhood) = &filters.neighborhood {
        if !entry.neighborhood.eq_ignore_ascii_case(neighborhood) {
            return false;
        }
    }

    if !filters
        .services
        .iter()
        .all(|wanted| entry.services.iter().any(|have| have == wanted))
    {
        return false;
    }

    if let Some(range) = &filters.monthly_fee {
        if !range.contains(entry.monthly_fee) {
            return false;
        }
    }

    if let Some(age) = filters.child_age_months {
        if age < entry.min_age_months || age > entry.max_age_months {
            return false;
        }
    }

    if let Some(flag) = filters.has_transport {
        if entry.has_transport != flag {
            return false;
        }
    }

    if let Some(flag) = filters.open_weekends {
        if entry.open_weekends != flag {
            return false;
        }
    }

    true
}

pub fn apply_filters(catalog: &[Kindergarten], filters: &FilterState) -> Vec<Kindergarten> {
    catalog
        .iter()
        .filter(|entry| matches(entry, filters))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(name: &str, neighborhood: &str, fee: f64, services: &[&str]) -> Kindergarten {
        Kindergarten {
            _id: None,
            name: name.to_string(),
            description: format!("{} description", name),
            neighborhood: neighborhood.to_string(),
            monthly_fee: fee,
            min_age_months: 12,
            max_age_months: 60,
            services: services.iter().map(|s| s.to_string()).collect(),
            has_transport: services.contains(&"bus"),
            open_weekends: false,
            capacity: 40,
            phone: "0550 00 00 00".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn catalog() -> Vec<Kindergarten> {
        vec![
            entry("Les Petits Anges", "Hydra", 8000.0, &["bus", "meals"]),
            entry("Rawdat El Amel", "Bab Ezzouar", 5000.0, &["bus"]),
            entry("Sunshine Kids", "Hydra", 12000.0, &["meals", "medical"]),
        ]
    }

    #[test]
    fn empty_filter_returns_the_whole_catalog() {
        let catalog = catalog();
        let result = apply_filters(&catalog, &FilterState::default());
        assert_eq!(result.len(), catalog.len());
    }

    #[test]
    fn result_is_a_subset_matching_every_predicate() {
        let catalog = catalog();
        let filters = FilterState {
            neighborhood: Some("Hydra".to_string()),
            monthly_fee: Some(RangeFilter { min: 0.0, max: 10000.0 }),
            ..Default::default()
        };

        let result = apply_filters(&catalog, &filters);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Les Petits Anges");
        // every returned entry re-passes the predicate, nothing fabricated
        for entry in &result {
            assert!(matches(entry, &filters));
            assert!(catalog.iter().any(|original| original.name == entry.name));
        }
    }

    #[test]
    fn selected_services_are_anded_not_ored() {
        let catalog = catalog();
        let filters = FilterState {
            services: vec!["bus".to_string(), "meals".to_string()],
            ..Default::default()
        };

        let result = apply_filters(&catalog, &filters);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Les Petits Anges");
        // "Rawdat El Amel" offers only {bus} and must be excluded
        assert!(!result.iter().any(|e| e.name == "Rawdat El Amel"));
    }

    #[test]
    fn fee_range_bounds_are_inclusive() {
        let catalog = catalog();
        let filters = FilterState {
            monthly_fee: Some(RangeFilter { min: 5000.0, max: 8000.0 }),
            ..Default::default()
        };

        let result = apply_filters(&catalog, &filters);
        let names: Vec<_> = result.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Les Petits Anges", "Rawdat El Amel"]);
    }

    #[test]
    fn free_text_query_is_case_insensitive() {
        let catalog = catalog();
        let filters = FilterState {
            query: Some("sunshine".to_string()),
            ..Default::default()
        };

        let result = apply_filters(&catalog, &filters);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Sunshine Kids");
    }

    #[test]
    fn age_must_fall_in_the_accepted_range() {
        let catalog = catalog();
        let filters = FilterState {
            child_age_months: Some(6),
            ..Default::default()
        };
        assert!(apply_filters(&catalog, &filters).is_empty());

        let filters = FilterState {
            child_age_months: Some(12),
            ..Default::default()
        };
        assert_eq!(apply_filters(&catalog, &filters).len(), 3);
    }
}
