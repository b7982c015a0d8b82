use super::domain::{ReferenceUnit, TransactionRecord};
use super::grouping::UnitKey;
use std::collections::HashMap;
use tracing::debug;

/// Uppercase, trim, and collapse internal whitespace.
pub fn normalize_facility(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_uppercase()
}

/// Stricter key used to join map features: uppercase alphanumerics only.
pub fn normalize_feature_name(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Exact-match index over the canonical reference table.
///
/// When the table holds duplicates for a key, the first unit wins.
#[derive(Debug)]
pub struct ReferenceResolver<'a> {
    units: HashMap<UnitKey, &'a ReferenceUnit>,
    facilities: HashMap<String, &'a str>,
    features: HashMap<String, &'a ReferenceUnit>,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(units: &'a [ReferenceUnit]) -> Self {
        let mut index = HashMap::with_capacity(units.len());
        let mut facilities = HashMap::new();
        let mut features = HashMap::new();

        for unit in units {
            index.entry(UnitKey::of_unit(unit)).or_insert(unit);
            facilities
                .entry(normalize_facility(&unit.facility))
                .or_insert(unit.facility.as_str());
            features
                .entry(normalize_feature_name(&unit.village))
                .or_insert(unit);
        }

        Self {
            units: index,
            facilities,
            features,
        }
    }

    pub fn resolve(&self, facility: &str, village: &str) -> Option<&'a ReferenceUnit> {
        self.units.get(&UnitKey::new(facility, village)).copied()
    }

    pub fn resolve_record(&self, record: &TransactionRecord) -> Option<&'a ReferenceUnit> {
        let resolved = self.resolve(&record.facility, &record.village);
        if resolved.is_none() {
            debug!(
                facility = %record.facility,
                village = %record.village,
                year = record.year,
                month = record.month,
                "record did not match a reference unit"
            );
        }
        resolved
    }

    /// Match a map feature (GeoJSON village name) to a reference unit.
    pub fn resolve_feature(&self, feature_name: &str) -> Option<&'a ReferenceUnit> {
        self.features
            .get(&normalize_feature_name(feature_name))
            .copied()
    }

    /// Canonical spelling of a facility name, if the table knows it.
    pub fn facility_name(&self, facility: &str) -> Option<&'a str> {
        self.facilities.get(&normalize_facility(facility)).copied()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
