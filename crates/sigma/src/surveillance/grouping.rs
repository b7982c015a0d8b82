use super::domain::{ReferenceUnit, ReportingRole};
use super::reference::normalize_facility;

/// Normalized (facility, village) pair identifying one village.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitKey {
    pub facility: String,
    pub village: String,
}

impl UnitKey {
    pub fn new(facility: &str, village: &str) -> Self {
        Self {
            facility: normalize_facility(facility),
            village: normalize_facility(village),
        }
    }

    pub fn of_unit(unit: &ReferenceUnit) -> Self {
        Self::new(&unit.facility, &unit.village)
    }
}

/// Breakdown row key; the one place role selects the granularity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Facility(String),
    Village(UnitKey),
}

impl GroupKey {
    pub fn for_role(role: ReportingRole, key: &UnitKey) -> Self {
        match role {
            ReportingRole::Administrator => Self::Facility(key.facility.clone()),
            ReportingRole::Facility => Self::Village(key.clone()),
        }
    }
}

/// Display names carried alongside a group while it accumulates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GroupLabel {
    pub(crate) name: String,
    pub(crate) facility: Option<String>,
}

impl GroupLabel {
    pub(crate) fn for_role(role: ReportingRole, facility: &str, village: &str) -> Self {
        match role {
            ReportingRole::Administrator => Self {
                name: facility.trim().to_string(),
                facility: None,
            },
            ReportingRole::Facility => Self {
                name: village.trim().to_string(),
                facility: Some(facility.trim().to_string()),
            },
        }
    }
}
