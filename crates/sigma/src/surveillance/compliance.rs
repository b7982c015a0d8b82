use super::domain::{ReferenceUnit, ReportingRole, TransactionRecord};
use super::grouping::{GroupKey, GroupLabel, UnitKey};
use super::percentage;
use super::reference::ReferenceResolver;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceRow {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility: Option<String>,
    pub rate: f64,
    pub submitted: u64,
    pub target: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub village_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceSummary {
    pub role: ReportingRole,
    pub overall_rate: f64,
    pub submitted: u64,
    pub target: u64,
    pub rows: Vec<ComplianceRow>,
}

#[derive(Debug)]
struct Tally {
    label: GroupLabel,
    submitted: u64,
    target: u64,
    villages: u64,
}

/// Share of expected monthly submissions actually received.
///
/// Every reference unit is expected once per month of the period, whether or
/// not it reported. Records that do not resolve to a unit are dropped.
pub fn calculate(
    units: &[ReferenceUnit],
    records: &[TransactionRecord],
    months_in_period: u32,
    role: ReportingRole,
) -> ComplianceSummary {
    let resolver = ReferenceResolver::new(units);
    let mut groups: BTreeMap<GroupKey, Tally> = BTreeMap::new();
    let months = u64::from(months_in_period);
    let mut target = 0u64;
    let mut submitted = 0u64;

    for unit in units {
        let key = GroupKey::for_role(role, &UnitKey::of_unit(unit));
        let tally = groups.entry(key).or_insert_with(|| Tally {
            label: GroupLabel::for_role(role, &unit.facility, &unit.village),
            submitted: 0,
            target: 0,
            villages: 0,
        });
        tally.target = tally.target.saturating_add(months);
        tally.villages = tally.villages.saturating_add(1);
        target = target.saturating_add(months);
    }

    for record in records {
        let Some(unit) = resolver.resolve_record(record) else {
            continue;
        };

        let key = GroupKey::for_role(role, &UnitKey::of_unit(unit));
        if let Some(tally) = groups.get_mut(&key) {
            tally.submitted = tally.submitted.saturating_add(1);
            submitted = submitted.saturating_add(1);
        }
    }

    let mut rows: Vec<ComplianceRow> = groups
        .into_values()
        .map(|tally| ComplianceRow {
            name: tally.label.name,
            facility: tally.label.facility,
            rate: percentage(tally.submitted as f64, tally.target as f64),
            submitted: tally.submitted,
            target: tally.target,
            village_count: match role {
                ReportingRole::Administrator => Some(tally.villages),
                ReportingRole::Facility => None,
            },
        })
        .collect();

    rows.sort_by(|a, b| {
        b.rate
            .total_cmp(&a.rate)
            .then_with(|| a.name.cmp(&b.name))
    });

    ComplianceSummary {
        role,
        overall_rate: percentage(submitted as f64, target as f64),
        submitted,
        target,
        rows,
    }
}
