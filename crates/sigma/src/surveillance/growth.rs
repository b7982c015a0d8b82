use super::domain::{ReportingRole, TransactionRecord};
use super::grouping::{GroupKey, GroupLabel, UnitKey};
use super::indicators::{Direction, FieldTotals, Indicator, IndicatorValue};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorComparison {
    pub indicator: Indicator,
    pub label: &'static str,
    pub direction: Direction,
    pub current: f64,
    pub previous: f64,
    pub delta: f64,
    pub improved: bool,
}

/// Current-vs-previous value of every indicator.
///
/// Each period's raw sums are averaged over that period's month count before
/// the ratio is taken.
pub fn compare_periods(
    current: &[TransactionRecord],
    current_months: u32,
    previous: &[TransactionRecord],
    previous_months: u32,
) -> Vec<IndicatorComparison> {
    let current_totals = FieldTotals::from_records(current);
    let previous_totals = FieldTotals::from_records(previous);

    Indicator::ordered()
        .into_iter()
        .map(|indicator| {
            let current = current_totals.averaged_ratio(indicator, current_months);
            let previous = previous_totals.averaged_ratio(indicator, previous_months);
            let delta = current - previous;
            let improved = match indicator.direction() {
                Direction::HigherIsBetter => delta >= 0.0,
                Direction::LowerIsBetter => delta <= 0.0,
            };

            IndicatorComparison {
                indicator,
                label: indicator.label(),
                direction: indicator.direction(),
                current,
                previous,
                delta,
                improved,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupIndicatorRow {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility: Option<String>,
    pub records: u32,
    pub values: Vec<IndicatorValue>,
}

impl GroupIndicatorRow {
    pub fn value(&self, indicator: Indicator) -> Option<f64> {
        self.values
            .iter()
            .find(|entry| entry.indicator == indicator)
            .map(|entry| entry.value)
    }
}

/// Summary table: facilities for administrators, villages for facility staff.
pub fn group_summary(records: &[TransactionRecord], role: ReportingRole) -> Vec<GroupIndicatorRow> {
    let mut groups: BTreeMap<GroupKey, (GroupLabel, FieldTotals)> = BTreeMap::new();

    for record in records {
        let key = GroupKey::for_role(role, &UnitKey::new(&record.facility, &record.village));
        let (_, totals) = groups.entry(key).or_insert_with(|| {
            (
                GroupLabel::for_role(role, &record.facility, &record.village),
                FieldTotals::default(),
            )
        });
        totals.add(record);
    }

    groups
        .into_values()
        .map(|(label, totals)| GroupIndicatorRow {
            name: label.name,
            facility: label.facility,
            records: totals.records(),
            values: totals.indicator_values(),
        })
        .collect()
}
