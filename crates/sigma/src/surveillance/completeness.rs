use super::domain::{RecordField, ReferenceUnit, ReportingRole, TransactionRecord};
use super::grouping::{GroupKey, GroupLabel, UnitKey};
use super::percentage;
use super::reference::ReferenceResolver;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct FieldCompleteness {
    pub field: RecordField,
    pub label: &'static str,
    pub filled: u64,
    pub expected: u64,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletenessRow {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility: Option<String>,
    pub rate: f64,
    pub filled: u64,
    pub expected: u64,
    pub records: u64,
    /// False when the row only exists because records failed to resolve.
    pub matched: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletenessSummary {
    pub role: ReportingRole,
    pub overall_rate: f64,
    pub filled_cells: u64,
    pub expected_cells: u64,
    pub fields: Vec<FieldCompleteness>,
    pub rows: Vec<CompletenessRow>,
}

#[derive(Debug)]
struct Tally {
    label: GroupLabel,
    filled: u64,
    expected: u64,
    records: u64,
    matched: bool,
}

/// Share of mandatory cells populated across the expected submissions.
///
/// The denominator is fixed by the reference table before any record is
/// read. Records that fail to resolve are still scored, under their raw
/// facility and village names.
pub fn calculate(
    units: &[ReferenceUnit],
    records: &[TransactionRecord],
    months_in_period: u32,
    role: ReportingRole,
    fields: &[RecordField],
) -> CompletenessSummary {
    let months = u64::from(months_in_period);
    let field_count = u64::try_from(fields.len()).unwrap_or(u64::MAX);
    let unit_count = u64::try_from(units.len()).unwrap_or(u64::MAX);
    let unit_months = unit_count.saturating_mul(months);
    let expected_cells = unit_months.saturating_mul(field_count);
    let per_unit_cells = months.saturating_mul(field_count);

    let resolver = ReferenceResolver::new(units);
    let mut groups: BTreeMap<GroupKey, Tally> = BTreeMap::new();

    for unit in units {
        let key = GroupKey::for_role(role, &UnitKey::of_unit(unit));
        let tally = groups.entry(key).or_insert_with(|| Tally {
            label: GroupLabel::for_role(role, &unit.facility, &unit.village),
            filled: 0,
            expected: 0,
            records: 0,
            matched: true,
        });
        tally.expected = tally.expected.saturating_add(per_unit_cells);
    }

    let mut filled_by_field = vec![0u64; fields.len()];
    let mut filled_cells = 0u64;

    for record in records {
        let (key, facility, village) = match resolver.resolve_record(record) {
            Some(unit) => (
                UnitKey::of_unit(unit),
                unit.facility.as_str(),
                unit.village.as_str(),
            ),
            None => (
                UnitKey::new(&record.facility, &record.village),
                record.facility.as_str(),
                record.village.as_str(),
            ),
        };

        let tally = groups
            .entry(GroupKey::for_role(role, &key))
            .or_insert_with(|| Tally {
                label: GroupLabel::for_role(role, facility, village),
                filled: 0,
                expected: 0,
                records: 0,
                matched: false,
            });
        tally.records = tally.records.saturating_add(1);

        for (slot, field) in filled_by_field.iter_mut().zip(fields) {
            if record.value(*field).is_some() {
                *slot = slot.saturating_add(1);
                tally.filled = tally.filled.saturating_add(1);
                filled_cells = filled_cells.saturating_add(1);
            }
        }
    }

    let mut field_rows: Vec<FieldCompleteness> = fields
        .iter()
        .zip(filled_by_field)
        .map(|(field, filled)| FieldCompleteness {
            field: *field,
            label: field.label(),
            filled,
            expected: unit_months,
            rate: percentage(filled as f64, unit_months as f64),
        })
        .collect();
    field_rows.sort_by(|a, b| a.rate.total_cmp(&b.rate));

    let mut rows: Vec<CompletenessRow> = groups
        .into_values()
        .map(|tally| CompletenessRow {
            name: tally.label.name,
            facility: tally.label.facility,
            rate: percentage(tally.filled as f64, tally.expected as f64),
            filled: tally.filled,
            expected: tally.expected,
            records: tally.records,
            matched: tally.matched,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.rate
            .total_cmp(&a.rate)
            .then_with(|| a.name.cmp(&b.name))
    });

    CompletenessSummary {
        role,
        overall_rate: percentage(filled_cells as f64, expected_cells as f64),
        filled_cells,
        expected_cells,
        fields: field_rows,
        rows,
    }
}
