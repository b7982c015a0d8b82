use super::common::*;
use crate::surveillance::completeness;
use crate::surveillance::compliance;
use crate::surveillance::domain::{
    RecordField, ReferenceUnit, ReportingRole, MANDATORY_FIELDS,
};

#[test]
fn half_filled_record_scores_fifty_percent() {
    let units = vec![ReferenceUnit::new("1", "A", "X")];
    let records = vec![bare_record("A", "X", 1).with(RecordField::Weighed, 5.0)];
    let fields = [RecordField::Weighed, RecordField::Stunted];

    let summary =
        completeness::calculate(&units, &records, 1, ReportingRole::Administrator, &fields);

    assert_eq!(summary.expected_cells, 2);
    assert_eq!(summary.filled_cells, 1);
    assert_eq!(summary.overall_rate, 50.0);
}

#[test]
fn zero_is_a_filled_cell() {
    let units = vec![ReferenceUnit::new("1", "A", "X")];
    let records = vec![bare_record("A", "X", 1)
        .with(RecordField::Weighed, 0.0)
        .with(RecordField::Stunted, 0.0)];
    let fields = [RecordField::Weighed, RecordField::Stunted];

    let summary =
        completeness::calculate(&units, &records, 1, ReportingRole::Administrator, &fields);

    assert_eq!(summary.overall_rate, 100.0);
}

#[test]
fn overall_rate_matches_per_field_totals() {
    let units = district();
    let records = vec![
        full_record("Puskesmas Sukamaju", "Mekar Sari", 1),
        full_record("Puskesmas Sukamaju", "Mekar Sari", 2),
        bare_record("Puskesmas Sukamaju", "Cibeunying", 1).with(RecordField::Weighed, 40.0),
        bare_record("Puskesmas Lembang", "Jayagiri", 2)
            .with(RecordField::Weighed, 25.0)
            .with(RecordField::Stunted, 4.0),
    ];
    let months = 3;

    let summary = completeness::calculate(
        &units,
        &records,
        months,
        ReportingRole::Administrator,
        &MANDATORY_FIELDS,
    );

    let filled: u64 = summary.fields.iter().map(|field| field.filled).sum();
    let expected = units.len() as u64 * u64::from(months) * MANDATORY_FIELDS.len() as u64;
    assert_eq!(summary.expected_cells, expected);
    assert_eq!(filled, summary.filled_cells);
    assert_eq!(summary.overall_rate, filled as f64 / expected as f64 * 100.0);

    for field in &summary.fields {
        assert_eq!(field.expected, units.len() as u64 * u64::from(months));
    }
}

#[test]
fn field_rows_list_weakest_first() {
    let units = district();
    let records = vec![
        bare_record("Puskesmas Sukamaju", "Mekar Sari", 1)
            .with(RecordField::Weighed, 30.0)
            .with(RecordField::Stunted, 2.0),
        bare_record("Puskesmas Lembang", "Jayagiri", 1).with(RecordField::Weighed, 12.0),
    ];
    let fields = [RecordField::Weighed, RecordField::Stunted, RecordField::Wasted];

    let summary =
        completeness::calculate(&units, &records, 1, ReportingRole::Administrator, &fields);

    let order: Vec<RecordField> = summary.fields.iter().map(|field| field.field).collect();
    assert_eq!(
        order,
        vec![RecordField::Wasted, RecordField::Stunted, RecordField::Weighed]
    );
}

#[test]
fn unmatched_records_are_scored_while_compliance_drops_them() {
    let units = vec![ReferenceUnit::new("1", "Puskesmas Sukamaju", "Mekar Sari")];
    let records = vec![
        full_record("Puskesmas Sukamaju", "Mekar Sari", 1),
        full_record("Puskesmas Baru", "Sukasari", 1),
    ];

    let completeness = completeness::calculate(
        &units,
        &records,
        1,
        ReportingRole::Administrator,
        &MANDATORY_FIELDS,
    );
    let compliance = compliance::calculate(&units, &records, 1, ReportingRole::Administrator);

    assert_eq!(compliance.submitted, 1);
    assert_eq!(compliance.rows.len(), 1);

    let stray = completeness
        .rows
        .iter()
        .find(|row| row.name == "Puskesmas Baru")
        .expect("unmatched facility keeps a row");
    assert!(!stray.matched);
    assert_eq!(stray.expected, 0);
    assert_eq!(stray.filled, MANDATORY_FIELDS.len() as u64);
    assert_eq!(stray.rate, 0.0);

    // Filled cells from the stray record still count against the fixed denominator.
    assert_eq!(completeness.expected_cells, MANDATORY_FIELDS.len() as u64);
    assert_eq!(completeness.overall_rate, 200.0);
}

#[test]
fn facility_role_scores_each_village() {
    let units = district();
    let records = vec![full_record("Puskesmas Sukamaju", "Cibeunying", 1)];

    let summary = completeness::calculate(
        &units,
        &records,
        1,
        ReportingRole::Facility,
        &MANDATORY_FIELDS,
    );

    assert_eq!(summary.rows.len(), 3);
    let top = &summary.rows[0];
    assert_eq!(top.name, "Cibeunying");
    assert_eq!(top.facility.as_deref(), Some("Puskesmas Sukamaju"));
    assert_eq!(top.rate, 100.0);
    assert!(summary.rows[1..].iter().all(|row| row.rate == 0.0));
}

#[test]
fn long_periods_widen_cell_counts_instead_of_wrapping() {
    let units = district();
    let summary = completeness::calculate(
        &units,
        &[],
        u32::MAX,
        ReportingRole::Administrator,
        &MANDATORY_FIELDS,
    );

    let expected = 3 * u64::from(u32::MAX) * MANDATORY_FIELDS.len() as u64;
    assert_eq!(summary.expected_cells, expected);
    assert!(summary
        .fields
        .iter()
        .all(|field| field.expected == 3 * u64::from(u32::MAX)));
}
