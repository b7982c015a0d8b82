use sigma::import::{ImportError, SurveillanceImporter};
use sigma::surveillance::ciaf::{CiafConfig, Triage};
use sigma::surveillance::{
    DashboardInput, DashboardReport, RecordField, ReportingPeriod, ReportingRole,
};

fn district() -> DashboardInput {
    let reference_data = include_bytes!("../data/reference_units.csv");
    let report_data = include_bytes!("../data/monthly_reports.csv");
    let reference_units = SurveillanceImporter::reference_units_from_reader(&reference_data[..])
        .expect("reference table imports");
    let records = SurveillanceImporter::records_from_reader(&report_data[..])
        .expect("monthly reports import");

    DashboardInput {
        period: ReportingPeriod::months_of_year(2024, 1, 3).expect("valid quarter"),
        role: ReportingRole::Administrator,
        reference_units,
        records,
    }
}

#[test]
fn imports_reference_table_with_source_ids() {
    let input = district();

    assert_eq!(input.reference_units.len(), 5);
    assert_eq!(input.reference_units[0].id, "3204010001");
    assert_eq!(input.reference_units[3].facility, "Puskesmas Lembang");
}

#[test]
fn empty_cells_stay_absent() {
    let input = district();
    let partial = input
        .records
        .iter()
        .find(|record| record.village == "Cibeunying" && record.month == 2)
        .expect("february report present");

    assert_eq!(partial.value(RecordField::Weighed), Some(66.0));
    assert_eq!(partial.value(RecordField::WeightGained), None);
    assert_eq!(partial.value(RecordField::Overweight), None);
}

#[test]
fn imported_district_builds_quarterly_dashboard() {
    let report = DashboardReport::build(&district(), &CiafConfig::default());

    assert_eq!(report.records_in_period, 10);
    assert_eq!(report.compliance.target, 15);
    assert_eq!(report.compliance.submitted, 9);
    assert_eq!(report.compliance.overall_rate, 60.0);

    assert_eq!(report.completeness.expected_cells, 135);
    assert_eq!(report.completeness.filled_cells, 85);
    assert!(report
        .completeness
        .rows
        .iter()
        .any(|row| row.name == "PKM Lembang" && !row.matched));

    let top = &report.ciaf.villages[0];
    assert_eq!(top.village, "Jayagiri");
    assert_eq!(top.groups.triple_failure, 11);
    assert_eq!(top.groups.wasting_underweight, 51);
    assert_eq!(top.triage, Triage::IntensiveFeeding);
}

#[test]
fn reads_fixtures_from_disk() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/monthly_reports.csv");
    let records = SurveillanceImporter::records_from_path(path).expect("fixture readable");
    assert_eq!(records.len(), 12);
}

#[test]
fn malformed_rows_surface_csv_errors() {
    let csv = "desa,puskesmas,bulan,tahun\nMekar Sari,Puskesmas Sukamaju,maret,2024\n";

    let error = SurveillanceImporter::records_from_reader(csv.as_bytes())
        .expect_err("month must be numeric");

    assert!(matches!(error, ImportError::Csv(_)));
}
