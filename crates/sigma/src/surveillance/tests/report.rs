use super::common::*;
use crate::surveillance::ciaf::{CiafConfig, Triage};
use crate::surveillance::domain::{
    RecordField, ReportingPeriod, ReportingRole, TransactionRecord,
};
use crate::surveillance::report::{
    collect_anomalies, AnomalyKind, DashboardInput, DashboardReport, NarrativeError,
    NarrativeGenerator, RuleBasedNarrator,
};

fn quarter_input() -> DashboardInput {
    let mut previous_quarter = full_record("Puskesmas Sukamaju", "Mekar Sari", 12);
    previous_quarter.year = 2023;

    let records = vec![
        full_record("Puskesmas Sukamaju", "Mekar Sari", 1),
        full_record("Puskesmas Sukamaju", "Mekar Sari", 2),
        full_record("Puskesmas Sukamaju", "Mekar Sari", 3),
        bare_record("Puskesmas Sukamaju", "Cibeunying", 1).with(RecordField::Weighed, 40.0),
        TransactionRecord::new("Puskesmas Lembang", "Jayagiri", 2024, 2)
            .with(RecordField::Weighed, 300.0)
            .with(RecordField::Stunted, 200.0)
            .with(RecordField::Wasted, 200.0)
            .with(RecordField::Underweight, 200.0),
        previous_quarter,
    ];

    DashboardInput {
        period: ReportingPeriod::months_of_year(2024, 1, 3).expect("valid quarter"),
        role: ReportingRole::Administrator,
        reference_units: district(),
        records,
    }
}

#[test]
fn dashboard_cuts_current_and_previous_periods() {
    let report = DashboardReport::build(&quarter_input(), &CiafConfig::default());

    assert_eq!(report.period_label, "2024-01..2024-03");
    assert_eq!(report.previous_period.label(), "2023-10..2023-12");
    assert_eq!(report.records_in_period, 5);
    assert_eq!(report.compliance.target, 9);
    assert_eq!(report.compliance.submitted, 5);
    assert_eq!(report.trend.len(), 12);
    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.ciaf.population, 300 + 40 + 300);
    assert_eq!(report.ciaf.referrals().count(), 1);
}

#[test]
fn anomalies_put_referrals_before_reporting_gaps() {
    let report = DashboardReport::build(&quarter_input(), &CiafConfig::default());

    let anomalies = collect_anomalies(&report, 10);

    let first = &anomalies[0];
    assert_eq!(first.kind, AnomalyKind::CiafReferral);
    assert_eq!(first.village.as_deref(), Some("Jayagiri"));
    assert_eq!(first.facility, "Puskesmas Lembang");

    let compliance: Vec<&str> = anomalies
        .iter()
        .filter(|anomaly| anomaly.kind == AnomalyKind::LowCompliance)
        .map(|anomaly| anomaly.facility.as_str())
        .collect();
    assert_eq!(compliance, vec!["Puskesmas Lembang", "Puskesmas Sukamaju"]);

    let kinds: Vec<AnomalyKind> = anomalies.iter().map(|anomaly| anomaly.kind).collect();
    let mut sorted = kinds.clone();
    sorted.sort();
    assert_eq!(kinds, sorted);

    assert_eq!(collect_anomalies(&report, 2).len(), 2);
}

#[test]
fn rule_based_narrative_names_referral_villages() {
    let report = DashboardReport::build(&quarter_input(), &CiafConfig::default());
    let context = report.narrative_context(5);

    let narrative = RuleBasedNarrator
        .generate(&context)
        .expect("narrative generated");

    assert_eq!(narrative.generator, "rule_based");
    let text = narrative.text();
    assert!(text.contains("2024-01..2024-03"));
    assert!(text.contains("Priority referral is recommended for 1 unit: Jayagiri (Puskesmas Lembang)"));
    assert!(text.contains("Reporting follow-up needed"));
}

#[test]
fn narrative_requires_some_data() {
    let input = DashboardInput {
        period: ReportingPeriod::new(2024, 6, 1).expect("valid month"),
        role: ReportingRole::Facility,
        reference_units: Vec::new(),
        records: Vec::new(),
    };
    let report = DashboardReport::build(&input, &CiafConfig::default());

    let error = RuleBasedNarrator
        .generate(&report.narrative_context(5))
        .expect_err("nothing to summarise");

    assert_eq!(
        error,
        NarrativeError::InsufficientData {
            period: "2024-06".to_string()
        }
    );
}

#[test]
fn custom_config_changes_triage() {
    let strict = CiafConfig {
        outreach_rate_pct: 1.0,
        ..CiafConfig::default()
    };

    let report = DashboardReport::build(&quarter_input(), &strict);

    let mekar_sari = report
        .ciaf
        .villages
        .iter()
        .find(|village| village.village == "Mekar Sari")
        .expect("village present");
    assert_eq!(mekar_sari.triage, Triage::Outreach);
}
