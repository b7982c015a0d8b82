use crate::infra::{parse_role, ANOMALY_LIMIT};
use chrono::{Datelike, Local};
use clap::Args;
use sigma::config::AppConfig;
use sigma::error::AppError;
use sigma::import::SurveillanceImporter;
use sigma::surveillance::ciaf::Triage;
use sigma::surveillance::report::{NarrativeGenerator, RuleBasedNarrator};
use sigma::surveillance::router::validate_dashboard;
use sigma::surveillance::{
    DashboardInput, DashboardReport, RecordField, ReferenceUnit, ReportingPeriod, ReportingRole,
    TransactionRecord,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Reference table CSV (village, facility, optional id)
    #[arg(long)]
    pub(crate) reference_csv: PathBuf,
    /// Monthly report CSV export
    #[arg(long)]
    pub(crate) records_csv: PathBuf,
    /// Reporting year (defaults to the current year)
    #[arg(long)]
    pub(crate) year: Option<i32>,
    /// First month of the period (1-12)
    #[arg(long, default_value_t = 1)]
    pub(crate) start_month: u32,
    /// Last month of the period (1-12)
    #[arg(long, default_value_t = 3)]
    pub(crate) end_month: u32,
    /// facility or administrator
    #[arg(long, value_parser = parse_role, default_value = "administrator")]
    pub(crate) role: ReportingRole,
    /// Print the full report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// facility or administrator
    #[arg(long, value_parser = parse_role, default_value = "administrator")]
    pub(crate) role: ReportingRole,
    /// Print the full report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        reference_csv,
        records_csv,
        year,
        start_month,
        end_month,
        role,
        json,
    } = args;

    let config = AppConfig::load()?;
    let year = year.unwrap_or_else(|| Local::now().year());
    let period = ReportingPeriod::months_of_year(year, start_month, end_month)
        .map_err(|err| AppError::InvalidRequest(err.into()))?;

    let input = DashboardInput {
        period,
        role,
        reference_units: SurveillanceImporter::reference_units_from_path(reference_csv)?,
        records: SurveillanceImporter::records_from_path(records_csv)?,
    };
    validate_dashboard(&input)?;

    let report = DashboardReport::build(&input, &config.ciaf);
    print_report(&report, json);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let input = synthetic_district(args.role);
    let report = DashboardReport::build(&input, &config.ciaf);

    if !args.json {
        println!("SIGMA demo: synthetic district, {} view", args.role.label());
    }
    print_report(&report, args.json);
    Ok(())
}

fn print_report(report: &DashboardReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Report payload unavailable: {}", err),
        }
    } else {
        render_dashboard_report(report);
    }
}

/// Two facilities over the last quarter of 2024 plus the quarter before it.
pub(crate) fn synthetic_district(role: ReportingRole) -> DashboardInput {
    // (facility, village, target, stunting share, wasting share)
    let villages: [(&str, &str, f64, f64, f64); 5] = [
        ("Puskesmas Sukamaju", "Mekar Sari", 120.0, 0.12, 0.04),
        ("Puskesmas Sukamaju", "Cibeunying", 80.0, 0.18, 0.05),
        ("Puskesmas Sukamaju", "Sukasari", 60.0, 0.22, 0.06),
        ("Puskesmas Lembang", "Jayagiri", 200.0, 0.40, 0.40),
        ("Puskesmas Lembang", "Cikole", 90.0, 0.15, 0.05),
    ];

    let reference_units = villages
        .iter()
        .enumerate()
        .map(|(index, (facility, village, ..))| {
            ReferenceUnit::new(format!("demo-{:02}", index + 1), *facility, *village)
        })
        .collect();

    let mut records = Vec::new();
    for (facility, village, target, stunting, wasting) in villages {
        for month in 7..=12u32 {
            // Cikole skipped November; Sukasari never sends height data.
            if village == "Cikole" && month == 11 {
                continue;
            }

            let improvement = if month >= 10 { 0.85 } else { 1.0 };
            let weighed = (target * (0.78 + f64::from(month) * 0.01)).floor();
            let mut record = TransactionRecord::new(facility, village, 2024, month)
                .with(RecordField::TargetPopulation, target)
                .with(RecordField::Weighed, weighed)
                .with(RecordField::WeightGained, (weighed * 0.7).floor())
                .with(RecordField::WeightNotGained, (weighed * 0.3).ceil())
                .with(RecordField::Stunted, (weighed * stunting * improvement).floor())
                .with(RecordField::Wasted, (weighed * wasting).floor())
                .with(
                    RecordField::Underweight,
                    (weighed * stunting.max(wasting) * 0.8).floor(),
                )
                .with(RecordField::Overweight, (weighed * 0.02).floor());
            if village != "Sukasari" {
                record.set(RecordField::HeightMeasured, Some((weighed * 0.95).floor()));
            }
            records.push(record);
        }
    }

    DashboardInput {
        period: ReportingPeriod {
            year: 2024,
            start_month: 10,
            months: 3,
        },
        role,
        reference_units,
        records,
    }
}

pub(crate) fn render_dashboard_report(report: &DashboardReport) {
    println!(
        "\nDashboard {} ({} view, {} reports in period; previous {})",
        report.period_label,
        report.role.label(),
        report.records_in_period,
        report.previous_period.label()
    );

    let compliance = &report.compliance;
    println!(
        "\nReporting compliance: {:.1}% ({} of {} expected reports)",
        compliance.overall_rate, compliance.submitted, compliance.target
    );
    for row in &compliance.rows {
        println!(
            "  - {}: {:.1}% ({}/{})",
            display_name(&row.name, row.facility.as_deref()),
            row.rate,
            row.submitted,
            row.target
        );
    }

    let completeness = &report.completeness;
    println!(
        "\nData completeness: {:.1}% ({} of {} mandatory cells)",
        completeness.overall_rate, completeness.filled_cells, completeness.expected_cells
    );
    for field in completeness.fields.iter().take(3) {
        println!("  - weakest field {}: {:.1}%", field.label, field.rate);
    }

    println!("\nQuarter over quarter:");
    for entry in &report.comparison {
        let marker = if entry.improved { "+" } else { "!" };
        println!(
            "  {marker} {}: {:.1}% (previous {:.1}%, change {:+.1})",
            entry.label, entry.current, entry.previous, entry.delta
        );
    }

    let ciaf = &report.ciaf;
    println!(
        "\nCIAF: {} of {} children weighed ({:.1}%) show an anthropometric failure",
        ciaf.total_failures, ciaf.population, ciaf.ciaf_rate
    );
    for category in &ciaf.distribution {
        println!(
            "  {} {}: {} ({:.1}%)",
            category.code, category.label, category.count, category.percentage
        );
    }
    println!("Village triage:");
    for village in &ciaf.villages {
        let flag = if village.triage == Triage::Referral {
            " <- referral"
        } else {
            ""
        };
        println!(
            "  - {} ({}): risk {:.1} | {}{flag}",
            village.village, village.facility, village.risk_score, village.triage_label
        );
    }

    println!("\nSummary:");
    match RuleBasedNarrator.generate(&report.narrative_context(ANOMALY_LIMIT)) {
        Ok(narrative) => {
            for paragraph in &narrative.paragraphs {
                println!("  {paragraph}");
            }
        }
        Err(err) => println!("  Narrative unavailable: {}", err),
    }
}

fn display_name(name: &str, facility: Option<&str>) -> String {
    match facility {
        Some(facility) => format!("{name} ({facility})"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigma::surveillance::ciaf::CiafConfig;
    use sigma::surveillance::indicators::Indicator;

    #[test]
    fn synthetic_district_is_valid_input() {
        let input = synthetic_district(ReportingRole::Administrator);
        assert!(validate_dashboard(&input).is_ok());
        assert_eq!(input.reference_units.len(), 5);
    }

    #[test]
    fn synthetic_district_exercises_every_calculator() {
        let report = DashboardReport::build(
            &synthetic_district(ReportingRole::Facility),
            &CiafConfig::default(),
        );

        assert_eq!(report.compliance.target, 15);
        assert_eq!(report.compliance.submitted, 14);
        assert!(report.completeness.overall_rate < 100.0);
        assert!(report.ciaf.referrals().any(|village| village.village == "Jayagiri"));
        let stunting = report
            .comparison_for(Indicator::StuntingPrevalence)
            .expect("stunting compared");
        assert!(stunting.improved);
    }
}
