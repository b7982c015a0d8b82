mod anomalies;
mod narrative;

pub use anomalies::{collect_anomalies, Anomaly, AnomalyKind};
pub use narrative::{
    Narrative, NarrativeContext, NarrativeError, NarrativeGenerator, NarrativeTotals,
    RuleBasedNarrator,
};

use super::ciaf::{self, CiafAnalysis, CiafConfig};
use super::compliance::{self, ComplianceSummary};
use super::completeness::{self, CompletenessSummary};
use super::domain::{
    ReferenceUnit, ReportingPeriod, ReportingRole, TransactionRecord, MANDATORY_FIELDS,
};
use super::growth::{self, GroupIndicatorRow, IndicatorComparison};
use super::indicators::Indicator;
use super::trend::{self, TrendPoint};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything the dashboard needs for one role and period.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardInput {
    pub period: ReportingPeriod,
    #[serde(default)]
    pub role: ReportingRole,
    pub reference_units: Vec<ReferenceUnit>,
    /// May span more than the period; the previous period and the year trend
    /// are cut from the same set.
    pub records: Vec<TransactionRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub period: ReportingPeriod,
    pub period_label: String,
    pub previous_period: ReportingPeriod,
    pub role: ReportingRole,
    pub records_in_period: usize,
    pub compliance: ComplianceSummary,
    pub completeness: CompletenessSummary,
    pub comparison: Vec<IndicatorComparison>,
    pub trend: Vec<TrendPoint>,
    pub groups: Vec<GroupIndicatorRow>,
    pub ciaf: CiafAnalysis,
}

impl DashboardReport {
    pub fn build(input: &DashboardInput, config: &CiafConfig) -> Self {
        let period = input.period;
        let previous_period = period.previous();
        let current = period.filter(&input.records);
        let previous = previous_period.filter(&input.records);

        let compliance = compliance::calculate(
            &input.reference_units,
            &current,
            period.months,
            input.role,
        );
        let completeness = completeness::calculate(
            &input.reference_units,
            &current,
            period.months,
            input.role,
            &MANDATORY_FIELDS,
        );
        let comparison =
            growth::compare_periods(&current, period.months, &previous, previous_period.months);
        let trend = trend::monthly_series(&input.records, period.year);
        let groups = growth::group_summary(&current, input.role);
        let ciaf = ciaf::analyze(&current, config);

        info!(
            period = %period.label(),
            role = input.role.label(),
            records = current.len(),
            units = input.reference_units.len(),
            "dashboard report built"
        );

        Self {
            period,
            period_label: period.label(),
            previous_period,
            role: input.role,
            records_in_period: current.len(),
            compliance,
            completeness,
            comparison,
            trend,
            groups,
            ciaf,
        }
    }

    pub fn comparison_for(&self, indicator: Indicator) -> Option<&IndicatorComparison> {
        self.comparison
            .iter()
            .find(|entry| entry.indicator == indicator)
    }

    /// Totals and worst units, shaped for a narrative generator.
    pub fn narrative_context(&self, anomaly_limit: usize) -> NarrativeContext {
        let prevalence = |indicator| {
            self.comparison_for(indicator)
                .map(|entry| entry.current)
                .unwrap_or(0.0)
        };

        NarrativeContext {
            period_label: self.period_label.clone(),
            role: self.role,
            totals: NarrativeTotals {
                compliance_rate: self.compliance.overall_rate,
                completeness_rate: self.completeness.overall_rate,
                ciaf_rate: self.ciaf.ciaf_rate,
                population: self.ciaf.population,
                total_failures: self.ciaf.total_failures,
                stunting_prevalence: prevalence(Indicator::StuntingPrevalence),
                wasting_prevalence: prevalence(Indicator::WastingPrevalence),
                underweight_prevalence: prevalence(Indicator::UnderweightPrevalence),
            },
            anomalies: collect_anomalies(self, anomaly_limit),
        }
    }
}
