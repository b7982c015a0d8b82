use super::anomalies::{Anomaly, AnomalyKind};
use crate::surveillance::domain::ReportingRole;
use serde::Serialize;
use std::fmt::Debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeTotals {
    pub compliance_rate: f64,
    pub completeness_rate: f64,
    pub ciaf_rate: f64,
    pub population: u64,
    pub total_failures: u64,
    pub stunting_prevalence: f64,
    pub wasting_prevalence: f64,
    pub underweight_prevalence: f64,
}

/// Input handed to a narrative generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeContext {
    pub period_label: String,
    pub role: ReportingRole,
    pub totals: NarrativeTotals,
    pub anomalies: Vec<Anomaly>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narrative {
    pub generator: &'static str,
    pub paragraphs: Vec<String>,
}

impl Narrative {
    pub fn text(&self) -> String {
        self.paragraphs.join("\n\n")
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NarrativeError {
    #[error("not enough data to summarise {period}")]
    InsufficientData { period: String },
}

/// Boundary for summary writers, hosted model or in-process.
pub trait NarrativeGenerator: Debug + Send + Sync {
    fn generate(&self, context: &NarrativeContext) -> Result<Narrative, NarrativeError>;
}

/// Deterministic writer used when no hosted model is wired in.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedNarrator;

impl NarrativeGenerator for RuleBasedNarrator {
    fn generate(&self, context: &NarrativeContext) -> Result<Narrative, NarrativeError> {
        let totals = &context.totals;
        if totals.population == 0 && totals.compliance_rate == 0.0 && context.anomalies.is_empty()
        {
            return Err(NarrativeError::InsufficientData {
                period: context.period_label.clone(),
            });
        }

        let mut paragraphs = Vec::new();

        let scope = match context.role {
            ReportingRole::Administrator => "across the district's facilities",
            ReportingRole::Facility => "across the facility's villages",
        };
        paragraphs.push(format!(
            "For {}, {:.1}% of expected monthly reports were received {scope} and {:.1}% of mandatory fields were filled.",
            context.period_label, totals.compliance_rate, totals.completeness_rate
        ));

        if totals.population > 0 {
            paragraphs.push(format!(
                "Of {} children weighed, an estimated {} ({:.1}%) show at least one anthropometric failure. Stunting stands at {:.1}%, wasting at {:.1}%, and underweight at {:.1}%.",
                totals.population,
                totals.total_failures,
                totals.ciaf_rate,
                totals.stunting_prevalence,
                totals.wasting_prevalence,
                totals.underweight_prevalence
            ));
        }

        let referrals: Vec<&Anomaly> = context
            .anomalies
            .iter()
            .filter(|anomaly| anomaly.kind == AnomalyKind::CiafReferral)
            .collect();
        if !referrals.is_empty() {
            let names = referrals
                .iter()
                .map(|anomaly| describe(anomaly))
                .collect::<Vec<_>>()
                .join(", ");
            paragraphs.push(format!(
                "Priority referral is recommended for {} unit{}: {names}.",
                referrals.len(),
                if referrals.len() == 1 { "" } else { "s" }
            ));
        }

        let reporting_gaps: Vec<String> = context
            .anomalies
            .iter()
            .filter(|anomaly| anomaly.kind != AnomalyKind::CiafReferral)
            .map(|anomaly| {
                format!(
                    "{} ({}: {:.1})",
                    describe(anomaly),
                    anomaly.issue,
                    anomaly.value
                )
            })
            .collect();
        if !reporting_gaps.is_empty() {
            paragraphs.push(format!(
                "Reporting follow-up needed: {}.",
                reporting_gaps.join("; ")
            ));
        }

        if context.anomalies.is_empty() {
            paragraphs.push(
                "No units crossed the alert thresholds; maintain routine monitoring.".to_string(),
            );
        }

        Ok(Narrative {
            generator: "rule_based",
            paragraphs,
        })
    }
}

fn describe(anomaly: &Anomaly) -> String {
    match &anomaly.village {
        Some(village) => format!("{village} ({})", anomaly.facility),
        None => anomaly.facility.clone(),
    }
}
