use super::DashboardReport;
use crate::surveillance::ciaf::Triage;
use serde::Serialize;

const LOW_COMPLIANCE_PCT: f64 = 80.0;
const LOW_COMPLETENESS_PCT: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    CiafReferral,
    LowCompliance,
    LowCompleteness,
}

impl AnomalyKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CiafReferral => "Multiple anthropometric failure (risk score)",
            Self::LowCompliance => "Low reporting compliance (%)",
            Self::LowCompleteness => "Incomplete data entry (%)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub facility: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    pub kind: AnomalyKind,
    pub issue: &'static str,
    pub value: f64,
}

/// Worst units across the report, most severe kind first.
///
/// Referrals are ordered by descending risk score; compliance and
/// completeness gaps by ascending rate.
pub fn collect_anomalies(report: &DashboardReport, limit: usize) -> Vec<Anomaly> {
    let mut anomalies: Vec<Anomaly> = report
        .ciaf
        .villages
        .iter()
        .filter(|village| village.triage == Triage::Referral)
        .map(|village| Anomaly {
            facility: village.facility.clone(),
            village: Some(village.village.clone()),
            kind: AnomalyKind::CiafReferral,
            issue: AnomalyKind::CiafReferral.label(),
            value: village.risk_score,
        })
        .collect();

    anomalies.extend(
        report
            .compliance
            .rows
            .iter()
            .filter(|row| row.target > 0 && row.rate < LOW_COMPLIANCE_PCT)
            .map(|row| {
                row_anomaly(
                    &row.name,
                    row.facility.as_deref(),
                    AnomalyKind::LowCompliance,
                    row.rate,
                )
            }),
    );

    anomalies.extend(
        report
            .completeness
            .rows
            .iter()
            .filter(|row| row.expected > 0 && row.rate < LOW_COMPLETENESS_PCT)
            .map(|row| {
                row_anomaly(
                    &row.name,
                    row.facility.as_deref(),
                    AnomalyKind::LowCompleteness,
                    row.rate,
                )
            }),
    );

    anomalies.sort_by(|a, b| {
        a.kind.cmp(&b.kind).then_with(|| match a.kind {
            AnomalyKind::CiafReferral => b.value.total_cmp(&a.value),
            AnomalyKind::LowCompliance | AnomalyKind::LowCompleteness => {
                a.value.total_cmp(&b.value)
            }
        })
    });
    anomalies.truncate(limit);
    anomalies
}

fn row_anomaly(name: &str, facility: Option<&str>, kind: AnomalyKind, value: f64) -> Anomaly {
    match facility {
        Some(facility) => Anomaly {
            facility: facility.to_string(),
            village: Some(name.to_string()),
            kind,
            issue: kind.label(),
            value,
        },
        None => Anomaly {
            facility: name.to_string(),
            village: None,
            kind,
            issue: kind.label(),
            value,
        },
    }
}
