use metrics_exporter_prometheus::PrometheusHandle;
use sigma::surveillance::ciaf::CiafConfig;
use sigma::surveillance::report::{NarrativeGenerator, RuleBasedNarrator};
use sigma::surveillance::ReportingRole;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) ciaf: Arc<CiafConfig>,
    pub(crate) narrator: Arc<dyn NarrativeGenerator>,
}

impl AppState {
    pub(crate) fn new(
        readiness: Arc<AtomicBool>,
        metrics: PrometheusHandle,
        ciaf: Arc<CiafConfig>,
    ) -> Self {
        Self {
            readiness,
            metrics: Arc::new(metrics),
            ciaf,
            narrator: Arc::new(RuleBasedNarrator),
        }
    }
}

pub(crate) fn parse_role(raw: &str) -> Result<ReportingRole, String> {
    ReportingRole::parse(raw)
        .ok_or_else(|| format!("unknown role '{raw}'; expected 'facility' or 'administrator'"))
}

/// Anomalies listed in narratives and printed reports.
pub(crate) const ANOMALY_LIMIT: usize = 5;
