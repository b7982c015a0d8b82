use crate::infra::{AppState, ANOMALY_LIMIT};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sigma::error::AppError;
use sigma::import::SurveillanceImporter;
use sigma::surveillance::ciaf::CiafConfig;
use sigma::surveillance::report::{Narrative, NarrativeGenerator};
use sigma::surveillance::router::validate_dashboard;
use sigma::surveillance::{
    analytics_router, DashboardInput, DashboardReport, ReferenceUnit, ReportingPeriod,
    ReportingRole, TransactionRecord,
};
use std::io::Cursor;
use std::sync::Arc;
use tracing::warn;

/// Dashboard request; CSV exports take precedence over inline JSON rows.
#[derive(Debug, Deserialize)]
pub(crate) struct DashboardReportRequest {
    pub(crate) period: ReportingPeriod,
    #[serde(default)]
    pub(crate) role: ReportingRole,
    #[serde(default)]
    pub(crate) reference_units: Vec<ReferenceUnit>,
    #[serde(default)]
    pub(crate) records: Vec<TransactionRecord>,
    #[serde(default)]
    pub(crate) reference_csv: Option<String>,
    #[serde(default)]
    pub(crate) records_csv: Option<String>,
    #[serde(default)]
    pub(crate) include_narrative: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardReportResponse {
    pub(crate) data_source: DashboardDataSource,
    #[serde(flatten)]
    pub(crate) report: DashboardReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) narrative: Option<Narrative>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) narrative_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum DashboardDataSource {
    Json,
    Csv,
}

pub(crate) fn with_dashboard_routes(ciaf: Arc<CiafConfig>) -> axum::Router {
    analytics_router(ciaf)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/dashboard/report",
            axum::routing::post(dashboard_report_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn dashboard_report_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<DashboardReportRequest>,
) -> Result<Json<DashboardReportResponse>, AppError> {
    let DashboardReportRequest {
        period,
        role,
        reference_units,
        records,
        reference_csv,
        records_csv,
        include_narrative,
    } = payload;

    let mut data_source = DashboardDataSource::Json;
    let reference_units = match reference_csv {
        Some(csv) => {
            data_source = DashboardDataSource::Csv;
            SurveillanceImporter::reference_units_from_reader(Cursor::new(csv.into_bytes()))?
        }
        None => reference_units,
    };
    let records = match records_csv {
        Some(csv) => {
            data_source = DashboardDataSource::Csv;
            SurveillanceImporter::records_from_reader(Cursor::new(csv.into_bytes()))?
        }
        None => records,
    };

    let input = DashboardInput {
        period,
        role,
        reference_units,
        records,
    };
    validate_dashboard(&input)?;

    let report = DashboardReport::build(&input, &state.ciaf);

    let (narrative, narrative_error) = if include_narrative {
        match state.narrator.generate(&report.narrative_context(ANOMALY_LIMIT)) {
            Ok(narrative) => (Some(narrative), None),
            Err(err) => {
                warn!(error = %err, period = %report.period_label, "narrative unavailable");
                (None, Some(err.to_string()))
            }
        }
    } else {
        (None, None)
    };

    Ok(Json(DashboardReportResponse {
        data_source,
        report,
        narrative,
        narrative_error,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use sigma::surveillance::report::NarrativeError;
    use sigma::surveillance::RecordField;
    use std::sync::atomic::AtomicBool;

    fn test_state() -> AppState {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        AppState::new(
            Arc::new(AtomicBool::new(true)),
            handle,
            Arc::new(CiafConfig::default()),
        )
    }

    fn quarter() -> ReportingPeriod {
        ReportingPeriod::months_of_year(2024, 1, 3).expect("valid quarter")
    }

    fn request() -> DashboardReportRequest {
        DashboardReportRequest {
            period: quarter(),
            role: ReportingRole::Administrator,
            reference_units: vec![ReferenceUnit::new("1", "Puskesmas Sukamaju", "Mekar Sari")],
            records: vec![TransactionRecord::new("Puskesmas Sukamaju", "Mekar Sari", 2024, 2)
                .with(RecordField::Weighed, 90.0)
                .with(RecordField::Stunted, 12.0)],
            reference_csv: None,
            records_csv: None,
            include_narrative: false,
        }
    }

    #[tokio::test]
    async fn dashboard_endpoint_builds_report_from_json_rows() {
        let Json(body) = dashboard_report_endpoint(Extension(test_state()), Json(request()))
            .await
            .expect("report builds");

        assert_eq!(body.data_source, DashboardDataSource::Json);
        assert_eq!(body.report.compliance.submitted, 1);
        assert_eq!(body.report.compliance.target, 3);
        assert!(body.narrative.is_none());
    }

    #[tokio::test]
    async fn dashboard_endpoint_imports_csv_exports() {
        let mut payload = request();
        payload.reference_csv = Some("desa,puskesmas\nJayagiri,Puskesmas Lembang\n".to_string());
        payload.records_csv = Some(
            "desa,puskesmas,bulan,tahun,ditimbang,stunting\nJayagiri,Puskesmas Lembang,1,2024,40,6\n"
                .to_string(),
        );
        payload.include_narrative = true;

        let Json(body) = dashboard_report_endpoint(Extension(test_state()), Json(payload))
            .await
            .expect("report builds");

        assert_eq!(body.data_source, DashboardDataSource::Csv);
        assert_eq!(body.report.compliance.rows[0].name, "Puskesmas Lembang");
        let narrative = body.narrative.expect("narrative included");
        assert!(narrative.text().contains("2024-01..2024-03"));
    }

    #[tokio::test]
    async fn dashboard_endpoint_rejects_invalid_period() {
        let mut payload = request();
        payload.period = ReportingPeriod {
            year: 2024,
            start_month: 0,
            months: 3,
        };

        let error = dashboard_report_endpoint(Extension(test_state()), Json(payload))
            .await
            .err()
            .expect("invalid period rejected");

        assert!(matches!(error, AppError::InvalidRequest(_)));
        assert_eq!(
            error.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn dashboard_endpoint_reports_narrative_failures() {
        let mut payload = request();
        payload.reference_units.clear();
        payload.records.clear();
        payload.include_narrative = true;

        let Json(body) = dashboard_report_endpoint(Extension(test_state()), Json(payload))
            .await
            .expect("report still builds");

        assert!(body.narrative.is_none());
        assert_eq!(
            body.narrative_error,
            Some(
                NarrativeError::InsufficientData {
                    period: "2024-01..2024-03".to_string()
                }
                .to_string()
            )
        );
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        let state = test_state();
        state
            .readiness
            .store(false, std::sync::atomic::Ordering::Release);

        let response = readiness_endpoint(Extension(state)).await.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
