use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::ciaf::{self, CiafConfig, CiafConfigError};
use super::domain::{
    PeriodError, RecordField, ReferenceUnit, ReportingPeriod, ReportingRole, TransactionRecord,
    MANDATORY_FIELDS,
};
use super::growth::{self, GroupIndicatorRow};
use super::report::DashboardInput;
use super::trend::{self, TrendPoint};
use super::{compliance, completeness};

/// Request validation failures surfaced as 422 responses.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("record {index} has month {month}; expected 1-12")]
    InvalidRecordMonth { index: usize, month: u32 },
    #[error("completeness needs at least one field")]
    EmptyFieldSet,
    #[error(transparent)]
    Period(#[from] PeriodError),
    #[error(transparent)]
    Ciaf(#[from] CiafConfigError),
}

#[derive(Debug, Deserialize)]
pub struct ComplianceRequest {
    pub reference_units: Vec<ReferenceUnit>,
    pub records: Vec<TransactionRecord>,
    pub months_in_period: u32,
    #[serde(default)]
    pub role: ReportingRole,
}

#[derive(Debug, Deserialize)]
pub struct CompletenessRequest {
    pub reference_units: Vec<ReferenceUnit>,
    pub records: Vec<TransactionRecord>,
    pub months_in_period: u32,
    #[serde(default)]
    pub role: ReportingRole,
    /// Defaults to the mandatory field set.
    #[serde(default)]
    pub fields: Option<Vec<RecordField>>,
}

#[derive(Debug, Deserialize)]
pub struct ComparisonRequest {
    pub current: Vec<TransactionRecord>,
    pub current_months: u32,
    pub previous: Vec<TransactionRecord>,
    pub previous_months: u32,
}

#[derive(Debug, Deserialize)]
pub struct TrendRequest {
    pub records: Vec<TransactionRecord>,
    pub year: i32,
    #[serde(default)]
    pub role: ReportingRole,
}

#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub year: i32,
    pub series: Vec<TrendPoint>,
    pub groups: Vec<GroupIndicatorRow>,
}

#[derive(Debug, Deserialize)]
pub struct CiafRequest {
    pub records: Vec<TransactionRecord>,
    /// Overrides the server's configured constants for this request only.
    #[serde(default)]
    pub config: Option<CiafConfig>,
}

/// Router exposing each calculator on its own endpoint.
pub fn analytics_router(config: Arc<CiafConfig>) -> Router {
    Router::new()
        .route("/api/v1/analytics/compliance", post(compliance_handler))
        .route("/api/v1/analytics/completeness", post(completeness_handler))
        .route(
            "/api/v1/analytics/growth/comparison",
            post(comparison_handler),
        )
        .route("/api/v1/analytics/growth/trend", post(trend_handler))
        .route("/api/v1/analytics/ciaf", post(ciaf_handler))
        .with_state(config)
}

pub fn validate_records(records: &[TransactionRecord]) -> Result<(), RequestError> {
    match records
        .iter()
        .enumerate()
        .find(|(_, record)| !(1..=12).contains(&record.month))
    {
        Some((index, record)) => Err(RequestError::InvalidRecordMonth {
            index,
            month: record.month,
        }),
        None => Ok(()),
    }
}

/// Compliance and completeness periods span one to twelve months.
pub fn validate_period_length(months: u32) -> Result<(), RequestError> {
    if (1..=12).contains(&months) {
        Ok(())
    } else {
        Err(PeriodError::InvalidLength(months).into())
    }
}

pub fn validate_dashboard(input: &DashboardInput) -> Result<(), RequestError> {
    ReportingPeriod::new(input.period.year, input.period.start_month, input.period.months)?;
    validate_records(&input.records)
}

fn unprocessable(error: RequestError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}

pub(crate) async fn compliance_handler(Json(request): Json<ComplianceRequest>) -> Response {
    if let Err(error) = validate_period_length(request.months_in_period)
        .and_then(|()| validate_records(&request.records))
    {
        return unprocessable(error);
    }

    let summary = compliance::calculate(
        &request.reference_units,
        &request.records,
        request.months_in_period,
        request.role,
    );
    (StatusCode::OK, Json(summary)).into_response()
}

pub(crate) async fn completeness_handler(Json(request): Json<CompletenessRequest>) -> Response {
    if let Err(error) = validate_period_length(request.months_in_period)
        .and_then(|()| validate_records(&request.records))
    {
        return unprocessable(error);
    }

    let fields = request.fields.unwrap_or_else(|| MANDATORY_FIELDS.to_vec());
    if fields.is_empty() {
        return unprocessable(RequestError::EmptyFieldSet);
    }

    let summary = completeness::calculate(
        &request.reference_units,
        &request.records,
        request.months_in_period,
        request.role,
        &fields,
    );
    (StatusCode::OK, Json(summary)).into_response()
}

pub(crate) async fn comparison_handler(Json(request): Json<ComparisonRequest>) -> Response {
    let comparison = growth::compare_periods(
        &request.current,
        request.current_months,
        &request.previous,
        request.previous_months,
    );
    (StatusCode::OK, Json(comparison)).into_response()
}

pub(crate) async fn trend_handler(Json(request): Json<TrendRequest>) -> Response {
    if let Err(error) = validate_records(&request.records) {
        return unprocessable(error);
    }

    let year_records: Vec<TransactionRecord> = request
        .records
        .iter()
        .filter(|record| record.year == request.year)
        .cloned()
        .collect();

    let response = TrendResponse {
        year: request.year,
        series: trend::monthly_series(&request.records, request.year),
        groups: growth::group_summary(&year_records, request.role),
    };
    (StatusCode::OK, Json(response)).into_response()
}

pub(crate) async fn ciaf_handler(
    State(defaults): State<Arc<CiafConfig>>,
    Json(request): Json<CiafRequest>,
) -> Response {
    let config = request.config.unwrap_or_else(|| defaults.as_ref().clone());
    if let Err(error) = config.validate() {
        return unprocessable(error.into());
    }

    let analysis = ciaf::analyze(&request.records, &config);
    (StatusCode::OK, Json(analysis)).into_response()
}
