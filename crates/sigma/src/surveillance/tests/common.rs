use axum::response::Response;
use serde_json::Value;

use crate::surveillance::domain::{RecordField, ReferenceUnit, TransactionRecord};

pub(super) fn district() -> Vec<ReferenceUnit> {
    vec![
        ReferenceUnit::new("ref-0001", "Puskesmas Sukamaju", "Mekar Sari"),
        ReferenceUnit::new("ref-0002", "Puskesmas Sukamaju", "Cibeunying"),
        ReferenceUnit::new("ref-0003", "Puskesmas Lembang", "Jayagiri"),
    ]
}

pub(super) fn bare_record(facility: &str, village: &str, month: u32) -> TransactionRecord {
    TransactionRecord::new(facility, village, 2024, month)
}

/// Every mandatory field filled with plausible posyandu numbers.
pub(super) fn full_record(facility: &str, village: &str, month: u32) -> TransactionRecord {
    bare_record(facility, village, month)
        .with(RecordField::TargetPopulation, 120.0)
        .with(RecordField::Weighed, 100.0)
        .with(RecordField::WeightGained, 70.0)
        .with(RecordField::WeightNotGained, 30.0)
        .with(RecordField::HeightMeasured, 90.0)
        .with(RecordField::Stunted, 18.0)
        .with(RecordField::Wasted, 6.0)
        .with(RecordField::Underweight, 12.0)
        .with(RecordField::Overweight, 3.0)
}

pub(super) fn burden_record(
    village: &str,
    weighed: f64,
    stunted: f64,
    wasted: f64,
    underweight: f64,
) -> TransactionRecord {
    bare_record("Puskesmas Sukamaju", village, 1)
        .with(RecordField::Weighed, weighed)
        .with(RecordField::Stunted, stunted)
        .with(RecordField::Wasted, wasted)
        .with(RecordField::Underweight, underweight)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
