use super::domain::TransactionRecord;
use super::indicators::{FieldTotals, Indicator, IndicatorValue};
use chrono::Month;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub month: u32,
    pub label: &'static str,
    pub records: u32,
    pub values: Vec<IndicatorValue>,
}

impl TrendPoint {
    pub fn value(&self, indicator: Indicator) -> f64 {
        self.values
            .iter()
            .find(|entry| entry.indicator == indicator)
            .map(|entry| entry.value)
            .unwrap_or(0.0)
    }
}

/// Twelve monthly points for `year`; months without records are all zero.
pub fn monthly_series(records: &[TransactionRecord], year: i32) -> Vec<TrendPoint> {
    let mut months: [FieldTotals; 12] = Default::default();

    for record in records.iter().filter(|record| record.year == year) {
        if let Some(slot) = record
            .month
            .checked_sub(1)
            .and_then(|index| months.get_mut(index as usize))
        {
            slot.add(record);
        }
    }

    months
        .iter()
        .zip(1u32..)
        .map(|(totals, month)| TrendPoint {
            month,
            label: month_label(month),
            records: totals.records(),
            values: totals.indicator_values(),
        })
        .collect()
}

fn month_label(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .map(|month| month.name())
        .unwrap_or("Unknown")
}
