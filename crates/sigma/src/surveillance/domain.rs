use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::debug;

/// Canonical administrative location loaded from the reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceUnit {
    pub id: String,
    pub village: String,
    pub facility: String,
}

impl ReferenceUnit {
    pub fn new(id: impl Into<String>, facility: impl Into<String>, village: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            village: village.into(),
            facility: facility.into(),
        }
    }
}

/// Numeric columns carried by a monthly nutrition report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    TargetPopulation,
    Weighed,
    WeightGained,
    WeightNotGained,
    HeightMeasured,
    Stunted,
    Wasted,
    Underweight,
    Overweight,
    SeverelyWasted,
    BelowRedLine,
    VitaminA,
    InfantsUnderSixMonths,
    ExclusiveBreastfed,
}

impl RecordField {
    pub const COUNT: usize = 14;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::TargetPopulation,
            Self::Weighed,
            Self::WeightGained,
            Self::WeightNotGained,
            Self::HeightMeasured,
            Self::Stunted,
            Self::Wasted,
            Self::Underweight,
            Self::Overweight,
            Self::SeverelyWasted,
            Self::BelowRedLine,
            Self::VitaminA,
            Self::InfantsUnderSixMonths,
            Self::ExclusiveBreastfed,
        ]
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::TargetPopulation => "target_population",
            Self::Weighed => "weighed",
            Self::WeightGained => "weight_gained",
            Self::WeightNotGained => "weight_not_gained",
            Self::HeightMeasured => "height_measured",
            Self::Stunted => "stunted",
            Self::Wasted => "wasted",
            Self::Underweight => "underweight",
            Self::Overweight => "overweight",
            Self::SeverelyWasted => "severely_wasted",
            Self::BelowRedLine => "below_red_line",
            Self::VitaminA => "vitamin_a",
            Self::InfantsUnderSixMonths => "infants_under_six_months",
            Self::ExclusiveBreastfed => "exclusive_breastfed",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::TargetPopulation => "Target population (S)",
            Self::Weighed => "Weighed (D)",
            Self::WeightGained => "Weight gained (N)",
            Self::WeightNotGained => "Weight not gained (T)",
            Self::HeightMeasured => "Height measured",
            Self::Stunted => "Stunted",
            Self::Wasted => "Wasted",
            Self::Underweight => "Underweight",
            Self::Overweight => "Overweight",
            Self::SeverelyWasted => "Severely wasted",
            Self::BelowRedLine => "Below red line (BGM)",
            Self::VitaminA => "Vitamin A received",
            Self::InfantsUnderSixMonths => "Infants under six months",
            Self::ExclusiveBreastfed => "Exclusively breastfed",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ordered()
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Fields whose presence defines a complete data-entry record.
pub const MANDATORY_FIELDS: [RecordField; 9] = [
    RecordField::TargetPopulation,
    RecordField::Weighed,
    RecordField::WeightGained,
    RecordField::WeightNotGained,
    RecordField::HeightMeasured,
    RecordField::Stunted,
    RecordField::Wasted,
    RecordField::Underweight,
    RecordField::Overweight,
];

/// One submitted monthly report for one village.
///
/// Numeric fields are optional: `None` means the cell was left empty, which
/// matters for completeness scoring. Sums treat absent values as zero. A
/// value that is present but not a number deserializes as a filled zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub village: String,
    pub facility: String,
    pub month: u32,
    pub year: i32,
    #[serde(default, deserialize_with = "lenient_number")]
    pub target_population: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weighed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight_gained: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight_not_gained: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub height_measured: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stunted: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub wasted: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub underweight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub overweight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub severely_wasted: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub below_red_line: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub vitamin_a: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub infants_under_six_months: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub exclusive_breastfed: Option<f64>,
}

impl TransactionRecord {
    pub fn new(
        facility: impl Into<String>,
        village: impl Into<String>,
        year: i32,
        month: u32,
    ) -> Self {
        Self {
            village: village.into(),
            facility: facility.into(),
            month,
            year,
            ..Self::default()
        }
    }

    /// Builder-style setter used by fixtures and the demo district.
    pub fn with(mut self, field: RecordField, value: f64) -> Self {
        self.set(field, Some(value));
        self
    }

    pub fn value(&self, field: RecordField) -> Option<f64> {
        match field {
            RecordField::TargetPopulation => self.target_population,
            RecordField::Weighed => self.weighed,
            RecordField::WeightGained => self.weight_gained,
            RecordField::WeightNotGained => self.weight_not_gained,
            RecordField::HeightMeasured => self.height_measured,
            RecordField::Stunted => self.stunted,
            RecordField::Wasted => self.wasted,
            RecordField::Underweight => self.underweight,
            RecordField::Overweight => self.overweight,
            RecordField::SeverelyWasted => self.severely_wasted,
            RecordField::BelowRedLine => self.below_red_line,
            RecordField::VitaminA => self.vitamin_a,
            RecordField::InfantsUnderSixMonths => self.infants_under_six_months,
            RecordField::ExclusiveBreastfed => self.exclusive_breastfed,
        }
    }

    pub fn set(&mut self, field: RecordField, value: Option<f64>) {
        let slot = match field {
            RecordField::TargetPopulation => &mut self.target_population,
            RecordField::Weighed => &mut self.weighed,
            RecordField::WeightGained => &mut self.weight_gained,
            RecordField::WeightNotGained => &mut self.weight_not_gained,
            RecordField::HeightMeasured => &mut self.height_measured,
            RecordField::Stunted => &mut self.stunted,
            RecordField::Wasted => &mut self.wasted,
            RecordField::Underweight => &mut self.underweight,
            RecordField::Overweight => &mut self.overweight,
            RecordField::SeverelyWasted => &mut self.severely_wasted,
            RecordField::BelowRedLine => &mut self.below_red_line,
            RecordField::VitaminA => &mut self.vitamin_a,
            RecordField::InfantsUnderSixMonths => &mut self.infants_under_six_months,
            RecordField::ExclusiveBreastfed => &mut self.exclusive_breastfed,
        };
        *slot = value;
    }

    /// Value coerced for summation: absent and non-finite cells count as zero.
    pub fn amount(&self, field: RecordField) -> f64 {
        self.value(field)
            .filter(|value| value.is_finite())
            .unwrap_or(0.0)
    }

    pub(crate) fn period_index(&self) -> i64 {
        month_index(self.year, self.month)
    }
}

/// Empty cells stay absent; anything else that is not a finite number
/// counts as a filled zero.
pub(crate) fn coerce_cell(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            debug!(value = trimmed, "non-numeric cell coerced to zero");
            Some(0.0)
        }
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientNumber)
}

struct LenientNumber;

impl<'de> Visitor<'de> for LenientNumber {
    type Value = Option<f64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, a numeric string, or null")
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(Some(if value.is_finite() { value } else { 0.0 }))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(value as f64))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Some(value as f64))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(coerce_cell(value))
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<Self::Value, E> {
        Ok(Some(0.0))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Some(0.0))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Some(0.0))
    }
}

/// Caller role; decides whether breakdowns are per facility or per village.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingRole {
    /// Health-facility staff: rows are the facility's villages.
    Facility,
    /// District administrator: rows are facilities.
    #[default]
    Administrator,
}

impl ReportingRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Facility => "Facility",
            Self::Administrator => "Administrator",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "facility" | "puskesmas" => Some(Self::Facility),
            "administrator" | "admin" | "dinkes" => Some(Self::Administrator),
            _ => None,
        }
    }
}

/// Consecutive calendar months evaluated together, e.g. one quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub year: i32,
    pub start_month: u32,
    pub months: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodError {
    #[error("month {0} is outside 1-12")]
    InvalidMonth(u32),
    #[error("a reporting period spans 1-12 months, got {0}")]
    InvalidLength(u32),
    #[error("a period starting {year}-{month:02} runs past the last representable year")]
    YearOutOfRange { year: i32, month: u32 },
}

impl ReportingPeriod {
    pub fn new(year: i32, start_month: u32, months: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&start_month) {
            return Err(PeriodError::InvalidMonth(start_month));
        }
        if !(1..=12).contains(&months) {
            return Err(PeriodError::InvalidLength(months));
        }
        if month_index(year, start_month) + i64::from(months) - 1 > last_month_index() {
            return Err(PeriodError::YearOutOfRange {
                year,
                month: start_month,
            });
        }

        Ok(Self {
            year,
            start_month,
            months,
        })
    }

    /// Period covering `start_month..=end_month` of a single year.
    pub fn months_of_year(year: i32, start_month: u32, end_month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&end_month) {
            return Err(PeriodError::InvalidMonth(end_month));
        }
        let months = end_month
            .checked_sub(start_month)
            .map(|span| span + 1)
            .ok_or(PeriodError::InvalidLength(0))?;
        Self::new(year, start_month, months)
    }

    fn start_index(&self) -> i64 {
        month_index(self.year, self.start_month)
    }

    pub fn contains(&self, record: &TransactionRecord) -> bool {
        if !(1..=12).contains(&record.month) {
            return false;
        }
        let index = record.period_index();
        let start = self.start_index();
        index >= start && index < start + i64::from(self.months)
    }

    /// Period of equal length ending the month before this one starts.
    pub fn previous(&self) -> Self {
        let start = self.start_index() - i64::from(self.months);
        let (year, month) = from_month_index(start);
        Self {
            year,
            start_month: month,
            months: self.months,
        }
    }

    pub fn end(&self) -> (i32, u32) {
        from_month_index(self.start_index() + i64::from(self.months) - 1)
    }

    pub fn filter(&self, records: &[TransactionRecord]) -> Vec<TransactionRecord> {
        records
            .iter()
            .filter(|record| self.contains(record))
            .cloned()
            .collect()
    }

    pub fn label(&self) -> String {
        let (end_year, end_month) = self.end();
        if self.months == 1 {
            format!("{}-{:02}", self.year, self.start_month)
        } else {
            format!(
                "{}-{:02}..{}-{:02}",
                self.year, self.start_month, end_year, end_month
            )
        }
    }
}

fn month_index(year: i32, month: u32) -> i64 {
    i64::from(year) * 12 + i64::from(month) - 1
}

fn last_month_index() -> i64 {
    month_index(i32::MAX, 12)
}

/// Inverse of `month_index`, saturating at the ends of the `i32` year range.
fn from_month_index(index: i64) -> (i32, u32) {
    let index = index.clamp(month_index(i32::MIN, 1), last_month_index());
    let year = i32::try_from(index.div_euclid(12)).unwrap_or(i32::MAX);
    let month = u32::try_from(index.rem_euclid(12) + 1).unwrap_or(12);
    (year, month)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accessor_matches_struct_fields() {
        let record = TransactionRecord::new("PKM A", "Desa X", 2024, 3)
            .with(RecordField::Weighed, 40.0)
            .with(RecordField::Stunted, 0.0);

        assert_eq!(record.value(RecordField::Weighed), Some(40.0));
        assert_eq!(record.weighed, Some(40.0));
        assert_eq!(record.value(RecordField::Stunted), Some(0.0));
        assert_eq!(record.value(RecordField::Wasted), None);
        assert_eq!(record.amount(RecordField::Wasted), 0.0);
    }

    #[test]
    fn field_keys_round_trip_and_indexes_are_dense() {
        for (position, field) in RecordField::ordered().into_iter().enumerate() {
            assert_eq!(field.index(), position);
            assert_eq!(RecordField::from_key(field.key()), Some(field));
        }
        assert_eq!(RecordField::from_key("nope"), None);
    }

    #[test]
    fn previous_period_crosses_year_boundary() {
        let q1 = ReportingPeriod::months_of_year(2024, 1, 3).expect("valid quarter");
        let previous = q1.previous();
        assert_eq!(previous.year, 2023);
        assert_eq!(previous.start_month, 10);
        assert_eq!(previous.end(), (2023, 12));
        assert_eq!(previous.label(), "2023-10..2023-12");
    }

    #[test]
    fn period_contains_only_its_months() {
        let period = ReportingPeriod::new(2023, 11, 3).expect("valid period");
        assert!(period.contains(&TransactionRecord::new("A", "X", 2023, 11)));
        assert!(period.contains(&TransactionRecord::new("A", "X", 2024, 1)));
        assert!(!period.contains(&TransactionRecord::new("A", "X", 2024, 2)));
        assert!(!period.contains(&TransactionRecord::new("A", "X", 2023, 0)));
    }

    #[test]
    fn rejects_invalid_periods() {
        assert_eq!(
            ReportingPeriod::new(2024, 13, 1),
            Err(PeriodError::InvalidMonth(13))
        );
        assert_eq!(
            ReportingPeriod::new(2024, 1, 0),
            Err(PeriodError::InvalidLength(0))
        );
        assert!(ReportingPeriod::months_of_year(2024, 6, 3).is_err());
    }

    #[test]
    fn cells_distinguish_empty_from_garbage() {
        assert_eq!(coerce_cell("  "), None);
        assert_eq!(coerce_cell("12"), Some(12.0));
        assert_eq!(coerce_cell("0"), Some(0.0));
        assert_eq!(coerce_cell("n/a"), Some(0.0));
        assert_eq!(coerce_cell("inf"), Some(0.0));
    }

    #[test]
    fn json_numbers_are_coerced_instead_of_rejected() {
        let record: TransactionRecord = serde_json::from_value(serde_json::json!({
            "facility": "PKM A",
            "village": "Desa X",
            "month": 2,
            "year": 2024,
            "weighed": "12",
            "stunted": "n/a",
            "wasted": null,
            "underweight": "",
            "overweight": true,
            "vitamin_a": 7
        }))
        .expect("malformed numbers never reject a record");

        assert_eq!(record.weighed, Some(12.0));
        assert_eq!(record.stunted, Some(0.0));
        assert_eq!(record.wasted, None);
        assert_eq!(record.underweight, None);
        assert_eq!(record.overweight, Some(0.0));
        assert_eq!(record.vitamin_a, Some(7.0));
        assert_eq!(record.below_red_line, None);
    }

    #[test]
    fn periods_at_the_edge_of_the_calendar_do_not_wrap() {
        assert_eq!(
            ReportingPeriod::new(i32::MAX, 12, 3),
            Err(PeriodError::YearOutOfRange {
                year: i32::MAX,
                month: 12
            })
        );

        let last = ReportingPeriod::new(i32::MAX, 10, 3).expect("fits in the final year");
        assert_eq!(last.end(), (i32::MAX, 12));
        assert_eq!(last.label(), format!("{0}-10..{0}-12", i32::MAX));
        assert_eq!(last.previous().start_month, 7);

        let first = ReportingPeriod::new(i32::MIN, 1, 3).expect("valid period");
        let previous = first.previous();
        assert_eq!((previous.year, previous.start_month), (i32::MIN, 1));
    }

    #[test]
    fn parses_roles_from_labels() {
        assert_eq!(ReportingRole::parse("Facility"), Some(ReportingRole::Facility));
        assert_eq!(ReportingRole::parse(" admin "), Some(ReportingRole::Administrator));
        assert_eq!(ReportingRole::parse("guest"), None);
    }
}
