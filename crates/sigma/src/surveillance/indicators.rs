use super::domain::{RecordField, TransactionRecord};
use super::percentage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Surveillance ratios reported on the dashboard, expressed as percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    /// D/S
    WeighingCoverage,
    /// N/D
    WeightGainRate,
    /// T/D
    WeightNotGainedRate,
    /// N/S
    WeightGainCoverage,
    HeightCoverage,
    StuntingPrevalence,
    WastingPrevalence,
    UnderweightPrevalence,
    OverweightPrevalence,
    SevereWastingPrevalence,
    BelowRedLineRate,
    VitaminACoverage,
    ExclusiveBreastfeedingRate,
}

impl Indicator {
    pub const fn ordered() -> [Self; 13] {
        [
            Self::WeighingCoverage,
            Self::WeightGainRate,
            Self::WeightNotGainedRate,
            Self::WeightGainCoverage,
            Self::HeightCoverage,
            Self::StuntingPrevalence,
            Self::WastingPrevalence,
            Self::UnderweightPrevalence,
            Self::OverweightPrevalence,
            Self::SevereWastingPrevalence,
            Self::BelowRedLineRate,
            Self::VitaminACoverage,
            Self::ExclusiveBreastfeedingRate,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::WeighingCoverage => "Weighing coverage (D/S)",
            Self::WeightGainRate => "Weight gain (N/D)",
            Self::WeightNotGainedRate => "No weight gain (T/D)",
            Self::WeightGainCoverage => "Weight gain coverage (N/S)",
            Self::HeightCoverage => "Height measurement coverage",
            Self::StuntingPrevalence => "Stunting",
            Self::WastingPrevalence => "Wasting",
            Self::UnderweightPrevalence => "Underweight",
            Self::OverweightPrevalence => "Overweight",
            Self::SevereWastingPrevalence => "Severe wasting",
            Self::BelowRedLineRate => "Below red line (BGM)",
            Self::VitaminACoverage => "Vitamin A coverage",
            Self::ExclusiveBreastfeedingRate => "Exclusive breastfeeding",
        }
    }

    pub const fn numerator(self) -> RecordField {
        match self {
            Self::WeighingCoverage => RecordField::Weighed,
            Self::WeightGainRate | Self::WeightGainCoverage => RecordField::WeightGained,
            Self::WeightNotGainedRate => RecordField::WeightNotGained,
            Self::HeightCoverage => RecordField::HeightMeasured,
            Self::StuntingPrevalence => RecordField::Stunted,
            Self::WastingPrevalence => RecordField::Wasted,
            Self::UnderweightPrevalence => RecordField::Underweight,
            Self::OverweightPrevalence => RecordField::Overweight,
            Self::SevereWastingPrevalence => RecordField::SeverelyWasted,
            Self::BelowRedLineRate => RecordField::BelowRedLine,
            Self::VitaminACoverage => RecordField::VitaminA,
            Self::ExclusiveBreastfeedingRate => RecordField::ExclusiveBreastfed,
        }
    }

    pub const fn denominator(self) -> RecordField {
        match self {
            Self::WeighingCoverage
            | Self::WeightGainCoverage
            | Self::HeightCoverage
            | Self::VitaminACoverage => RecordField::TargetPopulation,
            Self::StuntingPrevalence => RecordField::HeightMeasured,
            Self::WeightGainRate
            | Self::WeightNotGainedRate
            | Self::WastingPrevalence
            | Self::UnderweightPrevalence
            | Self::OverweightPrevalence
            | Self::SevereWastingPrevalence
            | Self::BelowRedLineRate => RecordField::Weighed,
            Self::ExclusiveBreastfeedingRate => RecordField::InfantsUnderSixMonths,
        }
    }

    pub const fn direction(self) -> Direction {
        match self {
            Self::WeighingCoverage
            | Self::WeightGainRate
            | Self::WeightGainCoverage
            | Self::HeightCoverage
            | Self::VitaminACoverage
            | Self::ExclusiveBreastfeedingRate => Direction::HigherIsBetter,
            Self::WeightNotGainedRate
            | Self::StuntingPrevalence
            | Self::WastingPrevalence
            | Self::UnderweightPrevalence
            | Self::OverweightPrevalence
            | Self::SevereWastingPrevalence
            | Self::BelowRedLineRate => Direction::LowerIsBetter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorValue {
    pub indicator: Indicator,
    pub label: &'static str,
    pub value: f64,
}

/// Raw per-field sums over a set of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTotals {
    sums: [f64; RecordField::COUNT],
    records: u32,
}

impl FieldTotals {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TransactionRecord>,
    {
        let mut totals = Self::default();
        for record in records {
            totals.add(record);
        }
        totals
    }

    pub fn add(&mut self, record: &TransactionRecord) {
        for field in RecordField::ordered() {
            self.sums[field.index()] += record.amount(field);
        }
        self.records = self.records.saturating_add(1);
    }

    pub fn get(&self, field: RecordField) -> f64 {
        self.sums[field.index()]
    }

    pub fn records(&self) -> u32 {
        self.records
    }

    /// Sum each field, average the sums over the period, then take the ratio.
    pub fn averaged_ratio(&self, indicator: Indicator, months: u32) -> f64 {
        if months == 0 {
            return 0.0;
        }
        let months = f64::from(months);
        let numerator = self.get(indicator.numerator()) / months;
        let denominator = self.get(indicator.denominator()) / months;
        percentage(numerator, denominator)
    }

    pub fn ratio(&self, indicator: Indicator) -> f64 {
        percentage(
            self.get(indicator.numerator()),
            self.get(indicator.denominator()),
        )
    }

    pub fn indicator_values(&self) -> Vec<IndicatorValue> {
        Indicator::ordered()
            .into_iter()
            .map(|indicator| IndicatorValue {
                indicator,
                label: indicator.label(),
                value: self.ratio(indicator),
            })
            .collect()
    }
}
