use crate::surveillance::domain::{coerce_cell, RecordField, ReferenceUnit, TransactionRecord};
use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::ImportError;

pub(crate) fn parse_reference_units<R: Read>(reader: R) -> Result<Vec<ReferenceUnit>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut units = Vec::new();

    for (index, record) in csv_reader.deserialize::<ReferenceRow>().enumerate() {
        let row = record?;
        let id = row
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("ref-{:04}", index + 1));
        units.push(ReferenceUnit {
            id,
            village: row.village,
            facility: row.facility,
        });
    }

    Ok(units)
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<TransactionRecord>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, record) in csv_reader.deserialize::<RecordRow>().enumerate() {
        let row = record?;
        if !(1..=12).contains(&row.month) {
            return Err(ImportError::InvalidMonth {
                row: index + 1,
                month: row.month,
            });
        }
        records.push(row.into_record());
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct ReferenceRow {
    #[serde(default, alias = "kode", alias = "kode_desa")]
    id: Option<String>,
    #[serde(alias = "desa", alias = "nama_desa")]
    village: String,
    #[serde(alias = "puskesmas", alias = "nama_puskesmas")]
    facility: String,
}

#[derive(Debug, Deserialize)]
struct RecordRow {
    #[serde(alias = "desa", alias = "nama_desa")]
    village: String,
    #[serde(alias = "puskesmas", alias = "nama_puskesmas")]
    facility: String,
    #[serde(alias = "bulan")]
    month: u32,
    #[serde(alias = "tahun")]
    year: i32,
    #[serde(default, alias = "sasaran", deserialize_with = "lenient_number")]
    target_population: Option<f64>,
    #[serde(default, alias = "ditimbang", deserialize_with = "lenient_number")]
    weighed: Option<f64>,
    #[serde(default, alias = "naik_bb", deserialize_with = "lenient_number")]
    weight_gained: Option<f64>,
    #[serde(default, alias = "tidak_naik_bb", deserialize_with = "lenient_number")]
    weight_not_gained: Option<f64>,
    #[serde(default, alias = "diukur_tb", deserialize_with = "lenient_number")]
    height_measured: Option<f64>,
    #[serde(default, alias = "stunting", deserialize_with = "lenient_number")]
    stunted: Option<f64>,
    #[serde(default, alias = "wasting", deserialize_with = "lenient_number")]
    wasted: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    underweight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    overweight: Option<f64>,
    #[serde(default, alias = "gizi_buruk", deserialize_with = "lenient_number")]
    severely_wasted: Option<f64>,
    #[serde(default, alias = "bgm", deserialize_with = "lenient_number")]
    below_red_line: Option<f64>,
    #[serde(default, alias = "vitamin_a_biru", deserialize_with = "lenient_number")]
    vitamin_a: Option<f64>,
    #[serde(default, alias = "bayi_0_6_bulan", deserialize_with = "lenient_number")]
    infants_under_six_months: Option<f64>,
    #[serde(default, alias = "asi_eksklusif", deserialize_with = "lenient_number")]
    exclusive_breastfed: Option<f64>,
}

impl RecordRow {
    fn into_record(self) -> TransactionRecord {
        let mut record = TransactionRecord::new(self.facility, self.village, self.year, self.month);
        for (field, value) in [
            (RecordField::TargetPopulation, self.target_population),
            (RecordField::Weighed, self.weighed),
            (RecordField::WeightGained, self.weight_gained),
            (RecordField::WeightNotGained, self.weight_not_gained),
            (RecordField::HeightMeasured, self.height_measured),
            (RecordField::Stunted, self.stunted),
            (RecordField::Wasted, self.wasted),
            (RecordField::Underweight, self.underweight),
            (RecordField::Overweight, self.overweight),
            (RecordField::SeverelyWasted, self.severely_wasted),
            (RecordField::BelowRedLine, self.below_red_line),
            (RecordField::VitaminA, self.vitamin_a),
            (RecordField::InfantsUnderSixMonths, self.infants_under_six_months),
            (RecordField::ExclusiveBreastfed, self.exclusive_breastfed),
        ] {
            record.set(field, value);
        }
        record
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.and_then(|raw| coerce_cell(&raw)))
}
