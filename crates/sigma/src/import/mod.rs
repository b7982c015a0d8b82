mod parser;

use crate::surveillance::domain::{ReferenceUnit, TransactionRecord};
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidMonth { row: usize, month: u32 },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read surveillance export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid surveillance CSV data: {}", err),
            ImportError::InvalidMonth { row, month } => write!(
                f,
                "data row {} has month {}; expected a value between 1 and 12",
                row, month
            ),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::InvalidMonth { .. } => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads reference tables and monthly reports from CSV exports.
///
/// Headers may use the English field names or the Indonesian source columns
/// (`desa`, `puskesmas`, `bulan`, `tahun`, `sasaran`, `ditimbang`, ...).
pub struct SurveillanceImporter;

impl SurveillanceImporter {
    pub fn reference_units_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<ReferenceUnit>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::reference_units_from_reader(file)
    }

    pub fn reference_units_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<ReferenceUnit>, ImportError> {
        let units = parser::parse_reference_units(reader)?;
        info!(units = units.len(), "reference units imported");
        Ok(units)
    }

    pub fn records_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<TransactionRecord>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::records_from_reader(file)
    }

    pub fn records_from_reader<R: Read>(reader: R) -> Result<Vec<TransactionRecord>, ImportError> {
        let records = parser::parse_records(reader)?;
        info!(records = records.len(), "monthly reports imported");
        Ok(records)
    }
}
