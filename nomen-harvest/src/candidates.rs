//! Discovery candidate CSV
//!
//! Header: `person,personLabel,surnameLabel,occupationLabel,cluster`

use nomen_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

/// One discovered person/occupation pairing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateRow {
    /// Wikidata entity URI
    pub person: String,
    #[serde(rename = "personLabel")]
    pub person_label: String,
    #[serde(rename = "surnameLabel")]
    pub surname_label: String,
    #[serde(rename = "occupationLabel")]
    pub occupation_label: String,
    #[serde(default)]
    pub cluster: String,
}

fn csv_error(path: &Path, err: csv::Error) -> Error {
    Error::Data(format!("CSV {}: {}", path.display(), err))
}

/// Write `rows` with a header, creating parent directories
///
/// Returns the number of rows written.
pub fn write_candidates(path: &Path, rows: &[CandidateRow]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_writer(File::create(path)?);
    for row in rows {
        writer.serialize(row).map_err(|e| csv_error(path, e))?;
    }
    writer.flush()?;

    info!(rows = rows.len(), path = %path.display(), "Wrote candidates");
    Ok(rows.len())
}

/// Rows read from a candidates CSV
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSheet {
    pub rows: Vec<CandidateRow>,
    /// Malformed rows that were logged and left out
    pub rejected: usize,
}

/// Read a candidates CSV, skipping rows that do not parse
///
/// Only IO failures abort the read.
pub fn read_candidates(path: &Path) -> Result<CandidateSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(File::open(path)?);

    let mut sheet = CandidateSheet::default();
    for row in reader.deserialize::<CandidateRow>() {
        match row {
            Ok(row) => sheet.rows.push(row),
            Err(e) if e.is_io_error() => return Err(csv_error(path, e)),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    line = ?e.position().map(|p| p.line()),
                    error = %e,
                    "Malformed candidate row, skipped"
                );
                sheet.rejected += 1;
            }
        }
    }
    Ok(sheet)
}
