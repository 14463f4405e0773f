//! CSV ingestion of the parameter and input sheets.
//!
//! The commissioning workflow keeps its data in two workbooks: a
//! static parameter workbook (ConfigTable + ptMap sheets) and the
//! per-device input sheet. This crate reads their CSV exports, one
//! file per sheet with the column-header row kept, into the typed
//! records `trap-core` consumes.

pub mod input;
pub mod params;

pub use input::load_input;
pub use params::{load_config_table, load_pt_map};

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("data row {row}: {source}")]
    Parse {
        row: usize,
        #[source]
        source: csv::Error,
    },
}

/// Read all records of one sheet. Leading/trailing whitespace in
/// headers and cells is ignored; exports straight from spreadsheet
/// tools tend to carry some.
fn read_sheet<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SheetError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| SheetError::Open {
            path: path.to_owned(),
            source,
        })?;

    let mut rows = Vec::new();
    for (index, result) in reader.into_deserialize().enumerate() {
        // 1-based data row, as the user sees it below the header
        let row = index + 1;
        rows.push(result.map_err(|source| SheetError::Parse { row, source })?);
    }
    log::debug!("read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
