//! The per-device input sheet.

use crate::SheetError;
use std::path::Path;
use trap_core::types::InputRecord;

/// Load the input sheet. The visible columns are `server`, `group`,
/// `devEUI` and the decision parameters; the hidden calibration
/// override columns may be absent or empty and come through as `None`.
pub fn load_input(path: &Path) -> Result<Vec<InputRecord>, SheetError> {
    crate::read_sheet(path)
}
