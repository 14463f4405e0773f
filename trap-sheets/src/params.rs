//! Static parameter sheets: the calibration ruleset and the
//! pressure/temperature map.

use crate::SheetError;
use std::path::Path;
use trap_core::types::{ConfigRow, PtMapRow};

/// Load the ConfigTable sheet. Columns: `trapType`, `mountType`,
/// `hardwareVersion`, `pMin`, `pMax`, `condensateLoad`, `k1`..`k10`;
/// empty `k9`/`k10` cells are fine on non-thermodynamic rows.
pub fn load_config_table(path: &Path) -> Result<Vec<ConfigRow>, SheetError> {
    crate::read_sheet(path)
}

/// Load the ptMap sheet. Columns: `P [bar]`, `P [psig]`, `T [K]`,
/// `T [C]`, `T [F]`.
pub fn load_pt_map(path: &Path) -> Result<Vec<PtMapRow>, SheetError> {
    crate::read_sheet(path)
}
