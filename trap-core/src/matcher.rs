//! Calibration-row selection from the ruleset table.

use crate::types::{ConfigRow, InputRecord};

/// Select the calibration row applicable to `input`, or `None` when no
/// row matches (a legitimate outcome, not an error).
///
/// A row matches when trap type, mount type, hardware version and
/// condensate load are equal and the inlet/outlet pressure delta lies
/// in `[p_min, p_max]`, both ends inclusive. The whole table is
/// scanned and the *last* matching row wins: later rows are deliberate
/// overrides of earlier, more general ones.
pub fn match_config<'a>(input: &InputRecord, table: &'a [ConfigRow]) -> Option<&'a ConfigRow> {
    let delta_pressure = input.trap_inlet_pressure - input.trap_outlet_pressure;
    let mut matched = None;
    for row in table {
        if row.trap_type != input.trap_type {
            continue;
        }
        if row.mount_type != input.mount_type {
            continue;
        }
        if !(delta_pressure >= row.p_min && delta_pressure <= row.p_max) {
            continue;
        }
        if row.hardware_version != input.hardware_version {
            continue;
        }
        if row.condensate_load != input.condensate_load {
            continue;
        }
        matched = Some(row);
    }
    matched
}
