//! Per-record orchestration: identity validation, matching, building,
//! and the configurable continue-or-abort policy.

use crate::builder::{self, BuildError, DownlinkOptions};
use crate::matcher;
use crate::types::{is_valid_dev_eui, ConfigRow, DeviceSetup, InputRecord, Output, PtMapRow};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("invalid devEUI '{value}' in row {row} (must be 16 hex digits)")]
    InvalidDevEui { row: usize, value: String },
    #[error("missing devEUI in row {row}")]
    MissingDevEui { row: usize },
    #[error("failed to build downlinks for device {dev_eui} in row {row}")]
    Build {
        row: usize,
        dev_eui: String,
        #[source]
        source: BuildError,
    },
}

/// Decides which per-record failures abort the whole batch.
#[derive(Debug, Clone)]
pub struct ErrorPolicy {
    /// Continue with the placeholder devEUI `_*_<raw>_*_`.
    pub continue_on_invalid_dev_eui: bool,
    /// Skip the record entirely.
    pub continue_on_missing_dev_eui: bool,
    /// Log and skip on matcher/builder failures.
    pub continue_on_unexpected_error: bool,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        ErrorPolicy {
            continue_on_invalid_dev_eui: true,
            continue_on_missing_dev_eui: true,
            continue_on_unexpected_error: false,
        }
    }
}

/// Result of one batch run: the grouped output plus run counters.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub output: Output,
    /// Input rows seen.
    pub total: usize,
    /// Rows that produced a valid downlink sequence.
    pub configured: usize,
    /// Rows that failed for any reason (each row counted once).
    pub failed: usize,
    pub missing_dev_eui: usize,
    pub invalid_dev_eui: usize,
}

/// Run the whole batch. Returns `Err` only for failures the policy
/// does not allow to continue past; everything else lands in the
/// report counters.
pub fn run_batch(
    records: &[InputRecord],
    config_table: &[ConfigRow],
    pt_map: &[PtMapRow],
    options: &DownlinkOptions,
    policy: &ErrorPolicy,
) -> Result<BatchReport, BatchError> {
    let mut report = BatchReport::default();

    for (index, record) in records.iter().enumerate() {
        let row = index + 1; // 1-based, matches the sheet data rows
        report.total += 1;
        let mut row_failed = false;

        let server = trimmed(record.server.as_deref());
        let group = trimmed(record.group.as_deref());

        let dev_eui = match trimmed(record.dev_eui.as_deref()) {
            Some(raw) if is_valid_dev_eui(raw) => raw.to_owned(),
            Some(raw) => {
                report.invalid_dev_eui += 1;
                report.failed += 1;
                row_failed = true;
                if !policy.continue_on_invalid_dev_eui {
                    return Err(BatchError::InvalidDevEui {
                        row,
                        value: raw.to_owned(),
                    });
                }
                let placeholder = format!("_*_{raw}_*_");
                log::warn!(
                    "invalid devEUI '{raw}' in row {row}, continuing as '{placeholder}'"
                );
                placeholder
            }
            None => {
                report.missing_dev_eui += 1;
                report.failed += 1;
                if !policy.continue_on_missing_dev_eui {
                    return Err(BatchError::MissingDevEui { row });
                }
                log::warn!("missing devEUI in row {row}, skipping");
                continue;
            }
        };

        let Some(config) = matcher::match_config(record, config_table) else {
            log::info!("no valid configuration possible for device {dev_eui} in row {row}");
            report.output.insert(server, group, &dev_eui, DeviceSetup {
                valid: false,
                downlinks: Vec::new(),
            });
            continue;
        };

        match builder::build_downlinks(record, config, pt_map, options) {
            Ok(downlinks) => {
                report.configured += 1;
                report.output.insert(server, group, &dev_eui, DeviceSetup {
                    valid: true,
                    downlinks,
                });
            }
            Err(source) => {
                if !row_failed {
                    report.failed += 1;
                }
                if !policy.continue_on_unexpected_error {
                    return Err(BatchError::Build {
                        row,
                        dev_eui,
                        source,
                    });
                }
                log::warn!("row {row}: building downlinks for {dev_eui} failed: {source}");
            }
        }
    }

    Ok(report)
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
