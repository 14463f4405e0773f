//! Downlink assembly: one compressed calibration record plus a
//! conditional tail of single-register override records.
//!
//! The order of the uncompressed records is a protocol invariant. The
//! device applies commands in queue order and assumes the sample-period
//! command arrives last, so the builder always appends it at the end
//! and only ever adds to the *front* of the sequence afterwards.

use crate::hex::hex;
use crate::ptmap::{self, EmptyTable};
use crate::types::{
    AdditionalData, ConfigRow, Downlink, InputRecord, PayloadFormat, PtColumn, PtMapRow, TrapType,
};
use std::collections::BTreeMap;
use thiserror::Error;

/// Sample-period command type mask; the low 24 bits carry the period.
const SAMPLE_PERIOD_CMD: u64 = 0x0100_0000;
/// Sample-period command with the default period (3600 s) baked in.
const DEFAULT_SAMPLE_PERIOD_CMD: u64 = 0x0100_0e10;

/// Default minimal sample period in seconds: 11-byte payload at SF12 /
/// 125 kHz is 1.4828 s of air time, held to a 1% duty cycle.
pub const DEFAULT_MINIMAL_SAMPLE_PERIOD: u32 = 149;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("payload format {0:?} is not implemented yet; only HexString is supported")]
    UnsupportedPayloadFormat(PayloadFormat),
    #[error("compressed downlink option '{0}' is not implemented; valid options are 1, 2 and 3")]
    UnsupportedCompressionLevel(u8),
    #[error(transparent)]
    EmptyLookupTable(#[from] EmptyTable),
    #[error("thermodynamic config row is missing its k9/k10 coefficients")]
    MissingExtendedCalibration,
}

/// Encoding knobs, normally taken from the settings sheet.
#[derive(Debug, Clone)]
pub struct DownlinkOptions {
    pub payload_format: PayloadFormat,
    /// Temporary reporting interval while a long command queue drains.
    pub minimal_sample_period: u32,
    /// Selects which calibration fields ride in the compressed record
    /// (1, 2 or 3).
    pub compression_level: u8,
    /// Extra key/value fields merged into every emitted downlink.
    pub additional: AdditionalData,
}

impl Default for DownlinkOptions {
    fn default() -> Self {
        DownlinkOptions {
            payload_format: PayloadFormat::HexString,
            minimal_sample_period: DEFAULT_MINIMAL_SAMPLE_PERIOD,
            compression_level: 2,
            additional: BTreeMap::new(),
        }
    }
}

/// Assemble the ordered downlink sequence for one device.
pub fn build_downlinks(
    input: &InputRecord,
    config: &ConfigRow,
    pt_map: &[PtMapRow],
    options: &DownlinkOptions,
) -> Result<Vec<Downlink>, BuildError> {
    if options.payload_format != PayloadFormat::HexString {
        return Err(BuildError::UnsupportedPayloadFormat(options.payload_format));
    }
    let level = options.compression_level;

    // command word: fixed 0001 prefix, counter-reset bit, 3-bit trap code
    let reset_bit = u64::from(input.counter_reset_requested());
    let cmd = 0b0001_0000 | (reset_bit << 3) | u64::from(config.trap_type.code());

    let inlet_temp = ptmap::nearest(
        pt_map,
        input.trap_inlet_pressure,
        PtColumn::PressureBar,
        PtColumn::TempC,
    )?
    .trunc() as u64;

    // Level-dependent tail of the compressed record. Absent overrides
    // fall back to the factory defaults.
    let pt100_cal_0c = u64::from(input.pt100_cal_0c.unwrap_or(1640));
    let pt100_cal_250c = u64::from(input.pt100_cal_250c.unwrap_or(3175));
    let (port, tail): (u8, Vec<u64>) = match level {
        1 => (
            144,
            vec![
                u64::from(input.piezo_cal_fac_sensor.unwrap_or(0)),
                u64::from(input.piezo_cal_fac_amp.unwrap_or(0)),
                pt100_cal_0c,
                pt100_cal_250c,
                u64::from(input.pt100_cal_fac_mount.unwrap_or(0)),
                u64::from(input.pt100_cal_off_mount.unwrap_or(0)),
                u64::from(input.warn_cnt_th_def.unwrap_or(360)),
                u64::from(input.err_cnt_th_def.unwrap_or(720)),
            ],
        ),
        2 => (
            145,
            vec![
                pt100_cal_0c,
                pt100_cal_250c,
                u64::from(input.err_cnt_th_def.unwrap_or(720)),
            ],
        ),
        3 => (146, vec![pt100_cal_0c, pt100_cal_250c]),
        other => return Err(BuildError::UnsupportedCompressionLevel(other)),
    };

    let mut fields: Vec<u64> = vec![
        u64::from(port), // record type byte doubles as the port number
        cmd,
        inlet_temp,
        u64::from(config.k1),
        u64::from(config.k3), // same value as k2 but another register
        u64::from(config.k4),
        u64::from(config.k5),
        u64::from(config.k6),
        u64::from(config.k7),
        u64::from(config.k8),
    ];
    fields.extend(tail);

    // positions 0..=9 are 8-bit registers, everything after is 16-bit
    let payload: String = fields
        .iter()
        .enumerate()
        .map(|(index, &value)| hex(value, if index > 9 { 4 } else { 2 }))
        .collect();

    let mut downlinks = vec![Downlink::new(port, payload).with_extra(&options.additional)];

    for payload in uncompressed_payloads(input, config, level)? {
        downlinks.push(Downlink::new(2, payload).with_extra(&options.additional));
    }

    // speed up processing when more than 3 downlinks are queued: start
    // with a short reporting interval, the final sample-period command
    // restores the configured one
    if downlinks.len() > 3 {
        let payload = hex(SAMPLE_PERIOD_CMD | u64::from(options.minimal_sample_period), 8);
        downlinks.insert(0, Downlink::new(2, payload).with_extra(&options.additional));
    }

    Ok(downlinks)
}

/// The port-2 override records, in their protocol-mandated order. The
/// sample-period record is always the last entry.
fn uncompressed_payloads(
    input: &InputRecord,
    config: &ConfigRow,
    level: u8,
) -> Result<Vec<String>, BuildError> {
    let mut payloads = Vec::new();

    if config.trap_type == TrapType::Thermodynamic {
        let (k9, k10) = match (config.k9, config.k10) {
            (Some(k9), Some(k10)) => (k9, k10),
            _ => return Err(BuildError::MissingExtendedCalibration),
        };
        // minminval/maxmaxval with confidence 1 each, then default
        // minval, minconf, maxval, maxconf and piezo correction
        payloads.push(format!(
            "95{}01{}010502050200",
            hex(u64::from(k9), 2),
            hex(u64::from(k10), 2)
        ));
    }

    let mut tagged = |tag: &str, value: Option<u32>, min_level: u8| {
        if level > min_level {
            if let Some(value) = value {
                payloads.push(format!("{tag}{}", hex(u64::from(value), 4)));
            }
        }
    };
    tagged("8900", input.piezo_cal_fac_sensor, 1);
    tagged("8901", input.piezo_cal_off_sensor, 0);
    tagged("8902", input.piezo_cal_fac_amp, 1);
    tagged("8903", input.piezo_cal_off_amp, 0);
    tagged("8904", input.piezo_cal_fac_mount, 0);
    tagged("8905", input.piezo_cal_off_mount, 0);
    tagged("8906", input.pt100_cal_fac_sensor, 0);
    tagged("8907", input.pt100_cal_off_sensor, 0);
    tagged("8908", input.pt100_cal_fac_amp, 0);
    tagged("8909", input.pt100_cal_off_amp, 0);
    tagged("890a", input.pt100_cal_fac_mount, 1);
    tagged("890b", input.pt100_cal_off_mount, 1);
    // unreachable at the valid levels 1..=3, kept until the domain
    // owner decides whether level 4 becomes valid or these go away
    tagged("890c", input.pt100_cal_0c, 3);
    tagged("890d", input.pt100_cal_250c, 3);
    tagged("8402", input.warn_cnt_th_def, 1);
    tagged("8502", input.err_cnt_th_def, 2);
    tagged("8503", input.err_cnt_th_rst_def, 1);

    if input.counter_reset_requested() {
        payloads.push("04fc".to_owned());
    }
    if input.request_config_requested() {
        for request in ["8b", "8e06", "8e00", "8600", "8601", "8602", "8603"] {
            payloads.push(request.to_owned());
        }
        if config.trap_type == TrapType::Thermodynamic {
            payloads.push("95".to_owned());
        }
    }

    // ! this must stay the last downlink
    let sample_cmd = match input.sample_period {
        Some(period) => SAMPLE_PERIOD_CMD | period.ceil() as u64,
        None => DEFAULT_SAMPLE_PERIOD_CMD,
    };
    payloads.push(hex(sample_cmd, 8));

    Ok(payloads)
}
