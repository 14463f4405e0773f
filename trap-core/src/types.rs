use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// --- Decision parameters ---

/// Steam-trap working principle, labelled as in the ConfigTable sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrapType {
    #[serde(rename = "BK / BI - Bimetallic")]
    Bimetallic,
    #[serde(rename = "MK / KAP - Membrane (capsule)")]
    MembraneCapsule,
    #[serde(rename = "UNA / KU - Ball float")]
    BallFloat,
    #[serde(rename = "UIB / GLO - Inverted bucket")]
    InvertedBucket,
    #[serde(rename = "DK / TH - Thermodynamic")]
    Thermodynamic,
    Venturi,
}

impl TrapType {
    /// 3-bit trap code packed into the command word.
    ///
    /// Venturi traps deliberately share code 0 with bimetallic traps;
    /// the firmware treats both the same way.
    pub fn code(self) -> u8 {
        match self {
            TrapType::Bimetallic | TrapType::Venturi => 0,
            TrapType::MembraneCapsule => 1,
            TrapType::BallFloat => 2,
            TrapType::InvertedBucket => 3,
            TrapType::Thermodynamic => 4,
        }
    }
}

/// How the sensor is mounted on the trap body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MountType {
    #[serde(rename = "PBS - vertical pressure bearing screw")]
    PressureBearingScrew,
    #[serde(rename = "ADP - horizontal pressure bearing screw (90° adapter)")]
    Adapter90,
    #[serde(rename = "RFC - retro fit clamp")]
    RetroFitClamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HardwareVersion {
    #[serde(rename = "MSBA-1.0")]
    Msba10,
    #[serde(rename = "MSBA-1.2")]
    Msba12,
}

/// Expected condensate throughput class of the installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CondensateLoad {
    #[serde(rename = "To be defined")]
    ToBeDefined,
    #[serde(rename = "low (L < 20 kg/h)")]
    Low,
    #[serde(rename = "middle (20 kg/h <= L < 100 kg/h)")]
    Middle,
    #[serde(rename = "high (100 kg/h <= L)")]
    High,
}

// --- Static parameter tables ---

/// One row of the calibration ruleset table.
///
/// A row applies when all four categorical fields match the input and
/// the inlet/outlet pressure delta falls into `[p_min, p_max]`. Row
/// identity is its position in the table; later rows take priority
/// when several rows apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRow {
    pub trap_type: TrapType,
    pub mount_type: MountType,
    pub hardware_version: HardwareVersion,
    pub p_min: f64,
    pub p_max: f64,
    pub condensate_load: CondensateLoad,
    pub k1: u32,
    pub k2: u32,
    pub k3: u32,
    pub k4: u32,
    pub k5: u32,
    pub k6: u32,
    pub k7: u32,
    pub k8: u32,
    /// Extended coefficients, only present on thermodynamic rows.
    pub k9: Option<u32>,
    pub k10: Option<u32>,
}

/// One calibration point of the pressure/temperature map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PtMapRow {
    #[serde(rename = "P [bar]")]
    pub p_bar: f64,
    #[serde(rename = "P [psig]")]
    pub p_psig: f64,
    #[serde(rename = "T [K]")]
    pub t_k: f64,
    #[serde(rename = "T [C]")]
    pub t_c: f64,
    #[serde(rename = "T [F]")]
    pub t_f: f64,
}

/// Column selector for pressure/temperature map lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtColumn {
    PressureBar,
    PressurePsig,
    TempK,
    TempC,
    TempF,
}

impl PtMapRow {
    pub fn get(&self, column: PtColumn) -> f64 {
        match column {
            PtColumn::PressureBar => self.p_bar,
            PtColumn::PressurePsig => self.p_psig,
            PtColumn::TempK => self.t_k,
            PtColumn::TempC => self.t_c,
            PtColumn::TempF => self.t_f,
        }
    }
}

// --- Per-device input ---

/// One device's commissioning parameters, one sheet row.
///
/// The identity and decision fields are the visible part of the input
/// sheet; everything `Option`al past `condensate_load` comes from the
/// hidden override columns and only affects encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputRecord {
    pub server: Option<String>,
    pub group: Option<String>,
    #[serde(rename = "devEUI")]
    pub dev_eui: Option<String>,
    pub trap_type: TrapType,
    pub mount_type: MountType,
    pub trap_inlet_pressure: f64,
    pub trap_outlet_pressure: f64,
    pub hardware_version: HardwareVersion,
    pub condensate_load: CondensateLoad,
    pub sample_period: Option<f64>,
    pub warn_cnt_th_def: Option<u32>,
    pub err_cnt_th_def: Option<u32>,
    pub err_cnt_th_rst_def: Option<u32>,
    pub counter_reset: Option<String>,
    pub request_config: Option<String>,
    pub piezo_cal_fac_sensor: Option<u32>,
    pub piezo_cal_off_sensor: Option<u32>,
    pub piezo_cal_fac_amp: Option<u32>,
    pub piezo_cal_off_amp: Option<u32>,
    pub piezo_cal_fac_mount: Option<u32>,
    pub piezo_cal_off_mount: Option<u32>,
    #[serde(rename = "pt100Cal0C")]
    pub pt100_cal_0c: Option<u32>,
    #[serde(rename = "pt100Cal250C")]
    pub pt100_cal_250c: Option<u32>,
    pub pt100_cal_fac_sensor: Option<u32>,
    pub pt100_cal_off_sensor: Option<u32>,
    pub pt100_cal_fac_amp: Option<u32>,
    pub pt100_cal_off_amp: Option<u32>,
    pub pt100_cal_fac_mount: Option<u32>,
    pub pt100_cal_off_mount: Option<u32>,
}

impl InputRecord {
    /// True when the counter-reset column holds the literal "TRUE"
    /// (case-insensitive).
    pub fn counter_reset_requested(&self) -> bool {
        flag_is_true(self.counter_reset.as_deref())
    }

    /// True when the request-config column holds the literal "TRUE"
    /// (case-insensitive).
    pub fn request_config_requested(&self) -> bool {
        flag_is_true(self.request_config.as_deref())
    }
}

fn flag_is_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("TRUE"))
}

/// A devEUI is 16 hex digits, case-insensitive.
pub fn is_valid_dev_eui(value: &str) -> bool {
    value.len() == 16 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

// --- Output ---

/// Extra key/value fields merged into every emitted downlink.
pub type AdditionalData = BTreeMap<String, serde_json::Value>;

/// One binary command addressed to a device port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Downlink {
    pub port: u8,
    /// Lowercase hex digits, big-endian byte order unless a field is
    /// explicitly byte-reversed.
    pub payload: String,
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: AdditionalData,
}

impl Downlink {
    pub fn new(port: u8, payload: impl Into<String>) -> Self {
        Downlink {
            port,
            payload: payload.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Merge statically-configured extra fields; later merges win.
    pub fn with_extra(mut self, extra: &AdditionalData) -> Self {
        for (key, value) in extra {
            self.extra.insert(key.clone(), value.clone());
        }
        self
    }
}

/// Per-device result: whether a configuration matched, and the ordered
/// downlink sequence (empty when it did not).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSetup {
    pub valid: bool,
    pub downlinks: Vec<Downlink>,
}

pub type DeviceMap = BTreeMap<String, DeviceSetup>;
pub type GroupMap = BTreeMap<String, DeviceMap>;

/// Bucket for records without a server column.
pub const SERVERLESS: &str = "_serverless";
/// Bucket for records without a group column.
pub const GROUPLESS: &str = "_groupless";

/// Three-level output mapping: server -> group -> devEUI -> setup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Output {
    pub servers: BTreeMap<String, GroupMap>,
}

impl Output {
    /// Insert one device result, falling back to the sentinel buckets
    /// when server or group are absent.
    pub fn insert(
        &mut self,
        server: Option<&str>,
        group: Option<&str>,
        dev_eui: &str,
        setup: DeviceSetup,
    ) {
        let server = server.unwrap_or(SERVERLESS);
        let group = group.unwrap_or(GROUPLESS);
        self.servers
            .entry(server.to_owned())
            .or_default()
            .entry(group.to_owned())
            .or_default()
            .insert(dev_eui.to_owned(), setup);
    }
}

// --- Encoding knobs ---

/// Requested payload encoding. Only `HexString` is implemented; the
/// other two are recognized so the settings sheet can name them, and
/// fail with an explicit error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PayloadFormat {
    Uint8Array,
    #[default]
    HexString,
    Base64String,
}
