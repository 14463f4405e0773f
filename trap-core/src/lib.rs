//! Configuration matching and downlink encoding for LoRaWAN steam-trap
//! monitoring sensors.
//!
//! Takes a device's commissioning parameters, selects the applicable
//! calibration row from the ruleset table, and encodes the ordered
//! sequence of binary downlink commands the device needs at
//! installation time.

pub mod batch;
pub mod builder;
pub mod hex;
pub mod matcher;
pub mod ptmap;
pub mod types;

pub use batch::{run_batch, BatchError, BatchReport, ErrorPolicy};
pub use builder::{build_downlinks, BuildError, DownlinkOptions};
pub use matcher::match_config;
pub use ptmap::nearest;
pub use types::*;
