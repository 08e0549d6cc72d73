//! MODBUS command tables for each supported device.
//!
//! Each table programs the gateway's payload version, the raw MODBUS RTU
//! request frames it should poll (`commandN`, hex bytes followed by a flag)
//! and the receive delay for each frame (`cmddlN`). A common table precedes
//! every device table.

use crate::error::{ConfigError, Result};
use crate::types::{DataRate, DeviceType, Job, Param};

/// Register addresses in the T-Mag manual are 0-based; function code 4.
const TMAG: &[Param] = &[
    Param::int("payver", 1),
    Param::text("command1", "01 04 10 10 00 02,1"),
    Param::int("cmddl1", 1000),
    Param::text("command2", "01 04 10 26 00 08,1"),
    Param::int("cmddl2", 1000),
];

/// Function code 3; manual addresses are 1-based and shifted down by one here.
const EF40: &[Param] = &[
    Param::int("payver", 2),
    Param::text("command1", "01 03 00 00 00 04,1"),
    Param::int("cmddl1", 1000),
    Param::text("command2", "01 03 00 10 00 04,1"),
    Param::int("cmddl2", 1000),
    Param::text("command3", "01 03 00 20 00 04,1"),
    Param::int("cmddl3", 1000),
];

const MICRO820: &[Param] = &[
    Param::int("payver", 99),
    Param::int("baudr", 19200),
    Param::text("command1", "01 01 00 00 00 0c,1"),
    Param::int("cmddl1", 1000),
    Param::text("command2", "01 03 00 00 00 28,1"),
    Param::int("cmddl2", 1000),
];

/// Sensor DIP switches all 0 except switch 1.
const WATTNODE: &[Param] = &[
    Param::int("payver", 3),
    Param::text("command1", "01 03 03 f0 00 1a,1"),
    Param::int("cmddl1", 1000),
    Param::text("command2", "01 03 04 72 00 08,1"),
    Param::int("cmddl2", 1000),
    Param::text("command3", "01 03 04 8a 00 06,1"),
    Param::int("cmddl3", 1000),
];

const PZEM: &[Param] = &[
    Param::int("payver", 9),
    Param::text("command1", "01 04 00 00 00 09,1"),
    Param::int("cmddl1", 1000),
];

/// Device-specific parameter table
pub fn device_table(device: DeviceType) -> &'static [Param] {
    match device {
        DeviceType::Tmag => TMAG,
        DeviceType::Ef40 => EF40,
        DeviceType::Micro820 => MICRO820,
        DeviceType::Wattnode => WATTNODE,
        DeviceType::Pzem => PZEM,
    }
}

/// Parameters written for every device, before the device table
pub fn common_table(tdc_ms: u32, data_rate: DataRate) -> [Param; 5] {
    [
        Param::int("che", 2),
        Param::int("tdc", tdc_ms),
        Param::int("mbfun", 1),
        Param::int("dr", u32::from(data_rate.code())),
        Param::int("adr", 0),
    ]
}

/// Full write sequence for a job: common table then device table.
///
/// Duplicated names are kept; the last write sent wins on the device.
pub fn parameter_table(job: &Job) -> Vec<Param> {
    let mut table = common_table(job.tdc_ms, job.data_rate).to_vec();
    table.extend_from_slice(device_table(job.device));
    table
}

/// Convert a transmit interval in minutes to the `tdc` value in milliseconds
pub fn minutes_to_tdc(minutes: f64) -> u32 {
    (minutes * 60_000.0).round() as u32
}

/// Parse operator-entered minutes
pub fn parse_minutes(text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidInterval(text.to_string()))
}
