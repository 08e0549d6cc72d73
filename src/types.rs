use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, Result};

/// MODBUS devices the gateway can be programmed to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    /// Spire T-Mag BTU meter
    Tmag,
    /// Spire EF-40 BTU meter
    Ef40,
    /// Allen-Bradley Micro820 PLC
    Micro820,
    /// WattNode WND-WR-MB power sensor
    Wattnode,
    /// Peacefair PZEM-016 electrical power sensor
    Pzem,
}

impl DeviceType {
    /// Every catalog entry, in menu order
    pub const ALL: [DeviceType; 5] = [
        DeviceType::Tmag,
        DeviceType::Ef40,
        DeviceType::Micro820,
        DeviceType::Wattnode,
        DeviceType::Pzem,
    ];

    /// Short tag used on the command line
    pub fn tag(self) -> &'static str {
        match self {
            DeviceType::Tmag => "tmag",
            DeviceType::Ef40 => "ef40",
            DeviceType::Micro820 => "micro820",
            DeviceType::Wattnode => "wattnode",
            DeviceType::Pzem => "pzem",
        }
    }

    /// Menu label
    pub fn label(self) -> &'static str {
        match self {
            DeviceType::Tmag => "Spire T-Mag BTU Meter",
            DeviceType::Ef40 => "Spire EF40 BTU Meter",
            DeviceType::Micro820 => "Micro820 PLC",
            DeviceType::Wattnode => "WattNode MODBUS",
            DeviceType::Pzem => "Peacefair PZEM-016 Power Sensor",
        }
    }

    /// Data rates offered for this device, default first.
    ///
    /// The PLC and WattNode payloads are too large for SF9.
    pub fn data_rates(self) -> &'static [DataRate] {
        match self {
            DeviceType::Micro820 | DeviceType::Wattnode => {
                &[DataRate::MediumDistance, DataRate::InBuilding]
            }
            _ => &[
                DataRate::LongDistance,
                DataRate::MediumDistance,
                DataRate::InBuilding,
            ],
        }
    }
}

impl FromStr for DeviceType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        DeviceType::ALL
            .into_iter()
            .find(|device| device.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownDevice(s.to_string()))
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// LoRa data rate code written to `AT+DR`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataRate {
    /// DR1, SF9
    LongDistance,
    /// DR2, SF8
    MediumDistance,
    /// DR3, SF7
    InBuilding,
}

impl DataRate {
    /// Numeric code sent as `AT+DR=<code>`
    pub fn code(self) -> u8 {
        match self {
            DataRate::LongDistance => 1,
            DataRate::MediumDistance => 2,
            DataRate::InBuilding => 3,
        }
    }

    /// Data rate for a code, rejecting anything outside 1..=3
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(DataRate::LongDistance),
            2 => Ok(DataRate::MediumDistance),
            3 => Ok(DataRate::InBuilding),
            _ => Err(ConfigError::UnsupportedDataRate(code)),
        }
    }
}

impl fmt::Display for DataRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataRate::LongDistance => f.write_str("Long Distance (SF9)"),
            DataRate::MediumDistance => f.write_str("Medium Distance (SF8)"),
            DataRate::InBuilding => f.write_str("In Building (SF7)"),
        }
    }
}

/// Value half of an AT parameter write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(u32),
    Text(&'static str),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(value) => write!(f, "{}", value),
            ParamValue::Text(value) => f.write_str(value),
        }
    }
}

/// One `AT+<NAME>=<VALUE>` write, name in lowercase as the catalog lists it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: &'static str,
    pub value: ParamValue,
}

impl Param {
    pub const fn int(name: &'static str, value: u32) -> Self {
        Param {
            name,
            value: ParamValue::Int(value),
        }
    }

    pub const fn text(name: &'static str, value: &'static str) -> Self {
        Param {
            name,
            value: ParamValue::Text(value),
        }
    }
}

/// Inputs for one configuration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub device: DeviceType,
    /// Transmit interval in milliseconds
    pub tdc_ms: u32,
    pub data_rate: DataRate,
}

impl Job {
    pub fn new(device: DeviceType, tdc_ms: u32, data_rate: DataRate) -> Self {
        Job {
            device,
            tdc_ms,
            data_rate,
        }
    }
}

/// Operator's choice after a unit has been configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// Configure another unit with the same inputs
    Repeat,
    /// Ask for new inputs, then configure another unit
    ChangeInputs,
    /// Close the port and exit
    Quit,
}

impl NextAction {
    pub const ALL: [NextAction; 3] = [
        NextAction::Repeat,
        NextAction::ChangeInputs,
        NextAction::Quit,
    ];
}

impl fmt::Display for NextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextAction::Repeat => f.write_str("Configure another device the same way."),
            NextAction::ChangeInputs => f.write_str("Change inputs and configure another device"),
            NextAction::Quit => f.write_str("Quit"),
        }
    }
}
