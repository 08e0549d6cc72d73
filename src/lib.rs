//! # RS485-LN Configurator
//!
//! Configures a Dragino RS485-LN LoRaWAN-to-RS485 gateway, over its AT
//! command console, to poll a MODBUS RTU sensor and forward the readings.
//!
//! ## Supported devices
//!
//! - Spire T-Mag BTU meter
//! - Spire EF-40 BTU meter
//! - Micro820 PLC
//! - WattNode MODBUS power sensor (WND-WR-MB)
//! - Peacefair PZEM-016 electrical power sensor
//!
//! ## Example
//!
//! ```no_run
//! use rs485_ln_config::{configure_once, DataRate, DeviceType, Job, Session};
//! use rs485_ln_config::catalog::minutes_to_tdc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::open("/dev/ttyUSB0", 9600)?;
//!     let job = Job::new(DeviceType::Tmag, minutes_to_tdc(10.0), DataRate::LongDistance);
//!     configure_once(session, &job)?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod prompt;
pub mod transport;
pub mod types;

#[cfg(test)]
mod mock_serial;

pub use config::Settings;
pub use driver::{configure_once, configure_unit, Driver, DriverState, Prompter};
pub use error::{ConfigError, Result};
pub use transport::{Link, SerialLink, Session};
pub use types::*;
