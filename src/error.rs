//! Error types for RS485-LN configuration.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Error types for gateway configuration.
///
/// Device responses are never turned into errors; a rejected command comes
/// back as response text containing the device's own error phrase.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The serial device could not be opened
    #[error("Serial port {port} unavailable: {source}")]
    PortUnavailable {
        /// Port identifier that failed to open
        port: String,
        /// Underlying serial port error
        #[source]
        source: serialport::Error,
    },

    /// Serial port control error (buffer clear, enumeration)
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transmit interval entry was not a number
    #[error("Invalid transmit interval: {0:?} is not a number of minutes")]
    InvalidInterval(String),

    /// Device tag not present in the catalog
    #[error("Unknown device type: {0}")]
    UnknownDevice(String),

    /// Data rate code outside the offered set
    #[error("Unsupported data rate: {0}")]
    UnsupportedDataRate(u8),

    /// Interactive prompt cancelled or failed
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Settings file unreadable or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No serial port named on the command line, in settings or by selection
    #[error("No serial port given. For example: configure-rs485 COM4")]
    MissingPort,
}
