//! Protocol constants for the RS485-LN AT command console.
//!
//! Timeouts here are quiescence windows: a response is considered complete
//! once the link has been silent for the active window.

/// Default console baud rate
pub const BAUD_RATE: u32 = 9600;

/// Read timeout in effect right after opening the port
pub const DEFAULT_TIMEOUT_SECS: f64 = 1.0;

/// Timeout while the gateway restores factory defaults
pub const FACTORY_RESET_TIMEOUT_SECS: f64 = 2.0;

/// Timeout for individual parameter writes
pub const SET_PARAM_TIMEOUT_SECS: f64 = 0.5;

/// Timeout across `ATZ`; the gateway reboots slowly
pub const REBOOT_TIMEOUT_SECS: f64 = 12.0;

/// Timeout restored after reboot, used for `AT+CFG` and the next unit
pub const QUERY_TIMEOUT_SECS: f64 = 3.0;

/// Fraction of the timeout a read must take before an empty line counts as silence
pub const QUIESCENCE_FACTOR: f64 = 0.9;

/// Command line terminator
pub const LINE_TERMINATOR: &str = "\r\n";

/// Substring the gateway prints when a command is rejected for lack of login
pub const AUTH_FAILURE_MARKER: &str = "Incorrect";

/// Factory login password
pub const LOGIN_SECRET: &str = "123456";

/// Attempts per command, counting the one after login
pub const MAX_ATTEMPTS: usize = 2;

/// Query the device EUI
pub const CMD_QUERY_DEUI: &str = "AT+DEUI=?";

/// Restore factory defaults
pub const CMD_FACTORY_RESET: &str = "AT+FDR";

/// Reboot and apply
pub const CMD_REBOOT: &str = "ATZ";

/// Dump the full configuration
pub const CMD_SHOW_CONFIG: &str = "AT+CFG";

/// Parameter that erases stored MODBUS command slots
pub const PARAM_ERASE_COMMANDS: &str = "cmdear";

/// Slot range erased before programming
pub const ERASE_COMMANDS_RANGE: &str = "1,9";

/// `AT+CFG` lines worth showing to the operator
pub const CONFIG_REPORT_FILTER: [&str; 12] = [
    "ADR", "+DR", "+TDC", "+VER", "MBFUN", "PAYVER", "+CHE", "COMMAND", "BAUDR", "DEUI", "APPEUI",
    "APPKEY",
];

/// Settings file looked up in the working directory when `--config` is absent
pub const DEFAULT_SETTINGS_FILE: &str = "rs485-ln.json";
