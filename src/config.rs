//! Optional JSON settings file.
//!
//! ```json
//! { "port": "/dev/ttyUSB0", "baud_rate": 9600, "login_secret": "123456" }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{BAUD_RATE, DEFAULT_SETTINGS_FILE, LOGIN_SECRET};
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Serial port used when none is given on the command line
    pub port: Option<String>,
    pub baud_rate: u32,
    pub login_secret: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: BAUD_RATE,
            login_secret: LOGIN_SECRET.to_string(),
        }
    }
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ConfigError::Config(e.to_string()))
    }

    /// Load `path`, or `rs485-ln.json` in the working directory if present.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_SETTINGS_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = fs::read_to_string(&path)
            .map_err(|e| ConfigError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Command-line port wins over the configured one
    pub fn resolve_port(&self, cli_port: Option<String>) -> Option<String> {
        cli_port.or_else(|| self.port.clone())
    }
}
