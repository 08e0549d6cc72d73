//! Terminal prompts backed by `inquire`.

use inquire::{InquireError, Select, Text};
use serialport::SerialPortInfo;

use crate::driver::Prompter;
use crate::error::{ConfigError, Result};
use crate::types::{DataRate, DeviceType, NextAction};

/// Asks the operator at the terminal; every menu defaults to its first entry
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn select_device(&mut self) -> Result<DeviceType> {
        Select::new("Select MODBUS Device:", DeviceType::ALL.to_vec())
            .prompt()
            .map_err(prompt_error)
    }

    fn interval_minutes(&mut self) -> Result<String> {
        Text::new("Enter Minutes between LoRa Transmissions:")
            .with_default("10")
            .prompt()
            .map_err(prompt_error)
    }

    fn select_data_rate(&mut self, offered: &[DataRate]) -> Result<DataRate> {
        Select::new("Select Data Rate for Sensors:", offered.to_vec())
            .prompt()
            .map_err(prompt_error)
    }

    fn next_action(&mut self) -> Result<NextAction> {
        Select::new("What do You want to Do Next?", NextAction::ALL.to_vec())
            .prompt()
            .map_err(prompt_error)
    }
}

/// Interactive serial port selection
pub fn select_port(ports: &[SerialPortInfo]) -> Result<String> {
    if ports.is_empty() {
        return Err(ConfigError::MissingPort);
    }

    let port_names: Vec<String> = ports
        .iter()
        .map(|p| format!("{} - {:?}", p.port_name, p.port_type))
        .collect();

    let selection = Select::new("Select the RS485-LN serial port:", port_names)
        .prompt()
        .map_err(prompt_error)?;

    Ok(port_name_of(&selection).to_string())
}

/// Port name from a `"<name> - <type>"` menu entry
fn port_name_of(selection: &str) -> &str {
    selection.split(" - ").next().unwrap_or(selection)
}

fn prompt_error(e: InquireError) -> ConfigError {
    ConfigError::Prompt(e.to_string())
}
