//! Configure a Dragino RS485-LN to read one of the supported MODBUS devices.
//!
//! Usage:
//!   configure-rs485 COM4                  # Interactive mode
//!   configure-rs485 /dev/ttyUSB0 --device tmag --minutes 10 --data-rate 1
//!   configure-rs485 --device pzem --minutes 5 --data-rate 2 --dry-run
//!
//! Set RUST_LOG environment variable to control logging:
//!   RUST_LOG=debug configure-rs485 COM4

use clap::Parser;
use log::info;
use rs485_ln_config::catalog::{minutes_to_tdc, parameter_table, parse_minutes};
use rs485_ln_config::prompt::{select_port, InquirePrompter};
use rs485_ln_config::{
    configure_once, ConfigError, DataRate, DeviceType, Driver, Job, Result, Session, Settings,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "configure-rs485")]
#[command(about = "Configure a Dragino RS485-LN to poll a MODBUS RTU sensor")]
struct Args {
    /// Serial port of the RS485-LN (e.g., /dev/ttyUSB0 or COM4)
    port: Option<String>,

    /// Settings file (defaults to ./rs485-ln.json when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device tag: tmag, ef40, micro820, wattnode or pzem
    #[arg(short, long, value_parser = parse_device, requires_all = ["minutes", "data_rate"])]
    device: Option<DeviceType>,

    /// Minutes between LoRa transmissions
    #[arg(short, long, requires_all = ["device", "data_rate"])]
    minutes: Option<String>,

    /// LoRa data rate code (1 = SF9, 2 = SF8, 3 = SF7)
    #[arg(short = 'r', long, value_parser = parse_data_rate, requires_all = ["device", "minutes"])]
    data_rate: Option<DataRate>,

    /// Print the parameter table as JSON instead of configuring
    #[arg(long, requires = "device")]
    dry_run: bool,

    /// List serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

fn parse_device(s: &str) -> std::result::Result<DeviceType, String> {
    s.parse().map_err(|e: ConfigError| e.to_string())
}

fn parse_data_rate(s: &str) -> std::result::Result<DataRate, String> {
    let code: u8 = s
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| e.to_string())?;
    DataRate::from_code(code).map_err(|e| e.to_string())
}

/// Job from the command line, when all of its inputs were given.
///
/// The data rate must be one the interactive menu would offer for the device.
fn job_from_args(args: &Args) -> Result<Option<Job>> {
    match (args.device, &args.minutes, args.data_rate) {
        (Some(device), Some(minutes), Some(data_rate)) => {
            if !device.data_rates().contains(&data_rate) {
                return Err(ConfigError::UnsupportedDataRate(data_rate.code()));
            }
            let tdc_ms = minutes_to_tdc(parse_minutes(minutes)?);
            Ok(Some(Job::new(device, tdc_ms, data_rate)))
        }
        _ => Ok(None),
    }
}

fn main() -> Result<()> {
    // Initialize logger with default info level if RUST_LOG is not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.list_ports {
        for port in Session::list_ports()? {
            println!("{} - {:?}", port.port_name, port.port_type);
        }
        return Ok(());
    }

    let job = job_from_args(&args)?;

    if args.dry_run {
        if let Some(job) = job {
            println!("{}", serde_json::to_string_pretty(&parameter_table(&job))?);
        }
        return Ok(());
    }

    let settings = Settings::load(args.config.as_deref())?;
    let port_name = match settings.resolve_port(args.port) {
        Some(port_name) => port_name,
        None => select_port(&Session::list_ports()?)?,
    };

    info!("Connecting to RS485-LN on {}...", port_name);
    let session =
        Session::open(&port_name, settings.baud_rate)?.with_login_secret(&settings.login_secret);

    match job {
        Some(job) => {
            configure_once(session, &job)?;
        }
        None => Driver::new(session, InquirePrompter).run()?,
    }

    info!("Done");
    Ok(())
}
