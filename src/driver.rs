//! Configuration sequence and the interactive loop around it.

use crate::catalog::{minutes_to_tdc, parameter_table, parse_minutes};
use crate::constants::*;
use crate::error::Result;
use crate::transport::{Link, SerialLink, Session};
use crate::types::{DataRate, DeviceType, Job, NextAction};
use log::info;

const SEPARATOR: &str = "---------------------------------";

/// Source of the operator's choices
pub trait Prompter {
    fn select_device(&mut self) -> Result<DeviceType>;

    /// Minutes between LoRa transmissions, as typed
    fn interval_minutes(&mut self) -> Result<String>;

    /// Choose one of `offered`
    fn select_data_rate(&mut self, offered: &[DataRate]) -> Result<DataRate>;

    fn next_action(&mut self) -> Result<NextAction>;
}

/// Query and show the device EUI so the operator can tell units apart
pub fn show_identity<L: Link>(session: &mut Session<L>) -> Result<String> {
    session.echo_line("")?;
    session.echo_line(SEPARATOR)?;
    let response = session.try_command(CMD_QUERY_DEUI, None)?;
    session.echo_line(SEPARATOR)?;
    session.echo_line("")?;
    Ok(response)
}

/// Factory-reset the gateway, program it for `job`, reboot, and report.
///
/// Returns the `AT+CFG` response.
pub fn configure_unit<L: Link>(session: &mut Session<L>, job: &Job) -> Result<String> {
    info!(
        "Configuring {} (tdc {} ms, DR{})",
        job.device.tag(),
        job.tdc_ms,
        job.data_rate.code()
    );

    session.set_timeout(FACTORY_RESET_TIMEOUT_SECS);
    session.try_command(CMD_FACTORY_RESET, None)?;

    session.set_timeout(SET_PARAM_TIMEOUT_SECS);
    session.set_at(PARAM_ERASE_COMMANDS, ERASE_COMMANDS_RANGE)?;

    for param in parameter_table(job) {
        session.set_at(param.name, param.value)?;
    }

    session.set_timeout(REBOOT_TIMEOUT_SECS);
    session.try_command(CMD_REBOOT, None)?;
    session.set_timeout(QUERY_TIMEOUT_SECS);

    session.echo_line("--------------------------------------")?;
    let report = session.try_command(CMD_SHOW_CONFIG, Some(&CONFIG_REPORT_FILTER[..]))?;
    info!("{} configured", job.device.tag());
    Ok(report)
}

/// Configure a single unit and close the session
pub fn configure_once<L: Link>(mut session: Session<L>, job: &Job) -> Result<String> {
    show_identity(&mut session)?;
    let report = configure_unit(&mut session, job)?;
    session.close()?;
    Ok(report)
}

/// Where the interactive loop stands
#[derive(Debug, Clone, PartialEq)]
pub enum DriverState {
    AwaitDeviceSelection,
    AwaitRateSelection { device: DeviceType, tdc_ms: u32 },
    Configuring(Job),
    AwaitNextAction(Job),
    Closed,
}

/// Interactive loop configuring one unit after another until the operator quits
pub struct Driver<P: Prompter, L: Link = SerialLink> {
    session: Session<L>,
    prompter: P,
    state: DriverState,
}

impl<P: Prompter, L: Link> Driver<P, L> {
    pub fn new(session: Session<L>, prompter: P) -> Self {
        Driver {
            session,
            prompter,
            state: DriverState::AwaitDeviceSelection,
        }
    }

    pub fn state(&self) -> &DriverState {
        &self.state
    }

    /// Run until the operator quits, then close the session
    pub fn run(mut self) -> Result<()> {
        while self.state != DriverState::Closed {
            self.step()?;
        }
        self.session.close()
    }

    fn step(&mut self) -> Result<()> {
        self.state = match &self.state {
            DriverState::AwaitDeviceSelection => {
                show_identity(&mut self.session)?;
                let device = self.prompter.select_device()?;
                let minutes = parse_minutes(&self.prompter.interval_minutes()?)?;
                DriverState::AwaitRateSelection {
                    device,
                    tdc_ms: minutes_to_tdc(minutes),
                }
            }
            DriverState::AwaitRateSelection { device, tdc_ms } => {
                let data_rate = self.prompter.select_data_rate(device.data_rates())?;
                DriverState::Configuring(Job::new(*device, *tdc_ms, data_rate))
            }
            DriverState::Configuring(job) => {
                let job = *job;
                configure_unit(&mut self.session, &job)?;
                DriverState::AwaitNextAction(job)
            }
            DriverState::AwaitNextAction(job) => {
                let job = *job;
                match self.prompter.next_action()? {
                    NextAction::Repeat => {
                        show_identity(&mut self.session)?;
                        DriverState::Configuring(job)
                    }
                    NextAction::ChangeInputs => DriverState::AwaitDeviceSelection,
                    NextAction::Quit => DriverState::Closed,
                }
            }
            DriverState::Closed => DriverState::Closed,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::mock_serial::{line, EchoBuffer, ScriptedLink};
    use std::collections::VecDeque;
    use std::time::Duration;

    #[derive(Default)]
    struct ScriptedPrompter {
        devices: VecDeque<DeviceType>,
        minutes: VecDeque<&'static str>,
        rates: VecDeque<DataRate>,
        actions: VecDeque<NextAction>,
        offered: Vec<Vec<DataRate>>,
    }

    impl Prompter for ScriptedPrompter {
        fn select_device(&mut self) -> Result<DeviceType> {
            self.devices
                .pop_front()
                .ok_or_else(|| ConfigError::Prompt("no device scripted".to_string()))
        }

        fn interval_minutes(&mut self) -> Result<String> {
            self.minutes
                .pop_front()
                .map(str::to_string)
                .ok_or_else(|| ConfigError::Prompt("no interval scripted".to_string()))
        }

        fn select_data_rate(&mut self, offered: &[DataRate]) -> Result<DataRate> {
            self.offered.push(offered.to_vec());
            self.rates
                .pop_front()
                .ok_or_else(|| ConfigError::Prompt("no rate scripted".to_string()))
        }

        fn next_action(&mut self) -> Result<NextAction> {
            self.actions
                .pop_front()
                .ok_or_else(|| ConfigError::Prompt("no action scripted".to_string()))
        }
    }

    fn session(link: &ScriptedLink) -> (Session<ScriptedLink>, EchoBuffer) {
        let echo = EchoBuffer::default();
        (Session::new(link.clone(), Box::new(echo.clone())), echo)
    }

    fn tmag_job() -> Job {
        Job::new(DeviceType::Tmag, minutes_to_tdc(10.0), DataRate::LongDistance)
    }

    const TMAG_WRITES: [&str; 14] = [
        "AT+FDR",
        "AT+CMDEAR=1,9",
        "AT+CHE=2",
        "AT+TDC=600000",
        "AT+MBFUN=1",
        "AT+DR=1",
        "AT+ADR=0",
        "AT+PAYVER=1",
        "AT+COMMAND1=01 04 10 10 00 02,1",
        "AT+CMDDL1=1000",
        "AT+COMMAND2=01 04 10 26 00 08,1",
        "AT+CMDDL2=1000",
        "ATZ",
        "AT+CFG",
    ];

    #[test]
    fn test_configure_unit_sends_tmag_sequence() {
        let link = ScriptedLink::new();
        let (mut session, _) = session(&link);

        configure_unit(&mut session, &tmag_job()).unwrap();

        assert_eq!(link.written(), TMAG_WRITES);
        // cmdear plus one clear per table entry
        assert_eq!(link.clears(), 11);
    }

    #[test]
    fn test_configure_unit_timeouts() {
        let link = ScriptedLink::new();
        let (mut session, _) = session(&link);

        configure_unit(&mut session, &tmag_job()).unwrap();

        let timeouts = link.read_timeouts();
        assert_eq!(timeouts.first(), Some(&Duration::from_secs(2)));
        assert_eq!(timeouts[1], Duration::from_millis(500));
        assert_eq!(timeouts[timeouts.len() - 2], Duration::from_secs(12));
        assert_eq!(timeouts.last(), Some(&Duration::from_secs(3)));
        assert_eq!(session.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_config_report_is_filtered() {
        let link = ScriptedLink::new();
        link.respond(
            "AT+CFG",
            [
                line("AT+DEUI=A8 40 41 00 00 00 00 01"),
                line("AT+NJM=1"),
                line("AT+TDC=600000"),
                line("AT+COMMAND1=01 04 10 10 00 02,1"),
            ],
        );
        let (mut session, echo) = session(&link);

        let report = configure_unit(&mut session, &tmag_job()).unwrap();

        assert_eq!(report.lines().count(), 4);
        let shown = echo.lines();
        let tail = &shown[shown.len() - 3..];
        assert_eq!(
            tail,
            [
                "AT+DEUI=A8 40 41 00 00 00 00 01",
                "AT+TDC=600000",
                "AT+COMMAND1=01 04 10 10 00 02,1"
            ]
        );
        assert!(!shown.iter().any(|l| l == "AT+NJM=1"));
    }

    #[test]
    fn test_configure_once_queries_identity_and_closes() {
        let link = ScriptedLink::new();
        link.respond("AT+DEUI=?", [line("A8 40 41 00 00 00 00 01")]);
        let (session, echo) = session(&link);

        configure_once(session, &tmag_job()).unwrap();

        let written = link.written();
        assert_eq!(written[0], "AT+DEUI=?");
        assert_eq!(written[1..], TMAG_WRITES);
        assert!(echo.lines().iter().any(|l| l == "A8 40 41 00 00 00 00 01"));
    }

    #[test]
    fn test_driver_prompts_then_configures() {
        let link = ScriptedLink::new();
        let (session, _) = session(&link);
        let prompter = ScriptedPrompter {
            devices: [DeviceType::Micro820].into(),
            minutes: ["1.5"].into(),
            rates: [DataRate::InBuilding].into(),
            ..Default::default()
        };
        let mut driver = Driver::new(session, prompter);

        driver.step().unwrap();
        assert_eq!(
            driver.state(),
            &DriverState::AwaitRateSelection {
                device: DeviceType::Micro820,
                tdc_ms: 90_000
            }
        );
        assert_eq!(link.written(), ["AT+DEUI=?"]);

        driver.step().unwrap();
        let job = Job::new(DeviceType::Micro820, 90_000, DataRate::InBuilding);
        assert_eq!(driver.state(), &DriverState::Configuring(job));
        assert_eq!(
            driver.prompter.offered,
            [vec![DataRate::MediumDistance, DataRate::InBuilding]]
        );

        driver.step().unwrap();
        assert_eq!(driver.state(), &DriverState::AwaitNextAction(job));
        let written = link.written();
        assert!(written.contains(&"AT+BAUDR=19200".to_string()));
        assert!(written.contains(&"AT+DR=3".to_string()));
        assert_eq!(written.last().map(String::as_str), Some("AT+CFG"));
    }

    #[test]
    fn test_driver_repeat_reuses_inputs() {
        let link = ScriptedLink::new();
        let (session, _) = session(&link);
        let prompter = ScriptedPrompter {
            devices: [DeviceType::Tmag].into(),
            minutes: ["10"].into(),
            rates: [DataRate::LongDistance].into(),
            actions: [NextAction::Repeat, NextAction::Quit].into(),
            ..Default::default()
        };

        Driver::new(session, prompter).run().unwrap();

        let written = link.written();
        let identity_queries = written.iter().filter(|w| *w == "AT+DEUI=?").count();
        let resets = written.iter().filter(|w| *w == "AT+FDR").count();
        assert_eq!(identity_queries, 2);
        assert_eq!(resets, 2);
        assert_eq!(written.iter().filter(|w| *w == "AT+TDC=600000").count(), 2);
    }

    #[test]
    fn test_driver_change_inputs_prompts_again() {
        let link = ScriptedLink::new();
        let (session, _) = session(&link);
        let prompter = ScriptedPrompter {
            devices: [DeviceType::Tmag, DeviceType::Pzem].into(),
            minutes: ["10", "5"].into(),
            rates: [DataRate::LongDistance, DataRate::MediumDistance].into(),
            actions: [NextAction::ChangeInputs, NextAction::Quit].into(),
            ..Default::default()
        };

        Driver::new(session, prompter).run().unwrap();

        let written = link.written();
        assert!(written.contains(&"AT+PAYVER=1".to_string()));
        assert!(written.contains(&"AT+PAYVER=9".to_string()));
        assert!(written.contains(&"AT+TDC=300000".to_string()));
        assert!(written.contains(&"AT+DR=2".to_string()));
    }

    #[test]
    fn test_driver_quit_closes() {
        let link = ScriptedLink::new();
        let (session, _) = session(&link);
        let prompter = ScriptedPrompter {
            actions: [NextAction::Quit].into(),
            ..Default::default()
        };
        let mut driver = Driver::new(session, prompter);
        driver.state = DriverState::AwaitNextAction(tmag_job());

        driver.step().unwrap();
        assert_eq!(driver.state(), &DriverState::Closed);
        driver.step().unwrap();
        assert_eq!(driver.state(), &DriverState::Closed);
        assert!(link.written().is_empty());
    }

    #[test]
    fn test_driver_rejects_bad_interval() {
        let link = ScriptedLink::new();
        let (session, _) = session(&link);
        let prompter = ScriptedPrompter {
            devices: [DeviceType::Ef40].into(),
            minutes: ["soon"].into(),
            ..Default::default()
        };

        let result = Driver::new(session, prompter).run();
        assert!(matches!(result, Err(ConfigError::InvalidInterval(text)) if text == "soon"));
        assert!(!link.written().contains(&"AT+FDR".to_string()));
    }
}
