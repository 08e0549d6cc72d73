use crate::constants::*;
use crate::error::{ConfigError, Result};
use log::{debug, info, warn};
use serialport::{ClearBuffer, DataBits, Parity, SerialPort, StopBits};
use std::fmt::Display;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

/// Byte-level link under a [`Session`]
pub trait Link {
    /// Read up to and including the next `\n`, giving up once `timeout` has passed.
    ///
    /// Returns whatever arrived, which may be a partial line or nothing.
    fn read_line(&mut self, timeout: Duration) -> io::Result<Vec<u8>>;

    /// Write bytes to the device
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Discard input received but not yet read
    fn clear_input(&mut self) -> Result<()>;

    /// Clock used to time read attempts
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Serial port link (8N1)
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    /// Open the gateway's console port
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(secs_to_duration(DEFAULT_TIMEOUT_SECS))
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .open()
            .map_err(|source| ConfigError::PortUnavailable {
                port: port_name.to_string(),
                source,
            })?;
        Ok(SerialLink { port })
    }
}

impl Link for SerialLink {
    fn read_line(&mut self, timeout: Duration) -> io::Result<Vec<u8>> {
        let start = Instant::now();
        let mut line = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            let remaining = match timeout.checked_sub(start.elapsed()) {
                Some(remaining) if !remaining.is_zero() => remaining,
                _ => break,
            };
            self.port.set_timeout(remaining)?;

            match self.port.read(&mut byte) {
                Ok(0) => continue,
                Ok(_) => {
                    line.push(byte[0]);
                    if byte[0] == b'\n' {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) => return Err(e),
            }
        }

        Ok(line)
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }

    fn clear_input(&mut self) -> Result<()> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }
}

/// An open AT command session with the RS485-LN
pub struct Session<L: Link = SerialLink> {
    link: L,
    timeout: Duration,
    echo: Box<dyn Write>,
    login_secret: String,
}

impl Session<SerialLink> {
    /// Open the port and drain whatever the gateway printed before we connected
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self> {
        debug!("Opening {} at {} baud", port_name, baud_rate);
        Session::connect(SerialLink::open(port_name, baud_rate)?, Box::new(io::stdout()))
    }

    /// List available serial ports
    pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>> {
        Ok(serialport::available_ports()?)
    }
}

impl<L: Link> Session<L> {
    /// Wrap an already open link; responses are echoed to `echo`
    pub fn new(link: L, echo: Box<dyn Write>) -> Self {
        Session {
            link,
            timeout: secs_to_duration(DEFAULT_TIMEOUT_SECS),
            echo,
            login_secret: LOGIN_SECRET.to_string(),
        }
    }

    /// Wrap a freshly opened link and consume its startup banner.
    ///
    /// The banner is read once at the default timeout and echoed, so it
    /// never leaks into the first command's response.
    pub fn connect(link: L, echo: Box<dyn Write>) -> Result<Self> {
        let mut session = Session::new(link, echo);
        let banner = session.read_all(None)?;
        debug!("Startup banner: {:?}", banner);
        Ok(session)
    }

    /// Use a password other than the factory default
    pub fn with_login_secret(mut self, secret: &str) -> Self {
        self.login_secret = secret.to_string();
        self
    }

    /// Set the quiescence timeout for all following reads
    pub fn set_timeout(&mut self, seconds: f64) {
        self.timeout = secs_to_duration(seconds);
    }

    /// Quiescence timeout currently in effect
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Print a line to the operator
    pub fn echo_line(&mut self, text: &str) -> Result<()> {
        writeln!(self.echo, "{}", text)?;
        Ok(())
    }

    /// Collect lines until the link stays silent for a full timeout.
    ///
    /// Silence is judged per read attempt: an empty read that took at least
    /// 90% of the timeout ends the response, so a reply trickling in line by
    /// line can run far past the timeout in total. Lines are echoed as they
    /// arrive, limited to those containing a `filter` substring when given.
    pub fn read_all(&mut self, filter: Option<&[&str]>) -> Result<String> {
        let mut lines: Vec<String> = Vec::new();

        loop {
            let started = self.link.now();
            let raw = self.link.read_line(self.timeout)?;
            let elapsed = self.link.now().saturating_duration_since(started);
            let line = String::from_utf8_lossy(&raw).trim().to_string();

            if line.is_empty() {
                if elapsed.as_secs_f64() > self.timeout.as_secs_f64() * QUIESCENCE_FACTOR {
                    return Ok(lines.join("\n"));
                }
                if lines.is_empty() {
                    continue;
                }
            } else {
                debug!("RX: {}", line);
                if passes_filter(&line, filter) {
                    writeln!(self.echo, "{}", line)?;
                }
            }
            lines.push(line);
        }
    }

    /// Send a command and collect its response, logging in once if refused.
    ///
    /// A response that still carries the auth failure marker after the retry
    /// is returned as is.
    pub fn try_command(&mut self, cmd: &str, filter: Option<&[&str]>) -> Result<String> {
        let mut attempt = 1;
        loop {
            writeln!(self.echo, "Sending: {}", cmd)?;
            debug!("TX: {}", cmd);
            self.send_line(cmd)?;

            let response = self.read_all(filter)?;
            if !response.contains(AUTH_FAILURE_MARKER) {
                return Ok(response);
            }
            if attempt >= MAX_ATTEMPTS {
                warn!("{} still refused after login", cmd);
                return Ok(response);
            }

            info!("Gateway asked for login, retrying {}", cmd);
            debug!("TX: <login secret>");
            let login = format!("{}{}", self.login_secret, LINE_TERMINATOR);
            self.link.send(login.as_bytes())?;
            self.read_all(None)?;
            attempt += 1;
        }
    }

    /// Write `AT+<NAME>=<value>` after discarding stale input
    pub fn set_at(&mut self, name: &str, value: impl Display) -> Result<String> {
        self.link.clear_input()?;
        let cmd = format!("AT+{}={}", name.to_uppercase(), value);
        self.try_command(&cmd, None)
    }

    /// Release the port
    pub fn close(mut self) -> Result<()> {
        self.echo.flush()?;
        info!("Closing serial session");
        Ok(())
    }

    fn send_line(&mut self, text: &str) -> Result<()> {
        let line = format!("{}{}", text, LINE_TERMINATOR);
        self.link.send(line.as_bytes())?;
        Ok(())
    }
}

/// Whether a response line should be echoed
fn passes_filter(line: &str, filter: Option<&[&str]>) -> bool {
    match filter {
        Some(substrings) => substrings.iter().any(|substr| line.contains(substr)),
        None => true,
    }
}

fn secs_to_duration(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO)
}
