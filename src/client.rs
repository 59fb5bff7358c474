//! High-level MC client for communicating with MELSEC PLCs.
//!
//! [`Client`] owns one connection to a PLC and exposes every MC operation
//! as a method. Each method takes care of:
//! - Device parsing and validation for the configured series
//! - Frame construction in binary or ASCII, 3E or 4E
//! - Response reassembly, serial and completion code checks
//! - Typed values for batch and mixed-tag access
//!
//! # Example
//!
//! ```no_run
//! use melsec_mc::{Client, ClientConfig, DataType, Tag, Value};
//! use std::net::Ipv4Addr;
//!
//! let config = ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10));
//! let mut client = Client::new(config)?;
//!
//! // Contiguous access
//! client.batch_write("D0", &[Value::Int(10), Value::Int(20)], DataType::SWord)?;
//! let values = client.batch_read("D0", 2, DataType::SWord, false)?;
//!
//! // Mixed types in one request
//! let results = client.read(&[
//!     Tag::read("D100", DataType::Float),
//!     Tag::read("D102", DataType::SDWord),
//! ])?;
//! # Ok::<(), melsec_mc::McError>(())
//! ```
//!
//! # Configuration
//!
//! [`ClientConfig`] covers:
//! - PLC address, port and protocol (TCP or UDP)
//! - PLC series, transfer mode and frame variant
//! - Access route and monitoring timer
//! - Communication timeout and remote password rule
//!
//! # Thread Safety
//!
//! Every operation takes `&mut self`, so one client carries one request at
//! a time. Share a client across threads by wrapping it in a `Mutex`.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike, Utc};
use tracing::{debug, trace, warn};

use crate::command::{
    BatchReadCommand, BatchWriteCommand, ClearMode, Command, CommandContext, ErrorLedOffCommand,
    IndicatorLedOffCommand, LedChannel, LoopbackCommand, RandomBitWriteCommand,
    RandomReadCommand, RandomWriteCommand, ReadCpuModelCommand, RemoteLatchClearCommand,
    RemoteLockCommand, RemotePauseCommand, RemoteResetCommand, RemoteRunCommand,
    RemoteStopCommand, Request, TagReadCommand, TagWriteCommand,
};
use crate::datatype::{DataType, Value};
use crate::device::{Device, DeviceCode};
use crate::error::{McError, Result};
use crate::header::{
    AccessOption, AccessRoute, FrameVariant, RequestHeader, TransferMode,
    DEFAULT_MONITORING_TIMER,
};
use crate::response::McResponse;
use crate::series::{PasswordRule, PlcSeries};
use crate::status::{CpuModel, CpuStatus, LoopbackResult, ResetOutcome, SwitchStatus};
use crate::tag::{Tag, TagResult};
use crate::transport::{
    read_frame, TcpTransport, Transport, UdpTransport, DEFAULT_MC_PORT, DEFAULT_TIMEOUT,
};
use crate::utils::format_frame;

/// SD register holding the switch position.
const SWITCH_STATUS_REGISTER: u32 = 200;
/// SD register holding the CPU state and STOP/PAUSE cause.
const CPU_STATUS_REGISTER: u32 = 203;
/// First SD register of the clock data.
const CLOCK_REGISTER: u32 = 210;
/// Number of clock data registers (year to weekday, plus one reserved).
const CLOCK_REGISTER_COUNT: usize = 8;
/// SM relay that latches new clock data on its rising edge.
const CLOCK_SET_RELAY: u32 = 210;
/// SM relay that reports clock data errors.
const CLOCK_ERROR_RELAY: u32 = 211;
/// SM relay that refreshes the clock data registers.
const CLOCK_READ_RELAY: u32 = 213;

/// Network protocol used to reach the PLC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Protocol {
    /// TCP stream.
    #[default]
    Tcp,
    /// UDP datagrams.
    Udp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "TCP"),
            Protocol::Udp => write!(f, "UDP"),
        }
    }
}

impl FromStr for Protocol {
    type Err = McError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            _ => Err(McError::invalid_parameter(
                "protocol",
                format!("unknown protocol \"{}\", expected TCP or UDP", s),
            )),
        }
    }
}

/// Configuration for creating an MC client.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientConfig {
    /// PLC socket address.
    pub plc_addr: SocketAddr,
    /// TCP or UDP.
    pub protocol: Protocol,
    /// PLC series.
    pub series: PlcSeries,
    /// Binary or ASCII frames.
    pub transfer_mode: TransferMode,
    /// 3E or 4E frames.
    pub frame_variant: FrameVariant,
    /// Access route to the target station.
    pub route: AccessRoute,
    /// Monitoring timer in units of 250 ms.
    pub monitoring_timer: u16,
    /// Communication timeout.
    pub timeout: Duration,
    /// Remote password rule; `None` uses the series default.
    pub password_rule: Option<PasswordRule>,
}

impl ClientConfig {
    /// Creates a new client configuration with default settings.
    ///
    /// Defaults: port 5007, TCP, Q series, binary 3E frames, local
    /// station route, 1 second monitoring timer and 2 second timeout.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{ClientConfig, PlcSeries, TransferMode};
    /// use std::net::Ipv4Addr;
    ///
    /// let config = ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10));
    /// assert_eq!(config.plc_addr.port(), 5007);
    /// assert_eq!(config.series, PlcSeries::Q);
    /// assert_eq!(config.transfer_mode, TransferMode::Binary);
    /// ```
    pub fn new(plc_ip: impl Into<IpAddr>) -> Self {
        Self {
            plc_addr: SocketAddr::new(plc_ip.into(), DEFAULT_MC_PORT),
            protocol: Protocol::Tcp,
            series: PlcSeries::Q,
            transfer_mode: TransferMode::Binary,
            frame_variant: FrameVariant::E3,
            route: AccessRoute::default(),
            monitoring_timer: DEFAULT_MONITORING_TIMER,
            timeout: DEFAULT_TIMEOUT,
            password_rule: None,
        }
    }

    /// Sets a custom PLC port (default is 5007).
    pub fn with_port(mut self, port: u16) -> Self {
        self.plc_addr.set_port(port);
        self
    }

    /// Sets the network protocol (default is TCP).
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Sets the PLC series (default is Q).
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{ClientConfig, PlcSeries};
    /// use std::net::Ipv4Addr;
    ///
    /// let config = ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10))
    ///     .with_series("iQ-R".parse::<PlcSeries>().unwrap());
    /// assert!(config.series.is_iq_r());
    /// ```
    pub fn with_series(mut self, series: PlcSeries) -> Self {
        self.series = series;
        self
    }

    /// Sets the transfer mode (default is binary).
    pub fn with_transfer_mode(mut self, transfer_mode: TransferMode) -> Self {
        self.transfer_mode = transfer_mode;
        self
    }

    /// Sets the frame variant (default is 3E).
    pub fn with_frame_variant(mut self, frame_variant: FrameVariant) -> Self {
        self.frame_variant = frame_variant;
        self
    }

    /// Sets the access route.
    pub fn with_route(mut self, route: AccessRoute) -> Self {
        self.route = route;
        self
    }

    /// Sets the monitoring timer in units of 250 ms (default is 4).
    pub fn with_monitoring_timer(mut self, monitoring_timer: u16) -> Self {
        self.monitoring_timer = monitoring_timer;
        self
    }

    /// Sets the connect and per-read timeout (default 2 seconds).
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::ClientConfig;
    /// use std::net::Ipv4Addr;
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10))
    ///     .with_timeout(Duration::from_secs(5));
    /// ```
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the remote password rule of the series.
    pub fn with_password_rule(mut self, rule: PasswordRule) -> Self {
        self.password_rule = Some(rule);
        self
    }

    fn access_option(&self) -> AccessOption {
        AccessOption::new(self.transfer_mode, self.frame_variant)
    }
}

/// MC client for communicating with MELSEC PLCs.
///
/// The client owns one connection and sends one request at a time. It does
/// not retry or reconnect; after `McError::Timeout` drop the client and
/// create a new one.
///
/// # Example
///
/// ```no_run
/// use melsec_mc::{Client, ClientConfig, FrameVariant, TransferMode};
/// use std::net::Ipv4Addr;
///
/// let config = ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10))
///     .with_transfer_mode(TransferMode::Ascii)
///     .with_frame_variant(FrameVariant::E4);
/// let mut client = Client::new(config)?;
///
/// let model = client.read_cpu_model()?;
/// println!("connected to {}", model);
/// # Ok::<(), melsec_mc::McError>(())
/// ```
pub struct Client {
    transport: Box<dyn Transport + Send>,
    option: AccessOption,
    route: AccessRoute,
    monitoring_timer: u16,
    series: PlcSeries,
    password_rule: PasswordRule,
    serial: u16,
}

impl Client {
    /// Connects to the PLC described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `McError::Timeout` or `McError::Connection` if the socket
    /// cannot be opened.
    pub fn new(config: ClientConfig) -> Result<Self> {
        debug!(
            addr = %config.plc_addr,
            protocol = %config.protocol,
            series = %config.series,
            mode = %config.transfer_mode,
            frame = %config.frame_variant,
            "connecting"
        );
        let transport: Box<dyn Transport + Send> = match config.protocol {
            Protocol::Tcp => Box::new(TcpTransport::connect(config.plc_addr, config.timeout)?),
            Protocol::Udp => Box::new(UdpTransport::new(config.plc_addr, config.timeout)?),
        };
        Ok(Self::from_boxed(transport, &config))
    }

    /// Creates a client over an already open transport.
    ///
    /// The address, protocol and timeout of `config` are ignored.
    pub fn with_transport<T>(transport: T, config: ClientConfig) -> Self
    where
        T: Transport + Send + 'static,
    {
        Self::from_boxed(Box::new(transport), &config)
    }

    fn from_boxed(transport: Box<dyn Transport + Send>, config: &ClientConfig) -> Self {
        Self {
            transport,
            option: config.access_option(),
            route: config.route,
            monitoring_timer: config.monitoring_timer,
            series: config.series,
            password_rule: config
                .password_rule
                .unwrap_or_else(|| config.series.password_rule()),
            serial: 0,
        }
    }

    /// Returns the configured PLC series.
    pub fn series(&self) -> PlcSeries {
        self.series
    }

    /// Returns the transfer mode and frame variant.
    pub fn access_option(&self) -> AccessOption {
        self.option
    }

    /// Sets the serial number used by the next 4E request.
    ///
    /// Serials increase by one per request and wrap at `u16::MAX`.
    pub fn set_serial(&mut self, serial: u16) {
        self.serial = serial;
    }

    fn context(&self) -> CommandContext {
        CommandContext::new(self.series, self.option.transfer_mode)
    }

    fn next_serial(&mut self) -> u16 {
        let serial = self.serial;
        self.serial = self.serial.wrapping_add(1);
        serial
    }

    /// Sends one request and returns its validated response.
    ///
    /// # Errors
    ///
    /// Returns `McError::Frame` for malformed responses,
    /// `McError::SerialMismatch` if a 4E response carries another serial,
    /// `McError::Protocol` for a nonzero completion code, and transport
    /// errors as they occur.
    pub fn call(&mut self, request: &Request) -> Result<McResponse> {
        let mut header = RequestHeader::new(self.option, self.route, self.monitoring_timer);
        let serial = match self.option.frame_variant {
            FrameVariant::E4 => {
                let serial = self.next_serial();
                header = header.with_serial(serial);
                Some(serial)
            }
            FrameVariant::E3 => None,
        };

        let frame = header.encode_frame(request.command, request.subcommand, &request.payload)?;
        trace!(frame = %format_frame(&frame), "send");
        self.transport.send(&frame)?;

        let bytes = read_frame(&mut self.transport, self.option)?;
        trace!(frame = %format_frame(&bytes), "receive");

        let response = McResponse::from_bytes(&bytes, self.option)?;
        if let Some(serial) = serial {
            response.check_serial(serial)?;
        }
        response.check_error()?;
        Ok(response)
    }

    /// Executes a command and decodes its response.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use melsec_mc::{Client, ClientConfig, ReadCpuModelCommand};
    /// use std::net::Ipv4Addr;
    ///
    /// let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10)))?;
    /// let model = client.execute(&ReadCpuModelCommand::new())?;
    /// # Ok::<(), melsec_mc::McError>(())
    /// ```
    pub fn execute<C: Command>(&mut self, command: &C) -> Result<C::Output> {
        let ctx = self.context();
        let request = command.request(ctx)?;
        let response = self.call(&request)?;
        command.parse_response(&response.data, ctx)
    }

    fn parse_device(&self, text: &str) -> Result<Device> {
        Device::parse(text, self.series)
    }

    fn parse_devices(&self, texts: &[&str]) -> Result<Vec<Device>> {
        texts.iter().map(|text| self.parse_device(text)).collect()
    }

    fn special_device(&self, code: DeviceCode, number: u32) -> Result<Device> {
        Device::new(code, number, self.series)
    }

    /// Reads `count` values of one type starting at `device`.
    ///
    /// # Arguments
    ///
    /// * `device` - First device, e.g. `"D100"` or `"X1A"`
    /// * `count` - Number of values to read
    /// * `data_type` - Type of each value
    /// * `bool_encode` - Return BIT values as `Value::Bool` instead of 0/1
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The device is unknown or out of range for the series
    /// - BIT is requested on a word device
    /// - The run exceeds the batch limits
    /// - Communication fails or the PLC returns an error
    ///
    /// # Example
    ///
    /// ```no_run
    /// use melsec_mc::{Client, ClientConfig, DataType};
    /// use std::net::Ipv4Addr;
    ///
    /// let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10)))?;
    /// let values = client.batch_read("D0", 5, DataType::SWord, false)?;
    /// let inputs = client.batch_read("X0", 16, DataType::Bit, true)?;
    /// # Ok::<(), melsec_mc::McError>(())
    /// ```
    pub fn batch_read(
        &mut self,
        device: &str,
        count: usize,
        data_type: DataType,
        bool_encode: bool,
    ) -> Result<Vec<Value>> {
        debug!(device, count, data_type = %data_type, "batch read");
        let cmd = BatchReadCommand::new(self.parse_device(device)?, count, data_type, bool_encode)?;
        self.execute(&cmd)
    }

    /// Writes values of one type starting at `device`.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is invalid, a value does not fit the
    /// type, the run exceeds the batch limits, or communication fails.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use melsec_mc::{Client, ClientConfig, DataType, Value};
    /// use std::net::Ipv4Addr;
    ///
    /// let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10)))?;
    /// let values: Vec<Value> = [0i16, 10, 20, 30, 40].into_iter().map(Value::from).collect();
    /// client.batch_write("D0", &values, DataType::SWord)?;
    /// # Ok::<(), melsec_mc::McError>(())
    /// ```
    pub fn batch_write(&mut self, device: &str, values: &[Value], data_type: DataType) -> Result<()> {
        debug!(device, count = values.len(), data_type = %data_type, "batch write");
        let cmd = BatchWriteCommand::new(self.parse_device(device)?, values, data_type)?;
        self.execute(&cmd)
    }

    /// Reads word and double word devices in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if a device is invalid, both lists are empty, a
    /// list exceeds 255 devices, or communication fails.
    pub fn random_read(
        &mut self,
        word_devices: &[&str],
        dword_devices: &[&str],
    ) -> Result<(Vec<i16>, Vec<i32>)> {
        debug!(words = word_devices.len(), dwords = dword_devices.len(), "random read");
        let cmd = RandomReadCommand::new(
            self.parse_devices(word_devices)?,
            self.parse_devices(dword_devices)?,
        )?;
        self.execute(&cmd)
    }

    /// Writes word and double word devices in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if a device is invalid, a device list and its value
    /// list differ in length, or communication fails.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use melsec_mc::{Client, ClientConfig};
    /// use std::net::Ipv4Addr;
    ///
    /// let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10)))?;
    /// client.random_write(&["D0", "D5"], &[1, -1], &["D10"], &[100_000])?;
    /// # Ok::<(), melsec_mc::McError>(())
    /// ```
    pub fn random_write(
        &mut self,
        word_devices: &[&str],
        word_values: &[i16],
        dword_devices: &[&str],
        dword_values: &[i32],
    ) -> Result<()> {
        debug!(words = word_devices.len(), dwords = dword_devices.len(), "random write");
        let cmd = RandomWriteCommand::new(
            self.parse_devices(word_devices)?,
            word_values,
            self.parse_devices(dword_devices)?,
            dword_values,
        )?;
        self.execute(&cmd)
    }

    /// Writes a list of bit devices in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if a device is invalid or not a bit device, the
    /// lists differ in length, or communication fails.
    pub fn random_write_bits(&mut self, devices: &[&str], values: &[bool]) -> Result<()> {
        debug!(points = devices.len(), "random bit write");
        let cmd = RandomBitWriteCommand::new(self.parse_devices(devices)?, values)?;
        self.execute(&cmd)
    }

    /// Reads a list of typed tags in one request.
    ///
    /// The result has one entry per tag, in order. Tags that fail local
    /// validation are reported in their entry and are not sent; if none
    /// remain, nothing is sent at all.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures of the whole request:
    /// communication errors, PLC errors, or more than 255 words in total.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use melsec_mc::{Client, ClientConfig, DataType, Tag};
    /// use std::net::Ipv4Addr;
    ///
    /// let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10)))?;
    /// for result in client.read(&[
    ///     Tag::read("D0", DataType::SWord),
    ///     Tag::read("D10", DataType::Double),
    /// ])? {
    ///     match result.outcome {
    ///         Ok(value) => println!("{} = {}", result.device, value),
    ///         Err(err) => println!("{}: {}", result.device, err),
    ///     }
    /// }
    /// # Ok::<(), melsec_mc::McError>(())
    /// ```
    pub fn read(&mut self, tags: &[Tag]) -> Result<Vec<TagResult>> {
        debug!(tags = tags.len(), "tag read");
        let cmd = TagReadCommand::new(tags, self.series);
        if cmd.accepted_count() == 0 {
            return cmd.parse_response(&[], self.context());
        }
        self.execute(&cmd)
    }

    /// Writes a list of typed tags.
    ///
    /// Word-sized tags go out in one random write, BIT tags in a following
    /// random bit write. Rejected tags (invalid device, missing or
    /// out-of-range value) are reported in their entry and are not sent.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures of a whole request. If the bit
    /// write fails, the word write has already been applied.
    pub fn write(&mut self, tags: &[Tag]) -> Result<Vec<TagResult>> {
        debug!(tags = tags.len(), "tag write");
        let cmd = TagWriteCommand::new(tags, self.series);
        let bits = cmd.bit_command()?;
        if cmd.word_tag_count() > 0 {
            self.execute(&cmd)?;
        }
        if let Some(bits) = bits {
            self.execute(&bits)?;
        }
        cmd.parse_response(&[], self.context())
    }

    /// Puts the PLC into RUN.
    ///
    /// # Arguments
    ///
    /// * `clear_mode` - Device memory to clear on start
    /// * `force` - Execute even if another device is operating the PLC
    pub fn remote_run(&mut self, clear_mode: ClearMode, force: bool) -> Result<()> {
        debug!(?clear_mode, force, "remote run");
        self.execute(&RemoteRunCommand::new(clear_mode, force))
    }

    /// Puts the PLC into STOP.
    pub fn remote_stop(&mut self) -> Result<()> {
        debug!("remote stop");
        self.execute(&RemoteStopCommand::new())
    }

    /// Puts the PLC into PAUSE.
    pub fn remote_pause(&mut self, force: bool) -> Result<()> {
        debug!(force, "remote pause");
        self.execute(&RemotePauseCommand::new(force))
    }

    /// Clears the latch range. The PLC must be stopped.
    pub fn remote_latch_clear(&mut self) -> Result<()> {
        debug!("remote latch clear");
        self.execute(&RemoteLatchClearCommand::new())
    }

    /// Resets the PLC. The PLC must be stopped.
    ///
    /// A PLC that restarts before answering yields
    /// `ResetOutcome::NoResponse`. The connection is usually gone after a
    /// reset.
    ///
    /// # Errors
    ///
    /// Returns PLC and transport errors other than a timeout.
    pub fn remote_reset(&mut self) -> Result<ResetOutcome> {
        debug!("remote reset");
        match self.execute(&RemoteResetCommand::new()) {
            Ok(()) => Ok(ResetOutcome::Acknowledged),
            Err(McError::Timeout) => {
                warn!("no answer to remote reset, PLC is probably restarting");
                Ok(ResetOutcome::NoResponse)
            }
            Err(err) => Err(err),
        }
    }

    /// Locks the PLC with the remote password.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidParameter` if the password violates the
    /// configured rule, before anything is sent.
    pub fn remote_lock(&mut self, password: &str) -> Result<()> {
        debug!("remote lock");
        let cmd = RemoteLockCommand::lock(password, self.password_rule)?;
        self.execute(&cmd)
    }

    /// Unlocks the PLC with the remote password.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidParameter` if the password violates the
    /// configured rule, before anything is sent.
    pub fn remote_unlock(&mut self, password: &str) -> Result<()> {
        debug!("remote unlock");
        let cmd = RemoteLockCommand::unlock(password, self.password_rule)?;
        self.execute(&cmd)
    }

    /// Reads the CPU model name and code.
    pub fn read_cpu_model(&mut self) -> Result<CpuModel> {
        debug!("read cpu model");
        self.execute(&ReadCpuModelCommand::new())
    }

    fn read_registers(&mut self, first: u32, count: usize) -> Result<Vec<u16>> {
        let device = self.special_device(DeviceCode::SD, first)?;
        let cmd = BatchReadCommand::new(device, count, DataType::UWord, false)?;
        self.execute(&cmd)?
            .iter()
            .map(|value| {
                value
                    .as_u64()
                    .and_then(|v| u16::try_from(v).ok())
                    .ok_or_else(|| McError::frame(format!("register value {} is not a word", value)))
            })
            .collect()
    }

    fn write_special_bits(&mut self, points: &[(u32, bool)]) -> Result<()> {
        let devices = points
            .iter()
            .map(|&(number, _)| self.special_device(DeviceCode::SM, number))
            .collect::<Result<Vec<_>>>()?;
        let values: Vec<bool> = points.iter().map(|&(_, value)| value).collect();
        self.execute(&RandomBitWriteCommand::new(devices, &values)?)
    }

    /// Reads the CPU state and STOP/PAUSE cause from SD203.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use melsec_mc::{Client, ClientConfig, CpuState};
    /// use std::net::Ipv4Addr;
    ///
    /// let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10)))?;
    /// if client.read_cpu_status()?.state == CpuState::Stop {
    ///     println!("PLC is stopped");
    /// }
    /// # Ok::<(), melsec_mc::McError>(())
    /// ```
    pub fn read_cpu_status(&mut self) -> Result<CpuStatus> {
        debug!("read cpu status");
        let registers = self.read_registers(CPU_STATUS_REGISTER, 1)?;
        Ok(CpuStatus::from_register(registers[0]))
    }

    /// Reads the RUN/STOP/RESET switch position from SD200.
    pub fn read_switch_status(&mut self) -> Result<SwitchStatus> {
        debug!("read switch status");
        let registers = self.read_registers(SWITCH_STATUS_REGISTER, 1)?;
        Ok(SwitchStatus::from_register(registers[0]))
    }

    /// Reads the PLC clock.
    ///
    /// SM213 is set while SD210-SD217 are read and cleared afterwards, even
    /// if the read fails.
    ///
    /// # Errors
    ///
    /// Returns `McError::Frame` if the registers do not hold a valid date
    /// and time, and communication or PLC errors as they occur.
    pub fn read_plc_time(&mut self) -> Result<NaiveDateTime> {
        debug!("read plc time");
        self.write_special_bits(&[(CLOCK_READ_RELAY, true)])?;
        let registers = self.read_registers(CLOCK_REGISTER, CLOCK_REGISTER_COUNT);
        let cleared = self.write_special_bits(&[(CLOCK_READ_RELAY, false)]);
        let registers = registers?;
        cleared?;

        let &[year, month, day, hour, minute, second, ..] = registers.as_slice() else {
            return Err(McError::frame("clock data is incomplete"));
        };
        NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
            .and_then(|date| date.and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second)))
            .ok_or_else(|| {
                McError::frame(format!(
                    "invalid clock data {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, minute, second
                ))
            })
    }

    /// Sets the PLC clock.
    ///
    /// Clears SM211 and SM213, writes the clock data to SD210-SD217
    /// (weekday counted from Sunday = 0), then pulses SM210.
    pub fn set_plc_time(&mut self, time: NaiveDateTime) -> Result<()> {
        debug!(%time, "set plc time");
        let year = u16::try_from(time.year()).map_err(|_| {
            McError::invalid_parameter("time", format!("year {} is out of range", time.year()))
        })?;
        let registers = [
            year,
            time.month() as u16,
            time.day() as u16,
            time.hour() as u16,
            time.minute() as u16,
            time.second() as u16,
            time.weekday().num_days_from_sunday() as u16,
            0,
        ];
        let values: Vec<Value> = registers.iter().copied().map(Value::from).collect();

        self.write_special_bits(&[(CLOCK_ERROR_RELAY, false), (CLOCK_READ_RELAY, false)])?;
        let device = self.special_device(DeviceCode::SD, CLOCK_REGISTER)?;
        self.execute(&BatchWriteCommand::new(device, &values, DataType::UWord)?)?;
        for state in [false, true, false] {
            self.write_special_bits(&[(CLOCK_SET_RELAY, state)])?;
        }
        Ok(())
    }

    /// Sets the PLC clock to the current time of this host.
    ///
    /// # Arguments
    ///
    /// * `utc` - Use UTC instead of the local time zone
    ///
    /// Returns the time that was written, without fractional seconds.
    pub fn sync_plc_time(&mut self, utc: bool) -> Result<NaiveDateTime> {
        let now = if utc {
            Utc::now().naive_utc()
        } else {
            Local::now().naive_local()
        };
        let now = now.with_nanosecond(0).unwrap_or(now);
        self.set_plc_time(now)?;
        Ok(now)
    }

    /// Sends data to the PLC and checks that it comes back unchanged.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidParameter` for data that is empty, longer
    /// than 960 characters or not ASCII alphanumeric, before anything is
    /// sent, and `McError::LoopbackMismatch` if the echo differs.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use melsec_mc::{Client, ClientConfig};
    /// use std::net::Ipv4Addr;
    ///
    /// let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10)))?;
    /// let echo = client.loopback_test("hello")?;
    /// assert_eq!(echo.data, "hello");
    /// # Ok::<(), melsec_mc::McError>(())
    /// ```
    pub fn loopback_test(&mut self, data: &str) -> Result<LoopbackResult> {
        debug!(length = data.len(), "loopback test");
        let cmd = LoopbackCommand::new(data)?;
        self.execute(&cmd)
    }

    /// Turns off the ERR LED and clears the error information.
    pub fn error_led_off(&mut self) -> Result<()> {
        debug!("error led off");
        self.execute(&ErrorLedOffCommand::new())
    }

    /// Turns off the COM.ERR indicator LEDs of a channel.
    pub fn indicator_led_off(&mut self, channel: LedChannel) -> Result<()> {
        debug!(?channel, "indicator led off");
        self.execute(&IndicatorLedOffCommand::new(channel))
    }

    /// Shuts the connection down.
    pub fn close(mut self) -> Result<()> {
        debug!("closing");
        self.transport.close()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("option", &self.option)
            .field("route", &self.route)
            .field("series", &self.series)
            .field("serial", &self.serial)
            .finish_non_exhaustive()
    }
}
