//! CPU model read, LED clearing and loopback test.

use super::{Command, CommandContext, Request, MAX_LOOPBACK_LEN};
use super::{ERROR_LED_OFF, LOOPBACK_TEST, READ_CPU_MODEL};
use crate::codec::Decoder;
use crate::error::{McError, Result};
use crate::status::{CpuModel, LoopbackResult};

/// Width of the model name field in the CPU model response.
const CPU_NAME_LEN: usize = 16;

/// Command for reading the CPU model name and code.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadCpuModelCommand;

impl ReadCpuModelCommand {
    /// Creates a new CPU model read command.
    pub fn new() -> Self {
        Self
    }
}

impl Command for ReadCpuModelCommand {
    type Output = CpuModel;

    fn request(&self, _ctx: CommandContext) -> Result<Request> {
        Ok(Request::empty(READ_CPU_MODEL, 0x0000))
    }

    fn parse_response(&self, data: &[u8], ctx: CommandContext) -> Result<CpuModel> {
        let mut dec = Decoder::new(ctx.mode, data);
        let name = std::str::from_utf8(dec.take_raw(CPU_NAME_LEN)?)
            .map_err(|_| McError::frame("CPU model name is not ASCII"))?
            .trim_matches(|c: char| c == ' ' || c == '\0')
            .to_string();
        let code = dec.get_u16()?;
        Ok(CpuModel { name, code })
    }
}

/// Command for turning off the ERR LED and clearing the error information.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorLedOffCommand;

impl ErrorLedOffCommand {
    /// Creates a new error LED off command.
    pub fn new() -> Self {
        Self
    }
}

impl Command for ErrorLedOffCommand {
    type Output = ();

    fn request(&self, _ctx: CommandContext) -> Result<Request> {
        Ok(Request::empty(ERROR_LED_OFF, 0x0000))
    }

    fn parse_response(&self, _data: &[u8], _ctx: CommandContext) -> Result<()> {
        Ok(())
    }
}

/// Communication channel whose indicator LEDs are turned off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LedChannel {
    /// Channel 1.
    #[default]
    Ch1,
    /// Channel 2.
    Ch2,
    /// Channels 1 and 2.
    Both,
}

/// Command for turning off the COM.ERR indicator LEDs.
///
/// iQ-R ignores the channel and uses a single subcommand.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorLedOffCommand {
    channel: LedChannel,
}

impl IndicatorLedOffCommand {
    /// Creates a new indicator LED off command.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{Command, CommandContext, IndicatorLedOffCommand, LedChannel};
    ///
    /// let cmd = IndicatorLedOffCommand::new(LedChannel::Both);
    /// assert_eq!(cmd.request(CommandContext::default()).unwrap().subcommand, 0x000F);
    /// ```
    pub fn new(channel: LedChannel) -> Self {
        Self { channel }
    }
}

impl Command for IndicatorLedOffCommand {
    type Output = ();

    fn request(&self, ctx: CommandContext) -> Result<Request> {
        let subcommand = if ctx.series.is_iq_r() {
            0x0001
        } else {
            match self.channel {
                LedChannel::Ch1 => 0x0005,
                LedChannel::Ch2 => 0x000A,
                LedChannel::Both => 0x000F,
            }
        };
        Ok(Request::empty(ERROR_LED_OFF, subcommand))
    }

    fn parse_response(&self, _data: &[u8], _ctx: CommandContext) -> Result<()> {
        Ok(())
    }
}

/// Command for echoing data through the PLC.
#[derive(Debug, Clone)]
pub struct LoopbackCommand {
    data: String,
}

impl LoopbackCommand {
    /// Creates a new loopback command.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidParameter` unless `data` is 1 to
    /// [`MAX_LOOPBACK_LEN`] ASCII letters and digits.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::LoopbackCommand;
    ///
    /// assert!(LoopbackCommand::new("hello").is_ok());
    /// assert!(LoopbackCommand::new("").is_err());
    /// assert!(LoopbackCommand::new("héllo").is_err());
    /// assert!(LoopbackCommand::new("a b").is_err());
    /// ```
    pub fn new(data: &str) -> Result<Self> {
        if data.is_empty() || data.len() > MAX_LOOPBACK_LEN {
            return Err(McError::invalid_parameter(
                "data",
                format!("length must be from 1 to {}", MAX_LOOPBACK_LEN),
            ));
        }
        if !data.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(McError::invalid_parameter(
                "data",
                "must contain only ASCII letters and digits",
            ));
        }
        Ok(Self {
            data: data.to_string(),
        })
    }
}

impl Command for LoopbackCommand {
    type Output = LoopbackResult;

    fn request(&self, ctx: CommandContext) -> Result<Request> {
        let mut enc = ctx.encoder();
        enc.put_u16(self.data.len() as u16);
        enc.put_raw(self.data.as_bytes());
        Ok(Request::new(LOOPBACK_TEST, 0x0000, enc.into_bytes()))
    }

    fn parse_response(&self, data: &[u8], ctx: CommandContext) -> Result<LoopbackResult> {
        let mut dec = Decoder::new(ctx.mode, data);
        let length = usize::from(dec.get_u16()?);
        let echoed = String::from_utf8_lossy(dec.rest_raw()).into_owned();

        if length != self.data.len() || echoed != self.data {
            return Err(McError::LoopbackMismatch {
                sent: self.data.clone(),
                received: echoed,
            });
        }
        Ok(LoopbackResult {
            length,
            data: echoed,
        })
    }
}
