//! MC command structures and serialization.
//!
//! This module contains all MC commands that can be sent to a PLC. Each
//! command validates its arguments when it is created, serializes its
//! request payload for the session's series and transfer mode, and decodes
//! the payload of the matching response.
//!
//! # Command Types
//!
//! ## Device Access
//! - [`BatchReadCommand`] - Read a contiguous run of one device
//! - [`BatchWriteCommand`] - Write a contiguous run of one device
//! - [`RandomReadCommand`] - Read a list of word and double word devices
//! - [`RandomWriteCommand`] - Write a list of word and double word devices
//! - [`RandomBitWriteCommand`] - Write a list of bit devices
//! - [`TagReadCommand`] - Read typed tags spread over word devices
//! - [`TagWriteCommand`] - Write typed tags spread over word devices
//!
//! ## PLC Control
//! - [`RemoteRunCommand`], [`RemoteStopCommand`], [`RemotePauseCommand`]
//! - [`RemoteLatchClearCommand`], [`RemoteResetCommand`]
//! - [`RemoteLockCommand`] - Lock or unlock with the remote password
//!
//! ## Diagnostics
//! - [`ReadCpuModelCommand`] - Read the CPU model name and code
//! - [`ErrorLedOffCommand`], [`IndicatorLedOffCommand`] - Clear LEDs
//! - [`LoopbackCommand`] - Echo test
//!
//! # Example
//!
//! Commands are typically executed through the [`Client`](crate::Client),
//! but can also be used directly for lower-level control:
//!
//! ```
//! use melsec_mc::{
//!     AccessOption, AccessRoute, BatchReadCommand, Command, CommandContext, DataType,
//!     Device, PlcSeries, RequestHeader,
//! };
//!
//! let ctx = CommandContext::default();
//! let device = Device::parse("D100", PlcSeries::Q).unwrap();
//! let cmd = BatchReadCommand::new(device, 10, DataType::SWord, false).unwrap();
//!
//! let request = cmd.request(ctx).unwrap();
//! let header = RequestHeader::new(AccessOption::default(), AccessRoute::default(), 4);
//! let frame = header
//!     .encode_frame(request.command, request.subcommand, &request.payload)
//!     .unwrap();
//! // frame can now be sent over TCP or UDP
//! ```

mod batch;
mod diagnostic;
mod random;
mod remote;
mod tag_access;

pub use batch::{BatchReadCommand, BatchWriteCommand};
pub use diagnostic::{
    ErrorLedOffCommand, IndicatorLedOffCommand, LedChannel, LoopbackCommand, ReadCpuModelCommand,
};
pub use random::{RandomBitWriteCommand, RandomReadCommand, RandomWriteCommand};
pub use remote::{
    ClearMode, RemoteLatchClearCommand, RemoteLockCommand, RemotePauseCommand, RemoteResetCommand,
    RemoteRunCommand, RemoteStopCommand,
};
pub use tag_access::{TagReadCommand, TagWriteCommand};

use crate::codec::Encoder;
use crate::device::Device;
use crate::error::Result;
use crate::header::TransferMode;
use crate::series::PlcSeries;

/// Batch read command code.
pub(crate) const BATCH_READ: u16 = 0x0401;
/// Batch write command code.
pub(crate) const BATCH_WRITE: u16 = 0x1401;
/// Random read command code.
pub(crate) const RANDOM_READ: u16 = 0x0403;
/// Random write command code.
pub(crate) const RANDOM_WRITE: u16 = 0x1402;
/// Remote RUN command code.
pub(crate) const REMOTE_RUN: u16 = 0x1001;
/// Remote STOP command code.
pub(crate) const REMOTE_STOP: u16 = 0x1002;
/// Remote PAUSE command code.
pub(crate) const REMOTE_PAUSE: u16 = 0x1003;
/// Remote latch clear command code.
pub(crate) const REMOTE_LATCH_CLEAR: u16 = 0x1005;
/// Remote RESET command code.
pub(crate) const REMOTE_RESET: u16 = 0x1006;
/// Remote password unlock command code.
pub(crate) const REMOTE_UNLOCK: u16 = 0x1630;
/// Remote password lock command code.
pub(crate) const REMOTE_LOCK: u16 = 0x1631;
/// LED off / error initialization command code.
pub(crate) const ERROR_LED_OFF: u16 = 0x1617;
/// CPU model read command code.
pub(crate) const READ_CPU_MODEL: u16 = 0x0101;
/// Loopback test command code.
pub(crate) const LOOPBACK_TEST: u16 = 0x0619;

/// Maximum number of words in a single batch read/write.
pub const MAX_BATCH_WORDS: usize = 960;
/// Maximum number of bit points in a single batch read/write.
pub const MAX_BATCH_BITS: usize = 7168;
/// Maximum number of devices of each size in a random read/write.
pub const MAX_RANDOM_POINTS: usize = 255;
/// Maximum length of loopback data.
pub const MAX_LOOPBACK_LEN: usize = 960;

/// Command code, subcommand and encoded payload of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Command code.
    pub command: u16,
    /// Subcommand code.
    pub subcommand: u16,
    /// Request data after the subcommand, already in wire form.
    pub payload: Vec<u8>,
}

impl Request {
    pub(crate) fn new(command: u16, subcommand: u16, payload: Vec<u8>) -> Self {
        Self {
            command,
            subcommand,
            payload,
        }
    }

    pub(crate) fn empty(command: u16, subcommand: u16) -> Self {
        Self::new(command, subcommand, Vec::new())
    }
}

/// Session properties that change how commands are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandContext {
    /// PLC series.
    pub series: PlcSeries,
    /// Transfer mode.
    pub mode: TransferMode,
}

impl CommandContext {
    /// Creates a new command context.
    pub fn new(series: PlcSeries, mode: TransferMode) -> Self {
        Self { series, mode }
    }

    pub(crate) fn encoder(self) -> Encoder {
        Encoder::new(self.mode)
    }
}

/// An MC request/response pair.
pub trait Command {
    /// Decoded response payload.
    type Output;

    /// Builds the request for the given session context.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be expressed for the
    /// session's series (e.g. an iQ-R only device on a Q series PLC).
    fn request(&self, ctx: CommandContext) -> Result<Request>;

    /// Decodes the response data that follows the completion code.
    ///
    /// # Errors
    ///
    /// Returns `McError::Frame` if the data does not have the expected shape.
    fn parse_response(&self, data: &[u8], ctx: CommandContext) -> Result<Self::Output>;
}

/// Writes a device after re-checking it against the session series.
pub(crate) fn put_device(enc: &mut Encoder, device: Device, series: PlcSeries) -> Result<()> {
    let device = Device::new(device.code(), device.number(), series)?;
    device.encode(enc, series);
    Ok(())
}

