//! MC frame header structures and request routing.
//!
//! This module defines the request header shared by every MC command and the
//! per-session access options that select its layout.
//!
//! # 3E / 4E Request Header
//!
//! | Field | Binary | ASCII | Description |
//! |-------|:------:|:-----:|-------------|
//! | Subheader | 2 (BE) | 4 | `0x5000` (3E) or `0x5400` (4E) |
//! | Serial | 2 | 4 | 4E only, echoed by the PLC |
//! | Reserved | 2 | 4 | 4E only, always 0 |
//! | Network | 1 | 2 | Network number (0 = local) |
//! | PC | 1 | 2 | PC number (0xFF = own station) |
//! | Module I/O | 2 | 4 | Request destination module I/O (0x03FF = CPU) |
//! | Station | 1 | 2 | Request destination module station |
//! | Length | 2 | 4 | Bytes (or characters) after this field |
//! | Timer | 2 | 4 | Monitoring timer in 250 ms units |
//! | Command | 2 | 4 | Command code |
//! | Subcommand | 2 | 4 | Subcommand code |
//!
//! In ASCII mode every field is written as uppercase hexadecimal text of its
//! numeric value.
//!
//! # Example
//!
//! ```
//! use melsec_mc::{AccessOption, AccessRoute, FrameVariant, RequestHeader, TransferMode};
//!
//! let option = AccessOption::new(TransferMode::Binary, FrameVariant::E3);
//! let header = RequestHeader::new(option, AccessRoute::default(), 4);
//! let frame = header.encode_frame(0x0401, 0x0000, &[]).unwrap();
//! assert_eq!(
//!     frame,
//!     vec![0x50, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x06, 0x00, 0x04, 0x00, 0x01, 0x04, 0x00, 0x00]
//! );
//! ```

use std::str::FromStr;

use crate::codec::Encoder;
use crate::error::{McError, Result};

/// Default monitoring timer (4 × 250 ms = 1 s).
pub const DEFAULT_MONITORING_TIMER: u16 = 4;

/// Encoding of numeric fields on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferMode {
    /// Raw little-endian bytes.
    #[default]
    Binary,
    /// Uppercase hexadecimal text.
    Ascii,
}

impl TransferMode {
    /// Returns how many wire bytes one binary byte occupies.
    pub fn byte_scale(self) -> usize {
        match self {
            TransferMode::Binary => 1,
            TransferMode::Ascii => 2,
        }
    }
}

impl std::fmt::Display for TransferMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferMode::Binary => write!(f, "binary"),
            TransferMode::Ascii => write!(f, "ascii"),
        }
    }
}

impl FromStr for TransferMode {
    type Err = McError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("binary") {
            Ok(TransferMode::Binary)
        } else if s.eq_ignore_ascii_case("ascii") {
            Ok(TransferMode::Ascii)
        } else {
            Err(McError::invalid_parameter(
                "transfer_mode",
                format!("\"{}\" is not one of binary, ascii", s),
            ))
        }
    }
}

/// MC frame variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameVariant {
    /// 3E frame.
    #[default]
    E3,
    /// 4E frame (adds a serial number to match responses).
    E4,
}

impl std::fmt::Display for FrameVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameVariant::E3 => write!(f, "3E"),
            FrameVariant::E4 => write!(f, "4E"),
        }
    }
}

impl FromStr for FrameVariant {
    type Err = McError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("3E") {
            Ok(FrameVariant::E3)
        } else if s.eq_ignore_ascii_case("4E") {
            Ok(FrameVariant::E4)
        } else {
            Err(McError::invalid_parameter(
                "frame_variant",
                format!("\"{}\" is not one of 3E, 4E", s),
            ))
        }
    }
}

/// Frame layout for a session: transfer mode plus frame variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessOption {
    /// Binary or ASCII fields.
    pub transfer_mode: TransferMode,
    /// 3E or 4E header.
    pub frame_variant: FrameVariant,
}

impl AccessOption {
    /// Creates a new access option.
    pub fn new(transfer_mode: TransferMode, frame_variant: FrameVariant) -> Self {
        Self {
            transfer_mode,
            frame_variant,
        }
    }

    /// Returns the subheader of request frames.
    pub fn request_subheader(self) -> u16 {
        match self.frame_variant {
            FrameVariant::E3 => 0x5000,
            FrameVariant::E4 => 0x5400,
        }
    }

    /// Returns the subheader of response frames.
    pub fn response_subheader(self) -> u16 {
        match self.frame_variant {
            FrameVariant::E3 => 0xD000,
            FrameVariant::E4 => 0xD400,
        }
    }

    /// Returns the wire size of the response header up to and including
    /// the length field (binary 9/13 bytes, ASCII 18/26 characters).
    pub fn response_prefix_len(self) -> usize {
        let binary = match self.frame_variant {
            FrameVariant::E3 => 9,
            FrameVariant::E4 => 13,
        };
        binary * self.transfer_mode.byte_scale()
    }
}

/// Request destination route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessRoute {
    /// Network number (0 = local network).
    pub network: u8,
    /// PC number (0xFF = connected station).
    pub pc: u8,
    /// Request destination module I/O number (0x03FF = own CPU).
    pub module_io: u16,
    /// Request destination module station number.
    pub station: u8,
}

impl AccessRoute {
    /// Creates a new route.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::AccessRoute;
    ///
    /// // Station 2 on network 1 through the own CPU
    /// let route = AccessRoute::new(1, 2, 0x03FF, 0);
    /// assert_eq!(route.pc, 2);
    /// ```
    pub fn new(network: u8, pc: u8, module_io: u16, station: u8) -> Self {
        Self {
            network,
            pc,
            module_io,
            station,
        }
    }
}

impl Default for AccessRoute {
    fn default() -> Self {
        Self::new(0x00, 0xFF, 0x03FF, 0x00)
    }
}

/// Request header settings applied to every frame of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Frame layout.
    pub option: AccessOption,
    /// Destination route.
    pub route: AccessRoute,
    /// Monitoring timer in 250 ms units.
    pub monitoring_timer: u16,
    /// 4E serial number (ignored for 3E).
    pub serial: u16,
}

impl RequestHeader {
    /// Creates a new request header with serial 0.
    pub fn new(option: AccessOption, route: AccessRoute, monitoring_timer: u16) -> Self {
        Self {
            option,
            route,
            monitoring_timer,
            serial: 0,
        }
    }

    /// Sets the 4E serial number.
    pub fn with_serial(mut self, serial: u16) -> Self {
        self.serial = serial;
        self
    }

    /// Builds a complete request frame around an already encoded payload.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidParameter` if the request data does not fit
    /// the 16-bit length field.
    pub fn encode_frame(&self, command: u16, subcommand: u16, payload: &[u8]) -> Result<Vec<u8>> {
        let mode = self.option.transfer_mode;
        // Timer + command + subcommand.
        let fixed = 6 * mode.byte_scale();
        let length = u16::try_from(fixed + payload.len()).map_err(|_| {
            McError::invalid_parameter(
                "payload",
                format!("request data of {} bytes exceeds the length field", payload.len()),
            )
        })?;

        let mut enc = Encoder::with_capacity(
            mode,
            self.option.response_prefix_len() + fixed + payload.len(),
        );
        enc.put_be_u16(self.option.request_subheader());
        if self.option.frame_variant == FrameVariant::E4 {
            enc.put_u16(self.serial);
            enc.put_u16(0x0000);
        }
        enc.put_u8(self.route.network);
        enc.put_u8(self.route.pc);
        enc.put_u16(self.route.module_io);
        enc.put_u8(self.route.station);
        enc.put_u16(length);
        enc.put_u16(self.monitoring_timer);
        enc.put_u16(command);
        enc.put_u16(subcommand);
        enc.put_raw(payload);
        Ok(enc.into_bytes())
    }
}
