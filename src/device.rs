//! Device definitions for the MC protocol.
//!
//! This module defines the [`DeviceCode`] enum which represents the device
//! classes of a MELSEC PLC, and the [`Device`] struct which pairs a code with
//! a device number. Each device class has a binary code, an ASCII name, a
//! numbering radix and a kind (bit, word or double word).
//!
//! # Devices Overview
//!
//! | Device | Description | Kind | Radix |
//! |--------|-------------|------|:-----:|
//! | X / Y | Input / output | bit | 16 |
//! | M, L, F, V | Internal, latch, annunciator, edge relay | bit | 10 |
//! | B / W | Link relay / link register | bit / word | 16 |
//! | D / R / ZR | Data register / file registers | word | 10 / 10 / 16 |
//! | SM / SD | Special relay / special register | bit / word | 10 |
//! | TS, TC, TN | Timer contact, coil, current value | bit, bit, word | 10 |
//! | LZ, LTN, LSTN, LCN | iQ-R long index/timers/counters | double word | 10 |
//!
//! # Example
//!
//! ```
//! use melsec_mc::{Device, DeviceCode, PlcSeries, TransferMode};
//!
//! let device = Device::parse("D200", PlcSeries::Q).unwrap();
//! assert_eq!(device.code(), DeviceCode::D);
//! assert_eq!(device.number(), 200);
//!
//! // Hexadecimal devices are numbered in hex
//! let input = Device::parse("X1A", PlcSeries::Q).unwrap();
//! assert_eq!(input.number(), 0x1A);
//!
//! assert_eq!(
//!     device.to_bytes(PlcSeries::Q, TransferMode::Binary),
//!     vec![0xC8, 0x00, 0x00, 0xA8]
//! );
//! assert_eq!(device.to_bytes(PlcSeries::Q, TransferMode::Ascii), b"D*000200".to_vec());
//! ```

use std::str::FromStr;

use crate::codec::{Decoder, Encoder};
use crate::error::{McError, Result};
use crate::header::TransferMode;
use crate::series::PlcSeries;

/// Storage class of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// One bit per device number.
    Bit,
    /// One 16-bit word per device number.
    Word,
    /// One 32-bit double word per device number.
    DoubleWord,
}

/// Device classes available in MELSEC PLCs.
///
/// Codes from `LTS` onwards exist only on the iQ-R series.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCode {
    /// Special relay.
    SM,
    /// Special register.
    SD,
    /// Input.
    X,
    /// Output.
    Y,
    /// Internal relay.
    M,
    /// Latch relay.
    L,
    /// Annunciator.
    F,
    /// Edge relay.
    V,
    /// Link relay.
    B,
    /// Data register.
    D,
    /// Link register.
    W,
    /// Timer contact.
    TS,
    /// Timer coil.
    TC,
    /// Timer current value.
    TN,
    /// Retentive timer contact.
    STS,
    /// Retentive timer coil.
    STC,
    /// Retentive timer current value.
    STN,
    /// Counter contact.
    CS,
    /// Counter coil.
    CC,
    /// Counter current value.
    CN,
    /// Link special relay.
    SB,
    /// Link special register.
    SW,
    /// Direct access input.
    DX,
    /// Direct access output.
    DY,
    /// File register (block switching).
    R,
    /// File register (serial number access).
    ZR,
    /// Long timer contact.
    LTS,
    /// Long timer coil.
    LTC,
    /// Long timer current value.
    LTN,
    /// Long retentive timer contact.
    LSTS,
    /// Long retentive timer coil.
    LSTC,
    /// Long retentive timer current value.
    LSTN,
    /// Long counter contact.
    LCS,
    /// Long counter coil.
    LCC,
    /// Long counter current value.
    LCN,
    /// Long index register.
    LZ,
    /// Refresh data register.
    RD,
}

impl DeviceCode {
    /// Every device code, in protocol table order.
    pub const ALL: [DeviceCode; 37] = [
        DeviceCode::SM,
        DeviceCode::SD,
        DeviceCode::X,
        DeviceCode::Y,
        DeviceCode::M,
        DeviceCode::L,
        DeviceCode::F,
        DeviceCode::V,
        DeviceCode::B,
        DeviceCode::D,
        DeviceCode::W,
        DeviceCode::TS,
        DeviceCode::TC,
        DeviceCode::TN,
        DeviceCode::STS,
        DeviceCode::STC,
        DeviceCode::STN,
        DeviceCode::CS,
        DeviceCode::CC,
        DeviceCode::CN,
        DeviceCode::SB,
        DeviceCode::SW,
        DeviceCode::DX,
        DeviceCode::DY,
        DeviceCode::R,
        DeviceCode::ZR,
        DeviceCode::LTS,
        DeviceCode::LTC,
        DeviceCode::LTN,
        DeviceCode::LSTS,
        DeviceCode::LSTC,
        DeviceCode::LSTN,
        DeviceCode::LCS,
        DeviceCode::LCC,
        DeviceCode::LCN,
        DeviceCode::LZ,
        DeviceCode::RD,
    ];

    /// Returns the device name used in device references (`"D"`, `"STS"`).
    pub fn name(self) -> &'static str {
        match self {
            DeviceCode::SM => "SM",
            DeviceCode::SD => "SD",
            DeviceCode::X => "X",
            DeviceCode::Y => "Y",
            DeviceCode::M => "M",
            DeviceCode::L => "L",
            DeviceCode::F => "F",
            DeviceCode::V => "V",
            DeviceCode::B => "B",
            DeviceCode::D => "D",
            DeviceCode::W => "W",
            DeviceCode::TS => "TS",
            DeviceCode::TC => "TC",
            DeviceCode::TN => "TN",
            DeviceCode::STS => "STS",
            DeviceCode::STC => "STC",
            DeviceCode::STN => "STN",
            DeviceCode::CS => "CS",
            DeviceCode::CC => "CC",
            DeviceCode::CN => "CN",
            DeviceCode::SB => "SB",
            DeviceCode::SW => "SW",
            DeviceCode::DX => "DX",
            DeviceCode::DY => "DY",
            DeviceCode::R => "R",
            DeviceCode::ZR => "ZR",
            DeviceCode::LTS => "LTS",
            DeviceCode::LTC => "LTC",
            DeviceCode::LTN => "LTN",
            DeviceCode::LSTS => "LSTS",
            DeviceCode::LSTC => "LSTC",
            DeviceCode::LSTN => "LSTN",
            DeviceCode::LCS => "LCS",
            DeviceCode::LCC => "LCC",
            DeviceCode::LCN => "LCN",
            DeviceCode::LZ => "LZ",
            DeviceCode::RD => "RD",
        }
    }

    /// Returns the binary device code.
    ///
    /// Sent as one byte on Q/L/QnA/iQ-L and as two bytes on iQ-R.
    pub fn binary_code(self) -> u16 {
        match self {
            DeviceCode::SM => 0x91,
            DeviceCode::SD => 0xA9,
            DeviceCode::X => 0x9C,
            DeviceCode::Y => 0x9D,
            DeviceCode::M => 0x90,
            DeviceCode::L => 0x92,
            DeviceCode::F => 0x93,
            DeviceCode::V => 0x94,
            DeviceCode::B => 0xA0,
            DeviceCode::D => 0xA8,
            DeviceCode::W => 0xB4,
            DeviceCode::TS => 0xC1,
            DeviceCode::TC => 0xC0,
            DeviceCode::TN => 0xC2,
            DeviceCode::STS => 0xC7,
            DeviceCode::STC => 0xC6,
            DeviceCode::STN => 0xC8,
            DeviceCode::CS => 0xC4,
            DeviceCode::CC => 0xC3,
            DeviceCode::CN => 0xC5,
            DeviceCode::SB => 0xA1,
            DeviceCode::SW => 0xB5,
            DeviceCode::DX => 0xA2,
            DeviceCode::DY => 0xA3,
            DeviceCode::R => 0xAF,
            DeviceCode::ZR => 0xB0,
            DeviceCode::LTS => 0x51,
            DeviceCode::LTC => 0x50,
            DeviceCode::LTN => 0x52,
            DeviceCode::LSTS => 0x59,
            DeviceCode::LSTC => 0x58,
            DeviceCode::LSTN => 0x5A,
            DeviceCode::LCS => 0x55,
            DeviceCode::LCC => 0x54,
            DeviceCode::LCN => 0x56,
            DeviceCode::LZ => 0x62,
            DeviceCode::RD => 0x2C,
        }
    }

    /// Returns the radix device numbers are written in (10 or 16).
    pub fn radix(self) -> u32 {
        match self {
            DeviceCode::X
            | DeviceCode::Y
            | DeviceCode::B
            | DeviceCode::W
            | DeviceCode::SB
            | DeviceCode::SW
            | DeviceCode::DX
            | DeviceCode::DY
            | DeviceCode::ZR => 16,
            _ => 10,
        }
    }

    /// Returns the storage kind of this device class.
    pub fn kind(self) -> DeviceKind {
        match self {
            DeviceCode::SD
            | DeviceCode::D
            | DeviceCode::W
            | DeviceCode::TN
            | DeviceCode::STN
            | DeviceCode::CN
            | DeviceCode::SW
            | DeviceCode::R
            | DeviceCode::ZR
            | DeviceCode::RD => DeviceKind::Word,
            DeviceCode::LTN | DeviceCode::LSTN | DeviceCode::LCN | DeviceCode::LZ => {
                DeviceKind::DoubleWord
            }
            _ => DeviceKind::Bit,
        }
    }

    /// Returns whether this device class exists only on iQ-R.
    pub fn is_iq_r_only(self) -> bool {
        matches!(
            self,
            DeviceCode::LTS
                | DeviceCode::LTC
                | DeviceCode::LTN
                | DeviceCode::LSTS
                | DeviceCode::LSTC
                | DeviceCode::LSTN
                | DeviceCode::LCS
                | DeviceCode::LCC
                | DeviceCode::LCN
                | DeviceCode::LZ
                | DeviceCode::RD
        )
    }

    /// Returns whether the series supports this device class.
    pub fn is_supported_by(self, series: PlcSeries) -> bool {
        series.is_iq_r() || !self.is_iq_r_only()
    }

    /// Returns the unpadded ASCII device name sent for the given series.
    ///
    /// Retentive timers use the legacy two-letter names outside iQ-R.
    pub fn ascii_name(self, series: PlcSeries) -> &'static str {
        if series.is_iq_r() {
            return self.name();
        }
        match self {
            DeviceCode::STS => "SS",
            DeviceCode::STC => "SC",
            DeviceCode::STN => "SN",
            other => other.name(),
        }
    }

    /// Looks up a device code by its reference name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.name().eq_ignore_ascii_case(name))
    }

    /// Looks up a device code by its binary code.
    pub fn from_binary_code(value: u16) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.binary_code() == value)
    }

    /// Looks up a device code by the ASCII name used on the wire.
    pub fn from_ascii_name(name: &str, series: PlcSeries) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(|code| code.is_supported_by(series))
            .find(|code| code.ascii_name(series) == name)
    }

    /// Returns the largest device number representable for this code.
    ///
    /// The limit is the tighter of the binary byte width and the ASCII
    /// digit count (6 digits / 3 bytes, or 8 digits / 4 bytes on iQ-R).
    pub fn max_number(self, series: PlcSeries) -> u32 {
        match (series.is_iq_r(), self.radix()) {
            (false, 16) => 0x00FF_FFFF,
            (false, _) => 999_999,
            (true, 16) => u32::MAX,
            (true, _) => 99_999_999,
        }
    }
}

impl std::fmt::Display for DeviceCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DeviceCode {
    type Err = McError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
            .ok_or_else(|| McError::invalid_device(format!("unknown device prefix \"{}\"", s)))
    }
}

/// A device address: device class plus device number.
///
/// # Example
///
/// ```
/// use melsec_mc::{Device, PlcSeries};
///
/// let device = Device::parse("M100", PlcSeries::Q).unwrap();
/// assert_eq!(device.to_string(), "M100");
///
/// // iQ-R only devices are rejected on other series
/// assert!(Device::parse("LZ0", PlcSeries::Q).is_err());
/// assert!(Device::parse("LZ0", PlcSeries::IqR).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Device {
    code: DeviceCode,
    number: u32,
}

impl Device {
    /// Creates a device after checking it against the series limits.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidDevice` if the code is not available on the
    /// series or the number exceeds the digit budget.
    pub fn new(code: DeviceCode, number: u32, series: PlcSeries) -> Result<Self> {
        if !code.is_supported_by(series) {
            return Err(McError::invalid_device(format!(
                "device \"{}\" is not supported by {} series PLCs",
                code, series
            )));
        }
        let max = code.max_number(series);
        if number > max {
            return Err(McError::invalid_device(format!(
                "device number {} exceeds the maximum {} for \"{}\"",
                number, max, code
            )));
        }
        Ok(Self { code, number })
    }

    /// Parses a device reference such as `"D1000"`, `"X1F"` or `"ZR0"`.
    ///
    /// The device name is everything before the first decimal digit.
    /// Hexadecimal devices whose number starts with a letter need a leading
    /// zero (`"X0FF"`, not `"XFF"`).
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidDevice` if the prefix is unknown, the
    /// number is malformed, or the device is out of range for the series.
    pub fn parse(text: &str, series: PlcSeries) -> Result<Self> {
        let text = text.trim();
        let split = text
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| {
                McError::invalid_device(format!("\"{}\" has no device number", text))
            })?;
        let (prefix, digits) = text.split_at(split);
        if prefix.is_empty() {
            return Err(McError::invalid_device(format!(
                "\"{}\" has no device name",
                text
            )));
        }

        let code = DeviceCode::from_name(prefix).ok_or_else(|| {
            McError::invalid_device(format!(
                "unknown device prefix \"{}\" in \"{}\" (hexadecimal devices need a leading 0, e.g. X0FF)",
                prefix, text
            ))
        })?;
        let number = u32::from_str_radix(digits, code.radix()).map_err(|_| {
            McError::invalid_device(format!(
                "\"{}\" is not a valid base-{} number for device \"{}\"",
                digits,
                code.radix(),
                code
            ))
        })?;

        Self::new(code, number, series)
    }

    /// Returns the device class.
    pub fn code(self) -> DeviceCode {
        self.code
    }

    /// Returns the device number.
    pub fn number(self) -> u32 {
        self.number
    }

    /// Returns the device `count` numbers after this one.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidDevice` if the result leaves the valid range.
    pub fn offset(self, count: u32, series: PlcSeries) -> Result<Self> {
        let number = self.number.checked_add(count).ok_or_else(|| {
            McError::invalid_device(format!("{} + {} overflows the device range", self, count))
        })?;
        Self::new(self.code, number, series)
    }

    /// Serializes the device field in the given mode.
    pub fn to_bytes(self, series: PlcSeries, mode: TransferMode) -> Vec<u8> {
        let mut enc = Encoder::new(mode);
        self.encode(&mut enc, series);
        enc.into_bytes()
    }

    /// Parses a device field produced by [`Device::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns `McError::Frame` if the bytes are truncated and
    /// `McError::InvalidDevice` if the code or number is not valid.
    pub fn from_bytes(data: &[u8], series: PlcSeries, mode: TransferMode) -> Result<Self> {
        let mut dec = Decoder::new(mode, data);
        Self::decode(&mut dec, series)
    }

    pub(crate) fn encode(self, enc: &mut Encoder, series: PlcSeries) {
        match enc.mode() {
            TransferMode::Binary => {
                if series.is_iq_r() {
                    enc.put_u32(self.number);
                    enc.put_u16(self.code.binary_code());
                } else {
                    enc.put_raw(&self.number.to_le_bytes()[..3]);
                    enc.put_raw(&[self.code.binary_code() as u8]);
                }
            }
            TransferMode::Ascii => {
                let (name_width, digit_width) = if series.is_iq_r() { (4, 8) } else { (2, 6) };
                let name = format!("{:*<width$}", self.code.ascii_name(series), width = name_width);
                let number = if self.code.radix() == 16 {
                    format!("{:0width$X}", self.number, width = digit_width)
                } else {
                    format!("{:0width$}", self.number, width = digit_width)
                };
                enc.put_raw(name.as_bytes());
                enc.put_raw(number.as_bytes());
            }
        }
    }

    pub(crate) fn decode(dec: &mut Decoder<'_>, series: PlcSeries) -> Result<Self> {
        match dec.mode() {
            TransferMode::Binary => {
                let (number, raw_code) = if series.is_iq_r() {
                    (dec.get_u32()?, dec.get_u16()?)
                } else {
                    let n = dec.take_raw(3)?;
                    let number = u32::from_le_bytes([n[0], n[1], n[2], 0]);
                    (number, u16::from(dec.take_raw(1)?[0]))
                };
                let code = DeviceCode::from_binary_code(raw_code)
                    .filter(|code| code.is_supported_by(series))
                    .ok_or_else(|| {
                        McError::invalid_device(format!("unknown device code 0x{:02X}", raw_code))
                    })?;
                Self::new(code, number, series)
            }
            TransferMode::Ascii => {
                let (name_width, digit_width) = if series.is_iq_r() { (4, 8) } else { (2, 6) };
                let name = ascii_field(dec.take_raw(name_width)?)?;
                let name = name.trim_end_matches('*');
                let code = DeviceCode::from_ascii_name(name, series).ok_or_else(|| {
                    McError::invalid_device(format!("unknown device name \"{}\"", name))
                })?;
                let digits = ascii_field(dec.take_raw(digit_width)?)?;
                let number = u32::from_str_radix(digits, code.radix()).map_err(|_| {
                    McError::invalid_device(format!("invalid device number \"{}\"", digits))
                })?;
                Self::new(code, number, series)
            }
        }
    }
}

fn ascii_field(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|_| McError::frame("device field is not ASCII"))
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.code.radix() == 16 {
            let digits = format!("{:X}", self.number);
            // Keep the number distinguishable from the device name.
            if digits.starts_with(|c: char| c.is_ascii_alphabetic()) {
                write!(f, "{}0{}", self.code, digits)
            } else {
                write!(f, "{}{}", self.code, digits)
            }
        } else {
            write!(f, "{}{}", self.code, self.number)
        }
    }
}
