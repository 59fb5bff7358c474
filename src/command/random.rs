//! Random (listed device) read/write.

use super::{put_device, Command, CommandContext, Request, MAX_RANDOM_POINTS};
use super::{RANDOM_READ, RANDOM_WRITE};
use crate::codec::Decoder;
use crate::device::{Device, DeviceKind};
use crate::error::{McError, Result};

fn check_count(parameter: &str, count: usize) -> Result<()> {
    if count > MAX_RANDOM_POINTS {
        return Err(McError::invalid_parameter(
            parameter,
            format!("{} devices exceed the maximum of {}", count, MAX_RANDOM_POINTS),
        ));
    }
    Ok(())
}

/// Command for reading a list of word and double word devices.
///
/// The response holds the word values first and then the double word
/// values, each in the order the devices were given.
#[derive(Debug, Clone)]
pub struct RandomReadCommand {
    word_devices: Vec<Device>,
    dword_devices: Vec<Device>,
}

impl RandomReadCommand {
    /// Creates a new random read command.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidParameter` if both lists are empty or either
    /// holds more than [`MAX_RANDOM_POINTS`] devices.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{Device, PlcSeries, RandomReadCommand};
    ///
    /// let d0 = Device::parse("D0", PlcSeries::Q).unwrap();
    /// let d10 = Device::parse("D10", PlcSeries::Q).unwrap();
    /// assert!(RandomReadCommand::new(vec![d0], vec![d10]).is_ok());
    /// assert!(RandomReadCommand::new(vec![], vec![]).is_err());
    /// ```
    pub fn new(word_devices: Vec<Device>, dword_devices: Vec<Device>) -> Result<Self> {
        if word_devices.is_empty() && dword_devices.is_empty() {
            return Err(McError::invalid_parameter(
                "devices",
                "at least one word or double word device is required",
            ));
        }
        check_count("word_devices", word_devices.len())?;
        check_count("dword_devices", dword_devices.len())?;
        Ok(Self {
            word_devices,
            dword_devices,
        })
    }
}

impl Command for RandomReadCommand {
    type Output = (Vec<i16>, Vec<i32>);

    fn request(&self, ctx: CommandContext) -> Result<Request> {
        let mut enc = ctx.encoder();
        enc.put_u8(self.word_devices.len() as u8);
        enc.put_u8(self.dword_devices.len() as u8);
        for &device in self.word_devices.iter().chain(&self.dword_devices) {
            put_device(&mut enc, device, ctx.series)?;
        }
        Ok(Request::new(
            RANDOM_READ,
            ctx.series.word_subcommand(),
            enc.into_bytes(),
        ))
    }

    fn parse_response(&self, data: &[u8], ctx: CommandContext) -> Result<Self::Output> {
        let mut dec = Decoder::new(ctx.mode, data);
        let words = self
            .word_devices
            .iter()
            .map(|_| Ok(dec.get_u16()? as i16))
            .collect::<Result<Vec<_>>>()?;
        let dwords = self
            .dword_devices
            .iter()
            .map(|_| Ok(dec.get_u32()? as i32))
            .collect::<Result<Vec<_>>>()?;
        if dec.remaining() != 0 {
            return Err(McError::frame(format!(
                "{} unexpected bytes after random read data",
                dec.remaining()
            )));
        }
        Ok((words, dwords))
    }
}

/// Command for writing a list of word and double word devices.
#[derive(Debug, Clone)]
pub struct RandomWriteCommand {
    words: Vec<(Device, i16)>,
    dwords: Vec<(Device, i32)>,
}

impl RandomWriteCommand {
    /// Creates a new random write command.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidParameter` if a device list and its value
    /// list differ in length, both are empty, or either exceeds
    /// [`MAX_RANDOM_POINTS`].
    pub fn new(
        word_devices: Vec<Device>,
        word_values: &[i16],
        dword_devices: Vec<Device>,
        dword_values: &[i32],
    ) -> Result<Self> {
        if word_devices.len() != word_values.len() {
            return Err(McError::invalid_parameter(
                "word_values",
                format!(
                    "{} values for {} devices",
                    word_values.len(),
                    word_devices.len()
                ),
            ));
        }
        if dword_devices.len() != dword_values.len() {
            return Err(McError::invalid_parameter(
                "dword_values",
                format!(
                    "{} values for {} devices",
                    dword_values.len(),
                    dword_devices.len()
                ),
            ));
        }
        if word_devices.is_empty() && dword_devices.is_empty() {
            return Err(McError::invalid_parameter(
                "devices",
                "at least one word or double word device is required",
            ));
        }
        check_count("word_devices", word_devices.len())?;
        check_count("dword_devices", dword_devices.len())?;

        Ok(Self {
            words: word_devices.into_iter().zip(word_values.iter().copied()).collect(),
            dwords: dword_devices.into_iter().zip(dword_values.iter().copied()).collect(),
        })
    }
}

impl Command for RandomWriteCommand {
    type Output = ();

    fn request(&self, ctx: CommandContext) -> Result<Request> {
        let mut enc = ctx.encoder();
        enc.put_u8(self.words.len() as u8);
        enc.put_u8(self.dwords.len() as u8);
        for &(device, value) in &self.words {
            put_device(&mut enc, device, ctx.series)?;
            enc.put_u16(value as u16);
        }
        for &(device, value) in &self.dwords {
            put_device(&mut enc, device, ctx.series)?;
            enc.put_u32(value as u32);
        }
        Ok(Request::new(
            RANDOM_WRITE,
            ctx.series.word_subcommand(),
            enc.into_bytes(),
        ))
    }

    fn parse_response(&self, _data: &[u8], _ctx: CommandContext) -> Result<()> {
        Ok(())
    }
}

/// Command for writing a list of bit devices.
#[derive(Debug, Clone)]
pub struct RandomBitWriteCommand {
    points: Vec<(Device, bool)>,
}

impl RandomBitWriteCommand {
    /// Creates a new random bit write command.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidParameter` if the lists differ in length,
    /// are empty or too long, and `McError::DataType` if a device is not a
    /// bit device.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{Device, PlcSeries, RandomBitWriteCommand};
    ///
    /// let sm211 = Device::parse("SM211", PlcSeries::Q).unwrap();
    /// let sm213 = Device::parse("SM213", PlcSeries::Q).unwrap();
    /// assert!(RandomBitWriteCommand::new(vec![sm211, sm213], &[false, false]).is_ok());
    /// ```
    pub fn new(devices: Vec<Device>, values: &[bool]) -> Result<Self> {
        if devices.len() != values.len() {
            return Err(McError::invalid_parameter(
                "values",
                format!("{} values for {} devices", values.len(), devices.len()),
            ));
        }
        if devices.is_empty() {
            return Err(McError::invalid_parameter("devices", "must not be empty"));
        }
        check_count("devices", devices.len())?;
        if let Some(device) = devices.iter().find(|d| d.code().kind() != DeviceKind::Bit) {
            return Err(McError::data_type(format!(
                "random bit write needs bit devices, \"{}\" is not one",
                device
            )));
        }

        Ok(Self {
            points: devices.into_iter().zip(values.iter().copied()).collect(),
        })
    }
}

impl Command for RandomBitWriteCommand {
    type Output = ();

    fn request(&self, ctx: CommandContext) -> Result<Request> {
        let mut enc = ctx.encoder();
        enc.put_u8(self.points.len() as u8);
        for &(device, value) in &self.points {
            put_device(&mut enc, device, ctx.series)?;
            if ctx.series.is_iq_r() {
                enc.put_u16(u16::from(value));
            } else {
                enc.put_u8(u8::from(value));
            }
        }
        Ok(Request::new(
            RANDOM_WRITE,
            ctx.series.bit_subcommand(),
            enc.into_bytes(),
        ))
    }

    fn parse_response(&self, _data: &[u8], _ctx: CommandContext) -> Result<()> {
        Ok(())
    }
}
