//! Batch read/write of a contiguous device run.

use super::{put_device, Command, CommandContext, Request, BATCH_READ, BATCH_WRITE};
use super::{MAX_BATCH_BITS, MAX_BATCH_WORDS};
use crate::codec::Decoder;
use crate::datatype::{DataType, Value};
use crate::device::{Device, DeviceKind};
use crate::error::{McError, Result};
use crate::header::TransferMode;
use crate::utils::{pack_bits, unpack_bits};

fn check_bit_device(device: Device) -> Result<()> {
    if device.code().kind() == DeviceKind::Bit {
        Ok(())
    } else {
        Err(McError::data_type(format!(
            "BIT access needs a bit device, \"{}\" is not one",
            device
        )))
    }
}

fn check_points(data_type: DataType, count: usize) -> Result<usize> {
    if count == 0 {
        return Err(McError::invalid_parameter("count", "must be greater than 0"));
    }
    let (points, max) = match data_type {
        DataType::Bit => (Some(count), MAX_BATCH_BITS),
        other => (count.checked_mul(other.words()), MAX_BATCH_WORDS),
    };
    match points {
        Some(points) if points <= max => Ok(points),
        _ => Err(McError::invalid_parameter(
            "count",
            format!("{} points of {} exceed the maximum of {}", count, data_type, max),
        )),
    }
}

/// Command for reading a run of values starting at one device.
///
/// BIT reads use bit units; every other type reads `count * words()`
/// device words and splits them into values.
#[derive(Debug, Clone)]
pub struct BatchReadCommand {
    device: Device,
    count: usize,
    data_type: DataType,
    bool_encode: bool,
}

impl BatchReadCommand {
    /// Creates a new batch read command.
    ///
    /// # Arguments
    ///
    /// * `device` - First device to read
    /// * `count` - Number of values to read
    /// * `data_type` - Type of each value
    /// * `bool_encode` - Return BIT values as `Value::Bool` instead of 0/1
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidParameter` if count is 0 or the run exceeds
    /// [`MAX_BATCH_WORDS`] words / [`MAX_BATCH_BITS`] points, and
    /// `McError::DataType` for BIT access to a word device.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{BatchReadCommand, DataType, Device, PlcSeries};
    ///
    /// let device = Device::parse("D0", PlcSeries::Q).unwrap();
    /// assert!(BatchReadCommand::new(device, 480, DataType::SDWord, false).is_ok());
    /// assert!(BatchReadCommand::new(device, 481, DataType::SDWord, false).is_err());
    /// ```
    pub fn new(device: Device, count: usize, data_type: DataType, bool_encode: bool) -> Result<Self> {
        if data_type == DataType::Bit {
            check_bit_device(device)?;
        }
        check_points(data_type, count)?;
        Ok(Self {
            device,
            count,
            data_type,
            bool_encode,
        })
    }

    fn points(&self) -> usize {
        match self.data_type {
            DataType::Bit => self.count,
            other => self.count * other.words(),
        }
    }
}

impl Command for BatchReadCommand {
    type Output = Vec<Value>;

    fn request(&self, ctx: CommandContext) -> Result<Request> {
        let mut enc = ctx.encoder();
        put_device(&mut enc, self.device, ctx.series)?;
        enc.put_u16(self.points() as u16);

        let subcommand = match self.data_type {
            DataType::Bit => ctx.series.bit_subcommand(),
            _ => ctx.series.word_subcommand(),
        };
        Ok(Request::new(BATCH_READ, subcommand, enc.into_bytes()))
    }

    fn parse_response(&self, data: &[u8], ctx: CommandContext) -> Result<Vec<Value>> {
        if self.data_type == DataType::Bit {
            let bits = decode_bit_points(data, self.count, ctx.mode)?;
            return bits
                .into_iter()
                .map(|b| self.data_type.decode(&[u8::from(b)], self.bool_encode))
                .collect();
        }

        let mut dec = Decoder::new(ctx.mode, data);
        let bytes = dec.get_words(self.points())?;
        if dec.remaining() != 0 {
            return Err(McError::frame(format!(
                "{} unexpected bytes after {} words",
                dec.remaining(),
                self.points()
            )));
        }
        bytes
            .chunks(self.data_type.byte_width())
            .map(|chunk| self.data_type.decode(chunk, self.bool_encode))
            .collect()
    }
}

/// Command for writing a run of values starting at one device.
#[derive(Debug, Clone)]
pub struct BatchWriteCommand {
    device: Device,
    data_type: DataType,
    data: BatchData,
}

#[derive(Debug, Clone)]
enum BatchData {
    Bits(Vec<bool>),
    Words { bytes: Vec<u8>, points: usize },
}

impl BatchWriteCommand {
    /// Creates a new batch write command.
    ///
    /// # Arguments
    ///
    /// * `device` - First device to write
    /// * `values` - Values to write, in device order
    /// * `data_type` - Type of each value
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidParameter` if `values` is empty or too long,
    /// and `McError::DataType` if a value does not fit the type.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{BatchWriteCommand, DataType, Device, PlcSeries, Value};
    ///
    /// let device = Device::parse("D0", PlcSeries::Q).unwrap();
    /// let values = [Value::Int(0), Value::Int(10), Value::Int(20)];
    /// assert!(BatchWriteCommand::new(device, &values, DataType::SWord).is_ok());
    /// assert!(BatchWriteCommand::new(device, &[Value::Int(70000)], DataType::SWord).is_err());
    /// ```
    pub fn new(device: Device, values: &[Value], data_type: DataType) -> Result<Self> {
        if values.is_empty() {
            return Err(McError::invalid_parameter("values", "must not be empty"));
        }
        let points = check_points(data_type, values.len())?;

        let data = if data_type == DataType::Bit {
            check_bit_device(device)?;
            let bits = values
                .iter()
                .map(|v| Ok(data_type.encode(v)?[0] != 0))
                .collect::<Result<Vec<bool>>>()?;
            BatchData::Bits(bits)
        } else {
            let mut bytes = Vec::with_capacity(points * 2);
            for value in values {
                bytes.extend_from_slice(&data_type.encode(value)?);
            }
            BatchData::Words { bytes, points }
        };

        Ok(Self {
            device,
            data_type,
            data,
        })
    }

    /// Returns the type of the values being written.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

impl Command for BatchWriteCommand {
    type Output = ();

    fn request(&self, ctx: CommandContext) -> Result<Request> {
        let mut enc = ctx.encoder();
        put_device(&mut enc, self.device, ctx.series)?;

        let subcommand = match &self.data {
            BatchData::Bits(bits) => {
                enc.put_u16(bits.len() as u16);
                match ctx.mode {
                    TransferMode::Binary => enc.put_raw(&pack_bits(bits)),
                    TransferMode::Ascii => {
                        let text: Vec<u8> = bits.iter().map(|&b| if b { b'1' } else { b'0' }).collect();
                        enc.put_raw(&text);
                    }
                }
                ctx.series.bit_subcommand()
            }
            BatchData::Words { bytes, points } => {
                enc.put_u16(*points as u16);
                enc.put_words(bytes);
                ctx.series.word_subcommand()
            }
        };
        Ok(Request::new(BATCH_WRITE, subcommand, enc.into_bytes()))
    }

    fn parse_response(&self, _data: &[u8], _ctx: CommandContext) -> Result<()> {
        Ok(())
    }
}

/// Decodes bit-unit response data: nibble packed in binary, one character
/// per point in ASCII.
fn decode_bit_points(data: &[u8], count: usize, mode: TransferMode) -> Result<Vec<bool>> {
    match mode {
        TransferMode::Binary => {
            let expected = count.div_ceil(2);
            if data.len() != expected {
                return Err(McError::frame(format!(
                    "expected {} bytes for {} bit points, got {}",
                    expected,
                    count,
                    data.len()
                )));
            }
            Ok(unpack_bits(data, count))
        }
        TransferMode::Ascii => {
            if data.len() != count {
                return Err(McError::frame(format!(
                    "expected {} characters for {} bit points, got {}",
                    count,
                    count,
                    data.len()
                )));
            }
            data.iter()
                .map(|c| match c {
                    b'0' => Ok(false),
                    b'1' => Ok(true),
                    other => Err(McError::frame(format!(
                        "invalid bit point character 0x{:02X}",
                        other
                    ))),
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::PlcSeries;

    fn device(text: &str) -> Device {
        Device::parse(text, PlcSeries::Q).unwrap()
    }

    fn binary() -> CommandContext {
        CommandContext::new(PlcSeries::Q, TransferMode::Binary)
    }

    fn ascii() -> CommandContext {
        CommandContext::new(PlcSeries::Q, TransferMode::Ascii)
    }

    #[test]
    fn test_batch_read_word_request() {
        let cmd = BatchReadCommand::new(device("D100"), 3, DataType::SWord, false).unwrap();
        let request = cmd.request(binary()).unwrap();
        assert_eq!(request.command, 0x0401);
        assert_eq!(request.subcommand, 0x0000);
        assert_eq!(request.payload, vec![0x64, 0x00, 0x00, 0xA8, 0x03, 0x00]);

        let request = cmd.request(ascii()).unwrap();
        assert_eq!(request.payload, b"D*0001000003".to_vec());
    }

    #[test]
    fn test_batch_read_multiword_points() {
        let cmd = BatchReadCommand::new(device("D0"), 2, DataType::Double, false).unwrap();
        let request = cmd.request(binary()).unwrap();
        assert_eq!(&request.payload[4..], &[0x08, 0x00]);
    }

    #[test]
    fn test_batch_read_iq_r_subcommand() {
        let ctx = CommandContext::new(PlcSeries::IqR, TransferMode::Binary);
        let word = BatchReadCommand::new(device("D0"), 1, DataType::UWord, false).unwrap();
        assert_eq!(word.request(ctx).unwrap().subcommand, 0x0002);
        let bit = BatchReadCommand::new(device("M0"), 1, DataType::Bit, true).unwrap();
        assert_eq!(bit.request(ctx).unwrap().subcommand, 0x0003);
    }

    #[test]
    fn test_batch_read_limits() {
        assert!(BatchReadCommand::new(device("D0"), 0, DataType::SWord, false).is_err());
        assert!(BatchReadCommand::new(device("D0"), 960, DataType::SWord, false).is_ok());
        assert!(BatchReadCommand::new(device("D0"), 961, DataType::SWord, false).is_err());
        assert!(BatchReadCommand::new(device("M0"), 7168, DataType::Bit, true).is_ok());
        assert!(BatchReadCommand::new(device("M0"), 7169, DataType::Bit, true).is_err());
    }

    #[test]
    fn test_batch_read_huge_count() {
        let err = BatchReadCommand::new(device("D0"), usize::MAX / 2, DataType::Double, false)
            .unwrap_err();
        assert!(matches!(err, McError::InvalidParameter { .. }));
        let err = BatchReadCommand::new(device("M0"), usize::MAX, DataType::Bit, true).unwrap_err();
        assert!(matches!(err, McError::InvalidParameter { .. }));
    }

    #[test]
    fn test_batch_read_bit_on_word_device() {
        let err = BatchReadCommand::new(device("D0"), 1, DataType::Bit, true).unwrap_err();
        assert!(matches!(err, McError::DataType { .. }));
    }

    #[test]
    fn test_batch_read_word_response() {
        let cmd = BatchReadCommand::new(device("D0"), 2, DataType::SWord, false).unwrap();
        let values = cmd.parse_response(&[0xFF, 0xFF, 0x0A, 0x00], binary()).unwrap();
        assert_eq!(values, vec![Value::Int(-1), Value::Int(10)]);

        let values = cmd.parse_response(b"FFFF000A", ascii()).unwrap();
        assert_eq!(values, vec![Value::Int(-1), Value::Int(10)]);

        assert!(cmd.parse_response(&[0xFF, 0xFF], binary()).is_err());
        assert!(cmd.parse_response(&[0; 6], binary()).is_err());
    }

    #[test]
    fn test_batch_read_dword_response_ascii_word_order() {
        let cmd = BatchReadCommand::new(device("D0"), 1, DataType::UDWord, false).unwrap();
        let values = cmd.parse_response(b"56781234", ascii()).unwrap();
        assert_eq!(values, vec![Value::UInt(0x1234_5678)]);
    }

    #[test]
    fn test_batch_read_bit_response() {
        let cmd = BatchReadCommand::new(device("X0"), 5, DataType::Bit, true).unwrap();
        let expected = vec![
            Value::Bool(false),
            Value::Bool(true),
            Value::Bool(false),
            Value::Bool(true),
            Value::Bool(false),
        ];
        assert_eq!(cmd.parse_response(&[0x01, 0x01, 0x00], binary()).unwrap(), expected);
        assert_eq!(cmd.parse_response(b"01010", ascii()).unwrap(), expected);
        assert!(cmd.parse_response(b"01012", ascii()).is_err());

        let raw = BatchReadCommand::new(device("X0"), 2, DataType::Bit, false).unwrap();
        assert_eq!(
            raw.parse_response(&[0x10], binary()).unwrap(),
            vec![Value::Int(1), Value::Int(0)]
        );
    }

    #[test]
    fn test_batch_write_words() {
        let values: Vec<Value> = [0, 10, 20, 30, 40].iter().map(|&v| Value::Int(v)).collect();
        let cmd = BatchWriteCommand::new(device("D0"), &values, DataType::SWord).unwrap();
        let request = cmd.request(binary()).unwrap();
        assert_eq!(request.command, 0x1401);
        assert_eq!(request.subcommand, 0x0000);
        assert_eq!(
            hex::encode_upper(&request.payload),
            "000000A8050000000A0014001E002800"
        );

        let request = cmd.request(ascii()).unwrap();
        assert_eq!(
            String::from_utf8(request.payload).unwrap(),
            "D*00000000050000000A0014001E0028"
        );
    }

    #[test]
    fn test_batch_write_bits() {
        let values: Vec<Value> = [0, 1, 0, 1, 0].iter().map(|&v| Value::Int(v)).collect();
        let cmd = BatchWriteCommand::new(device("X0"), &values, DataType::Bit).unwrap();

        let request = cmd.request(binary()).unwrap();
        assert_eq!(request.subcommand, 0x0001);
        assert_eq!(
            request.payload,
            vec![0x00, 0x00, 0x00, 0x9C, 0x05, 0x00, 0x01, 0x01, 0x00]
        );

        let request = cmd.request(ascii()).unwrap();
        assert_eq!(request.payload, b"X*000000000501010".to_vec());
    }

    #[test]
    fn test_batch_write_float_words() {
        let cmd =
            BatchWriteCommand::new(device("D0"), &[Value::Float(1.0)], DataType::Float).unwrap();
        let request = cmd.request(ascii()).unwrap();
        // 1.0f32 = 0x3F800000, low word first
        assert_eq!(request.payload, b"D*000000000200003F80".to_vec());
    }

    #[test]
    fn test_batch_write_rejects_bad_values() {
        assert!(BatchWriteCommand::new(device("D0"), &[], DataType::SWord).is_err());
        assert!(BatchWriteCommand::new(device("X0"), &[Value::Int(2)], DataType::Bit).is_err());
        assert!(BatchWriteCommand::new(device("D0"), &[Value::Bool(true)], DataType::Bit).is_err());
        assert!(
            BatchWriteCommand::new(device("D0"), &[Value::Float(1.5)], DataType::UWord).is_err()
        );
    }

    #[test]
    fn test_device_rechecked_for_series() {
        let iq_r = Device::parse("D10000000", PlcSeries::IqR).unwrap();
        let cmd = BatchReadCommand::new(iq_r, 1, DataType::SWord, false).unwrap();
        assert!(cmd.request(binary()).is_err());
    }
}
