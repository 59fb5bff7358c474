//! Data types and host-side values.
//!
//! A [`DataType`] describes how a value is laid out in PLC device memory. All
//! numeric types are little-endian and occupy whole 16-bit device words.
//!
//! | Type | Symbol | Words | Domain |
//! |------|:------:|:-----:|--------|
//! | BIT | `b` | 1 | `Bool` (or integer 0/1) |
//! | SWORD / UWORD | `h` / `H` | 1 | `Int` / `UInt` |
//! | SDWORD / UDWORD | `i` / `I` | 2 | `Int` / `UInt` |
//! | FLOAT | `f` | 2 | `Float` (f32) |
//! | DOUBLE | `d` | 4 | `Float` (f64) |
//! | SLWORD / ULWORD | `q` / `Q` | 4 | `Int` / `UInt` |
//!
//! # Example
//!
//! ```
//! use melsec_mc::{DataType, Value};
//!
//! let bytes = DataType::SWord.encode(&Value::Int(-2)).unwrap();
//! assert_eq!(bytes, vec![0xFE, 0xFF]);
//! assert_eq!(DataType::SWord.decode(&bytes, false).unwrap(), Value::Int(-2));
//!
//! let ty: DataType = "f".parse().unwrap();
//! assert_eq!(ty, DataType::Float);
//! ```

use std::str::FromStr;

use crate::error::{McError, Result};

/// Host-side value of any data type.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Boolean (BIT).
    Bool(bool),
    /// Signed integer (SWORD, SDWORD, SLWORD).
    Int(i64),
    /// Unsigned integer (UWORD, UDWORD, ULWORD).
    UInt(u64),
    /// Floating point (FLOAT, DOUBLE).
    Float(f64),
}

impl Value {
    /// Returns the boolean value, accepting integer 0 and 1.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            Value::Int(0) | Value::UInt(0) => Some(false),
            Value::Int(1) | Value::UInt(1) => Some(true),
            _ => None,
        }
    }

    /// Returns the value as a signed integer if it is integral and fits.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(v) => Some(v),
            Value::UInt(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Returns the value as an unsigned integer if it is integral and fits.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::Int(v) => u64::try_from(v).ok(),
            Value::UInt(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the floating point value.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    fn as_integer(&self) -> Option<i128> {
        match *self {
            Value::Int(v) => Some(i128::from(v)),
            Value::UInt(v) => Some(i128::from(v)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::UInt(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

/// Layout of a value in device memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    /// Single bit point.
    Bit,
    /// Signed 16-bit word.
    SWord,
    /// Unsigned 16-bit word.
    UWord,
    /// Signed 32-bit double word.
    SDWord,
    /// Unsigned 32-bit double word.
    UDWord,
    /// 32-bit IEEE float.
    Float,
    /// 64-bit IEEE float.
    Double,
    /// Signed 64-bit long word.
    SLWord,
    /// Unsigned 64-bit long word.
    ULWord,
}

impl DataType {
    /// Returns the canonical upper-case name (`"SWORD"`).
    pub fn name(self) -> &'static str {
        match self {
            DataType::Bit => "BIT",
            DataType::SWord => "SWORD",
            DataType::UWord => "UWORD",
            DataType::SDWord => "SDWORD",
            DataType::UDWord => "UDWORD",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::SLWord => "SLWORD",
            DataType::ULWord => "ULWORD",
        }
    }

    /// Returns the one-letter symbol (`'h'` for SWORD).
    pub fn symbol(self) -> char {
        match self {
            DataType::Bit => 'b',
            DataType::SWord => 'h',
            DataType::UWord => 'H',
            DataType::SDWord => 'i',
            DataType::UDWord => 'I',
            DataType::Float => 'f',
            DataType::Double => 'd',
            DataType::SLWord => 'q',
            DataType::ULWord => 'Q',
        }
    }

    /// Returns the number of bytes of an encoded value.
    ///
    /// BIT encodes to a single 0/1 byte.
    pub fn byte_width(self) -> usize {
        match self {
            DataType::Bit => 1,
            DataType::SWord | DataType::UWord => 2,
            DataType::SDWord | DataType::UDWord | DataType::Float => 4,
            DataType::Double | DataType::SLWord | DataType::ULWord => 8,
        }
    }

    /// Returns the number of 16-bit device words a value occupies.
    pub fn words(self) -> usize {
        match self {
            DataType::Bit => 1,
            other => other.byte_width() / 2,
        }
    }

    /// Returns whether the type is signed.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            DataType::SWord
                | DataType::SDWord
                | DataType::SLWord
                | DataType::Float
                | DataType::Double
        )
    }

    /// Returns whether the type holds numbers rather than a boolean.
    pub fn is_numeric(self) -> bool {
        !matches!(self, DataType::Bit)
    }

    /// Returns whether the type is floating point.
    pub fn is_float(self) -> bool {
        matches!(self, DataType::Float | DataType::Double)
    }

    /// Encodes a value as little-endian bytes.
    ///
    /// # Errors
    ///
    /// Returns `McError::DataType` if the value is of the wrong kind or out
    /// of range for this type.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{DataType, Value};
    ///
    /// assert_eq!(DataType::UDWord.encode(&Value::UInt(1)).unwrap(), vec![1, 0, 0, 0]);
    /// assert!(DataType::UWord.encode(&Value::Int(-1)).is_err());
    /// assert!(DataType::SWord.encode(&Value::Float(1.0)).is_err());
    /// ```
    pub fn encode(self, value: &Value) -> Result<Vec<u8>> {
        match self {
            DataType::Bit => value
                .as_bool()
                .map(|b| vec![u8::from(b)])
                .ok_or_else(|| self.mismatch(value)),
            DataType::Float => {
                let v = value.as_f64().ok_or_else(|| self.mismatch(value))?;
                if v.is_finite() && v.abs() > f64::from(f32::MAX) {
                    return Err(self.out_of_range(value));
                }
                Ok((v as f32).to_le_bytes().to_vec())
            }
            DataType::Double => value
                .as_f64()
                .map(|v| v.to_le_bytes().to_vec())
                .ok_or_else(|| self.mismatch(value)),
            _ => {
                let v = value.as_integer().ok_or_else(|| self.mismatch(value))?;
                let (min, max) = self.integer_range();
                if v < min || v > max {
                    return Err(self.out_of_range(value));
                }
                // Two's complement little-endian, truncated to the type width.
                Ok(v.to_le_bytes()[..self.byte_width()].to_vec())
            }
        }
    }

    /// Decodes little-endian bytes into a value.
    ///
    /// BIT decodes to `Value::Bool` when `bool_encode` is set, otherwise to
    /// `Value::Int(0 | 1)`.
    ///
    /// # Errors
    ///
    /// Returns `McError::Frame` if `data` is not exactly `byte_width()` long.
    pub fn decode(self, data: &[u8], bool_encode: bool) -> Result<Value> {
        if data.len() != self.byte_width() {
            return Err(McError::frame(format!(
                "{} needs {} bytes, got {}",
                self,
                self.byte_width(),
                data.len()
            )));
        }

        let value = match self {
            DataType::Bit => {
                let bit = data[0] != 0;
                if bool_encode {
                    Value::Bool(bit)
                } else {
                    Value::Int(i64::from(bit))
                }
            }
            DataType::SWord => Value::Int(i16::from_le_bytes([data[0], data[1]]).into()),
            DataType::UWord => Value::UInt(u16::from_le_bytes([data[0], data[1]]).into()),
            DataType::SDWord => Value::Int(i32::from_le_bytes(le_array(data)).into()),
            DataType::UDWord => Value::UInt(u32::from_le_bytes(le_array(data)).into()),
            DataType::Float => Value::Float(f32::from_le_bytes(le_array(data)).into()),
            DataType::Double => Value::Float(f64::from_le_bytes(le_array(data))),
            DataType::SLWord => Value::Int(i64::from_le_bytes(le_array(data))),
            DataType::ULWord => Value::UInt(u64::from_le_bytes(le_array(data))),
        };
        Ok(value)
    }

    fn integer_range(self) -> (i128, i128) {
        match self {
            DataType::SWord => (i16::MIN.into(), i16::MAX.into()),
            DataType::UWord => (0, u16::MAX.into()),
            DataType::SDWord => (i32::MIN.into(), i32::MAX.into()),
            DataType::UDWord => (0, u32::MAX.into()),
            DataType::SLWord => (i64::MIN.into(), i64::MAX.into()),
            DataType::ULWord => (0, u64::MAX.into()),
            _ => (0, 1),
        }
    }

    fn mismatch(self, value: &Value) -> McError {
        McError::data_type(format!("{} cannot hold value {:?}", self, value))
    }

    fn out_of_range(self, value: &Value) -> McError {
        McError::data_type(format!("value {} is out of range for {}", value, self))
    }
}

fn le_array<const N: usize>(data: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&data[..N]);
    out
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for DataType {
    type Err = McError;

    fn from_str(s: &str) -> Result<Self> {
        let ty = match s {
            "BIT" | "b" => DataType::Bit,
            "SWORD" | "h" => DataType::SWord,
            "UWORD" | "H" => DataType::UWord,
            "SDWORD" | "i" => DataType::SDWord,
            "UDWORD" | "I" => DataType::UDWord,
            "FLOAT" | "f" => DataType::Float,
            "DOUBLE" | "d" => DataType::Double,
            "SLWORD" | "q" => DataType::SLWord,
            "ULWORD" | "Q" => DataType::ULWord,
            other => {
                return Err(McError::data_type(format!(
                    "unknown data type \"{}\"",
                    other
                )))
            }
        };
        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [DataType; 9] = [
        DataType::Bit,
        DataType::SWord,
        DataType::UWord,
        DataType::SDWord,
        DataType::UDWord,
        DataType::Float,
        DataType::Double,
        DataType::SLWord,
        DataType::ULWord,
    ];

    #[test]
    fn test_words() {
        let words: Vec<usize> = ALL.iter().map(|t| t.words()).collect();
        assert_eq!(words, vec![1, 1, 1, 2, 2, 2, 4, 4, 4]);
    }

    #[test]
    fn test_parse_names_and_symbols() {
        for ty in ALL {
            assert_eq!(ty.name().parse::<DataType>().unwrap(), ty);
            assert_eq!(ty.symbol().to_string().parse::<DataType>().unwrap(), ty);
        }
        assert!("WORD".parse::<DataType>().is_err());
    }

    #[test]
    fn test_integer_boundaries() {
        let cases: [(DataType, Value, Value); 6] = [
            (DataType::SWord, Value::Int(i16::MIN.into()), Value::Int(i16::MAX.into())),
            (DataType::UWord, Value::UInt(0), Value::UInt(u16::MAX.into())),
            (DataType::SDWord, Value::Int(i32::MIN.into()), Value::Int(i32::MAX.into())),
            (DataType::UDWord, Value::UInt(0), Value::UInt(u32::MAX.into())),
            (DataType::SLWord, Value::Int(i64::MIN), Value::Int(i64::MAX)),
            (DataType::ULWord, Value::UInt(0), Value::UInt(u64::MAX)),
        ];
        for (ty, min, max) in cases {
            for v in [min, max] {
                let bytes = ty.encode(&v).unwrap();
                assert_eq!(bytes.len(), ty.byte_width());
                assert_eq!(ty.decode(&bytes, false).unwrap(), v, "{}", ty);
            }
        }
    }

    #[test]
    fn test_integer_out_of_range() {
        assert!(DataType::SWord.encode(&Value::Int(32768)).is_err());
        assert!(DataType::SWord.encode(&Value::Int(-32769)).is_err());
        assert!(DataType::UWord.encode(&Value::UInt(65536)).is_err());
        assert!(DataType::UDWord.encode(&Value::Int(-1)).is_err());
        assert!(DataType::SLWord.encode(&Value::UInt(u64::MAX)).is_err());
    }

    #[test]
    fn test_unsigned_accepts_positive_int() {
        assert_eq!(DataType::UWord.encode(&Value::Int(513)).unwrap(), vec![0x01, 0x02]);
    }

    #[test]
    fn test_negative_le_bytes() {
        assert_eq!(
            DataType::SDWord.encode(&Value::Int(-2)).unwrap(),
            vec![0xFE, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_bit() {
        assert_eq!(DataType::Bit.encode(&Value::Bool(true)).unwrap(), vec![1]);
        assert_eq!(DataType::Bit.encode(&Value::Int(0)).unwrap(), vec![0]);
        assert_eq!(DataType::Bit.encode(&Value::UInt(1)).unwrap(), vec![1]);
        assert!(DataType::Bit.encode(&Value::Int(2)).is_err());
        assert!(DataType::Bit.encode(&Value::Float(1.0)).is_err());

        assert_eq!(DataType::Bit.decode(&[1], true).unwrap(), Value::Bool(true));
        assert_eq!(DataType::Bit.decode(&[1], false).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_floats() {
        let bytes = DataType::Float.encode(&Value::Float(1.5)).unwrap();
        assert_eq!(bytes, 1.5f32.to_le_bytes().to_vec());
        assert_eq!(DataType::Float.decode(&bytes, false).unwrap(), Value::Float(1.5));

        let bytes = DataType::Double.encode(&Value::Float(-0.1)).unwrap();
        assert_eq!(DataType::Double.decode(&bytes, false).unwrap(), Value::Float(-0.1));

        assert!(DataType::Float.encode(&Value::Float(1e39)).is_err());
        assert!(DataType::Float.encode(&Value::Int(1)).is_err());
        assert!(DataType::Double.encode(&Value::Bool(true)).is_err());
    }

    #[test]
    fn test_decode_wrong_length() {
        let err = DataType::SDWord.decode(&[0, 0], false).unwrap_err();
        assert!(matches!(err, McError::Frame { .. }));
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(-5i16), Value::Int(-5));
        assert_eq!(Value::from(7u32), Value::UInt(7));
        assert_eq!(Value::from(0.5f32), Value::Float(0.5));
        assert_eq!(Value::UInt(3).as_i64(), Some(3));
        assert_eq!(Value::Int(-3).as_u64(), None);
        assert_eq!(Value::Int(1).as_bool(), Some(true));
    }
}
