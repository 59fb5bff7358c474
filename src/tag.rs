//! Tags for mixed-type device access.
//!
//! A [`Tag`] names a device and the type stored there. Mixed reads and
//! writes accept a list of tags and return one [`TagResult`] per tag, in the
//! same order. A tag that cannot be sent (bad device text, wrong type or
//! value) gets a [`TagError`] without failing the rest of the list.
//!
//! # Example
//!
//! ```
//! use melsec_mc::{DataType, Tag, TagError, TagResult, Value};
//!
//! let tags = [
//!     Tag::read("D0", DataType::SWord),
//!     Tag::write("D10", DataType::Float, 1.5f32),
//! ];
//! assert!(tags[0].value.is_none());
//!
//! let result = TagResult::failed(&tags[0], TagError::InvalidDevice("bad".into()));
//! assert!(!result.is_ok());
//! ```

use thiserror::Error;

use crate::datatype::{DataType, Value};
use crate::error::McError;

/// One device/type pair in a mixed read or write.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag {
    /// Device reference, e.g. `"D100"`.
    pub device: String,
    /// Type stored at the device.
    pub data_type: DataType,
    /// Value to write (`None` for reads).
    pub value: Option<Value>,
}

impl Tag {
    /// Creates a tag for reading.
    pub fn read(device: impl Into<String>, data_type: DataType) -> Self {
        Self {
            device: device.into(),
            data_type,
            value: None,
        }
    }

    /// Creates a tag carrying a value to write.
    pub fn write(device: impl Into<String>, data_type: DataType, value: impl Into<Value>) -> Self {
        Self {
            device: device.into(),
            data_type,
            value: Some(value.into()),
        }
    }
}

/// Why a single tag was not read or written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// The device reference could not be used.
    #[error("Invalid device: {0}")]
    InvalidDevice(String),
    /// The type or value could not be used.
    #[error("Data type error: {0}")]
    DataType(String),
}

impl TagError {
    /// Converts a validation error into a per-tag error.
    pub(crate) fn from_error(err: McError) -> Self {
        match err {
            McError::InvalidDevice { reason } => TagError::InvalidDevice(reason),
            McError::DataType { reason } => TagError::DataType(reason),
            other => TagError::DataType(other.to_string()),
        }
    }
}

impl From<TagError> for McError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::InvalidDevice(reason) => McError::InvalidDevice { reason },
            TagError::DataType(reason) => McError::DataType { reason },
        }
    }
}

/// Outcome of one tag in a mixed read or write.
#[derive(Debug, Clone, PartialEq)]
pub struct TagResult {
    /// Device reference as given in the tag.
    pub device: String,
    /// Type of the tag.
    pub data_type: DataType,
    /// Value read (or written), or the reason the tag was skipped.
    pub outcome: Result<Value, TagError>,
}

impl TagResult {
    /// Creates a successful result for a tag.
    pub fn succeeded(tag: &Tag, value: Value) -> Self {
        Self {
            device: tag.device.clone(),
            data_type: tag.data_type,
            outcome: Ok(value),
        }
    }

    /// Creates a failed result for a tag.
    pub fn failed(tag: &Tag, error: TagError) -> Self {
        Self {
            device: tag.device.clone(),
            data_type: tag.data_type,
            outcome: Err(error),
        }
    }

    /// Returns whether the tag succeeded.
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Returns the value, if the tag succeeded.
    pub fn value(&self) -> Option<&Value> {
        self.outcome.as_ref().ok()
    }

    /// Returns the error, if the tag failed.
    pub fn error(&self) -> Option<&TagError> {
        self.outcome.as_ref().err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_constructors() {
        let tag = Tag::write("D0", DataType::SWord, -5i16);
        assert_eq!(tag.value, Some(Value::Int(-5)));
        assert_eq!(Tag::read("M0", DataType::Bit).value, None);
    }

    #[test]
    fn test_tag_error_conversion() {
        let err = TagError::from_error(McError::invalid_device("unknown device prefix \"Q\""));
        assert_eq!(err, TagError::InvalidDevice("unknown device prefix \"Q\"".into()));

        let mc: McError = TagError::DataType("no value".into()).into();
        assert!(matches!(mc, McError::DataType { .. }));
    }

    #[test]
    fn test_result_accessors() {
        let tag = Tag::read("D0", DataType::UWord);
        let ok = TagResult::succeeded(&tag, Value::UInt(3));
        assert_eq!(ok.value(), Some(&Value::UInt(3)));
        assert!(ok.error().is_none());

        let failed = TagResult::failed(&tag, TagError::DataType("x".into()));
        assert!(failed.value().is_none());
        assert_eq!(failed.error(), Some(&TagError::DataType("x".into())));
    }
}
