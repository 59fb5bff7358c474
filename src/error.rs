//! Error types for the MC protocol.

use std::io;
use thiserror::Error;

/// Result type alias for MC operations.
pub type Result<T> = std::result::Result<T, McError>;

/// Errors that can occur during MC communication.
#[derive(Debug, Error)]
pub enum McError {
    /// Device reference could not be parsed or is out of range.
    #[error("Invalid device: {reason}")]
    InvalidDevice {
        /// Description of the device error.
        reason: String,
    },

    /// Value does not fit the data type, or the type is not usable here.
    #[error("Data type error: {reason}")]
    DataType {
        /// Description of the type mismatch.
        reason: String,
    },

    /// Invalid parameter provided.
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },

    /// Malformed or undersized response frame.
    #[error("Malformed frame: {reason}")]
    Frame {
        /// Description of the framing error.
        reason: String,
    },

    /// Nonzero completion code returned by the PLC.
    #[error("PLC error: completion code 0x{code:04X}")]
    Protocol {
        /// Raw completion (end) code.
        code: u16,
    },

    /// Loopback echo did not match the data that was sent.
    #[error("Loopback mismatch: sent {sent:?}, received {received:?}")]
    LoopbackMismatch {
        /// Data sent to the PLC.
        sent: String,
        /// Data echoed back.
        received: String,
    },

    /// 4E serial number mismatch between request and response.
    #[error("Serial mismatch: expected 0x{expected:04X}, received 0x{received:04X}")]
    SerialMismatch {
        /// Serial sent with the request.
        expected: u16,
        /// Serial found in the response.
        received: u16,
    },

    /// Communication timeout.
    #[error("Communication timeout")]
    Timeout,

    /// I/O error on the connection.
    #[error("Connection error: {0}")]
    Connection(#[from] io::Error),
}

impl McError {
    /// Creates a new `InvalidDevice` error.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::McError;
    ///
    /// let err = McError::invalid_device("unknown device prefix \"Q\"");
    /// ```
    pub fn invalid_device(reason: impl Into<String>) -> Self {
        Self::InvalidDevice {
            reason: reason.into(),
        }
    }

    /// Creates a new `DataType` error.
    pub fn data_type(reason: impl Into<String>) -> Self {
        Self::DataType {
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidParameter` error.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::McError;
    ///
    /// let err = McError::invalid_parameter("count", "must be greater than 0");
    /// ```
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `Frame` error.
    pub fn frame(reason: impl Into<String>) -> Self {
        Self::Frame {
            reason: reason.into(),
        }
    }

    /// Creates a new `Protocol` error from a completion code.
    pub fn protocol(code: u16) -> Self {
        Self::Protocol { code }
    }

    /// Creates a new `SerialMismatch` error.
    pub fn serial_mismatch(expected: u16, received: u16) -> Self {
        Self::SerialMismatch { expected, received }
    }

    /// Returns the completion code for `Protocol` errors.
    pub fn completion_code(&self) -> Option<u16> {
        match self {
            Self::Protocol { code } => Some(*code),
            _ => None,
        }
    }
}

/// Returns a human readable description of an MC completion code.
///
/// # Example
///
/// ```
/// use melsec_mc::completion_code_description;
///
/// assert_eq!(
///     completion_code_description(0xC200),
///     "The remote password is incorrect."
/// );
/// ```
pub fn completion_code_description(code: u16) -> &'static str {
    match code {
        0x0000 => "Normal completion.",
        0x0050 => "ASCII data that cannot be converted to binary was received.",
        0x0051..=0x0054 => "The number of read or write points is outside the allowable range.",
        0x0055 => "Online change is disabled but the RUN-state CPU was requested to write data.",
        0xC056 => "The read or write request exceeds the maximum address.",
        0xC058 => "The request data length after ASCII-to-binary conversion does not match the character area.",
        0xC059 => "The command and/or subcommand are not supported by the CPU module.",
        0xC05B => "The CPU module cannot read data from or write data to the specified device.",
        0xC05C => "The request data is incorrect (e.g. bit access to a word device).",
        0xC05D => "No monitor registration.",
        0xC05F => "The request cannot be executed by the CPU module.",
        0xC060 => "The request data is incorrect (e.g. bad data for bit devices).",
        0xC061 => "The request data length does not match the number of data in the character area.",
        0xC06F => "The message format (ASCII/binary) does not match the communication data code setting.",
        0xC070 => "Device memory extension cannot be specified for the target station.",
        0xC0B5 => "The CPU module cannot handle the data specified.",
        0xC200 => "The remote password is incorrect.",
        0xC201 => "The port used for communication is locked with the remote password.",
        0xC204 => "The device is different from the one that requested the remote password unlock.",
        _ => "Unknown completion code.",
    }
}
