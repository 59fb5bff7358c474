//! MC response parsing and validation.
//!
//! This module handles parsing and validation of MC responses received from PLCs.
//!
//! # Response Structure
//!
//! | Component | Binary | ASCII | Description |
//! |-----------|:------:|:-----:|-------------|
//! | Subheader | 2 | 4 | `0xD000` (3E) or `0xD400` (4E) |
//! | Serial + reserved | 4 | 8 | 4E only |
//! | Route | 5 | 10 | Network, PC, module I/O, station (mirrored) |
//! | Length | 2 | 4 | Bytes (or characters) after this field |
//! | Completion code | 2 | 4 | 0x0000 on success |
//! | Data | Variable | Variable | Response data, or error information |
//!
//! A response is successful if the completion code is 0x0000. The declared
//! length must match the bytes that follow it exactly.
//!
//! # Example
//!
//! ```
//! use melsec_mc::{AccessOption, McResponse};
//!
//! let bytes = [
//!     0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, // subheader + route
//!     0x04, 0x00, // length
//!     0x00, 0x00, // completion code
//!     0x34, 0x12, // data
//! ];
//!
//! let response = McResponse::from_bytes(&bytes, AccessOption::default()).unwrap();
//! assert!(response.is_success());
//! assert_eq!(response.data, vec![0x34, 0x12]);
//! ```

use crate::codec::Decoder;
use crate::error::{McError, Result};
use crate::header::{AccessOption, AccessRoute, FrameVariant};

/// Parsed MC response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McResponse {
    /// Frame layout the response was parsed with.
    pub option: AccessOption,
    /// 4E serial number (`None` for 3E).
    pub serial: Option<u16>,
    /// Route mirrored by the PLC.
    pub route: AccessRoute,
    /// Completion code (0x0000 = success).
    pub end_code: u16,
    /// Response data in wire form (ASCII text in ASCII mode).
    pub data: Vec<u8>,
}

impl McResponse {
    /// Parses a complete MC response frame.
    ///
    /// # Errors
    ///
    /// Returns `McError::Frame` if:
    /// - The subheader does not match the frame variant
    /// - The frame ends before the completion code
    /// - The declared length differs from the bytes received
    pub fn from_bytes(bytes: &[u8], option: AccessOption) -> Result<Self> {
        let mode = option.transfer_mode;
        let end_code_len = 2 * mode.byte_scale();
        let min = option.response_prefix_len() + end_code_len;
        if bytes.len() < min {
            return Err(McError::frame(format!(
                "response too short: expected at least {} bytes, got {}",
                min,
                bytes.len()
            )));
        }

        let mut dec = Decoder::new(mode, bytes);
        let subheader = dec.get_be_u16()?;
        if subheader != option.response_subheader() {
            return Err(McError::frame(format!(
                "unexpected subheader 0x{:04X}, expected 0x{:04X}",
                subheader,
                option.response_subheader()
            )));
        }

        let serial = match option.frame_variant {
            FrameVariant::E3 => None,
            FrameVariant::E4 => {
                let serial = dec.get_u16()?;
                dec.get_u16()?;
                Some(serial)
            }
        };
        let route = AccessRoute {
            network: dec.get_u8()?,
            pc: dec.get_u8()?,
            module_io: dec.get_u16()?,
            station: dec.get_u8()?,
        };

        let declared = usize::from(dec.get_u16()?);
        if declared != dec.remaining() {
            return Err(McError::frame(format!(
                "declared length {} does not match the {} bytes received",
                declared,
                dec.remaining()
            )));
        }
        if declared < end_code_len {
            return Err(McError::frame(format!(
                "declared length {} leaves no room for the completion code",
                declared
            )));
        }

        let end_code = dec.get_u16()?;
        Ok(Self {
            option,
            serial,
            route,
            end_code,
            data: dec.rest_raw().to_vec(),
        })
    }

    /// Computes the full frame length from the fixed response prefix.
    ///
    /// `prefix` must hold at least [`AccessOption::response_prefix_len`]
    /// bytes; stream transports use this to know how much more to read.
    ///
    /// # Errors
    ///
    /// Returns `McError::Frame` if the prefix is too short or malformed.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{AccessOption, McResponse};
    ///
    /// let prefix = [0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x04, 0x00];
    /// assert_eq!(McResponse::frame_length(&prefix, AccessOption::default()).unwrap(), 13);
    /// ```
    pub fn frame_length(prefix: &[u8], option: AccessOption) -> Result<usize> {
        let prefix_len = option.response_prefix_len();
        if prefix.len() < prefix_len {
            return Err(McError::frame(format!(
                "response prefix too short: expected {} bytes, got {}",
                prefix_len,
                prefix.len()
            )));
        }

        let length_width = 2 * option.transfer_mode.byte_scale();
        let mut dec = Decoder::new(
            option.transfer_mode,
            &prefix[prefix_len - length_width..prefix_len],
        );
        let declared = dec.get_u16()?;
        Ok(prefix_len + usize::from(declared))
    }

    /// Returns whether the completion code indicates success.
    pub fn is_success(&self) -> bool {
        self.end_code == 0x0000
    }

    /// Validates the response and returns an error if it indicates failure.
    ///
    /// # Errors
    ///
    /// Returns `McError::Protocol` if the completion code is nonzero.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{AccessOption, McResponse};
    ///
    /// let bytes = [
    ///     0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x02, 0x00,
    ///     0x59, 0xC0, // completion code 0xC059
    /// ];
    /// let response = McResponse::from_bytes(&bytes, AccessOption::default()).unwrap();
    /// assert_eq!(response.check_error().unwrap_err().completion_code(), Some(0xC059));
    /// ```
    pub fn check_error(&self) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(McError::protocol(self.end_code))
        }
    }

    /// Validates the 4E serial number. Always succeeds for 3E responses.
    ///
    /// # Errors
    ///
    /// Returns `McError::SerialMismatch` if the serial doesn't match.
    pub fn check_serial(&self, expected: u16) -> Result<()> {
        match self.serial {
            Some(received) if received != expected => {
                Err(McError::serial_mismatch(expected, received))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::TransferMode;

    fn make_response(end_code: u16, data: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00];
        bytes.extend_from_slice(&((data.len() + 2) as u16).to_le_bytes());
        bytes.extend_from_slice(&end_code.to_le_bytes());
        bytes.extend_from_slice(data);
        bytes
    }

    #[test]
    fn test_response_from_bytes_success() {
        let bytes = make_response(0x0000, &[0x12, 0x34]);
        let response = McResponse::from_bytes(&bytes, AccessOption::default()).unwrap();

        assert_eq!(response.serial, None);
        assert_eq!(response.route, AccessRoute::default());
        assert_eq!(response.end_code, 0x0000);
        assert_eq!(response.data, vec![0x12, 0x34]);
        assert!(response.check_error().is_ok());
    }

    #[test]
    fn test_response_too_short() {
        let bytes = [0xD0, 0x00, 0x00];
        assert!(McResponse::from_bytes(&bytes, AccessOption::default()).is_err());
    }

    #[test]
    fn test_wrong_subheader() {
        let mut bytes = make_response(0, &[]);
        bytes[0] = 0x50;
        let err = McResponse::from_bytes(&bytes, AccessOption::default()).unwrap_err();
        assert!(matches!(err, McError::Frame { .. }));
    }

    #[test]
    fn test_declared_length_exceeds_received() {
        let mut bytes = make_response(0, &[0x01, 0x02]);
        bytes.pop();
        let err = McResponse::from_bytes(&bytes, AccessOption::default()).unwrap_err();
        assert!(matches!(err, McError::Frame { .. }));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = make_response(0, &[0x01, 0x02]);
        bytes.push(0xFF);
        let err = McResponse::from_bytes(&bytes, AccessOption::default()).unwrap_err();
        assert!(matches!(err, McError::Frame { .. }));
    }

    #[test]
    fn test_check_error() {
        let bytes = make_response(0xC051, &[0x00, 0xFF, 0xFF, 0x03, 0x00, 0x01, 0x04, 0x00, 0x00]);
        let response = McResponse::from_bytes(&bytes, AccessOption::default()).unwrap();
        match response.check_error().unwrap_err() {
            McError::Protocol { code } => assert_eq!(code, 0xC051),
            other => panic!("Expected Protocol, got {:?}", other),
        }
    }

    #[test]
    fn test_4e_serial() {
        let bytes = [
            0xD4, 0x00, 0x34, 0x12, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x02, 0x00, 0x00,
            0x00,
        ];
        let option = AccessOption::new(TransferMode::Binary, FrameVariant::E4);
        let response = McResponse::from_bytes(&bytes, option).unwrap();
        assert_eq!(response.serial, Some(0x1234));
        assert!(response.check_serial(0x1234).is_ok());
        assert!(matches!(
            response.check_serial(0x0001),
            Err(McError::SerialMismatch { expected: 0x0001, received: 0x1234 })
        ));
    }

    #[test]
    fn test_ascii_response() {
        let text = b"D00000FF03FF00000800001234";
        let option = AccessOption::new(TransferMode::Ascii, FrameVariant::E3);
        assert_eq!(McResponse::frame_length(text, option).unwrap(), text.len());

        let response = McResponse::from_bytes(text, option).unwrap();
        assert!(response.is_success());
        assert_eq!(response.data, b"1234".to_vec());
    }

    #[test]
    fn test_ascii_4e_response() {
        let text = b"D4000001000000FF03FF000004C059";
        let option = AccessOption::new(TransferMode::Ascii, FrameVariant::E4);
        assert_eq!(McResponse::frame_length(text, option).unwrap(), text.len());

        let response = McResponse::from_bytes(text, option).unwrap();
        assert_eq!(response.serial, Some(1));
        assert_eq!(response.end_code, 0xC059);
    }

    #[test]
    fn test_frame_length_short_prefix() {
        assert!(McResponse::frame_length(&[0xD0, 0x00], AccessOption::default()).is_err());
    }
}
