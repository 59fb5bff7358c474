//! Transfer-mode aware field encoding.
//!
//! Binary mode writes numeric fields little-endian. ASCII mode writes the
//! same fields as uppercase hexadecimal text of the numeric value, most
//! significant digit first, so every field takes twice as many bytes.

use crate::error::{McError, Result};
use crate::header::TransferMode;

/// Appends protocol fields to a buffer in the session's transfer mode.
#[derive(Debug, Clone)]
pub(crate) struct Encoder {
    mode: TransferMode,
    buf: Vec<u8>,
}

impl Encoder {
    pub(crate) fn new(mode: TransferMode) -> Self {
        Self {
            mode,
            buf: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(mode: TransferMode, capacity: usize) -> Self {
        Self {
            mode,
            buf: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn mode(&self) -> TransferMode {
        self.mode
    }

    pub(crate) fn put_u8(&mut self, value: u8) {
        self.put_le(&[value]);
    }

    pub(crate) fn put_u16(&mut self, value: u16) {
        self.put_le(&value.to_le_bytes());
    }

    pub(crate) fn put_u32(&mut self, value: u32) {
        self.put_le(&value.to_le_bytes());
    }

    /// Big-endian 16-bit field (the subheader).
    pub(crate) fn put_be_u16(&mut self, value: u16) {
        match self.mode {
            TransferMode::Binary => self.buf.extend_from_slice(&value.to_be_bytes()),
            TransferMode::Ascii => self
                .buf
                .extend_from_slice(format!("{:04X}", value).as_bytes()),
        }
    }

    /// One numeric field given as its little-endian bytes.
    pub(crate) fn put_le(&mut self, bytes: &[u8]) {
        match self.mode {
            TransferMode::Binary => self.buf.extend_from_slice(bytes),
            TransferMode::Ascii => {
                let be: Vec<u8> = bytes.iter().rev().copied().collect();
                self.buf
                    .extend_from_slice(hex::encode_upper(be).as_bytes());
            }
        }
    }

    /// Little-endian word data; ASCII renders each 16-bit word separately.
    pub(crate) fn put_words(&mut self, bytes: &[u8]) {
        for word in bytes.chunks(2) {
            self.put_le(word);
        }
    }

    /// Bytes copied verbatim in both modes (ASCII text fields).
    pub(crate) fn put_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads protocol fields from a response payload.
#[derive(Debug, Clone)]
pub(crate) struct Decoder<'a> {
    mode: TransferMode,
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(mode: TransferMode, data: &'a [u8]) -> Self {
        Self { mode, data, pos: 0 }
    }

    pub(crate) fn mode(&self) -> TransferMode {
        self.mode
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn take_raw(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(McError::frame(format!(
                "payload too short: needed {} more bytes at offset {}, got {}",
                count,
                self.pos,
                self.remaining()
            )));
        }
        let out = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(out)
    }

    pub(crate) fn rest_raw(&mut self) -> &'a [u8] {
        let out = &self.data[self.pos..];
        self.pos = self.data.len();
        out
    }

    /// Reads one numeric field of `width` bytes, returned little-endian.
    pub(crate) fn get_le(&mut self, width: usize) -> Result<Vec<u8>> {
        match self.mode {
            TransferMode::Binary => Ok(self.take_raw(width)?.to_vec()),
            TransferMode::Ascii => {
                let text = self.take_raw(width * 2)?;
                let mut bytes = hex::decode(text).map_err(|e| {
                    McError::frame(format!("invalid hex field {:?}: {}", text, e))
                })?;
                bytes.reverse();
                Ok(bytes)
            }
        }
    }

    /// Reads `count` 16-bit words and returns their little-endian bytes.
    pub(crate) fn get_words(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(count * 2);
        for _ in 0..count {
            out.extend_from_slice(&self.get_le(2)?);
        }
        Ok(out)
    }

    pub(crate) fn get_u8(&mut self) -> Result<u8> {
        Ok(self.get_le(1)?[0])
    }

    pub(crate) fn get_u16(&mut self) -> Result<u16> {
        let b = self.get_le(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn get_u32(&mut self) -> Result<u32> {
        let b = self.get_le(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn get_be_u16(&mut self) -> Result<u16> {
        match self.mode {
            TransferMode::Binary => {
                let b = self.take_raw(2)?;
                Ok(u16::from_be_bytes([b[0], b[1]]))
            }
            TransferMode::Ascii => self.get_u16(),
        }
    }
}
