//! PLC series definitions.
//!
//! The series selects the subcommand family (iQ-R uses the extended
//! device field), the device-number digit budget, the set of
//! available devices and the remote password rule.
//!
//! # Example
//!
//! ```
//! use melsec_mc::{PasswordRule, PlcSeries};
//!
//! let series: PlcSeries = "iQ-R".parse().unwrap();
//! assert!(series.is_iq_r());
//! assert_eq!(series.password_rule(), PasswordRule::Range { min: 6, max: 32 });
//! assert_eq!(PlcSeries::Q.password_rule(), PasswordRule::Fixed(4));
//! ```

use std::str::FromStr;

use crate::error::{McError, Result};

/// Word-unit subcommand for Q/L/QnA/iQ-L.
const SUBCOMMAND_WORD: u16 = 0x0000;
/// Bit-unit subcommand for Q/L/QnA/iQ-L.
const SUBCOMMAND_BIT: u16 = 0x0001;
/// Word-unit subcommand for iQ-R.
const SUBCOMMAND_WORD_IQ_R: u16 = 0x0002;
/// Bit-unit subcommand for iQ-R.
const SUBCOMMAND_BIT_IQ_R: u16 = 0x0003;

/// Mitsubishi PLC series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlcSeries {
    /// MELSEC-Q series.
    #[default]
    Q,
    /// MELSEC-L series.
    L,
    /// MELSEC-QnA series.
    QnA,
    /// MELSEC iQ-L series.
    IqL,
    /// MELSEC iQ-R series.
    IqR,
}

impl PlcSeries {
    /// Returns whether this is the iQ-R series.
    pub fn is_iq_r(self) -> bool {
        matches!(self, PlcSeries::IqR)
    }

    /// Returns the default remote password rule for this series.
    pub fn password_rule(self) -> PasswordRule {
        if self.is_iq_r() {
            PasswordRule::Range { min: 6, max: 32 }
        } else {
            PasswordRule::Fixed(4)
        }
    }

    pub(crate) fn word_subcommand(self) -> u16 {
        if self.is_iq_r() {
            SUBCOMMAND_WORD_IQ_R
        } else {
            SUBCOMMAND_WORD
        }
    }

    pub(crate) fn bit_subcommand(self) -> u16 {
        if self.is_iq_r() {
            SUBCOMMAND_BIT_IQ_R
        } else {
            SUBCOMMAND_BIT
        }
    }
}

impl std::fmt::Display for PlcSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlcSeries::Q => write!(f, "Q"),
            PlcSeries::L => write!(f, "L"),
            PlcSeries::QnA => write!(f, "QnA"),
            PlcSeries::IqL => write!(f, "iQ-L"),
            PlcSeries::IqR => write!(f, "iQ-R"),
        }
    }
}

impl FromStr for PlcSeries {
    type Err = McError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Q" => Ok(PlcSeries::Q),
            "L" => Ok(PlcSeries::L),
            "QnA" => Ok(PlcSeries::QnA),
            "iQ-L" => Ok(PlcSeries::IqL),
            "iQ-R" => Ok(PlcSeries::IqR),
            other => Err(McError::invalid_parameter(
                "plc_series",
                format!("\"{}\" is not one of Q, L, QnA, iQ-L, iQ-R", other),
            )),
        }
    }
}

/// Remote password length rule applied by lock/unlock commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PasswordRule {
    /// Password is NUL-padded or truncated to exactly this many bytes.
    Fixed(usize),
    /// Password length must fall within `min..=max`.
    Range {
        /// Minimum length.
        min: usize,
        /// Maximum length.
        max: usize,
    },
}

impl PasswordRule {
    /// Converts a password to the bytes sent on the wire.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidParameter` if the password contains
    /// non-ASCII characters or violates a `Range` rule.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::PasswordRule;
    ///
    /// assert_eq!(PasswordRule::Fixed(4).apply("ab").unwrap(), b"ab\0\0".to_vec());
    /// assert_eq!(PasswordRule::Fixed(4).apply("abcdef").unwrap(), b"abcd".to_vec());
    /// assert!(PasswordRule::Range { min: 6, max: 32 }.apply("abc").is_err());
    /// ```
    pub fn apply(self, password: &str) -> Result<Vec<u8>> {
        if !password.is_ascii() {
            return Err(McError::invalid_parameter(
                "password",
                "must contain only ASCII characters",
            ));
        }

        let bytes = password.as_bytes();
        match self {
            PasswordRule::Fixed(len) => {
                let mut out = bytes[..bytes.len().min(len)].to_vec();
                out.resize(len, 0x00);
                Ok(out)
            }
            PasswordRule::Range { min, max } => {
                if bytes.len() < min || bytes.len() > max {
                    return Err(McError::invalid_parameter(
                        "password",
                        format!("length must be from {} to {}", min, max),
                    ));
                }
                Ok(bytes.to_vec())
            }
        }
    }
}
