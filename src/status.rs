//! Results of the diagnostic and remote operations.
//!
//! CPU and switch status are decoded from special registers: SD203 holds
//! the operating state (bits 0-3) and the STOP/PAUSE cause (bits 4-7),
//! SD200 holds the position of the RUN/STOP/RESET switch.
//!
//! # Example
//!
//! ```
//! use melsec_mc::{CpuState, CpuStatus, StopCause, SwitchStatus};
//!
//! let status = CpuStatus::from_register(0x0012);
//! assert_eq!(status.state, CpuState::Stop);
//! assert_eq!(status.cause, StopCause::RemoteRelay);
//!
//! assert_eq!(SwitchStatus::from_register(1), SwitchStatus::Stop);
//! ```

use crate::utils::{extract_bits, get_bit};

/// CPU model name and code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CpuModel {
    /// Model name with padding removed, e.g. `"Q03UDVCPU"`.
    pub name: String,
    /// Model code.
    pub code: u16,
}

impl std::fmt::Display for CpuModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (0x{:04X})", self.name, self.code)
    }
}

/// Operating state of the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CpuState {
    /// RUN.
    Run,
    /// Step RUN.
    StepRun,
    /// STOP.
    Stop,
    /// PAUSE.
    Pause,
    /// Value not defined by the protocol.
    Unknown,
}

/// Why the CPU was stopped or paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopCause {
    /// RUN/STOP switch.
    BySwitch,
    /// Remote contact.
    RemoteRelay,
    /// Remote operation from a peripheral or network device.
    RemoteDevice,
    /// Instruction in the program.
    ByProgram,
    /// Error.
    ByError,
    /// Value not defined by the protocol.
    Unknown,
}

/// CPU state and STOP/PAUSE cause (SD203).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CpuStatus {
    /// Operating state.
    pub state: CpuState,
    /// STOP/PAUSE cause.
    pub cause: StopCause,
}

impl CpuStatus {
    /// Decodes the SD203 register value.
    ///
    /// Bit 15 set marks both fields unknown.
    pub fn from_register(value: u16) -> Self {
        if get_bit(value, 15) {
            return Self {
                state: CpuState::Unknown,
                cause: StopCause::Unknown,
            };
        }

        let state = match extract_bits(value, 0, 3) {
            0 => CpuState::Run,
            1 => CpuState::StepRun,
            2 => CpuState::Stop,
            3 => CpuState::Pause,
            _ => CpuState::Unknown,
        };
        let cause = match extract_bits(value, 4, 7) {
            0 => StopCause::BySwitch,
            1 => StopCause::RemoteRelay,
            2 => StopCause::RemoteDevice,
            3 => StopCause::ByProgram,
            4 => StopCause::ByError,
            _ => StopCause::Unknown,
        };
        Self { state, cause }
    }
}

/// RUN/STOP/RESET switch position (SD200).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwitchStatus {
    /// RUN.
    Run,
    /// STOP.
    Stop,
    /// Latch clear.
    LatchClear,
    /// Value not defined by the protocol.
    Unknown,
}

impl SwitchStatus {
    /// Decodes the SD200 register value.
    pub fn from_register(value: u16) -> Self {
        match value {
            0 => SwitchStatus::Run,
            1 => SwitchStatus::Stop,
            2 => SwitchStatus::LatchClear,
            _ => SwitchStatus::Unknown,
        }
    }
}

/// Echo returned by a loopback test.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoopbackResult {
    /// Echoed length.
    pub length: usize,
    /// Echoed data.
    pub data: String,
}

/// Outcome of a remote RESET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResetOutcome {
    /// The PLC answered with a normal completion.
    Acknowledged,
    /// The PLC restarted without answering before the timeout.
    NoResponse,
}
