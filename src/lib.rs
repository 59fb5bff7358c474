//! # MELSEC MC Protocol Library
//!
//! A Rust library for communicating with Mitsubishi MELSEC PLCs using the MC
//! (MELSEC Communication) protocol over TCP or UDP.
//!
//! This is a **protocol-only** library: no polling, schedulers or
//! application-level features. Each call produces exactly 1 request and 1
//! response (time operations chain a few of them). No automatic retries,
//! caching, or reconnection.
//!
//! ## Features
//!
//! - **3E and 4E frames** in **binary** and **ASCII** transfer modes
//! - **Series aware**: Q, L, QnA, iQ-L and iQ-R device codes and subcommands
//! - **Typed values**: BIT, 16/32/64-bit signed and unsigned, FLOAT, DOUBLE
//! - **Complete API**: batch, random and mixed-tag access, remote control,
//!   CPU model and status, clock, loopback, LED clearing
//! - **No panics**: all errors returned as `Result<T, McError>`
//!
//! ## Quick Start
//!
//! ```no_run
//! use melsec_mc::{Client, ClientConfig, DataType, Value};
//! use std::net::Ipv4Addr;
//!
//! fn main() -> melsec_mc::Result<()> {
//!     let config = ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10));
//!     let mut client = Client::new(config)?;
//!
//!     // Write then read back D0-D4
//!     let values: Vec<Value> = [0i16, 10, 20, 30, 40].into_iter().map(Value::from).collect();
//!     client.batch_write("D0", &values, DataType::SWord)?;
//!     let read = client.batch_read("D0", 5, DataType::SWord, false)?;
//!     println!("D0-D4 = {:?}", read);
//!
//!     // Input bits X0-X7 as booleans
//!     let inputs = client.batch_read("X0", 8, DataType::Bit, true)?;
//!     println!("X0-X7 = {:?}", inputs);
//!
//!     client.close()
//! }
//! ```
//!
//! ## Devices
//!
//! Devices are written the way they appear in GX Works: a device name
//! followed by a number, e.g. `D100`, `M0`, `X1F`, `ZR10000`. Inputs,
//! outputs, link devices and `ZR` are numbered in hexadecimal; everything
//! else in decimal. The long devices (`LTN`, `LCN`, `LZ`, ...) and `RD`
//! exist only on iQ-R.
//!
//! ## Mixed-Type Access
//!
//! ```no_run
//! # use melsec_mc::{Client, ClientConfig, DataType, Tag};
//! # use std::net::Ipv4Addr;
//! # let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10))).unwrap();
//! let results = client.write(&[
//!     Tag::write("D100", DataType::Float, 3.5f32),
//!     Tag::write("D102", DataType::SLWord, -1i64),
//! ])?;
//! assert!(results.iter().all(|r| r.is_ok()));
//!
//! let results = client.read(&[
//!     Tag::read("D100", DataType::Float),
//!     Tag::read("D102", DataType::SLWord),
//! ])?;
//! # Ok::<(), melsec_mc::McError>(())
//! ```
//!
//! Tags that fail local validation are reported in their own
//! [`TagResult`] and never reach the PLC; the remaining tags still go out in
//! one request, plus a random bit write for the BIT tags of a write.
//!
//! ## PLC Control
//!
//! ```no_run
//! # use melsec_mc::{Client, ClientConfig, ClearMode};
//! # use std::net::Ipv4Addr;
//! # let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10))).unwrap();
//! client.remote_stop()?;
//! client.remote_run(ClearMode::NoClear, false)?;
//! println!("{:?}", client.read_cpu_status()?);
//! println!("{}", client.read_plc_time()?);
//! # Ok::<(), melsec_mc::McError>(())
//! ```
//!
//! ## Error Handling
//!
//! ```no_run
//! use melsec_mc::{completion_code_description, Client, ClientConfig, DataType, McError};
//! use std::net::Ipv4Addr;
//!
//! let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10)))?;
//!
//! match client.batch_read("D100", 10, DataType::UWord, false) {
//!     Ok(values) => println!("Data: {:?}", values),
//!     Err(McError::Timeout) => println!("Communication timeout"),
//!     Err(McError::Protocol { code }) => {
//!         println!("PLC error 0x{:04X}: {}", code, completion_code_description(code));
//!     }
//!     Err(e) => println!("Error: {}", e),
//! }
//! # Ok::<(), McError>(())
//! ```
//!
//! ## Configuration
//!
//! ```no_run
//! use melsec_mc::{ClientConfig, FrameVariant, PlcSeries, Protocol, TransferMode};
//! use std::net::Ipv4Addr;
//! use std::time::Duration;
//!
//! let config = ClientConfig::new(Ipv4Addr::new(192, 168, 1, 10))
//!     .with_port(1025)                          // default: 5007
//!     .with_protocol(Protocol::Udp)             // default: TCP
//!     .with_series(PlcSeries::IqR)              // default: Q
//!     .with_transfer_mode(TransferMode::Ascii)  // default: binary
//!     .with_frame_variant(FrameVariant::E4)     // default: 3E
//!     .with_timeout(Duration::from_secs(5));    // default: 2s
//! ```
//!
//! ## Logging
//!
//! Operations emit [`tracing`](https://docs.rs/tracing) events: `debug` per
//! call, `trace` with every frame sent and received, `warn` for rejected
//! tags. Install a subscriber in the application to see them.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod client;
mod codec;
mod command;
mod datatype;
mod device;
mod error;
mod header;
mod response;
mod series;
mod status;
mod tag;
mod transport;
pub mod utils;

// Public re-exports
pub use client::{Client, ClientConfig, Protocol};
pub use command::{
    BatchReadCommand, BatchWriteCommand, ClearMode, Command, CommandContext, ErrorLedOffCommand,
    IndicatorLedOffCommand, LedChannel, LoopbackCommand, RandomBitWriteCommand,
    RandomReadCommand, RandomWriteCommand, ReadCpuModelCommand, RemoteLatchClearCommand,
    RemoteLockCommand, RemotePauseCommand, RemoteResetCommand, RemoteRunCommand,
    RemoteStopCommand, Request, TagReadCommand, TagWriteCommand, MAX_BATCH_BITS,
    MAX_BATCH_WORDS, MAX_LOOPBACK_LEN, MAX_RANDOM_POINTS,
};
pub use datatype::{DataType, Value};
pub use device::{Device, DeviceCode, DeviceKind};
pub use error::{completion_code_description, McError, Result};
pub use header::{
    AccessOption, AccessRoute, FrameVariant, RequestHeader, TransferMode,
    DEFAULT_MONITORING_TIMER,
};
pub use response::McResponse;
pub use series::{PasswordRule, PlcSeries};
pub use status::{
    CpuModel, CpuState, CpuStatus, LoopbackResult, ResetOutcome, StopCause, SwitchStatus,
};
pub use tag::{Tag, TagError, TagResult};
pub use transport::{
    read_frame, TcpTransport, Transport, UdpTransport, DEFAULT_MC_PORT, DEFAULT_TIMEOUT,
    MAX_PACKET_SIZE,
};
