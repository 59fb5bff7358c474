//! Transport layer for MC communication.
//!
//! This module provides the [`Transport`] trait and its TCP and UDP
//! implementations. The transport layer is separated from the protocol
//! layer: it moves bytes and knows nothing about commands. The only MC
//! knowledge on this side is [`read_frame`], which uses the fixed response
//! prefix to find where one response frame ends on a byte stream.
//!
//! # Constants
//!
//! - [`DEFAULT_MC_PORT`] - Default MC port (5007)
//! - [`DEFAULT_TIMEOUT`] - Default timeout (2 seconds)
//! - [`MAX_PACKET_SIZE`] - Receive buffer size for one datagram
//!
//! # Example
//!
//! [`Client`](crate::Client) drives a transport internally. Raw frames can
//! also be exchanged directly:
//!
//! ```no_run
//! use melsec_mc::{read_frame, AccessOption, TcpTransport, Transport};
//! use std::time::Duration;
//!
//! let mut transport = TcpTransport::connect(
//!     "192.168.1.10:5007".parse().unwrap(),
//!     Duration::from_secs(2),
//! ).unwrap();
//!
//! let request = vec![0x50, 0x00, /* ... rest of MC frame */];
//! transport.send(&request).unwrap();
//! let response = read_frame(&mut transport, AccessOption::default()).unwrap();
//! ```

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, UdpSocket};
use std::time::Duration;

use crate::error::{McError, Result};
use crate::header::AccessOption;
use crate::response::McResponse;

/// Default MC port.
pub const DEFAULT_MC_PORT: u16 = 5007;

/// Default timeout for socket operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Receive buffer size, large enough for any MC response.
pub const MAX_PACKET_SIZE: usize = 8192;

/// Byte transport to a PLC.
///
/// Implementations block for at most their configured timeout and report
/// it as `McError::Timeout`.
pub trait Transport {
    /// Sends a complete frame.
    fn send(&mut self, frame: &[u8]) -> Result<()>;

    /// Receives available bytes into `buf`, returning how many were read.
    ///
    /// Datagram transports return one whole datagram. Stream transports
    /// may return any non-zero number of bytes, or 0 at end of stream.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Returns whether each `receive` yields one whole message.
    fn is_datagram(&self) -> bool;

    /// Shuts the connection down.
    fn close(&mut self) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        (**self).send(frame)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).receive(buf)
    }

    fn is_datagram(&self) -> bool {
        (**self).is_datagram()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

fn map_io_error(e: io::Error) -> McError {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => McError::Timeout,
        _ => McError::Connection(e),
    }
}

/// Reads exactly one response frame.
///
/// Stream transports are read until the length declared in the response
/// prefix has arrived, never past it. Datagram transports must deliver the
/// whole frame in one datagram.
///
/// # Errors
///
/// Returns `McError::Frame` if a datagram is shorter than its declared
/// length, `McError::Connection` if the stream closes mid-frame, and
/// `McError::Timeout` if the transport times out.
pub fn read_frame<T: Transport + ?Sized>(transport: &mut T, option: AccessOption) -> Result<Vec<u8>> {
    let prefix_len = option.response_prefix_len();

    if transport.is_datagram() {
        let mut buf = vec![0u8; MAX_PACKET_SIZE];
        let n = transport.receive(&mut buf)?;
        buf.truncate(n);
        if n < prefix_len {
            return Err(McError::frame(format!(
                "datagram of {} bytes is shorter than the {} byte response header",
                n, prefix_len
            )));
        }
        let total = McResponse::frame_length(&buf, option)?;
        if n < total {
            return Err(McError::frame(format!(
                "datagram of {} bytes ended before the declared frame length {}",
                n, total
            )));
        }
        return Ok(buf);
    }

    let mut buf = vec![0u8; prefix_len];
    fill(transport, &mut buf, 0)?;
    let total = McResponse::frame_length(&buf, option)?;
    buf.resize(total, 0);
    fill(transport, &mut buf, prefix_len)?;
    Ok(buf)
}

fn fill<T: Transport + ?Sized>(transport: &mut T, buf: &mut [u8], mut filled: usize) -> Result<()> {
    while filled < buf.len() {
        let n = transport.receive(&mut buf[filled..])?;
        if n == 0 {
            return Err(McError::Connection(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("connection closed after {} of {} bytes", filled, buf.len()),
            )));
        }
        filled += n;
    }
    Ok(())
}

/// TCP transport for MC communication.
pub struct TcpTransport {
    stream: TcpStream,
    remote_addr: SocketAddr,
}

impl TcpTransport {
    /// Connects to the PLC with the given connect/read/write timeout.
    ///
    /// # Errors
    ///
    /// Returns `McError::Timeout` if the connection attempt times out and
    /// `McError::Connection` for other I/O errors.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use melsec_mc::TcpTransport;
    /// use std::time::Duration;
    ///
    /// let transport = TcpTransport::connect(
    ///     "192.168.1.10:5007".parse().unwrap(),
    ///     Duration::from_secs(2),
    /// ).unwrap();
    /// ```
    pub fn connect(plc_addr: SocketAddr, timeout: Duration) -> Result<Self> {
        let stream = TcpStream::connect_timeout(&plc_addr, timeout).map_err(map_io_error)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            remote_addr: plc_addr,
        })
    }

    /// Returns the remote PLC address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.stream.write_all(frame).map_err(map_io_error)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.stream.read(buf).map_err(map_io_error)
    }

    fn is_datagram(&self) -> bool {
        false
    }

    fn close(&mut self) -> Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(McError::Connection(e)),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("remote_addr", &self.remote_addr)
            .field("local_addr", &self.stream.local_addr().ok())
            .finish()
    }
}

/// UDP transport for MC communication.
pub struct UdpTransport {
    socket: UdpSocket,
    remote_addr: SocketAddr,
}

impl UdpTransport {
    /// Binds a wildcard UDP socket and connects it to `plc_addr`.
    ///
    /// # Arguments
    ///
    /// * `plc_addr` - Socket address of the PLC (IP:port)
    /// * `timeout` - Read/write timeout duration
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the socket cannot be created or configured.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use melsec_mc::UdpTransport;
    /// use std::time::Duration;
    ///
    /// let transport = UdpTransport::new(
    ///     "192.168.1.10:5007".parse().unwrap(),
    ///     Duration::from_secs(2),
    /// ).unwrap();
    /// ```
    pub fn new(plc_addr: SocketAddr, timeout: Duration) -> Result<Self> {
        let local: SocketAddr = if plc_addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(local)?;
        socket.connect(plc_addr)?;
        socket.set_read_timeout(Some(timeout))?;
        socket.set_write_timeout(Some(timeout))?;

        Ok(Self {
            socket,
            remote_addr: plc_addr,
        })
    }

    /// Returns the remote PLC address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.socket.send(frame).map_err(map_io_error)?;
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.socket.recv(buf).map_err(map_io_error)
    }

    fn is_datagram(&self) -> bool {
        true
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("remote_addr", &self.remote_addr)
            .field("local_addr", &self.socket.local_addr().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{FrameVariant, TransferMode};
    use std::collections::VecDeque;
    use std::net::TcpListener;

    /// Replays queued chunks, one per `receive` call.
    struct ChunkedTransport {
        chunks: VecDeque<Vec<u8>>,
        datagram: bool,
    }

    impl Transport for ChunkedTransport {
        fn send(&mut self, _frame: &[u8]) -> Result<()> {
            Ok(())
        }

        fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
            let Some(mut chunk) = self.chunks.pop_front() else {
                return Ok(0);
            };
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                self.chunks.push_front(chunk.split_off(n));
            }
            Ok(n)
        }

        fn is_datagram(&self) -> bool {
            self.datagram
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    const FRAME: [u8; 13] = [
        0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x04, 0x00, 0x00, 0x00, 0x34, 0x12,
    ];

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_MC_PORT, 5007);
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(2));
    }

    #[test]
    fn test_stream_reassembly() {
        let mut transport = ChunkedTransport {
            chunks: VecDeque::from(vec![FRAME[..3].to_vec(), FRAME[3..10].to_vec(), FRAME[10..].to_vec()]),
            datagram: false,
        };
        let frame = read_frame(&mut transport, AccessOption::default()).unwrap();
        assert_eq!(frame, FRAME.to_vec());
    }

    #[test]
    fn test_stream_does_not_read_past_frame() {
        let mut both = FRAME.to_vec();
        both.extend_from_slice(&FRAME);
        let mut transport = ChunkedTransport {
            chunks: VecDeque::from(vec![both]),
            datagram: false,
        };
        assert_eq!(read_frame(&mut transport, AccessOption::default()).unwrap(), FRAME.to_vec());
        assert_eq!(read_frame(&mut transport, AccessOption::default()).unwrap(), FRAME.to_vec());
    }

    #[test]
    fn test_stream_closed_mid_frame() {
        let mut transport = ChunkedTransport {
            chunks: VecDeque::from(vec![FRAME[..11].to_vec()]),
            datagram: false,
        };
        let err = read_frame(&mut transport, AccessOption::default()).unwrap_err();
        assert!(matches!(err, McError::Connection(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_short_datagram() {
        let mut transport = ChunkedTransport {
            chunks: VecDeque::from(vec![FRAME[..11].to_vec()]),
            datagram: true,
        };
        let err = read_frame(&mut transport, AccessOption::default()).unwrap_err();
        assert!(matches!(err, McError::Frame { .. }));
    }

    #[test]
    fn test_ascii_stream() {
        let text = b"D00000FF03FF00000800001234".to_vec();
        let mut transport = ChunkedTransport {
            chunks: VecDeque::from(vec![text.clone()]),
            datagram: false,
        };
        let option = AccessOption::new(TransferMode::Ascii, FrameVariant::E3);
        assert_eq!(read_frame(&mut transport, option).unwrap(), text);
    }

    #[test]
    fn test_tcp_transport_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 4];
            stream.read_exact(&mut request).unwrap();
            stream.write_all(&FRAME[..5]).unwrap();
            stream.flush().unwrap();
            stream.write_all(&FRAME[5..]).unwrap();
        });

        let mut transport = TcpTransport::connect(addr, Duration::from_secs(2)).unwrap();
        transport.send(&[1, 2, 3, 4]).unwrap();
        let frame = read_frame(&mut transport, AccessOption::default()).unwrap();
        assert_eq!(frame, FRAME.to_vec());
        assert!(format!("{:?}", transport).contains("TcpTransport"));
        transport.close().unwrap();
        server.join().unwrap();
    }

    #[test]
    fn test_udp_transport_creation() {
        let addr: SocketAddr = "127.0.0.1:5007".parse().unwrap();
        let transport = UdpTransport::new(addr, Duration::from_millis(100)).unwrap();
        assert_eq!(transport.remote_addr(), addr);
        assert!(transport.is_datagram());
        assert!(format!("{:?}", transport).contains("127.0.0.1:5007"));
    }
}
