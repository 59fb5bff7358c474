//! Client tests against a scripted in-memory transport.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use melsec_mc::{
    Client, ClientConfig, CpuState, DataType, FrameVariant, McError, PlcSeries, ResetOutcome,
    StopCause, Tag, TagError, TransferMode, Transport, Value,
};

enum Reply {
    Frame(Vec<u8>),
    Timeout,
}

/// Records sent frames and replays queued replies.
#[derive(Clone, Default)]
struct Script {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    replies: Arc<Mutex<VecDeque<Reply>>>,
}

impl Script {
    fn reply(&self, frame: Vec<u8>) -> &Self {
        self.replies.lock().unwrap().push_back(Reply::Frame(frame));
        self
    }

    fn timeout(&self) -> &Self {
        self.replies.lock().unwrap().push_back(Reply::Timeout);
        self
    }

    fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    fn sent_hex(&self) -> Vec<String> {
        self.sent().iter().map(hex::encode_upper).collect()
    }
}

struct ScriptedTransport {
    script: Script,
    pending: Vec<u8>,
    datagram: bool,
}

impl Transport for ScriptedTransport {
    fn send(&mut self, frame: &[u8]) -> melsec_mc::Result<()> {
        self.script.sent.lock().unwrap().push(frame.to_vec());
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> melsec_mc::Result<usize> {
        if self.pending.is_empty() {
            match self.script.replies.lock().unwrap().pop_front() {
                Some(Reply::Frame(frame)) => self.pending = frame,
                Some(Reply::Timeout) | None => return Err(McError::Timeout),
            }
        }
        let n = if self.datagram {
            self.pending.len().min(buf.len())
        } else {
            // Deliver streams in small pieces to exercise reassembly.
            self.pending.len().min(buf.len()).min(5)
        };
        buf[..n].copy_from_slice(&self.pending[..n]);
        if self.datagram {
            self.pending.clear();
        } else {
            self.pending.drain(..n);
        }
        Ok(n)
    }

    fn is_datagram(&self) -> bool {
        self.datagram
    }

    fn close(&mut self) -> melsec_mc::Result<()> {
        Ok(())
    }
}

fn config() -> ClientConfig {
    ClientConfig::new(std::net::Ipv4Addr::LOCALHOST)
}

fn client(config: ClientConfig) -> (Client, Script) {
    let script = Script::default();
    let transport = ScriptedTransport {
        script: script.clone(),
        pending: Vec::new(),
        datagram: false,
    };
    (Client::with_transport(transport, config), script)
}

fn datagram_client(config: ClientConfig) -> (Client, Script) {
    let script = Script::default();
    let transport = ScriptedTransport {
        script: script.clone(),
        pending: Vec::new(),
        datagram: true,
    };
    (Client::with_transport(transport, config), script)
}

/// Binary 3E response with the default route.
fn binary_3e(end_code: u16, data: &[u8]) -> Vec<u8> {
    let mut frame = vec![0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00];
    frame.extend_from_slice(&((data.len() + 2) as u16).to_le_bytes());
    frame.extend_from_slice(&end_code.to_le_bytes());
    frame.extend_from_slice(data);
    frame
}

/// Binary 4E response with the default route.
fn binary_4e(serial: u16, end_code: u16, data: &[u8]) -> Vec<u8> {
    let mut frame = vec![0xD4, 0x00];
    frame.extend_from_slice(&serial.to_le_bytes());
    frame.extend_from_slice(&[0x00, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00]);
    frame.extend_from_slice(&((data.len() + 2) as u16).to_le_bytes());
    frame.extend_from_slice(&end_code.to_le_bytes());
    frame.extend_from_slice(data);
    frame
}

/// ASCII 3E response with the default route; `data` is already ASCII.
fn ascii_3e(end_code: u16, data: &str) -> Vec<u8> {
    format!("D00000FF03FF00{:04X}{:04X}{}", data.len() + 4, end_code, data).into_bytes()
}

fn ok() -> Vec<u8> {
    binary_3e(0, &[])
}

#[test]
fn test_sword_write_then_read() {
    let (mut client, script) = client(config());
    script
        .reply(ok())
        .reply(binary_3e(0, &[0x00, 0x00, 0x0A, 0x00, 0x14, 0x00, 0x1E, 0x00, 0x28, 0x00]));

    let values: Vec<Value> = [0i16, 10, 20, 30, 40].into_iter().map(Value::from).collect();
    client.batch_write("D0", &values, DataType::SWord).unwrap();
    let read = client.batch_read("D0", 5, DataType::SWord, false).unwrap();

    assert_eq!(read, values);
    assert_eq!(
        script.sent_hex(),
        vec![
            "500000FFFF03001600040001140000000000A8050000000A0014001E002800".to_string(),
            "500000FFFF03000C00040001040000000000A80500".to_string(),
        ]
    );
}

#[test]
fn test_bit_write_then_read() {
    let (mut client, script) = client(config());
    script.reply(ok()).reply(binary_3e(0, &[0x01, 0x01, 0x00]));

    let values: Vec<Value> = [0, 1, 0, 1, 0].into_iter().map(Value::Int).collect();
    client.batch_write("X0", &values, DataType::Bit).unwrap();
    let read = client.batch_read("X0", 5, DataType::Bit, true).unwrap();

    assert_eq!(
        read,
        [false, true, false, true, false].map(Value::Bool).to_vec()
    );
    let sent = script.sent_hex();
    assert!(sent[0].ends_with("01140100000000009C0500010100"));
    assert!(sent[1].ends_with("01040100000000009C0500"));
}

#[test]
fn test_bit_read_on_word_device_sends_nothing() {
    let (mut client, script) = client(config());
    let err = client.batch_read("D0", 1, DataType::Bit, true).unwrap_err();
    assert!(matches!(err, McError::DataType { .. }));
    assert!(script.sent().is_empty());
}

#[test]
fn test_loopback() {
    let (mut client, script) = client(config());
    script.reply(binary_3e(0, b"\x05\x00hello"));

    let echo = client.loopback_test("hello").unwrap();
    assert_eq!(echo.length, 5);
    assert_eq!(echo.data, "hello");

    let err = client.loopback_test("héllo").unwrap_err();
    assert!(matches!(err, McError::InvalidParameter { .. }));
    assert_eq!(script.sent().len(), 1);
}

#[test]
fn test_mixed_write_with_rejected_tag() {
    let (mut client, script) = client(config());
    script.reply(ok());

    let results = client
        .write(&[
            Tag::write("D0", DataType::SWord, 10i16),
            Tag::write("D1", DataType::SWord, 40000i32),
        ])
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].outcome, Ok(Value::Int(10)));
    assert!(matches!(results[1].outcome, Err(TagError::DataType(_))));
    assert_eq!(
        script.sent_hex(),
        vec!["500000FFFF03000E000400021400000100000000A80A00".to_string()]
    );
}

#[test]
fn test_mixed_write_sends_bit_tags_separately() {
    let (mut client, script) = client(config());
    script.reply(ok());
    script.reply(ok());

    let results = client
        .write(&[
            Tag::write("M0", DataType::Bit, true),
            Tag::write("D0", DataType::SWord, 10i16),
            Tag::write("Y10", DataType::Bit, false),
        ])
        .unwrap();

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(
        script.sent_hex(),
        vec![
            "500000FFFF03000E000400021400000100000000A80A00".to_string(),
            "500000FFFF030011000400021401000200000090011000009D00".to_string(),
        ]
    );
}

#[test]
fn test_mixed_write_only_bit_tags() {
    let (mut client, script) = client(config());
    script.reply(ok());

    let results = client
        .write(&[Tag::write("M0", DataType::Bit, true)])
        .unwrap();

    assert_eq!(results[0].outcome, Ok(Value::Bool(true)));
    assert_eq!(
        script.sent_hex(),
        vec!["500000FFFF03000C00040002140100010000009001".to_string()]
    );
}

#[test]
fn test_batch_read_oversized_count_sends_nothing() {
    let (mut client, script) = client(config());
    let err = client
        .batch_read("D0", usize::MAX / 2, DataType::Double, false)
        .unwrap_err();
    assert!(matches!(err, McError::InvalidParameter { .. }));
    assert!(script.sent().is_empty());
}

#[test]
fn test_mixed_read() {
    let (mut client, script) = client(config());
    // D0 = -2 (SWORD), D10-D11 = 1.5 (FLOAT)
    let mut data = vec![0xFE, 0xFF];
    data.extend_from_slice(&1.5f32.to_le_bytes());
    script.reply(binary_3e(0, &data));

    let results = client
        .read(&[
            Tag::read("D0", DataType::SWord),
            Tag::read("NOPE1", DataType::SWord),
            Tag::read("D10", DataType::Float),
        ])
        .unwrap();

    assert_eq!(results[0].value(), Some(&Value::Int(-2)));
    assert!(matches!(results[1].error(), Some(TagError::InvalidDevice(_))));
    assert_eq!(results[2].value(), Some(&Value::Float(1.5)));
    assert_eq!(
        script.sent_hex(),
        vec!["500000FFFF030014000400030400000300000000A80A0000A80B0000A8".to_string()]
    );
}

#[test]
fn test_all_tags_rejected_sends_nothing() {
    let (mut client, script) = client(config());
    let results = client.read(&[Tag::read("D0", DataType::Bit)]).unwrap();
    assert_eq!(results.len(), 1);
    assert!(!results[0].is_ok());
    assert!(script.sent().is_empty());
}

#[test]
fn test_ascii_and_binary_decode_alike() {
    let (mut binary, binary_script) = client(config());
    binary_script.reply(binary_3e(0, &[0xFF, 0xFF, 0x0A, 0x00, 0x39, 0x30]));

    let (mut ascii, ascii_script) = client(config().with_transfer_mode(TransferMode::Ascii));
    ascii_script.reply(ascii_3e(0, "FFFF000A3039"));

    let from_binary = binary.batch_read("D100", 3, DataType::SWord, false).unwrap();
    let from_ascii = ascii.batch_read("D100", 3, DataType::SWord, false).unwrap();

    assert_eq!(from_binary, vec![Value::Int(-1), Value::Int(10), Value::Int(12345)]);
    assert_eq!(from_binary, from_ascii);

    let binary_sent = &binary_script.sent()[0];
    let ascii_sent = &ascii_script.sent()[0];
    assert!(ascii_sent.len() > binary_sent.len());
    assert_eq!(
        String::from_utf8(ascii_sent.clone()).unwrap(),
        "500000FF03FF000018000404010000D*0001000003"
    );
}

#[test]
fn test_declared_length_exceeds_datagram() {
    let (mut client, script) = datagram_client(config());
    let mut frame = binary_3e(0, &[0x01, 0x00]);
    frame[7] = 0x06;
    script.reply(frame);

    let err = client.batch_read("D0", 1, DataType::UWord, false).unwrap_err();
    assert!(matches!(err, McError::Frame { .. }));
}

#[test]
fn test_trailing_bytes_in_datagram() {
    let (mut client, script) = datagram_client(config());
    let mut frame = binary_3e(0, &[0x01, 0x00]);
    frame.push(0xAA);
    script.reply(frame);

    let err = client.batch_read("D0", 1, DataType::UWord, false).unwrap_err();
    assert!(matches!(err, McError::Frame { .. }));
}

#[test]
fn test_4e_serial() {
    let (mut client, script) = client(config().with_frame_variant(FrameVariant::E4));
    client.set_serial(0x0010);
    script
        .reply(binary_4e(0x0010, 0, &[0x07, 0x00]))
        .reply(binary_4e(0x0012, 0, &[0x07, 0x00]));

    let values = client.batch_read("D0", 1, DataType::UWord, false).unwrap();
    assert_eq!(values, vec![Value::UInt(7)]);

    let err = client.batch_read("D0", 1, DataType::UWord, false).unwrap_err();
    assert!(matches!(
        err,
        McError::SerialMismatch {
            expected: 0x0011,
            received: 0x0012
        }
    ));

    let sent = script.sent_hex();
    assert!(sent[0].starts_with("540010000000"));
    assert!(sent[1].starts_with("540011000000"));
}

#[test]
fn test_protocol_error() {
    let (mut client, script) = client(config());
    script.reply(binary_3e(0xC059, &[]));

    let err = client.remote_stop().unwrap_err();
    assert!(matches!(err, McError::Protocol { code: 0xC059 }));
    assert_eq!(err.completion_code(), Some(0xC059));
}

#[test]
fn test_remote_reset_without_answer() {
    let (mut client, script) = client(config());
    script.reply(ok()).timeout();

    assert_eq!(client.remote_reset().unwrap(), ResetOutcome::Acknowledged);
    assert_eq!(client.remote_reset().unwrap(), ResetOutcome::NoResponse);
    assert_eq!(script.sent().len(), 2);
}

#[test]
fn test_remote_lock_checks_password_first() {
    let (mut client, script) = client(config().with_series(PlcSeries::IqR));
    script.reply(ok());

    let err = client.remote_lock("abc").unwrap_err();
    assert!(matches!(err, McError::InvalidParameter { .. }));
    assert!(script.sent().is_empty());

    client.remote_unlock("secret").unwrap();
    assert!(script.sent_hex()[0].ends_with("301600000600736563726574"));
}

#[test]
fn test_read_cpu_status() {
    let (mut client, script) = client(config());
    script.reply(binary_3e(0, &[0x12, 0x00]));

    let status = client.read_cpu_status().unwrap();
    assert_eq!(status.state, CpuState::Stop);
    assert_eq!(status.cause, StopCause::RemoteRelay);
    assert!(script.sent_hex()[0].ends_with("CB0000A90100"));
}

#[test]
fn test_read_plc_time() {
    let (mut client, script) = client(config());
    let registers: Vec<u8> = [2024u16, 5, 17, 13, 45, 30, 5, 0]
        .iter()
        .flat_map(|r| r.to_le_bytes())
        .collect();
    script.reply(ok()).reply(binary_3e(0, &registers)).reply(ok());

    let time = client.read_plc_time().unwrap();
    assert_eq!(
        time,
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(13, 45, 30)
            .unwrap()
    );

    let sent = script.sent_hex();
    assert_eq!(sent.len(), 3);
    assert!(sent[0].ends_with("0214010001D500009101"));
    assert!(sent[1].ends_with("D20000A90800"));
    assert!(sent[2].ends_with("0214010001D500009100"));
}

#[test]
fn test_set_plc_time() {
    let (mut client, script) = client(config());
    for _ in 0..5 {
        script.reply(ok());
    }

    let time = NaiveDate::from_ymd_opt(2024, 5, 17)
        .unwrap()
        .and_hms_opt(13, 45, 30)
        .unwrap();
    client.set_plc_time(time).unwrap();

    let sent = script.sent_hex();
    assert_eq!(sent.len(), 5);
    assert!(sent[0].ends_with("02D300009100D500009100"));
    assert!(sent[1].ends_with("01140000D20000A90800E807050011000D002D001E0005000000"));
    assert!(sent[2].ends_with("01D200009100"));
    assert!(sent[3].ends_with("01D200009101"));
    assert!(sent[4].ends_with("01D200009100"));
}
