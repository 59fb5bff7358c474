//! Example: Reading and writing PLC devices
//!
//! Run with: cargo run --example batch_access -- 192.168.1.10
//!
//! This example demonstrates:
//! - Batch reads and writes of words, bits and typed values
//! - Random access to scattered word and double word devices
//! - Mixed-type tag access with per-tag results

use melsec_mc::{Client, ClientConfig, DataType, Tag, TransferMode, Value};
use std::net::IpAddr;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let ip: IpAddr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "192.168.1.10".to_string())
        .parse()?;

    // =========================================================================
    // Connect to PLC
    // =========================================================================

    let config = ClientConfig::new(ip).with_transfer_mode(TransferMode::Binary);
    let mut client = Client::new(config)?;

    // =========================================================================
    // Batch access
    // =========================================================================

    println!("=== Batch Access ===\n");

    let values: Vec<Value> = [0i16, 10, 20, 30, 40].into_iter().map(Value::from).collect();
    client.batch_write("D0", &values, DataType::SWord)?;
    println!("D0-D4   = {:?}", client.batch_read("D0", 5, DataType::SWord, false)?);

    client.batch_write("D100", &[Value::from(3.25f32)], DataType::Float)?;
    println!("D100    = {:?}", client.batch_read("D100", 1, DataType::Float, false)?);

    let bits: Vec<Value> = [false, true, false, true].into_iter().map(Value::from).collect();
    client.batch_write("M0", &bits, DataType::Bit)?;
    println!("M0-M3   = {:?}", client.batch_read("M0", 4, DataType::Bit, true)?);
    println!("X0-X1F  = {:?}", client.batch_read("X0", 32, DataType::Bit, true)?);

    // =========================================================================
    // Random access
    // =========================================================================

    println!("\n=== Random Access ===\n");

    client.random_write(&["D10", "D20"], &[-1, 1], &["D30"], &[100_000])?;
    let (words, dwords) = client.random_read(&["D10", "D20"], &["D30"])?;
    println!("D10, D20 = {:?}, D30 = {:?}", words, dwords);

    client.random_write_bits(&["M10", "Y20"], &[true, false])?;

    // =========================================================================
    // Mixed-type tags
    // =========================================================================

    println!("\n=== Tags ===\n");

    let written = client.write(&[
        Tag::write("D200", DataType::UDWord, 4_000_000_000u32),
        Tag::write("D202", DataType::Double, 1.0e-3),
        Tag::write("D210", DataType::SWord, 70_000i32), // out of range, rejected locally
    ])?;
    for result in &written {
        println!("write {:<6} {:<7} -> {:?}", result.device, result.data_type, result.outcome);
    }

    let read = client.read(&[
        Tag::read("D200", DataType::UDWord),
        Tag::read("D202", DataType::Double),
        Tag::read("M10", DataType::Bit),
    ])?;
    for result in &read {
        println!("read  {:<6} {:<7} -> {:?}", result.device, result.data_type, result.outcome);
    }

    client.close()?;
    Ok(())
}
