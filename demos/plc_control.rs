//! Example: PLC control and diagnostics
//!
//! Run with: cargo run --example plc_control -- 192.168.1.10
//!
//! This example demonstrates:
//! - Client configuration (ASCII 4E frames, iQ-R series)
//! - CPU model, status and clock
//! - Remote STOP/RUN
//! - Error handling patterns

use melsec_mc::{
    completion_code_description, ClearMode, Client, ClientConfig, FrameVariant, McError,
    PlcSeries, TransferMode,
};
use std::net::IpAddr;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let ip: IpAddr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "192.168.1.10".to_string())
        .parse()?;

    let config = ClientConfig::new(ip)
        .with_series(PlcSeries::IqR)
        .with_transfer_mode(TransferMode::Ascii)
        .with_frame_variant(FrameVariant::E4)
        .with_timeout(Duration::from_secs(3));
    println!("Config: {:?}\n", config);
    let mut client = Client::new(config)?;

    // =========================================================================
    // Diagnostics
    // =========================================================================

    println!("CPU model:  {}", client.read_cpu_model()?);
    println!("CPU status: {:?}", client.read_cpu_status()?);
    println!("Switch:     {:?}", client.read_switch_status()?);
    println!("Loopback:   {:?}", client.loopback_test("MELSEC01")?);
    println!("PLC time:   {}", client.read_plc_time()?);

    // =========================================================================
    // Remote control
    // =========================================================================

    client.remote_stop()?;
    println!("\nAfter STOP: {:?}", client.read_cpu_status()?.state);

    let synced = client.sync_plc_time(false)?;
    println!("Clock set to {}", synced);

    client.remote_run(ClearMode::NoClear, false)?;
    println!("After RUN:  {:?}", client.read_cpu_status()?.state);

    // =========================================================================
    // Error handling
    // =========================================================================

    match client.batch_read("D99999999", 1, melsec_mc::DataType::UWord, false) {
        Ok(values) => println!("Unexpected success: {:?}", values),
        Err(McError::Protocol { code }) => {
            println!("PLC error 0x{:04X}: {}", code, completion_code_description(code));
        }
        Err(e) => println!("Error: {}", e),
    }

    client.close()?;
    Ok(())
}
