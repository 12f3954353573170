//! Modbus Master Demo
//!
//! Demonstrates the library without hardware where possible:
//! - Frame codec: building, validating and dumping RTU/TCP frames
//! - Typed register conversion and register buffers
//! - Tag catalog and read-request planning
//! - TCP master operations (requires a Modbus server)
//!
//! Usage: cargo run --bin demo [server_address]
//! Example: cargo run --bin demo 127.0.0.1:502

use std::time::Duration;

use modbus_master::{
    Frame, FunctionCode, RegisterBuffer, RegisterType, Tag, TagMaster, TagValueType,
    TcpStreamDevice,
};

#[tokio::main]
async fn main() {
    println!("modbus_master demo");
    println!("==================\n");

    // ------------------------------------------------------------------
    // Frame codec
    // ------------------------------------------------------------------
    println!("frame codec:");
    let mut request = Frame::build(true, 4, FunctionCode::ReadCoils, 10, 13, &[], 0);
    println!("  FC01 request (RTU): {}", request);
    println!(
        "  rtu_length={} validate_rtu={:?}",
        request.rtu_length(),
        request.validate_rtu()
    );
    println!(
        "  wire time of 8 bytes at 9600 baud: {} ms",
        Frame::transmission_time_ms(8, 9600)
    );
    let _ = request.tcp_frame();

    // ------------------------------------------------------------------
    // Typed register access
    // ------------------------------------------------------------------
    println!("\nregister buffer:");
    let mut buffer = RegisterBuffer::new(100, RegisterType::Holding, 8);
    buffer.put(100, 0x12345678u32).unwrap();
    buffer.put(102, 21.5f32).unwrap();
    buffer.put(104, "ABC".to_string()).unwrap();
    println!("  u32 @100 = {:#010x}", buffer.get::<u32>(100).unwrap());
    println!("  f32 @102 = {}", buffer.get::<f32>(102).unwrap());
    println!("  str @104 = {:?}", buffer.get::<String>(104).unwrap());

    // ------------------------------------------------------------------
    // Tag planning
    // ------------------------------------------------------------------
    println!("\ntag planner:");
    let mut tag_master = TagMaster::tcp(
        match TcpStreamDevice::connect(&server_address(), Duration::from_secs(2)).await {
            Ok(device) => device,
            Err(e) => {
                println!("  (no Modbus server reachable: {e}; planning only)\n");
                return plan_only();
            }
        },
    );
    tag_master.register_tags(demo_tags());
    let requests = tag_master.plan_read_requests(&["voltage", "current", "serial"]);
    println!("  planned requests: {:?}", requests);

    // ------------------------------------------------------------------
    // Live reads
    // ------------------------------------------------------------------
    let master = tag_master.master_mut();
    master.set_slave_baudrate(1, 115200);
    match master.read(1, RegisterType::Holding, 0, 5).await {
        Ok(values) => println!("  holding 0..5: {:?}", values),
        Err(e) => println!("  read failed: {e}"),
    }

    match tag_master.read(1, &["voltage", "current"]).await {
        Ok(buffers) => {
            for key in ["voltage", "current"] {
                match tag_master.tag_value(&buffers, key) {
                    Ok(value) => println!("  {key} = {:?}", value),
                    Err(e) => println!("  {key}: {e}"),
                }
            }
        }
        Err(e) => println!("  tag read failed: {e}"),
    }
}

fn server_address() -> String {
    std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:502".to_string())
}

fn demo_tags() -> Vec<Tag> {
    vec![
        Tag::new("voltage", RegisterType::Holding, 0, 2, TagValueType::Float),
        Tag::new("current", RegisterType::Holding, 2, 2, TagValueType::Float),
        Tag::new("serial", RegisterType::Holding, 40, 4, TagValueType::Ascii),
    ]
}

fn plan_only() {
    // Offline fallback: show the planner on a detached catalog.
    let tags = demo_tags();
    let refs: Vec<&Tag> = tags.iter().collect();
    let mut offline: TagMaster<OfflineDevice> = TagMaster::rtu(OfflineDevice);
    offline.register_tags(tags.clone());
    let requests = offline.plan_read_requests_for(&refs);
    println!("  planned requests: {:?}", requests);
}

/// Stream device that never answers, for offline planning demos.
struct OfflineDevice;

impl modbus_master::StreamDevice for OfflineDevice {
    async fn read(
        &mut self,
        _buffer: &mut [u8],
        _timeout_ms: u32,
    ) -> Result<usize, modbus_master::StreamError> {
        Err(modbus_master::StreamError::Timeout)
    }

    async fn write(
        &mut self,
        _buffer: &[u8],
        _timeout_ms: u32,
    ) -> Result<(), modbus_master::StreamError> {
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), modbus_master::StreamError> {
        Ok(())
    }
}
