//! # Modbus Master - Industrial Fieldbus Client Driver
//!
//! A client-side Modbus driver for register-oriented field devices, speaking
//! both the serial (RTU) and the TCP-framed encoding of the protocol over
//! any timeout-bounded byte stream.
//!
//! ## Features
//!
//! - **Dual encoding**: one frame codec produces and consumes RTU (CRC-16
//!   trailer) and TCP (MBAP header) framing from the same buffer
//! - **Timing-aware transactions**: send/receive deadlines derived from the
//!   line rate and the frame lengths
//! - **Baud-rate probing**: unknown slaves are probed across a candidate
//!   rate list; discovered rates are cached per slave
//! - **Tag layer**: named register references are coalesced into a minimum
//!   sequence of contiguous reads and decoded through typed accessors
//! - **Typed failures**: slave exceptions, framing faults and transport
//!   errors each keep their own error variant
//!
//! ## Supported Function Codes
//!
//! | Code | Function | Master |
//! |------|----------|--------|
//! | 0x01 | Read Coils | ✅ |
//! | 0x02 | Read Discrete Inputs | ✅ |
//! | 0x03 | Read Holding Registers | ✅ |
//! | 0x04 | Read Input Registers | ✅ |
//! | 0x05 | Write Single Coil | codec only |
//! | 0x06 | Write Single Register | codec only |
//! | 0x0F | Write Multiple Coils | ✅ |
//! | 0x10 | Write Multiple Registers | ✅ |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use modbus_master::{Master, RegisterType, TcpStreamDevice};
//!
//! #[tokio::main]
//! async fn main() -> modbus_master::ModbusResult<()> {
//!     let device = TcpStreamDevice::connect("192.168.1.10:502", Duration::from_secs(5))
//!         .await
//!         .map_err(modbus_master::ModbusError::from)?;
//!     let mut master = Master::tcp(device);
//!     master.set_slave_baudrate(1, 115200);
//!
//!     let values = master.read(1, RegisterType::Holding, 0, 10).await?;
//!     println!("registers: {:?}", values);
//!     Ok(())
//! }
//! ```

// ============================================================================
// Core modules
// ============================================================================

/// Core error types and result handling
pub mod error;

/// Modbus protocol constants based on official specification
pub mod constants;

/// Byte order handling and typed register conversion
pub mod bytes;

/// Frame codec for the RTU and TCP encodings
pub mod frame;

/// Stream device abstraction and transports
pub mod transport;

/// Master transaction engine with baud-rate probing
pub mod master;

/// Register buffers and typed views
pub mod buffer;

/// Tag descriptors and dynamic value decoding
pub mod tag;

/// Tag catalog, read planner and batched reads
pub mod tag_master;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// === Async runtime (users can use modbus_master::tokio) ===
pub use tokio;

// === Error handling ===
pub use error::{ModbusError, ModbusResult};

// === Core types ===
pub use bytes::{ByteOrder, RegisterType, RegisterValue};
pub use frame::{ExceptionCode, Frame, FunctionCode, ValidationStatus};

// === Engine ===
pub use master::{get_function_code, Master};
pub use transport::{StreamDevice, StreamError, TcpStreamDevice, INVALID_BAUDRATE};

#[cfg(feature = "rtu")]
pub use transport::SerialStreamDevice;

// === Register access ===
pub use buffer::{RegisterBuffer, RegisterBufferView};

// === Tag layer ===
pub use tag::{AccessLevel, Representation, Tag, TagValue, TagValueType};
pub use tag_master::{ReadRequest, TagMaster};

// === Protocol limits (commonly needed constants) ===
pub use constants::{BAUD_CANDIDATES, MAX_MODBUS_REGISTERS, SLAVE_ID_MAX, SLAVE_ID_MIN};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
