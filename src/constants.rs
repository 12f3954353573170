//! Modbus protocol constants based on official specification
//!
//! Wire sizes cover both encodings of a frame:
//! - TCP: MBAP header (7 bytes) followed by the PDU
//! - RTU: unit id + function code + PDU payload + CRC-16

// ============================================================================
// Frame Size Constants
// ============================================================================

/// Modbus MBAP header length for TCP
/// Format: Transaction ID(2) + Protocol ID(2) + Length(2) + Unit ID(1) = 7 bytes
pub const MBAP_HEADER_SIZE: usize = 7;

/// Offset of the RTU frame inside the shared frame buffer.
///
/// The RTU layout starts at the unit-id byte of the TCP layout, so both
/// encodings overlay the same buffer.
pub const RTU_HEADER_START: usize = MBAP_HEADER_SIZE - 1;

/// Internal frame buffer capacity.
///
/// Theoretical max TCP frame is 260 bytes (MBAP + 253-byte PDU); 300 bytes
/// leaves headroom for the RTU CRC trailer at any valid offset.
pub const FRAME_BUFFER_SIZE: usize = 300;

// ============================================================================
// Wire Field Sizes
// ============================================================================

/// Unit/slave id field (1 byte).
pub const UNIT_ID_SIZE: usize = 1;

/// RTU header: unit id + function code.
pub const RTU_HEADER_SIZE: usize = 2;

/// Starting address field (2 bytes, big-endian).
pub const STARTING_ADDRESS_SIZE: usize = 2;

/// Register/coil count field (2 bytes, big-endian).
pub const REGISTER_COUNT_SIZE: usize = 2;

/// Byte-count field (1 byte).
pub const BYTE_COUNT_SIZE: usize = 1;

/// Data field of a single-write request/response (2 bytes).
pub const WRITE_DATA_SIZE: usize = 2;

/// CRC-16 trailer of an RTU frame (2 bytes, little-endian on the wire).
pub const CRC_SIZE: usize = 2;

/// Exception code field (1 byte).
pub const EXCEPTION_CODE_SIZE: usize = 1;

// ============================================================================
// Protocol Limits
// ============================================================================

/// Maximum registers per read request (FC03/FC04)
///
/// Response PDU: function code (1) + byte count (1) + N * 2 <= 253,
/// therefore N <= 125.
pub const MAX_MODBUS_REGISTERS: u16 = 125;

/// Lowest addressable slave/unit id on a shared bus.
pub const SLAVE_ID_MIN: u8 = 1;

/// Highest addressable slave/unit id on a shared bus.
pub const SLAVE_ID_MAX: u8 = 247;

// ============================================================================
// Timing
// ============================================================================

/// Default additive slack on the computed response timeout, in milliseconds.
pub const DEFAULT_DEVICE_RESPONSE_TIME_MS: u32 = 30;

/// Ordered candidate line rates tried while probing an unknown slave.
pub const BAUD_CANDIDATES: [u32; 10] = [
    9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600, 1_000_000, 2_000_000,
];

/// Fallback probe rate used when the device cannot report its line rate.
pub const FALLBACK_PROBE_BAUD: u32 = 9600;
