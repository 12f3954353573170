//! Modbus frame codec for the RTU and TCP encodings
//!
//! A [`Frame`] owns a fixed 300-byte buffer holding the TCP-framed layout at
//! offset 0; the RTU layout starts at offset 6, so the unit-id byte is shared
//! between both encodings:
//!
//! ```text
//! offset 0                  6        7        8
//!        | tid(2) pid(2) len(2) | unit(1) | fc(1) | pdu payload ...
//!                               |<------- RTU frame ------->| crc(2)
//! ```
//!
//! Field accessors are layout-aware: where a field sits (or whether it exists
//! at all) depends on the function code and the request/response direction,
//! so the frame carries a direction flag alongside the raw bytes.

use std::fmt;

use crate::constants::{
    BYTE_COUNT_SIZE, CRC_SIZE, EXCEPTION_CODE_SIZE, FRAME_BUFFER_SIZE, MBAP_HEADER_SIZE,
    REGISTER_COUNT_SIZE, RTU_HEADER_SIZE, RTU_HEADER_START, STARTING_ADDRESS_SIZE, UNIT_ID_SIZE,
    WRITE_DATA_SIZE,
};

// ============================================================================
// Protocol enums
// ============================================================================

/// Modbus function codes understood by the codec.
///
/// The last four are accepted on the wire but have no dedicated layout here;
/// their length calculation yields 0 and they never carry register values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FunctionCode {
    Invalid = 0x00,
    ReadCoils = 0x01,
    ReadDiscreteInputs = 0x02,
    ReadHoldingRegisters = 0x03,
    ReadInputRegisters = 0x04,
    WriteSingleCoil = 0x05,
    WriteSingleRegister = 0x06,
    WriteMultipleCoils = 0x0F,
    WriteMultipleRegisters = 0x10,
    Diagnostics = 0x08,
    ReadDeviceIdentification = 0x0E,
    MaskWriteRegister = 0x16,
    ReadWriteMultipleRegisters = 0x17,
}

impl FunctionCode {
    /// Map a wire value (exception bit already masked off) to a code.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x01 => Self::ReadCoils,
            0x02 => Self::ReadDiscreteInputs,
            0x03 => Self::ReadHoldingRegisters,
            0x04 => Self::ReadInputRegisters,
            0x05 => Self::WriteSingleCoil,
            0x06 => Self::WriteSingleRegister,
            0x0F => Self::WriteMultipleCoils,
            0x10 => Self::WriteMultipleRegisters,
            0x08 => Self::Diagnostics,
            0x0E => Self::ReadDeviceIdentification,
            0x16 => Self::MaskWriteRegister,
            0x17 => Self::ReadWriteMultipleRegisters,
            _ => Self::Invalid,
        }
    }

    /// True for the four bulk read functions (FC01-FC04).
    pub fn is_read(self) -> bool {
        matches!(
            self,
            Self::ReadCoils
                | Self::ReadDiscreteInputs
                | Self::ReadHoldingRegisters
                | Self::ReadInputRegisters
        )
    }

    /// True for the bit-addressed functions whose payload packs 8 values per byte.
    pub fn is_bit_function(self) -> bool {
        matches!(
            self,
            Self::ReadCoils | Self::ReadDiscreteInputs | Self::WriteMultipleCoils
        )
    }
}

/// Modbus exception codes a slave can answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExceptionCode {
    IllegalFunction = 0x01,
    IllegalDataAddress = 0x02,
    IllegalDataValue = 0x03,
    SlaveDeviceFailure = 0x04,
    Acknowledge = 0x05,
    SlaveDeviceBusy = 0x06,
    NegativeAcknowledge = 0x07,
    MemoryParityError = 0x08,
}

impl ExceptionCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::IllegalFunction),
            0x02 => Some(Self::IllegalDataAddress),
            0x03 => Some(Self::IllegalDataValue),
            0x04 => Some(Self::SlaveDeviceFailure),
            0x05 => Some(Self::Acknowledge),
            0x06 => Some(Self::SlaveDeviceBusy),
            0x07 => Some(Self::NegativeAcknowledge),
            0x08 => Some(Self::MemoryParityError),
            _ => None,
        }
    }

    /// Human-readable name for a raw exception code byte.
    pub fn description(value: u8) -> &'static str {
        match Self::from_u8(value) {
            Some(Self::IllegalFunction) => "illegal function",
            Some(Self::IllegalDataAddress) => "illegal data address",
            Some(Self::IllegalDataValue) => "illegal data value",
            Some(Self::SlaveDeviceFailure) => "slave device failure",
            Some(Self::Acknowledge) => "acknowledge",
            Some(Self::SlaveDeviceBusy) => "slave device busy",
            Some(Self::NegativeAcknowledge) => "negative acknowledge",
            Some(Self::MemoryParityError) => "memory parity error",
            None => "unknown exception",
        }
    }
}

/// Outcome of frame validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    Ok,
    ProtocolIdentifier,
    MbapHeaderLengthInvalid,
    InvalidCrc,
    TransactionId,
    InvalidFunctionCode,
    Unknown,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Ok => "OK",
            Self::ProtocolIdentifier => "protocol identifier",
            Self::MbapHeaderLengthInvalid => "MBAP header length invalid",
            Self::InvalidCrc => "invalid CRC",
            Self::TransactionId => "transaction id mismatch",
            Self::InvalidFunctionCode => "invalid function code",
            Self::Unknown => "unknown",
        };
        f.write_str(text)
    }
}

// ============================================================================
// CRC-16 (Modbus polynomial, seed 0xFFFF)
// ============================================================================

#[rustfmt::skip]
const CRC16_TABLE: [u16; 256] = [
    0x0000, 0xC0C1, 0xC181, 0x0140, 0xC301, 0x03C0, 0x0280, 0xC241,
    0xC601, 0x06C0, 0x0780, 0xC741, 0x0500, 0xC5C1, 0xC481, 0x0440,
    0xCC01, 0x0CC0, 0x0D80, 0xCD41, 0x0F00, 0xCFC1, 0xCE81, 0x0E40,
    0x0A00, 0xCAC1, 0xCB81, 0x0B40, 0xC901, 0x09C0, 0x0880, 0xC841,
    0xD801, 0x18C0, 0x1980, 0xD941, 0x1B00, 0xDBC1, 0xDA81, 0x1A40,
    0x1E00, 0xDEC1, 0xDF81, 0x1F40, 0xDD01, 0x1DC0, 0x1C80, 0xDC41,
    0x1400, 0xD4C1, 0xD581, 0x1540, 0xD701, 0x17C0, 0x1680, 0xD641,
    0xD201, 0x12C0, 0x1380, 0xD341, 0x1100, 0xD1C1, 0xD081, 0x1040,
    0xF001, 0x30C0, 0x3180, 0xF141, 0x3300, 0xF3C1, 0xF281, 0x3240,
    0x3600, 0xF6C1, 0xF781, 0x3740, 0xF501, 0x35C0, 0x3480, 0xF441,
    0x3C00, 0xFCC1, 0xFD81, 0x3D40, 0xFF01, 0x3FC0, 0x3E80, 0xFE41,
    0xFA01, 0x3AC0, 0x3B80, 0xFB41, 0x3900, 0xF9C1, 0xF881, 0x3840,
    0x2800, 0xE8C1, 0xE981, 0x2940, 0xEB01, 0x2BC0, 0x2A80, 0xEA41,
    0xEE01, 0x2EC0, 0x2F80, 0xEF41, 0x2D00, 0xEDC1, 0xEC81, 0x2C40,
    0xE401, 0x24C0, 0x2580, 0xE541, 0x2700, 0xE7C1, 0xE681, 0x2640,
    0x2200, 0xE2C1, 0xE381, 0x2340, 0xE101, 0x21C0, 0x2080, 0xE041,
    0xA001, 0x60C0, 0x6180, 0xA141, 0x6300, 0xA3C1, 0xA281, 0x6240,
    0x6600, 0xA6C1, 0xA781, 0x6740, 0xA501, 0x65C0, 0x6480, 0xA441,
    0x6C00, 0xACC1, 0xAD81, 0x6D40, 0xAF01, 0x6FC0, 0x6E80, 0xAE41,
    0xAA01, 0x6AC0, 0x6B80, 0xAB41, 0x6900, 0xA9C1, 0xA881, 0x6840,
    0x7800, 0xB8C1, 0xB981, 0x7940, 0xBB01, 0x7BC0, 0x7A80, 0xBA41,
    0xBE01, 0x7EC0, 0x7F80, 0xBF41, 0x7D00, 0xBDC1, 0xBC81, 0x7C40,
    0xB401, 0x74C0, 0x7580, 0xB541, 0x7700, 0xB7C1, 0xB681, 0x7640,
    0x7200, 0xB2C1, 0xB381, 0x7340, 0xB101, 0x71C0, 0x7080, 0xB041,
    0x5000, 0x90C1, 0x9181, 0x5140, 0x9301, 0x53C0, 0x5280, 0x9241,
    0x9601, 0x56C0, 0x5780, 0x9741, 0x5500, 0x95C1, 0x9481, 0x5440,
    0x9C01, 0x5CC0, 0x5D80, 0x9D41, 0x5F00, 0x9FC1, 0x9E81, 0x5E40,
    0x5A00, 0x9AC1, 0x9B81, 0x5B40, 0x9901, 0x59C0, 0x5880, 0x9841,
    0x8801, 0x48C0, 0x4980, 0x8941, 0x4B00, 0x8BC1, 0x8A81, 0x4A40,
    0x4E00, 0x8EC1, 0x8F81, 0x4F40, 0x8D01, 0x4DC0, 0x4C80, 0x8C41,
    0x4400, 0x84C1, 0x8581, 0x4540, 0x8701, 0x47C0, 0x4680, 0x8641,
    0x8201, 0x42C0, 0x4380, 0x8341, 0x4100, 0x81C1, 0x8081, 0x4040,
];

/// CRC-16 over `data` with seed 0xFFFF (table-driven, reflected polynomial).
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        let index = (byte ^ (crc & 0xFF) as u8) as usize;
        crc = (crc >> 8) ^ CRC16_TABLE[index];
    }
    crc
}

// ============================================================================
// Frame
// ============================================================================

// Buffer offsets of the overlaid layouts. Positions past FUNCTION_CODE shift
// meaning with the function code and direction.
const POS_TRANSACTION_ID: usize = 0;
const POS_PROTOCOL_ID: usize = 2;
const POS_LENGTH: usize = 4;
const POS_UNIT_ID: usize = 6;
const POS_FUNCTION_CODE: usize = 7;
const POS_DATA: usize = 8;
const POS_EXCEPTION_CODE: usize = POS_DATA;
const POS_START_ADDRESS: usize = POS_DATA;
const POS_BYTE_COUNT: usize = POS_DATA;
const POS_REGISTER_DATA: usize = POS_BYTE_COUNT + 1;
const POS_REGISTER_COUNT: usize = POS_START_ADDRESS + 2;
const POS_BYTE_COUNT_MULTIPLE: usize = POS_REGISTER_COUNT + 2;
const POS_DATA_WRITE_SINGLE: usize = POS_START_ADDRESS + 2;
const POS_DATA_WRITE_MULTIPLE: usize = POS_BYTE_COUNT_MULTIPLE + 1;

/// Bits on the wire per byte: 8 data + start + stop.
const BITS_PER_BYTE: u64 = 10;

/// An in-memory Modbus PDU with both wire encodings overlaid.
#[derive(Clone)]
pub struct Frame {
    data: [u8; FRAME_BUFFER_SIZE],
    is_request: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    pub fn new() -> Self {
        Self {
            data: [0; FRAME_BUFFER_SIZE],
            is_request: false,
        }
    }

    fn get_u16(&self, pos: usize) -> u16 {
        u16::from_be_bytes([self.data[pos], self.data[pos + 1]])
    }

    fn set_u16(&mut self, pos: usize, value: u16) {
        self.data[pos..pos + 2].copy_from_slice(&value.to_be_bytes());
    }

    // ------------------------------------------------------------------
    // Raw ingestion
    // ------------------------------------------------------------------

    /// Overlay raw RTU bytes (unit id first) and back-fill the MBAP length
    /// from the decoded layout.
    pub fn set_raw_rtu_data(&mut self, rtu_data: &[u8], is_request: bool) -> &mut Self {
        self.is_request = is_request;
        let n = rtu_data.len().min(FRAME_BUFFER_SIZE - RTU_HEADER_START);
        self.data[RTU_HEADER_START..RTU_HEADER_START + n].copy_from_slice(&rtu_data[..n]);
        let without_crc = self.rtu_length_without_crc();
        self.set_mbap_length(without_crc as u16);
        self
    }

    /// Overlay raw TCP-framed bytes starting at the transaction id.
    pub fn set_raw_tcp_data(&mut self, tcp_data: &[u8], is_request: bool) -> &mut Self {
        self.is_request = is_request;
        let n = tcp_data.len().min(FRAME_BUFFER_SIZE);
        self.data[..n].copy_from_slice(&tcp_data[..n]);
        self
    }

    pub fn from_rtu_bytes(rtu_data: &[u8], is_request: bool) -> Self {
        let mut frame = Self::new();
        frame.set_raw_rtu_data(rtu_data, is_request);
        frame
    }

    pub fn from_tcp_bytes(tcp_data: &[u8], is_request: bool) -> Self {
        let mut frame = Self::new();
        frame.set_raw_tcp_data(tcp_data, is_request);
        frame
    }

    pub fn clear(&mut self) -> &mut Self {
        self.data.fill(0);
        self.is_request = false;
        self
    }

    // ------------------------------------------------------------------
    // Plain field accessors
    // ------------------------------------------------------------------

    pub fn is_request(&self) -> bool {
        self.is_request
    }

    pub fn set_is_request(&mut self, is_request: bool) -> &mut Self {
        self.is_request = is_request;
        self
    }

    pub fn transaction_id(&self) -> u16 {
        self.get_u16(POS_TRANSACTION_ID)
    }

    pub fn set_transaction_id(&mut self, value: u16) -> &mut Self {
        self.set_u16(POS_TRANSACTION_ID, value);
        self
    }

    pub fn protocol_id(&self) -> u16 {
        self.get_u16(POS_PROTOCOL_ID)
    }

    pub fn set_protocol_id(&mut self, value: u16) -> &mut Self {
        self.set_u16(POS_PROTOCOL_ID, value);
        self
    }

    /// MBAP length: bytes from the unit id through the end of the PDU.
    pub fn mbap_length(&self) -> u16 {
        self.get_u16(POS_LENGTH)
    }

    pub fn set_mbap_length(&mut self, value: u16) -> &mut Self {
        self.set_u16(POS_LENGTH, value);
        self
    }

    pub fn slave_id(&self) -> u8 {
        self.data[POS_UNIT_ID]
    }

    pub fn set_slave_id(&mut self, value: u8) -> &mut Self {
        self.data[POS_UNIT_ID] = value;
        self
    }

    /// Function code with the exception bit masked off.
    pub fn function_code(&self) -> FunctionCode {
        FunctionCode::from_u8(self.data[POS_FUNCTION_CODE] & 0x7F)
    }

    pub fn set_function_code(&mut self, value: FunctionCode) -> &mut Self {
        self.data[POS_FUNCTION_CODE] = value as u8;
        self
    }

    pub fn is_exception(&self) -> bool {
        self.data[POS_FUNCTION_CODE] & 0x80 != 0
    }

    /// Flag the frame as an exception response. Exceptions are always
    /// responses, so setting the flag also clears the request direction.
    pub fn set_is_exception(&mut self, flag: bool) -> &mut Self {
        if flag {
            self.is_request = false;
            self.data[POS_FUNCTION_CODE] |= 0x80;
        } else {
            self.data[POS_FUNCTION_CODE] &= !0x80;
        }
        self
    }

    /// Raw exception code byte; 0 when the frame is not an exception.
    pub fn exception_code(&self) -> u8 {
        if self.is_exception() {
            self.data[POS_EXCEPTION_CODE]
        } else {
            0
        }
    }

    pub fn set_exception_code(&mut self, code: ExceptionCode) -> &mut Self {
        self.data[POS_EXCEPTION_CODE] = code as u8;
        self
    }

    // ------------------------------------------------------------------
    // Conditional accessors
    // ------------------------------------------------------------------

    /// Whether this (function code, direction) carries a start address.
    pub fn has_start_address(&self) -> bool {
        if self.is_exception() {
            return false;
        }
        match self.function_code() {
            fc if fc.is_read() => self.is_request,
            FunctionCode::WriteSingleCoil
            | FunctionCode::WriteSingleRegister
            | FunctionCode::WriteMultipleCoils
            | FunctionCode::WriteMultipleRegisters => true,
            _ => false,
        }
    }

    pub fn start_address(&self) -> u16 {
        if !self.has_start_address() {
            return 0;
        }
        self.get_u16(POS_START_ADDRESS)
    }

    pub fn set_start_address(&mut self, value: u16) -> &mut Self {
        if self.has_start_address() {
            self.set_u16(POS_START_ADDRESS, value);
        }
        self
    }

    /// Payload byte count. The field position differs per function code and
    /// direction; single writes and bulk-read requests synthesize it.
    pub fn byte_count(&self) -> u16 {
        if self.is_exception() {
            return 0;
        }
        match self.function_code() {
            fc if fc.is_read() => {
                if self.is_request {
                    0
                } else {
                    u16::from(self.data[POS_BYTE_COUNT])
                }
            }
            FunctionCode::WriteMultipleCoils | FunctionCode::WriteMultipleRegisters => {
                if self.is_request {
                    u16::from(self.data[POS_BYTE_COUNT_MULTIPLE])
                } else {
                    0
                }
            }
            FunctionCode::WriteSingleCoil | FunctionCode::WriteSingleRegister => 2,
            _ => 0,
        }
    }

    pub fn set_byte_count(&mut self, value: u8) -> &mut Self {
        if self.is_exception() {
            return self;
        }
        match self.function_code() {
            fc if fc.is_read() => {
                if !self.is_request {
                    self.data[POS_BYTE_COUNT] = value;
                }
            }
            FunctionCode::WriteMultipleCoils | FunctionCode::WriteMultipleRegisters => {
                if self.is_request {
                    self.data[POS_BYTE_COUNT_MULTIPLE] = value;
                }
            }
            _ => {}
        }
        self
    }

    /// Register (or coil) count.
    ///
    /// Bit-read responses derive it from the byte count (8 per byte), word
    /// reads from the byte count / 2, single writes are always 1 and bulk
    /// writes carry a dedicated field.
    pub fn register_count(&self) -> u16 {
        if self.is_exception() {
            return 0;
        }
        match self.function_code() {
            FunctionCode::ReadCoils | FunctionCode::ReadDiscreteInputs => {
                if self.is_request {
                    self.get_u16(POS_REGISTER_COUNT)
                } else {
                    self.byte_count() * 8
                }
            }
            FunctionCode::ReadHoldingRegisters | FunctionCode::ReadInputRegisters => {
                if self.is_request {
                    self.get_u16(POS_REGISTER_COUNT)
                } else {
                    self.byte_count() / 2
                }
            }
            FunctionCode::WriteSingleCoil | FunctionCode::WriteSingleRegister => 1,
            FunctionCode::WriteMultipleCoils | FunctionCode::WriteMultipleRegisters => {
                self.get_u16(POS_REGISTER_COUNT)
            }
            _ => 0,
        }
    }

    pub fn set_register_count(&mut self, value: u16) -> &mut Self {
        if self.is_exception() {
            return self;
        }
        match self.function_code() {
            fc if fc.is_read() => {
                if self.is_request {
                    self.set_u16(POS_REGISTER_COUNT, value);
                }
            }
            FunctionCode::WriteMultipleCoils | FunctionCode::WriteMultipleRegisters => {
                self.set_u16(POS_REGISTER_COUNT, value);
            }
            _ => {}
        }
        self
    }

    /// Whether this (function code, direction) carries register values.
    pub fn has_registers_values(&self) -> bool {
        if self.is_exception() {
            return false;
        }
        match self.function_code() {
            fc if fc.is_read() => !self.is_request,
            FunctionCode::WriteSingleCoil | FunctionCode::WriteSingleRegister => true,
            FunctionCode::WriteMultipleCoils | FunctionCode::WriteMultipleRegisters => {
                self.is_request
            }
            _ => false,
        }
    }

    fn registers_data_position(&self) -> usize {
        match self.function_code() {
            fc if fc.is_read() => POS_REGISTER_DATA,
            FunctionCode::WriteSingleCoil | FunctionCode::WriteSingleRegister => {
                POS_DATA_WRITE_SINGLE
            }
            FunctionCode::WriteMultipleCoils | FunctionCode::WriteMultipleRegisters => {
                POS_DATA_WRITE_MULTIPLE
            }
            _ => POS_DATA,
        }
    }

    /// Raw payload bytes carrying register values; empty when absent.
    pub fn registers_data(&self) -> &[u8] {
        if !self.has_registers_values() {
            return &[];
        }
        let pos = self.registers_data_position();
        &self.data[pos..pos + self.byte_count() as usize]
    }

    /// Decode the payload into 16-bit words.
    ///
    /// Bit functions yield one word per bit, LSB-first within each byte,
    /// `0xFF00` for set and `0x0000` for clear (the WriteSingleCoil value
    /// encoding). Word functions read big-endian pairs.
    pub fn registers_values(&self) -> Vec<u16> {
        let bytes = self.registers_data();
        let fc = self.function_code();
        if fc == FunctionCode::ReadCoils || fc == FunctionCode::ReadDiscreteInputs {
            let mut result = Vec::with_capacity(bytes.len() * 8);
            for &byte in bytes {
                for bit in 0..8 {
                    let set = (byte >> bit) & 0x1 != 0;
                    result.push(if set { 0xFF00 } else { 0x0000 });
                }
            }
            result
        } else {
            bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect()
        }
    }

    /// Pack words into the payload big-endian, clipped to the byte count.
    pub fn set_registers_values(&mut self, values: &[u16]) -> &mut Self {
        if !self.has_registers_values() {
            return self;
        }
        let pos = self.registers_data_position();
        let byte_count = self.byte_count() as usize;
        for i in (0..byte_count).step_by(2) {
            let value_index = i / 2;
            if value_index >= values.len() {
                break;
            }
            let be = values[value_index].to_be_bytes();
            self.data[pos + i] = be[0];
            self.data[pos + i + 1] = be[1];
        }
        self
    }

    // ------------------------------------------------------------------
    // Lengths
    // ------------------------------------------------------------------

    /// RTU frame length implied by the MBAP length field.
    pub fn rtu_length(&self) -> u16 {
        self.mbap_length() + CRC_SIZE as u16
    }

    /// PDU length (function code + payload), excluding the unit id.
    pub fn pdu_length(&self) -> u16 {
        let mut len = self.mbap_length();
        if len == 0 {
            len = self.rtu_length_without_crc() as u16;
        }
        len.saturating_sub(UNIT_ID_SIZE as u16)
    }

    fn rtu_length_without_crc(&self) -> usize {
        self.calculate_rtu_length().saturating_sub(CRC_SIZE)
    }

    /// Layout-derived RTU length of this frame, CRC included.
    pub fn calculate_rtu_length(&self) -> usize {
        Self::calculate_rtu_length_for(
            self.is_exception(),
            self.is_request,
            self.function_code(),
            self.byte_count(),
        )
    }

    /// RTU length for an arbitrary (exception, direction, function code,
    /// byte count) combination. Unknown function codes yield 0.
    pub fn calculate_rtu_length_for(
        is_exception: bool,
        is_request: bool,
        function_code: FunctionCode,
        byte_count: u16,
    ) -> usize {
        if is_exception {
            return RTU_HEADER_SIZE + EXCEPTION_CODE_SIZE + CRC_SIZE;
        }
        match function_code {
            fc if fc.is_read() => {
                if is_request {
                    RTU_HEADER_SIZE + STARTING_ADDRESS_SIZE + REGISTER_COUNT_SIZE + CRC_SIZE
                } else {
                    RTU_HEADER_SIZE + BYTE_COUNT_SIZE + byte_count as usize + CRC_SIZE
                }
            }
            FunctionCode::WriteSingleCoil | FunctionCode::WriteSingleRegister => {
                RTU_HEADER_SIZE + STARTING_ADDRESS_SIZE + WRITE_DATA_SIZE + CRC_SIZE
            }
            FunctionCode::WriteMultipleCoils | FunctionCode::WriteMultipleRegisters => {
                if is_request {
                    RTU_HEADER_SIZE
                        + STARTING_ADDRESS_SIZE
                        + REGISTER_COUNT_SIZE
                        + BYTE_COUNT_SIZE
                        + byte_count as usize
                        + CRC_SIZE
                } else {
                    RTU_HEADER_SIZE + STARTING_ADDRESS_SIZE + REGISTER_COUNT_SIZE + CRC_SIZE
                }
            }
            _ => 0,
        }
    }

    /// Predicted RTU length of the peer's response to this request.
    ///
    /// Bulk reads are predicted as the response layout with
    /// `byte_count = register_count * 2`; write responses are assumed to
    /// match the request size. On a response frame, its own length.
    pub fn calculate_expected_response_rtu_length(&self) -> usize {
        if !self.is_request {
            return self.rtu_length() as usize;
        }
        let fc = self.function_code();
        if fc.is_read() {
            Self::calculate_rtu_length_for(false, false, fc, self.register_count().saturating_mul(2))
        } else {
            self.rtu_length() as usize
        }
    }

    // ------------------------------------------------------------------
    // Transmission timing
    // ------------------------------------------------------------------

    /// Wire time in milliseconds for `length` bytes at `bits_per_second`,
    /// rounded up (10 bits per byte: 8 data + start + stop).
    pub fn transmission_time_ms(length: usize, bits_per_second: u32) -> u32 {
        if bits_per_second == 0 {
            return 0;
        }
        let bits = BITS_PER_BYTE * 1000 * length as u64;
        bits.div_ceil(u64::from(bits_per_second)) as u32
    }

    /// Wire time of this frame's RTU encoding.
    pub fn frame_transmission_time_ms(&self, bits_per_second: u32) -> u32 {
        Self::transmission_time_ms(self.calculate_rtu_length(), bits_per_second)
    }

    /// Wire time of the expected response to this request.
    pub fn response_transmission_time_ms(&self, bits_per_second: u32) -> u32 {
        Self::transmission_time_ms(
            self.calculate_expected_response_rtu_length(),
            bits_per_second,
        )
    }

    // ------------------------------------------------------------------
    // CRC
    // ------------------------------------------------------------------

    fn crc_position(&self) -> usize {
        RTU_HEADER_START + self.rtu_length_without_crc()
    }

    /// CRC computed over unit id through end of PDU.
    pub fn compute_crc(&self) -> u16 {
        crc16(&self.data[RTU_HEADER_START..RTU_HEADER_START + self.rtu_length_without_crc()])
    }

    /// CRC currently stored in the buffer (little-endian on the wire).
    pub fn stored_crc(&self) -> u16 {
        let pos = self.crc_position();
        u16::from_le_bytes([self.data[pos], self.data[pos + 1]])
    }

    pub fn set_crc(&mut self, value: u16) -> &mut Self {
        let pos = self.crc_position();
        self.data[pos..pos + 2].copy_from_slice(&value.to_le_bytes());
        self
    }

    pub fn append_crc(&mut self) -> &mut Self {
        let crc = self.compute_crc();
        self.set_crc(crc)
    }

    // ------------------------------------------------------------------
    // Wire views
    // ------------------------------------------------------------------

    /// Finalize and return the RTU encoding (appends the CRC).
    pub fn rtu_frame(&mut self) -> &[u8] {
        let length = self.calculate_rtu_length();
        self.append_crc();
        &self.data[RTU_HEADER_START..RTU_HEADER_START + length]
    }

    /// Finalize and return the TCP encoding (refreshes the MBAP length).
    pub fn tcp_frame(&mut self) -> &[u8] {
        let without_crc = self.rtu_length_without_crc() as u16;
        self.set_mbap_length(without_crc);
        let size = MBAP_HEADER_SIZE + self.pdu_length() as usize;
        &self.data[..size]
    }

    /// Whole internal buffer, for receiving a TCP frame in place.
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// RTU window of the internal buffer, for receiving an RTU frame in place.
    pub fn rtu_buffer_mut(&mut self) -> &mut [u8] {
        &mut self.data[RTU_HEADER_START..]
    }

    // ------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------

    /// Populate every field of a request or response and append the CRC.
    pub fn build(
        is_request: bool,
        slave_id: u8,
        function_code: FunctionCode,
        start_address: u16,
        register_count: u16,
        registers_values: &[u16],
        transaction_id: u16,
    ) -> Self {
        let mut frame = Self::new();
        frame.rebuild(
            is_request,
            slave_id,
            function_code,
            start_address,
            register_count,
            registers_values,
            transaction_id,
        );
        frame
    }

    /// `build` in place, reusing this frame's buffer.
    #[allow(clippy::too_many_arguments)]
    pub fn rebuild(
        &mut self,
        is_request: bool,
        slave_id: u8,
        function_code: FunctionCode,
        start_address: u16,
        register_count: u16,
        registers_values: &[u16],
        transaction_id: u16,
    ) -> &mut Self {
        self.clear();
        self.set_is_request(is_request);
        self.set_transaction_id(transaction_id);
        self.set_slave_id(slave_id);
        self.set_function_code(function_code);
        self.set_start_address(start_address);
        self.set_register_count(register_count);
        self.set_byte_count(register_count.saturating_mul(2) as u8);
        self.set_registers_values(registers_values);
        let without_crc = self.rtu_length_without_crc() as u16;
        self.set_mbap_length(without_crc);
        self.append_crc();
        self
    }

    /// Build an exception response for the given function code.
    pub fn build_exception_response(
        slave_id: u8,
        function_code: FunctionCode,
        exception_code: ExceptionCode,
        transaction_id: u16,
    ) -> Self {
        let mut frame = Self::new();
        frame
            .set_transaction_id(transaction_id)
            .set_slave_id(slave_id)
            .set_function_code(function_code)
            .set_is_exception(true)
            .set_exception_code(exception_code);
        let without_crc = frame.rtu_length_without_crc() as u16;
        frame.set_mbap_length(without_crc);
        frame.append_crc();
        frame
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Checks shared by both encodings.
    pub fn validate_common(&self) -> ValidationStatus {
        if self.data[POS_FUNCTION_CODE] & 0x7F == 0 {
            return ValidationStatus::InvalidFunctionCode;
        }
        ValidationStatus::Ok
    }

    /// Validate the TCP framing: protocol id, MBAP length, then common checks.
    pub fn validate_tcp(&self) -> ValidationStatus {
        if self.protocol_id() != 0 {
            return ValidationStatus::ProtocolIdentifier;
        }
        if self.mbap_length() == 0 {
            return ValidationStatus::MbapHeaderLengthInvalid;
        }
        self.validate_common()
    }

    /// Validate the RTU framing: common checks, then the CRC trailer.
    pub fn validate_rtu(&self) -> ValidationStatus {
        let common = self.validate_common();
        if common != ValidationStatus::Ok {
            return common;
        }
        if self.stored_crc() != self.compute_crc() {
            return ValidationStatus::InvalidCrc;
        }
        ValidationStatus::Ok
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("is_request", &self.is_request)
            .field("slave_id", &self.slave_id())
            .field("function_code", &self.function_code())
            .field("is_exception", &self.is_exception())
            .finish()
    }
}

impl fmt::Display for Frame {
    /// Hex dump of the frame bytes, MBAP prefix plus RTU payload and CRC.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = RTU_HEADER_START + self.calculate_rtu_length().max(RTU_HEADER_SIZE);
        for (i, byte) in self.data[..end.min(FRAME_BUFFER_SIZE)].iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc16_known_vector() {
        // CRC over "04 01 00 0A 00 0D" is 0x98DD, stored low byte first.
        let data = [0x04, 0x01, 0x00, 0x0A, 0x00, 0x0D];
        assert_eq!(crc16(&data), 0x98DD);
    }

    #[test]
    fn test_read_coils_request_parsing() {
        let raw = [0x04, 0x01, 0x00, 0x0A, 0x00, 0x0D, 0xDD, 0x98];
        let frame = Frame::from_rtu_bytes(&raw, true);
        assert_eq!(frame.rtu_length(), 8);
        assert_eq!(frame.slave_id(), 0x04);
        assert_eq!(frame.function_code(), FunctionCode::ReadCoils);
        assert_eq!(frame.start_address(), 10);
        assert_eq!(frame.register_count(), 13);
        assert_eq!(frame.validate_rtu(), ValidationStatus::Ok);
    }

    #[test]
    fn test_read_coils_response_parsing() {
        let raw = [0x04, 0x01, 0x02, 0x0A, 0x11, 0xB3, 0x50];
        let frame = Frame::from_rtu_bytes(&raw, false);
        assert_eq!(frame.rtu_length(), 7);
        assert_eq!(frame.slave_id(), 0x04);
        assert_eq!(frame.function_code(), FunctionCode::ReadCoils);
        assert_eq!(frame.byte_count(), 2);
        assert_eq!(frame.registers_data(), &[0x0A, 0x11]);
        assert_eq!(frame.validate_rtu(), ValidationStatus::Ok);
    }

    #[test]
    fn test_read_input_registers_request_parsing() {
        let raw = [0x01, 0x04, 0x00, 0x00, 0x00, 0x02, 0x71, 0xCB];
        let frame = Frame::from_rtu_bytes(&raw, true);
        assert_eq!(frame.rtu_length(), 8);
        assert_eq!(frame.slave_id(), 0x01);
        assert_eq!(frame.function_code(), FunctionCode::ReadInputRegisters);
        assert_eq!(frame.start_address(), 0);
        assert_eq!(frame.register_count(), 2);
        assert_eq!(frame.byte_count(), 0);
        assert_eq!(frame.validate_rtu(), ValidationStatus::Ok);
    }

    #[test]
    fn test_read_input_registers_response_parsing() {
        let raw = [0x01, 0x04, 0x04, 0x00, 0x06, 0x00, 0x05, 0xDB, 0x86];
        let frame = Frame::from_rtu_bytes(&raw, false);
        assert_eq!(frame.rtu_length(), 9);
        assert_eq!(frame.function_code(), FunctionCode::ReadInputRegisters);
        assert_eq!(frame.byte_count(), 4);
        assert_eq!(frame.registers_data(), &[0x00, 0x06, 0x00, 0x05]);
        assert_eq!(frame.registers_values(), vec![0x0006, 0x0005]);
        assert_eq!(frame.validate_rtu(), ValidationStatus::Ok);
    }

    #[test]
    fn test_read_holding_registers_request_parsing() {
        let raw = [0x01, 0x03, 0x00, 0x00, 0x00, 0x02, 0xC4, 0x0B];
        let frame = Frame::from_rtu_bytes(&raw, true);
        assert_eq!(frame.function_code(), FunctionCode::ReadHoldingRegisters);
        assert_eq!(frame.start_address(), 0);
        assert_eq!(frame.register_count(), 2);
        assert_eq!(frame.validate_rtu(), ValidationStatus::Ok);
    }

    #[test]
    fn test_read_holding_registers_response_parsing() {
        let raw = [0x01, 0x03, 0x04, 0x00, 0x06, 0x00, 0x05, 0xDA, 0x31];
        let frame = Frame::from_rtu_bytes(&raw, false);
        assert_eq!(frame.function_code(), FunctionCode::ReadHoldingRegisters);
        assert_eq!(frame.byte_count(), 4);
        assert_eq!(frame.registers_values(), vec![0x0006, 0x0005]);
        assert_eq!(frame.validate_rtu(), ValidationStatus::Ok);
    }

    #[test]
    fn test_bit_response_decodes_to_coil_words() {
        let raw = [0x04, 0x01, 0x02, 0x0A, 0x11, 0xB3, 0x50];
        let frame = Frame::from_rtu_bytes(&raw, false);
        let values = frame.registers_values();
        assert_eq!(values.len(), 16);
        // 0x0A = 0b0000_1010, LSB first
        assert_eq!(&values[..4], &[0x0000, 0xFF00, 0x0000, 0xFF00]);
        // 0x11 = 0b0001_0001
        assert_eq!(values[8], 0xFF00);
        assert_eq!(values[12], 0xFF00);
    }

    #[test]
    fn test_build_validates_for_all_function_codes() {
        let cases = [
            (FunctionCode::ReadCoils, true),
            (FunctionCode::ReadCoils, false),
            (FunctionCode::ReadDiscreteInputs, true),
            (FunctionCode::ReadDiscreteInputs, false),
            (FunctionCode::ReadHoldingRegisters, true),
            (FunctionCode::ReadHoldingRegisters, false),
            (FunctionCode::ReadInputRegisters, true),
            (FunctionCode::ReadInputRegisters, false),
            (FunctionCode::WriteSingleCoil, true),
            (FunctionCode::WriteSingleCoil, false),
            (FunctionCode::WriteSingleRegister, true),
            (FunctionCode::WriteSingleRegister, false),
            (FunctionCode::WriteMultipleCoils, true),
            (FunctionCode::WriteMultipleCoils, false),
            (FunctionCode::WriteMultipleRegisters, true),
            (FunctionCode::WriteMultipleRegisters, false),
        ];
        for (fc, is_request) in cases {
            let values = [0x1234, 0x5678];
            let mut frame = Frame::build(is_request, 7, fc, 100, 2, &values, 0);
            let _ = frame.rtu_frame();
            assert_eq!(
                frame.validate_rtu(),
                ValidationStatus::Ok,
                "fc {:?} request {}",
                fc,
                is_request
            );
        }
    }

    #[test]
    fn test_length_identity_after_build() {
        let frame = Frame::build(
            true,
            1,
            FunctionCode::ReadHoldingRegisters,
            0,
            10,
            &[],
            0,
        );
        assert_eq!(frame.rtu_length(), frame.mbap_length() + 2);
        assert_eq!(frame.pdu_length(), frame.mbap_length() - 1);

        let frame = Frame::build(
            true,
            1,
            FunctionCode::WriteMultipleRegisters,
            0,
            3,
            &[1, 2, 3],
            0,
        );
        assert_eq!(frame.rtu_length(), frame.mbap_length() + 2);
        assert_eq!(frame.pdu_length(), frame.mbap_length() - 1);
    }

    #[test]
    fn test_exception_roundtrip() {
        let mut frame = Frame::build_exception_response(
            9,
            FunctionCode::ReadHoldingRegisters,
            ExceptionCode::IllegalDataAddress,
            0,
        );
        assert!(frame.is_exception());
        assert!(!frame.is_request());
        assert_eq!(frame.function_code(), FunctionCode::ReadHoldingRegisters);
        assert_eq!(frame.exception_code(), 0x02);
        assert_eq!(frame.validate_rtu(), ValidationStatus::Ok);
        assert_eq!(frame.rtu_frame().len(), 5);
    }

    #[test]
    fn test_transmission_time() {
        assert_eq!(Frame::transmission_time_ms(8, 9600), 9);
        assert_eq!(Frame::transmission_time_ms(9, 9600), 10);
        assert_eq!(Frame::transmission_time_ms(96, 9600), 100);
        assert_eq!(Frame::transmission_time_ms(8, 0), 0);
    }

    #[test]
    fn test_expected_response_length() {
        // Read request: response is header + byte count + data + crc.
        let frame = Frame::build(true, 1, FunctionCode::ReadInputRegisters, 0, 2, &[], 0);
        assert_eq!(frame.calculate_expected_response_rtu_length(), 9);

        // Write request: response assumed the same size as the request.
        let frame = Frame::build(
            true,
            1,
            FunctionCode::WriteMultipleRegisters,
            0,
            2,
            &[1, 2],
            0,
        );
        assert_eq!(
            frame.calculate_expected_response_rtu_length(),
            frame.rtu_length() as usize
        );

        // On a response, its own length.
        let frame = Frame::build(false, 1, FunctionCode::ReadInputRegisters, 0, 2, &[1, 2], 0);
        assert_eq!(
            frame.calculate_expected_response_rtu_length(),
            frame.rtu_length() as usize
        );
    }

    #[test]
    fn test_tcp_frame_layout() {
        let mut frame = Frame::build(true, 0x11, FunctionCode::ReadHoldingRegisters, 0x6B, 3, &[], 0x4711);
        let tcp = frame.tcp_frame();
        assert_eq!(
            tcp,
            &[0x47, 0x11, 0x00, 0x00, 0x00, 0x06, 0x11, 0x03, 0x00, 0x6B, 0x00, 0x03]
        );
        assert_eq!(frame.validate_tcp(), ValidationStatus::Ok);
    }

    #[test]
    fn test_tcp_roundtrip_through_raw_bytes() {
        let mut frame = Frame::build(
            true,
            1,
            FunctionCode::WriteMultipleRegisters,
            0x10,
            2,
            &[0xDEAD, 0xBEEF],
            0x0102,
        );
        let bytes = frame.tcp_frame().to_vec();
        let parsed = Frame::from_tcp_bytes(&bytes, true);
        assert_eq!(parsed.transaction_id(), 0x0102);
        assert_eq!(parsed.start_address(), 0x10);
        assert_eq!(parsed.register_count(), 2);
        assert_eq!(parsed.registers_values(), vec![0xDEAD, 0xBEEF]);
        assert_eq!(parsed.validate_tcp(), ValidationStatus::Ok);
    }

    #[test]
    fn test_validate_rtu_rejects_corrupt_crc() {
        let mut raw = [0x01, 0x03, 0x00, 0x00, 0x00, 0x02, 0xC4, 0x0B];
        raw[6] ^= 0xFF;
        let frame = Frame::from_rtu_bytes(&raw, true);
        assert_eq!(frame.validate_rtu(), ValidationStatus::InvalidCrc);
    }

    #[test]
    fn test_validate_rejects_zero_function_code() {
        let frame = Frame::from_rtu_bytes(&[0x01, 0x00, 0x00, 0x00], true);
        assert_eq!(frame.validate_rtu(), ValidationStatus::InvalidFunctionCode);
        assert_eq!(frame.validate_common(), ValidationStatus::InvalidFunctionCode);
    }

    #[test]
    fn test_validate_tcp_rejects_bad_header() {
        let mut frame = Frame::build(true, 1, FunctionCode::ReadCoils, 0, 1, &[], 0);
        frame.set_protocol_id(5);
        assert_eq!(frame.validate_tcp(), ValidationStatus::ProtocolIdentifier);

        frame.set_protocol_id(0);
        frame.set_mbap_length(0);
        assert_eq!(frame.validate_tcp(), ValidationStatus::MbapHeaderLengthInvalid);
    }

    #[test]
    fn test_write_single_register_layout() {
        let mut frame = Frame::build(
            true,
            1,
            FunctionCode::WriteSingleRegister,
            0x0001,
            1,
            &[0x0003],
            0,
        );
        assert_eq!(frame.register_count(), 1);
        assert_eq!(frame.byte_count(), 2);
        assert_eq!(
            &frame.rtu_frame()[..6],
            &[0x01, 0x06, 0x00, 0x01, 0x00, 0x03]
        );
    }

    #[test]
    fn test_write_multiple_request_layout() {
        let mut frame = Frame::build(
            true,
            1,
            FunctionCode::WriteMultipleRegisters,
            0x0001,
            2,
            &[0x000A, 0x0102],
            0,
        );
        let rtu = frame.rtu_frame();
        assert_eq!(
            &rtu[..rtu.len() - 2],
            &[0x01, 0x10, 0x00, 0x01, 0x00, 0x02, 0x04, 0x00, 0x0A, 0x01, 0x02]
        );
        // Response to the same operation carries no values.
        let response = Frame::build(false, 1, FunctionCode::WriteMultipleRegisters, 1, 2, &[], 0);
        assert!(!response.has_registers_values());
        assert_eq!(response.calculate_rtu_length(), 8);
    }

    #[test]
    fn test_exception_suppresses_payload_accessors() {
        let frame = Frame::build_exception_response(
            1,
            FunctionCode::ReadCoils,
            ExceptionCode::SlaveDeviceBusy,
            0,
        );
        assert!(!frame.has_start_address());
        assert!(!frame.has_registers_values());
        assert_eq!(frame.byte_count(), 0);
        assert_eq!(frame.register_count(), 0);
    }

    #[test]
    fn test_function_code_mapping() {
        assert_eq!(FunctionCode::from_u8(0x01), FunctionCode::ReadCoils);
        assert_eq!(FunctionCode::from_u8(0x10), FunctionCode::WriteMultipleRegisters);
        assert_eq!(FunctionCode::from_u8(0x7F), FunctionCode::Invalid);
        assert!(FunctionCode::ReadInputRegisters.is_read());
        assert!(!FunctionCode::WriteSingleCoil.is_read());
    }

    #[test]
    fn test_exception_code_mapping() {
        assert_eq!(ExceptionCode::from_u8(2), Some(ExceptionCode::IllegalDataAddress));
        assert_eq!(ExceptionCode::from_u8(9), None);
        assert_eq!(ExceptionCode::description(6), "slave device busy");
        assert_eq!(ExceptionCode::description(0x55), "unknown exception");
    }
}
