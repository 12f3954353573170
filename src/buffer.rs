//! Register buffer and typed, address-relative views
//!
//! A [`RegisterBuffer`] owns a contiguous run of 16-bit register words
//! together with its start address and register bank. A
//! [`RegisterBufferView`] is the non-owning window the transaction engine
//! fills and the tag layer reads through; both translate protocol addresses
//! to offsets and delegate typed access to the [`bytes`](crate::bytes) codec.

use crate::bytes::{ByteOrder, RegisterType, RegisterValue};
use crate::constants::MAX_MODBUS_REGISTERS;
use crate::error::{ModbusError, ModbusResult};

/// Non-owning typed window onto a run of register words.
pub struct RegisterBufferView<'a> {
    start_address: u16,
    register_type: RegisterType,
    registers: &'a mut [u16],
}

impl<'a> RegisterBufferView<'a> {
    pub fn new(
        start_address: u16,
        register_type: RegisterType,
        registers: &'a mut [u16],
    ) -> Self {
        Self {
            start_address,
            register_type,
            registers,
        }
    }

    pub fn start_address(&self) -> u16 {
        self.start_address
    }

    pub fn register_type(&self) -> RegisterType {
        self.register_type
    }

    pub fn registers(&self) -> &[u16] {
        self.registers
    }

    pub fn registers_mut(&mut self) -> &mut [u16] {
        self.registers
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Read a typed value at a protocol address (protocol byte order).
    pub fn get<T: RegisterValue>(&self, modbus_address: u16) -> ModbusResult<T> {
        self.get_as(modbus_address, ByteOrder::Msb)
    }

    /// Read a typed value with an explicit byte order.
    pub fn get_as<T: RegisterValue>(
        &self,
        modbus_address: u16,
        order: ByteOrder,
    ) -> ModbusResult<T> {
        let offset = translate_offset(self.start_address, self.registers.len(), modbus_address)?;
        T::from_registers(&self.registers[offset..], order)
    }

    /// Write a typed value at a protocol address (protocol byte order).
    pub fn put<T: RegisterValue>(&mut self, modbus_address: u16, value: T) -> ModbusResult<()> {
        self.put_as(modbus_address, value, ByteOrder::Msb)
    }

    /// Write a typed value with an explicit byte order.
    pub fn put_as<T: RegisterValue>(
        &mut self,
        modbus_address: u16,
        value: T,
        order: ByteOrder,
    ) -> ModbusResult<()> {
        let offset = translate_offset(self.start_address, self.registers.len(), modbus_address)?;
        value.to_registers(&mut self.registers[offset..], order)
    }
}

/// Protocol address to buffer offset, bounded by the buffer size and the
/// protocol's 125-register request limit.
fn translate_offset(start_address: u16, len: usize, modbus_address: u16) -> ModbusResult<usize> {
    if modbus_address < start_address {
        return Err(ModbusError::OutOfRange {
            address: modbus_address,
        });
    }
    let offset = modbus_address - start_address;
    if usize::from(offset) > len || offset > MAX_MODBUS_REGISTERS {
        return Err(ModbusError::OutOfRange {
            address: modbus_address,
        });
    }
    Ok(usize::from(offset))
}

/// Owning register run with a start address and register bank.
#[derive(Debug, Clone)]
pub struct RegisterBuffer {
    start_address: u16,
    register_type: RegisterType,
    registers: Vec<u16>,
}

impl RegisterBuffer {
    /// Allocate `count` zeroed registers starting at `start_address`.
    pub fn new(start_address: u16, register_type: RegisterType, count: u16) -> Self {
        Self {
            start_address,
            register_type,
            registers: vec![0; usize::from(count)],
        }
    }

    pub fn start_address(&self) -> u16 {
        self.start_address
    }

    pub fn register_type(&self) -> RegisterType {
        self.register_type
    }

    pub fn registers(&self) -> &[u16] {
        &self.registers
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Non-owning view over the whole buffer.
    pub fn view(&mut self) -> RegisterBufferView<'_> {
        RegisterBufferView::new(self.start_address, self.register_type, &mut self.registers)
    }

    /// Whether `[address, address + length)` lies inside this buffer.
    pub fn contains(&self, register_type: RegisterType, address: u16, length: u16) -> bool {
        register_type == self.register_type
            && address >= self.start_address
            && usize::from(address - self.start_address) + usize::from(length) <= self.len()
    }

    pub fn get<T: RegisterValue>(&self, modbus_address: u16) -> ModbusResult<T> {
        self.get_as(modbus_address, ByteOrder::Msb)
    }

    pub fn get_as<T: RegisterValue>(
        &self,
        modbus_address: u16,
        order: ByteOrder,
    ) -> ModbusResult<T> {
        let offset = translate_offset(self.start_address, self.registers.len(), modbus_address)?;
        T::from_registers(&self.registers[offset..], order)
    }

    pub fn put<T: RegisterValue>(&mut self, modbus_address: u16, value: T) -> ModbusResult<()> {
        self.view().put(modbus_address, value)
    }

    pub fn put_as<T: RegisterValue>(
        &mut self,
        modbus_address: u16,
        value: T,
        order: ByteOrder,
    ) -> ModbusResult<()> {
        self.view().put_as(modbus_address, value, order)
    }
}
