//! Tag descriptors
//!
//! A tag binds an application-level name to a register address range and a
//! scalar decoding recipe. Catalogs of tags are managed by
//! [`TagMaster`](crate::tag_master::TagMaster); this module holds the
//! descriptor record itself and the dynamic value decoding it implies.

use crate::bytes::{ByteOrder, RegisterType, RegisterValue};
use crate::error::ModbusResult;

/// Scalar decoding recipe of a tag's register span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TagValueType {
    U8 = 0x00,
    #[default]
    U16 = 0x01,
    U32 = 0x02,
    Float = 0x03,
    Ascii = 0x04,
    U8Lsb = 0x07,
    U8Msb = 0x08,
    Bool = 0x09,
    ByteArray = 0x0A,
}

/// How a user interface should present a tag's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Representation {
    #[default]
    Numerical,
    Boolean,
    Bitset,
    String,
    StringPassword,
    Time,
    Dropdown,
    Slider,
    Link,
    NumericalHex,
}

/// Access level required to see or edit a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum AccessLevel {
    #[default]
    Default = 0,
    Operator = 1,
    Setup = 10,
    Admin = 11,
    Reserved = 12,
    Service = 13,
    MService = 14,
    Factory = 15,
}

/// Immutable descriptor of one named register reference.
///
/// `key` is the unique identifier across a catalog; `register_number` and
/// `register_length` locate the span inside its register bank.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tag {
    pub name: String,
    pub info: String,
    pub unit: String,
    pub register_type: RegisterType,
    pub register_number: u16,
    pub register_length: u16,
    pub value_type: TagValueType,
    pub representation: Representation,
    pub access_level: AccessLevel,
    pub min_value: f32,
    pub max_value: f32,
    pub options: String,
    pub precision: u8,
    pub is_editable: bool,
    pub default_value: String,
    pub category: String,
    pub key: String,
}

impl Tag {
    /// Minimal descriptor; the remaining metadata keeps its defaults.
    pub fn new(
        key: impl Into<String>,
        register_type: RegisterType,
        register_number: u16,
        register_length: u16,
        value_type: TagValueType,
    ) -> Self {
        Self {
            key: key.into(),
            register_type,
            register_number,
            register_length,
            value_type,
            ..Self::default()
        }
    }

    /// One-past-the-end register number of this tag's span.
    pub fn register_end(&self) -> u16 {
        self.register_number + self.register_length
    }

    /// Decode this tag's value from the raw words of its span.
    pub fn decode_value(&self, registers: &[u16]) -> ModbusResult<TagValue> {
        let registers = &registers[..registers.len().min(usize::from(self.register_length))];
        Ok(match self.value_type {
            TagValueType::U8 | TagValueType::U8Msb => {
                TagValue::U8(u8::from_registers(registers, ByteOrder::Msb)?)
            }
            TagValueType::U8Lsb => TagValue::U8(u8::from_registers(registers, ByteOrder::Lsb)?),
            TagValueType::U16 => TagValue::U16(u16::from_registers(registers, ByteOrder::Msb)?),
            TagValueType::U32 => TagValue::U32(u32::from_registers(registers, ByteOrder::Msb)?),
            TagValueType::Float => TagValue::Float(f32::from_registers(registers, ByteOrder::Msb)?),
            TagValueType::Bool => {
                TagValue::Bool(u16::from_registers(registers, ByteOrder::Msb)? != 0)
            }
            TagValueType::Ascii => {
                TagValue::Ascii(String::from_registers(registers, ByteOrder::Msb)?)
            }
            TagValueType::ByteArray => {
                TagValue::Bytes(Vec::<u8>::from_registers(registers, ByteOrder::Msb)?)
            }
        })
    }
}

/// A decoded tag value.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    U8(u8),
    U16(u16),
    U32(u32),
    Float(f32),
    Bool(bool),
    Ascii(String),
    Bytes(Vec<u8>),
}

impl TagValue {
    /// Uniform numeric form; strings and byte arrays have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::U8(v) => Some(f64::from(*v)),
            Self::U16(v) => Some(f64::from(*v)),
            Self::U32(v) => Some(f64::from(*v)),
            Self::Float(v) => Some(f64::from(*v)),
            Self::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Self::Ascii(_) | Self::Bytes(_) => None,
        }
    }
}
