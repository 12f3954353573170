//! Core error types and result handling
//!
//! Failures are typed, not numeric: the peer's exception code, the structural
//! cause of a rejected frame, and the transport error code each keep their
//! own variant. Nothing is recovered internally; the engine surfaces every
//! failure and leaves retry policy to the caller.

use thiserror::Error;

use crate::frame::{ExceptionCode, ValidationStatus};
use crate::transport::StreamError;

/// Result type used throughout the crate.
pub type ModbusResult<T> = Result<T, ModbusError>;

/// All failures the driver can surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModbusError {
    /// The slave answered with an exception response.
    #[error("modbus exception from function {function:#04x}: {}", ExceptionCode::description(*code))]
    Exception {
        /// Function code of the rejected operation (exception bit masked off).
        function: u8,
        /// Raw exception code byte as declared by the peer.
        code: u8,
    },

    /// The response failed structural validation.
    #[error("invalid frame: {status}")]
    InvalidFrame { status: ValidationStatus },

    /// The stream device reported a transport failure.
    #[error("stream device failure: {error}")]
    StreamDevice {
        #[from]
        error: StreamError,
    },

    /// No response arrived within the computed deadline.
    #[error("response timeout")]
    ResponseTimeout,

    /// A caller-supplied argument was rejected before touching the wire.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A register span is too small for the requested value conversion.
    #[error("register span too small for requested value")]
    BufferTooSmall,

    /// A register address falls outside the buffer window.
    #[error("address {address} outside buffer range")]
    OutOfRange { address: u16 },
}

impl ModbusError {
    /// Shorthand for an argument rejection.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// The typed exception code, when this is a known slave exception.
    pub fn exception_code(&self) -> Option<ExceptionCode> {
        match self {
            Self::Exception { code, .. } => ExceptionCode::from_u8(*code),
            _ => None,
        }
    }

    /// True when the failure was a timeout at either layer.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ResponseTimeout
                | Self::StreamDevice {
                    error: StreamError::Timeout
                }
        )
    }
}
