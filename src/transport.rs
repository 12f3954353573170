//! Stream device abstraction for Modbus transports
//!
//! The transaction engine talks to the outside world through [`StreamDevice`]:
//! a byte stream with timeout-bounded reads and writes and, for serial
//! hardware, a configurable line rate. Two implementations ship with the
//! crate: [`TcpStreamDevice`] over a `tokio` socket and, behind the `rtu`
//! feature, [`SerialStreamDevice`] over `tokio-serial`.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Line rate value meaning "rate control unavailable".
pub const INVALID_BAUDRATE: u32 = 0;

/// Error codes of a stream device operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The operation did not complete within the given timeout.
    #[error("timeout")]
    Timeout,
    /// The device did not become ready for the operation in time.
    #[error("ready timeout")]
    ReadyTimeout,
    /// The underlying driver or socket reported a failure.
    #[error("internal error")]
    InternalError,
    /// The device is occupied by another operation.
    #[error("busy")]
    Busy,
    /// The caller's buffer cannot hold the data.
    #[error("buffer too small")]
    BufferTooSmall,
    /// A parameter was rejected by the device.
    #[error("invalid argument")]
    InvalidArgument,
    /// Anything the device could not classify.
    #[error("unknown error")]
    Unknown,
}

/// A blocking-style byte transport with per-call timeouts.
///
/// Exactly one transaction is in flight on a device at any time; the owning
/// [`Master`](crate::master::Master) serializes access. Suspension happens
/// only inside `read` and `write`.
pub trait StreamDevice: Send {
    /// Read up to `buffer.len()` bytes, waiting at most `timeout_ms`.
    ///
    /// Returns the number of bytes placed at the front of `buffer`.
    fn read(
        &mut self,
        buffer: &mut [u8],
        timeout_ms: u32,
    ) -> impl Future<Output = Result<usize, StreamError>> + Send;

    /// Write the whole of `buffer`, waiting at most `timeout_ms`.
    fn write(
        &mut self,
        buffer: &[u8],
        timeout_ms: u32,
    ) -> impl Future<Output = Result<(), StreamError>> + Send;

    /// Current line rate in bits/s, or [`INVALID_BAUDRATE`] when the device
    /// has no rate control (TCP sockets, pipes).
    fn baudrate(&self) -> u32 {
        INVALID_BAUDRATE
    }

    /// Change the line rate. No-op on devices without rate control.
    fn set_baudrate(&mut self, _baudrate: u32) {}

    /// Drain pending output.
    fn flush(&mut self) -> impl Future<Output = Result<(), StreamError>> + Send;
}

// ============================================================================
// TCP
// ============================================================================

/// [`StreamDevice`] over a connected TCP socket.
pub struct TcpStreamDevice {
    stream: TcpStream,
}

impl TcpStreamDevice {
    /// Connect to a Modbus TCP endpoint, e.g. `"192.168.1.10:502"`.
    pub async fn connect(addr: &str, timeout: Duration) -> Result<Self, StreamError> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| StreamError::Timeout)?
            .map_err(|_| StreamError::InternalError)?;
        debug!("TCP stream device connected to {}", addr);
        Ok(Self { stream })
    }

    /// Wrap an already-connected socket.
    pub fn from_stream(stream: TcpStream) -> Self {
        Self { stream }
    }
}

impl StreamDevice for TcpStreamDevice {
    async fn read(&mut self, buffer: &mut [u8], timeout_ms: u32) -> Result<usize, StreamError> {
        let timeout = Duration::from_millis(u64::from(timeout_ms));
        match tokio::time::timeout(timeout, self.stream.read(buffer)).await {
            Err(_) => Err(StreamError::Timeout),
            Ok(Err(_)) => Err(StreamError::InternalError),
            Ok(Ok(0)) => Err(StreamError::InternalError), // peer closed
            Ok(Ok(n)) => Ok(n),
        }
    }

    async fn write(&mut self, buffer: &[u8], timeout_ms: u32) -> Result<(), StreamError> {
        let timeout = Duration::from_millis(u64::from(timeout_ms));
        match tokio::time::timeout(timeout, self.stream.write_all(buffer)).await {
            Err(_) => Err(StreamError::Timeout),
            Ok(Err(_)) => Err(StreamError::InternalError),
            Ok(Ok(())) => Ok(()),
        }
    }

    async fn flush(&mut self) -> Result<(), StreamError> {
        self.stream
            .flush()
            .await
            .map_err(|_| StreamError::InternalError)
    }
}

// ============================================================================
// Serial (RTU)
// ============================================================================

#[cfg(feature = "rtu")]
pub use serial::SerialStreamDevice;

#[cfg(feature = "rtu")]
mod serial {
    use super::*;
    use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};

    /// Gap after which a started RTU frame is considered complete, in ms.
    ///
    /// Stands in for the 3.5-character silence of the Modbus line discipline;
    /// generous enough for USB-serial adapters that batch bytes.
    const INTER_FRAME_GAP_MS: u64 = 10;

    /// [`StreamDevice`] over a serial port (`tokio-serial`).
    pub struct SerialStreamDevice {
        port: SerialStream,
        baudrate: u32,
    }

    impl SerialStreamDevice {
        /// Open a serial port at the given rate, 8N1.
        pub fn open(path: &str, baudrate: u32) -> Result<Self, StreamError> {
            let port = tokio_serial::new(path, baudrate)
                .data_bits(tokio_serial::DataBits::Eight)
                .stop_bits(tokio_serial::StopBits::One)
                .parity(tokio_serial::Parity::None)
                .open_native_async()
                .map_err(|_| StreamError::InternalError)?;
            debug!("serial stream device opened on {} at {} baud", path, baudrate);
            Ok(Self { port, baudrate })
        }
    }

    impl StreamDevice for SerialStreamDevice {
        async fn read(&mut self, buffer: &mut [u8], timeout_ms: u32) -> Result<usize, StreamError> {
            // First chunk bounded by the caller's timeout, then keep pulling
            // until the line goes quiet or the buffer fills.
            let timeout = Duration::from_millis(u64::from(timeout_ms));
            let mut filled = match tokio::time::timeout(timeout, self.port.read(buffer)).await {
                Err(_) => return Err(StreamError::Timeout),
                Ok(Err(_)) => return Err(StreamError::InternalError),
                Ok(Ok(n)) => n,
            };

            let gap = Duration::from_millis(INTER_FRAME_GAP_MS);
            while filled < buffer.len() {
                match tokio::time::timeout(gap, self.port.read(&mut buffer[filled..])).await {
                    Err(_) => break,
                    Ok(Err(_)) => return Err(StreamError::InternalError),
                    Ok(Ok(0)) => break,
                    Ok(Ok(n)) => filled += n,
                }
            }
            Ok(filled)
        }

        async fn write(&mut self, buffer: &[u8], timeout_ms: u32) -> Result<(), StreamError> {
            let timeout = Duration::from_millis(u64::from(timeout_ms));
            match tokio::time::timeout(timeout, self.port.write_all(buffer)).await {
                Err(_) => Err(StreamError::Timeout),
                Ok(Err(_)) => Err(StreamError::InternalError),
                Ok(Ok(())) => Ok(()),
            }
        }

        fn baudrate(&self) -> u32 {
            self.baudrate
        }

        fn set_baudrate(&mut self, baudrate: u32) {
            if baudrate != self.baudrate && self.port.set_baud_rate(baudrate).is_ok() {
                self.baudrate = baudrate;
            }
        }

        async fn flush(&mut self) -> Result<(), StreamError> {
            self.port
                .flush()
                .await
                .map_err(|_| StreamError::InternalError)
        }
    }
}

// ============================================================================
// Test support
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_device_roundtrip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 16];
            let n = socket.read(&mut buf).await.unwrap();
            socket.write_all(&buf[..n]).await.unwrap();
        });

        let mut device = TcpStreamDevice::connect(&addr.to_string(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(device.baudrate(), INVALID_BAUDRATE);

        device.write(&[0x01, 0x02, 0x03], 100).await.unwrap();
        let mut buf = [0u8; 16];
        let n = device.read(&mut buf, 1000).await.unwrap();
        assert_eq!(&buf[..n], &[0x01, 0x02, 0x03]);
    }

    #[tokio::test]
    async fn test_tcp_device_read_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Accept but never answer.
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let mut device = TcpStreamDevice::connect(&addr.to_string(), Duration::from_secs(1))
            .await
            .unwrap();
        let mut buf = [0u8; 16];
        assert_eq!(device.read(&mut buf, 20).await, Err(StreamError::Timeout));
    }
}
