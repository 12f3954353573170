//! Master transaction engine
//!
//! A [`Master`] is bound to one stream device and one transport mode (RTU or
//! TCP) and drives strictly serialized request/response round trips: one
//! write, one read, both bounded by timeouts derived from the line rate and
//! the frame lengths. It also maintains the per-slave discovered-baud table
//! and probes slaves whose rate is unknown.

use std::collections::HashMap;

use tracing::debug;

use crate::buffer::RegisterBufferView;
use crate::bytes::RegisterType;
use crate::constants::{
    BAUD_CANDIDATES, CRC_SIZE, DEFAULT_DEVICE_RESPONSE_TIME_MS, FALLBACK_PROBE_BAUD,
    MAX_MODBUS_REGISTERS, SLAVE_ID_MAX, SLAVE_ID_MIN,
};
use crate::error::{ModbusError, ModbusResult};
use crate::frame::{Frame, FunctionCode, ValidationStatus};
use crate::transport::{StreamDevice, StreamError, INVALID_BAUDRATE};

/// Function code for a read or write against a register bank.
///
/// Writes go out as the bulk variants; the two read-only banks reject
/// writes before anything touches the wire.
pub fn get_function_code(is_read: bool, register_type: RegisterType) -> ModbusResult<FunctionCode> {
    match register_type {
        RegisterType::Coil => Ok(if is_read {
            FunctionCode::ReadCoils
        } else {
            FunctionCode::WriteMultipleCoils
        }),
        RegisterType::DiscreteInput => {
            if is_read {
                Ok(FunctionCode::ReadDiscreteInputs)
            } else {
                Err(ModbusError::invalid_argument(
                    "discrete inputs are read-only",
                ))
            }
        }
        RegisterType::AnalogInput => {
            if is_read {
                Ok(FunctionCode::ReadInputRegisters)
            } else {
                Err(ModbusError::invalid_argument("input registers are read-only"))
            }
        }
        RegisterType::Holding => Ok(if is_read {
            FunctionCode::ReadHoldingRegisters
        } else {
            FunctionCode::WriteMultipleRegisters
        }),
    }
}

/// Single-in-flight Modbus master over a [`StreamDevice`].
pub struct Master<D: StreamDevice> {
    device: D,
    is_tcp: bool,
    /// Additive slack on the computed response timeout, in milliseconds.
    pub device_response_time_ms: u32,
    baudrates: HashMap<u8, u32>,
    next_transaction_id: u16,
}

impl<D: StreamDevice> Master<D> {
    fn new(device: D, is_tcp: bool) -> Self {
        Self {
            device,
            is_tcp,
            device_response_time_ms: DEFAULT_DEVICE_RESPONSE_TIME_MS,
            baudrates: HashMap::new(),
            next_transaction_id: 0,
        }
    }

    /// Master speaking the TCP-framed encoding.
    pub fn tcp(device: D) -> Self {
        Self::new(device, true)
    }

    /// Master speaking the RTU encoding.
    pub fn rtu(device: D) -> Self {
        Self::new(device, false)
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Per-slave line rates discovered so far.
    pub fn devices_baudrates(&self) -> &HashMap<u8, u32> {
        &self.baudrates
    }

    /// Seed the discovered-baud table for a slave whose rate is known a
    /// priori, skipping the probe on its first transaction.
    pub fn set_slave_baudrate(&mut self, slave_id: u8, baudrate: u32) {
        self.baudrates.insert(slave_id, baudrate);
    }

    fn next_transaction_id(&mut self) -> u16 {
        self.next_transaction_id = self.next_transaction_id.wrapping_add(1);
        self.next_transaction_id
    }

    // ------------------------------------------------------------------
    // Public operations
    // ------------------------------------------------------------------

    /// Read `quantity` registers of `register_type` starting at
    /// `start_address`. Bit banks decode to one word per bit
    /// (`0xFF00`/`0x0000`).
    pub async fn read(
        &mut self,
        slave_id: u8,
        register_type: RegisterType,
        start_address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<u16>> {
        if quantity == 0 || quantity > MAX_MODBUS_REGISTERS {
            return Err(ModbusError::invalid_argument(format!(
                "read quantity {} outside 1..={}",
                quantity, MAX_MODBUS_REGISTERS
            )));
        }
        let function_code = get_function_code(true, register_type)?;
        let transaction_id = self.next_transaction_id();
        let mut frame = Frame::build(
            true,
            slave_id,
            function_code,
            start_address,
            quantity,
            &[],
            transaction_id,
        );
        self.send_receive(&mut frame).await?;
        if frame.is_exception() {
            return Err(ModbusError::Exception {
                function: frame.function_code() as u8,
                code: frame.exception_code(),
            });
        }
        Ok(frame.registers_values())
    }

    /// Read into a register view; quantity and addressing come from the view.
    pub async fn read_into(
        &mut self,
        slave_id: u8,
        view: &mut RegisterBufferView<'_>,
    ) -> ModbusResult<()> {
        let values = self
            .read(
                slave_id,
                view.register_type(),
                view.start_address(),
                view.len() as u16,
            )
            .await?;
        let n = values.len().min(view.len());
        view.registers_mut()[..n].copy_from_slice(&values[..n]);
        Ok(())
    }

    /// Write `values` to `register_type` starting at `start_address`.
    pub async fn write(
        &mut self,
        slave_id: u8,
        register_type: RegisterType,
        start_address: u16,
        values: &[u16],
    ) -> ModbusResult<()> {
        if values.is_empty() || values.len() > usize::from(MAX_MODBUS_REGISTERS) {
            return Err(ModbusError::invalid_argument(format!(
                "write count {} outside 1..={}",
                values.len(),
                MAX_MODBUS_REGISTERS
            )));
        }
        let function_code = get_function_code(false, register_type)?;
        let transaction_id = self.next_transaction_id();
        let mut frame = Frame::build(
            true,
            slave_id,
            function_code,
            start_address,
            values.len() as u16,
            values,
            transaction_id,
        );
        self.send_receive(&mut frame).await?;
        if frame.is_exception() {
            return Err(ModbusError::Exception {
                function: frame.function_code() as u8,
                code: frame.exception_code(),
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Frame transfer
    // ------------------------------------------------------------------

    /// Write the frame's wire encoding to the device.
    pub async fn send_frame(&mut self, frame: &mut Frame, timeout_ms: u32) -> ModbusResult<()> {
        let bytes = if self.is_tcp {
            frame.tcp_frame()
        } else {
            frame.rtu_frame()
        };
        self.device
            .write(bytes, timeout_ms)
            .await
            .map_err(|error| ModbusError::StreamDevice { error })
    }

    /// Read a response into the frame's buffer. The frame is flagged as a
    /// response; in RTU mode the MBAP length is back-filled from the
    /// decoded layout so the length accessors agree with the wire.
    pub async fn receive_frame(&mut self, frame: &mut Frame, timeout_ms: u32) -> ModbusResult<()> {
        frame.set_is_request(false);
        let result = if self.is_tcp {
            self.device.read(frame.buffer_mut(), timeout_ms).await
        } else {
            self.device.read(frame.rtu_buffer_mut(), timeout_ms).await
        };
        match result {
            Err(StreamError::Timeout) => Err(ModbusError::ResponseTimeout),
            Err(error) => Err(ModbusError::StreamDevice { error }),
            Ok(_) => {
                if !self.is_tcp {
                    let without_crc = frame.calculate_rtu_length().saturating_sub(CRC_SIZE);
                    frame.set_mbap_length(without_crc as u16);
                }
                Ok(())
            }
        }
    }

    /// One full transaction: resolve the slave's line rate (probing if
    /// needed), send the request, await and validate the response in place.
    pub async fn send_receive(&mut self, frame: &mut Frame) -> ModbusResult<()> {
        let slave_id = frame.slave_id();
        let baud = match self.baudrates.get(&slave_id).copied() {
            Some(baud) => baud,
            None => {
                let baud = self.detect_baud(slave_id, &BAUD_CANDIDATES).await;
                if baud == INVALID_BAUDRATE {
                    return Err(ModbusError::StreamDevice {
                        error: StreamError::Timeout,
                    });
                }
                baud
            }
        };
        self.device.set_baudrate(baud);

        let send_timeout = frame.frame_transmission_time_ms(baud) * 2;
        let receive_timeout = self.response_timeout(frame, baud);
        let transaction_id = frame.transaction_id();
        debug!(slave_id, baud, "transaction: {}", frame);

        self.send_frame(frame, send_timeout).await?;
        self.receive_frame(frame, receive_timeout).await?;

        let status = if self.is_tcp {
            let status = frame.validate_tcp();
            if status == ValidationStatus::Ok && frame.transaction_id() != transaction_id {
                ValidationStatus::TransactionId
            } else {
                status
            }
        } else {
            frame.validate_rtu()
        };
        if status != ValidationStatus::Ok {
            return Err(ModbusError::InvalidFrame { status });
        }
        debug!(slave_id, "response: {}", frame);
        Ok(())
    }

    /// Response deadline for a request: expected response wire time plus the
    /// configured device slack.
    pub fn response_timeout(&self, frame: &Frame, baud: u32) -> u32 {
        frame.response_transmission_time_ms(baud) + self.device_response_time_ms
    }

    // ------------------------------------------------------------------
    // Baud probing
    // ------------------------------------------------------------------

    /// Probe `slave_id` with a fixed ReadInputRegisters(0, 1) request at
    /// each candidate rate until a response validates.
    ///
    /// Devices without rate control get a single probe at
    /// [`FALLBACK_PROBE_BAUD`]; on success the first candidate is recorded
    /// as the discovered rate (callers on such devices pass a one-element
    /// candidate list). Returns the working rate, or [`INVALID_BAUDRATE`]
    /// after exhausting the candidates. The discovered-baud table is
    /// updated either way.
    pub async fn detect_baud(&mut self, slave_id: u8, candidates: &[u32]) -> u32 {
        let mut probe = Frame::build(
            true,
            slave_id,
            FunctionCode::ReadInputRegisters,
            0,
            1,
            &[],
            0,
        );
        let mut receive = Frame::new();
        let mut working_baud = INVALID_BAUDRATE;

        let original_baud = self.device.baudrate();
        if original_baud != INVALID_BAUDRATE {
            for &baud in candidates {
                self.device.set_baudrate(baud);

                let send_timeout = probe.frame_transmission_time_ms(baud) * 2;
                let receive_timeout = self.response_timeout(&probe, baud);
                let request = probe.rtu_frame();
                if self.device.write(request, send_timeout).await.is_err() {
                    break;
                }

                receive.set_is_request(false);
                match self
                    .device
                    .read(receive.rtu_buffer_mut(), receive_timeout)
                    .await
                {
                    Err(StreamError::Timeout) => continue,
                    Err(_) => break,
                    Ok(_) => {}
                }

                if receive.validate_rtu() == ValidationStatus::Ok {
                    working_baud = baud;
                    break;
                }
            }
            self.device.set_baudrate(original_baud);
        } else {
            // Rate control unavailable: one probe at the fallback rate.
            let baud = FALLBACK_PROBE_BAUD;
            let send_timeout = probe.frame_transmission_time_ms(baud) * 2;
            let receive_timeout = self.response_timeout(&probe, baud);
            let request = probe.rtu_frame();
            let probed = match self.device.write(request, send_timeout).await {
                Err(_) => false,
                Ok(()) => self
                    .device
                    .read(receive.rtu_buffer_mut(), receive_timeout)
                    .await
                    .is_ok(),
            };
            if probed && receive.validate_rtu() == ValidationStatus::Ok {
                working_baud = candidates.first().copied().unwrap_or(FALLBACK_PROBE_BAUD);
            }
        }

        if working_baud != INVALID_BAUDRATE {
            debug!(slave_id, working_baud, "slave responded");
            self.baudrates.insert(slave_id, working_baud);
        } else {
            self.baudrates.remove(&slave_id);
        }
        working_baud
    }

    /// Probe every bus address (1..=247) and return the discovered map.
    ///
    /// `timeout_ms` replaces the configured device slack for the duration
    /// of the scan so a full sweep stays bounded.
    pub async fn scan_for_devices(
        &mut self,
        candidates: &[u32],
        timeout_ms: u16,
    ) -> HashMap<u8, u32> {
        let saved_response_time = self.device_response_time_ms;
        self.device_response_time_ms = u32::from(timeout_ms);

        for slave_id in SLAVE_ID_MIN..=SLAVE_ID_MAX {
            let baud = self.detect_baud(slave_id, candidates).await;
            if baud != INVALID_BAUDRATE {
                debug!(slave_id, baud, "device found");
            }
        }

        self.device_response_time_ms = saved_response_time;
        self.baudrates.clone()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockStreamDevice;

    fn rtu_response(frame: &mut Frame) -> Vec<u8> {
        frame.rtu_frame().to_vec()
    }

    fn seeded_rtu_master(mock: MockStreamDevice) -> Master<MockStreamDevice> {
        let mut master = Master::rtu(mock);
        master.set_slave_baudrate(1, 9600);
        master
    }

    #[tokio::test]
    async fn test_read_holding_registers_roundtrip() {
        let mut mock = MockStreamDevice::new();
        let mut response = Frame::build(
            false,
            1,
            FunctionCode::ReadHoldingRegisters,
            0,
            2,
            &[0x0006, 0x0005],
            0,
        );
        mock.push_response(rtu_response(&mut response));

        let mut master = seeded_rtu_master(mock);
        let values = master.read(1, RegisterType::Holding, 0, 2).await.unwrap();
        assert_eq!(values, vec![0x0006, 0x0005]);

        // Exactly one write went out, and it is the canonical FC03 request.
        let written = &master.device().written;
        assert_eq!(written.len(), 1);
        assert_eq!(
            written[0],
            vec![0x01, 0x03, 0x00, 0x00, 0x00, 0x02, 0xC4, 0x0B]
        );
    }

    #[tokio::test]
    async fn test_read_coils_decodes_bits() {
        let mut mock = MockStreamDevice::new();
        let mut response = Frame::from_rtu_bytes(&[0x01, 0x01, 0x01, 0x05, 0x91, 0x8B], false);
        assert_eq!(response.validate_rtu(), ValidationStatus::Ok);
        mock.push_response(rtu_response(&mut response));

        let mut master = seeded_rtu_master(mock);
        let values = master.read(1, RegisterType::Coil, 0, 3).await.unwrap();
        // 0x05 = 0b101, LSB first, as coil words.
        assert_eq!(&values[..3], &[0xFF00, 0x0000, 0xFF00]);
    }

    #[tokio::test]
    async fn test_read_exception_response() {
        let mut mock = MockStreamDevice::new();
        let mut response = Frame::build_exception_response(
            1,
            FunctionCode::ReadHoldingRegisters,
            crate::frame::ExceptionCode::IllegalDataAddress,
            0,
        );
        mock.push_response(rtu_response(&mut response));

        let mut master = seeded_rtu_master(mock);
        let err = master
            .read(1, RegisterType::Holding, 0, 2)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ModbusError::Exception {
                function: 0x03,
                code: 0x02
            }
        );
    }

    #[tokio::test]
    async fn test_write_multiple_registers_roundtrip() {
        let mut mock = MockStreamDevice::new();
        let mut response = Frame::build(
            false,
            1,
            FunctionCode::WriteMultipleRegisters,
            0x0001,
            2,
            &[],
            0,
        );
        mock.push_response(rtu_response(&mut response));

        let mut master = seeded_rtu_master(mock);
        master
            .write(1, RegisterType::Holding, 0x0001, &[0x000A, 0x0102])
            .await
            .unwrap();

        let written = &master.device().written;
        assert_eq!(
            written[0][..11],
            [0x01, 0x10, 0x00, 0x01, 0x00, 0x02, 0x04, 0x00, 0x0A, 0x01, 0x02]
        );
    }

    #[tokio::test]
    async fn test_write_rejects_read_only_banks() {
        let mut master = seeded_rtu_master(MockStreamDevice::new());
        for bank in [RegisterType::DiscreteInput, RegisterType::AnalogInput] {
            let err = master.write(1, bank, 0, &[1]).await.unwrap_err();
            assert!(matches!(err, ModbusError::InvalidArgument { .. }));
        }
        // Nothing reached the wire.
        assert!(master.device().written.is_empty());
    }

    #[tokio::test]
    async fn test_read_rejects_bad_quantity() {
        let mut master = seeded_rtu_master(MockStreamDevice::new());
        assert!(matches!(
            master.read(1, RegisterType::Holding, 0, 0).await,
            Err(ModbusError::InvalidArgument { .. })
        ));
        assert!(matches!(
            master.read(1, RegisterType::Holding, 0, 126).await,
            Err(ModbusError::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn test_corrupt_crc_is_invalid_frame() {
        let mut mock = MockStreamDevice::new();
        let mut response = Frame::build(
            false,
            1,
            FunctionCode::ReadHoldingRegisters,
            0,
            1,
            &[0x0001],
            0,
        );
        let mut bytes = rtu_response(&mut response);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        mock.push_response(bytes);

        let mut master = seeded_rtu_master(mock);
        let err = master.read(1, RegisterType::Holding, 0, 1).await.unwrap_err();
        assert_eq!(
            err,
            ModbusError::InvalidFrame {
                status: ValidationStatus::InvalidCrc
            }
        );
    }

    #[tokio::test]
    async fn test_silent_slave_is_response_timeout() {
        let mut master = seeded_rtu_master(MockStreamDevice::new());
        let err = master.read(1, RegisterType::Holding, 0, 1).await.unwrap_err();
        assert_eq!(err, ModbusError::ResponseTimeout);
    }

    #[tokio::test]
    async fn test_device_failure_is_surfaced() {
        let mut mock = MockStreamDevice::new();
        mock.push_error(StreamError::Busy);
        let mut master = seeded_rtu_master(mock);
        let err = master.read(1, RegisterType::Holding, 0, 1).await.unwrap_err();
        assert_eq!(
            err,
            ModbusError::StreamDevice {
                error: StreamError::Busy
            }
        );
    }

    #[tokio::test]
    async fn test_read_into_view() {
        let mut mock = MockStreamDevice::new();
        let mut response = Frame::build(
            false,
            1,
            FunctionCode::ReadInputRegisters,
            0,
            2,
            &[0x1111, 0x2222],
            0,
        );
        mock.push_response(rtu_response(&mut response));

        let mut master = seeded_rtu_master(mock);
        let mut buffer = crate::buffer::RegisterBuffer::new(10, RegisterType::AnalogInput, 2);
        master.read_into(1, &mut buffer.view()).await.unwrap();
        assert_eq!(buffer.registers(), &[0x1111, 0x2222]);
    }

    #[tokio::test]
    async fn test_detect_baud_walks_candidates() {
        let mut mock = MockStreamDevice::new();
        mock.respond_only_at(38400);
        let mut probe_response =
            Frame::build(false, 5, FunctionCode::ReadInputRegisters, 0, 1, &[0x1234], 0);
        mock.push_response(rtu_response(&mut probe_response));

        let mut master = Master::rtu(mock);
        let baud = master.detect_baud(5, &BAUD_CANDIDATES).await;
        assert_eq!(baud, 38400);
        assert_eq!(master.devices_baudrates().get(&5), Some(&38400));
    }

    #[tokio::test]
    async fn test_detect_baud_failure_clears_table_entry() {
        let mut master = Master::rtu(MockStreamDevice::new());
        master.set_slave_baudrate(5, 9600);
        let baud = master.detect_baud(5, &BAUD_CANDIDATES).await;
        assert_eq!(baud, INVALID_BAUDRATE);
        assert!(!master.devices_baudrates().contains_key(&5));
    }

    #[tokio::test]
    async fn test_detect_baud_without_rate_control() {
        let mut mock = MockStreamDevice::without_rate_control();
        let mut probe_response =
            Frame::build(false, 2, FunctionCode::ReadInputRegisters, 0, 1, &[7], 0);
        mock.push_response(rtu_response(&mut probe_response));

        let mut master = Master::rtu(mock);
        // Caller contract: a single known rate.
        let baud = master.detect_baud(2, &[115200]).await;
        assert_eq!(baud, 115200);
        assert_eq!(master.devices_baudrates().get(&2), Some(&115200));
    }

    #[tokio::test]
    async fn test_detect_baud_without_rate_control_empty_candidates() {
        let mut mock = MockStreamDevice::without_rate_control();
        let mut probe_response =
            Frame::build(false, 2, FunctionCode::ReadInputRegisters, 0, 1, &[7], 0);
        mock.push_response(rtu_response(&mut probe_response));

        let mut master = Master::rtu(mock);
        assert_eq!(master.detect_baud(2, &[]).await, FALLBACK_PROBE_BAUD);
    }

    #[tokio::test]
    async fn test_unknown_slave_probes_before_transaction() {
        let mut mock = MockStreamDevice::new();
        // Probe answer at the first candidate, then the actual read answer.
        let mut probe_response =
            Frame::build(false, 9, FunctionCode::ReadInputRegisters, 0, 1, &[0], 0);
        mock.push_response(rtu_response(&mut probe_response));
        let mut response =
            Frame::build(false, 9, FunctionCode::ReadHoldingRegisters, 0, 1, &[42], 0);
        mock.push_response(rtu_response(&mut response));

        let mut master = Master::rtu(mock);
        let values = master.read(9, RegisterType::Holding, 0, 1).await.unwrap();
        assert_eq!(values, vec![42]);
        assert_eq!(master.devices_baudrates().get(&9), Some(&9600));
        // Probe request plus the read request.
        assert_eq!(master.device().written.len(), 2);
    }

    #[tokio::test]
    async fn test_scan_for_devices_restores_response_slack() {
        let mut mock = MockStreamDevice::new();
        let mut probe_response =
            Frame::build(false, 1, FunctionCode::ReadInputRegisters, 0, 1, &[0], 0);
        mock.push_response(rtu_response(&mut probe_response));

        let mut master = Master::rtu(mock);
        master.device_response_time_ms = 77;
        let found = master.scan_for_devices(&[9600], 5).await;
        // The single scripted answer lands on the first probed address.
        assert_eq!(found.len(), 1);
        assert_eq!(found.get(&1), Some(&9600));
        assert_eq!(master.device_response_time_ms, 77);
    }

    #[tokio::test]
    async fn test_tcp_transaction_roundtrip() {
        let mut mock = MockStreamDevice::new();
        // First transaction id handed out by the master is 1.
        let mut response = Frame::build(
            false,
            1,
            FunctionCode::ReadHoldingRegisters,
            0,
            2,
            &[0x0006, 0x0005],
            1,
        );
        mock.push_response(response.tcp_frame().to_vec());

        let mut master = Master::tcp(mock);
        master.set_slave_baudrate(1, 9600);
        let values = master.read(1, RegisterType::Holding, 0, 2).await.unwrap();
        assert_eq!(values, vec![0x0006, 0x0005]);

        // The request went out TCP-framed: tid 1, protocol id 0, length 6.
        let written = &master.device().written;
        assert_eq!(
            written[0],
            vec![0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x00, 0x00, 0x02]
        );
    }

    #[tokio::test]
    async fn test_tcp_transaction_id_mismatch_rejected() {
        let mut mock = MockStreamDevice::new();
        let mut response = Frame::build(
            false,
            1,
            FunctionCode::ReadHoldingRegisters,
            0,
            1,
            &[9],
            0x5555,
        );
        mock.push_response(response.tcp_frame().to_vec());

        let mut master = Master::tcp(mock);
        master.set_slave_baudrate(1, 9600);
        let err = master.read(1, RegisterType::Holding, 0, 1).await.unwrap_err();
        assert_eq!(
            err,
            ModbusError::InvalidFrame {
                status: ValidationStatus::TransactionId
            }
        );
    }

    #[test]
    fn test_get_function_code_mapping() {
        assert_eq!(
            get_function_code(true, RegisterType::Coil).unwrap(),
            FunctionCode::ReadCoils
        );
        assert_eq!(
            get_function_code(false, RegisterType::Coil).unwrap(),
            FunctionCode::WriteMultipleCoils
        );
        assert_eq!(
            get_function_code(true, RegisterType::AnalogInput).unwrap(),
            FunctionCode::ReadInputRegisters
        );
        assert_eq!(
            get_function_code(true, RegisterType::Holding).unwrap(),
            FunctionCode::ReadHoldingRegisters
        );
        assert!(get_function_code(false, RegisterType::DiscreteInput).is_err());
        assert!(get_function_code(false, RegisterType::AnalogInput).is_err());
    }
}
