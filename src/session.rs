//! The device session: one semantic operation per command pair.
//!
//! For its methods we use the nomenclature that "set" means writing a
//! configuration value and "read" means a live round trip to the device.
//! Every read refreshes the matching field of the advisory cache, but the
//! cache is never consulted to avoid a round trip and a failed read never
//! falls back to a stale cached value.

use crate::channel::Channel;
use crate::command::{ActualKind, Command, SetpointKind};
use crate::error::{ProtocolError, Result};
use crate::errorlog::{self, DeviceErrorLog};
use crate::frame::Frame;
use crate::status::StatusWord;
use crate::transaction::{Exchange, ExchangeConfig};
use crate::value::{ControlMode, ResetAction, State, Value};

/// Last-known device values, one independently refreshable field per
/// quantity. `None` means the field has never been read in this session.
/// No field implies the validity of another.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeviceState {
    pub status: Option<StatusWord>,
    pub setpoint: Option<u16>,
    pub udc_limit: Option<u16>,
    pub idc_limit: Option<u16>,
    pub pdc_limit: Option<u16>,
    pub mode: Option<ControlMode>,
    pub running: Option<bool>,
    pub actual_power: Option<u16>,
    pub actual_voltage: Option<u16>,
    pub actual_current: Option<u16>,
    pub actual_frequency: Option<u16>,
    pub error_log: Option<DeviceErrorLog>,
}

/// A session with one TIG DC generator over an injected byte channel.
pub struct TigDc<C: Channel> {
    exchange: Exchange<C>,
    state: DeviceState,
}

impl<C: Channel> TigDc<C> {
    /// Create a session over the given channel.
    pub fn new(channel: C, config: ExchangeConfig) -> Self {
        Self {
            exchange: Exchange::new(channel, config),
            state: DeviceState::default(),
        }
    }

    /// The advisory last-known cache.
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn channel(&self) -> &C {
        self.exchange.channel()
    }

    /// Release the underlying channel, e.g. to close the port.
    pub fn into_channel(self) -> C {
        self.exchange.into_channel()
    }

    /// Write a setpoint or limit, in permille of full scale.
    pub fn set_setpoint(&mut self, kind: SetpointKind, permille: u16) -> Result<(), C::Error> {
        let request = Frame::write(kind.write_command(), Value::Permille(permille))?;
        self.exchange.transact(request)?;
        Ok(())
    }

    /// Read back a setpoint or limit, in permille of full scale.
    pub fn read_setpoint(&mut self, kind: SetpointKind) -> Result<u16, C::Error> {
        let reply = self.exchange.transact(Frame::read(kind.read_command()))?;
        let permille = reply.value.permille().ok_or(ProtocolError::DomainMismatch)?;
        match kind {
            SetpointKind::Active => self.state.setpoint = Some(permille),
            SetpointKind::UdcLimit => self.state.udc_limit = Some(permille),
            SetpointKind::IdcLimit => self.state.idc_limit = Some(permille),
            SetpointKind::PdcLimit => self.state.pdc_limit = Some(permille),
        }
        Ok(permille)
    }

    /// Select the control mode (UDC, IDC or PDC).
    pub fn set_mode(&mut self, mode: ControlMode) -> Result<(), C::Error> {
        let request = Frame::write(Command::ModeWrite, Value::Mode(mode))?;
        self.exchange.transact(request)?;
        Ok(())
    }

    /// Read the configured control mode.
    pub fn read_mode(&mut self) -> Result<ControlMode, C::Error> {
        let reply = self.exchange.transact(Frame::read(Command::ModeRead))?;
        let mode = reply.value.mode().ok_or(ProtocolError::DomainMismatch)?;
        self.state.mode = Some(mode);
        Ok(mode)
    }

    /// Start or stop the generator output.
    pub fn set_run(&mut self, on: bool) -> Result<(), C::Error> {
        let request = Frame::write(Command::RunWrite, Value::OnOff(State::from(on)))?;
        self.exchange.transact(request)?;
        Ok(())
    }

    /// Read whether the generator output is running.
    pub fn read_run(&mut self) -> Result<bool, C::Error> {
        let reply = self.exchange.transact(Frame::read(Command::RunRead))?;
        let state = reply.value.on_off().ok_or(ProtocolError::DomainMismatch)?;
        let running = bool::from(state);
        self.state.running = Some(running);
        Ok(running)
    }

    /// Acknowledge and clear the device's error state.
    pub fn reset_error(&mut self) -> Result<(), C::Error> {
        let request = Frame::write(Command::ResetError, Value::Reset(ResetAction::Reset))?;
        self.exchange.transact(request)?;
        Ok(())
    }

    /// Read and decode the status word.
    pub fn read_status(&mut self) -> Result<StatusWord, C::Error> {
        let reply = self.exchange.transact(Frame::read(Command::StatusRead))?;
        let status = reply.value.status().ok_or(ProtocolError::DomainMismatch)?;
        self.state.status = Some(status);
        Ok(status)
    }

    /// Read a measured value. Frequency is in tenths of kHz, everything
    /// else in permille of full scale.
    pub fn read_actual(&mut self, kind: ActualKind) -> Result<u16, C::Error> {
        let reply = self.exchange.transact(Frame::read(kind.read_command()))?;
        let value = match kind {
            ActualKind::Frequency => reply
                .value
                .frequency_tenth_khz()
                .ok_or(ProtocolError::DomainMismatch)?,
            _ => reply.value.permille().ok_or(ProtocolError::DomainMismatch)?,
        };
        match kind {
            ActualKind::Power => self.state.actual_power = Some(value),
            ActualKind::Voltage => self.state.actual_voltage = Some(value),
            ActualKind::Current => self.state.actual_current = Some(value),
            ActualKind::Frequency => self.state.actual_frequency = Some(value),
        }
        Ok(value)
    }

    /// Retrieve the whole device error log.
    pub fn read_errors(&mut self) -> Result<DeviceErrorLog, C::Error> {
        let log = errorlog::retrieve(&mut self.exchange)?;
        self.state.error_log = Some(log.clone());
        Ok(log)
    }

    /// Fail with [`Error::DeviceReported`] if the device holds any error
    /// messages, surfacing the first one.
    ///
    /// [`Error::DeviceReported`]: crate::error::Error::DeviceReported
    pub fn verify_fault_free(&mut self) -> Result<(), C::Error> {
        let log = self.read_errors()?;
        match log.first() {
            Some(record) => Err(crate::error::Error::DeviceReported {
                function: record.function,
                error: record.error,
            }),
            None => Ok(()),
        }
    }

    /// Best-effort output shutdown for teardown paths.
    ///
    /// Identical to `set_run(false)` except that it announces itself in the
    /// log; the caller still decides what to do about a failure, since a
    /// broken link cannot be fixed by asking again.
    pub fn emergency_off(&mut self) -> Result<(), C::Error> {
        log::warn!("emergency off requested, stopping generator output");
        self.set_run(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mock_channel::MockChannel;
    use crate::status::{ModeIndication, RemoteSource, SetpointSource};
    use std::time::Duration;

    fn session(channel: MockChannel) -> TigDc<MockChannel> {
        TigDc::new(
            channel,
            ExchangeConfig {
                max_attempts: 2,
                attempt_timeout: Duration::from_millis(5),
            },
        )
    }

    #[test]
    fn set_setpoint_sends_the_documented_frame() {
        let mut channel = MockChannel::new();
        channel.queue_reply(&[0x43, 0x01, 0xF4]);
        let mut tig = session(channel);

        tig.set_setpoint(SetpointKind::Active, 500).unwrap();
        assert_eq!(tig.channel().sent_frames(), [[0x43, 0x01, 0xF4].as_slice()]);
    }

    #[test]
    fn out_of_range_setpoint_fails_without_any_write() {
        let mut tig = session(MockChannel::new());

        let err = tig.set_setpoint(SetpointKind::PdcLimit, 1500).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::OutOfRange {
                value: 1500,
                max: 1000
            })
        ));
        assert!(tig.channel().sent_frames().is_empty());
    }

    #[test]
    fn read_setpoint_refreshes_only_its_own_cache_field() {
        let mut channel = MockChannel::new();
        channel.queue_reply(&[0xC5, 0x02, 0xBC]);
        let mut tig = session(channel);

        let value = tig.read_setpoint(SetpointKind::IdcLimit).unwrap();
        assert_eq!(value, 700);
        assert_eq!(tig.state().idc_limit, Some(700));
        assert_eq!(tig.state().setpoint, None);
        assert_eq!(tig.state().udc_limit, None);
    }

    #[test]
    fn mode_round_trip_through_the_session() {
        let mut channel = MockChannel::new();
        channel.queue_reply(&[0x4D, 0x02]);
        channel.queue_reply(&[0xCD, 0x02]);
        let mut tig = session(channel);

        tig.set_mode(ControlMode::Pdc).unwrap();
        assert_eq!(tig.read_mode().unwrap(), ControlMode::Pdc);
        assert_eq!(tig.state().mode, Some(ControlMode::Pdc));
        assert_eq!(
            tig.channel().sent_frames(),
            [[0x4D, 0x02].as_slice(), [0xCD].as_slice()]
        );
    }

    #[test]
    fn run_control_uses_on_off_bytes() {
        let mut channel = MockChannel::new();
        channel.queue_reply(&[0x4F, 0x01]);
        channel.queue_reply(&[0xCF, 0x01]);
        let mut tig = session(channel);

        tig.set_run(true).unwrap();
        assert!(tig.read_run().unwrap());
        assert_eq!(tig.state().running, Some(true));
        assert_eq!(tig.channel().sent_frames()[0], [0x4F, 0x01]);
    }

    #[test]
    fn reset_error_writes_the_reset_byte() {
        let mut channel = MockChannel::new();
        channel.queue_reply(&[0x51, 0x01]);
        let mut tig = session(channel);

        tig.reset_error().unwrap();
        assert_eq!(tig.channel().sent_frames(), [[0x51, 0x01].as_slice()]);
    }

    #[test]
    fn read_status_decodes_and_caches() {
        let mut channel = MockChannel::new();
        channel.queue_reply(&[0xE1, 0x43, 0x41]);
        let mut tig = session(channel);

        let status = tig.read_status().unwrap();
        assert_eq!(status.setpoint_source, SetpointSource::Internal);
        assert!(status.circuit_ready);
        assert_eq!(status.remote_control, RemoteSource::Rs232);
        assert_eq!(status.control_mode, ModeIndication::Pdc);
        assert!(status.contactor_on);
        assert_eq!(tig.state().status, Some(status));
    }

    #[test]
    fn read_actual_frequency_uses_its_own_domain() {
        let mut channel = MockChannel::new();
        channel.queue_reply(&[0xED, 0x0A, 0x28]);
        let mut tig = session(channel);

        let tenth_khz = tig.read_actual(ActualKind::Frequency).unwrap();
        assert_eq!(tenth_khz, 2600);
        assert_eq!(tig.state().actual_frequency, Some(2600));
    }

    #[test]
    fn failed_read_leaves_the_cache_untouched() {
        let mut channel = MockChannel::new();
        channel.queue_reply(&[0xE6, 0x01, 0x2C]);
        let mut tig = session(channel);

        assert_eq!(tig.read_actual(ActualKind::Power).unwrap(), 300);
        // No reply queued for the second read: it must time out and must
        // not silently answer from the cache.
        let err = tig.read_actual(ActualKind::Power).unwrap_err();
        assert!(matches!(err, Error::Timeout { attempts: 2 }));
        assert_eq!(tig.state().actual_power, Some(300));
    }

    #[test]
    fn verify_fault_free_surfaces_the_first_record() {
        let mut channel = MockChannel::new();
        channel.queue_reply(&[0xE3, 0x01]);
        channel.queue_reply(&[0xE4, 0x07]);
        channel.queue_reply(&[0xE5, 0x21]);
        let mut tig = session(channel);

        let err = tig.verify_fault_free().unwrap_err();
        assert!(matches!(
            err,
            Error::DeviceReported {
                function: 0x07,
                error: 0x21
            }
        ));
    }

    #[test]
    fn verify_fault_free_passes_on_an_empty_log() {
        let mut channel = MockChannel::new();
        channel.queue_reply(&[0xE3, 0x00]);
        let mut tig = session(channel);

        tig.verify_fault_free().unwrap();
        assert_eq!(tig.state().error_log, Some(vec![]));
    }

    #[test]
    fn emergency_off_stops_the_output() {
        let mut channel = MockChannel::new();
        channel.queue_reply(&[0x4F, 0x00]);
        let mut tig = session(channel);

        tig.emergency_off().unwrap();
        assert_eq!(tig.channel().sent_frames(), [[0x4F, 0x00].as_slice()]);
    }
}
