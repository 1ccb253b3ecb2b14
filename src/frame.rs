//! Serialization of (command, value) pairs into wire frames and back.
//!
//! A frame is the command code byte followed by a fixed-width payload; the
//! width is implied entirely by the command's value domain. The protocol
//! carries no checksum, no length prefix and no start/end delimiters - that
//! is a property of the documented wire format, not an omission, so framing
//! on the receive side relies on the registry alone.

use crate::command::{Command, Direction};
use crate::error::ProtocolError;
use crate::value::Value;

/// One wire frame: a command and the value it carries.
///
/// Read requests carry no value; the code alone requests the read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    pub value: Value,
}

impl Frame {
    /// Build a write request. The value must belong to the command's
    /// declared domain.
    pub fn write(command: Command, value: Value) -> Result<Frame, ProtocolError> {
        debug_assert!(matches!(command.direction(), Direction::Write));
        if value.domain() != command.domain() {
            return Err(ProtocolError::DomainMismatch);
        }
        Ok(Frame { command, value })
    }

    /// Build a read request. Only the command code goes on the wire.
    pub fn read(command: Command) -> Frame {
        debug_assert!(matches!(command.direction(), Direction::Read));
        Frame {
            command,
            value: Value::None,
        }
    }

    /// Serialize this frame. Range validation happens here, before any
    /// byte reaches the channel.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut bytes = Vec::with_capacity(1 + self.value.domain().payload_width());
        bytes.push(self.command.code());
        self.value.encode(&mut bytes)?;
        Ok(bytes)
    }

    /// Parse an inbound frame from the front of `bytes`.
    ///
    /// Returns the frame and the number of bytes it consumed. Inbound
    /// frames (read replies and write echoes) always carry the full
    /// payload width of their domain.
    pub fn decode(bytes: &[u8]) -> Result<(Frame, usize), ProtocolError> {
        let Some(&code) = bytes.first() else {
            return Err(ProtocolError::Truncated {
                expected: 1,
                got: 0,
            });
        };
        let command = Command::lookup(code).ok_or(ProtocolError::UnknownCommand(code))?;
        let width = command.domain().payload_width();
        if bytes.len() < 1 + width {
            return Err(ProtocolError::Truncated {
                expected: 1 + width,
                got: bytes.len(),
            });
        }
        let value = Value::decode(command.domain(), &bytes[1..1 + width])?;
        Ok((Frame { command, value }, 1 + width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{ModeIndication, RemoteSource};
    use crate::value::{ControlMode, State};

    #[test]
    fn write_frame_is_code_plus_big_endian_payload() {
        let frame = Frame::write(Command::SetpointWrite, Value::Permille(500)).unwrap();
        assert_eq!(frame.encode().unwrap(), [0x43, 0x01, 0xF4]);
    }

    #[test]
    fn read_request_is_the_bare_code() {
        assert_eq!(Frame::read(Command::StatusRead).encode().unwrap(), [0xE1]);
        assert_eq!(
            Frame::read(Command::ErrorCountRead).encode().unwrap(),
            [0xE3]
        );
    }

    #[test]
    fn single_byte_write_payloads() {
        let frame = Frame::write(Command::ModeWrite, Value::Mode(ControlMode::Pdc)).unwrap();
        assert_eq!(frame.encode().unwrap(), [0x4D, 0x02]);
        let frame = Frame::write(Command::RunWrite, Value::OnOff(State::On)).unwrap();
        assert_eq!(frame.encode().unwrap(), [0x4F, 0x01]);
    }

    #[test]
    fn out_of_range_write_never_produces_bytes() {
        let frame = Frame::write(Command::PdcLimitWrite, Value::Permille(1500)).unwrap();
        assert_eq!(
            frame.encode().unwrap_err(),
            ProtocolError::OutOfRange {
                value: 1500,
                max: 1000
            }
        );
    }

    #[test]
    fn value_from_wrong_domain_is_rejected_at_construction() {
        let err = Frame::write(Command::ModeWrite, Value::Permille(1)).unwrap_err();
        assert_eq!(err, ProtocolError::DomainMismatch);
    }

    #[test]
    fn decode_reply_round_trip() {
        let (frame, used) = Frame::decode(&[0xC3, 0x02, 0x58]).unwrap();
        assert_eq!(used, 3);
        assert_eq!(frame.command, Command::SetpointRead);
        assert_eq!(frame.value, Value::Permille(600));
    }

    #[test]
    fn decode_status_reply() {
        let (frame, used) = Frame::decode(&[0xE1, 0x40, 0x01]).unwrap();
        assert_eq!(used, 3);
        let status = frame.value.status().unwrap();
        assert!(status.circuit_ready);
        assert!(status.contactor_on);
        assert_eq!(status.remote_control, RemoteSource::Free);
        assert_eq!(status.control_mode, ModeIndication::Udc);
    }

    #[test]
    fn unregistered_code_is_unknown_command() {
        assert_eq!(
            Frame::decode(&[0x42, 0x00, 0x00]).unwrap_err(),
            ProtocolError::UnknownCommand(0x42)
        );
    }

    #[test]
    fn short_buffer_is_truncated() {
        assert_eq!(
            Frame::decode(&[]).unwrap_err(),
            ProtocolError::Truncated {
                expected: 1,
                got: 0
            }
        );
        assert_eq!(
            Frame::decode(&[0xC3, 0x02]).unwrap_err(),
            ProtocolError::Truncated {
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn trailing_bytes_are_left_for_the_next_frame() {
        let (frame, used) = Frame::decode(&[0xCF, 0x01, 0xE3, 0x02]).unwrap();
        assert_eq!(frame.command, Command::RunRead);
        assert_eq!(used, 2);
    }
}
