//! Conversion between engineering values and raw wire payloads.
//!
//! The protocol already transmits its engineering units directly: a permille
//! setpoint of `500` goes on the wire as the 16-bit integer `500`. The codec
//! therefore only validates bounds and maps enum symbol sets; it never
//! rescales. 16-bit payloads are big-endian (data high byte first).

use strum_macros::EnumIter;

use crate::error::ProtocolError;
use crate::status::StatusWord;

/// Upper bound of the permille domain used by setpoints, limits and most
/// actual values.
pub const PERMILLE_MAX: u16 = 1000;

/// Upper bound of the frequency domain, in tenths of kHz.
pub const FREQUENCY_TENTH_KHZ_MAX: u16 = 3000;

/// The control modes of the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
#[repr(u8)]
pub enum ControlMode {
    /// Voltage regulation.
    Udc = 0,
    /// Current regulation.
    Idc = 1,
    /// Power regulation.
    Pdc = 2,
}

impl TryFrom<u8> for ControlMode {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ControlMode::Udc),
            1 => Ok(ControlMode::Idc),
            2 => Ok(ControlMode::Pdc),
            other => Err(ProtocolError::InvalidEnumValue(other)),
        }
    }
}

impl From<ControlMode> for u8 {
    fn from(value: ControlMode) -> Self {
        value as u8
    }
}

/// Used to be less ambiguous about whether something is on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum State {
    /// Disabled.
    Off = 0,
    /// Enabled.
    On = 1,
}

impl From<State> for bool {
    fn from(value: State) -> Self {
        match value {
            State::Off => false,
            State::On => true,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}

/// Payload of the error-reset command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResetAction {
    NoAction = 0,
    Reset = 1,
}

impl TryFrom<u8> for ResetAction {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ResetAction::NoAction),
            1 => Ok(ResetAction::Reset),
            other => Err(ProtocolError::InvalidEnumValue(other)),
        }
    }
}

/// The value domain of a command, which fixes both the payload width and
/// the interpretation of its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDomain {
    /// 0-1000, 16-bit payload.
    Permille,
    /// 0-3000 tenths of kHz, 16-bit payload.
    FrequencyTenthKhz,
    /// Control mode, single byte.
    Mode,
    /// On/off state, single byte.
    OnOff,
    /// Error reset action, single byte.
    Reset,
    /// Unscaled count (error slots, function/error numbers), single byte.
    Count,
    /// Two status bitfield bytes.
    Status,
    /// No payload at all.
    None,
}

impl ValueDomain {
    /// Payload width in bytes of a frame carrying this domain.
    pub const fn payload_width(self) -> usize {
        match self {
            ValueDomain::Permille | ValueDomain::FrequencyTenthKhz | ValueDomain::Status => 2,
            ValueDomain::Mode | ValueDomain::OnOff | ValueDomain::Reset | ValueDomain::Count => 1,
            ValueDomain::None => 0,
        }
    }
}

/// An engineering value, tagged with its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Permille(u16),
    FrequencyTenthKhz(u16),
    Mode(ControlMode),
    OnOff(State),
    Reset(ResetAction),
    Count(u8),
    Status(StatusWord),
    None,
}

impl Value {
    /// The domain this value belongs to.
    pub const fn domain(&self) -> ValueDomain {
        match self {
            Value::Permille(_) => ValueDomain::Permille,
            Value::FrequencyTenthKhz(_) => ValueDomain::FrequencyTenthKhz,
            Value::Mode(_) => ValueDomain::Mode,
            Value::OnOff(_) => ValueDomain::OnOff,
            Value::Reset(_) => ValueDomain::Reset,
            Value::Count(_) => ValueDomain::Count,
            Value::Status(_) => ValueDomain::Status,
            Value::None => ValueDomain::None,
        }
    }

    /// Append the wire payload for this value to `out`.
    ///
    /// Out-of-range values are rejected here, before any transmission.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
        match *self {
            Value::Permille(v) => {
                bounded(v, PERMILLE_MAX)?;
                out.extend_from_slice(&v.to_be_bytes());
            }
            Value::FrequencyTenthKhz(v) => {
                bounded(v, FREQUENCY_TENTH_KHZ_MAX)?;
                out.extend_from_slice(&v.to_be_bytes());
            }
            Value::Mode(mode) => out.push(mode as u8),
            Value::OnOff(state) => out.push(state as u8),
            Value::Reset(action) => out.push(action as u8),
            Value::Count(n) => out.push(n),
            Value::Status(status) => out.extend_from_slice(&status.to_bytes()),
            Value::None => {}
        }
        Ok(())
    }

    /// Decode a raw payload in the given domain.
    ///
    /// A device returning out-of-spec numeric data is a protocol anomaly,
    /// not something to clamp silently.
    pub fn decode(domain: ValueDomain, payload: &[u8]) -> Result<Value, ProtocolError> {
        let width = domain.payload_width();
        if payload.len() < width {
            return Err(ProtocolError::Truncated {
                expected: width,
                got: payload.len(),
            });
        }
        let value = match domain {
            ValueDomain::Permille => {
                let v = u16::from_be_bytes([payload[0], payload[1]]);
                bounded(v, PERMILLE_MAX)?;
                Value::Permille(v)
            }
            ValueDomain::FrequencyTenthKhz => {
                let v = u16::from_be_bytes([payload[0], payload[1]]);
                bounded(v, FREQUENCY_TENTH_KHZ_MAX)?;
                Value::FrequencyTenthKhz(v)
            }
            ValueDomain::Mode => Value::Mode(ControlMode::try_from(payload[0])?),
            ValueDomain::OnOff => match payload[0] {
                0 => Value::OnOff(State::Off),
                1 => Value::OnOff(State::On),
                other => return Err(ProtocolError::InvalidEnumValue(other)),
            },
            ValueDomain::Reset => Value::Reset(ResetAction::try_from(payload[0])?),
            ValueDomain::Count => Value::Count(payload[0]),
            ValueDomain::Status => Value::Status(StatusWord::from_bytes(payload)?),
            ValueDomain::None => Value::None,
        };
        Ok(value)
    }

    pub fn permille(&self) -> Option<u16> {
        match *self {
            Value::Permille(v) => Some(v),
            _ => None,
        }
    }

    pub fn frequency_tenth_khz(&self) -> Option<u16> {
        match *self {
            Value::FrequencyTenthKhz(v) => Some(v),
            _ => None,
        }
    }

    pub fn mode(&self) -> Option<ControlMode> {
        match *self {
            Value::Mode(mode) => Some(mode),
            _ => None,
        }
    }

    pub fn on_off(&self) -> Option<State> {
        match *self {
            Value::OnOff(state) => Some(state),
            _ => None,
        }
    }

    pub fn count(&self) -> Option<u8> {
        match *self {
            Value::Count(n) => Some(n),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusWord> {
        match *self {
            Value::Status(status) => Some(status),
            _ => None,
        }
    }
}

fn bounded(value: u16, max: u16) -> Result<(), ProtocolError> {
    if value > max {
        return Err(ProtocolError::OutOfRange { value, max });
    }
    Ok(())
}
