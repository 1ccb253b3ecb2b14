//! Decoding of the two-byte status word.
//!
//! The status word is a pure bitfield snapshot, recomputed on every read.
//! All fields decode independently; undefined bit patterns in the
//! multi-bit fields decode to an explicit `Reserved` variant instead of
//! panicking or silently mapping to a documented variant.

use crate::error::ProtocolError;

/// Which side supplies the setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetpointSource {
    /// Bit clear: the device's internal setpoint is active.
    Internal,
    /// Bit set: the setpoint comes from an external source.
    External,
}

/// Which interface currently holds command authority over the device.
///
/// Three-bit field; `0b110` and `0b111` are undefined by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteSource {
    Free,
    Internal,
    /// Analog (A/D) interface.
    AnalogInterface,
    Rs232,
    Rs485,
    Profibus,
    /// A bit pattern the protocol does not define.
    Reserved(u8),
}

impl RemoteSource {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => RemoteSource::Free,
            1 => RemoteSource::Internal,
            2 => RemoteSource::AnalogInterface,
            3 => RemoteSource::Rs232,
            4 => RemoteSource::Rs485,
            5 => RemoteSource::Profibus,
            other => RemoteSource::Reserved(other),
        }
    }

    const fn bits(self) -> u8 {
        match self {
            RemoteSource::Free => 0,
            RemoteSource::Internal => 1,
            RemoteSource::AnalogInterface => 2,
            RemoteSource::Rs232 => 3,
            RemoteSource::Rs485 => 4,
            RemoteSource::Profibus => 5,
            RemoteSource::Reserved(bits) => bits,
        }
    }
}

/// The control mode reported by the status word.
///
/// Three-bit field; only three patterns are documented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeIndication {
    Udc,
    Idc,
    Pdc,
    /// A bit pattern the protocol does not define.
    Reserved(u8),
}

impl ModeIndication {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => ModeIndication::Udc,
            1 => ModeIndication::Idc,
            2 => ModeIndication::Pdc,
            other => ModeIndication::Reserved(other),
        }
    }

    const fn bits(self) -> u8 {
        match self {
            ModeIndication::Udc => 0,
            ModeIndication::Idc => 1,
            ModeIndication::Pdc => 2,
            ModeIndication::Reserved(bits) => bits,
        }
    }
}

/// The decoded status word.
///
/// Boolean fields keep the literal polarity of the protocol table:
/// `sampling_off` is bit 1 of the low byte with `1` meaning off, and
/// `contactor_on` is bit 0 with `1` meaning on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusWord {
    /// High byte bit 7.
    pub setpoint_source: SetpointSource,
    /// High byte bit 6.
    pub circuit_ready: bool,
    /// High byte bit 4.
    pub frequency_limit_active: bool,
    /// High byte bit 3.
    pub pe_limit_active: bool,
    /// High byte bits 0-2.
    pub remote_control: RemoteSource,
    /// Low byte bits 5-7.
    pub control_mode: ModeIndication,
    /// Low byte bit 1, `1` = sampling (Tastung) off.
    pub sampling_off: bool,
    /// Low byte bit 0, `1` = output contactor pulled in.
    pub contactor_on: bool,
}

impl StatusWord {
    /// Decode the two status bytes. Pure, never fails.
    pub fn from_parts(high: u8, low: u8) -> Self {
        StatusWord {
            setpoint_source: if high & 0x80 != 0 {
                SetpointSource::External
            } else {
                SetpointSource::Internal
            },
            circuit_ready: high & 0x40 != 0,
            frequency_limit_active: high & 0x10 != 0,
            pe_limit_active: high & 0x08 != 0,
            remote_control: RemoteSource::from_bits(high & 0b111),
            control_mode: ModeIndication::from_bits((low >> 5) & 0b111),
            sampling_off: low & 0x02 != 0,
            contactor_on: low & 0x01 != 0,
        }
    }

    /// Decode a status payload. Fails only when fewer than two bytes are
    /// supplied.
    pub fn from_bytes(payload: &[u8]) -> Result<Self, ProtocolError> {
        if payload.len() < 2 {
            return Err(ProtocolError::MalformedStatus);
        }
        Ok(Self::from_parts(payload[0], payload[1]))
    }

    /// Re-encode the status into its two wire bytes.
    ///
    /// Bits the protocol leaves undefined encode as zero. Mostly useful for
    /// building device replies in tests.
    pub fn to_bytes(&self) -> [u8; 2] {
        let mut high = self.remote_control.bits() & 0b111;
        if matches!(self.setpoint_source, SetpointSource::External) {
            high |= 0x80;
        }
        if self.circuit_ready {
            high |= 0x40;
        }
        if self.frequency_limit_active {
            high |= 0x10;
        }
        if self.pe_limit_active {
            high |= 0x08;
        }
        let mut low = (self.control_mode.bits() & 0b111) << 5;
        if self.sampling_off {
            low |= 0x02;
        }
        if self.contactor_on {
            low |= 0x01;
        }
        [high, low]
    }
}
