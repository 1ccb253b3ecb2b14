//! Our error types for the TIG DC generator driver.

use thiserror::Error;

use crate::errorlog::ErrorRecord;

pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Failures raised by the codecs before or after any byte hits the wire.
///
/// These carry no transport context and are produced by pure functions, so
/// they can be compared directly in tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A caller-supplied or device-returned numeric value exceeds the
    /// documented bound for its domain.
    #[error("value {value} is outside the range 0..={max}")]
    OutOfRange { value: u16, max: u16 },
    /// An enum-domain payload byte is outside the documented symbol set.
    #[error("invalid enum value {0:#04x}")]
    InvalidEnumValue(u8),
    /// A status payload shorter than the two documented bytes.
    #[error("status word shorter than two bytes")]
    MalformedStatus,
    /// The leading byte of a frame is not a registered command code.
    #[error("unknown command code {0:#04x}")]
    UnknownCommand(u8),
    /// Fewer bytes present than the command's value domain requires.
    #[error("frame truncated: expected {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },
    /// A decoded payload carries a different value domain than the command
    /// declares. The frame codec derives payloads from the registry, so
    /// hitting this indicates a bug rather than bad wire data.
    #[error("reply payload does not match the command's value domain")]
    DomainMismatch,
}

/// Custom error type for a full driver operation, generic over the error
/// type of the injected byte channel.
#[derive(Error, Debug)]
pub enum Error<E: core::fmt::Debug> {
    /// The byte channel itself failed (I/O level, not protocol level).
    #[error("serial channel error")]
    Channel(E),
    /// The request or reply could not be encoded/decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// No valid matching reply arrived within the configured retry budget.
    #[error("no matching reply after {attempts} attempts")]
    Timeout { attempts: u32 },
    /// The device's own error log is non-empty. Not a transport failure.
    #[error("device reported error {error} in function {function}")]
    DeviceReported { function: u8, error: u8 },
    /// The error retrieval sequence failed partway through; `collected`
    /// holds the records read before the failing sub-transaction.
    #[error("error log retrieval stopped after {} of {expected} records: {}", .collected.len(), .source)]
    ErrorLogIncomplete {
        collected: Vec<ErrorRecord>,
        expected: u8,
        source: Box<Error<E>>,
    },
}
