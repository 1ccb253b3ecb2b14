//! The byte-channel boundary the driver is built on.
//!
//! The physical transport (serial port configuration, open/close) lives
//! outside this crate. Anything that can ship bytes both ways with a bounded
//! read can drive a generator: a real RS-232 port, a TCP bridge, or a mock
//! in tests.

use std::time::Duration;

/// A half-duplex byte transport.
///
/// The driver takes exclusive ownership of the channel for the duration of
/// each request/response exchange, so implementations do not need to be
/// re-entrant.
pub trait Channel {
    type Error: core::fmt::Debug;

    /// Write the whole frame to the wire.
    fn send(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Read whatever bytes arrive within `max_wait`.
    ///
    /// Returns the number of bytes placed in `buf`. `Ok(0)` means the wait
    /// window expired with nothing received; it is not an error, the caller
    /// owns the retry policy.
    fn receive(&mut self, buf: &mut [u8], max_wait: Duration) -> Result<usize, Self::Error>;
}
