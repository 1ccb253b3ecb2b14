//! This crate provides an interface for controlling TIG-series DC
//! generator / power supply units over their half-duplex RS-232 command
//! protocol.
//!
//! The protocol addresses one device per link. Frames are a command code
//! byte plus a fixed-width payload implied by the code; there is no
//! checksum and no framing delimiter, so request/reply correlation is by
//! command identity with a bounded-wait retry policy on top.
//!
//! The physical transport is injected as a [`channel::Channel`]; the
//! `serialport` feature ships an adapter for real ports. The serial port
//! itself should be configured by the environment like so:
//! * Baud rate: per device manual (9600 is the common default)
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//!
//! Typical use goes through [`session::TigDc`]:
//!
//! ```ignore
//! let mut tig = TigDc::new(channel, ExchangeConfig::default());
//! tig.verify_fault_free()?;
//! tig.set_mode(ControlMode::Pdc)?;
//! tig.set_setpoint(SetpointKind::Active, 500)?; // 50.0% of full scale
//! tig.set_run(true)?;
//! let power = tig.read_actual(ActualKind::Power)?;
//! ```

pub mod channel;
pub mod command;
pub mod error;
pub mod errorlog;
pub mod frame;
pub mod session;
pub mod status;
pub mod transaction;
pub mod value;

#[cfg(feature = "serialport")]
pub mod serialport;

#[cfg(test)]
mod mock_channel;
