//! Retrieval of the device's error message log.
//!
//! A fixed two-phase sequence: read the number of stored error messages,
//! then read one (function number, error number) pair per slot. The whole
//! log is refreshed wholesale on each retrieval; there is no incremental
//! diffing.

use crate::channel::Channel;
use crate::command::Command;
use crate::error::{Error, ProtocolError, Result};
use crate::frame::Frame;
use crate::transaction::Exchange;

/// One entry of the device error log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorRecord {
    /// Function number the error was raised in.
    pub function: u8,
    /// Error number within that function.
    pub error: u8,
}

/// The device error log, ordered as the device reports it.
pub type DeviceErrorLog = Vec<ErrorRecord>;

/// Run the full retrieval sequence.
///
/// With a count of zero no further sub-transactions are issued. If any
/// sub-transaction fails, the records collected so far are returned inside
/// [`Error::ErrorLogIncomplete`].
///
/// @TODO confirm against the device manual whether the error pointer
/// auto-advances after each `0xE4`/`0xE5` pair or an index byte is
/// required; the sequence currently assumes an auto-advancing cursor.
pub fn retrieve<C: Channel>(exchange: &mut Exchange<C>) -> Result<DeviceErrorLog, C::Error> {
    let count = read_count(exchange)?;
    log::debug!("device reports {} error message(s)", count);

    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        match read_record(exchange) {
            Ok(record) => records.push(record),
            Err(e) => {
                return Err(Error::ErrorLogIncomplete {
                    collected: records,
                    expected: count,
                    source: Box::new(e),
                });
            }
        }
    }
    Ok(records)
}

fn read_count<C: Channel>(exchange: &mut Exchange<C>) -> Result<u8, C::Error> {
    let reply = exchange.transact(Frame::read(Command::ErrorCountRead))?;
    Ok(reply
        .value
        .count()
        .ok_or(ProtocolError::DomainMismatch)?)
}

fn read_record<C: Channel>(exchange: &mut Exchange<C>) -> Result<ErrorRecord, C::Error> {
    let function = exchange
        .transact(Frame::read(Command::ErrorFunctionRead))?
        .value
        .count()
        .ok_or(ProtocolError::DomainMismatch)?;
    let error = exchange
        .transact(Frame::read(Command::ErrorNumberRead))?
        .value
        .count()
        .ok_or(ProtocolError::DomainMismatch)?;
    Ok(ErrorRecord { function, error })
}
