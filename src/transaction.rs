//! One request/response exchange over the injected byte channel.
//!
//! The link is half-duplex with no transaction IDs, so reply matching is by
//! command code alone and only one transaction may be outstanding at a
//! time. [`Exchange`] owns the channel and its `transact` method takes
//! `&mut self`, which enforces that structurally: a second request cannot
//! start before the previous one reached a terminal state. Once a frame has
//! been written to the wire there is no cancellation; the exchange runs to
//! completion or timeout so a late reply cannot corrupt the next
//! transaction's matching.

use std::time::{Duration, Instant};

use crate::channel::Channel;
use crate::command::{Command, Direction};
use crate::error::{Error, ProtocolError, Result};
use crate::frame::Frame;

/// Retry policy for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Total number of times the request frame may be transmitted. At
    /// least 1; values below are treated as 1.
    pub max_attempts: u32,
    /// Wait window per attempt. Every wait on the channel is bounded by
    /// this; no operation blocks indefinitely.
    pub attempt_timeout: Duration,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        // The generator can take a while to respond, a reasonably large
        // window is required.
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_millis(300),
        }
    }
}

/// Why a transaction reached `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Retry budget exhausted without a valid matching reply.
    Timeout { attempts: u32 },
    /// The matching reply arrived but its payload did not decode.
    Protocol(ProtocolError),
}

/// Lifecycle of one outstanding request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionState {
    /// Request sent, awaiting a matching reply.
    Pending,
    /// A valid matching reply was decoded.
    Completed(Frame),
    /// Terminal failure; the request will not be re-sent.
    Failed(Failure),
}

/// The per-transaction state machine, driven by the byte stream and the
/// attempt clock. Kept separate from the channel so the matching and retry
/// logic is testable without I/O.
#[derive(Debug)]
pub struct Transaction {
    request: Frame,
    attempt: u32,
    max_attempts: u32,
    state: TransactionState,
}

impl Transaction {
    pub fn new(request: Frame, max_attempts: u32) -> Self {
        Self {
            request,
            attempt: 1,
            max_attempts: max_attempts.max(1),
            state: TransactionState::Pending,
        }
    }

    pub fn state(&self) -> &TransactionState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TransactionState::Pending)
    }

    /// The attempt currently in flight, starting at 1.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Scan the receive buffer for the matching reply, draining every byte
    /// that has been accounted for.
    ///
    /// Stray interleaved frames and unknown bytes are discarded; a
    /// truncated frame at the end of the buffer is left in place until
    /// more bytes arrive. A matching reply whose payload fails to decode
    /// is a terminal protocol failure - the link answered us with
    /// unparseable data.
    pub fn feed(&mut self, rx: &mut Vec<u8>) {
        while self.is_pending() && !rx.is_empty() {
            let Some(command) = Command::lookup(rx[0]) else {
                log::warn!("dropping stray byte {:#04x} to resync", rx[0]);
                rx.remove(0);
                continue;
            };
            let need = 1 + command.domain().payload_width();
            if rx.len() < need {
                // Rest of the frame may still be in flight.
                return;
            }
            if command != self.request.command {
                log::warn!(
                    "discarding non-matching reply {:?} while waiting for {:?}",
                    command,
                    self.request.command
                );
                rx.drain(..need);
                continue;
            }
            match Frame::decode(rx) {
                Ok((frame, used)) => {
                    rx.drain(..used);
                    if matches!(self.request.command.direction(), Direction::Write)
                        && frame.value != self.request.value
                    {
                        log::warn!(
                            "write echo for {:?} differs from request: {:?} != {:?}",
                            frame.command,
                            frame.value,
                            self.request.value
                        );
                    }
                    self.state = TransactionState::Completed(frame);
                }
                Err(e) => {
                    self.state = TransactionState::Failed(Failure::Protocol(e));
                }
            }
        }
    }

    /// Note that the current wait window expired without a matching reply.
    ///
    /// Returns `true` when a retry attempt remains (the caller re-sends the
    /// identical request frame), `false` once the transaction has failed
    /// with a timeout.
    pub fn window_expired(&mut self) -> bool {
        if self.attempt >= self.max_attempts {
            self.state = TransactionState::Failed(Failure::Timeout {
                attempts: self.attempt,
            });
            return false;
        }
        self.attempt += 1;
        true
    }
}

/// Blocking driver that runs transactions over a [`Channel`].
pub struct Exchange<C: Channel> {
    channel: C,
    config: ExchangeConfig,
}

impl<C: Channel> Exchange<C> {
    pub fn new(channel: C, config: ExchangeConfig) -> Self {
        Self { channel, config }
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Release the underlying channel.
    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Run one request to a terminal state: send, await the matching
    /// reply, re-send on an expired window, fail once the retry budget is
    /// exhausted.
    pub fn transact(&mut self, request: Frame) -> Result<Frame, C::Error> {
        // Encoding failures (domain bounds) must reject the operation
        // before anything is transmitted.
        let tx = request.encode()?;
        let mut transaction = Transaction::new(request, self.config.max_attempts);
        let mut rx: Vec<u8> = Vec::new();

        while transaction.is_pending() {
            log::debug!("TX {:02X?} (attempt {})", tx, transaction.attempt());
            self.channel.send(&tx).map_err(Error::Channel)?;

            let deadline = Instant::now() + self.config.attempt_timeout;
            loop {
                transaction.feed(&mut rx);
                if !transaction.is_pending() {
                    break;
                }
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                let mut chunk = [0u8; 64];
                let n = self
                    .channel
                    .receive(&mut chunk, remaining)
                    .map_err(Error::Channel)?;
                if n == 0 {
                    // Wait window expired with nothing more arriving.
                    break;
                }
                log::debug!("RX {:02X?}", &chunk[..n]);
                rx.extend_from_slice(&chunk[..n]);
            }

            if transaction.is_pending() && transaction.window_expired() {
                log::warn!(
                    "no matching reply to {:?}, retransmitting (attempt {} of {})",
                    transaction.request.command,
                    transaction.attempt(),
                    self.config.max_attempts.max(1),
                );
                // A stale partial frame from the last window would
                // misalign the next reply.
                rx.clear();
            }
        }

        match transaction.state {
            TransactionState::Completed(frame) => Ok(frame),
            TransactionState::Failed(Failure::Timeout { attempts }) => {
                Err(Error::Timeout { attempts })
            }
            TransactionState::Failed(Failure::Protocol(e)) => Err(e.into()),
            TransactionState::Pending => unreachable!("loop exits only on terminal states"),
        }
    }
}
