//! We use this mocking module in unit tests to emulate the serial link.

use std::collections::VecDeque;
use std::time::Duration;

use crate::channel::Channel;

/// Scripted byte channel: replies are queued ahead of time, one chunk per
/// `receive` call, and every sent frame is captured for inspection. An
/// empty queue behaves like a silent device (the wait window expires).
pub struct MockChannel {
    /// Every frame passed to `send`, in order.
    sent: Vec<Vec<u8>>,
    /// Pre-scripted reply chunks, popped one per `receive` call.
    replies: VecDeque<Vec<u8>>,
    /// Flag to simulate send failures.
    fail_send: bool,
    /// Flag to simulate receive failures.
    fail_receive: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MockChannelError {
    /// Generic simulated I/O failure.
    Simulated,
}

impl Channel for MockChannel {
    type Error = MockChannelError;

    fn send(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail_send {
            return Err(MockChannelError::Simulated);
        }
        self.sent.push(bytes.to_vec());
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8], _max_wait: Duration) -> Result<usize, Self::Error> {
        if self.fail_receive {
            return Err(MockChannelError::Simulated);
        }
        let Some(mut chunk) = self.replies.pop_front() else {
            // Nothing scripted: the window expires.
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            // Hand the rest back for the next call.
            chunk.drain(..n);
            self.replies.push_front(chunk);
        }
        Ok(n)
    }
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            replies: VecDeque::new(),
            fail_send: false,
            fail_receive: false,
        }
    }

    /// Script one chunk of reply bytes. Each chunk is delivered by exactly
    /// one `receive` call, so splitting a frame across chunks emulates a
    /// reply arriving in pieces.
    pub fn queue_reply(&mut self, bytes: &[u8]) {
        self.replies.push_back(bytes.to_vec());
    }

    /// Every frame sent so far, in transmission order.
    pub fn sent_frames(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Configure whether `send` should fail.
    pub fn set_send_error(&mut self, should_error: bool) {
        self.fail_send = should_error;
    }

    /// Configure whether `receive` should fail.
    pub fn set_receive_error(&mut self, should_error: bool) {
        self.fail_receive = should_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_sent_frames_in_order() {
        let mut mock = MockChannel::new();
        mock.send(&[0xE1]).unwrap();
        mock.send(&[0x4F, 0x01]).unwrap();
        assert_eq!(
            mock.sent_frames(),
            [[0xE1].as_slice(), [0x4F, 0x01].as_slice()]
        );
    }

    #[test]
    fn delivers_one_chunk_per_receive() {
        let mut mock = MockChannel::new();
        mock.queue_reply(&[0xC3, 0x01]);
        mock.queue_reply(&[0xF4]);

        let mut buf = [0u8; 16];
        let n = mock.receive(&mut buf, Duration::from_millis(1)).unwrap();
        assert_eq!(&buf[..n], [0xC3, 0x01]);
        let n = mock.receive(&mut buf, Duration::from_millis(1)).unwrap();
        assert_eq!(&buf[..n], [0xF4]);
    }

    #[test]
    fn empty_queue_reads_zero_bytes() {
        let mut mock = MockChannel::new();
        let mut buf = [0u8; 16];
        assert_eq!(mock.receive(&mut buf, Duration::from_millis(1)).unwrap(), 0);
    }

    #[test]
    fn oversized_chunk_is_carried_over() {
        let mut mock = MockChannel::new();
        mock.queue_reply(&[1, 2, 3, 4]);

        let mut buf = [0u8; 3];
        let n = mock.receive(&mut buf, Duration::from_millis(1)).unwrap();
        assert_eq!(&buf[..n], [1, 2, 3]);
        let n = mock.receive(&mut buf, Duration::from_millis(1)).unwrap();
        assert_eq!(&buf[..n], [4]);
    }

    #[test]
    fn error_flags_simulate_io_failures() {
        let mut mock = MockChannel::new();
        mock.set_send_error(true);
        assert_eq!(mock.send(&[0xE1]).unwrap_err(), MockChannelError::Simulated);
        assert!(mock.sent_frames().is_empty());

        mock.set_send_error(false);
        mock.set_receive_error(true);
        let mut buf = [0u8; 4];
        assert_eq!(
            mock.receive(&mut buf, Duration::from_millis(1)).unwrap_err(),
            MockChannelError::Simulated
        );
    }
}
