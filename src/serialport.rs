//! [`Channel`] implementation over a `serialport` port.
//!
//! Only compiled with the `serialport` feature. Opening and configuring the
//! port (device path, baud rate, parity) stays with the caller; this
//! adapter just maps the port's timeout semantics onto the channel
//! contract.

use std::io::Read;
use std::time::Duration;

use crate::channel::Channel;

/// Wraps an open serial port as a [`Channel`].
pub struct SerialChannel {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialChannel {
    pub fn new(port: Box<dyn serialport::SerialPort>) -> Self {
        Self { port }
    }

    /// Hand the port back, e.g. to close or reconfigure it.
    pub fn into_port(self) -> Box<dyn serialport::SerialPort> {
        self.port
    }
}

impl Channel for SerialChannel {
    type Error = std::io::Error;

    fn send(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        std::io::Write::write_all(&mut self.port, bytes)?;
        std::io::Write::flush(&mut self.port)
    }

    fn receive(&mut self, buf: &mut [u8], max_wait: Duration) -> Result<usize, Self::Error> {
        self.port.set_timeout(max_wait).map_err(std::io::Error::from)?;
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            // An expired wait window is not an error at this boundary.
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }
}
