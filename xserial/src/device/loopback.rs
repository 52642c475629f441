use super::{Fifo, RawDevice};
use crate::error::{Error, ErrorKind, Result};

/// An in-memory device for tests and demos.
///
/// Bytes staged with [`inject`](Self::inject) become available to the
/// channel; bytes the channel writes are captured and collected with
/// [`drain`](Self::drain).
#[derive(Debug)]
pub struct LoopbackDevice<const IN: usize, const OUT: usize> {
    inbound: Fifo<IN>,
    outbound: Fifo<OUT>,

    /// Maximum bytes accepted per `write` call, if limited.
    write_limit: Option<usize>,

    /// When set, `read` fails with `Disconnected`.
    read_fault: bool,

    /// Number of `read` calls that returned data.
    reads: usize,
}

impl<const IN: usize, const OUT: usize> LoopbackDevice<IN, OUT> {
    /// Creates an idle device.
    pub const fn new() -> Self {
        Self {
            inbound: Fifo::new(),
            outbound: Fifo::new(),
            write_limit: None,
            read_fault: false,
            reads: 0,
        }
    }

    /// Stages bytes as if they had arrived on the wire.
    ///
    /// Returns how many fit into the inbound FIFO.
    pub fn inject(&mut self, data: &[u8]) -> usize {
        self.inbound.push(data)
    }

    /// Collects bytes the channel has written.
    pub fn drain(&mut self, buf: &mut [u8]) -> usize {
        self.outbound.pop(buf)
    }

    /// Returns the number of written bytes not yet drained.
    pub fn outbound_len(&self) -> usize {
        self.outbound.len()
    }

    /// Returns the number of injected bytes not yet read by the channel.
    pub fn inbound_len(&self) -> usize {
        self.inbound.len()
    }

    /// Returns the number of successful non-empty reads.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Limits how many bytes a single `write` accepts.
    pub fn set_write_limit(&mut self, limit: Option<usize>) {
        self.write_limit = limit;
    }

    /// Makes subsequent reads fail until cleared.
    pub fn set_read_fault(&mut self, fault: bool) {
        self.read_fault = fault;
    }

    /// Drops all staged and captured bytes.
    pub fn clear(&mut self) {
        self.inbound.clear();
        self.outbound.clear();
    }
}

impl<const IN: usize, const OUT: usize> Default for LoopbackDevice<IN, OUT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const IN: usize, const OUT: usize> RawDevice for LoopbackDevice<IN, OUT> {
    fn available(&mut self) -> usize {
        self.inbound.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.read_fault {
            return Err(Error::new(ErrorKind::Disconnected));
        }
        let n = self.inbound.pop(buf);
        if n > 0 {
            self.reads += 1;
        }
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let len = match self.write_limit {
            Some(limit) => core::cmp::min(limit, buf.len()),
            None => buf.len(),
        };
        Ok(self.outbound.push(&buf[..len]))
    }
}

/// A device that never receives and discards everything written.
///
/// Useful for exercising the transmit path on its own.
#[derive(Debug, Default)]
pub struct NullDevice {
    bytes_written: usize,
}

impl NullDevice {
    /// Creates a new null device.
    pub fn new() -> Self {
        Self { bytes_written: 0 }
    }

    /// Returns the total number of bytes written.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Resets the byte counter.
    pub fn reset(&mut self) {
        self.bytes_written = 0;
    }
}

impl RawDevice for NullDevice {
    fn available(&mut self) -> usize {
        0
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize> {
        Err(Error::new(ErrorKind::WouldBlock))
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.bytes_written += buf.len();
        Ok(buf.len())
    }
}
