//! Raw device abstraction.
//!
//! This module provides the `RawDevice` trait the channel polls. A device
//! has no interrupts and never blocks: it can only say how many bytes are
//! waiting, hand some of them over, and accept some bytes for output.
//!
//! # Implementations
//!
//! - `LoopbackDevice`: In-memory device with scripted input and captured output
//! - `NullDevice`: Never has input, discards all output

mod fifo;
mod loopback;

pub use fifo::Fifo;
pub use loopback::{LoopbackDevice, NullDevice};

use crate::error::Result;

/// A polled, non-blocking duplex byte device.
///
/// Partial and zero-length results are normal. Errors are treated by the
/// channel as "nothing this tick" and never abort a poll.
pub trait RawDevice {
    /// Returns how many received bytes can be read right now.
    fn available(&mut self) -> usize;

    /// Reads up to `buf.len()` received bytes.
    ///
    /// Returns the number of bytes read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Offers bytes for output.
    ///
    /// Returns the number of bytes the device accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;
}
