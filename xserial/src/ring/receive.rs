//! Receive side ring.
//!
//! The storage is two copies of an `N`-slot ring laid out back to back.
//! Every byte pulled from the device is written to the lower half and then
//! mirrored into the upper half at the same offset, so the pending region
//! `[start, start + len)` can always be sliced straight out of the flat
//! storage, whether or not it wraps.

use log::{trace, warn};

use crate::device::RawDevice;
use crate::index::Index;

/// Receive ring of `N` slots, `N - 1` of them usable.
#[derive(Debug)]
pub struct ReceiveRing<const N: usize> {
    /// Lower half and its mirror.
    buffer: [[u8; N]; 2],

    /// First unread byte. Moved only by the application.
    start: Index<N>,

    /// One past the last received byte. Moved only by `fill`.
    end: Index<N>,

    /// The ring filled up; nothing more is pulled until cleared.
    overrun: bool,

    /// A notification is owed on the next poll tick.
    force_notify: bool,
}

impl<const N: usize> ReceiveRing<N> {
    /// Creates an empty ring.
    pub const fn new() -> Self {
        Self {
            buffer: [[0u8; N]; 2],
            start: Index::ZERO,
            end: Index::ZERO,
            overrun: false,
            force_notify: false,
        }
    }

    /// Empties the ring and clears both flags.
    pub fn reset(&mut self) {
        self.start = Index::ZERO;
        self.end = Index::ZERO;
        self.overrun = false;
        self.force_notify = false;
    }

    /// Maximum number of bytes the ring can hold.
    #[inline]
    pub const fn capacity(&self) -> usize {
        Index::<N>::MAX
    }

    /// Returns the pending length and whether overrun is set.
    #[inline]
    pub fn query(&self) -> (usize, bool) {
        (self.len(), self.overrun)
    }

    /// Returns the number of unread bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.start.distance_to(self.end)
    }

    /// Returns true if there are no unread bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if the ring overran and has not been acknowledged.
    #[inline]
    pub fn is_overrun(&self) -> bool {
        self.overrun
    }

    /// All unread bytes, oldest first, as one slice.
    pub fn pending(&self) -> &[u8] {
        let offset = self.start.value();
        &self.buffer.as_flattened()[offset..offset + self.len()]
    }

    /// Releases `amount` bytes from the front of the ring.
    ///
    /// # Panics
    ///
    /// Panics if `amount` exceeds the pending length.
    pub fn consume(&mut self, amount: usize) {
        assert!(
            amount <= self.len(),
            "consume of {} bytes with only {} pending",
            amount,
            self.len()
        );
        self.start = self.start.advance(amount);
    }

    /// Copies unread bytes into `buf` and consumes them.
    ///
    /// Returns the number of bytes copied.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let pending = self.pending();
        let n = core::cmp::min(buf.len(), pending.len());
        buf[..n].copy_from_slice(&pending[..n]);
        self.consume(n);
        n
    }

    /// Acknowledges an overrun so filling can resume.
    ///
    /// # Panics
    ///
    /// Panics if overrun is not set.
    pub fn clear_overrun(&mut self) {
        assert!(self.overrun, "clear_overrun without a pending overrun");
        self.overrun = false;
    }

    /// Asks for a notification on the next poll even if nothing arrives.
    pub fn request_notify(&mut self) {
        self.force_notify = true;
    }

    /// Clears the notification latch, returning whether it was set.
    pub fn take_notify(&mut self) -> bool {
        core::mem::take(&mut self.force_notify)
    }

    /// Pulls whatever the device has into the free space.
    ///
    /// Stops at the first tick where the device reports nothing available.
    /// If the free space runs out first the ring enters overrun and stays
    /// there, pulling nothing, until [`clear_overrun`](Self::clear_overrun).
    ///
    /// Returns the number of bytes pulled.
    pub fn fill<D: RawDevice + ?Sized>(&mut self, device: &mut D) -> usize {
        if self.overrun {
            return 0;
        }

        // `end` may never catch up with `start`; that would read as empty.
        let virtual_start = self.start.dec();
        let mut pulled = 0;

        while self.end != virtual_start {
            let span = if self.end > virtual_start {
                self.end.to_boundary()
            } else {
                self.end.distance_to(virtual_start)
            };

            let ready = device.available();
            if ready == 0 {
                return pulled;
            }

            let offset = self.end.value();
            let want = core::cmp::min(ready, span);
            let [lower, upper] = &mut self.buffer;

            let n = match device.read(&mut lower[offset..offset + want]) {
                Ok(n) => core::cmp::min(n, want),
                Err(e) if e.is_transient() => 0,
                Err(e) => {
                    warn!("Device read failed, retrying next tick: {}", e);
                    0
                }
            };
            if n == 0 {
                return pulled;
            }

            upper[offset..offset + n].copy_from_slice(&lower[offset..offset + n]);
            self.end = self.end.advance(n);
            self.force_notify = true;
            pulled += n;

            trace!("Received {} bytes at offset {}, pending={}", n, offset, self.len());
        }

        self.overrun = true;
        self.force_notify = true;
        warn!(
            "Receive ring overrun: {} bytes pending, further input dropped",
            self.len()
        );

        pulled
    }
}

impl<const N: usize> Default for ReceiveRing<N> {
    fn default() -> Self {
        Self::new()
    }
}
