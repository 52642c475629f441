//! Transmit side ring.

use log::{trace, warn};

use crate::device::RawDevice;
use crate::index::Index;

/// Transmit ring of `N` slots, `N - 1` of them usable.
///
/// The application writes in contiguous chunks that never cross the
/// physical end of the storage; [`poke`](Self::poke) hands everything
/// pending to the device.
#[derive(Debug)]
pub struct TransmitRing<const N: usize> {
    buffer: [u8; N],

    /// First byte not yet handed to the device.
    start: Index<N>,

    /// One past the last byte provided by the application.
    end: Index<N>,
}

impl<const N: usize> TransmitRing<N> {
    /// Creates an empty ring.
    pub const fn new() -> Self {
        Self {
            buffer: [0u8; N],
            start: Index::ZERO,
            end: Index::ZERO,
        }
    }

    /// Drops anything pending.
    pub fn reset(&mut self) {
        self.start = Index::ZERO;
        self.end = Index::ZERO;
    }

    /// Maximum number of bytes the ring can hold.
    #[inline]
    pub const fn capacity(&self) -> usize {
        Index::<N>::MAX
    }

    /// Free space for new bytes.
    #[inline]
    pub fn query(&self) -> usize {
        self.end.distance_to(self.start.dec())
    }

    /// Bytes provided but not yet poked out.
    #[inline]
    pub fn pending(&self) -> usize {
        self.start.distance_to(self.end)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Clamps `requested` to what can be written in one contiguous chunk.
    ///
    /// The result never exceeds the free space nor the distance from the
    /// write position to the physical end of the storage.
    pub fn chunk_len(&self, requested: usize) -> usize {
        let len = core::cmp::min(requested, self.query());
        core::cmp::min(len, N - self.end.value())
    }

    /// Writable chunk of exactly `chunk_len(requested)` bytes.
    ///
    /// Bytes written here are not part of the stream until
    /// [`provide`](Self::provide) is called.
    pub fn chunk_mut(&mut self, requested: usize) -> &mut [u8] {
        let len = self.chunk_len(requested);
        let offset = self.end.value();
        &mut self.buffer[offset..offset + len]
    }

    /// Commits `amount` bytes written through [`chunk_mut`](Self::chunk_mut).
    ///
    /// # Panics
    ///
    /// Panics if `amount` exceeds the free space.
    pub fn provide(&mut self, amount: usize) {
        assert!(
            amount <= self.query(),
            "provide of {} bytes with only {} free",
            amount,
            self.query()
        );
        self.end = self.end.advance(amount);
    }

    /// Copies as much of `data` as fits, across the wrap if needed.
    ///
    /// Returns the number of bytes accepted.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let mut written = 0;
        while written < data.len() {
            let chunk = self.chunk_mut(data.len() - written);
            if chunk.is_empty() {
                break;
            }
            let n = chunk.len();
            chunk.copy_from_slice(&data[written..written + n]);
            self.provide(n);
            written += n;
        }
        written
    }

    /// Hands every pending byte to the device.
    ///
    /// Each span is released whether or not the device took all of it;
    /// there is no backpressure from the wire.
    ///
    /// Returns the number of bytes the device accepted.
    pub fn poke<D: RawDevice + ?Sized>(&mut self, device: &mut D) -> usize {
        let mut accepted = 0;

        while self.start != self.end {
            let span = if self.end < self.start {
                self.start.to_boundary()
            } else {
                self.start.distance_to(self.end)
            };

            let offset = self.start.value();
            match device.write(&self.buffer[offset..offset + span]) {
                Ok(n) if n < span => {
                    warn!("Short device write: {} of {} bytes, rest dropped", n, span);
                    accepted += n;
                }
                Ok(_) => accepted += span,
                Err(e) => warn!("Device write failed, {} bytes dropped: {}", span, e),
            }

            self.start = self.start.advance(span);
            trace!("Sent span of {} bytes at offset {}", span, offset);
        }

        accepted
    }
}

impl<const N: usize> Default for TransmitRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{LoopbackDevice, NullDevice};

    #[test]
    fn test_empty_ring() {
        let ring: TransmitRing<8> = TransmitRing::new();
        assert_eq!(ring.query(), 7);
        assert_eq!(ring.pending(), 0);
        assert_eq!(ring.chunk_len(100), 7);
    }

    #[test]
    fn test_provide_and_poke() {
        let mut ring: TransmitRing<16> = TransmitRing::new();
        let mut device: LoopbackDevice<8, 64> = LoopbackDevice::new();

        let chunk = ring.chunk_mut(5);
        assert_eq!(chunk.len(), 5);
        chunk.copy_from_slice(b"Hello");
        ring.provide(5);
        assert_eq!(ring.query(), 10);

        assert_eq!(ring.poke(&mut device), 5);
        assert!(ring.is_empty());

        let mut out = [0u8; 16];
        let n = device.drain(&mut out);
        assert_eq!(&out[..n], b"Hello");
    }

    #[test]
    fn test_chunk_clamped_to_boundary() {
        let mut ring: TransmitRing<16> = TransmitRing::new();
        let mut device = NullDevice::new();

        // Move start/end to offset 12.
        ring.write(&[0u8; 12]);
        ring.poke(&mut device);
        assert_eq!(ring.query(), 15);

        // Free space allows 15, the physical end only 4.
        assert_eq!(ring.chunk_len(10), 4);
        assert_eq!(ring.chunk_len(3), 3);

        ring.chunk_mut(10).copy_from_slice(b"abcd");
        ring.provide(4);

        // Second chunk starts at offset 0.
        assert_eq!(ring.chunk_len(10), 10);
        ring.chunk_mut(6).copy_from_slice(b"efghij");
        ring.provide(6);
        assert_eq!(ring.pending(), 10);
    }

    #[test]
    fn test_poke_drains_across_wrap_in_order() {
        let mut ring: TransmitRing<8> = TransmitRing::new();
        let mut device: LoopbackDevice<8, 64> = LoopbackDevice::new();

        ring.write(b"xxxxx");
        ring.poke(&mut device);
        device.drain(&mut [0u8; 8]);

        assert_eq!(ring.write(b"ABCDEFG"), 7);
        assert_eq!(ring.query(), 0);
        assert_eq!(ring.poke(&mut device), 7);

        let mut out = [0u8; 8];
        let n = device.drain(&mut out);
        assert_eq!(&out[..n], b"ABCDEFG");
    }

    #[test]
    fn test_write_truncates_when_full() {
        let mut ring: TransmitRing<4> = TransmitRing::new();
        assert_eq!(ring.write(b"abcdef"), 3);
        assert_eq!(ring.query(), 0);
        assert_eq!(ring.chunk_len(1), 0);
    }

    #[test]
    fn test_short_write_is_dropped() {
        let mut ring: TransmitRing<16> = TransmitRing::new();
        let mut device: LoopbackDevice<8, 64> = LoopbackDevice::new();
        device.set_write_limit(Some(2));

        ring.write(b"abcdef");
        assert_eq!(ring.poke(&mut device), 2);
        assert!(ring.is_empty());
        assert_eq!(device.outbound_len(), 2);
    }

    #[test]
    #[should_panic(expected = "provide of 8 bytes")]
    fn test_over_provide_panics() {
        let mut ring: TransmitRing<8> = TransmitRing::new();
        ring.provide(8);
    }
}
