//! Plain byte FIFO used by the in-memory devices.
//!
//! This is the "wire" of a [`LoopbackDevice`](super::LoopbackDevice), not a
//! channel ring: it uses the whole storage (no sentinel slot) and copies in
//! and out in at most two spans.

/// A fixed-size byte FIFO.
#[derive(Debug)]
pub struct Fifo<const N: usize> {
    buffer: [u8; N],

    /// Read position.
    head: usize,

    /// Number of bytes queued.
    len: usize,
}

impl<const N: usize> Fifo<N> {
    /// Creates an empty FIFO.
    pub const fn new() -> Self {
        Self {
            buffer: [0u8; N],
            head: 0,
            len: 0,
        }
    }

    /// Returns the number of queued bytes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing is queued.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the free space.
    #[inline]
    pub const fn remaining(&self) -> usize {
        N - self.len
    }

    /// Drops everything queued.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Queues as much of `data` as fits, returning the count queued.
    pub fn push(&mut self, data: &[u8]) -> usize {
        let count = core::cmp::min(data.len(), self.remaining());
        let tail = (self.head + self.len) % N;

        let first = core::cmp::min(count, N - tail);
        self.buffer[tail..tail + first].copy_from_slice(&data[..first]);
        self.buffer[..count - first].copy_from_slice(&data[first..count]);

        self.len += count;
        count
    }

    /// Dequeues into `buf`, returning the count dequeued.
    pub fn pop(&mut self, buf: &mut [u8]) -> usize {
        let count = core::cmp::min(buf.len(), self.len);

        let first = core::cmp::min(count, N - self.head);
        buf[..first].copy_from_slice(&self.buffer[self.head..self.head + first]);
        buf[first..count].copy_from_slice(&self.buffer[..count - first]);

        self.head = (self.head + count) % N;
        self.len -= count;
        count
    }
}

impl<const N: usize> Default for Fifo<N> {
    fn default() -> Self {
        Self::new()
    }
}
