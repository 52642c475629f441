//! The buffered serial channel.
//!
//! A [`SerialChannel`] owns a raw device, a receive ring and a transmit
//! ring. Each poll tick pulls whatever the device has into the receive ring
//! and, if anything landed (or overrun newly hit, or a notification was
//! requested), calls the registered [`RecvHandler`] exactly once.
//!
//! The application side lives on [`Port`]: everything prefixed `recv_` acts
//! on the receive ring, everything prefixed `send_` on the transmit ring.

use core::ops::{Deref, DerefMut};

use log::{debug, info};

use crate::config::ChannelConfig;
use crate::device::RawDevice;
use crate::index::Index;
use crate::ring::{ReceiveRing, TransmitRing};
use crate::sched::{PollEvent, Pollable};
use crate::{DEFAULT_RECV_SIZE, DEFAULT_SEND_SIZE};

/// Channel lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Constructed, not yet initialized.
    Idle,

    /// Initialized; poll ticks run.
    Running,

    /// Deinitialized; poll ticks are ignored.
    Stopped,
}

/// Counters about channel operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStats {
    /// Poll ticks that ran.
    pub ticks: u64,

    /// Bytes pulled from the device.
    pub bytes_received: u64,

    /// Bytes the device accepted on poke.
    pub bytes_sent: u64,

    /// Times the receive ring entered overrun.
    pub overruns: u64,

    /// Notifications delivered to the handler.
    pub notifications: u64,
}

impl ChannelStats {
    /// Creates zeroed counters.
    pub const fn new() -> Self {
        Self {
            ticks: 0,
            bytes_received: 0,
            bytes_sent: 0,
            overruns: 0,
            notifications: 0,
        }
    }

    /// Resets all counters.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Device plus rings: the part of a channel the application talks to.
#[derive(Debug)]
pub struct Port<D, const RX: usize, const TX: usize> {
    device: D,
    recv: ReceiveRing<RX>,
    send: TransmitRing<TX>,
    stats: ChannelStats,
}

impl<D: RawDevice, const RX: usize, const TX: usize> Port<D, RX, TX> {
    fn new(device: D) -> Self {
        Self {
            device,
            recv: ReceiveRing::new(),
            send: TransmitRing::new(),
            stats: ChannelStats::new(),
        }
    }

    /// Receive ring index width in bits.
    pub const RECV_BITS: u32 = Index::<RX>::BITS;

    /// Transmit ring index width in bits.
    pub const SEND_BITS: u32 = Index::<TX>::BITS;

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Pending receive length and overrun flag.
    pub fn recv_query(&self) -> (usize, bool) {
        self.recv.query()
    }

    /// All pending received bytes as one contiguous slice.
    pub fn recv_pending(&self) -> &[u8] {
        self.recv.pending()
    }

    /// Releases `amount` received bytes.
    ///
    /// # Panics
    ///
    /// Panics if `amount` exceeds the pending length.
    pub fn recv_consume(&mut self, amount: usize) {
        self.recv.consume(amount);
    }

    /// Copies and consumes received bytes, returning the count.
    pub fn recv_read(&mut self, buf: &mut [u8]) -> usize {
        self.recv.read(buf)
    }

    /// Acknowledges an overrun so receiving resumes on the next tick.
    ///
    /// # Panics
    ///
    /// Panics if overrun is not set.
    pub fn recv_clear_overrun(&mut self) {
        self.recv.clear_overrun();
    }

    /// Guarantees a notification on the next tick even without new data.
    pub fn recv_force_event(&mut self) {
        self.recv.request_notify();
    }

    /// Free space in the transmit ring.
    pub fn send_query(&self) -> usize {
        self.send.query()
    }

    /// Size of the next contiguous chunk for `requested` bytes.
    pub fn send_chunk_len(&self, requested: usize) -> usize {
        self.send.chunk_len(requested)
    }

    /// Writable chunk of `send_chunk_len(requested)` bytes.
    pub fn send_chunk_mut(&mut self, requested: usize) -> &mut [u8] {
        self.send.chunk_mut(requested)
    }

    /// Commits `amount` bytes written into the chunk.
    ///
    /// # Panics
    ///
    /// Panics if `amount` exceeds the free space.
    pub fn send_provide(&mut self, amount: usize) {
        self.send.provide(amount);
    }

    /// Queues as much of `data` as fits, returning the count.
    pub fn send_write(&mut self, data: &[u8]) -> usize {
        self.send.write(data)
    }

    /// Hands everything queued to the device.
    ///
    /// Returns the number of bytes the device accepted.
    pub fn send_poke(&mut self) -> usize {
        let sent = self.send.poke(&mut self.device);
        self.stats.bytes_sent += sent as u64;
        sent
    }

    /// Pulls from the device; returns true if the handler is owed a call.
    fn fill(&mut self) -> bool {
        let was_overrun = self.recv.is_overrun();
        let pulled = self.recv.fill(&mut self.device);

        self.stats.ticks += 1;
        self.stats.bytes_received += pulled as u64;
        if !was_overrun && self.recv.is_overrun() {
            self.stats.overruns += 1;
        }

        self.recv.take_notify()
    }

    fn reset(&mut self) {
        self.recv.reset();
        self.send.reset();
    }
}

/// Callback run when received data is ready.
///
/// Called synchronously from inside the poll tick, at most once per tick.
/// Closures taking `&mut Port` implement this trait.
pub trait RecvHandler<D, const RX: usize, const TX: usize> {
    fn data_ready(&mut self, port: &mut Port<D, RX, TX>);
}

impl<D, F, const RX: usize, const TX: usize> RecvHandler<D, RX, TX> for F
where
    F: FnMut(&mut Port<D, RX, TX>),
{
    fn data_ready(&mut self, port: &mut Port<D, RX, TX>) {
        self(port)
    }
}

/// A poll-driven buffered channel over a raw device.
///
/// `RX` and `TX` are the ring sizes in slots and must be powers of two;
/// each ring holds one byte less than its size.
///
/// # Example
///
/// ```rust,ignore
/// let mut channel: SerialChannel<_, _, 64, 64> =
///     SerialChannel::new(device, handler, ChannelConfig::default());
/// channel.init();
/// while running {
///     channel.poll_tick();
/// }
/// channel.deinit();
/// ```
#[derive(Debug)]
pub struct SerialChannel<D, H, const RX: usize, const TX: usize> {
    port: Port<D, RX, TX>,
    handler: H,
    event: PollEvent,
    state: ChannelState,
    config: ChannelConfig,
}

impl<D, H, const RX: usize, const TX: usize> SerialChannel<D, H, RX, TX>
where
    D: RawDevice,
    H: RecvHandler<D, RX, TX>,
{
    /// Creates an idle channel with empty rings.
    pub fn new(device: D, handler: H, config: ChannelConfig) -> Self {
        Self {
            port: Port::new(device),
            handler,
            event: PollEvent::new(),
            state: ChannelState::Idle,
            config,
        }
    }

    /// Empties both rings and schedules the first poll tick.
    pub fn init(&mut self) {
        self.port.reset();
        self.state = ChannelState::Running;
        self.event.trigger();

        info!(
            "Serial channel up: baud={}, recv={} bytes ({} bits), send={} bytes ({} bits)",
            self.config.baud_rate,
            Index::<RX>::MAX,
            Index::<RX>::BITS,
            Index::<TX>::MAX,
            Index::<TX>::BITS
        );
    }

    /// Stops polling. No notification fires after this returns.
    ///
    /// Calling it again is harmless.
    pub fn deinit(&mut self) {
        self.event.reset();
        if self.state == ChannelState::Running {
            debug!(
                "Serial channel down after {} ticks, {} bytes in, {} bytes out",
                self.port.stats.ticks, self.port.stats.bytes_received, self.port.stats.bytes_sent
            );
        }
        self.state = ChannelState::Stopped;
    }

    /// Runs one poll step if one is scheduled.
    ///
    /// Re-arms itself, fills the receive ring and delivers at most one
    /// notification. Returns false, doing nothing, when no step was
    /// scheduled (before `init` or after `deinit`).
    pub fn poll_tick(&mut self) -> bool {
        if !self.event.take() {
            return false;
        }
        self.event.trigger();

        if self.port.fill() {
            self.port.stats.notifications += 1;
            self.handler.data_ready(&mut self.port);
        }
        true
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }
}

/// Channel with the default ring sizes.
pub type DefaultChannel<D, H> = SerialChannel<D, H, DEFAULT_RECV_SIZE, DEFAULT_SEND_SIZE>;

impl<D, H, const RX: usize, const TX: usize> Deref for SerialChannel<D, H, RX, TX> {
    type Target = Port<D, RX, TX>;

    fn deref(&self) -> &Self::Target {
        &self.port
    }
}

impl<D, H, const RX: usize, const TX: usize> DerefMut for SerialChannel<D, H, RX, TX> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.port
    }
}

impl<D, H, const RX: usize, const TX: usize> Pollable for SerialChannel<D, H, RX, TX>
where
    D: RawDevice,
    H: RecvHandler<D, RX, TX>,
{
    fn is_pending(&self) -> bool {
        self.event.is_pending()
    }

    fn dispatch(&mut self) {
        self.poll_tick();
    }
}
