//! # XSerial - A Poll-Driven Buffered Serial Channel
//!
//! XSerial is a `no_std` byte-stream channel that sits between a raw duplex
//! device and an application. The device only knows how to report, read and
//! write whatever bytes are available right now; the channel adds:
//!
//! - **Receive buffering**: a mirrored ring that always exposes pending bytes
//!   as one contiguous slice, even across the wrap point
//! - **Overrun detection**: a full ring stops pulling and reports overrun
//!   instead of overwriting unread data
//! - **Transmit buffering**: contiguous chunk writes drained to the device on demand
//! - **Edge-triggered notification**: one "data ready" callback per poll tick,
//!   however many bytes arrived
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Application Layer                     │
//! │              (RecvHandler callback, Port API)            │
//! ├─────────────────────────────────────────────────────────┤
//! │                    Channel Layer                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌────────────────┐   │
//! │  │ ReceiveRing  │ │ TransmitRing │ │   PollEvent    │   │
//! │  │  (mirrored)  │ │  (chunked)   │ │  (re-armed)    │   │
//! │  └──────────────┘ └──────────────┘ └────────────────┘   │
//! ├─────────────────────────────────────────────────────────┤
//! │                    Device Layer                          │
//! │  ┌─────────────────────────────────────────────────┐   │
//! │  │      RawDevice (available / read / write)        │   │
//! │  └─────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use xserial::{ChannelConfig, EventLoop, LoopbackDevice, SerialChannel};
//!
//! let device: LoopbackDevice<256, 256> = LoopbackDevice::new();
//! let channel: SerialChannel<_, _, 64, 64> =
//!     SerialChannel::new(device, |port: &mut xserial::Port<_, 64, 64>| {
//!         let mut buf = [0u8; 64];
//!         let n = port.recv_read(&mut buf);
//!         port.send_write(&buf[..n]);
//!         port.send_poke();
//!     }, ChannelConfig::default());
//!
//! let mut event_loop: EventLoop<_, 4> = EventLoop::new();
//! let id = event_loop.register(channel)?;
//! event_loop.task_mut(id).unwrap().init();
//! event_loop.run_once();
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

pub mod channel;
pub mod config;
pub mod device;
pub mod error;
pub mod index;
pub mod ring;
pub mod sched;

#[cfg(test)]
mod tests_prop;

// Re-export commonly used types
pub use channel::{ChannelState, ChannelStats, DefaultChannel, Port, RecvHandler, SerialChannel};
pub use config::ChannelConfig;
pub use device::{LoopbackDevice, NullDevice, RawDevice};
pub use error::{Error, ErrorKind, Result};
pub use index::Index;
pub use ring::{ReceiveRing, TransmitRing};
pub use sched::{EventLoop, PollEvent, Pollable, TaskId};

/// Default receive ring size (2^8 slots, 255 usable bytes).
pub const DEFAULT_RECV_SIZE: usize = 256;

/// Default transmit ring size (2^8 slots, 255 usable bytes).
pub const DEFAULT_SEND_SIZE: usize = 256;

/// Default baud rate recorded in [`ChannelConfig`].
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
