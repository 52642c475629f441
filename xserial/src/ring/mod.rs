//! Channel rings.
//!
//! This module provides the two buffers a channel owns:
//! - ReceiveRing: Mirrored ring filled from the device, read as one contiguous slice
//! - TransmitRing: Ring written in contiguous chunks, drained to the device on poke

mod receive;
mod transmit;

pub use receive::ReceiveRing;
pub use transmit::TransmitRing;
