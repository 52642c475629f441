#![cfg(test)]
//! Property tests for ring invariants.
//!
//! A reference model (plain `VecDeque`) tracks what each ring should hold;
//! random operation sequences check the rings never drift from it.

use std::collections::VecDeque;
use std::vec::Vec;

use proptest::prelude::*;

use crate::device::{LoopbackDevice, RawDevice};
use crate::index::Index;
use crate::ring::{ReceiveRing, TransmitRing};

#[derive(Debug, Clone)]
enum RecvOp {
    Inject(Vec<u8>),
    Fill,
    Consume(usize),
    ClearOverrun,
}

fn arb_recv_op() -> impl Strategy<Value = RecvOp> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..24).prop_map(RecvOp::Inject),
        Just(RecvOp::Fill),
        (0usize..20).prop_map(RecvOp::Consume),
        Just(RecvOp::ClearOverrun),
    ]
}

#[derive(Debug, Clone)]
enum SendOp {
    Chunk(usize, u8),
    Poke,
}

fn arb_send_op() -> impl Strategy<Value = SendOp> {
    prop_oneof![
        3 => (0usize..24, any::<u8>()).prop_map(|(len, seed)| SendOp::Chunk(len, seed)),
        1 => Just(SendOp::Poke),
    ]
}

proptest! {
    #[test]
    fn index_advance_and_distance_agree(start in 0usize..16, amount in 0usize..64) {
        let a = Index::<16>::new(start);
        let b = a.advance(amount);
        prop_assert_eq!(a.distance_to(b), amount % 16);
        prop_assert_eq!(b.value(), (start + amount) % 16);
    }

    #[test]
    fn receive_ring_matches_model(ops in prop::collection::vec(arb_recv_op(), 1..80)) {
        let mut ring: ReceiveRing<16> = ReceiveRing::new();
        let mut device: LoopbackDevice<512, 8> = LoopbackDevice::new();
        let mut model: VecDeque<u8> = VecDeque::new();
        let mut in_flight: VecDeque<u8> = VecDeque::new();

        for op in ops {
            match op {
                RecvOp::Inject(bytes) => {
                    let n = device.inject(&bytes);
                    in_flight.extend(&bytes[..n]);
                }
                RecvOp::Fill => {
                    let was_overrun = ring.is_overrun();
                    let pulled = ring.fill(&mut device);
                    if was_overrun {
                        prop_assert_eq!(pulled, 0);
                    }
                    model.extend(in_flight.drain(..pulled));
                }
                RecvOp::Consume(k) => {
                    let k = k.min(model.len());
                    ring.consume(k);
                    model.drain(..k);
                }
                RecvOp::ClearOverrun => {
                    if ring.is_overrun() {
                        ring.clear_overrun();
                    }
                }
            }

            let (len, overrun) = ring.query();
            prop_assert_eq!(ring.query(), (len, overrun));
            prop_assert!(len <= 15);
            prop_assert_eq!(len, model.len());
            prop_assert_eq!(ring.pending(), &model.iter().copied().collect::<Vec<u8>>()[..]);
            prop_assert_eq!(device.available(), in_flight.len());
        }
    }

    #[test]
    fn transmit_ring_preserves_stream(ops in prop::collection::vec(arb_send_op(), 1..80)) {
        let mut ring: TransmitRing<16> = TransmitRing::new();
        let mut device: LoopbackDevice<8, 4096> = LoopbackDevice::new();
        let mut expected: Vec<u8> = Vec::new();

        for op in ops {
            match op {
                SendOp::Chunk(requested, seed) => {
                    let free = ring.query();
                    let len = ring.chunk_len(requested);
                    prop_assert!(len <= requested);
                    prop_assert!(len <= free);

                    let chunk = ring.chunk_mut(requested);
                    prop_assert_eq!(chunk.len(), len);
                    for (i, b) in chunk.iter_mut().enumerate() {
                        *b = seed.wrapping_add(i as u8);
                    }
                    expected.extend(chunk.iter());
                    ring.provide(len);
                    prop_assert_eq!(ring.query(), free - len);
                }
                SendOp::Poke => {
                    let pending = ring.pending();
                    prop_assert_eq!(ring.poke(&mut device), pending);
                    prop_assert!(ring.is_empty());
                }
            }
            prop_assert_eq!(ring.query() + ring.pending(), 15);
        }

        ring.poke(&mut device);
        let mut out = std::vec![0u8; device.outbound_len()];
        device.drain(&mut out);
        prop_assert_eq!(out, expected);
    }
}
