use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tokio::time::{self, MissedTickBehavior};
use xserial::{ChannelConfig, EventLoop, LoopbackDevice, Port, RecvHandler, SerialChannel};

const RECV_SIZE: usize = 64;
const SEND_SIZE: usize = 128;
const BAUD_RATE: u32 = 921_600;

const DATA_SIZE: usize = 256 * 1024; // 256 KB
const BURST: usize = 48;
const TICK: Duration = Duration::from_micros(250);
const MAX_IDLE_TICKS: usize = 1000;

type Device = LoopbackDevice<1024, 1024>;
type EchoPort = Port<Device, RECV_SIZE, SEND_SIZE>;

/// Sends every received byte straight back out.
#[derive(Debug, Default)]
struct Echo {
    echoed: usize,
    overruns: usize,
}

impl RecvHandler<Device, RECV_SIZE, SEND_SIZE> for Echo {
    fn data_ready(&mut self, port: &mut EchoPort) {
        let (pending, overrun) = port.recv_query();

        let mut buf = [0u8; RECV_SIZE];
        let room = port.send_query().min(buf.len());
        let n = port.recv_read(&mut buf[..room]);
        port.send_write(&buf[..n]);
        self.echoed += port.send_poke();

        if overrun {
            self.overruns += 1;
            warn!("Receive overrun with {} bytes pending", pending);
            port.recv_clear_overrun();
        }
        // Come back next tick for whatever did not fit.
        if port.recv_query().0 > 0 {
            port.recv_force_event();
        }
    }
}

fn pattern(offset: usize) -> u8 {
    (offset % 251) as u8
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let channel = SerialChannel::new(
        Device::new(),
        Echo::default(),
        ChannelConfig::new().with_baud_rate(BAUD_RATE),
    );

    let mut event_loop: EventLoop<_, 1> = EventLoop::new();
    let id = event_loop.register(channel).expect("Failed to register channel");
    event_loop
        .task_mut(id)
        .expect("Channel not registered")
        .init();

    let mut interval = time::interval(TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

    info!("Echoing {} KB through the channel...", DATA_SIZE / 1024);
    let start = Instant::now();

    let mut sent = 0;
    let mut verified = 0;
    let mut mismatches = 0;
    let mut idle_ticks = 0;
    let mut out = [0u8; 1024];

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while verified < DATA_SIZE && idle_ticks < MAX_IDLE_TICKS {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        }

        let channel = event_loop.task_mut(id).expect("Channel not registered");

        // Feed the wire.
        let burst: Vec<u8> = (sent..(sent + BURST).min(DATA_SIZE)).map(pattern).collect();
        sent += channel.device_mut().inject(&burst);

        event_loop.run_once();

        // Check what came back.
        let channel = event_loop.task_mut(id).expect("Channel not registered");
        let n = channel.device_mut().drain(&mut out);
        for &byte in &out[..n] {
            if byte != pattern(verified) {
                mismatches += 1;
            }
            verified += 1;
        }

        if n == 0 {
            idle_ticks += 1;
        } else {
            idle_ticks = 0;
        }
        if verified > 0 && verified % (64 * 1024) == 0 {
            debug!("Progress: {}/{} bytes echoed", verified, DATA_SIZE);
        }
    }

    let elapsed = start.elapsed();
    let mut channel = event_loop.deregister(id).expect("Channel not registered");
    channel.deinit();

    let stats = *channel.stats();
    let speed = (verified as f64 / 1024.0) / elapsed.as_secs_f64();

    info!("=== Echo Complete ===");
    info!("Total echoed: {} KB", verified / 1024);
    info!("Mismatched bytes: {}", mismatches);
    info!(
        "Ticks: {}, notifications: {}, overruns: {}",
        stats.ticks,
        stats.notifications,
        channel.handler().overruns
    );
    info!("Bytes in: {}, bytes out: {}", stats.bytes_received, stats.bytes_sent);
    info!("Handler echoed: {} bytes", channel.handler().echoed);
    info!("Time: {:.2} seconds", elapsed.as_secs_f64());
    info!("Speed: {:.2} KB/s", speed);
}
