use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use rand_core::{OsRng, RngCore};

use antireplay::application::{ApplicationLayer, Settings};
use antireplay::result::{FaultType, ReplayError};
use antireplay::{ReplayGuard, SlidingWindowFilter};
use antireplay_reference::ReferenceFilter;

const BATCH: usize = 4096;
const SIZES: [u64; 5] = [64, 256, 1024, 8192, 65536];

struct TestApplication {
    accepted: u64,
    duplicates: u64,
    expired: u64,
}

impl ApplicationLayer for TestApplication {
    const SETTINGS: Settings = Settings::with_window_size(1024);
}

/// A counter stream as a lossy, reordering, duplicating link would deliver it.
fn gen_batch(rng: &mut OsRng, next: &mut u64, out: &mut Vec<u64>) {
    out.clear();
    for _ in 0..BATCH {
        let r = rng.next_u32();
        match r % 32 {
            // Dropped.
            0 => *next += 1,
            // Duplicated.
            1 => out.push(next.saturating_sub(1)),
            // Late by up to 2047 positions.
            2 => out.push(next.saturating_sub((r >> 5) as u64 % 2048)),
            _ => {
                out.push(*next);
                *next += 1;
            }
        }
    }
}

fn raw_throughput(time: Duration) {
    let mut rng = OsRng;
    let mut batch = Vec::with_capacity(BATCH);
    for size in SIZES {
        let mut next = 0;
        let mut ring = SlidingWindowFilter::new(size);
        let mut reference = ReferenceFilter::new(size as usize);

        let mut ring_time = Duration::ZERO;
        let mut reference_time = Duration::ZERO;
        let mut checked = 0u64;
        while ring_time + reference_time < time {
            gen_batch(&mut rng, &mut next, &mut batch);

            let start = Instant::now();
            let ring_accepted = batch.iter().filter(|&&c| ring.add(c)).count();
            ring_time += start.elapsed();

            let start = Instant::now();
            let reference_accepted = batch.iter().filter(|&&c| reference.add(c)).count();
            reference_time += start.elapsed();

            assert_eq!(ring_accepted, reference_accepted);
            checked += batch.len() as u64;
        }
        println!(
            "[raw] size {:>6}: ring {:>8.2} Mcounters/sec, reference {:>8.2} Mcounters/sec",
            size,
            checked as f64 / ring_time.as_secs_f64() / 1e6,
            checked as f64 / reference_time.as_secs_f64() / 1e6,
        );
    }
}

fn sender_main(run: &AtomicBool, out: mpsc::SyncSender<Vec<u64>>) {
    let mut rng = OsRng;
    let mut next = 0;
    while run.load(Ordering::Relaxed) {
        let mut batch = Vec::with_capacity(BATCH);
        gen_batch(&mut rng, &mut next, &mut batch);
        if out.send(batch).is_err() {
            break;
        }
    }
}

fn receiver_main(run: &AtomicBool, guard: &ReplayGuard, app: &mut TestApplication, input: mpsc::Receiver<Vec<u64>>) {
    let startup_time = Instant::now();
    let mut last_speed_metric = Duration::ZERO;
    let mut received = 0u64;

    while run.load(Ordering::Relaxed) {
        let Ok(batch) = input.recv_timeout(Duration::from_millis(100)) else {
            continue;
        };
        for c in batch {
            // The pre-authentication check would normally happen before decryption.
            if guard.check(c).is_err() {
                app.duplicates += 1;
                continue;
            }
            match guard.update(app, c) {
                Ok(()) => app.accepted += 1,
                Err(e @ ReplayError::ByzantineFault { .. }) => match e.fault_type() {
                    FaultType::DuplicateCounter => app.duplicates += 1,
                    FaultType::ExpiredCounter => app.expired += 1,
                },
            }
            received += 1;
        }

        let elapsed = startup_time.elapsed();
        if elapsed - last_speed_metric >= Duration::from_secs(1) {
            println!(
                "[receiver] {:.2} Mcounters/sec, last {}",
                received as f64 / (elapsed - last_speed_metric).as_secs_f64() / 1e6,
                guard.last()
            );
            last_speed_metric = elapsed;
            received = 0;
        }
    }
}

fn core(time: u64) {
    raw_throughput(Duration::from_millis(time * 100));

    let run = &AtomicBool::new(true);
    let guard = Arc::new(ReplayGuard::for_app::<TestApplication>());
    let mut app = TestApplication { accepted: 0, duplicates: 0, expired: 0 };
    let (out, input) = mpsc::sync_channel::<Vec<u64>>(64);

    thread::scope(|ts| {
        ts.spawn(move || sender_main(run, out));
        let guard = guard.clone();
        let app = &mut app;
        ts.spawn(move || receiver_main(run, &guard, app, input));

        thread::sleep(Duration::from_secs(time));

        run.store(false, Ordering::SeqCst);
        println!("finished");
    });
    println!(
        "[receiver] accepted {}, duplicate {}, expired {}",
        app.accepted, app.duplicates, app.expired
    );
    assert!(app.accepted > 0);
}

fn main() {
    core(20)
}

#[test]
fn test_main() {
    core(2)
}
