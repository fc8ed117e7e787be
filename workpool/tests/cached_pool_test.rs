// Integration tests for the cached regime: demand-driven growth, the
// worker ceiling, and idle retirement back to the initial count.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use workpool::{logging, PoolConfig, PoolMode, TaskValue, ThreadPool};

/// Polls `probe` until it holds or `deadline` elapses.
fn wait_until(deadline: Duration, mut probe: impl FnMut() -> bool) -> bool {
    let started = Instant::now();
    while started.elapsed() < deadline {
        if probe() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    probe()
}

fn sleeper(millis: u64) -> Arc<dyn workpool::Task> {
    Arc::new(move || {
        thread::sleep(Duration::from_millis(millis));
        TaskValue::new(())
    })
}

#[test]
fn backlog_grows_the_worker_set() {
    logging::init_test();
    let pool = ThreadPool::with_config(PoolConfig {
        mode: PoolMode::Cached,
        worker_ceiling: 8,
        ..PoolConfig::default()
    });
    pool.start_with(2);

    let results: Vec<_> = (0..6u64)
        .map(|i| {
            pool.submit(Arc::new(move || {
                thread::sleep(Duration::from_millis(600));
                TaskValue::new(i)
            }))
        })
        .collect();

    // With both initial workers busy, further submissions spawn help.
    assert!(wait_until(Duration::from_secs(1), || {
        pool.metrics().worker_count >= 3
    }));
    assert!(pool.metrics().worker_count <= 8);

    let sum: u64 = results
        .into_iter()
        .map(|result| result.get().cast::<u64>().unwrap())
        .sum();
    assert_eq!(sum, 15);
}

#[test]
fn worker_count_never_exceeds_the_ceiling() {
    let pool = ThreadPool::with_config(PoolConfig {
        mode: PoolMode::Cached,
        worker_ceiling: 3,
        ..PoolConfig::default()
    });
    pool.start_with(1);

    let results: Vec<_> = (0..10).map(|_| pool.submit(sleeper(200))).collect();
    assert!(pool.metrics().worker_count <= 3);

    for result in results {
        assert!(result.is_valid());
        result.get();
    }
    assert!(pool.metrics().worker_count <= 3);
}

#[test]
fn surplus_workers_retire_after_idling() {
    logging::init_test();
    let pool = ThreadPool::with_config(PoolConfig {
        mode: PoolMode::Cached,
        worker_ceiling: 8,
        idle_timeout: Duration::from_millis(500),
        ..PoolConfig::default()
    });
    pool.start_with(2);

    let results: Vec<_> = (0..6).map(|_| pool.submit(sleeper(400))).collect();
    for result in results {
        result.get();
    }
    assert!(pool.metrics().worker_count > 2);

    // Workers tick once a second, so retirement lands within a few ticks
    // of the idle threshold.
    assert!(wait_until(Duration::from_secs(4), || {
        pool.metrics().worker_count == 2
    }));
    assert_eq!(pool.metrics().idle_workers, 2);
}

#[test]
fn queueing_continues_once_the_ceiling_is_reached() {
    let pool = ThreadPool::with_config(PoolConfig {
        mode: PoolMode::Cached,
        worker_ceiling: 2,
        ..PoolConfig::default()
    });
    pool.start_with(2);

    // Six tasks on two non-growable workers: the surplus queues up.
    let results: Vec<_> = (0..6).map(|_| pool.submit(sleeper(150))).collect();
    assert_eq!(pool.metrics().worker_count, 2);

    for result in results {
        assert!(result.is_valid());
        result.get();
    }
}
