// Watches a cached pool grow under backlog and shrink back to its initial
// size once the work dries up.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use workpool::{logging, PoolConfig, PoolMode, TaskValue, ThreadPool};

fn main() {
    logging::init_development();

    let pool = ThreadPool::with_config(PoolConfig {
        mode: PoolMode::Cached,
        worker_ceiling: 8,
        ..PoolConfig::default()
    });
    pool.start_with(2);

    let results: Vec<_> = (0..6)
        .map(|i| {
            pool.submit(Arc::new(move || {
                thread::sleep(Duration::from_secs(3));
                TaskValue::new(i)
            }))
        })
        .collect();

    for _ in 0..4 {
        thread::sleep(Duration::from_millis(500));
        println!("{:?}", pool.metrics());
    }

    for (i, result) in results.into_iter().enumerate() {
        assert_eq!(result.get().cast::<i32>().unwrap(), i as i32);
    }

    // Idle long enough for the surplus workers to retire.
    thread::sleep(Duration::from_secs(5));
    println!("after idle: {:?}", pool.metrics());
}
