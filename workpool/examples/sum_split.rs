// Splits a large summation into ranges, runs each range as a pool task,
// and adds the partial sums on the submitting thread.

use std::sync::Arc;

use workpool::{logging, PoolMode, Task, TaskValue, ThreadPool};

struct RangeSum {
    begin: u64,
    end: u64,
}

impl Task for RangeSum {
    fn run(&self) -> TaskValue {
        let mut sum: u64 = 0;
        for i in self.begin..=self.end {
            sum += i;
        }
        TaskValue::new(sum)
    }
}

fn main() {
    logging::init_default();

    let pool = ThreadPool::new();
    pool.set_mode(PoolMode::Cached);
    pool.start_with(4);

    let first = pool.submit(Arc::new(RangeSum {
        begin: 1,
        end: 100_000_000,
    }));
    let second = pool.submit(Arc::new(RangeSum {
        begin: 100_000_001,
        end: 200_000_000,
    }));
    let third = pool.submit(Arc::new(RangeSum {
        begin: 200_000_001,
        end: 300_000_000,
    }));

    let total = first.get().cast::<u64>().unwrap()
        + second.get().cast::<u64>().unwrap()
        + third.get().cast::<u64>().unwrap();
    println!("sum(1..=300000000) = {total}");
}
