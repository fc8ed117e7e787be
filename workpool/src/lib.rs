// Workpool: an elastic worker pool.
//
// Tasks are submitted by shared ownership and dispatched across a managed
// set of OS worker threads. The pool runs in one of two regimes: fixed
// (constant worker count from start-up) or cached (grows on demand up to a
// ceiling, retires workers after an idle period). Each submission returns a
// `TaskResult` handle through which the submitter blocks for the produced
// value.

pub mod config;
pub mod error;
pub mod logging;
pub mod pool;
pub mod result;
pub mod semaphore;
pub mod task;

mod worker;

// Re-export the user-facing surface
pub use config::{PoolConfig, PoolMode};
pub use error::CastError;
pub use pool::{PoolMetrics, ThreadPool};
pub use result::TaskResult;
pub use task::{Task, TaskValue};
