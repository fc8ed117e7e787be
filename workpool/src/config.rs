use std::time::Duration;

/// Determines how the pool provisions worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolMode {
    /// A constant number of workers, created at start-up.
    Fixed,
    /// Workers are added on demand up to a ceiling and retired after an
    /// idle period, never dropping below the initial count.
    Cached,
}

/// Upper bound on queued tasks unless overridden.
pub const DEFAULT_QUEUE_BOUND: usize = i32::MAX as usize;

/// Upper bound on concurrent workers in cached mode unless overridden.
pub const DEFAULT_WORKER_CEILING: usize = 1024;

/// How long a surplus cached worker must sit idle before retiring itself.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2);

/// Longest a submitter blocks waiting for queue space before the
/// submission is rejected.
pub(crate) const SUBMIT_TIMEOUT: Duration = Duration::from_secs(1);

/// Wake-up interval for cached workers waiting on an empty queue, so that
/// idle retirement is evaluated even when no work arrives.
pub(crate) const WORKER_TICK: Duration = Duration::from_secs(1);

/// Configuration for a [`ThreadPool`](crate::ThreadPool).
///
/// All fields are fixed once the pool starts; the pool ignores
/// reconfiguration attempts after that point.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Provisioning regime.
    pub mode: PoolMode,

    /// Maximum number of pending tasks before submitters start to time out.
    pub queue_bound: usize,

    /// Maximum concurrent workers (cached mode only).
    pub worker_ceiling: usize,

    /// Continuous idle duration after which a surplus cached worker retires.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            mode: PoolMode::Fixed,
            queue_bound: DEFAULT_QUEUE_BOUND,
            worker_ceiling: DEFAULT_WORKER_CEILING,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}
