use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::{PoolConfig, PoolMode, SUBMIT_TIMEOUT, WORKER_TICK};
use crate::result::{Completion, TaskResult};
use crate::task::{Task, TaskValue};
use crate::worker::Worker;

/// A queued task paired with the completion channel its submitter holds.
struct Job {
    task: Arc<dyn Task>,
    completion: Arc<Completion>,
}

impl Job {
    fn new(task: Arc<dyn Task>, completion: Arc<Completion>) -> Self {
        Self { task, completion }
    }

    /// Runs the task and delivers its value. A panicking task is caught and
    /// completed with the empty sentinel so the submitter cannot block
    /// forever on a signal that will never arrive.
    fn execute(self, worker_id: usize) {
        let value = match panic::catch_unwind(AssertUnwindSafe(|| self.task.run())) {
            Ok(value) => value,
            Err(payload) => {
                error!(worker = worker_id, "task panicked: {}", panic_message(payload));
                TaskValue::empty()
            }
        };
        self.completion.complete(value);
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&str>() {
            Ok(message) => (*message).to_string(),
            Err(_) => String::from("unknown panic"),
        },
    }
}

// Queue, registry and configuration snapshot, all guarded by the one pool
// mutex. Configuration fields are written only before the workers exist.
struct PoolState {
    queue: VecDeque<Job>,
    workers: HashMap<usize, Worker>,
    mode: PoolMode,
    queue_bound: usize,
    worker_ceiling: usize,
    idle_timeout: Duration,
    initial_workers: usize,
}

/// Shared pool core; worker threads hold an `Arc` to it.
pub(crate) struct PoolInner {
    state: Mutex<PoolState>,

    /// Signals submitters waiting for queue space.
    not_full: Condvar,

    /// Signals workers waiting for queued tasks.
    not_empty: Condvar,

    /// Signals the destructor once the worker registry has emptied.
    all_exited: Condvar,

    running: AtomicBool,

    // Scaling hints, readable without the lock; briefly stale values are
    // tolerated by the policy.
    pending_tasks: AtomicUsize,
    idle_workers: AtomicUsize,
    worker_count: AtomicUsize,
}

/// Point-in-time counters for the pool, read without taking the queue lock.
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    /// Workers currently registered.
    pub worker_count: usize,

    /// Workers not executing a task right now.
    pub idle_workers: usize,

    /// Tasks waiting in the queue.
    pub pending_tasks: usize,

    /// Whether the pool has started and not yet shut down.
    pub running: bool,
}

/// An elastic pool of OS worker threads.
///
/// Tasks go in through [`submit`](ThreadPool::submit) and results come back
/// through the returned [`TaskResult`] handle. The pool runs in one of two
/// regimes:
///
/// - [`PoolMode::Fixed`]: the worker count chosen at start-up never changes.
/// - [`PoolMode::Cached`]: a submission that would otherwise wait for an
///   idle worker spawns a new one, up to the ceiling; workers idle past the
///   configured threshold retire until the initial count is reached again.
///
/// Dropping the pool shuts it down: queued tasks are drained, workers run to
/// completion, and the destructor returns only after every worker has
/// deregistered itself.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use workpool::{TaskValue, ThreadPool};
///
/// let pool = ThreadPool::new();
/// pool.start_with(2);
/// let result = pool.submit(Arc::new(|| TaskValue::new(21u64 * 2)));
/// assert_eq!(result.get().cast::<u64>(), Ok(42));
/// ```
pub struct ThreadPool {
    inner: Arc<PoolInner>,
}

impl ThreadPool {
    /// Creates a stopped pool with the default configuration.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Creates a stopped pool from `config`. Equivalent to `new` followed by
    /// the corresponding setters.
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                state: Mutex::new(PoolState {
                    queue: VecDeque::new(),
                    workers: HashMap::new(),
                    mode: config.mode,
                    queue_bound: config.queue_bound,
                    worker_ceiling: config.worker_ceiling,
                    idle_timeout: config.idle_timeout,
                    initial_workers: 0,
                }),
                not_full: Condvar::new(),
                not_empty: Condvar::new(),
                all_exited: Condvar::new(),
                running: AtomicBool::new(false),
                pending_tasks: AtomicUsize::new(0),
                idle_workers: AtomicUsize::new(0),
                worker_count: AtomicUsize::new(0),
            }),
        }
    }

    /// Selects the provisioning regime. Ignored once the pool has started.
    pub fn set_mode(&self, mode: PoolMode) {
        if self.inner.running.load(Ordering::SeqCst) {
            debug!("pool already running, set_mode ignored");
            return;
        }
        self.inner.state.lock().unwrap().mode = mode;
    }

    /// Caps the number of queued tasks. Ignored once the pool has started.
    pub fn set_queue_bound(&self, bound: usize) {
        if self.inner.running.load(Ordering::SeqCst) {
            debug!("pool already running, set_queue_bound ignored");
            return;
        }
        self.inner.state.lock().unwrap().queue_bound = bound;
    }

    /// Caps the worker count in cached mode. Ignored once the pool has
    /// started, and ignored entirely outside cached mode.
    pub fn set_worker_ceiling(&self, ceiling: usize) {
        if self.inner.running.load(Ordering::SeqCst) {
            debug!("pool already running, set_worker_ceiling ignored");
            return;
        }
        let mut state = self.inner.state.lock().unwrap();
        if state.mode == PoolMode::Cached {
            state.worker_ceiling = ceiling;
        }
    }

    /// Starts the pool with one worker per hardware thread.
    pub fn start(&self) {
        self.start_with(num_cpus::get());
    }

    /// Starts the pool with `initial_workers` workers.
    ///
    /// In cached mode `initial_workers` is also the floor the pool shrinks
    /// back to when load subsides. Starting an already-running pool is
    /// ignored.
    pub fn start_with(&self, initial_workers: usize) {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            warn!("pool already started, ignoring");
            return;
        }

        let mut state = self.inner.state.lock().unwrap();
        state.initial_workers = initial_workers;

        let mut started = 0;
        for _ in 0..initial_workers {
            let worker = Worker::new();
            match worker.start(Arc::clone(&self.inner)) {
                Ok(()) => {
                    state.workers.insert(worker.id(), worker);
                    started += 1;
                }
                Err(err) => error!("failed to spawn worker: {err}"),
            }
        }

        self.inner.worker_count.store(started, Ordering::SeqCst);
        self.inner.idle_workers.store(started, Ordering::SeqCst);
        info!(workers = started, mode = ?state.mode, "pool started");
    }

    /// Submits a task for execution and returns the handle for its result.
    ///
    /// Blocks for up to one second when the queue is at its bound; if space
    /// does not open up in time the submission is rejected and the returned
    /// handle is invalid ([`TaskResult::is_valid`] is false and `get`
    /// yields the empty sentinel immediately).
    ///
    /// Tasks submitted before [`start`](ThreadPool::start) are queued and
    /// execute once the pool starts.
    pub fn submit(&self, task: Arc<dyn Task>) -> TaskResult {
        let inner = &self.inner;
        let state = inner.state.lock().unwrap();

        // Bounded wait for queue space; each submitter gets its own timer.
        let (mut state, timeout) = inner
            .not_full
            .wait_timeout_while(state, SUBMIT_TIMEOUT, |s| s.queue.len() >= s.queue_bound)
            .unwrap();
        if timeout.timed_out() && state.queue.len() >= state.queue_bound {
            drop(state);
            warn!("task queue is full, submission rejected");
            return TaskResult::rejected();
        }

        let completion = Arc::new(Completion::new());
        state.queue.push_back(Job::new(task, Arc::clone(&completion)));
        inner.pending_tasks.fetch_add(1, Ordering::SeqCst);
        inner.not_empty.notify_all();

        // Elastic scaling: a task only waits when no idle worker can take
        // it, so backlog beyond the idle count spawns one more worker, up
        // to the ceiling.
        if state.mode == PoolMode::Cached {
            let pending = inner.pending_tasks.load(Ordering::Relaxed);
            let idle = inner.idle_workers.load(Ordering::Relaxed);
            let count = inner.worker_count.load(Ordering::Relaxed);
            if pending > idle && count < state.worker_ceiling {
                let worker = Worker::new();
                debug!(worker = worker.id(), "backlog exceeds idle workers, spawning");
                match worker.start(Arc::clone(inner)) {
                    Ok(()) => {
                        state.workers.insert(worker.id(), worker);
                        inner.worker_count.fetch_add(1, Ordering::SeqCst);
                        inner.idle_workers.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(err) => error!("failed to spawn worker: {err}"),
                }
            }
        }

        TaskResult::bound(completion)
    }

    /// Snapshot of the pool counters.
    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            worker_count: self.inner.worker_count.load(Ordering::Relaxed),
            idle_workers: self.inner.idle_workers.load(Ordering::Relaxed),
            pending_tasks: self.inner.pending_tasks.load(Ordering::Relaxed),
            running: self.inner.running.load(Ordering::Relaxed),
        }
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ThreadPool {
    /// Shuts the pool down, blocking until every worker has deregistered.
    ///
    /// Workers only observe the stop flag on an empty queue, so anything
    /// still queued is drained before the last worker exits.
    fn drop(&mut self) {
        self.inner.running.store(false, Ordering::SeqCst);

        let mut state = self.inner.state.lock().unwrap();
        self.inner.not_empty.notify_all();
        while !state.workers.is_empty() {
            state = self.inner.all_exited.wait(state).unwrap();
        }
        debug!("pool shut down, all workers exited");
    }
}

impl PoolInner {
    /// The dispatch loop every worker thread runs.
    pub(crate) fn dispatch_loop(self: Arc<Self>, worker_id: usize) {
        debug!(worker = worker_id, "worker online");
        let mut last_active = Instant::now();

        loop {
            let job = {
                let mut state = self.state.lock().unwrap();

                while state.queue.is_empty() {
                    // Shutdown wins over idle retirement.
                    if !self.running.load(Ordering::SeqCst) {
                        state.workers.remove(&worker_id);
                        self.all_exited.notify_all();
                        debug!(worker = worker_id, "worker exiting on shutdown");
                        return;
                    }

                    match state.mode {
                        PoolMode::Cached => {
                            let (guard, timeout) =
                                self.not_empty.wait_timeout(state, WORKER_TICK).unwrap();
                            state = guard;
                            // Surplus workers idle past the threshold retire,
                            // but never below the initial count.
                            if timeout.timed_out()
                                && last_active.elapsed() >= state.idle_timeout
                                && self.worker_count.load(Ordering::SeqCst) > state.initial_workers
                            {
                                state.workers.remove(&worker_id);
                                self.worker_count.fetch_sub(1, Ordering::SeqCst);
                                self.idle_workers.fetch_sub(1, Ordering::SeqCst);
                                debug!(worker = worker_id, "idle worker retiring");
                                return;
                            }
                        }
                        PoolMode::Fixed => {
                            state = self.not_empty.wait(state).unwrap();
                        }
                    }
                }

                self.idle_workers.fetch_sub(1, Ordering::SeqCst);
                let job = state.queue.pop_front();
                self.pending_tasks.fetch_sub(1, Ordering::SeqCst);

                // Other workers may still have tasks to pick up, and a
                // dequeue always frees queue space for submitters.
                if !state.queue.is_empty() {
                    self.not_empty.notify_all();
                }
                self.not_full.notify_all();

                job
            };

            // The lock is released while the task runs.
            if let Some(job) = job {
                job.execute(worker_id);
            }

            self.idle_workers.fetch_add(1, Ordering::SeqCst);
            last_active = Instant::now();
        }
    }
}
