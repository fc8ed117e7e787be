use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crate::pool::PoolInner;

// Pool-assigned worker ids, monotonically increasing for the lifetime of
// the process. Workers use their id to erase themselves from the registry.
static NEXT_WORKER_ID: AtomicUsize = AtomicUsize::new(0);

/// Registry record for one worker thread.
///
/// The OS thread itself is detached at launch; the pool tracks lifetime
/// through the registry and the exit condition instead of join handles.
#[derive(Debug)]
pub(crate) struct Worker {
    id: usize,
}

impl Worker {
    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    /// Launches the dispatch loop on a named, detached OS thread.
    pub(crate) fn start(&self, pool: Arc<PoolInner>) -> io::Result<()> {
        let id = self.id;
        thread::Builder::new()
            .name(format!("workpool-worker-{id}"))
            .spawn(move || pool.dispatch_loop(id))
            .map(drop)
    }
}
