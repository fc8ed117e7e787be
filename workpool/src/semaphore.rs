use std::sync::{Condvar, Mutex};

/// A counting semaphore built on a mutex and condition variable.
///
/// The pool uses it with an initial count of zero and a single post/wait
/// pair, as a one-shot completion signal between a worker and a submitter.
#[derive(Debug)]
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Blocks until a permit is available, then takes it.
    pub fn wait(&self) {
        let mut permits = self.permits.lock().unwrap();
        while *permits == 0 {
            permits = self.available.wait(permits).unwrap();
        }
        *permits -= 1;
    }

    /// Releases one permit and wakes waiters.
    pub fn post(&self) {
        let mut permits = self.permits.lock().unwrap();
        *permits += 1;
        self.available.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn wait_consumes_existing_permit() {
        let sem = Semaphore::new(2);
        sem.wait();
        sem.wait();
        sem.post();
        sem.wait();
    }

    #[test]
    fn wait_blocks_until_post() {
        let sem = Arc::new(Semaphore::new(0));
        let poster = Arc::clone(&sem);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            poster.post();
        });

        // Returns only once the other thread posts.
        sem.wait();
        handle.join().unwrap();
    }

    #[test]
    fn post_before_wait_is_not_lost() {
        let sem = Arc::new(Semaphore::new(0));
        sem.post();
        sem.wait();
    }
}
