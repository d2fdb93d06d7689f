//! Fixed-size worker pool fed from one FIFO queue.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::{RenderError, RenderResult};

/// A unit of work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    jobs: VecDeque<Job>,
    kill: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Long-lived worker threads pulling jobs in submission order.
///
/// There is no cancellation. Dropping the pool raises the kill flag, lets
/// the workers finish every queued job, then joins them.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Spawn `threads` workers.
    pub fn new(threads: usize) -> RenderResult<Self> {
        if threads == 0 {
            return Err(RenderError::ZeroThreads);
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                kill: false,
            }),
            available: Condvar::new(),
        });

        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(threads),
        };

        for id in 0..threads {
            let shared = Arc::clone(&pool.shared);
            // On failure `pool` drops here and joins the workers already running
            let handle = thread::Builder::new()
                .name(format!("lumen-worker-{id}"))
                .spawn(move || worker_loop(id, &shared))?;
            pool.workers.push(handle);
        }

        log::debug!("Started thread pool with {threads} workers");
        Ok(pool)
    }

    /// Queue a job for the next idle worker.
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.lock().jobs.push_back(Box::new(job));
        self.shared.available.notify_one();
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Jobs queued but not yet picked up.
    pub fn pending(&self) -> usize {
        self.shared.lock().jobs.len()
    }
}

fn worker_loop(id: usize, shared: &Shared) {
    log::debug!("Worker {id} started");

    loop {
        let job = {
            let state = shared.lock();
            let mut state = shared
                .available
                .wait_while(state, |s| s.jobs.is_empty() && !s.kill)
                .unwrap_or_else(PoisonError::into_inner);

            match state.jobs.pop_front() {
                Some(job) => job,
                // Killed and drained
                None => break,
            }
        };

        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            log::error!("Job panicked on worker {id}");
        }
    }

    log::debug!("Worker {id} exiting");
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shared.lock().kill = true;
        self.shared.available.notify_all();

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("Worker thread panicked during shutdown");
            }
        }
    }
}
