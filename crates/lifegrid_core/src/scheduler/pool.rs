//! # Bounded Worker Pool
//!
//! A fixed set of threads draining a shared job channel.
//!
//! ```text
//!   submit ──┐
//!   submit ──┼──> [crossbeam channel] ──> worker 0..T ──> job()
//!   submit ──┘
//! ```
//!
//! The burst-parallel strategy pushes n² short jobs through this pool every
//! tick instead of creating n² OS threads. Jobs are expected to catch their
//! own panics; a panicking job would take its worker thread down with it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use crate::error::{LifeError, LifeResult};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size thread pool.
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    live: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Starts `threads` workers named `{name}-{i}`.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::Spawn`] if a thread cannot be started; any
    /// workers already running are stopped first.
    ///
    /// # Panics
    ///
    /// Panics if `threads` is zero.
    pub fn new(threads: usize, name: &str) -> LifeResult<Self> {
        assert!(threads > 0, "WorkerPool needs at least one thread");

        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let mut pool = Self {
            sender: Some(sender),
            workers: Vec::with_capacity(threads),
            live: Arc::new(AtomicUsize::new(0)),
        };

        for i in 0..threads {
            let receiver = receiver.clone();
            let live = Arc::clone(&pool.live);
            live.fetch_add(1, Ordering::AcqRel);
            let spawned = thread::Builder::new()
                .name(format!("{name}-{i}"))
                .spawn(move || run_worker(&receiver, &live));
            match spawned {
                Ok(handle) => pool.workers.push(handle),
                Err(err) => {
                    pool.live.fetch_sub(1, Ordering::AcqRel);
                    pool.shutdown();
                    return Err(LifeError::Spawn(err.to_string()));
                }
            }
        }

        tracing::debug!(threads, name, "worker pool started");
        Ok(pool)
    }

    /// Number of pool threads.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Number of pool threads still running.
    #[inline]
    #[must_use]
    pub fn live_workers(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Queues a job.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::InvalidState`] after [`shutdown`](Self::shutdown).
    pub fn execute<F>(&self, job: F) -> LifeResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self
            .sender
            .as_ref()
            .ok_or(LifeError::InvalidState("worker pool has been shut down"))?;
        sender
            .send(Box::new(job))
            .map_err(|_| LifeError::InvalidState("worker pool has no live workers"))
    }

    /// Closes the queue and joins every worker. Queued jobs still run.
    /// Idempotent.
    pub fn shutdown(&mut self) {
        drop(self.sender.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("pool worker exited by panic");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(receiver: &Receiver<Job>, live: &AtomicUsize) {
    struct LiveGuard<'a>(&'a AtomicUsize);
    impl Drop for LiveGuard<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::AcqRel);
        }
    }

    let _guard = LiveGuard(live);
    while let Ok(job) = receiver.recv() {
        job();
    }
}
