//! Fixed-size worker pool executing tasks on dedicated OS threads,
//! grounded on the thread-plus-`crossbeam::channel` wiring of
//! `anni_playback::player::AnniPlayer` (one long-lived decoder thread fed
//! over a channel, torn down through a killer sender). Generalized here
//! to N worker threads pulling from a shared job queue instead of one
//! fixed decoder thread.

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};
use mtag_error::MtagError;
use once_cell::sync::OnceCell;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use std::time::Duration;

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Run(Job),
    Terminate,
}

/// A pool of `size` worker threads, each pulling jobs off one shared
/// channel until told to terminate.
pub struct WorkerPool {
    sender: Sender<Message>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (sender, receiver) = bounded::<Message>(size * 4);
        let mut handles = Vec::with_capacity(size);

        for index in 0..size {
            let receiver: Receiver<Message> = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("mtag-worker-{index}"))
                .spawn(move || loop {
                    match receiver.recv() {
                        Ok(Message::Run(job)) => {
                            if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(job)) {
                                log::error!("worker task panicked: {panic:?}");
                            }
                        }
                        Ok(Message::Terminate) | Err(_) => break,
                    }
                })
                .expect("failed to spawn worker thread");
            handles.push(handle);
        }

        WorkerPool { sender, handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Enqueues `task` without blocking the caller, returning the channel
    /// its result will arrive on. The pool's fixed thread count is the only
    /// concurrency bound; a caller that wants at most `N` tasks in flight
    /// submits through a pool sized to `N`.
    fn submit<F, T>(&self, task: F) -> Receiver<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = bounded(1);
        let job: Job = Box::new(move || {
            let _ = result_tx.send(task());
        });
        let _ = self.sender.send(Message::Run(job));
        result_rx
    }

    /// Runs `task` on the pool, blocking the caller until it completes or
    /// `timeout` elapses. A timeout leaves the task running to
    /// completion in the background; the pool's result channel slot is
    /// simply not waited on further.
    pub fn run<F, T>(&self, timeout: Duration, task: F) -> Result<T, MtagError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let rx = self.submit(task);
        Self::await_result(rx, timeout)
    }

    /// Submits every job in `jobs` up front, then collects results in
    /// submission order. Since the pool's thread count caps how many run
    /// at once, this is the bounded-concurrency primitive every batch
    /// caller builds on: a pool of size `N` never runs more than `N` of
    /// `jobs` simultaneously, regardless of how many are queued.
    pub fn run_many<F, T>(&self, timeout: Duration, jobs: Vec<F>) -> Vec<Result<T, MtagError>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let receivers: Vec<Receiver<T>> = jobs.into_iter().map(|job| self.submit(job)).collect();
        receivers.into_iter().map(|rx| Self::await_result(rx, timeout)).collect()
    }

    fn await_result<T>(rx: Receiver<T>, timeout: Duration) -> Result<T, MtagError> {
        match rx.recv_timeout(timeout) {
            Ok(value) => Ok(value),
            Err(RecvTimeoutError::Timeout) => Err(MtagError::Worker {
                message: format!("task did not complete within {:?}", timeout),
            }),
            Err(RecvTimeoutError::Disconnected) => Err(MtagError::Worker {
                message: "worker task dropped its result sender".to_string(),
            }),
        }
    }

    /// Signals every worker thread to stop after its current job and
    /// joins them. Safe to call more than once; subsequent calls are
    /// no-ops since the handles are drained on first call.
    pub fn shutdown(&mut self) {
        for _ in 0..self.handles.len() {
            let _ = self.sender.send(Message::Terminate);
        }
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

static SHARED_POOL: OnceCell<WorkerPool> = OnceCell::new();

/// Returns the process-wide default pool, sized to the number of logical
/// CPUs, creating it on first use.
pub fn shared() -> &'static WorkerPool {
    SHARED_POOL.get_or_init(|| WorkerPool::new(num_cpus::get()))
}

/// Tears down the shared pool's worker threads if it was ever
/// initialized. Leaves the `OnceCell` populated (a `WorkerPool` cannot be
/// removed from a `OnceCell` without replacing the whole cell), but a
/// pool whose threads already exited behaves as a closed channel on the
/// next [`WorkerPool::run`] call, surfacing a `Worker` error rather than
/// hanging.
pub fn shutdown_shared() {
    if let Some(pool) = SHARED_POOL.get() {
        for _ in 0..pool.handles.len() {
            let _ = pool.sender.send(Message::Terminate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_returns_the_task_result() {
        let pool = WorkerPool::new(2);
        let result = pool.run(Duration::from_secs(1), || 2 + 2).unwrap();
        assert_eq!(result, 4);
    }

    #[test]
    fn run_times_out_on_a_slow_task() {
        let pool = WorkerPool::new(1);
        let result: Result<(), MtagError> = pool.run(Duration::from_millis(20), || {
            thread::sleep(Duration::from_millis(200));
        });
        assert!(result.is_err());
        assert!(result.unwrap_err().is_worker());
    }

    #[test]
    fn a_panicking_task_does_not_kill_the_pool() {
        let pool = WorkerPool::new(1);
        let _: Result<(), MtagError> = pool.run(Duration::from_millis(100), || {
            panic!("boom");
        });
        let result = pool.run(Duration::from_millis(100), || 1).unwrap();
        assert_eq!(result, 1);
    }

    #[test]
    fn run_many_bounds_concurrency_to_pool_size() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let pool = WorkerPool::new(2);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let jobs: Vec<_> = (0..6)
            .map(|_| {
                let in_flight = in_flight.clone();
                let max_seen = max_seen.clone();
                move || {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(20));
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .collect();

        let results = pool.run_many(Duration::from_secs(1), jobs);
        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.is_ok()));
        assert!(max_seen.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn shared_pool_is_a_singleton() {
        let a = shared() as *const WorkerPool;
        let b = shared() as *const WorkerPool;
        assert_eq!(a, b);
    }
}
