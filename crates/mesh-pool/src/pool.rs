//! Bounded pool of OS worker threads.
//!
//! Workers are spawned on demand, one per submission while none is idle, up
//! to `max_workers`. When a task finishes and no task is running or queued,
//! the pool retires all of its workers. The next submission starts fresh
//! ones.
//!
//! Results are delivered through [`TaskHandle`], a future that resolves
//! after the pool has updated its bookkeeping for the finished task.

use crate::config::WorkerPoolConfig;
use crate::error::{PoolError, PoolResult};
use serde::Serialize;
use std::any::Any;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Hands the result to the waiting [`TaskHandle`].
type Delivery = Box<dyn FnOnce() + Send>;

struct Finished {
    panicked: bool,
    deliver: Delivery,
}

type Job = Box<dyn FnOnce() -> Finished + Send>;

/// Snapshot of pool activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Tasks currently running.
    pub busy: usize,
    /// Tasks waiting for a worker.
    pub pending: usize,
    /// Worker threads owned by the pool.
    pub live_workers: usize,
    /// Tasks that returned normally.
    pub completed: u64,
    /// Tasks that panicked.
    pub failed: u64,
}

impl PoolStats {
    /// True when nothing is running or queued.
    pub fn is_idle(&self) -> bool {
        self.busy == 0 && self.pending == 0
    }
}

#[derive(Default)]
struct PoolState {
    queue: VecDeque<Job>,
    busy: usize,
    idle: usize,
    workers: usize,
    /// Bumped on every teardown; workers from older epochs exit.
    epoch: u64,
    spawned: u64,
    shut_down: bool,
    handles: Vec<JoinHandle<()>>,
}

struct Shared {
    config: WorkerPoolConfig,
    state: Mutex<PoolState>,
    available: Condvar,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Retire every worker. Caller holds the lock.
    fn teardown(&self, state: &mut PoolState) {
        state.epoch += 1;
        state.workers = 0;
        state.idle = 0;
        self.available.notify_all();
        debug!(epoch = state.epoch, "Worker pool idle, workers retired");
    }
}

/// A bounded pool of worker threads. Cloning shares the same pool.
#[derive(Clone)]
pub struct WorkerPool {
    shared: Arc<Shared>,
}

impl WorkerPool {
    /// Create a pool. No threads are started until the first submission.
    pub fn new(config: WorkerPoolConfig) -> PoolResult<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(PoolState::default()),
                available: Condvar::new(),
                completed: AtomicU64::new(0),
                failed: AtomicU64::new(0),
            }),
        })
    }

    pub fn config(&self) -> &WorkerPoolConfig {
        &self.shared.config
    }

    /// Queue `task` to run on a worker thread.
    ///
    /// A panic inside the task resolves the handle with
    /// [`PoolError::TaskPanicked`]; the worker survives.
    pub fn submit<F, R>(&self, task: F) -> PoolResult<TaskHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            let (panicked, result) = match catch_unwind(AssertUnwindSafe(task)) {
                Ok(value) => (false, Ok(value)),
                Err(payload) => (true, Err(PoolError::TaskPanicked(panic_message(&*payload)))),
            };
            Finished {
                panicked,
                deliver: Box::new(move || {
                    // The caller may have dropped its handle.
                    let _ = tx.send(result);
                }),
            }
        });

        let mut state = self.shared.lock();
        if state.shut_down {
            return Err(PoolError::Shutdown);
        }

        if state.idle == 0 && state.workers < self.shared.config.max_workers {
            if let Err(e) = self.spawn_worker(&mut state) {
                if state.workers == 0 {
                    return Err(e);
                }
                warn!(error = %e, workers = state.workers, "Could not grow worker pool");
            }
        }

        state.queue.push_back(job);
        self.shared.available.notify_one();

        Ok(TaskHandle { rx })
    }

    fn spawn_worker(&self, state: &mut PoolState) -> PoolResult<()> {
        state.handles.retain(|h| !h.is_finished());
        state.spawned += 1;

        let name = format!("{}-{}", self.shared.config.thread_name_prefix, state.spawned);
        let shared = Arc::clone(&self.shared);
        let epoch = state.epoch;
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || worker_loop(shared, epoch))
            .map_err(|e| PoolError::Spawn(e.to_string()))?;

        state.workers += 1;
        state.handles.push(handle);
        debug!(worker = %name, workers = state.workers, "Spawned worker");
        Ok(())
    }

    /// Current activity counters.
    pub fn stats(&self) -> PoolStats {
        let state = self.shared.lock();
        PoolStats {
            busy: state.busy,
            pending: state.queue.len(),
            live_workers: state.workers,
            completed: self.shared.completed.load(Ordering::Relaxed),
            failed: self.shared.failed.load(Ordering::Relaxed),
        }
    }

    /// Retire all workers if nothing is running or queued.
    ///
    /// Returns true if the pool is idle afterwards.
    pub fn shutdown_if_idle(&self) -> bool {
        let mut state = self.shared.lock();
        if state.busy > 0 || !state.queue.is_empty() {
            return false;
        }
        if state.workers > 0 {
            self.shared.teardown(&mut state);
        }
        true
    }

    /// Stop accepting tasks, let queued ones finish and join every worker.
    ///
    /// Blocks the calling thread.
    pub fn shutdown(&self) {
        let handles = {
            let mut state = self.shared.lock();
            state.shut_down = true;
            self.shared.available.notify_all();
            std::mem::take(&mut state.handles)
        };

        for handle in handles {
            if handle.join().is_err() {
                warn!("Worker thread exited abnormally");
            }
        }
        debug!("Worker pool shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.lock().shut_down
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.shared.config)
            .field("stats", &self.stats())
            .finish()
    }
}

fn worker_loop(shared: Arc<Shared>, epoch: u64) {
    let mut state = shared.lock();
    loop {
        if state.epoch != epoch {
            break;
        }

        if let Some(job) = state.queue.pop_front() {
            state.busy += 1;
            drop(state);

            let finished = job();

            state = shared.lock();
            state.busy -= 1;
            if finished.panicked {
                shared.failed.fetch_add(1, Ordering::Relaxed);
            } else {
                shared.completed.fetch_add(1, Ordering::Relaxed);
            }
            if state.busy == 0 && state.queue.is_empty() && !state.shut_down {
                shared.teardown(&mut state);
            }
            drop(state);

            (finished.deliver)();
            state = shared.lock();
            continue;
        }

        if state.shut_down {
            state.workers = state.workers.saturating_sub(1);
            break;
        }

        state.idle += 1;
        state = shared
            .available
            .wait(state)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if state.epoch == epoch {
            state.idle -= 1;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Resolves to the result of a submitted task.
#[must_use = "dropping a TaskHandle discards the task's result"]
pub struct TaskHandle<R> {
    rx: oneshot::Receiver<PoolResult<R>>,
}

impl<R> Future for TaskHandle<R> {
    type Output = PoolResult<R>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(PoolError::Cancelled)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<R> std::fmt::Debug for TaskHandle<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(&*payload), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(&*payload), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(&*payload), "unknown panic payload");
    }

    #[test]
    fn test_no_threads_before_submit() {
        let pool = WorkerPool::new(WorkerPoolConfig::default()).unwrap();
        assert_eq!(pool.stats(), PoolStats::default());
        assert!(pool.shutdown_if_idle());
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(
            WorkerPool::new(WorkerPoolConfig::with_max_workers(0)),
            Err(PoolError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_blocking_on_handle() {
        let pool = WorkerPool::new(WorkerPoolConfig::default()).unwrap();
        let handle = pool.submit(|| 6 * 7).unwrap();
        assert_eq!(tokio_test::block_on(handle).unwrap(), 42);
    }
}
