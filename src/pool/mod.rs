//! Bounded-queue worker pool with graceful drain-then-stop shutdown.
//!
//! A fixed set of workers is spawned up front and pulls tasks from a shared
//! bounded queue. Submissions wait a bounded time for queue space and are
//! rejected rather than blocking forever. `stop` closes the queue, lets the
//! workers drain whatever was accepted, and force-terminates them only when
//! the drain exceeds the shutdown timeout.
mod in_flight;

#[cfg(test)]
mod tests;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::{self, error::SendTimeoutError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::PoolError;
use in_flight::InFlight;

/// Default number of pre-started workers.
pub const DEFAULT_WORKERS: usize = 10;
/// Default queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
/// Default time `add_task` waits for queue space.
pub const DEFAULT_ENQUEUE_TIMEOUT: Duration = Duration::from_secs(1);
/// Default time `stop` waits for accepted tasks to drain.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub enqueue_timeout: Duration,
    pub shutdown_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            enqueue_timeout: DEFAULT_ENQUEUE_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub workers: usize,
    pub queued: usize,
    pub in_flight: u64,
}

type Handler<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;
type SharedReceiver<T> = Arc<tokio::sync::Mutex<mpsc::Receiver<T>>>;

/// State of one `start`..`stop` cycle. Workers aborted by a forced stop may
/// still finish their current task later; they only touch this cycle's
/// counter.
struct RunningPool<T> {
    sender: mpsc::Sender<T>,
    workers: Vec<JoinHandle<()>>,
    in_flight: Arc<InFlight>,
}

enum PoolState<T> {
    Idle,
    Running(RunningPool<T>),
    ShuttingDown,
}

pub struct WorkerPool<T> {
    config: PoolConfig,
    handler: Handler<T>,
    state: Mutex<PoolState<T>>,
}

impl<T> WorkerPool<T>
where
    T: Send + 'static,
{
    pub fn new<F>(config: PoolConfig, handler: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            config: PoolConfig {
                workers: config.workers.max(1),
                queue_capacity: config.queue_capacity.max(1),
                ..config
            },
            handler: Arc::new(handler),
            state: Mutex::new(PoolState::Idle),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, PoolState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawns the workers on the current Tokio runtime. A second call while
    /// the pool is running is a no-op.
    pub fn start(&self) {
        let mut state = self.lock_state();
        match &*state {
            PoolState::Running(_) => {
                info!("Worker pool already started");
                return;
            }
            PoolState::ShuttingDown => {
                warn!("Worker pool is shutting down; start ignored");
                return;
            }
            PoolState::Idle => {}
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("Worker pool needs a Tokio runtime to start: {}", err);
                return;
            }
        };

        debug!("Pre-warming {} workers...", self.config.workers);
        let (sender, receiver) = mpsc::channel(self.config.queue_capacity);
        let receiver: SharedReceiver<T> = Arc::new(tokio::sync::Mutex::new(receiver));
        let in_flight = Arc::new(InFlight::default());
        let workers = (0..self.config.workers)
            .map(|worker_id| {
                runtime.spawn(worker_loop(
                    worker_id,
                    Arc::clone(&receiver),
                    Arc::clone(&self.handler),
                    Arc::clone(&in_flight),
                ))
            })
            .collect();

        *state = PoolState::Running(RunningPool {
            sender,
            workers,
            in_flight,
        });
        info!("All {} workers pre-warmed and ready", self.config.workers);
    }

    /// Enqueues a task, waiting at most the enqueue timeout for queue space.
    ///
    /// # Errors
    ///
    /// Returns an error when the pool is not running or the queue stayed
    /// full for the whole wait. A rejected task is never handed to the
    /// handler.
    pub async fn add_task(&self, task: T) -> Result<(), PoolError> {
        let (sender, in_flight) = {
            let state = self.lock_state();
            match &*state {
                PoolState::Idle => return Err(PoolError::NotStarted),
                PoolState::ShuttingDown => return Err(PoolError::ShuttingDown),
                PoolState::Running(running) => {
                    running.in_flight.add();
                    (running.sender.clone(), Arc::clone(&running.in_flight))
                }
            }
        };

        match sender.send_timeout(task, self.config.enqueue_timeout).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(_)) => {
                in_flight.done();
                Err(PoolError::Saturated {
                    waited: self.config.enqueue_timeout,
                })
            }
            Err(SendTimeoutError::Closed(_)) => {
                in_flight.done();
                Err(PoolError::ShuttingDown)
            }
        }
    }

    /// Stops accepting tasks, drains the queue, and terminates the workers.
    /// The pool can be started again afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ShutdownTimeout`] when accepted tasks were still
    /// pending after the shutdown timeout; the workers are terminated anyway.
    pub async fn stop(&self) -> Result<(), PoolError> {
        let running = {
            let mut state = self.lock_state();
            match std::mem::replace(&mut *state, PoolState::ShuttingDown) {
                PoolState::Running(running) => running,
                PoolState::Idle => {
                    *state = PoolState::Idle;
                    info!("Worker pool not started, nothing to stop");
                    return Ok(());
                }
                PoolState::ShuttingDown => {
                    info!("Worker pool already shutting down");
                    return Ok(());
                }
            }
        };

        info!("Initiating graceful shutdown...");
        let RunningPool {
            sender,
            workers,
            in_flight,
        } = running;
        drop(sender);

        let drained =
            tokio::time::timeout(self.config.shutdown_timeout, in_flight.wait_idle())
                .await
                .is_ok();
        let result = if drained {
            debug!("All accepted tasks were handled");
            Ok(())
        } else {
            let pending = in_flight.pending();
            warn!(
                "Timeout waiting for workers to finish, forcing shutdown with {} pending task(s)",
                pending
            );
            Err(PoolError::ShutdownTimeout {
                timeout: self.config.shutdown_timeout,
                pending,
            })
        };

        for worker in &workers {
            worker.abort();
        }

        *self.lock_state() = PoolState::Idle;
        info!("Worker pool stopped");
        result
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(&*self.lock_state(), PoolState::Running(_))
    }

    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let (queued, in_flight) = match &*self.lock_state() {
            PoolState::Running(running) => (
                running
                    .sender
                    .max_capacity()
                    .saturating_sub(running.sender.capacity()),
                running.in_flight.pending(),
            ),
            PoolState::Idle | PoolState::ShuttingDown => (0, 0),
        };
        PoolStats {
            workers: self.config.workers,
            queued,
            in_flight,
        }
    }
}

async fn worker_loop<T>(
    worker_id: usize,
    receiver: SharedReceiver<T>,
    handler: Handler<T>,
    in_flight: Arc<InFlight>,
) {
    debug!(worker_id, "Worker started and listening");
    loop {
        let next = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };
        let Some(task) = next else {
            debug!(worker_id, "Queue closed, worker exiting");
            break;
        };
        handler(task);
        in_flight.done();
    }
}
