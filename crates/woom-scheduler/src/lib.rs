// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process deferred task scheduler.
//!
//! Every `schedule` call spawns one timer. When it elapses the task goes onto
//! a channel read by the dispatcher, which hands it to the registered
//! [`TaskHandler`]. Firings of the same `(order, item)` pair are serialized;
//! different pairs run concurrently up to a configured limit.
//!
//! Pending timers live only in memory. They are dropped on shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, Semaphore, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};
use woom_core::{Clock, ItemId, OrderId, RegistrationTask, TaskHandler, TaskScheduler, WoomError};

type TaskLocks = DashMap<(OrderId, ItemId), Arc<Mutex<()>>>;

/// Timer-based [`TaskScheduler`] running on the current tokio runtime.
#[derive(Clone)]
pub struct TokioScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    clock: Arc<dyn Clock>,
    tx: mpsc::UnboundedSender<RegistrationTask>,
    rx: std::sync::Mutex<Option<mpsc::UnboundedReceiver<RegistrationTask>>>,
    cancel: CancellationToken,
    timers: TaskTracker,
    pending: AtomicUsize,
}

impl TokioScheduler {
    pub fn new(clock: Arc<dyn Clock>, cancel: CancellationToken) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(Inner {
                clock,
                tx,
                rx: std::sync::Mutex::new(Some(rx)),
                cancel,
                timers: TaskTracker::new(),
                pending: AtomicUsize::new(0),
            }),
        }
    }

    /// Start dispatching due tasks to `handler`. Can only be called once.
    pub fn start(
        &self,
        handler: Arc<dyn TaskHandler>,
        max_concurrent: usize,
    ) -> Result<JoinHandle<()>, WoomError> {
        let rx = self
            .inner
            .rx
            .lock()
            .map_err(|_| WoomError::Internal("scheduler receiver lock poisoned".into()))?
            .take()
            .ok_or_else(|| WoomError::Scheduler("dispatcher already started".into()))?;

        let dispatcher = Dispatcher {
            handler,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            locks: Arc::new(DashMap::new()),
            running: TaskTracker::new(),
            cancel: self.inner.cancel.clone(),
        };
        info!(max_concurrent, "task dispatcher started");
        Ok(tokio::spawn(dispatcher.run(rx)))
    }

    /// Timers that have not fired yet.
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::SeqCst)
    }

    /// Cancel every pending timer and stop the dispatcher.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.inner.timers.close();
        self.inner.timers.wait().await;
        debug!("scheduler timers drained");
    }
}

#[async_trait]
impl TaskScheduler for TokioScheduler {
    async fn schedule(
        &self,
        fire_at: DateTime<Utc>,
        task: RegistrationTask,
    ) -> Result<(), WoomError> {
        if self.inner.cancel.is_cancelled() {
            return Err(WoomError::Scheduler("scheduler is shut down".into()));
        }

        let delay = (fire_at - self.inner.clock.now())
            .to_std()
            .unwrap_or_default();
        let inner = Arc::clone(&self.inner);
        inner.pending.fetch_add(1, Ordering::SeqCst);
        debug!(
            order_id = %task.order_id,
            item_id = %task.item_id,
            fire_at = %fire_at,
            "task scheduled"
        );

        self.inner.timers.spawn(async move {
            tokio::select! {
                _ = inner.cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if inner.tx.send(task).is_err() {
                        error!(order_id = %task.order_id, item_id = %task.item_id, "dispatcher gone, task dropped");
                    }
                }
            }
            inner.pending.fetch_sub(1, Ordering::SeqCst);
        });
        Ok(())
    }
}

struct Dispatcher {
    handler: Arc<dyn TaskHandler>,
    permits: Arc<Semaphore>,
    locks: Arc<TaskLocks>,
    running: TaskTracker,
    cancel: CancellationToken,
}

impl Dispatcher {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<RegistrationTask>) {
        loop {
            let task = tokio::select! {
                _ = self.cancel.cancelled() => break,
                task = rx.recv() => match task {
                    Some(task) => task,
                    None => break,
                },
            };
            self.dispatch(task);
        }

        self.running.close();
        self.running.wait().await;
        info!("task dispatcher stopped");
    }

    fn dispatch(&self, task: RegistrationTask) {
        let key = task.key();
        let lock = Arc::clone(self.locks.entry(key).or_default().value());
        let locks = Arc::clone(&self.locks);
        let permits = Arc::clone(&self.permits);
        let handler = Arc::clone(&self.handler);

        self.running.spawn(async move {
            {
                let _serial = lock.lock().await;
                let Ok(_permit) = permits.acquire().await else {
                    return;
                };
                if let Err(e) = handler.handle(task).await {
                    error!(
                        order_id = %task.order_id,
                        item_id = %task.item_id,
                        error = %e,
                        "task handler failed"
                    );
                }
            }
            drop(lock);
            locks.remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
        });
    }
}
