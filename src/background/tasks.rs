use crate::{MapError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::any::Any;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Priority levels for background tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskPriority {
    /// Low priority - can be delayed significantly
    Low = 1,
    /// Normal priority - standard background processing
    Normal = 2,
    /// High priority - user-initiated actions
    High = 3,
    /// Critical priority - immediate processing needed
    Critical = 4,
}

/// Unique identifier for background tasks
pub type TaskId = String;

/// Result of a completed background task
#[derive(Debug)]
pub struct TaskResult {
    pub task_id: TaskId,
    pub result: Result<Box<dyn Any + Send>>,
}

pub use crate::traits::BackgroundTask;

/// Internal wrapper for prioritized tasks
#[derive(Clone)]
struct PrioritizedTask {
    task: Arc<dyn BackgroundTask>,
    priority: TaskPriority,
    sequence: u64,
}

impl PartialEq for PrioritizedTask {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for PrioritizedTask {}

impl PartialOrd for PrioritizedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PrioritizedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority first, then earlier submission
        match self.priority.cmp(&other.priority) {
            Ordering::Equal => other.sequence.cmp(&self.sequence),
            other => other,
        }
    }
}

/// Configuration for the background task manager
#[derive(Debug, Clone)]
pub struct TaskManagerConfig {
    /// Maximum number of queued tasks before dropping low priority ones
    pub max_queue_size: usize,
    /// Tasks execute synchronously on the submitting thread
    pub synchronous: bool,
    /// Name given to the worker thread
    pub thread_name: String,
}

impl Default for TaskManagerConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 64,
            synchronous: false,
            thread_name: "svgmap-worker".to_string(),
        }
    }
}

/// Runs tasks on one dedicated worker thread with priority scheduling.
///
/// Results are collected by polling [`try_recv_results`](Self::try_recv_results)
/// from the owning thread. When no thread can be spawned the manager degrades
/// to executing tasks inline, and results still arrive through the same channel.
pub struct BackgroundTaskManager {
    config: TaskManagerConfig,
    task_tx: Option<Sender<PrioritizedTask>>,
    result_tx: Sender<TaskResult>,
    result_rx: Receiver<TaskResult>,
    worker: Option<JoinHandle<()>>,
    shutdown_signal: Arc<AtomicBool>,
    sequence: AtomicU64,
}

impl BackgroundTaskManager {
    /// Create a new background task manager
    pub fn new(config: TaskManagerConfig) -> Self {
        let (result_tx, result_rx) = unbounded();
        let shutdown_signal = Arc::new(AtomicBool::new(false));

        let (task_tx, worker) = if config.synchronous {
            log::debug!("task manager running synchronously");
            (None, None)
        } else {
            let (task_tx, task_rx) = unbounded();
            let worker_result_tx = result_tx.clone();
            let worker_config = config.clone();
            let worker_shutdown = shutdown_signal.clone();

            let spawned = std::thread::Builder::new()
                .name(config.thread_name.clone())
                .spawn(move || {
                    Self::worker_loop(task_rx, worker_result_tx, worker_config, worker_shutdown)
                });

            match spawned {
                Ok(handle) => {
                    log::debug!("spawned worker thread '{}'", config.thread_name);
                    (Some(task_tx), Some(handle))
                }
                Err(err) => {
                    log::warn!("worker thread unavailable ({}), running tasks inline", err);
                    (None, None)
                }
            }
        };

        Self {
            config,
            task_tx,
            result_tx,
            result_rx,
            worker,
            shutdown_signal,
            sequence: AtomicU64::new(0),
        }
    }

    /// Create a new task manager with default configuration
    pub fn with_default_config() -> Self {
        Self::new(TaskManagerConfig::default())
    }

    /// Create a task manager that never leaves the calling thread
    pub fn synchronous() -> Self {
        Self::new(TaskManagerConfig {
            synchronous: true,
            ..Default::default()
        })
    }

    /// Tasks run inline rather than on the worker
    pub fn is_synchronous(&self) -> bool {
        self.task_tx.is_none()
    }

    /// Submit a task for background processing
    pub fn submit_task(&self, task: Arc<dyn BackgroundTask>) -> Result<()> {
        if self.is_shutting_down() {
            return Err(MapError::Worker("task manager is shut down".to_string()));
        }

        let task_id = task.task_id().to_string();
        let priority = task.priority();

        let Some(task_tx) = &self.task_tx else {
            let result = task.execute();
            let _ = self.result_tx.send(TaskResult { task_id, result });
            return Ok(());
        };

        let prioritized = PrioritizedTask {
            task,
            priority,
            sequence: self.sequence.fetch_add(1, AtomicOrdering::Relaxed),
        };

        match task_tx.send(prioritized) {
            Ok(()) => {
                log::trace!("queued task '{}' with priority {:?}", task_id, priority);
                Ok(())
            }
            Err(_) => Err(MapError::Worker(format!(
                "task queue is closed, dropping '{}'",
                task_id
            ))),
        }
    }

    /// Stop the worker; queued tasks are discarded
    pub fn shutdown(&mut self) {
        self.shutdown_signal.store(true, AtomicOrdering::SeqCst);
        self.task_tx = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("worker thread '{}' panicked", self.config.thread_name);
            }
        }
    }

    /// Check if the task manager is shutting down
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_signal.load(AtomicOrdering::SeqCst)
    }

    /// Try to receive completed task results (non-blocking)
    pub fn try_recv_results(&self) -> Vec<TaskResult> {
        self.result_rx.try_iter().collect()
    }

    /// Block until one result arrives or the timeout passes
    pub fn recv_result_timeout(&self, timeout: std::time::Duration) -> Option<TaskResult> {
        self.result_rx.recv_timeout(timeout).ok()
    }

    /// Check if there are pending results without consuming them
    pub fn has_pending_results(&self) -> bool {
        !self.result_rx.is_empty()
    }

    /// Worker loop that processes tasks from the queue
    fn worker_loop(
        task_rx: Receiver<PrioritizedTask>,
        result_tx: Sender<TaskResult>,
        config: TaskManagerConfig,
        shutdown_signal: Arc<AtomicBool>,
    ) {
        let mut task_queue = BinaryHeap::new();

        loop {
            if task_queue.is_empty() {
                // Sleep until work arrives; a closed channel ends the worker.
                match task_rx.recv() {
                    Ok(task) => task_queue.push(task),
                    Err(_) => break,
                }
            }

            // Collect everything else already waiting
            for task in task_rx.try_iter() {
                task_queue.push(task);
            }

            // Drop lowest priority tasks if queue is too large
            while task_queue.len() > config.max_queue_size.max(1) {
                let mut tasks = std::mem::take(&mut task_queue).into_sorted_vec();
                let dropped = tasks.remove(0);
                log::debug!("dropping queued task '{}'", dropped.task.task_id());
                task_queue = tasks.into();
            }

            if shutdown_signal.load(AtomicOrdering::SeqCst) {
                break;
            }

            if let Some(task) = task_queue.pop() {
                let task_id = task.task.task_id().to_string();
                let result = task.task.execute();
                if result_tx.send(TaskResult { task_id, result }).is_err() {
                    break;
                }
            }
        }

        log::debug!("worker thread '{}' exiting", config.thread_name);
    }
}

impl Drop for BackgroundTaskManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
