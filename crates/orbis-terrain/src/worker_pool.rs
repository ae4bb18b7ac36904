//! Shared worker threads that run generation tasks.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use orbis_config::WorkerConfig;
use tracing::error;

use crate::task::{TaskError, panic_message};

type Work = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size thread pool fed through an unbounded channel.
///
/// Each submitted closure runs to completion on exactly one worker. A panic
/// inside a closure is logged and does not take the worker down.
pub struct WorkerPool {
    sender: Option<Sender<Work>>,
    handles: Vec<JoinHandle<()>>,
    in_flight: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Spawn `thread_count` workers (at least one).
    pub fn new(thread_count: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded::<Work>();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let thread_count = thread_count.max(1);
        let mut handles = Vec::with_capacity(thread_count);
        for _ in 0..thread_count {
            let receiver = receiver.clone();
            let in_flight = Arc::clone(&in_flight);

            let handle = std::thread::Builder::new()
                .name("terrain-gen-worker".into())
                .spawn(move || worker_loop(&receiver, &in_flight))
                .expect("Failed to spawn terrain generation worker thread");
            handles.push(handle);
        }

        Self {
            sender: Some(sender),
            handles,
            in_flight,
        }
    }

    /// Pool sized to the machine, leaving two cores for the caller's own
    /// threads.
    pub fn with_defaults() -> Self {
        let cpus = num_cpus::get().max(2);
        Self::new((cpus - 2).max(1))
    }

    /// Pool sized by `config.thread_count`, or [`with_defaults`](Self::with_defaults) when it is 0.
    pub fn from_config(config: &WorkerConfig) -> Self {
        match config.thread_count {
            0 => Self::with_defaults(),
            n => Self::new(n),
        }
    }

    /// Queue `work` for a worker.
    pub fn spawn(&self, work: impl FnOnce() + Send + 'static) -> Result<(), TaskError> {
        let sender = self.sender.as_ref().ok_or(TaskError::PoolShutDown)?;
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        if sender.send(Box::new(work)).is_err() {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            return Err(TaskError::PoolShutDown);
        }
        Ok(())
    }

    /// Closures queued or running.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn thread_count(&self) -> usize {
        self.handles.len()
    }

    /// Stop accepting work, let workers drain the queue, and join them.
    pub fn shutdown(&mut self) {
        self.sender.take();
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

fn worker_loop(receiver: &Receiver<Work>, in_flight: &AtomicUsize) {
    while let Ok(work) = receiver.recv() {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(work)) {
            error!("Worker job panicked: {}", panic_message(payload.as_ref()));
        }
        in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}
