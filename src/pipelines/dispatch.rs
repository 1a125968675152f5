// SPDX-License-Identifier: GPL-3.0-only
//! Execution of the per-frame convert/encode/write step
//!
//! Frame payloads are always copied on the callback thread. What happens
//! next is up to a [`FrameDispatcher`]:
//!
//! - [`ImmediateDispatcher`] runs the step right away on the callback thread.
//! - [`SerialDispatcher`] defers it to a single background writer thread.
//!   Jobs run strictly one at a time in FIFO order. The queue is unbounded:
//!   when frames arrive faster than they can be written nothing is dropped,
//!   and end-to-end latency grows for as long as the overload lasts.
//!
//! Neither dispatcher cancels queued jobs; a job dispatched before a session
//! stops still runs to completion. A job that panics on the writer thread is
//! logged and the queue keeps going.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Unit of deferred work
pub type FrameJob = Box<dyn FnOnce() + Send + 'static>;

/// Runs frame jobs
pub trait FrameDispatcher: Send + Sync {
    /// Run or enqueue a job
    fn dispatch(&self, job: FrameJob);

    /// Block until every job dispatched so far has finished
    fn wait_idle(&self);

    /// Jobs dispatched but not yet finished
    fn pending(&self) -> usize;
}

/// Runs each job synchronously on the dispatching thread
#[derive(Debug, Default)]
pub struct ImmediateDispatcher;

impl FrameDispatcher for ImmediateDispatcher {
    fn dispatch(&self, job: FrameJob) {
        job();
    }

    fn wait_idle(&self) {}

    fn pending(&self) -> usize {
        0
    }
}

enum WriterMessage {
    Run(FrameJob),
    Barrier(oneshot::Sender<()>),
}

/// Single background writer thread with a FIFO queue
pub struct SerialDispatcher {
    sender: Option<mpsc::UnboundedSender<WriterMessage>>,
    thread_handle: Option<JoinHandle<()>>,
    pending: Arc<AtomicUsize>,
    name: String,
}

impl SerialDispatcher {
    /// Spawn the writer thread
    pub fn start(name: &str) -> std::io::Result<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<WriterMessage>();
        let pending = Arc::new(AtomicUsize::new(0));
        let pending_clone = Arc::clone(&pending);
        let name_clone = name.to_string();

        info!(name = %name, "Starting frame writer thread");

        let thread_handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                debug!(name = %name_clone, "Frame writer thread started");

                while let Some(message) = receiver.blocking_recv() {
                    match message {
                        WriterMessage::Run(job) => {
                            if catch_unwind(AssertUnwindSafe(job)).is_err() {
                                error!(name = %name_clone, "Frame job panicked");
                            }
                            pending_clone.fetch_sub(1, Ordering::SeqCst);
                        }
                        WriterMessage::Barrier(done) => {
                            let _ = done.send(());
                        }
                    }
                }

                info!(name = %name_clone, "Frame writer thread exiting");
            })?;

        Ok(Self {
            sender: Some(sender),
            thread_handle: Some(thread_handle),
            pending,
            name: name.to_string(),
        })
    }

    /// Finish queued jobs and join the writer thread
    pub fn shutdown(mut self) {
        self.join();
    }

    fn join(&mut self) {
        // Closing the channel lets the thread drain the queue and exit
        self.sender.take();
        if let Some(handle) = self.thread_handle.take() {
            debug!(name = %self.name, "Waiting for frame writer thread");
            if handle.join().is_err() {
                warn!(name = %self.name, "Frame writer thread panicked");
            }
        }
    }
}

impl FrameDispatcher for SerialDispatcher {
    fn dispatch(&self, job: FrameJob) {
        let Some(sender) = &self.sender else {
            warn!(name = %self.name, "Dispatch after shutdown, running inline");
            job();
            return;
        };

        self.pending.fetch_add(1, Ordering::SeqCst);
        if let Err(mpsc::error::SendError(message)) = sender.send(WriterMessage::Run(job)) {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            warn!(name = %self.name, "Frame writer thread gone, running inline");
            if let WriterMessage::Run(job) = message {
                job();
            }
        }
    }

    fn wait_idle(&self) {
        let Some(sender) = &self.sender else {
            return;
        };
        let (done_tx, done_rx) = oneshot::channel();
        if sender.send(WriterMessage::Barrier(done_tx)).is_ok() {
            let _ = done_rx.blocking_recv();
        }
    }

    fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

impl Drop for SerialDispatcher {
    fn drop(&mut self) {
        self.join();
    }
}

impl std::fmt::Debug for SerialDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SerialDispatcher({}, {} pending)", self.name, self.pending())
    }
}
