//! Owner execution context.
//!
//! Host state that must only be touched from one thread is reached through an
//! [`OwnerContext`]. Work is handed to a dedicated thread that runs submitted
//! closures one at a time, in submission order. Callers wait for the result.
//! There is no timeout: a job that never returns stalls its caller.

use crate::error::{CoreError, CoreResult};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread::{self, ThreadId};
use tracing::{debug, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle to the owner thread. Cheap to clone.
#[derive(Debug, Clone)]
pub struct OwnerContext {
    sender: mpsc::Sender<Job>,
    thread_id: ThreadId,
}

impl OwnerContext {
    /// Spawn the owner thread. It exits once every handle is dropped.
    pub fn start(name: &str) -> CoreResult<Self> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let thread_name = name.to_string();
        let handle = thread::Builder::new().name(thread_name.clone()).spawn(move || {
            debug!(thread = %thread_name, "Owner context started");
            for job in receiver {
                job();
            }
            debug!(thread = %thread_name, "Owner context stopped");
        })?;
        Ok(Self {
            sender,
            thread_id: handle.thread().id(),
        })
    }

    /// Whether the calling thread is the owner thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Run `f` on the owner thread and block until it completes.
    ///
    /// Runs in place when already on the owner thread.
    pub fn run_blocking<T, F>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.is_current() {
            return catch(f);
        }
        let (tx, rx) = mpsc::sync_channel(1);
        self.submit(Box::new(move || {
            let _ = tx.send(catch(f));
        }))?;
        rx.recv().map_err(|_| CoreError::OwnerGone)?
    }

    /// Run `f` on the owner thread and await its result.
    pub async fn run<T, F>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.is_current() {
            return catch(f);
        }
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.submit(Box::new(move || {
            let _ = tx.send(catch(f));
        }))?;
        rx.await.map_err(|_| CoreError::OwnerGone)?
    }

    /// Queue `f` on the owner thread without waiting for it.
    pub fn spawn_detached<F>(&self, f: F) -> CoreResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Box::new(move || {
            if let Err(e) = catch(f) {
                warn!("Detached owner job failed: {}", e);
            }
        }))
    }

    fn submit(&self, job: Job) -> CoreResult<()> {
        debug!("Handing job to owner context");
        self.sender.send(job).map_err(|_| CoreError::OwnerGone)
    }
}

fn catch<T>(f: impl FnOnce() -> T) -> CoreResult<T> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| CoreError::OwnerPanicked(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
