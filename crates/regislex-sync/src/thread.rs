//! OS thread lifecycle.
//!
//! Every [`Thread`] is one preemptively scheduled OS thread, started
//! immediately on creation. [`Thread::join`] and [`Thread::detach`] both
//! consume the handle, so it cannot be used afterwards.

use std::any::Any;
use std::io;
use std::thread::{self, JoinHandle, ThreadId};

use regislex_core::{PalError, PalResult};
use tracing::debug;

/// Options for a new thread.
#[derive(Debug, Clone, Default)]
pub struct ThreadBuilder {
    /// Thread name, visible in debuggers and panic messages.
    ///
    /// Default: unnamed
    pub name: Option<String>,

    /// Stack size in bytes.
    ///
    /// Default: the platform default
    pub stack_size: Option<usize>,
}

impl ThreadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Start `f` on a new OS thread.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the name contains a NUL byte
    /// - `OutOfMemory` if the OS refuses for lack of resources
    pub fn spawn<F, T>(self, f: F) -> PalResult<Thread<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let mut builder = thread::Builder::new();
        if let Some(name) = self.name {
            if name.contains('\0') {
                return Err(PalError::invalid_argument(
                    "thread name must not contain NUL",
                ));
            }
            builder = builder.name(name);
        }
        if let Some(size) = self.stack_size {
            builder = builder.stack_size(size);
        }

        let handle = builder.spawn(f).map_err(map_spawn_error)?;
        debug!(thread = ?handle.thread().id(), name = ?handle.thread().name(), "thread started");
        Ok(Thread { handle })
    }
}

fn map_spawn_error(e: io::Error) -> PalError {
    match e.kind() {
        // pthread_create reports EAGAIN when out of threads or memory
        io::ErrorKind::WouldBlock | io::ErrorKind::OutOfMemory => PalError::OutOfMemory,
        _ => PalError::from_io("thread_create", e),
    }
}

/// Handle to one running OS thread.
#[derive(Debug)]
pub struct Thread<T> {
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> Thread<T> {
    /// Start `f` on a new OS thread with default options.
    pub fn spawn<F>(f: F) -> PalResult<Self>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        ThreadBuilder::new().spawn(f)
    }
}

impl<T> Thread<T> {
    /// Block until the thread finishes and return its result.
    ///
    /// # Errors
    ///
    /// Returns `Failed` if the thread panicked.
    pub fn join(self) -> PalResult<T> {
        let id = self.handle.thread().id();
        let result = self.handle.join().map_err(|payload| {
            PalError::failed("thread_join", format!("thread panicked: {}", panic_message(&*payload)))
        });
        debug!(thread = ?id, ok = result.is_ok(), "thread joined");
        result
    }

    /// Release the handle; the OS reclaims the thread when it finishes.
    pub fn detach(self) {
        debug!(thread = ?self.handle.thread().id(), "thread detached");
        drop(self.handle);
    }

    pub fn id(&self) -> ThreadId {
        self.handle.thread().id()
    }

    pub fn name(&self) -> Option<&str> {
        self.handle.thread().name()
    }

    /// True once the thread function has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
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

/// Identifier of the calling thread.
pub fn current_thread_id() -> ThreadId {
    thread::current().id()
}

/// Hint the scheduler to run another thread.
pub fn yield_now() {
    thread::yield_now();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn join_returns_result() {
        let thread = Thread::spawn(|| 6 * 7).unwrap();
        assert_eq!(thread.join().unwrap(), 42);
    }

    #[test]
    fn join_reports_panic() {
        let thread = Thread::spawn(|| -> u8 { panic!("boom") }).unwrap();
        let err = thread.join().unwrap_err();
        assert!(matches!(err, PalError::Failed { .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn builder_sets_name() {
        let thread = ThreadBuilder::new()
            .name("pal-worker")
            .stack_size(256 * 1024)
            .spawn(|| thread::current().name().map(str::to_string))
            .unwrap();
        assert_eq!(thread.name(), Some("pal-worker"));
        assert_eq!(thread.join().unwrap().as_deref(), Some("pal-worker"));
    }

    #[test]
    fn builder_rejects_nul_name() {
        let err = ThreadBuilder::new().name("bad\0name").spawn(|| ()).unwrap_err();
        assert!(matches!(err, PalError::InvalidArgument { .. }));
    }

    #[test]
    fn detached_thread_keeps_running() {
        let (tx, rx) = mpsc::channel();
        let thread = Thread::spawn(move || {
            tx.send(current_thread_id()).unwrap();
        })
        .unwrap();
        let id = thread.id();
        thread.detach();

        let reported = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(reported, id);
        assert_ne!(reported, current_thread_id());
    }
}
