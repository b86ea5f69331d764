//! Threads and synchronization primitives.
//!
//! - [`Thread`] / [`ThreadBuilder`]: OS threads with join and detach
//! - [`Mutex`] / [`Condvar`]: non-recursive lock and its condition variable
//! - [`RwLock`]: shared/exclusive lock
//! - [`Atomic32`], [`Atomic64`], [`AtomicPointer`]: sequentially consistent atomics
//!
//! Every lock offers a guard API and a `*_raw` API. Guards unlock on drop;
//! the raw API exists for callers that must split lock and unlock across
//! calls and is `unsafe` on the release side.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use regislex_sync::{Mutex, Thread};
//!
//! let total = Arc::new(Mutex::new(0));
//! let worker = {
//!     let total = Arc::clone(&total);
//!     Thread::spawn(move || *total.lock() += 1).unwrap()
//! };
//! worker.join().unwrap();
//! assert_eq!(*total.lock(), 1);
//! ```

mod atomic;
mod mutex;
mod rwlock;
mod thread;

pub use atomic::{Atomic32, Atomic64, AtomicPointer};
pub use mutex::{Condvar, Mutex, MutexGuard};
pub use rwlock::{RwLock, RwLockReadGuard, RwLockWriteGuard};
pub use thread::{current_thread_id, yield_now, Thread, ThreadBuilder};

pub use regislex_core::{PalError, PalResult};
