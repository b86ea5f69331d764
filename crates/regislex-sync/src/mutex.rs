//! Mutual exclusion and condition variables.
//!
//! [`Mutex`] is non-recursive: locking it twice from the same thread
//! deadlocks. The guard API is the normal way to use it. The `*_raw`
//! methods split lock and unlock into separate calls for callers that
//! cannot hold a guard across the boundary, such as the C interface.

use std::mem;
use std::time::Duration;

use parking_lot::{Condvar as RawCondvar, Mutex as RawMutex};
use regislex_core::{PalError, PalResult};

/// RAII guard returned by [`Mutex::lock`]; unlocks when dropped.
pub type MutexGuard<'a, T> = parking_lot::MutexGuard<'a, T>;

/// Non-recursive mutual exclusion lock protecting a `T`.
#[derive(Debug, Default)]
pub struct Mutex<T: ?Sized> {
    inner: RawMutex<T>,
}

impl<T> Mutex<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: parking_lot::const_mutex(value),
        }
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: ?Sized> Mutex<T> {
    /// Block until the lock is acquired.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    /// Acquire the lock without blocking.
    ///
    /// # Errors
    ///
    /// Returns `WouldBlock` if another holder has it.
    pub fn try_lock(&self) -> PalResult<MutexGuard<'_, T>> {
        self.inner.try_lock().ok_or(PalError::WouldBlock)
    }

    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    /// Acquire the lock and keep it held with no guard.
    ///
    /// Must be paired with [`Mutex::unlock_raw`].
    pub fn lock_raw(&self) {
        mem::forget(self.inner.lock());
    }

    /// Non-blocking form of [`Mutex::lock_raw`].
    pub fn try_lock_raw(&self) -> PalResult<()> {
        self.try_lock().map(mem::forget)
    }

    /// Release a lock taken with [`Mutex::lock_raw`] or [`Mutex::try_lock_raw`].
    ///
    /// # Safety
    ///
    /// The lock must be held by the current context and no guard for it
    /// may be alive.
    pub unsafe fn unlock_raw(&self) {
        self.inner.force_unlock();
    }
}

/// Condition variable paired with a [`Mutex`].
///
/// A waiter may wake without a matching signal, so waits belong inside a
/// loop that re-checks the predicate.
#[derive(Debug, Default)]
pub struct Condvar {
    inner: RawCondvar,
}

impl Condvar {
    pub const fn new() -> Self {
        Self {
            inner: RawCondvar::new(),
        }
    }

    /// Atomically release the guarded mutex and wait for a signal.
    /// The mutex is held again when this returns.
    pub fn wait<T: ?Sized>(&self, guard: &mut MutexGuard<'_, T>) {
        self.inner.wait(guard);
    }

    /// Like [`Condvar::wait`] with a deadline.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` if `timeout` elapsed without a signal. The mutex
    /// is held again either way.
    pub fn wait_timeout<T: ?Sized>(
        &self,
        guard: &mut MutexGuard<'_, T>,
        timeout: Duration,
    ) -> PalResult<()> {
        if self.inner.wait_for(guard, timeout).timed_out() {
            Err(PalError::Timeout)
        } else {
            Ok(())
        }
    }

    pub fn wait_timeout_ms<T: ?Sized>(
        &self,
        guard: &mut MutexGuard<'_, T>,
        timeout_ms: u64,
    ) -> PalResult<()> {
        self.wait_timeout(guard, Duration::from_millis(timeout_ms))
    }

    /// Wake one waiter. Returns whether a waiter was woken.
    pub fn signal(&self) -> bool {
        self.inner.notify_one()
    }

    /// Wake every waiter. Returns how many were woken.
    pub fn broadcast(&self) -> usize {
        self.inner.notify_all()
    }

    /// [`Condvar::wait`] for a mutex held through [`Mutex::lock_raw`].
    ///
    /// # Safety
    ///
    /// `mutex` must be held by the current context with no guard alive.
    pub unsafe fn wait_raw<T: ?Sized>(&self, mutex: &Mutex<T>) {
        let mut guard = mutex.inner.make_guard_unchecked();
        self.inner.wait(&mut guard);
        mem::forget(guard);
    }

    /// [`Condvar::wait_timeout`] for a mutex held through [`Mutex::lock_raw`].
    ///
    /// # Safety
    ///
    /// `mutex` must be held by the current context with no guard alive.
    pub unsafe fn wait_timeout_raw<T: ?Sized>(
        &self,
        mutex: &Mutex<T>,
        timeout: Duration,
    ) -> PalResult<()> {
        let mut guard = mutex.inner.make_guard_unchecked();
        let result = self.wait_timeout(&mut guard, timeout);
        mem::forget(guard);
        result
    }
}
