//! Reader/writer lock.
//!
//! Any number of readers may hold the lock together; a writer holds it
//! alone. Readers never wait on other readers.

use std::mem;

use parking_lot::RwLock as RawRwLock;
use regislex_core::{PalError, PalResult};

pub type RwLockReadGuard<'a, T> = parking_lot::RwLockReadGuard<'a, T>;
pub type RwLockWriteGuard<'a, T> = parking_lot::RwLockWriteGuard<'a, T>;

/// Shared/exclusive lock protecting a `T`.
#[derive(Debug, Default)]
pub struct RwLock<T: ?Sized> {
    inner: RawRwLock<T>,
}

impl<T> RwLock<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: parking_lot::const_rwlock(value),
        }
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: ?Sized> RwLock<T> {
    /// Block until shared access is granted.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read()
    }

    /// Block until exclusive access is granted.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.inner.write()
    }

    /// # Errors
    ///
    /// Returns `WouldBlock` if a writer holds or is waiting for the lock.
    pub fn try_read(&self) -> PalResult<RwLockReadGuard<'_, T>> {
        self.inner.try_read().ok_or(PalError::WouldBlock)
    }

    /// # Errors
    ///
    /// Returns `WouldBlock` if any reader or writer holds the lock.
    pub fn try_write(&self) -> PalResult<RwLockWriteGuard<'_, T>> {
        self.inner.try_write().ok_or(PalError::WouldBlock)
    }

    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    pub fn is_locked_exclusive(&self) -> bool {
        self.inner.is_locked_exclusive()
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    pub fn read_raw(&self) {
        mem::forget(self.inner.read());
    }

    pub fn write_raw(&self) {
        mem::forget(self.inner.write());
    }

    pub fn try_read_raw(&self) -> PalResult<()> {
        self.try_read().map(mem::forget)
    }

    pub fn try_write_raw(&self) -> PalResult<()> {
        self.try_write().map(mem::forget)
    }

    /// Release one shared hold taken with a `*read_raw` method.
    ///
    /// # Safety
    ///
    /// The current context must hold shared access with no guard alive.
    pub unsafe fn unlock_read_raw(&self) {
        self.inner.force_unlock_read();
    }

    /// Release the exclusive hold taken with a `*write_raw` method.
    ///
    /// # Safety
    ///
    /// The current context must hold exclusive access with no guard alive.
    pub unsafe fn unlock_write_raw(&self) {
        self.inner.force_unlock_write();
    }

    /// Release whichever hold the current context has.
    ///
    /// # Safety
    ///
    /// The current context must hold the lock through a `*_raw` method with
    /// no guard alive.
    pub unsafe fn unlock_raw(&self) {
        if self.inner.is_locked_exclusive() {
            self.inner.force_unlock_write();
        } else {
            self.inner.force_unlock_read();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readers_share() {
        let lock = RwLock::new(5);
        let a = lock.read();
        let b = lock.try_read().unwrap();
        assert_eq!(*a + *b, 10);
        assert!(matches!(lock.try_write(), Err(PalError::WouldBlock)));
    }

    #[test]
    fn writer_excludes_everyone() {
        let lock = RwLock::new(String::new());
        {
            let mut w = lock.write();
            w.push_str("hello");
            assert!(lock.is_locked_exclusive());
            assert!(matches!(lock.try_read(), Err(PalError::WouldBlock)));
            assert!(matches!(lock.try_write(), Err(PalError::WouldBlock)));
        }
        assert_eq!(*lock.read(), "hello");
    }

    #[test]
    fn raw_unlock_picks_mode() {
        let lock = RwLock::new(());

        lock.read_raw();
        lock.try_read_raw().unwrap();
        unsafe {
            lock.unlock_raw();
            lock.unlock_raw();
        }
        assert!(!lock.is_locked());

        lock.write_raw();
        assert!(matches!(lock.try_read_raw(), Err(PalError::WouldBlock)));
        unsafe { lock.unlock_raw() };
        assert!(!lock.is_locked());
    }
}
