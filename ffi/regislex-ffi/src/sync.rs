//! Thread, lock, condition variable and atomic exports.
//!
//! Locks here are taken and released by separate calls, so they sit on the
//! raw (guard-less) entry points of `regislex-sync`.

use std::os::raw::c_void;
use std::time::Duration;

use regislex_sync::{Atomic32, Atomic64, AtomicPointer, Condvar, Mutex, RwLock, Thread};

use crate::args::{try_pal, write_out};
use crate::error::{status, RegislexErrorCode};

/// Thread entry point: receives the `arg` given to `regislex_thread_create`
/// and returns the value handed back by `regislex_thread_join`.
pub type RegislexThreadFn = extern "C" fn(*mut c_void) -> *mut c_void;

/// Carries a C pointer across the thread boundary.
#[derive(Clone, Copy)]
struct SendPtr(*mut c_void);

// SAFETY: the pointer is only handed back to C, which owns its meaning.
unsafe impl Send for SendPtr {}

impl SendPtr {
    fn get(self) -> *mut c_void {
        self.0
    }
}

/// Helper for the create functions: box `value` into `*out`.
unsafe fn new_handle<T>(out: *mut *mut T, value: T) -> RegislexErrorCode {
    if out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    write_out(out, Box::into_raw(Box::new(value)))
}

// ============================================================================
// Threads
// ============================================================================

/// Opaque thread handle.
pub struct RegislexThread {
    inner: Thread<SendPtr>,
}

/// Start a thread running `start(arg)`.
///
/// The handle must be passed to exactly one of `regislex_thread_join` or
/// `regislex_thread_detach`.
///
/// # Safety
///
/// `thread_out` must be valid for writes; `arg` must be usable from the new
/// thread.
///
/// # Example (C)
///
/// ```c
/// RegislexThread* t;
/// void* result;
/// regislex_thread_create(worker, &job, &t);
/// regislex_thread_join(t, &result);
/// ```
#[no_mangle]
pub unsafe extern "C" fn regislex_thread_create(
    start: Option<RegislexThreadFn>,
    arg: *mut c_void,
    thread_out: *mut *mut RegislexThread,
) -> RegislexErrorCode {
    let Some(start) = start else {
        return RegislexErrorCode::InvalidArgument;
    };
    if thread_out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    let arg = SendPtr(arg);
    let inner = try_pal!(Thread::spawn(move || SendPtr(start(arg.get()))));
    new_handle(thread_out, RegislexThread { inner })
}

/// Wait for a thread and release its handle.
///
/// The entry point's return value is stored in `*result_out` unless
/// `result_out` is null.
///
/// # Safety
///
/// `thread` must come from `regislex_thread_create` and not have been
/// joined or detached.
#[no_mangle]
pub unsafe extern "C" fn regislex_thread_join(
    thread: *mut RegislexThread,
    result_out: *mut *mut c_void,
) -> RegislexErrorCode {
    if thread.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    let thread = Box::from_raw(thread);
    let result = try_pal!(thread.inner.join());
    if !result_out.is_null() {
        *result_out = result.get();
    }
    RegislexErrorCode::Ok
}

/// Let a thread run to completion unobserved and release its handle.
///
/// # Safety
///
/// Same as `regislex_thread_join`.
#[no_mangle]
pub unsafe extern "C" fn regislex_thread_detach(thread: *mut RegislexThread) -> RegislexErrorCode {
    if thread.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    Box::from_raw(thread).inner.detach();
    RegislexErrorCode::Ok
}

/// Offer the rest of this time slice to other threads.
#[no_mangle]
pub extern "C" fn regislex_thread_yield() {
    regislex_sync::yield_now();
}

// ============================================================================
// Mutex
// ============================================================================

/// Opaque non-recursive mutex.
pub struct RegislexMutex {
    inner: Mutex<()>,
}

/// # Safety
///
/// `mutex_out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn regislex_mutex_create(
    mutex_out: *mut *mut RegislexMutex,
) -> RegislexErrorCode {
    new_handle(mutex_out, RegislexMutex { inner: Mutex::new(()) })
}

/// Release a mutex. Null is a no-op.
///
/// # Safety
///
/// `mutex` must be null or come from `regislex_mutex_create`, with no
/// thread waiting on it.
#[no_mangle]
pub unsafe extern "C" fn regislex_mutex_destroy(mutex: *mut RegislexMutex) {
    if !mutex.is_null() {
        drop(Box::from_raw(mutex));
    }
}

/// Block until the mutex is acquired.
///
/// # Safety
///
/// `mutex` must come from `regislex_mutex_create`.
#[no_mangle]
pub unsafe extern "C" fn regislex_mutex_lock(mutex: *mut RegislexMutex) -> RegislexErrorCode {
    let Some(mutex) = mutex.as_ref() else {
        return RegislexErrorCode::InvalidArgument;
    };
    mutex.inner.lock_raw();
    RegislexErrorCode::Ok
}

/// Acquire without blocking; `REGISLEX_ERR_WOULD_BLOCK` when held.
///
/// # Safety
///
/// `mutex` must come from `regislex_mutex_create`.
#[no_mangle]
pub unsafe extern "C" fn regislex_mutex_trylock(mutex: *mut RegislexMutex) -> RegislexErrorCode {
    let Some(mutex) = mutex.as_ref() else {
        return RegislexErrorCode::InvalidArgument;
    };
    status(mutex.inner.try_lock_raw())
}

/// Release a held mutex. Unlocking a free mutex is `INVALID_ARGUMENT`.
///
/// # Safety
///
/// `mutex` must come from `regislex_mutex_create` and be held by the caller.
#[no_mangle]
pub unsafe extern "C" fn regislex_mutex_unlock(mutex: *mut RegislexMutex) -> RegislexErrorCode {
    let Some(mutex) = mutex.as_ref() else {
        return RegislexErrorCode::InvalidArgument;
    };
    if !mutex.inner.is_locked() {
        return RegislexErrorCode::InvalidArgument;
    }
    mutex.inner.unlock_raw();
    RegislexErrorCode::Ok
}

// ============================================================================
// Condition variable
// ============================================================================

/// Opaque condition variable.
pub struct RegislexCond {
    inner: Condvar,
}

/// # Safety
///
/// `cond_out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn regislex_cond_create(cond_out: *mut *mut RegislexCond) -> RegislexErrorCode {
    new_handle(cond_out, RegislexCond { inner: Condvar::new() })
}

/// Release a condition variable. Null is a no-op.
///
/// # Safety
///
/// `cond` must be null or come from `regislex_cond_create`, with no waiters.
#[no_mangle]
pub unsafe extern "C" fn regislex_cond_destroy(cond: *mut RegislexCond) {
    if !cond.is_null() {
        drop(Box::from_raw(cond));
    }
}

/// Atomically release `mutex` and wait; the mutex is held again on return.
///
/// Wakeups may be spurious: re-check the predicate in a loop.
///
/// # Safety
///
/// Both handles must be live and `mutex` held by the caller.
#[no_mangle]
pub unsafe extern "C" fn regislex_cond_wait(
    cond: *mut RegislexCond,
    mutex: *mut RegislexMutex,
) -> RegislexErrorCode {
    let (Some(cond), Some(mutex)) = (cond.as_ref(), mutex.as_ref()) else {
        return RegislexErrorCode::InvalidArgument;
    };
    if !mutex.inner.is_locked() {
        return RegislexErrorCode::InvalidArgument;
    }
    cond.inner.wait_raw(&mutex.inner);
    RegislexErrorCode::Ok
}

/// Like `regislex_cond_wait`, giving up after `timeout_ms` with
/// `REGISLEX_ERR_TIMEOUT`. The mutex is held again either way.
///
/// # Safety
///
/// Same as `regislex_cond_wait`.
#[no_mangle]
pub unsafe extern "C" fn regislex_cond_timedwait(
    cond: *mut RegislexCond,
    mutex: *mut RegislexMutex,
    timeout_ms: u64,
) -> RegislexErrorCode {
    let (Some(cond), Some(mutex)) = (cond.as_ref(), mutex.as_ref()) else {
        return RegislexErrorCode::InvalidArgument;
    };
    if !mutex.inner.is_locked() {
        return RegislexErrorCode::InvalidArgument;
    }
    status(
        cond.inner
            .wait_timeout_raw(&mutex.inner, Duration::from_millis(timeout_ms)),
    )
}

/// Wake one waiter, if any.
///
/// # Safety
///
/// `cond` must come from `regislex_cond_create`.
#[no_mangle]
pub unsafe extern "C" fn regislex_cond_signal(cond: *mut RegislexCond) -> RegislexErrorCode {
    let Some(cond) = cond.as_ref() else {
        return RegislexErrorCode::InvalidArgument;
    };
    cond.inner.signal();
    RegislexErrorCode::Ok
}

/// Wake every waiter.
///
/// # Safety
///
/// `cond` must come from `regislex_cond_create`.
#[no_mangle]
pub unsafe extern "C" fn regislex_cond_broadcast(cond: *mut RegislexCond) -> RegislexErrorCode {
    let Some(cond) = cond.as_ref() else {
        return RegislexErrorCode::InvalidArgument;
    };
    cond.inner.broadcast();
    RegislexErrorCode::Ok
}

// ============================================================================
// Reader-writer lock
// ============================================================================

/// Opaque reader-writer lock.
pub struct RegislexRwLock {
    inner: RwLock<()>,
}

/// # Safety
///
/// `lock_out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn regislex_rwlock_create(
    lock_out: *mut *mut RegislexRwLock,
) -> RegislexErrorCode {
    new_handle(lock_out, RegislexRwLock { inner: RwLock::new(()) })
}

/// Release a lock. Null is a no-op.
///
/// # Safety
///
/// `lock` must be null or come from `regislex_rwlock_create`.
#[no_mangle]
pub unsafe extern "C" fn regislex_rwlock_destroy(lock: *mut RegislexRwLock) {
    if !lock.is_null() {
        drop(Box::from_raw(lock));
    }
}

macro_rules! rwlock_op {
    ($(#[$meta:meta])* $name:ident, |$lock:ident| $body:expr) => {
        $(#[$meta])*
        ///
        /// # Safety
        ///
        /// `lock` must come from `regislex_rwlock_create`.
        #[no_mangle]
        pub unsafe extern "C" fn $name(lock: *mut RegislexRwLock) -> RegislexErrorCode {
            let Some($lock) = lock.as_ref() else {
                return RegislexErrorCode::InvalidArgument;
            };
            $body
        }
    };
}

rwlock_op!(
    /// Acquire shared access, blocking while a writer holds the lock.
    regislex_rwlock_rdlock,
    |lock| {
        lock.inner.read_raw();
        RegislexErrorCode::Ok
    }
);

rwlock_op!(
    /// Acquire exclusive access, blocking while anyone holds the lock.
    regislex_rwlock_wrlock,
    |lock| {
        lock.inner.write_raw();
        RegislexErrorCode::Ok
    }
);

rwlock_op!(
    /// Shared access without blocking; `REGISLEX_ERR_WOULD_BLOCK` if a
    /// writer holds the lock.
    regislex_rwlock_tryrdlock,
    |lock| status(lock.inner.try_read_raw())
);

rwlock_op!(
    /// Exclusive access without blocking; `REGISLEX_ERR_WOULD_BLOCK` if the
    /// lock is held.
    regislex_rwlock_trywrlock,
    |lock| status(lock.inner.try_write_raw())
);

rwlock_op!(
    /// Release whichever kind of access the caller holds.
    regislex_rwlock_unlock,
    |lock| {
        if !lock.inner.is_locked() {
            return RegislexErrorCode::InvalidArgument;
        }
        lock.inner.unlock_raw();
        RegislexErrorCode::Ok
    }
);

// ============================================================================
// Atomics
// ============================================================================
//
// All operations are sequentially consistent and act on caller-owned,
// naturally aligned storage. `add`/`sub` return the new value.

macro_rules! atomic_ops {
    ($atomic:ty, $int:ty, $load:ident, $store:ident, $add:ident, $sub:ident, $cas:ident) => {
        /// # Safety
        ///
        /// `ptr` must be non-null, aligned and only accessed atomically.
        #[no_mangle]
        pub unsafe extern "C" fn $load(ptr: *mut $int) -> $int {
            <$atomic>::from_ptr(ptr).load()
        }

        /// # Safety
        ///
        /// Same as the matching load.
        #[no_mangle]
        pub unsafe extern "C" fn $store(ptr: *mut $int, value: $int) {
            <$atomic>::from_ptr(ptr).store(value)
        }

        /// Add `delta` (wrapping) and return the new value.
        ///
        /// # Safety
        ///
        /// Same as the matching load.
        #[no_mangle]
        pub unsafe extern "C" fn $add(ptr: *mut $int, delta: $int) -> $int {
            <$atomic>::from_ptr(ptr).add(delta)
        }

        /// Subtract `delta` (wrapping) and return the new value.
        ///
        /// # Safety
        ///
        /// Same as the matching load.
        #[no_mangle]
        pub unsafe extern "C" fn $sub(ptr: *mut $int, delta: $int) -> $int {
            <$atomic>::from_ptr(ptr).sub(delta)
        }

        /// Store `desired` if the current value equals `expected`; true on swap.
        ///
        /// # Safety
        ///
        /// Same as the matching load.
        #[no_mangle]
        pub unsafe extern "C" fn $cas(ptr: *mut $int, expected: $int, desired: $int) -> bool {
            <$atomic>::from_ptr(ptr).cas(expected, desired)
        }
    };
}

atomic_ops!(
    Atomic32,
    i32,
    regislex_atomic_load32,
    regislex_atomic_store32,
    regislex_atomic_add32,
    regislex_atomic_sub32,
    regislex_atomic_cas32
);

atomic_ops!(
    Atomic64,
    i64,
    regislex_atomic_load64,
    regislex_atomic_store64,
    regislex_atomic_add64,
    regislex_atomic_sub64,
    regislex_atomic_cas64
);

/// # Safety
///
/// `ptr` must be non-null, aligned and only accessed atomically.
#[no_mangle]
pub unsafe extern "C" fn regislex_atomic_load_ptr(ptr: *mut *mut c_void) -> *mut c_void {
    AtomicPointer::from_ptr(ptr).load()
}

/// # Safety
///
/// Same as `regislex_atomic_load_ptr`.
#[no_mangle]
pub unsafe extern "C" fn regislex_atomic_store_ptr(ptr: *mut *mut c_void, value: *mut c_void) {
    AtomicPointer::from_ptr(ptr).store(value)
}

/// Store `desired` if the slot holds `expected`; true on swap.
///
/// # Safety
///
/// Same as `regislex_atomic_load_ptr`.
#[no_mangle]
pub unsafe extern "C" fn regislex_atomic_cas_ptr(
    ptr: *mut *mut c_void,
    expected: *mut c_void,
    desired: *mut c_void,
) -> bool {
    AtomicPointer::from_ptr(ptr).cas(expected, desired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    extern "C" fn double(arg: *mut c_void) -> *mut c_void {
        (arg as usize * 2) as *mut c_void
    }

    #[test]
    fn thread_join_returns_entry_result() {
        let mut thread = ptr::null_mut();
        unsafe {
            assert_eq!(
                regislex_thread_create(Some(double), 21 as *mut c_void, &mut thread),
                RegislexErrorCode::Ok
            );
            let mut result = ptr::null_mut();
            assert_eq!(
                regislex_thread_join(thread, &mut result),
                RegislexErrorCode::Ok
            );
            assert_eq!(result as usize, 42);
        }
    }

    #[test]
    fn thread_create_rejects_null_entry() {
        let mut thread = ptr::null_mut();
        let code = unsafe { regislex_thread_create(None, ptr::null_mut(), &mut thread) };
        assert_eq!(code, RegislexErrorCode::InvalidArgument);
        assert!(thread.is_null());
    }

    #[test]
    fn thread_detach_releases_handle() {
        let mut thread = ptr::null_mut();
        unsafe {
            assert_eq!(
                regislex_thread_create(Some(double), ptr::null_mut(), &mut thread),
                RegislexErrorCode::Ok
            );
            assert_eq!(regislex_thread_detach(thread), RegislexErrorCode::Ok);
        }
        regislex_thread_yield();
    }

    #[test]
    fn mutex_trylock_and_unlock() {
        let mut m = ptr::null_mut();
        unsafe {
            assert_eq!(regislex_mutex_create(&mut m), RegislexErrorCode::Ok);
            assert_eq!(regislex_mutex_unlock(m), RegislexErrorCode::InvalidArgument);
            assert_eq!(regislex_mutex_lock(m), RegislexErrorCode::Ok);
            assert_eq!(regislex_mutex_trylock(m), RegislexErrorCode::WouldBlock);
            assert_eq!(regislex_mutex_unlock(m), RegislexErrorCode::Ok);
            assert_eq!(regislex_mutex_trylock(m), RegislexErrorCode::Ok);
            assert_eq!(regislex_mutex_unlock(m), RegislexErrorCode::Ok);
            regislex_mutex_destroy(m);
        }
    }

    #[test]
    fn cond_timedwait_times_out_and_reacquires() {
        let mut m = ptr::null_mut();
        let mut c = ptr::null_mut();
        unsafe {
            regislex_mutex_create(&mut m);
            regislex_cond_create(&mut c);
            regislex_mutex_lock(m);
            assert_eq!(regislex_cond_timedwait(c, m, 20), RegislexErrorCode::Timeout);
            assert_eq!(regislex_mutex_trylock(m), RegislexErrorCode::WouldBlock);
            assert_eq!(regislex_mutex_unlock(m), RegislexErrorCode::Ok);
            assert_eq!(regislex_cond_wait(c, m), RegislexErrorCode::InvalidArgument);
            assert_eq!(regislex_cond_signal(c), RegislexErrorCode::Ok);
            assert_eq!(regislex_cond_broadcast(c), RegislexErrorCode::Ok);
            regislex_cond_destroy(c);
            regislex_mutex_destroy(m);
        }
    }

    #[test]
    fn cond_wakes_waiter() {
        struct Shared {
            mutex: *mut RegislexMutex,
            cond: *mut RegislexCond,
            ready: i32,
        }

        extern "C" fn waiter(arg: *mut c_void) -> *mut c_void {
            let shared = arg.cast::<Shared>();
            unsafe {
                regislex_mutex_lock((*shared).mutex);
                while regislex_atomic_load32(ptr::addr_of_mut!((*shared).ready)) == 0 {
                    regislex_cond_wait((*shared).cond, (*shared).mutex);
                }
                regislex_mutex_unlock((*shared).mutex);
            }
            ptr::null_mut()
        }

        let mut shared = Shared {
            mutex: ptr::null_mut(),
            cond: ptr::null_mut(),
            ready: 0,
        };
        unsafe {
            regislex_mutex_create(&mut shared.mutex);
            regislex_cond_create(&mut shared.cond);
            let arg = ptr::addr_of_mut!(shared);
            let mut thread = ptr::null_mut();
            assert_eq!(
                regislex_thread_create(Some(waiter), arg.cast(), &mut thread),
                RegislexErrorCode::Ok
            );

            regislex_mutex_lock((*arg).mutex);
            regislex_atomic_store32(ptr::addr_of_mut!((*arg).ready), 1);
            regislex_cond_broadcast((*arg).cond);
            regislex_mutex_unlock((*arg).mutex);

            assert_eq!(
                regislex_thread_join(thread, ptr::null_mut()),
                RegislexErrorCode::Ok
            );
            regislex_cond_destroy((*arg).cond);
            regislex_mutex_destroy((*arg).mutex);
        }
    }

    #[test]
    fn rwlock_readers_share_writers_exclude() {
        let mut l = ptr::null_mut();
        unsafe {
            assert_eq!(regislex_rwlock_create(&mut l), RegislexErrorCode::Ok);
            assert_eq!(regislex_rwlock_rdlock(l), RegislexErrorCode::Ok);
            assert_eq!(regislex_rwlock_tryrdlock(l), RegislexErrorCode::Ok);
            assert_eq!(regislex_rwlock_trywrlock(l), RegislexErrorCode::WouldBlock);
            assert_eq!(regislex_rwlock_unlock(l), RegislexErrorCode::Ok);
            assert_eq!(regislex_rwlock_unlock(l), RegislexErrorCode::Ok);

            assert_eq!(regislex_rwlock_wrlock(l), RegislexErrorCode::Ok);
            assert_eq!(regislex_rwlock_tryrdlock(l), RegislexErrorCode::WouldBlock);
            assert_eq!(regislex_rwlock_unlock(l), RegislexErrorCode::Ok);
            assert_eq!(regislex_rwlock_unlock(l), RegislexErrorCode::InvalidArgument);
            regislex_rwlock_destroy(l);
        }
    }

    #[test]
    fn atomics_on_caller_storage() {
        let mut n32: i32 = 0;
        let mut n64: i64 = 10;
        let mut slot: *mut c_void = ptr::null_mut();
        let mut target = 5u8;
        unsafe {
            assert_eq!(regislex_atomic_add32(&mut n32, 3), 3);
            assert_eq!(regislex_atomic_sub32(&mut n32, 5), -2);
            assert!(regislex_atomic_cas32(&mut n32, -2, 7));
            assert!(!regislex_atomic_cas32(&mut n32, -2, 9));
            assert_eq!(regislex_atomic_load32(&mut n32), 7);

            regislex_atomic_store64(&mut n64, i64::MAX);
            assert_eq!(regislex_atomic_add64(&mut n64, 1), i64::MIN);
            assert_eq!(regislex_atomic_sub64(&mut n64, 1), i64::MAX);
            assert!(regislex_atomic_cas64(&mut n64, i64::MAX, 0));
            assert_eq!(regislex_atomic_load64(&mut n64), 0);

            let p = ptr::addr_of_mut!(target).cast::<c_void>();
            assert!(regislex_atomic_cas_ptr(&mut slot, ptr::null_mut(), p));
            assert_eq!(regislex_atomic_load_ptr(&mut slot), p);
            regislex_atomic_store_ptr(&mut slot, ptr::null_mut());
            assert!(regislex_atomic_load_ptr(&mut slot).is_null());
        }
    }
}
