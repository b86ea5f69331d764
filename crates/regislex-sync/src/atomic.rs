//! Sequentially consistent atomics.
//!
//! `add` and `sub` return the value *after* the operation; `cas` reports
//! whether the swap happened.

use std::sync::atomic::{AtomicI32, AtomicI64, AtomicPtr, Ordering::SeqCst};

macro_rules! atomic_int {
    ($(#[$meta:meta])* $name:ident, $std:ty, $int:ty) => {
        $(#[$meta])*
        #[derive(Debug, Default)]
        #[repr(transparent)]
        pub struct $name($std);

        impl $name {
            pub const fn new(value: $int) -> Self {
                Self(<$std>::new(value))
            }

            /// View a plain integer owned elsewhere as an atomic.
            ///
            /// # Safety
            ///
            /// `ptr` must be non-null, aligned to the atomic's alignment,
            /// valid for `'a`, and only accessed atomically during `'a`.
            pub unsafe fn from_ptr<'a>(ptr: *mut $int) -> &'a Self {
                &*(ptr as *const Self)
            }

            pub fn load(&self) -> $int {
                self.0.load(SeqCst)
            }

            pub fn store(&self, value: $int) {
                self.0.store(value, SeqCst);
            }

            /// Add `delta` (wrapping) and return the new value.
            pub fn add(&self, delta: $int) -> $int {
                self.0.fetch_add(delta, SeqCst).wrapping_add(delta)
            }

            /// Subtract `delta` (wrapping) and return the new value.
            pub fn sub(&self, delta: $int) -> $int {
                self.0.fetch_sub(delta, SeqCst).wrapping_sub(delta)
            }

            /// Store `desired` only if the current value is `expected`.
            pub fn cas(&self, expected: $int, desired: $int) -> bool {
                self.0
                    .compare_exchange(expected, desired, SeqCst, SeqCst)
                    .is_ok()
            }

            /// Store `value` and return the previous one.
            pub fn swap(&self, value: $int) -> $int {
                self.0.swap(value, SeqCst)
            }
        }
    };
}

atomic_int!(
    /// Atomic 32-bit signed integer.
    Atomic32,
    AtomicI32,
    i32
);

atomic_int!(
    /// Atomic 64-bit signed integer.
    Atomic64,
    AtomicI64,
    i64
);

/// Atomic raw pointer.
#[derive(Debug)]
#[repr(transparent)]
pub struct AtomicPointer<T>(AtomicPtr<T>);

impl<T> AtomicPointer<T> {
    pub const fn new(ptr: *mut T) -> Self {
        Self(AtomicPtr::new(ptr))
    }

    /// View a pointer slot owned elsewhere as an atomic.
    ///
    /// # Safety
    ///
    /// Same contract as [`Atomic32::from_ptr`].
    pub unsafe fn from_ptr<'a>(ptr: *mut *mut T) -> &'a Self {
        &*(ptr as *const Self)
    }

    pub fn null() -> Self {
        Self::new(std::ptr::null_mut())
    }

    pub fn load(&self) -> *mut T {
        self.0.load(SeqCst)
    }

    pub fn store(&self, ptr: *mut T) {
        self.0.store(ptr, SeqCst);
    }

    pub fn cas(&self, expected: *mut T, desired: *mut T) -> bool {
        self.0
            .compare_exchange(expected, desired, SeqCst, SeqCst)
            .is_ok()
    }

    pub fn swap(&self, ptr: *mut T) -> *mut T {
        self.0.swap(ptr, SeqCst)
    }
}

impl<T> Default for AtomicPointer<T> {
    fn default() -> Self {
        Self::null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_return_new_value() {
        let a = Atomic32::new(10);
        assert_eq!(a.add(5), 15);
        assert_eq!(a.sub(20), -5);
        assert_eq!(a.load(), -5);

        let b = Atomic64::new(i64::MAX);
        assert_eq!(b.add(1), i64::MIN);
    }

    #[test]
    fn cas_only_swaps_on_match() {
        let a = Atomic64::new(1);
        assert!(!a.cas(2, 3));
        assert_eq!(a.load(), 1);
        assert!(a.cas(1, 3));
        assert_eq!(a.load(), 3);
        assert_eq!(a.swap(9), 3);
    }

    #[test]
    fn from_ptr_shares_storage() {
        let mut raw: i32 = 5;
        let view = unsafe { Atomic32::from_ptr(&mut raw) };
        assert_eq!(view.add(2), 7);
        assert_eq!(raw, 7);
    }

    #[test]
    fn pointer_cas() {
        let mut x = 1u8;
        let mut y = 2u8;
        let p = AtomicPointer::<u8>::default();
        assert!(p.load().is_null());
        assert!(p.cas(std::ptr::null_mut(), &mut x));
        assert!(!p.cas(std::ptr::null_mut(), &mut y));
        assert_eq!(p.load(), &mut x as *mut u8);
        p.store(&mut y);
        assert_eq!(p.swap(std::ptr::null_mut()), &mut y as *mut u8);
    }
}
