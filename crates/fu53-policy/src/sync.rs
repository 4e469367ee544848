//! Lock-free one-time initialisation.
//!
//! Interposed functions can run before `main`, inside the dynamic loader and
//! on any thread, so nothing here may block or take a lock.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicPtr, Ordering};

/// Cell initialised at most once. Concurrent initialisers may each build a
/// value; the first published one wins and the rest are dropped.
pub struct InitOnce<T> {
    ptr: AtomicPtr<T>,
    _owns: PhantomData<Box<T>>,
}

// SAFETY: the value is shared by reference after publication only
unsafe impl<T: Send + Sync> Sync for InitOnce<T> {}
unsafe impl<T: Send> Send for InitOnce<T> {}

impl<T> InitOnce<T> {
    pub const fn new() -> Self {
        Self {
            ptr: AtomicPtr::new(std::ptr::null_mut()),
            _owns: PhantomData,
        }
    }

    pub fn get(&self) -> Option<&T> {
        let p = self.ptr.load(Ordering::Acquire);
        // SAFETY: non-null pointers were published from `Box::into_raw` and
        // are never freed while `self` is alive
        unsafe { p.as_ref() }
    }

    pub fn get_or_init<F: FnOnce() -> T>(&self, init: F) -> &T {
        if let Some(value) = self.get() {
            return value;
        }
        let fresh = Box::into_raw(Box::new(init()));
        match self.ptr.compare_exchange(
            std::ptr::null_mut(),
            fresh,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            // SAFETY: `fresh` is now owned by the cell
            Ok(_) => unsafe { &*fresh },
            Err(winner) => {
                // SAFETY: `fresh` was never shared; `winner` is published
                unsafe {
                    drop(Box::from_raw(fresh));
                    &*winner
                }
            }
        }
    }
}

impl<T> Default for InitOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for InitOnce<T> {
    fn drop(&mut self) {
        let p = *self.ptr.get_mut();
        if !p.is_null() {
            // SAFETY: exclusive access, pointer came from `Box::into_raw`
            unsafe { drop(Box::from_raw(p)) };
        }
    }
}
