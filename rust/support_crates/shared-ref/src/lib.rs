//! An explicitly reference counted value handle with a destructor hook.
//!
//! [`Shared<T>`] places a value behind an atomic reference count. New
//! references are taken with [`Shared::acquire`] (or `clone`), and every
//! handle releases its reference on drop. When the last reference goes away,
//! an optional notify callback runs against the value before it is dropped
//! and its storage freed.
//!
//! Unlike `Arc`, the count here is part of the contract rather than an
//! implementation detail: [`Shared::ref_count`] is observable, and the
//! release path is a compare-and-swap retry loop, so two threads racing to
//! drop the last reference can neither double-free nor leak the value.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering, fence};

/// Callback invoked on the value right before the last reference drops it.
type Notify<T> = Box<dyn FnOnce(&mut T) + Send>;

struct Inner<T> {
    count: AtomicUsize,
    notify: Option<Notify<T>>,
    value: T,
}

/// An atomically reference counted handle to a heap-allocated value.
pub struct Shared<T> {
    inner: NonNull<Inner<T>>,
    marker: PhantomData<Inner<T>>,
}

unsafe impl<T: Send + Sync> Send for Shared<T> {}
unsafe impl<T: Send + Sync> Sync for Shared<T> {}

impl<T> Shared<T> {
    /// Moves `value` into a shared allocation with a reference count of one.
    pub fn new(value: T) -> Shared<T> {
        Shared::alloc(value, None)
    }

    /// Like [`Shared::new`], with a callback that runs exactly once, right
    /// before the value is dropped by the final release.
    pub fn with_notify(value: T, notify: impl FnOnce(&mut T) + Send + 'static) -> Shared<T> {
        Shared::alloc(value, Some(Box::new(notify)))
    }

    fn alloc(value: T, notify: Option<Notify<T>>) -> Shared<T> {
        let inner = Box::new(Inner {
            count: AtomicUsize::new(1),
            notify,
            value,
        });
        Shared {
            inner: NonNull::from(Box::leak(inner)),
            marker: PhantomData,
        }
    }

    #[inline]
    fn inner(&self) -> &Inner<T> {
        // Valid for as long as any handle exists.
        unsafe { self.inner.as_ref() }
    }

    /// Acquires an additional reference to the value.
    ///
    /// Never blocks; the increment does not need to synchronize with anything
    /// because the caller already holds a live reference.
    #[inline]
    pub fn acquire(&self) -> Shared<T> {
        self.inner().count.fetch_add(1, Ordering::Relaxed);
        Shared {
            inner: self.inner,
            marker: PhantomData,
        }
    }

    /// Returns the number of live references to the value.
    ///
    /// The result is a snapshot; other threads may change it immediately.
    #[inline]
    pub fn ref_count(&self) -> usize {
        self.inner().count.load(Ordering::Acquire)
    }

    /// Returns a mutable reference to the value when this is the only handle.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.inner().count.load(Ordering::Acquire) == 1 {
            // Sole owner, and `&mut self` pins the handle itself.
            Some(unsafe { &mut self.inner.as_mut().value })
        } else {
            None
        }
    }

    unsafe fn destroy(&mut self) {
        let mut inner = unsafe { Box::from_raw(self.inner.as_ptr()) };
        if let Some(notify) = inner.notify.take() {
            notify(&mut inner.value);
        }
        drop(inner);
    }
}

impl<T> Deref for Shared<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.inner().value
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Shared<T> {
        self.acquire()
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        // Release path: a count of one means this handle is the sole owner
        // and may destroy the value outright. Any larger count is lowered by
        // a compare-and-swap that retries on concurrent modification instead
        // of corrupting the count.
        loop {
            let count = self.inner().count.load(Ordering::Relaxed);
            debug_assert_ne!(count, 0, "released a dead reference");

            if count == 1 {
                // Synchronize with every prior release before dropping.
                fence(Ordering::Acquire);
                unsafe { self.destroy() };
                return;
            }

            if self
                .inner()
                .count
                .compare_exchange_weak(count, count - 1, Ordering::Release, Ordering::Relaxed)
                .is_ok()
            {
                return;
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("ref_count", &self.ref_count())
            .field("value", &**self)
            .finish()
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Shared<T> {
        Shared::new(T::default())
    }
}
