//! Reusable scratch objects.
//!
//! A [`Pool`] hands out exclusive ownership of an idle object and takes it
//! back when the borrower is done. Objects are recycled (cleared) on the way
//! in so nothing leaks between unrelated calls.

use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

/// Buffers that grew past this capacity are dropped instead of pooled.
pub const MAX_RETAINED_BUFFER_CAPACITY: usize = 1 << 20;

/// Clears an object so it can be handed to an unrelated borrower.
pub trait Recycle {
    fn recycle(&mut self);

    /// Whether the object is still worth keeping after use.
    fn retain(&self) -> bool {
        true
    }
}

impl<T: Recycle + ?Sized> Recycle for Box<T> {
    fn recycle(&mut self) {
        (**self).recycle();
    }

    fn retain(&self) -> bool {
        (**self).retain()
    }
}

impl Recycle for Vec<u8> {
    fn recycle(&mut self) {
        self.clear();
    }

    fn retain(&self) -> bool {
        self.capacity() <= MAX_RETAINED_BUFFER_CAPACITY
    }
}

/// A bounded stack of idle objects.
pub struct Pool<T> {
    idle: Mutex<Vec<T>>,
    max_retained: usize,
}

impl<T> Pool<T> {
    pub const fn new(max_retained: usize) -> Self {
        Self {
            idle: parking_lot::const_mutex(Vec::new()),
            max_retained,
        }
    }

    /// Number of idle objects waiting for a borrower.
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }
}

impl<T: Recycle + Default> Pool<T> {
    /// Takes ownership of an idle object, or a fresh one if none is idle.
    pub fn take(&self) -> T {
        self.idle.lock().pop().unwrap_or_default()
    }

    /// Returns an object to the pool. It must not be used afterwards.
    pub fn put(&self, mut item: T) {
        if !item.retain() {
            return;
        }
        item.recycle();
        let mut idle = self.idle.lock();
        if idle.len() < self.max_retained {
            idle.push(item);
        }
    }

    /// Borrows an object for the lifetime of the returned guard.
    pub fn acquire(&self) -> Pooled<'_, T> {
        Pooled {
            pool: self,
            item: Some(self.take()),
        }
    }
}

/// An object on loan from a [`Pool`]; returned when dropped.
pub struct Pooled<'p, T: Recycle + Default> {
    pool: &'p Pool<T>,
    item: Option<T>,
}

impl<T: Recycle + Default> Pooled<'_, T> {
    /// Detaches the object; it will not go back to the pool.
    pub fn into_inner(mut self) -> T {
        self.item.take().unwrap_or_default()
    }
}

impl<T: Recycle + Default> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `into_inner` and `drop` empty the slot, and both consume the guard.
        self.item.as_ref().unwrap_or_else(|| unreachable!("pooled object already released"))
    }
}

impl<T: Recycle + Default> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().unwrap_or_else(|| unreachable!("pooled object already released"))
    }
}

impl<T: Recycle + Default> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.put(item);
        }
    }
}
