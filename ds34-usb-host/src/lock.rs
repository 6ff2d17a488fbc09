//! Serialization of transfers on one endpoint group.

use core::cell::{Cell, RefCell};
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

/// A single-permit lock.
///
/// `acquire` suspends until the permit is free; the returned guard
/// releases it on drop and wakes the next waiter. Each pad slot holds
/// two of these, one serializing input transfers and one serializing
/// command transfers, so at most one transfer of each kind is
/// outstanding per slot.
pub struct TransferLock {
    taken: Cell<bool>,
    waker: RefCell<Option<Waker>>,
}

/// Holds the permit of a [`TransferLock`] until dropped.
pub struct TransferGuard<'a> {
    lock: &'a TransferLock,
}

impl Drop for TransferGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

pub struct LockFuture<'a> {
    lock: &'a TransferLock,
}

impl<'a> Future for LockFuture<'a> {
    type Output = TransferGuard<'a>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.lock.waker.replace(Some(cx.waker().clone()));

        if let Some(guard) = self.lock.try_acquire() {
            Poll::Ready(guard)
        } else {
            Poll::Pending
        }
    }
}

impl TransferLock {
    pub const fn new() -> Self {
        Self {
            taken: Cell::new(false),
            waker: RefCell::new(None),
        }
    }

    /// Take the permit if it is free right now.
    ///
    /// The connect path uses this where the slot is known to be
    /// unowned and the poll just drains any residual claim.
    pub fn try_acquire(&self) -> Option<TransferGuard<'_>> {
        critical_section::with(|_| {
            if self.taken.get() {
                None
            } else {
                self.taken.set(true);
                Some(TransferGuard { lock: self })
            }
        })
    }

    pub async fn acquire(&self) -> TransferGuard<'_> {
        LockFuture { lock: self }.await
    }

    fn release(&self) {
        critical_section::with(|_| self.taken.set(false));

        if let Some(w) = self.waker.take() {
            w.wake();
        }
    }
}

impl Default for TransferLock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(test, feature = "std"))]
#[path = "tests/lock.rs"]
mod tests;
