use std::cell::Cell;
use std::rc::Rc;

/// Shared flag checked by every polling loop before it sleeps again.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Ties the token to the lifetime of the returned guard.
    pub fn drop_guard(self) -> DropGuard {
        DropGuard { token: self }
    }
}

/// Cancels its token when dropped, so a view that owns the guard tears down
/// its poll loops with it.
#[derive(Debug)]
pub struct DropGuard {
    token: CancellationToken,
}

impl DropGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
