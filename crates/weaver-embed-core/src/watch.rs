//! Mutation watcher state and pass serialization.

use std::cell::Cell;

/// Observable phase of the mutation watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchPhase {
    Uninitialized,
    Watching,
    Disposed,
}

/// Watcher state, holding the live subscription while watching.
///
/// `Disposed` is terminal.
#[derive(Debug)]
pub enum WatchState<S> {
    Uninitialized,
    Watching(S),
    Disposed,
}

impl<S> Default for WatchState<S> {
    fn default() -> Self {
        WatchState::Uninitialized
    }
}

impl<S> WatchState<S> {
    pub fn phase(&self) -> WatchPhase {
        match self {
            WatchState::Uninitialized => WatchPhase::Uninitialized,
            WatchState::Watching(_) => WatchPhase::Watching,
            WatchState::Disposed => WatchPhase::Disposed,
        }
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self, WatchState::Disposed)
    }

    /// Move to `Disposed`, handing back the subscription if there was one.
    pub fn dispose(&mut self) -> Option<S> {
        match std::mem::replace(self, WatchState::Disposed) {
            WatchState::Watching(subscription) => Some(subscription),
            _ => None,
        }
    }
}

/// Single-consumer queue of pass requests.
///
/// A request that arrives while a pass is running does not start a nested
/// pass; it marks the queue dirty and the running drain loops once more.
/// Any number of requests during one pass collapse into one follow-up pass.
#[derive(Debug, Default)]
pub struct PassQueue {
    running: Cell<bool>,
    dirty: Cell<bool>,
}

impl PassQueue {
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Run `pass` until no request arrives during it.
    ///
    /// Returns the number of passes executed by this call, which is zero when
    /// another drain is already in progress further up the stack.
    pub fn drain(&self, mut pass: impl FnMut()) -> usize {
        if self.running.get() {
            self.dirty.set(true);
            return 0;
        }
        self.running.set(true);
        let mut count = 0;
        loop {
            self.dirty.set(false);
            pass();
            count += 1;
            if !self.dirty.get() {
                break;
            }
        }
        self.running.set(false);
        count
    }
}
