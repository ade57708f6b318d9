use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Ordered invalidation levels; pending requests merge to the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum InvalidationLevel {
    #[default]
    None,
    /// Re-run layout and drawing with current data.
    Redraw,
    /// Pull series data sources before redrawing.
    UpdateData,
}

impl InvalidationLevel {
    #[must_use]
    pub const fn max(self, other: Self) -> Self {
        if self as u8 >= other as u8 {
            self
        } else {
            other
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Redraw,
            _ => Self::UpdateData,
        }
    }

    #[must_use]
    pub const fn updates_data(self) -> bool {
        matches!(self, Self::UpdateData)
    }
}

/// Coordinator state as observed from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedrawState {
    Idle,
    RedrawPending,
    Rendering,
}

const IDLE: u8 = 0;
const PENDING: u8 = 1;
const RENDERING: u8 = 2;

/// Callback that asks the host toolkit to schedule a pass on the rendering
/// thread.
pub type RedrawWaker = Arc<dyn Fn() + Send + Sync>;

/// Grant to run one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTicket {
    pub level: InvalidationLevel,
}

/// Lock-free redraw scheduling shared by every thread that invalidates a
/// view.
///
/// Any number of requests while a pass is pending collapse into that pass.
/// Requests while a pass is running schedule exactly one follow-up pass.
pub struct InvalidationCoordinator {
    state: AtomicU8,
    pending_level: AtomicU8,
    rerun: AtomicBool,
    waker: RwLock<Option<RedrawWaker>>,
}

impl fmt::Debug for InvalidationCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvalidationCoordinator")
            .field("state", &self.state())
            .field("pending_level", &self.pending_level())
            .field("rerun", &self.rerun.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Default for InvalidationCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl InvalidationCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(IDLE),
            pending_level: AtomicU8::new(InvalidationLevel::None as u8),
            rerun: AtomicBool::new(false),
            waker: RwLock::new(None),
        }
    }

    pub fn set_waker(&self, waker: Option<RedrawWaker>) {
        *self.waker.write() = waker;
    }

    #[must_use]
    pub fn state(&self) -> RedrawState {
        match self.state.load(Ordering::SeqCst) {
            IDLE => RedrawState::Idle,
            PENDING => RedrawState::RedrawPending,
            _ => RedrawState::Rendering,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state() == RedrawState::RedrawPending
    }

    #[must_use]
    pub fn pending_level(&self) -> InvalidationLevel {
        InvalidationLevel::from_u8(self.pending_level.load(Ordering::SeqCst))
    }

    fn wake(&self) {
        let waker = self.waker.read().clone();
        if let Some(waker) = waker {
            waker();
        }
    }

    /// Records a request from any thread. Never blocks the caller beyond a
    /// short read of the waker slot.
    pub fn request_invalidate(&self, update_data: bool) {
        let level = if update_data {
            InvalidationLevel::UpdateData
        } else {
            InvalidationLevel::Redraw
        };
        self.pending_level.fetch_max(level as u8, Ordering::SeqCst);

        loop {
            match self
                .state
                .compare_exchange(IDLE, PENDING, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => {
                    trace!(?level, "invalidation scheduled a pass");
                    self.wake();
                    return;
                }
                Err(PENDING) => {
                    trace!(?level, "invalidation coalesced into pending pass");
                    return;
                }
                Err(_) => {
                    self.rerun.store(true, Ordering::SeqCst);
                    if self.state.load(Ordering::SeqCst) == RENDERING {
                        trace!(?level, "invalidation deferred until pass finishes");
                        return;
                    }
                    // The pass finished between the exchange and the flag
                    // store; retry so the request is not lost.
                }
            }
        }
    }

    /// Starts a pass if one is pending.
    #[must_use]
    pub fn begin_pass(&self) -> Option<PassTicket> {
        self.clear_stale_rerun();
        self.state
            .compare_exchange(PENDING, RENDERING, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(self.take_ticket())
    }

    /// Starts a pass regardless of pending requests, e.g. when the toolkit
    /// repaints on its own. `None` while another pass is running.
    #[must_use]
    pub fn begin_forced_pass(&self) -> Option<PassTicket> {
        self.clear_stale_rerun();
        for from in [IDLE, PENDING] {
            if self
                .state
                .compare_exchange(from, RENDERING, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return Some(self.take_ticket());
            }
        }
        None
    }

    /// A rerun flag seen outside a pass was left by a request that raced the
    /// end of the previous one; the pass about to start already covers it.
    /// Only the rendering thread enters or leaves `RENDERING`.
    fn clear_stale_rerun(&self) {
        if self.state.load(Ordering::SeqCst) != RENDERING {
            self.rerun.store(false, Ordering::SeqCst);
        }
    }

    fn take_ticket(&self) -> PassTicket {
        let level = InvalidationLevel::from_u8(
            self.pending_level
                .swap(InvalidationLevel::None as u8, Ordering::SeqCst),
        );
        PassTicket { level }
    }

    /// Ends the running pass. Returns `true` when a follow-up pass was
    /// scheduled because of requests made during this one.
    pub fn finish_pass(&self) -> bool {
        if self.rerun.swap(false, Ordering::SeqCst) {
            self.state.store(PENDING, Ordering::SeqCst);
            self.wake();
            return true;
        }
        self.state.store(IDLE, Ordering::SeqCst);
        if self.rerun.swap(false, Ordering::SeqCst)
            && self
                .state
                .compare_exchange(IDLE, PENDING, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        {
            self.wake();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counting() -> (InvalidationCoordinator, Arc<AtomicUsize>) {
        let coordinator = InvalidationCoordinator::new();
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        coordinator.set_waker(Some(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })));
        (coordinator, wakes)
    }

    #[test]
    fn requests_coalesce_while_pending() {
        let (coordinator, wakes) = counting();
        coordinator.request_invalidate(false);
        coordinator.request_invalidate(true);
        coordinator.request_invalidate(false);
        assert_eq!(wakes.load(Ordering::SeqCst), 1);
        let ticket = coordinator.begin_pass().expect("pending pass");
        assert_eq!(ticket.level, InvalidationLevel::UpdateData);
        assert!(!coordinator.finish_pass());
        assert_eq!(coordinator.state(), RedrawState::Idle);
    }

    #[test]
    fn requests_during_pass_schedule_one_rerun() {
        let (coordinator, wakes) = counting();
        coordinator.request_invalidate(false);
        let _ticket = coordinator.begin_pass().expect("pending pass");
        coordinator.request_invalidate(false);
        coordinator.request_invalidate(true);
        assert!(coordinator.finish_pass());
        assert_eq!(coordinator.state(), RedrawState::RedrawPending);
        assert_eq!(wakes.load(Ordering::SeqCst), 2);

        let ticket = coordinator.begin_pass().expect("rerun");
        assert_eq!(ticket.level, InvalidationLevel::UpdateData);
        assert!(!coordinator.finish_pass());
    }

    #[test]
    fn request_racing_pass_end_does_not_add_a_pass() {
        let (coordinator, wakes) = counting();
        coordinator.request_invalidate(false);
        let _ticket = coordinator.begin_pass().expect("pending pass");
        assert!(!coordinator.finish_pass());

        // A requester that saw RENDERING stores its flag only after the pass
        // ended, then wins the IDLE -> PENDING exchange on retry.
        coordinator.rerun.store(true, Ordering::SeqCst);
        coordinator.request_invalidate(false);
        assert_eq!(wakes.load(Ordering::SeqCst), 2);

        let _ticket = coordinator.begin_pass().expect("pending pass");
        assert!(!coordinator.finish_pass());
        assert_eq!(coordinator.state(), RedrawState::Idle);
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn begin_pass_requires_pending_request() {
        let coordinator = InvalidationCoordinator::new();
        assert!(coordinator.begin_pass().is_none());
        let ticket = coordinator.begin_forced_pass().expect("forced pass");
        assert_eq!(ticket.level, InvalidationLevel::None);
        assert!(coordinator.begin_forced_pass().is_none());
        assert!(!coordinator.finish_pass());
    }
}
