//! Two-slot debounce timer.
//!
//! Each timer kind owns one [`TimerSlot`].  Arming a slot always replaces
//! whatever it held, so at most one update and one clear deadline exist at any
//! moment.  Every arm draws a fresh token from a monotonic counter; when two
//! deadlines are equal the one armed first fires first.
//!
//! The debouncer never sleeps.  The session loop asks for
//! [`Debouncer::next_deadline`], waits, then drains [`Debouncer::pop_due`].
//!
//! ```text
//! activity ──▶ update: Armed(now + 1 s)   clear: Armed(now + 5 s)
//! update due ─▶ evaluate ─┬─ match    ─▶ render ─▶ clear path
//!                         └─ no match ─▶ update: Armed(deadline + 1 s)
//! clear due / manual ─────▶ empty field, update: Armed(+1 s), clear: Idle
//! ```

use std::time::Duration;

use tokio::time::Instant;

use crate::config::ScheduleConfig;

// ---------------------------------------------------------------------------
// TimerKind / TimerSlot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Short quiet period before the match engine runs.
    Update,
    /// Long quiet period before the input field is wiped.
    Clear,
}

impl TimerKind {
    pub fn label(&self) -> &'static str {
        match self {
            TimerKind::Update => "update",
            TimerKind::Clear => "clear",
        }
    }
}

/// State of one timer kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerSlot {
    #[default]
    Idle,
    Armed { deadline: Instant, token: u64 },
}

impl TimerSlot {
    pub fn is_armed(&self) -> bool {
        matches!(self, TimerSlot::Armed { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self {
            TimerSlot::Idle => None,
            TimerSlot::Armed { deadline, .. } => Some(*deadline),
        }
    }

    fn token(&self) -> Option<u64> {
        match self {
            TimerSlot::Idle => None,
            TimerSlot::Armed { token, .. } => Some(*token),
        }
    }
}

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

/// The update and clear timers of one session.
#[derive(Debug, Clone)]
pub struct Debouncer {
    update_delay: Duration,
    clear_delay: Duration,
    update: TimerSlot,
    clear: TimerSlot,
    next_token: u64,
}

impl Debouncer {
    pub fn new(update_delay: Duration, clear_delay: Duration) -> Self {
        Self {
            update_delay,
            clear_delay,
            update: TimerSlot::Idle,
            clear: TimerSlot::Idle,
            next_token: 0,
        }
    }

    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(config.update_delay(), config.clear_delay())
    }

    pub fn delay(&self, kind: TimerKind) -> Duration {
        match kind {
            TimerKind::Update => self.update_delay,
            TimerKind::Clear => self.clear_delay,
        }
    }

    pub fn slot(&self, kind: TimerKind) -> TimerSlot {
        match kind {
            TimerKind::Update => self.update,
            TimerKind::Clear => self.clear,
        }
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut TimerSlot {
        match kind {
            TimerKind::Update => &mut self.update,
            TimerKind::Clear => &mut self.clear,
        }
    }

    /// Any keystroke or inserted transcript: push both deadlines out.
    pub fn on_activity(&mut self, now: Instant) {
        self.arm(TimerKind::Update, now);
        self.arm(TimerKind::Clear, now);
    }

    /// Replace the slot for `kind` with a deadline one delay after `now`.
    ///
    /// Returns the new token.
    pub fn arm(&mut self, kind: TimerKind, now: Instant) -> u64 {
        let token = self.next_token;
        self.next_token += 1;
        let deadline = now + self.delay(kind);
        *self.slot_mut(kind) = TimerSlot::Armed { deadline, token };
        log::trace!("session: armed {} timer #{token}", kind.label());
        token
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        *self.slot_mut(kind) = TimerSlot::Idle;
    }

    /// Earliest armed deadline, or `None` when both slots are idle.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.update.deadline(), self.clear.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Disarm and return the earliest timer whose deadline is `<= now`.
    ///
    /// Equal deadlines resolve by arming order.  The returned instant is the
    /// timer's own deadline, not `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerKind, Instant)> {
        let candidates = [TimerKind::Update, TimerKind::Clear];
        let (kind, deadline, _) = candidates
            .into_iter()
            .filter_map(|kind| {
                let slot = self.slot(kind);
                match (slot.deadline(), slot.token()) {
                    (Some(deadline), Some(token)) if deadline <= now => {
                        Some((kind, deadline, token))
                    }
                    _ => None,
                }
            })
            .min_by_key(|&(_, deadline, token)| (deadline, token))?;

        self.cancel(kind);
        Some((kind, deadline))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
