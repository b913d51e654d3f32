//! Session task: drives input → debounce → match → render → display.
//!
//! [`Session`] owns the current [`InputText`] and the [`Debouncer`].  It is
//! the only place either is mutated.  [`Session::run`] is the production
//! loop; tests drive [`Session::handle_event`] and [`Session::advance_to`]
//! with explicit instants instead.
//!
//! # Timer handling
//!
//! ```text
//! Edited               ─▶ stale revision? drop : replace input, arm both
//! Transcribed          ─▶ replace field, arm update (+1 s) and clear (+5 s)
//! ClearRequested       ─▶ clear path
//! update due           ─▶ evaluate
//!                          ├─ match ─▶ render
//!                          │            ├─ Ok  ─▶ show artifact, clear path
//!                          │            └─ Err ─▶ warn, arm update
//!                          └─ none  ─▶ arm update
//! clear due            ─▶ clear path
//!
//! clear path: empty field, cancel clear, arm update
//! ```
//!
//! A timer-driven re-arm counts from the moment the evaluation or render
//! finished, never from the old deadline.  A render slower than the update
//! period therefore still gets a full quiet period after it, and a stalled
//! loop does not replay missed polls back to back.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::catalog::TemplateCatalog;
use crate::config::ScheduleConfig;
use crate::matcher;
use crate::render::{RenderService, Viewport};
use crate::text::InputText;

use super::display::DisplaySink;
use super::state::{SessionPhase, SessionStatus, SharedStatus};
use super::timer::{Debouncer, TimerKind};
use super::SessionEvent;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One matching session: the input field, its timers and its collaborators.
///
/// Create with [`Session::new`], then spawn [`run`](Self::run) on the tokio
/// runtime.
pub struct Session {
    catalog: Arc<dyn TemplateCatalog>,
    renderer: Arc<dyn RenderService>,
    sink: Arc<dyn DisplaySink>,
    status: SharedStatus,
    input: InputText,
    timers: Debouncer,
    viewport: Viewport,
    revision: u64,
}

impl Session {
    /// Create an idle session.  No timer is armed until [`start`](Self::start)
    /// or the first activity.
    pub fn new(
        schedule: &ScheduleConfig,
        catalog: Arc<dyn TemplateCatalog>,
        renderer: Arc<dyn RenderService>,
        sink: Arc<dyn DisplaySink>,
        status: SharedStatus,
    ) -> Self {
        Self {
            catalog,
            renderer,
            sink,
            status,
            input: InputText::empty(),
            timers: Debouncer::from_config(schedule),
            viewport: Viewport::default(),
            revision: 0,
        }
    }

    pub fn input(&self) -> &InputText {
        &self.input
    }

    pub fn timers(&self) -> &Debouncer {
        &self.timers
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Field revision; bumped each time the session replaces the field.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Arm both timers as if the user had just typed.
    pub fn start(&mut self, now: Instant) {
        log::debug!("session: started");
        self.on_activity(now);
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until every sender of `events` has been dropped.
    pub async fn run(mut self, mut events: mpsc::Receiver<SessionEvent>) {
        self.start(Instant::now());

        loop {
            let deadline = self.timers.next_deadline();
            tokio::select! {
                biased;

                event = events.recv() => match event {
                    Some(event) => self.handle_event(event, Instant::now()),
                    None => break,
                },

                _ = sleep_until_next(deadline) => {
                    self.advance_to(Instant::now()).await;
                }
            }
        }

        log::info!("session: event channel closed, shutting down");
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    /// Apply one external event observed at `now`.
    pub fn handle_event(&mut self, event: SessionEvent, now: Instant) {
        match event {
            SessionEvent::Edited { text, revision } => {
                if revision != self.revision {
                    log::debug!(
                        "session: dropped edit typed at revision {revision} (field is at {})",
                        self.revision
                    );
                    return;
                }
                self.input = InputText::new(text);
                self.on_activity(now);
            }
            SessionEvent::Transcribed(text) => {
                log::info!("session: heard {text:?}");
                // Clear and insert in one step; the field never holds a mix.
                self.replace_field(InputText::new(text));
                self.on_activity(now);
            }
            SessionEvent::RecognitionFailed(reason) => {
                log::warn!("session: no text matched ({reason})");
            }
            SessionEvent::ClearRequested => {
                log::debug!("session: manual clear");
                self.clear(now);
            }
            SessionEvent::ViewportResized(viewport) => {
                if viewport != self.viewport {
                    log::debug!(
                        "session: viewport {}x{}",
                        viewport.width,
                        viewport.height
                    );
                    self.viewport = viewport;
                }
            }
        }
    }

    /// Fire every timer due at or before `now`, in deadline order.
    ///
    /// A timer that fires late is handled as of the current clock, so its
    /// re-arm is a full period after the handler actually ran.
    pub async fn advance_to(&mut self, now: Instant) {
        while let Some((kind, deadline)) = self.timers.pop_due(now) {
            log::trace!("session: {} timer fired", kind.label());
            let at = finished_at(deadline);
            match kind {
                TimerKind::Update => self.on_update_due(at).await,
                TimerKind::Clear => self.clear(at),
            }
        }
    }

    async fn on_update_due(&mut self, at: Instant) {
        self.update_status(|st| st.evaluations += 1);

        let Some(result) = matcher::evaluate(&self.input, self.catalog.as_ref()) else {
            self.timers.arm(TimerKind::Update, finished_at(at));
            return;
        };

        self.set_phase(SessionPhase::Rendering);
        let rendered = self
            .renderer
            .render(result.template.as_ref(), &result.caption, self.viewport)
            .await;
        let done = finished_at(at);

        match rendered {
            Ok(artifact) => {
                let summary = format!("{}: {}", result.template.name(), result.caption);
                self.update_status(|st| {
                    st.last_match = Some(summary);
                    st.last_error = None;
                });
                self.sink.show_artifact(artifact, self.viewport);
                self.clear(done);
            }
            Err(e) => {
                log::warn!("session: render failed for {}: {e}", result.template.key());
                let message = e.to_string();
                self.update_status(|st| st.last_error = Some(message));
                self.set_phase(self.input_phase());
                self.timers.arm(TimerKind::Update, done);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn on_activity(&mut self, now: Instant) {
        self.timers.on_activity(now);
        self.set_phase(self.input_phase());
    }

    /// Empty the field and keep polling; only new activity re-arms clear.
    fn clear(&mut self, at: Instant) {
        self.replace_field(InputText::empty());
        self.timers.cancel(TimerKind::Clear);
        self.timers.arm(TimerKind::Update, at);
        self.set_phase(SessionPhase::Idle);
    }

    /// Session-side replacement of the field.  Edits typed before it are
    /// now stale.
    fn replace_field(&mut self, input: InputText) {
        self.input = input;
        self.revision += 1;
        self.sink.show_text(self.input.as_str(), self.revision);
    }

    fn input_phase(&self) -> SessionPhase {
        if self.input.is_empty() {
            SessionPhase::Idle
        } else {
            SessionPhase::Pending
        }
    }

    fn set_phase(&self, phase: SessionPhase) {
        self.update_status(|st| st.phase = phase);
    }

    fn update_status(&self, f: impl FnOnce(&mut SessionStatus)) {
        match self.status.lock() {
            Ok(mut st) => f(&mut st),
            Err(e) => log::error!("session: status lock poisoned: {e}"),
        }
    }
}

/// `at`, or the current clock when work ran past it.
fn finished_at(at: Instant) -> Instant {
    Instant::now().max(at)
}

async fn sleep_until_next(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
