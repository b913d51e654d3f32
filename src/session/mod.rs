//! The debounced matching session.
//!
//! A [`Session`] owns the input text and the two debounce timers.  Every
//! producer (the text field, the speech listener) talks to it only through
//! [`SessionEvent`]s on one `tokio::sync::mpsc` channel, so all mutation
//! happens on the session task in arrival order.
//!
//! The window's text field is a view of the session's input.  Whenever the
//! session replaces the field itself (clear, transcript) it bumps the field
//! revision and sends the new value with it.  Edits typed against an older
//! revision are dropped, so the session never holds text the field no
//! longer shows.
//!
//! # Architecture
//!
//! ```text
//! egui text field ──Edited / ClearRequested / ViewportResized──┐
//!                                                              ▼
//! speech thread ──Transcribed / RecognitionFailed──▶ mpsc ──▶ Session::run()
//!                                                              │
//!            ┌──────── select! { event, sleep_until(deadline) }┘
//!            ▼
//!   update due ─▶ matcher::evaluate ─▶ RenderService::render ─▶ DisplaySink
//!   clear due  ─▶ empty input ──────────────────────────────▶ DisplaySink
//!
//! SharedStatus (Arc<Mutex<SessionStatus>>) ←── read by egui update() each frame
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use memegen_live::catalog::Catalog;
//! use memegen_live::config::AppConfig;
//! use memegen_live::render::MemegenRenderer;
//! use memegen_live::session::{new_shared_status, ChannelSink, Session, SessionEvent};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let (sink, _display_rx) = ChannelSink::new();
//!     let session = Session::new(
//!         &config.schedule,
//!         Arc::new(Catalog::builtin(config.catalog.fuzzy_threshold)),
//!         Arc::new(MemegenRenderer::from_config(&config.render)),
//!         Arc::new(sink),
//!         new_shared_status(),
//!     );
//!
//!     let (tx, rx) = mpsc::channel(64);
//!     tokio::spawn(session.run(rx));
//!     let edit = SessionEvent::Edited {
//!         text: "one does not simply ship".into(),
//!         revision: 0,
//!     };
//!     tx.send(edit).await.ok();
//! }
//! ```

pub mod display;
pub mod runner;
pub mod state;
pub mod timer;

use crate::render::Viewport;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use display::{ChannelSink, DisplaySink, DisplayUpdate};
pub use runner::Session;
pub use state::{new_shared_status, SessionPhase, SessionStatus, SharedStatus};
pub use timer::{Debouncer, TimerKind, TimerSlot};

/// Everything that can happen to a session from the outside.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The text field changed; carries its full new contents and the field
    /// revision it was typed against.
    Edited { text: String, revision: u64 },

    /// The recognizer produced a final transcript.
    Transcribed(String),

    /// The recognizer heard something but could not transcribe it.
    RecognitionFailed(String),

    /// The user pressed the clear button.
    ClearRequested,

    /// The image area changed size.
    ViewportResized(Viewport),
}
