//! memegen-live: type or say a phrase, see the matching meme.
//!
//! ```text
//!  keystrokes ─┐                    ┌─▶ matcher::evaluate(catalog) ─▶ RenderService
//!              ├─▶ session (timers) ┤                                     │
//!  speech ─────┘                    └─▶ clear                DisplaySink ◀┘
//! ```

pub mod app;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod hotkey;
pub mod matcher;
pub mod render;
pub mod session;
pub mod speech;
pub mod stt;
pub mod text;
