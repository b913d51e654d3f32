//! Session status shared with the UI.
//!
//! The session task writes [`SessionStatus`]; the egui update loop reads it
//! every frame to draw the status line.  [`SharedStatus`] is
//! `Arc<Mutex<SessionStatus>>`; never hold the lock across an `.await`.

use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// What the session is doing with the current input.
///
/// ```text
/// Idle ──activity──▶ Pending ──update due, match──▶ Rendering ──▶ Idle
///                      │  ▲                            │
///                      │  └──── no match / failure ◀───┘
///                      └──clear due / manual clear──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Input field is empty.
    #[default]
    Idle,

    /// Input is waiting for the quiet period to elapse.
    Pending,

    /// A match was found and the render service is working on it.
    Rendering,
}

impl SessionPhase {
    /// Short label for the status line.
    ///
    /// ```
    /// use memegen_live::session::SessionPhase;
    ///
    /// assert_eq!(SessionPhase::Idle.label(), "Ready");
    /// assert_eq!(SessionPhase::Rendering.label(), "Rendering");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Ready",
            SessionPhase::Pending => "Waiting for a pause",
            SessionPhase::Rendering => "Rendering",
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SessionStatus {
    pub phase: SessionPhase,

    /// `"<template name>: <caption>"` of the last artifact shown.
    pub last_match: Option<String>,

    /// Most recent render or recognition problem, cleared on the next success.
    pub last_error: Option<String>,

    /// Number of match-engine evaluations so far.
    pub evaluations: u64,
}

pub type SharedStatus = Arc<Mutex<SessionStatus>>;

pub fn new_shared_status() -> SharedStatus {
    Arc::new(Mutex::new(SessionStatus::default()))
}
