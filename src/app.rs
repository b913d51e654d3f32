//! The meme window: egui/eframe front end of the session.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │                                      │
//! │        rendered meme (centred)       │  ◀── DisplayUpdate::Artifact
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ [ text field ................ ][Clear]│ ──▶ Edited / ClearRequested
//! │ ● Listening (F9)  ·  Ready  ·  last  │  ◀── SharedStatus
//! └──────────────────────────────────────┘
//! ```
//!
//! The app never blocks: session events go out with `try_send`, display
//! updates and hotkey events are drained with `try_recv` once per frame.
//! While the session is busy rendering its channel can fill up; outgoing
//! events then wait in an [`Outbox`] that keeps only the latest field value
//! and is retried every frame.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::hotkey::HotkeyEvent;
use crate::render::{RenderedArtifact, Viewport};
use crate::session::{DisplayUpdate, SessionEvent, SessionStatus, SharedStatus};

/// Height kept below the image for the text field and status line.
const CONTROLS_HEIGHT: f32 = 64.0;

// ---------------------------------------------------------------------------
// Speech status
// ---------------------------------------------------------------------------

/// What the window knows about speech input.
#[derive(Debug, Clone)]
pub enum SpeechStatus {
    /// No model or microphone; typing only.
    Unavailable,
    /// Listener running; the flag is shared with the listener thread.
    Available {
        listening: Arc<AtomicBool>,
        toggle_key: String,
    },
}

impl SpeechStatus {
    fn label(&self) -> String {
        match self {
            SpeechStatus::Unavailable => "Speech off".into(),
            SpeechStatus::Available {
                listening,
                toggle_key,
            } => {
                if listening.load(Ordering::Relaxed) {
                    format!("Listening ({toggle_key} to mute)")
                } else {
                    format!("Muted ({toggle_key} to listen)")
                }
            }
        }
    }

    fn toggle(&self) {
        if let SpeechStatus::Available { listening, .. } = self {
            let now = !listening.load(Ordering::Relaxed);
            listening.store(now, Ordering::Relaxed);
            log::info!("ui: listening {}", if now { "on" } else { "off" });
        }
    }
}

/// One-line summary under the text field.
fn status_line(status: &SessionStatus, speech: &str) -> String {
    let mut line = format!("{speech}  ·  {}", status.phase.label());
    if let Some(ref error) = status.last_error {
        line.push_str(&format!("  ·  {error}"));
    } else if let Some(ref matched) = status.last_match {
        line.push_str(&format!("  ·  {matched}"));
    }
    line
}

/// Whole points of an egui size, as sent to the renderer.
fn viewport_of(size: egui::Vec2) -> Viewport {
    Viewport::new(size.x.max(0.0) as u32, size.y.max(0.0) as u32)
}

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

/// Session events waiting for room in the channel.
///
/// One slot per kind.  A newer edit replaces an older one since each carries
/// the whole field, and a clear discards the edit it supersedes.
#[derive(Debug, Default)]
struct Outbox {
    clear: Option<SessionEvent>,
    edit: Option<SessionEvent>,
    viewport: Option<SessionEvent>,
}

impl Outbox {
    fn edit(&mut self, text: String, revision: u64) {
        self.edit = Some(SessionEvent::Edited { text, revision });
    }

    fn clear(&mut self) {
        self.edit = None;
        self.clear = Some(SessionEvent::ClearRequested);
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = Some(SessionEvent::ViewportResized(viewport));
    }

    fn is_empty(&self) -> bool {
        self.clear.is_none() && self.edit.is_none() && self.viewport.is_none()
    }

    /// Send what the channel accepts, clear before edit.  Returns `true` once
    /// nothing is left waiting.
    fn flush(&mut self, tx: &mpsc::Sender<SessionEvent>) -> bool {
        deliver(&mut self.clear, tx)
            && deliver(&mut self.edit, tx)
            && deliver(&mut self.viewport, tx)
    }
}

/// Hand the slot's event to the session.  `false` leaves it in place for the
/// next frame.
fn deliver(slot: &mut Option<SessionEvent>, tx: &mpsc::Sender<SessionEvent>) -> bool {
    let Some(event) = slot.take() else {
        return true;
    };
    match tx.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(event)) => {
            log::trace!("ui: session busy, holding {event:?}");
            *slot = Some(event);
            false
        }
        Err(TrySendError::Closed(event)) => {
            log::error!("ui: session has stopped, dropped {event:?}");
            true
        }
    }
}

// ---------------------------------------------------------------------------
// MemeApp
// ---------------------------------------------------------------------------

/// Shown meme plus the texture it was uploaded to.
struct ShownMeme {
    texture: egui::TextureHandle,
    size: egui::Vec2,
    label: String,
}

pub struct MemeApp {
    events: mpsc::Sender<SessionEvent>,
    display_rx: mpsc::UnboundedReceiver<DisplayUpdate>,
    hotkey_rx: mpsc::Receiver<HotkeyEvent>,
    status: SharedStatus,
    speech: SpeechStatus,

    input: String,
    /// Field revision last received from the session.
    revision: u64,
    outbox: Outbox,
    meme: Option<ShownMeme>,
    reported: Viewport,
    focused_once: bool,
}

impl MemeApp {
    pub fn new(
        events: mpsc::Sender<SessionEvent>,
        display_rx: mpsc::UnboundedReceiver<DisplayUpdate>,
        hotkey_rx: mpsc::Receiver<HotkeyEvent>,
        status: SharedStatus,
        speech: SpeechStatus,
    ) -> Self {
        Self {
            events,
            display_rx,
            hotkey_rx,
            status,
            speech,
            input: String::new(),
            revision: 0,
            outbox: Outbox::default(),
            meme: None,
            reported: Viewport::default(),
            focused_once: false,
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    fn poll_hotkey(&mut self) {
        while let Ok(HotkeyEvent::ToggleListening) = self.hotkey_rx.try_recv() {
            self.speech.toggle();
        }
    }

    fn poll_display(&mut self, ctx: &egui::Context) {
        while let Ok(update) = self.display_rx.try_recv() {
            match update {
                DisplayUpdate::Text { text, revision } => {
                    self.input = text;
                    self.revision = revision;
                }
                DisplayUpdate::Artifact { artifact, .. } => self.show_artifact(ctx, artifact),
            }
        }
    }

    fn show_artifact(&mut self, ctx: &egui::Context, artifact: RenderedArtifact) {
        let (w, h) = artifact.size();
        let pixels = egui::ColorImage::from_rgba_unmultiplied(
            [w as usize, h as usize],
            artifact.image.as_raw(),
        );
        let label = format!("{}: {}", artifact.template_key, artifact.caption);

        match self.meme.as_mut() {
            Some(meme) => {
                meme.texture.set(pixels, egui::TextureOptions::LINEAR);
                meme.size = egui::vec2(w as f32, h as f32);
                meme.label = label;
            }
            None => {
                let texture = ctx.load_texture("meme", pixels, egui::TextureOptions::LINEAR);
                self.meme = Some(ShownMeme {
                    texture,
                    size: egui::vec2(w as f32, h as f32),
                    label,
                });
            }
        }
    }

    /// Tell the session when the image area changes size.
    fn report_viewport(&mut self, size: egui::Vec2) {
        let viewport = viewport_of(size);
        if viewport != self.reported {
            self.outbox.resize(viewport);
            self.reported = viewport;
        }
    }

    // ── Panels ───────────────────────────────────────────────────────────

    fn draw_image_area(&mut self, ui: &mut egui::Ui) {
        let area = egui::vec2(
            ui.available_width(),
            (ui.available_height() - CONTROLS_HEIGHT).max(0.0),
        );
        self.report_viewport(area);

        let layout = egui::Layout::centered_and_justified(egui::Direction::TopDown);
        ui.allocate_ui_with_layout(area, layout, |ui| match &self.meme {
            Some(meme) => {
                ui.image((meme.texture.id(), meme.size))
                    .on_hover_text(meme.label.as_str());
            }
            None => {
                ui.label(
                    egui::RichText::new("Type or say something…")
                        .color(egui::Color32::from_rgb(120, 120, 120))
                        .size(16.0),
                );
            }
        });
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let clear_width = 60.0;
            let field = ui.add_sized(
                [ui.available_width() - clear_width, 24.0],
                egui::TextEdit::singleline(&mut self.input).hint_text("caption text"),
            );
            if !self.focused_once {
                field.request_focus();
                self.focused_once = true;
            }
            if field.changed() {
                self.outbox.edit(self.input.clone(), self.revision);
            }

            if ui.button("Clear").clicked() {
                self.outbox.clear();
            }
        });

        let line = match self.status.lock() {
            Ok(status) => status_line(&status, &self.speech.label()),
            Err(_) => self.speech.label(),
        };
        ui.label(
            egui::RichText::new(line)
                .color(egui::Color32::from_rgb(150, 150, 150))
                .size(11.0),
        );
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for MemeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_hotkey();
        self.poll_display(ctx);

        // Session and listener run off-thread; poll for their output.
        ctx.request_repaint_after(Duration::from_millis(100));

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_image_area(ui);
            ui.separator();
            self.draw_controls(ui);
        });

        if !self.outbox.is_empty() {
            self.outbox.flush(&self.events);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("ui: window closing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionPhase;

    #[test]
    fn status_line_prefers_error_over_match() {
        let status = SessionStatus {
            phase: SessionPhase::Idle,
            last_match: Some("Drake: tea / coffee".into()),
            last_error: Some("render failed".into()),
            evaluations: 3,
        };
        let line = status_line(&status, "Speech off");
        assert!(line.starts_with("Speech off"));
        assert!(line.contains("render failed"));
        assert!(!line.contains("Drake"));
    }

    #[test]
    fn status_line_shows_last_match() {
        let status = SessionStatus {
            last_match: Some("Drake: tea / coffee".into()),
            ..SessionStatus::default()
        };
        assert!(status_line(&status, "x").ends_with("Drake: tea / coffee"));
    }

    #[test]
    fn speech_toggle_flips_shared_flag() {
        let listening = Arc::new(AtomicBool::new(true));
        let speech = SpeechStatus::Available {
            listening: Arc::clone(&listening),
            toggle_key: "F9".into(),
        };
        assert!(speech.label().starts_with("Listening"));
        speech.toggle();
        assert!(!listening.load(Ordering::Relaxed));
        assert!(speech.label().starts_with("Muted"));
    }

    #[test]
    fn toggle_without_speech_is_noop() {
        SpeechStatus::Unavailable.toggle();
        assert_eq!(SpeechStatus::Unavailable.label(), "Speech off");
    }

    fn edited(text: &str, revision: u64) -> SessionEvent {
        SessionEvent::Edited {
            text: text.into(),
            revision,
        }
    }

    #[test]
    fn outbox_holds_latest_edit_until_session_has_room() {
        let (tx, mut rx) = mpsc::channel(1);
        tx.try_send(SessionEvent::ClearRequested).unwrap();

        let mut outbox = Outbox::default();
        outbox.edit("one does not".into(), 0);
        outbox.edit("one does not simply".into(), 0);
        assert!(!outbox.flush(&tx));
        assert!(!outbox.is_empty());

        // The session drains its queue; the next frame gets through.
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::ClearRequested);
        assert!(outbox.flush(&tx));
        assert!(outbox.is_empty());
        assert_eq!(rx.try_recv().unwrap(), edited("one does not simply", 0));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn clear_discards_pending_edit() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut outbox = Outbox::default();
        outbox.edit("stale".into(), 0);
        outbox.clear();
        assert!(outbox.flush(&tx));

        assert_eq!(rx.try_recv().unwrap(), SessionEvent::ClearRequested);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn edit_after_clear_is_sent_after_it() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut outbox = Outbox::default();
        outbox.clear();
        outbox.edit("fresh".into(), 1);
        outbox.resize(Viewport::new(300, 200));
        assert!(outbox.flush(&tx));

        assert_eq!(rx.try_recv().unwrap(), SessionEvent::ClearRequested);
        assert_eq!(rx.try_recv().unwrap(), edited("fresh", 1));
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::ViewportResized(Viewport::new(300, 200))
        );
    }

    #[test]
    fn closed_session_empties_outbox() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut outbox = Outbox::default();
        outbox.edit("nobody".into(), 0);
        assert!(outbox.flush(&tx));
        assert!(outbox.is_empty());
    }

    #[test]
    fn viewport_truncates_points() {
        assert_eq!(viewport_of(egui::vec2(499.7, 300.2)), Viewport::new(499, 300));
        assert_eq!(viewport_of(egui::vec2(-3.0, 10.0)), Viewport::new(0, 10));
    }
}
