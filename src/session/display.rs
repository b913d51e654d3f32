//! Display sink: where the session sends what the user should see.
//!
//! The session runs on the tokio runtime while the window lives on the egui
//! thread.  [`ChannelSink`] bridges the two with an unbounded channel that the
//! UI drains with `try_recv` once per frame.

use tokio::sync::mpsc;

use crate::render::{RenderedArtifact, Viewport};

/// Receives artifacts and input-field text from the session.
///
/// Calls must not block; the session invokes them from its event loop.
pub trait DisplaySink: Send + Sync {
    fn show_artifact(&self, artifact: RenderedArtifact, viewport: Viewport);
    /// Replace the field with `text`.  Later edits must carry `revision`.
    fn show_text(&self, text: &str, revision: u64);
}

/// One message from the session to the window.
#[derive(Debug, Clone)]
pub enum DisplayUpdate {
    Artifact {
        artifact: RenderedArtifact,
        viewport: Viewport,
    },
    /// Replace the contents of the input field.
    Text { text: String, revision: u64 },
}

/// [`DisplaySink`] that forwards every call as a [`DisplayUpdate`].
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<DisplayUpdate>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DisplayUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, update: DisplayUpdate) {
        if self.tx.send(update).is_err() {
            log::debug!("session: display closed, update dropped");
        }
    }
}

impl DisplaySink for ChannelSink {
    fn show_artifact(&self, artifact: RenderedArtifact, viewport: Viewport) {
        self.send(DisplayUpdate::Artifact { artifact, viewport });
    }

    fn show_text(&self, text: &str, revision: u64) {
        self.send(DisplayUpdate::Text {
            text: text.to_string(),
            revision,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Caption;

    #[test]
    fn forwards_text_and_artifacts_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.show_text("hello", 3);
        sink.show_artifact(
            RenderedArtifact {
                template_key: "doge".into(),
                caption: Caption::new("such", "wow"),
                source: "memory".into(),
                image: image::RgbaImage::new(1, 1),
            },
            Viewport::new(10, 10),
        );

        assert!(matches!(
            rx.try_recv(),
            Ok(DisplayUpdate::Text { ref text, revision: 3 }) if text == "hello"
        ));
        match rx.try_recv() {
            Ok(DisplayUpdate::Artifact { artifact, viewport }) => {
                assert_eq!(artifact.template_key, "doge");
                assert_eq!(viewport, Viewport::new(10, 10));
            }
            other => panic!("expected artifact, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_receiver_is_not_an_error() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.show_text("nobody listens", 0);
    }
}
