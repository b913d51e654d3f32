//! Dedicated OS thread running `rdev::listen`.
//!
//! `rdev::listen` has no shutdown API.  Dropping [`HotkeyListener`] only stops
//! forwarding; the thread stays blocked in rdev until the process exits.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::mpsc;

use super::HotkeyEvent;

/// Turns raw key events into [`HotkeyEvent`]s, suppressing auto-repeat.
#[derive(Debug)]
struct ToggleKey {
    key: rdev::Key,
    held: bool,
}

impl ToggleKey {
    fn new(key: rdev::Key) -> Self {
        Self { key, held: false }
    }

    fn on_event(&mut self, event: &rdev::EventType) -> Option<HotkeyEvent> {
        match *event {
            rdev::EventType::KeyPress(k) if k == self.key => {
                if self.held {
                    return None;
                }
                self.held = true;
                Some(HotkeyEvent::ToggleListening)
            }
            rdev::EventType::KeyRelease(k) if k == self.key => {
                self.held = false;
                None
            }
            _ => None,
        }
    }
}

/// Handle to a running hotkey listener thread.
pub struct HotkeyListener {
    stop: Arc<AtomicBool>,
    _thread: std::thread::JoinHandle<()>,
}

impl HotkeyListener {
    /// Watch `key` globally and send [`HotkeyEvent::ToggleListening`] on `tx`
    /// each time it goes down.
    pub fn start(key: rdev::Key, tx: mpsc::Sender<HotkeyEvent>) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || {
                let mut toggle = ToggleKey::new(key);
                let result = rdev::listen(move |event| {
                    if stop_flag.load(Ordering::Relaxed) {
                        return;
                    }
                    if let Some(ev) = toggle.on_event(&event.event_type) {
                        // Full channel: the UI has not drained yet, drop the press.
                        let _ = tx.try_send(ev);
                    }
                });

                if let Err(e) = result {
                    log::error!("hotkey: rdev::listen exited with error: {e:?}");
                }
            })?;

        log::info!("hotkey: {key:?} toggles listening");
        Ok(Self {
            stop,
            _thread: thread,
        })
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
