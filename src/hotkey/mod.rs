//! Global hotkey that toggles speech listening, backed by `rdev`.
//!
//! `rdev::listen()` blocks for the life of the process, so it runs on a
//! dedicated OS thread owned by [`HotkeyListener`].  Dropping the handle sets a
//! stop flag; the thread itself stays parked in rdev until exit.
//!
//! # Usage
//!
//! ```no_run
//! use tokio::sync::mpsc;
//! use memegen_live::hotkey::{parse_key, HotkeyEvent, HotkeyListener};
//!
//! let (tx, mut rx) = mpsc::channel(16);
//! let key = parse_key("F9").expect("unknown key");
//! let _listener = HotkeyListener::start(key, tx).unwrap();
//!
//! // In the UI loop:
//! while let Ok(HotkeyEvent::ToggleListening) = rx.try_recv() {
//!     // flip the listening flag
//! }
//! ```

pub mod listener;

pub use listener::HotkeyListener;

// ---------------------------------------------------------------------------
// HotkeyEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyEvent {
    /// The toggle key went down (auto-repeat suppressed).
    ToggleListening,
}

// ---------------------------------------------------------------------------
// parse_key
// ---------------------------------------------------------------------------

const FUNCTION_KEYS: [rdev::Key; 12] = [
    rdev::Key::F1,
    rdev::Key::F2,
    rdev::Key::F3,
    rdev::Key::F4,
    rdev::Key::F5,
    rdev::Key::F6,
    rdev::Key::F7,
    rdev::Key::F8,
    rdev::Key::F9,
    rdev::Key::F10,
    rdev::Key::F11,
    rdev::Key::F12,
];

const LETTER_KEYS: [rdev::Key; 26] = [
    rdev::Key::KeyA,
    rdev::Key::KeyB,
    rdev::Key::KeyC,
    rdev::Key::KeyD,
    rdev::Key::KeyE,
    rdev::Key::KeyF,
    rdev::Key::KeyG,
    rdev::Key::KeyH,
    rdev::Key::KeyI,
    rdev::Key::KeyJ,
    rdev::Key::KeyK,
    rdev::Key::KeyL,
    rdev::Key::KeyM,
    rdev::Key::KeyN,
    rdev::Key::KeyO,
    rdev::Key::KeyP,
    rdev::Key::KeyQ,
    rdev::Key::KeyR,
    rdev::Key::KeyS,
    rdev::Key::KeyT,
    rdev::Key::KeyU,
    rdev::Key::KeyV,
    rdev::Key::KeyW,
    rdev::Key::KeyX,
    rdev::Key::KeyY,
    rdev::Key::KeyZ,
];

/// Parse `[hotkey] toggle_listening_key` into an [`rdev::Key`].
///
/// Accepts F1-F12, a few named keys and single letters, all
/// case-insensitive.  Unknown names give `None`.
///
/// ```
/// use memegen_live::hotkey::parse_key;
///
/// assert_eq!(parse_key("F9"), Some(rdev::Key::F9));
/// assert_eq!(parse_key("scrolllock"), Some(rdev::Key::ScrollLock));
/// assert_eq!(parse_key("m"), Some(rdev::Key::KeyM));
/// assert_eq!(parse_key("Ctrl+M"), None);
/// ```
pub fn parse_key(key_str: &str) -> Option<rdev::Key> {
    let name = key_str.trim().to_ascii_lowercase();

    if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<usize>().ok()) {
        return n.checked_sub(1).and_then(|i| FUNCTION_KEYS.get(i)).copied();
    }

    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_lowercase() {
            return Some(LETTER_KEYS[(c as u8 - b'a') as usize]);
        }
        return None;
    }

    let key = match name.as_str() {
        "escape" | "esc" => rdev::Key::Escape,
        "space" => rdev::Key::Space,
        "tab" => rdev::Key::Tab,
        "home" => rdev::Key::Home,
        "end" => rdev::Key::End,
        "pageup" => rdev::Key::PageUp,
        "pagedown" => rdev::Key::PageDown,
        "insert" => rdev::Key::Insert,
        "capslock" => rdev::Key::CapsLock,
        "numlock" => rdev::Key::NumLock,
        "scrolllock" => rdev::Key::ScrollLock,
        "printscreen" => rdev::Key::PrintScreen,
        "pause" => rdev::Key::Pause,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_keys() {
        assert_eq!(parse_key("F1"), Some(rdev::Key::F1));
        assert_eq!(parse_key("f12"), Some(rdev::Key::F12));
        assert_eq!(parse_key("F0"), None);
        assert_eq!(parse_key("F13"), None);
    }

    #[test]
    fn letters_any_case() {
        assert_eq!(parse_key("a"), Some(rdev::Key::KeyA));
        assert_eq!(parse_key("Z"), Some(rdev::Key::KeyZ));
        assert_eq!(parse_key("1"), None);
    }

    #[test]
    fn named_keys_and_whitespace() {
        assert_eq!(parse_key(" Pause "), Some(rdev::Key::Pause));
        assert_eq!(parse_key("Esc"), Some(rdev::Key::Escape));
        assert_eq!(parse_key("PageDown"), Some(rdev::Key::PageDown));
    }

    #[test]
    fn unknown_names() {
        assert_eq!(parse_key(""), None);
        assert_eq!(parse_key("hyper"), None);
        assert_eq!(parse_key("Ctrl+V"), None);
    }
}
