//! The user-visible input value.
//!
//! [`InputText`] is replaced wholesale on every keystroke or transcript and
//! never edited in place.  Matching always goes through
//! [`InputText::match_key`], which is the normalized, lower-cased form.

use std::fmt;

/// Current contents of the input field.
///
/// ```
/// use memegen_live::text::InputText;
///
/// let text = InputText::new("  One does   NOT simply ");
/// assert_eq!(text.as_str(), "  One does   NOT simply ");
/// assert_eq!(text.match_key(), "one does not simply");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputText(String);

impl InputText {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The empty field.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Raw field value exactly as typed or transcribed.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whitespace runs collapsed to one space, trimmed, lower-cased.
    pub fn match_key(&self) -> String {
        self.0
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

impl fmt::Display for InputText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InputText {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for InputText {
    fn from(value: String) -> Self {
        Self(value)
    }
}
