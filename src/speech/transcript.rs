//! Cleanup of raw Whisper output before it reaches the input field.

use std::sync::OnceLock;

use regex::Regex;

/// Non-speech annotations Whisper emits for silence and noise:
/// `[BLANK_AUDIO]`, `(music)`, `*coughs*` and the like.
fn annotation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[[^\]]*\]|\([^)]*\)|\*[^*]*\*").expect("annotation pattern is valid")
    })
}

/// Strip annotations and collapse whitespace.
///
/// An empty result means nothing intelligible was said.
///
/// ```
/// use memegen_live::speech::clean_transcript;
///
/// assert_eq!(clean_transcript(" [BLANK_AUDIO] "), "");
/// assert_eq!(clean_transcript("one does (wind)  not simply"), "one does not simply");
/// ```
pub fn clean_transcript(raw: &str) -> String {
    let stripped = annotation_re().replace_all(raw, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
