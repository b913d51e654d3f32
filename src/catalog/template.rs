//! Catalog-backed templates scored by regex patterns and fuzzy keywords.
//!
//! ## Scoring
//!
//! 1. Patterns are tried in declaration order, each anchored to the whole
//!    text.  The first one that matches decides: its ratio is
//!    `min(len(pattern) / len(text), len(text) / len(pattern))` rounded to two
//!    decimals, and its first two capture groups become the caption.
//! 2. Without a pattern match, each keyword is compared to the whole text
//!    with normalized Levenshtein similarity.  The best similarity counts
//!    only when it reaches the fuzzy threshold; the caption is then the text
//!    itself on the bottom line.
//! 3. Otherwise the score is `0.0`.
//!
//! Empty text always scores `0.0`.

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use super::{Caption, CatalogError, MemeTemplate};

// ---------------------------------------------------------------------------
// TemplateSpec
// ---------------------------------------------------------------------------

/// One `[[templates]]` entry of a catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSpec {
    /// Template id understood by the render service (e.g. `"mordor"`).
    pub key: String,
    /// Display name.  Defaults to the key.
    #[serde(default)]
    pub name: String,
    /// Regular expressions with up to two capture groups (top, bottom).
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Phrases matched fuzzily against the whole text.
    #[serde(default)]
    pub keywords: Vec<String>,
}

// ---------------------------------------------------------------------------
// PatternTemplate
// ---------------------------------------------------------------------------

struct Pattern {
    regex: Regex,
    /// Length of the pattern as written, used for the ratio.
    source_len: usize,
}

/// A template compiled from a [`TemplateSpec`].
pub struct PatternTemplate {
    key: String,
    name: String,
    patterns: Vec<Pattern>,
    keywords: Vec<String>,
    fuzzy_threshold: f64,
}

impl PatternTemplate {
    /// Compile `spec`.  Patterns are case-insensitive and anchored.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Pattern`] when a pattern is not a valid regex.
    pub fn from_spec(spec: TemplateSpec, fuzzy_threshold: f64) -> Result<Self, CatalogError> {
        let patterns = spec
            .patterns
            .iter()
            .map(|source| {
                RegexBuilder::new(&format!("^(?:{source})$"))
                    .case_insensitive(true)
                    .build()
                    .map(|regex| Pattern {
                        regex,
                        source_len: source.chars().count(),
                    })
                    .map_err(|e| CatalogError::Pattern {
                        key: spec.key.clone(),
                        source: e,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let name = if spec.name.trim().is_empty() {
            spec.key.clone()
        } else {
            spec.name
        };

        Ok(Self {
            key: spec.key,
            name,
            patterns,
            keywords: spec
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            fuzzy_threshold: fuzzy_threshold.clamp(0.0, 1.0),
        })
    }

    /// First pattern matching `text`, with its ratio and caption.
    fn pattern_match(&self, text: &str) -> Option<(f64, Caption)> {
        let text_len = text.chars().count();
        if text_len == 0 {
            return None;
        }

        self.patterns.iter().find_map(|pattern| {
            let caps = pattern.regex.captures(text)?;
            let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("");
            let caption = match caps.len() {
                // No groups: the whole text goes on the bottom line.
                1 => Caption::bottom_only(text),
                2 => Caption::bottom_only(group(1)),
                _ => Caption::new(group(1), group(2)),
            };
            Some((length_ratio(pattern.source_len, text_len), caption))
        })
    }

    /// Best keyword similarity, or `0.0` when below the threshold.
    fn keyword_score(&self, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        let best = self
            .keywords
            .iter()
            .map(|keyword| strsim::normalized_levenshtein(text, keyword))
            .fold(0.0_f64, f64::max);

        if best >= self.fuzzy_threshold && best > 0.0 {
            round2(best)
        } else {
            0.0
        }
    }
}

impl MemeTemplate for PatternTemplate {
    fn key(&self) -> &str {
        &self.key
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, text: &str) -> f64 {
        match self.pattern_match(text) {
            Some((ratio, _)) => ratio,
            None => self.keyword_score(text),
        }
    }

    fn render_reference(&self, text: &str) -> Caption {
        match self.pattern_match(text) {
            Some((_, caption)) => caption,
            None => Caption::bottom_only(text),
        }
    }
}

fn length_ratio(pattern_len: usize, text_len: usize) -> f64 {
    if pattern_len == 0 || text_len == 0 {
        return 0.0;
    }
    let p = pattern_len as f64;
    let t = text_len as f64;
    round2((p / t).min(t / p))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
