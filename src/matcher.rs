//! Match engine: pick the single best template for the current input.
//!
//! [`evaluate`] is a pure function of the input text and the catalog's
//! enumeration.  Templates are scored in catalog order and only a strictly
//! greater ratio replaces the current leader, so ties go to the template
//! listed first.  A best ratio of zero means no match.

use std::fmt;
use std::sync::Arc;

use crate::catalog::{Caption, MemeTemplate, TemplateCatalog};
use crate::text::InputText;

/// The winning template for one input, with the caption it chose.
#[derive(Clone)]
pub struct MatchResult {
    pub template: Arc<dyn MemeTemplate>,
    pub ratio: f64,
    pub caption: Caption,
}

impl fmt::Debug for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchResult")
            .field("template", &self.template.key())
            .field("ratio", &self.ratio)
            .field("caption", &self.caption)
            .finish()
    }
}

/// Score `text` against every template and return the best match.
///
/// Returns `None` for an empty catalog or when every template scores `0`.
///
/// ```
/// use memegen_live::catalog::Catalog;
/// use memegen_live::matcher::evaluate;
/// use memegen_live::text::InputText;
///
/// let catalog = Catalog::builtin(0.75);
/// let result = evaluate(&InputText::new("One does not simply write Rust"), &catalog)
///     .expect("mordor matches");
/// assert_eq!(result.template.key(), "mordor");
/// assert_eq!(result.caption.bottom, "write rust");
///
/// assert!(evaluate(&InputText::empty(), &catalog).is_none());
/// ```
pub fn evaluate(text: &InputText, catalog: &dyn TemplateCatalog) -> Option<MatchResult> {
    let key = text.match_key();

    let mut best: Option<(Arc<dyn MemeTemplate>, f64)> = None;
    let mut best_ratio = 0.0_f64;

    for template in catalog.list() {
        let ratio = sanitize(template.score(&key));
        if ratio > best_ratio {
            best_ratio = ratio;
            log::debug!("matcher: leader at {ratio}: {}", template.key());
            best = Some((template, ratio));
        }
    }

    best.map(|(template, ratio)| {
        let caption = template.render_reference(&key);
        log::info!(
            "matcher: matched at {ratio}: {} - {caption}",
            template.name()
        );
        MatchResult {
            template,
            ratio,
            caption,
        }
    })
}

/// Clamp a template's score into `[0, 1]`; non-finite scores count as `0`.
fn sanitize(ratio: f64) -> f64 {
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use std::collections::HashMap;

    /// Template with a fixed score table; unknown text scores `default`.
    struct Stub {
        key: &'static str,
        scores: HashMap<&'static str, f64>,
        default: f64,
    }

    impl Stub {
        fn constant(key: &'static str, score: f64) -> Arc<dyn MemeTemplate> {
            Arc::new(Self {
                key,
                scores: HashMap::new(),
                default: score,
            })
        }

        fn table(key: &'static str, scores: &[(&'static str, f64)]) -> Arc<dyn MemeTemplate> {
            Arc::new(Self {
                key,
                scores: scores.iter().copied().collect(),
                default: 0.0,
            })
        }
    }

    impl MemeTemplate for Stub {
        fn key(&self) -> &str {
            self.key
        }
        fn name(&self) -> &str {
            self.key
        }
        fn score(&self, text: &str) -> f64 {
            self.scores.get(text).copied().unwrap_or(self.default)
        }
        fn render_reference(&self, text: &str) -> Caption {
            Caption::new(self.key, text)
        }
    }

    #[test]
    fn picks_highest_ratio() {
        let catalog = Catalog::new(vec![
            Stub::table("drake", &[("drake meme", 0.9)]),
            Stub::table("cat", &[("drake meme", 0.1)]),
        ]);
        let result = evaluate(&InputText::new("drake meme"), &catalog).expect("match");
        assert_eq!(result.template.key(), "drake");
        assert!((result.ratio - 0.9).abs() < 1e-9);
        assert_eq!(result.caption, Caption::new("drake", "drake meme"));
    }

    #[test]
    fn tie_goes_to_first_listed() {
        let catalog = Catalog::new(vec![
            Stub::constant("t1", 0.5),
            Stub::constant("t2", 0.5),
        ]);
        let result = evaluate(&InputText::new("x"), &catalog).expect("match");
        assert_eq!(result.template.key(), "t1");
    }

    #[test]
    fn strictly_greater_later_template_wins() {
        let catalog = Catalog::new(vec![
            Stub::constant("t1", 0.5),
            Stub::constant("t2", 0.5000001),
        ]);
        let result = evaluate(&InputText::new("x"), &catalog).expect("match");
        assert_eq!(result.template.key(), "t2");
    }

    #[test]
    fn repeated_evaluation_is_deterministic() {
        let catalog = Catalog::new(vec![
            Stub::constant("a", 0.3),
            Stub::constant("b", 0.7),
            Stub::constant("c", 0.7),
        ]);
        let text = InputText::new("same");
        for _ in 0..10 {
            let result = evaluate(&text, &catalog).expect("match");
            assert_eq!(result.template.key(), "b");
            assert!((result.ratio - 0.7).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_input_with_zero_scores_is_no_match() {
        let catalog = Catalog::new(vec![Stub::table("a", &[("hello", 1.0)])]);
        assert!(evaluate(&InputText::empty(), &catalog).is_none());
    }

    #[test]
    fn empty_catalog_is_no_match() {
        assert!(evaluate(&InputText::new("anything"), &Catalog::default()).is_none());
    }

    #[test]
    fn all_zero_is_no_match() {
        let catalog = Catalog::new(vec![Stub::constant("a", 0.0), Stub::constant("b", 0.0)]);
        assert!(evaluate(&InputText::new("x"), &catalog).is_none());
    }

    #[test]
    fn text_is_lowercased_and_normalized_before_scoring() {
        let catalog = Catalog::new(vec![Stub::table("drake", &[("drake meme", 0.9)])]);
        let result = evaluate(&InputText::new("  Drake   MEME "), &catalog).expect("match");
        assert_eq!(result.template.key(), "drake");
    }

    #[test]
    fn out_of_range_scores_are_sanitized() {
        let catalog = Catalog::new(vec![
            Stub::constant("nan", f64::NAN),
            Stub::constant("neg", -3.0),
            Stub::constant("big", 7.0),
        ]);
        let result = evaluate(&InputText::new("x"), &catalog).expect("match");
        assert_eq!(result.template.key(), "big");
        assert_eq!(result.ratio, 1.0);
    }
}
