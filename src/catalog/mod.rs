//! Meme template catalog.
//!
//! # Overview
//!
//! [`MemeTemplate`] is the object-safe interface the match engine scores
//! against.  [`TemplateCatalog`] enumerates templates in a stable order; the
//! order is what makes first-seen tie-breaking reproducible.
//!
//! [`Catalog`] is the production implementation.  It holds
//! [`PatternTemplate`]s loaded from a TOML file (see [`loader`]) or from the
//! catalog compiled into the binary.
//!
//! ```text
//! templates.toml ──▶ TemplateSpec ──▶ PatternTemplate ──▶ Catalog
//!                                        │
//!                     score(text) ◀──────┤  (regex patterns, keywords)
//!           render_reference(text) ◀─────┘  → Caption
//! ```

pub mod caption;
pub mod loader;
pub mod template;

use std::sync::Arc;

use thiserror::Error;

pub use caption::Caption;
pub use template::{PatternTemplate, TemplateSpec};

// ---------------------------------------------------------------------------
// CatalogError
// ---------------------------------------------------------------------------

/// Errors raised while loading a catalog.  Scoring never fails.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("template {key:?} has an invalid pattern: {source}")]
    Pattern {
        key: String,
        #[source]
        source: regex::Error,
    },

    #[error("template key {0:?} appears more than once")]
    DuplicateKey(String),

    #[error("template at position {0} has an empty key")]
    MissingKey(usize),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A single catalog entry.
///
/// Implementations must be pure: the same text always yields the same score
/// and reference.
pub trait MemeTemplate: Send + Sync {
    /// Stable identifier, also the template id of the render service.
    fn key(&self) -> &str;

    /// Human-readable name for logs and the UI.
    fn name(&self) -> &str;

    /// Similarity of `text` (already lower-cased) to this template, in `[0, 1]`.
    fn score(&self, text: &str) -> f64;

    /// Caption this template would render for `text`.
    fn render_reference(&self, text: &str) -> Caption;
}

/// An ordered collection of templates.
///
/// `list` must return the same order on every call within a session.
pub trait TemplateCatalog: Send + Sync {
    fn list(&self) -> Vec<Arc<dyn MemeTemplate>>;
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// In-memory catalog; enumeration order is insertion order.
#[derive(Clone, Default)]
pub struct Catalog {
    templates: Vec<Arc<dyn MemeTemplate>>,
}

impl Catalog {
    pub fn new(templates: Vec<Arc<dyn MemeTemplate>>) -> Self {
        Self { templates }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Keys in enumeration order.
    pub fn keys(&self) -> Vec<String> {
        self.templates.iter().map(|t| t.key().to_string()).collect()
    }
}

impl TemplateCatalog for Catalog {
    fn list(&self) -> Vec<Arc<dyn MemeTemplate>> {
        self.templates.clone()
    }
}

// Compile-time assertion: both traits must stay object-safe.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn MemeTemplate>, _: Box<dyn TemplateCatalog>) {}
};

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl MemeTemplate for Named {
        fn key(&self) -> &str {
            self.0
        }
        fn name(&self) -> &str {
            self.0
        }
        fn score(&self, _text: &str) -> f64 {
            0.0
        }
        fn render_reference(&self, text: &str) -> Caption {
            Caption::bottom_only(text)
        }
    }

    #[test]
    fn list_preserves_insertion_order() {
        let catalog = Catalog::new(vec![
            Arc::new(Named("b")),
            Arc::new(Named("a")),
            Arc::new(Named("c")),
        ]);
        assert_eq!(catalog.keys(), vec!["b", "a", "c"]);

        let again: Vec<String> = catalog.list().iter().map(|t| t.key().to_string()).collect();
        assert_eq!(again, catalog.keys());
    }

    #[test]
    fn default_catalog_is_empty() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
        assert!(catalog.list().is_empty());
    }

    #[test]
    fn catalog_error_display_names_template() {
        let e = CatalogError::DuplicateKey("drake".into());
        assert!(e.to_string().contains("drake"));
    }
}
