//! Catalog loading from TOML.
//!
//! Resolution order used by [`Catalog::load`]:
//!
//! 1. `[catalog] path` from `settings.toml`, when set;
//! 2. `templates.toml` in the config directory, when it exists;
//! 3. the catalog compiled into the binary.
//!
//! A file that fails to load is logged and replaced by the built-in catalog;
//! the session never runs without templates because of a typo.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use super::{Catalog, CatalogError, MemeTemplate, PatternTemplate, TemplateSpec};
use crate::config::{AppPaths, CatalogConfig};

/// Catalog shipped with the binary.
const BUILTIN_CATALOG: &str = include_str!("../../assets/templates.toml");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    templates: Vec<TemplateSpec>,
}

impl Catalog {
    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Parse errors, invalid patterns, empty or duplicate keys.
    pub fn from_toml_str(content: &str, fuzzy_threshold: f64) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;

        let mut seen = HashSet::new();
        let mut templates: Vec<Arc<dyn MemeTemplate>> = Vec::with_capacity(file.templates.len());

        for (index, spec) in file.templates.into_iter().enumerate() {
            if spec.key.trim().is_empty() {
                return Err(CatalogError::MissingKey(index));
            }
            if !seen.insert(spec.key.clone()) {
                return Err(CatalogError::DuplicateKey(spec.key));
            }
            templates.push(Arc::new(PatternTemplate::from_spec(spec, fuzzy_threshold)?));
        }

        Ok(Self::new(templates))
    }

    /// Load a catalog file from `path`.
    pub fn load_from(path: &Path, fuzzy_threshold: f64) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, fuzzy_threshold)
    }

    /// The catalog compiled into the binary.
    pub fn builtin(fuzzy_threshold: f64) -> Self {
        match Self::from_toml_str(BUILTIN_CATALOG, fuzzy_threshold) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("catalog: built-in catalog is invalid: {e}");
                Self::default()
            }
        }
    }

    /// Resolve and load the catalog described by `config`.
    pub fn load(config: &CatalogConfig, paths: &AppPaths) -> Self {
        let candidate = config
            .path
            .clone()
            .or_else(|| paths.catalog_file.exists().then(|| paths.catalog_file.clone()));

        let catalog = match candidate {
            Some(path) => match Self::load_from(&path, config.fuzzy_threshold) {
                Ok(catalog) => {
                    log::info!(
                        "catalog: loaded {} templates from {}",
                        catalog.len(),
                        path.display()
                    );
                    catalog
                }
                Err(e) => {
                    log::error!("catalog: {e}; falling back to the built-in catalog");
                    Self::builtin(config.fuzzy_threshold)
                }
            },
            None => {
                let catalog = Self::builtin(config.fuzzy_threshold);
                log::info!("catalog: using {} built-in templates", catalog.len());
                catalog
            }
        };

        if catalog.is_empty() {
            log::warn!("catalog: no templates available, nothing will ever match");
        }
        catalog
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Caption, TemplateCatalog};
    use std::path::PathBuf;
    use tempfile::tempdir;

    const SMALL: &str = r#"
[[templates]]
key = "mordor"
name = "Boromir"
patterns = ["(one does not simply) (.+)"]

[[templates]]
key = "success"
keywords = ["success kid"]
"#;

    fn paths_in(dir: &Path) -> AppPaths {
        AppPaths {
            config_dir: dir.to_path_buf(),
            settings_file: dir.join("settings.toml"),
            catalog_file: dir.join("templates.toml"),
            models_dir: dir.join("models"),
        }
    }

    #[test]
    fn builtin_catalog_parses() {
        let catalog = Catalog::builtin(0.75);
        assert!(catalog.len() >= 10);
        assert!(catalog.keys().contains(&"mordor".to_string()));
    }

    #[test]
    fn builtin_keys_are_unique() {
        let keys = Catalog::builtin(0.75).keys();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn builtin_mordor_pattern_matches() {
        let catalog = Catalog::builtin(0.75);
        let mordor = catalog
            .list()
            .into_iter()
            .find(|t| t.key() == "mordor")
            .expect("mordor present");
        assert_eq!(
            mordor.render_reference("one does not simply write rust"),
            Caption::new("one does not simply", "write rust")
        );
    }

    #[test]
    fn from_toml_str_keeps_file_order() {
        let catalog = Catalog::from_toml_str(SMALL, 0.75).expect("parse");
        assert_eq!(catalog.keys(), vec!["mordor", "success"]);
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let doc = "[[templates]]\nkey = \"a\"\n[[templates]]\nkey = \"a\"\n";
        let err = Catalog::from_toml_str(doc, 0.75).err().expect("must fail");
        assert!(matches!(err, CatalogError::DuplicateKey(ref k) if k == "a"));
    }

    #[test]
    fn empty_keys_are_rejected() {
        let doc = "[[templates]]\nkey = \"ok\"\n[[templates]]\nkey = \" \"\n";
        let err = Catalog::from_toml_str(doc, 0.75).err().expect("must fail");
        assert!(matches!(err, CatalogError::MissingKey(1)));
    }

    #[test]
    fn empty_document_is_an_empty_catalog() {
        let catalog = Catalog::from_toml_str("", 0.75).expect("parse");
        assert!(catalog.is_empty());
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let err = Catalog::load_from(Path::new("/nonexistent/templates.toml"), 0.75)
            .err()
            .expect("must fail");
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn load_prefers_configured_path() {
        let dir = tempdir().expect("temp dir");
        let custom = dir.path().join("custom.toml");
        std::fs::write(&custom, SMALL).expect("write");

        let config = CatalogConfig {
            path: Some(custom),
            fuzzy_threshold: 0.75,
        };
        let catalog = Catalog::load(&config, &paths_in(dir.path()));
        assert_eq!(catalog.keys(), vec!["mordor", "success"]);
    }

    #[test]
    fn load_picks_up_config_dir_catalog() {
        let dir = tempdir().expect("temp dir");
        std::fs::write(dir.path().join("templates.toml"), SMALL).expect("write");

        let catalog = Catalog::load(&CatalogConfig::default(), &paths_in(dir.path()));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn load_falls_back_to_builtin_on_bad_file() {
        let dir = tempdir().expect("temp dir");
        let config = CatalogConfig {
            path: Some(PathBuf::from("/nonexistent/templates.toml")),
            fuzzy_threshold: 0.75,
        };
        let catalog = Catalog::load(&config, &paths_in(dir.path()));
        assert_eq!(catalog.len(), Catalog::builtin(0.75).len());
    }
}
