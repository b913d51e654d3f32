//! Whisper model registry and path resolution.
//!
//! `[speech] model` in `settings.toml` is either a registry id such as
//! `"base.en"`, or a path to a GGML file.  [`ModelPaths::resolve`] turns it
//! into a file location under the models directory.

use std::path::{Path, PathBuf};

use crate::config::AppPaths;

// ---------------------------------------------------------------------------
// ModelInfo
// ---------------------------------------------------------------------------

/// A GGML model known by id.
#[derive(Debug)]
pub struct ModelInfo {
    /// Identifier accepted in `[speech] model`.
    pub id: &'static str,
    pub file_name: &'static str,
}

/// Models known by id.  The `.en` variants are faster and more accurate for
/// short English phrases.
pub const WHISPER_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "tiny.en",
        file_name: "ggml-tiny.en.bin",
    },
    ModelInfo {
        id: "base.en",
        file_name: "ggml-base.en.bin",
    },
    ModelInfo {
        id: "small.en",
        file_name: "ggml-small.en.bin",
    },
    ModelInfo {
        id: "medium.en",
        file_name: "ggml-medium.en.bin",
    },
    ModelInfo {
        id: "base",
        file_name: "ggml-base.bin",
    },
    ModelInfo {
        id: "small",
        file_name: "ggml-small.bin",
    },
];

pub fn find_model_by_id(id: &str) -> Option<&'static ModelInfo> {
    WHISPER_MODELS.iter().find(|m| m.id == id)
}

// ---------------------------------------------------------------------------
// ModelPaths
// ---------------------------------------------------------------------------

/// ```rust,no_run
/// use memegen_live::config::AppPaths;
/// use memegen_live::stt::ModelPaths;
///
/// let paths = ModelPaths::from_app_paths(&AppPaths::new());
/// let model = paths.resolve("base.en");
/// println!("{} (exists: {})", model.display(), model.exists());
/// ```
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub models_dir: PathBuf,
}

impl ModelPaths {
    pub fn from_app_paths(app_paths: &AppPaths) -> Self {
        Self {
            models_dir: app_paths.models_dir.clone(),
        }
    }

    pub fn model_path(&self, model: &ModelInfo) -> PathBuf {
        self.models_dir.join(model.file_name)
    }

    /// File for a configured model name.
    ///
    /// Known ids map to their registry file; anything ending in `.bin` is
    /// taken as a path (relative ones under the models directory); other
    /// names follow the `ggml-<name>.bin` convention.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let name = name.trim();
        if let Some(model) = find_model_by_id(name) {
            return self.model_path(model);
        }
        if name.ends_with(".bin") {
            let path = Path::new(name);
            return if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.models_dir.join(path)
            };
        }
        self.models_dir.join(format!("ggml-{name}.bin"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn models_in(dir: &str) -> ModelPaths {
        ModelPaths {
            models_dir: PathBuf::from(dir),
        }
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = WHISPER_MODELS.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), WHISPER_MODELS.len());
    }

    #[test]
    fn file_names_follow_ggml_convention() {
        for m in WHISPER_MODELS {
            assert_eq!(m.file_name, format!("ggml-{}.bin", m.id));
        }
    }

    #[test]
    fn find_known_and_unknown() {
        assert_eq!(
            find_model_by_id("base.en").map(|m| m.file_name),
            Some("ggml-base.en.bin")
        );
        assert!(find_model_by_id("does-not-exist").is_none());
    }

    #[test]
    fn resolve_variants() {
        let mp = models_in("/models");
        assert_eq!(mp.resolve("base.en"), PathBuf::from("/models/ggml-base.en.bin"));
        assert_eq!(mp.resolve(" tiny.en "), PathBuf::from("/models/ggml-tiny.en.bin"));
        assert_eq!(mp.resolve("large-v3"), PathBuf::from("/models/ggml-large-v3.bin"));
        assert_eq!(mp.resolve("custom.bin"), PathBuf::from("/models/custom.bin"));
        assert_eq!(mp.resolve("/opt/w/m.bin"), PathBuf::from("/opt/w/m.bin"));
    }

    #[test]
    fn from_app_paths_uses_models_dir() {
        let app = crate::config::AppPaths::new();
        assert_eq!(ModelPaths::from_app_paths(&app).models_dir, app.models_dir);
    }
}
