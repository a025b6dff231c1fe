//! Configuration file support.
//!
//! Settings are read from `--config <path>` or, failing that, from
//! `<config_dir>/cadguide/config.toml`. A missing file means defaults.
//!
//! ```toml
//! [catalog]
//! # Extra catalog files loaded after the builtin sample catalog
//! paths = ["/home/me/cad/extra.json"]
//! include_builtin = true
//!
//! [scoring]
//! # Any weight left out keeps its default
//! primary_use = 30.0
//! min_score = 15.0
//!
//! [quiz]
//! remember_answers = true
//! ```

use crate::error_handling::{CatalogError, Context, Result};
use crate::scorer::ScoringWeights;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub scoring: ScoringWeights,
    pub quiz: QuizConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub paths: Vec<PathBuf>,
    pub include_builtin: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            include_builtin: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Save finalized answers and pre-fill them next time.
    pub remember_answers: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self { remember_answers: true }
    }
}

/// `<config_dir>/cadguide/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cadguide").join("config.toml"))
}

impl Config {
    /// Loads the explicit path if given, else the default location.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), CatalogError> {
        let w = &self.scoring;
        let all = [
            w.budget,
            w.budget_ratio_span,
            w.over_budget_penalty,
            w.primary_use,
            w.any_use,
            w.experience_exact,
            w.experience_near,
            w.experience_far,
            w.platform,
            w.features,
            w.min_score,
            w.budget_ceiling_factor,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(CatalogError::Config("scoring weights must be finite numbers".to_string()));
        }
        if w.budget_ceiling_factor < 1.0 {
            return Err(CatalogError::Config(format!(
                "budget_ceiling_factor must be at least 1.0, got {}",
                w.budget_ceiling_factor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.catalog.include_builtin);
        assert!(config.quiz.remember_answers);
        assert_eq!(config.scoring.min_score, 10.0);
    }

    #[test]
    fn test_partial_scoring_override() {
        let config = Config::parse(
            r#"
            [scoring]
            primary_use = 40.0
            "#,
        )
        .unwrap();
        assert_eq!(config.scoring.primary_use, 40.0);
        assert_eq!(config.scoring.budget, 30.0);
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            [catalog]
            paths = ["/data/a.json", "/data/b.json"]
            include_builtin = false

            [quiz]
            remember_answers = false
            "#,
        )
        .unwrap();
        assert_eq!(config.catalog.paths.len(), 2);
        assert!(!config.catalog.include_builtin);
        assert!(!config.quiz.remember_answers);
    }

    #[test]
    fn test_rejects_invalid_ceiling() {
        let err = Config::parse("[scoring]\nbudget_ceiling_factor = 0.5\n").unwrap_err();
        assert!(err.to_string().contains("budget_ceiling_factor"));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[quiz]\nremember_answers = false\n").unwrap();
        assert!(!Config::from_file(&path).unwrap().quiz.remember_answers);
    }
}
