use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VigilError;

/// Top-level configuration loaded from `.vigil.toml`.
///
/// Supports layered resolution: CLI flags > env vars > config file > defaults.
///
/// # Examples
///
/// ```
/// use vigil_core::VigilConfig;
///
/// let config = VigilConfig::default();
/// assert_eq!(config.llm.model, "gpt-4o");
/// assert!(config.review.exclude_patterns.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VigilConfig {
    /// Completion service settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Review behavior settings.
    #[serde(default)]
    pub review: ReviewConfig,
}

impl VigilConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Io`] if the file cannot be read, or
    /// [`VigilError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vigil_core::VigilConfig;
    /// use std::path::Path;
    ///
    /// let config = VigilConfig::from_file(Path::new(".vigil.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, VigilError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use vigil_core::VigilConfig;
    ///
    /// let toml = r#"
    /// [review]
    /// exclude_patterns = ["*.lock"]
    /// "#;
    /// let config = VigilConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.review.exclude_patterns, vec!["*.lock"]);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, VigilError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Completion service configuration.
///
/// Sampling parameters other than the output cap are pinned in the client so
/// reviews stay terse and reproducible across runs on the same input.
///
/// # Examples
///
/// ```
/// use vigil_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "gpt-4o");
/// assert_eq!(config.max_output_tokens, 500);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for the completion service.
    pub api_key: Option<String>,
    /// Custom base URL for API requests.
    pub base_url: Option<String>,
    /// Maximum tokens the model may generate per critique (default: 500).
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_model() -> String {
    "gpt-4o".into()
}

fn default_max_output_tokens() -> u32 {
    500
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: None,
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// Review behavior configuration.
///
/// # Examples
///
/// ```
/// use vigil_core::ReviewConfig;
///
/// let config = ReviewConfig::default();
/// assert_eq!(config.max_concurrency, 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Glob patterns for files to exclude from review (default: none).
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    /// Maximum completion calls in flight at once (default: 4).
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_concurrency() -> usize {
    4
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: Vec::new(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl ReviewConfig {
    /// Append patterns from a comma-separated list, as delivered by the
    /// `--exclude` flag or the `VIGIL_EXCLUDE` variable.
    ///
    /// Blank entries are ignored, so trailing commas are harmless.
    ///
    /// # Examples
    ///
    /// ```
    /// use vigil_core::ReviewConfig;
    ///
    /// let mut config = ReviewConfig::default();
    /// config.extend_exclusions("*.md, dist/**,");
    /// assert_eq!(config.exclude_patterns, vec!["*.md", "dist/**"]);
    /// ```
    pub fn extend_exclusions(&mut self, list: &str) {
        for entry in list.split(',') {
            let pattern = entry.trim();
            if !pattern.is_empty() {
                self.exclude_patterns.push(pattern.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = VigilConfig::default();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.max_output_tokens, 500);
        assert!(config.llm.api_key.is_none());
        assert!(config.review.exclude_patterns.is_empty());
        assert_eq!(config.review.max_concurrency, 4);
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[review]
exclude_patterns = ["*.lock", "dist/**"]
"#;
        let config = VigilConfig::from_toml(toml).unwrap();
        assert_eq!(config.review.exclude_patterns, vec!["*.lock", "dist/**"]);
        assert_eq!(config.review.max_concurrency, 4);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[llm]
model = "gpt-4o-mini"
base_url = "http://localhost:11434"
max_output_tokens = 256

[review]
exclude_patterns = ["vendor/**"]
max_concurrency = 2
"#;
        let config = VigilConfig::from_toml(toml).unwrap();
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:11434"));
        assert_eq!(config.llm.max_output_tokens, 256);
        assert_eq!(config.review.max_concurrency, 2);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = VigilConfig::from_toml("").unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert!(config.review.exclude_patterns.is_empty());
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = VigilConfig::from_toml("{{invalid}}");
        assert!(result.is_err());
    }

    #[test]
    fn extend_exclusions_splits_and_trims() {
        let mut config = ReviewConfig::default();
        config.extend_exclusions(" *.md ,,docs/** ");
        assert_eq!(config.exclude_patterns, vec!["*.md", "docs/**"]);
    }

    #[test]
    fn extend_exclusions_empty_list_is_noop() {
        let mut config = ReviewConfig::default();
        config.extend_exclusions("");
        assert!(config.exclude_patterns.is_empty());
    }
}
