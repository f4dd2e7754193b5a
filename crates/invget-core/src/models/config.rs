//! Configuration structures for extraction and import.

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Model ids from earlier releases that are rewritten to [`DEFAULT_MODEL`].
const LEGACY_MODELS: &[&str] = &["gemini-3-flash-preview-02-05", "gemini-2.5-flash-lite"];

/// Main configuration for invget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvgetConfig {
    /// Remote model settings.
    pub remote: RemoteConfig,

    /// Issuing company profile used to fill missing sender fields.
    pub company: CompanyProfile,

    /// Import limits.
    pub import: ImportConfig,
}

/// Remote completion service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// API key. Empty means unset.
    pub api_key: String,

    /// Preferred model id.
    pub model: String,

    /// Models tried in order after the preferred and default model.
    pub fallback_models: Vec<String>,

    /// Endpoint prefix; the model id and action are appended.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            fallback_models: vec![
                "gemini-3-flash-preview-02-05".to_string(),
                "gemini-2.5-flash".to_string(),
            ],
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            timeout_secs: 90,
        }
    }
}

/// Saved issuing company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    /// Company name.
    pub company_name: String,

    /// Company address block.
    pub company_details: String,
}

impl CompanyProfile {
    /// True when neither field is set.
    pub fn is_empty(&self) -> bool {
        self.company_name.trim().is_empty() && self.company_details.trim().is_empty()
    }
}

/// Import limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Longest accepted chat prompt, in characters.
    pub chat_max_chars: usize,

    /// Number of diagnostic entries retained per run.
    pub diagnostics_capacity: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            chat_max_chars: 12_000,
            diagnostics_capacity: 180,
        }
    }
}

impl InvgetConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        config.migrate();
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Rewrite retired model ids and fill an empty model with the default.
    pub fn migrate(&mut self) {
        let model = self.remote.model.trim();
        if model.is_empty() || LEGACY_MODELS.contains(&model) {
            self.remote.model = DEFAULT_MODEL.to_string();
        }
    }

    /// API key from the environment, falling back to the saved key.
    pub fn resolved_api_key(&self) -> Option<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        pick_api_key(from_env.as_deref(), &self.remote.api_key)
    }
}

fn pick_api_key(from_env: Option<&str>, saved: &str) -> Option<String> {
    from_env
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .or_else(|| Some(saved.trim()).filter(|key| !key.is_empty()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = InvgetConfig::default();
        assert_eq!(config.remote.model, DEFAULT_MODEL);
        assert_eq!(config.remote.timeout_secs, 90);
        assert_eq!(config.import.chat_max_chars, 12_000);
        assert_eq!(config.import.diagnostics_capacity, 180);
        assert!(config.company.is_empty());
    }

    #[test]
    fn test_migrate_legacy_model() {
        let mut config = InvgetConfig::default();
        config.remote.model = "gemini-2.5-flash-lite".to_string();
        config.migrate();
        assert_eq!(config.remote.model, DEFAULT_MODEL);

        config.remote.model = "gemini-2.5-pro".to_string();
        config.migrate();
        assert_eq!(config.remote.model, "gemini-2.5-pro");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: InvgetConfig =
            serde_json::from_str(r#"{"company": {"company_name": "ACME LLC"}}"#).unwrap();
        assert_eq!(config.company.company_name, "ACME LLC");
        assert_eq!(config.remote, RemoteConfig::default());
    }

    #[test]
    fn test_api_key_precedence() {
        assert_eq!(pick_api_key(Some("env-key"), "saved"), Some("env-key".to_string()));
        assert_eq!(pick_api_key(Some("  "), "saved"), Some("saved".to_string()));
        assert_eq!(pick_api_key(None, ""), None);
    }
}
