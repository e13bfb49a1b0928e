//! Configuration management
//!
//! Settings live in `~/.dada/config.yaml`. Environment variables override
//! the file, so a deployment can inject provider keys without writing them
//! to disk.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::provider::{ProviderKind, ProviderSettings, DEFAULT_REQUEST_TIMEOUT};

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "gemini_api_key",
    "groq_api_key",
    "deepseek_api_key",
    "gemini_model",
    "groq_model",
    "deepseek_model",
    "database_path",
    "conversations_path",
    "request_timeout_secs",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Google Gemini API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,

    /// Groq API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groq_api_key: Option<String>,

    /// DeepSeek API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deepseek_api_key: Option<String>,

    /// Model overrides; provider defaults apply when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groq_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deepseek_model: Option<String>,

    /// Catalog database location (default `~/.dada/catalog.db`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Conversation document location (default `~/.dada/conversations.json`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversations_path: Option<PathBuf>,

    /// Per-request provider timeout in seconds (default 30)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Loads `~/.dada/config.yaml` and applies environment overrides.
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        Ok(config.apply_overrides(|name| std::env::var(name).ok()))
    }

    /// Loads a config file without environment overrides.
    ///
    /// A missing or empty file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Writes the config to `~/.dada/config.yaml`.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let yaml = serde_saphyr::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    pub fn dada_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?
            .join(".dada"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::dada_dir()?.join("config.yaml"))
    }

    /// Overlays environment variables, looked up through `lookup`.
    ///
    /// `LLM_API_KEY` is the Gemini key; `GEMINI_API_KEY` is accepted too and
    /// wins when both are set. Empty values are ignored.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("GEMINI_API_KEY").or_else(|| var("LLM_API_KEY")) {
            self.gemini_api_key = Some(key);
        }
        if let Some(key) = var("GROQ_API_KEY") {
            self.groq_api_key = Some(key);
        }
        if let Some(key) = var("DEEPSEEK_API_KEY") {
            self.deepseek_api_key = Some(key);
        }
        if let Some(path) = var("DADA_DB_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(path) = var("DADA_CONVERSATIONS_PATH") {
            self.conversations_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = var("DADA_REQUEST_TIMEOUT_SECS") {
            match secs.trim().parse() {
                Ok(secs) => self.request_timeout_secs = Some(secs),
                Err(_) => tracing::warn!("Ignoring invalid DADA_REQUEST_TIMEOUT_SECS: {}", secs),
            }
        }
        self
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::dada_dir()?.join("catalog.db")),
        }
    }

    pub fn conversations_path(&self) -> Result<PathBuf> {
        match &self.conversations_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::dada_dir()?.join("conversations.json")),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Provider settings in fallback order: Gemini, Groq, DeepSeek.
    ///
    /// Providers without a key are left out.
    pub fn provider_settings(&self) -> Vec<ProviderSettings> {
        ProviderKind::ALL
            .iter()
            .filter_map(|&kind| {
                let (key, model) = match kind {
                    ProviderKind::Gemini => (&self.gemini_api_key, &self.gemini_model),
                    ProviderKind::Groq => (&self.groq_api_key, &self.groq_model),
                    ProviderKind::DeepSeek => (&self.deepseek_api_key, &self.deepseek_model),
                };
                let api_key = key.as_ref().filter(|k| !k.trim().is_empty())?;
                Some(ProviderSettings {
                    kind,
                    api_key: api_key.clone(),
                    model: model.clone(),
                    base_url: None,
                })
            })
            .collect()
    }

    /// Reads a value by key. Unset values are `None`.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let path = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());
        Ok(match key {
            "gemini_api_key" => self.gemini_api_key.clone(),
            "groq_api_key" => self.groq_api_key.clone(),
            "deepseek_api_key" => self.deepseek_api_key.clone(),
            "gemini_model" => self.gemini_model.clone(),
            "groq_model" => self.groq_model.clone(),
            "deepseek_model" => self.deepseek_model.clone(),
            "database_path" => path(&self.database_path),
            "conversations_path" => path(&self.conversations_path),
            "request_timeout_secs" => self.request_timeout_secs.map(|s| s.to_string()),
            _ => bail!(unknown_key(key)),
        })
    }

    /// Sets a value by key. An empty value unsets it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let text = (!value.is_empty()).then(|| value.to_string());

        match key {
            "gemini_api_key" => self.gemini_api_key = text,
            "groq_api_key" => self.groq_api_key = text,
            "deepseek_api_key" => self.deepseek_api_key = text,
            "gemini_model" => self.gemini_model = text,
            "groq_model" => self.groq_model = text,
            "deepseek_model" => self.deepseek_model = text,
            "database_path" => self.database_path = text.map(PathBuf::from),
            "conversations_path" => self.conversations_path = text.map(PathBuf::from),
            "request_timeout_secs" => {
                self.request_timeout_secs = match text {
                    Some(secs) => Some(
                        secs.parse()
                            .with_context(|| format!("Invalid timeout '{secs}': expected whole seconds"))?,
                    ),
                    None => None,
                }
            }
            _ => bail!(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key '{}'. Valid keys: {}",
        key,
        CONFIG_KEYS.join(", ")
    )
}

/// Masks a secret for display, keeping the last four characters.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.set("groq_api_key", "gsk-123").unwrap();
        config.set("request_timeout_secs", "12").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.groq_api_key.as_deref(), Some("gsk-123"));
        assert_eq!(loaded.request_timeout(), Duration::from_secs(12));
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "request_timeout_secs: [not, a, number]\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_env_overrides_file() {
        let config = Config {
            groq_api_key: Some("from-file".to_string()),
            ..Default::default()
        }
        .apply_overrides(env(&[
            ("GROQ_API_KEY", "from-env"),
            ("LLM_API_KEY", "gemini-env"),
            ("DADA_REQUEST_TIMEOUT_SECS", "5"),
            ("DEEPSEEK_API_KEY", "  "),
        ]));

        assert_eq!(config.groq_api_key.as_deref(), Some("from-env"));
        assert_eq!(config.gemini_api_key.as_deref(), Some("gemini-env"));
        assert_eq!(config.deepseek_api_key, None);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_gemini_api_key_wins_over_llm_api_key() {
        let config = Config::default().apply_overrides(env(&[
            ("LLM_API_KEY", "legacy"),
            ("GEMINI_API_KEY", "preferred"),
        ]));
        assert_eq!(config.gemini_api_key.as_deref(), Some("preferred"));
    }

    #[test]
    fn test_invalid_timeout_override_ignored() {
        let config = Config::default().apply_overrides(env(&[("DADA_REQUEST_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_provider_settings_order_and_filtering() {
        let config = Config {
            deepseek_api_key: Some("d".to_string()),
            gemini_api_key: Some("g".to_string()),
            groq_api_key: Some("".to_string()),
            gemini_model: Some("gemini-1.5-pro".to_string()),
            ..Default::default()
        };

        let settings = config.provider_settings();
        let kinds: Vec<ProviderKind> = settings.iter().map(|s| s.kind).collect();

        assert_eq!(kinds, vec![ProviderKind::Gemini, ProviderKind::DeepSeek]);
        assert_eq!(settings[0].model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(settings[1].model, None);
    }

    #[test]
    fn test_get_set_unknown_key() {
        let mut config = Config::default();

        let err = config.set("colour", "red").unwrap_err();
        assert!(err.to_string().contains("Unknown config key 'colour'"));
        assert!(config.get("colour").is_err());
    }

    #[test]
    fn test_set_empty_unsets() {
        let mut config = Config::default();
        config.set("gemini_model", "gemini-pro").unwrap();
        assert_eq!(config.get("gemini_model").unwrap().as_deref(), Some("gemini-pro"));

        config.set("gemini_model", "").unwrap();
        assert_eq!(config.get("gemini_model").unwrap(), None);
    }

    #[test]
    fn test_set_rejects_bad_timeout() {
        let mut config = Config::default();
        assert!(config.set("request_timeout_secs", "ten").is_err());
    }

    #[test]
    fn test_explicit_paths() {
        let mut config = Config::default();
        config.set("database_path", "/tmp/catalog.db").unwrap();

        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/catalog.db"));
        assert_eq!(
            config.get("database_path").unwrap().as_deref(),
            Some("/tmp/catalog.db")
        );
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret("sk-1234567890"), "****7890");
    }
}
