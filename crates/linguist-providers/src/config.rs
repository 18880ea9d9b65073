//! Backend configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use linguist_core::traits::ContentGenerator;

use crate::gemini::GeminiBackend;

/// Configuration for a single generative backend.
///
/// Note: custom Debug impl masks API keys to prevent accidental exposure in
/// logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendConfig::Gemini {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
        }
    }
}

/// Top-level linguist configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinguistConfig {
    /// Backend configurations keyed by name.
    #[serde(default)]
    pub backends: HashMap<String, BackendConfig>,
    /// Default backend to use.
    #[serde(default = "default_backend")]
    pub default_backend: String,
    /// Directory holding the persisted JSON collections.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_backend() -> String {
    "gemini".to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./linguist-data")
}

impl Default for LinguistConfig {
    fn default() -> Self {
        Self {
            backends: HashMap::new(),
            default_backend: default_backend(),
            data_dir: default_data_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a backend config.
fn resolve_backend_config(config: &BackendConfig) -> BackendConfig {
    match config {
        BackendConfig::Gemini {
            api_key,
            base_url,
            model,
        } => BackendConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|url| resolve_env_vars(url)),
            model: model.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `linguist.toml` in the current directory
/// 2. `~/.config/linguist/config.toml`
///
/// Environment variable override: `LINGUIST_GEMINI_KEY`.
pub fn load_config() -> Result<LinguistConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<LinguistConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("linguist.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<LinguistConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LinguistConfig::default(),
    };

    // Apply env var override
    if let Ok(key) = std::env::var("LINGUIST_GEMINI_KEY") {
        config
            .backends
            .entry("gemini".into())
            .or_insert(BackendConfig::Gemini {
                api_key: String::new(),
                base_url: None,
                model: None,
            });
        if let Some(BackendConfig::Gemini { api_key, .. }) = config.backends.get_mut("gemini") {
            *api_key = key;
        }
    }

    // Resolve env vars in all backend configs
    let resolved: HashMap<String, BackendConfig> = config
        .backends
        .iter()
        .map(|(name, backend)| (name.clone(), resolve_backend_config(backend)))
        .collect();
    config.backends = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join("linguist"))
}

/// Create a backend instance from its configuration.
pub fn create_backend(config: &BackendConfig) -> Result<Box<dyn ContentGenerator>> {
    match config {
        BackendConfig::Gemini {
            api_key,
            base_url,
            model,
        } => {
            let mut backend = GeminiBackend::new(api_key, base_url.clone());
            if let Some(model) = model {
                backend = backend.with_model(model);
            }
            Ok(Box::new(backend))
        }
    }
}
