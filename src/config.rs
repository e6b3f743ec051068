// ⚙️ Configuration - defaults, then JSON file, then environment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::validators::DEFAULT_DISPOSABLE_DOMAINS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// JSON catalog replacing the built-in one
    pub catalog_path: Option<PathBuf>,
    pub disposable_domains: Vec<String>,
    /// Delay between dismissing the confirmation and the form reset
    pub dismiss_delay_ms: u64,
    pub server_bind: String,
    /// Open driver sessions kept by the server before the least recently used is dropped
    pub max_sessions: usize,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            disposable_domains: DEFAULT_DISPOSABLE_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            dismiss_delay_ms: 300,
            server_bind: "127.0.0.1:3000".into(),
            max_sessions: 256,
        }
    }
}

impl FormConfig {
    /// Defaults, overlaid with `path` when given, then with `REGFORM_*` variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&raw).context("Failed to parse config JSON")
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("REGFORM_CATALOG") {
            self.catalog_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("REGFORM_DISMISS_DELAY_MS") {
            self.dismiss_delay_ms = v
                .parse()
                .with_context(|| format!("REGFORM_DISMISS_DELAY_MS is not a number: {}", v))?;
        }
        if let Some(v) = lookup("REGFORM_BIND") {
            self.server_bind = v;
        }
        if let Some(v) = lookup("REGFORM_MAX_SESSIONS") {
            self.max_sessions = v
                .parse()
                .with_context(|| format!("REGFORM_MAX_SESSIONS is not a number: {}", v))?;
        }
        Ok(())
    }

    pub fn dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.dismiss_delay_ms)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = FormConfig::default();
        assert_eq!(config.dismiss_delay(), Duration::from_millis(300));
        assert_eq!(config.disposable_domains.len(), 3);
        assert!(config.catalog_path.is_none());
        assert_eq!(config.max_sessions, 256);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: FormConfig = serde_json::from_str(r#"{"dismiss_delay_ms": 50}"#).unwrap();
        assert_eq!(config.dismiss_delay_ms, 50);
        assert_eq!(config.server_bind, "127.0.0.1:3000");
        assert!(config.disposable_domains.contains(&"mailinator.com".to_string()));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("REGFORM_DISMISS_DELAY_MS", "0"),
            ("REGFORM_BIND", "0.0.0.0:8080"),
            ("REGFORM_CATALOG", "/tmp/catalog.json"),
            ("REGFORM_MAX_SESSIONS", "8"),
        ]
        .into_iter()
        .collect();

        let mut config = FormConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.dismiss_delay_ms, 0);
        assert_eq!(config.server_bind, "0.0.0.0:8080");
        assert_eq!(config.catalog_path, Some(PathBuf::from("/tmp/catalog.json")));
        assert_eq!(config.max_sessions, 8);
    }

    #[test]
    fn test_bad_delay_rejected() {
        let mut config = FormConfig::default();
        let result = config.apply_env(|key| {
            (key == "REGFORM_DISMISS_DELAY_MS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }
}
