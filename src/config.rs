//! Environment-driven configuration.
//!
//! Resolution order per key: environment variable, then built-in default.
//! `.env` loading happens in `main` via dotenvy before resolution runs.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::model::StorageMode;

/// Resolved process configuration.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Root directory for the local cache store.
    pub data_dir: PathBuf,
    /// Storage mode used when the cache holds no persisted choice yet.
    pub default_mode: StorageMode,
    /// Endpoint of the relational (JSON-over-HTTP) backend.
    pub rest_url: Option<String>,
    /// Base URL of the document-cloud backend.
    pub cloud_url: Option<String>,
    /// API key for the document-cloud backend.
    pub cloud_api_key: Option<String>,
}

fn validate_endpoint(key: &str, raw: String) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/').to_string();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "endpoint must not be empty".to_string(),
        });
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("endpoint must be an http(s) URL, got '{trimmed}'"),
        });
    }
    Ok(trimmed)
}

impl StudioConfig {
    /// Resolve from the process environment.
    pub fn resolve() -> Result<Self, ConfigError> {
        Self::resolve_from(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary variable source (tests inject a map here).
    pub fn resolve_from(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = match var("STUDIO_DATA_DIR") {
            Some(raw) if !raw.trim().is_empty() => PathBuf::from(raw.trim()),
            _ => dirs::data_dir()
                .map(|base| base.join("studiodesk"))
                .ok_or(ConfigError::NoDataDir)?,
        };

        let default_mode = match var("STUDIO_STORAGE_MODE") {
            Some(raw) => {
                StorageMode::from_str_value(raw.trim()).ok_or_else(|| ConfigError::InvalidValue {
                    key: "STUDIO_STORAGE_MODE".to_string(),
                    message: format!(
                        "expected one of local, relational, document_cloud; got '{}'",
                        raw.trim()
                    ),
                })?
            }
            None => StorageMode::Local,
        };

        let rest_url = var("STUDIO_REST_URL")
            .map(|raw| validate_endpoint("STUDIO_REST_URL", raw))
            .transpose()?;
        let cloud_url = var("STUDIO_CLOUD_URL")
            .map(|raw| validate_endpoint("STUDIO_CLOUD_URL", raw))
            .transpose()?;
        let cloud_api_key = var("STUDIO_CLOUD_API_KEY").filter(|key| !key.trim().is_empty());

        Ok(Self {
            data_dir,
            default_mode,
            rest_url,
            cloud_url,
            cloud_api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::StudioConfig;
    use crate::error::ConfigError;
    use crate::model::StorageMode;

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn resolve_uses_local_mode_by_default() {
        let config = StudioConfig::resolve_from(vars(&[("STUDIO_DATA_DIR", "/tmp/studio")]))
            .expect("config");
        assert_eq!(config.default_mode, StorageMode::Local);
        assert_eq!(config.data_dir, std::path::PathBuf::from("/tmp/studio"));
        assert_eq!(config.rest_url, None);
    }

    #[test]
    fn resolve_normalizes_endpoint_trailing_slash() {
        let config = StudioConfig::resolve_from(vars(&[
            ("STUDIO_DATA_DIR", "/tmp/studio"),
            ("STUDIO_REST_URL", "https://studio.example.com/api.php/"),
        ]))
        .expect("config");
        assert_eq!(
            config.rest_url.as_deref(),
            Some("https://studio.example.com/api.php")
        );
    }

    #[test]
    fn resolve_rejects_non_http_endpoint() {
        let err = StudioConfig::resolve_from(vars(&[
            ("STUDIO_DATA_DIR", "/tmp/studio"),
            ("STUDIO_CLOUD_URL", "ftp://docs.example.com"),
        ]))
        .expect_err("must reject");
        let ConfigError::InvalidValue { key, message } = err else {
            panic!("expected InvalidValue");
        };
        assert_eq!(key, "STUDIO_CLOUD_URL");
        assert!(message.contains("http(s)"), "unexpected message: {message}");
    }

    #[test]
    fn resolve_rejects_unknown_storage_mode() {
        let err = StudioConfig::resolve_from(vars(&[
            ("STUDIO_DATA_DIR", "/tmp/studio"),
            ("STUDIO_STORAGE_MODE", "mysql"),
        ]))
        .expect_err("must reject");
        let ConfigError::InvalidValue { key, .. } = err else {
            panic!("expected InvalidValue");
        };
        assert_eq!(key, "STUDIO_STORAGE_MODE");
    }
}
