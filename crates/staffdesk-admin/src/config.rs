//! Admin configuration (`staffdesk.toml`).

#![allow(missing_docs)]

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use smol_str::SmolStr;
use staffdesk_client::ClientOptions;
use staffdesk_model::query::DEFAULT_PAGE_SIZE;

use crate::error::AdminError;

/// Environment variable that overrides `session.access_token`.
pub const TOKEN_ENV: &str = "STAFFDESK_TOKEN";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validated admin settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    /// Backend base URL without a trailing slash.
    pub backend_url: SmolStr,
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
    pub access_token: Option<SmolStr>,
    pub page_size: u32,
    pub log_level: SmolStr,
}

impl AdminConfig {
    /// Defaults for a backend at `backend_url`.
    pub fn for_backend(backend_url: &str) -> Result<Self, AdminError> {
        AdminToml {
            backend: BackendSection {
                url: backend_url.to_string(),
                connect_timeout_ms: None,
                read_timeout_ms: None,
            },
            session: None,
            list: None,
            log: None,
        }
        .into_config()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AdminError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            AdminError::InvalidConfig(format!("{}: {err}", path.display()).into())
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, AdminError> {
        let raw: AdminToml = toml::from_str(text)
            .map_err(|err| AdminError::InvalidConfig(format!("staffdesk.toml: {err}").into()))?;
        raw.into_config()
    }

    /// Replaces the token with a non-blank `value` (the `STAFFDESK_TOKEN`
    /// environment variable).
    pub fn apply_env_token(&mut self, value: Option<String>) {
        if let Some(token) = value.filter(|token| !token.trim().is_empty()) {
            self.access_token = Some(SmolStr::new(token.trim()));
        }
    }

    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AdminToml {
    backend: BackendSection,
    session: Option<SessionSection>,
    list: Option<ListSection>,
    log: Option<LogSection>,
}

#[derive(Debug, Deserialize)]
struct BackendSection {
    url: String,
    connect_timeout_ms: Option<u64>,
    read_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SessionSection {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListSection {
    page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct LogSection {
    level: Option<String>,
}

impl AdminToml {
    fn into_config(self) -> Result<AdminConfig, AdminError> {
        let url = self.backend.url.trim().trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AdminError::InvalidConfig(
                format!("backend.url must be an http(s) URL, got '{url}'").into(),
            ));
        }
        let connect_timeout = timeout("backend.connect_timeout_ms", self.backend.connect_timeout_ms)?;
        let read_timeout = timeout("backend.read_timeout_ms", self.backend.read_timeout_ms)?;
        let page_size = self
            .list
            .and_then(|list| list.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(AdminError::InvalidConfig(
                "list.page_size must be at least 1".into(),
            ));
        }
        let log_level = self
            .log
            .and_then(|log| log.level)
            .map_or_else(|| "info".to_string(), |level| level.trim().to_ascii_lowercase());
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(AdminError::InvalidConfig(
                format!("log.level '{log_level}' is not one of {}", LOG_LEVELS.join(", ")).into(),
            ));
        }
        let access_token = self
            .session
            .and_then(|session| session.access_token)
            .filter(|token| !token.trim().is_empty())
            .map(|token| SmolStr::new(token.trim()));
        Ok(AdminConfig {
            backend_url: SmolStr::new(url),
            connect_timeout,
            read_timeout,
            access_token,
            page_size,
            log_level: SmolStr::new(log_level),
        })
    }
}

fn timeout(key: &str, millis: Option<u64>) -> Result<Option<Duration>, AdminError> {
    match millis {
        Some(0) => Err(AdminError::InvalidConfig(
            format!("{key} must be greater than 0").into(),
        )),
        Some(millis) => Ok(Some(Duration::from_millis(millis))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let config = AdminConfig::from_toml_str(
            r#"
[backend]
url = "https://hr.example.com/api/"
connect_timeout_ms = 2000
read_timeout_ms = 5000

[session]
access_token = " abc "

[list]
page_size = 25

[log]
level = "DEBUG"
"#,
        )
        .expect("config");
        assert_eq!(config.backend_url, "https://hr.example.com/api");
        assert_eq!(config.access_token.as_deref(), Some("abc"));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.client_options(),
            ClientOptions {
                connect_timeout: Some(Duration::from_secs(2)),
                read_timeout: Some(Duration::from_secs(5)),
            }
        );
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = AdminConfig::from_toml_str("[backend]\nurl = \"http://localhost:3000\"\n")
            .expect("config");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.access_token, None);
        assert_eq!(config.client_options(), ClientOptions::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        for text in [
            "[backend]\nurl = \"ftp://files\"\n",
            "[backend]\nurl = \"http://x\"\n[list]\npage_size = 0\n",
            "[backend]\nurl = \"http://x\"\nread_timeout_ms = 0\n",
            "[backend]\nurl = \"http://x\"\n[log]\nlevel = \"loud\"\n",
            "[list]\npage_size = 5\n",
        ] {
            assert!(
                matches!(
                    AdminConfig::from_toml_str(text),
                    Err(AdminError::InvalidConfig(_))
                ),
                "accepted: {text}"
            );
        }
    }

    #[test]
    fn env_token_overrides_file_token() {
        let mut config = AdminConfig::for_backend("http://localhost:3000").expect("config");
        config.apply_env_token(Some("   ".to_string()));
        assert_eq!(config.access_token, None);
        config.apply_env_token(Some("from-env".to_string()));
        assert_eq!(config.access_token.as_deref(), Some("from-env"));
        config.apply_env_token(None);
        assert_eq!(config.access_token.as_deref(), Some("from-env"));
    }
}
