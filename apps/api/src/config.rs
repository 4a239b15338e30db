use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_PERSONA_NAME: &str = "Brennan Willingham";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub pushover_token: String,
    pub pushover_user: String,
    pub allowed_origins: Vec<String>,
    pub allowed_hosts: Vec<String>,
    /// Defaults to "production" so a missing value never disables HTTPS redirects.
    pub environment: String,
    pub persona_name: String,
    pub resume_pdf_path: PathBuf,
    pub summary_path: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            pushover_token: require_env("PUSHOVER_TOKEN")?,
            pushover_user: require_env("PUSHOVER_USER")?,
            allowed_origins: split_list(&require_env("ALLOWED_ORIGINS")?),
            allowed_hosts: split_list(&require_env("ALLOWED_HOSTS")?),
            environment: optional_env("ENVIRONMENT", "production"),
            persona_name: optional_env("PERSONA_NAME", DEFAULT_PERSONA_NAME),
            resume_pdf_path: optional_env("RESUME_PDF_PATH", "me/linkedin.pdf").into(),
            summary_path: optional_env("SUMMARY_PATH", "me/summary.txt").into(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Splits a comma-separated list, also accepting the JSON array form
/// (`["a","b"]`) that older deployments put in their `.env` files.
fn split_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
            return items;
        }
    }
    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_comma_separated() {
        assert_eq!(
            split_list("https://a.dev, https://b.dev ,"),
            vec!["https://a.dev".to_string(), "https://b.dev".to_string()]
        );
    }

    #[test]
    fn test_split_list_json_array() {
        assert_eq!(
            split_list(r#"["example.com", "*.example.com"]"#),
            vec!["example.com".to_string(), "*.example.com".to_string()]
        );
    }

    #[test]
    fn test_is_production_is_case_insensitive() {
        let mut config = test_config();
        config.environment = "Production".to_string();
        assert!(config.is_production());
        config.environment = "development".to_string();
        assert!(!config.is_production());
    }

    pub(crate) fn test_config() -> Config {
        Config {
            openai_api_key: "sk-test".to_string(),
            pushover_token: "token".to_string(),
            pushover_user: "user".to_string(),
            allowed_origins: vec!["https://example.com".to_string()],
            allowed_hosts: vec!["*".to_string()],
            environment: "development".to_string(),
            persona_name: DEFAULT_PERSONA_NAME.to_string(),
            resume_pdf_path: "me/linkedin.pdf".into(),
            summary_path: "me/summary.txt".into(),
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) use tests::test_config;
