use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub port: u16,
    pub rust_log: String,
    pub prompts_path: PathBuf,
    pub company_profile_path: PathBuf,
    pub company_website: Option<String>,
    /// Directory holding the browser UI served at `/`.
    pub static_dir: PathBuf,
    /// Present when a project and a processor are configured.
    pub document_ai: Option<DocumentAiConfig>,
}

/// Google Document AI processor coordinates for OCR-grade PDF extraction.
#[derive(Debug, Clone)]
pub struct DocumentAiConfig {
    pub project_id: String,
    pub location: String,
    pub processor_id: String,
    /// Pinned bearer token. Expires after about an hour; when unset, tokens
    /// come from the metadata server instead.
    pub access_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: env_or("GEMINI_MODEL", "gemini-1.5-pro"),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            prompts_path: PathBuf::from(env_or("PROMPTS_PATH", "prompts.json")),
            company_profile_path: PathBuf::from(env_or(
                "COMPANY_PROFILE_PATH",
                "company_profile.json",
            )),
            company_website: optional_env("COMPANY_WEBSITE"),
            static_dir: PathBuf::from(env_or("STATIC_DIR", "static")),
            document_ai: DocumentAiConfig::from_env(),
        })
    }
}

impl DocumentAiConfig {
    fn from_env() -> Option<Self> {
        Some(DocumentAiConfig {
            project_id: optional_env("GCP_PROJECT_ID")?,
            location: env_or("GCP_LOCATION", "us"),
            processor_id: optional_env("DOCUMENT_AI_PROCESSOR_ID")?,
            access_token: optional_env("GOOGLE_ACCESS_TOKEN"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Unset and blank values are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
