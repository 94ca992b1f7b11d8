use anyhow::{Context, Result};
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
/// Every variable has a sensible local default; the service starts with no .env at all.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the local Ollama instance.
    pub ollama_url: String,
    /// Model tag passed on every generate call.
    pub ollama_model: String,
    /// Directory where uploaded resumes are staged (transient).
    pub upload_dir: PathBuf,
    /// Directory where completed analysis reports are written.
    pub results_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            ollama_url: env_or("OLLAMA_URL", "http://localhost:11434"),
            ollama_model: env_or("OLLAMA_MODEL", "llama3.2"),
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
            results_dir: PathBuf::from(env_or("RESULTS_DIR", "results")),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
