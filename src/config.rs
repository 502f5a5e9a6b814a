use std::env;

use anyhow::Result;
use once_cell::sync::Lazy;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub database_url: String,
    pub gemini_api_key: String,
    pub gemini_image_model: String,
    pub gemini_image_model_hq: String,
    pub http_timeout_seconds: u64,
    pub starting_credits: i64,
}

pub static CONFIG: Lazy<Config> =
    Lazy::new(|| Config::load().expect("Failed to load configuration"));

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_i64(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Config {
            log_level: env_string("LOG_LEVEL", "info").to_lowercase(),
            database_url: env_string("DATABASE_URL", "sqlite://studio.db"),
            gemini_api_key: env_string("GEMINI_API_KEY", ""),
            gemini_image_model: env_string("GEMINI_IMAGE_MODEL", "gemini-2.5-flash-image"),
            gemini_image_model_hq: env_string(
                "GEMINI_IMAGE_MODEL_HQ",
                "gemini-3-pro-image-preview",
            ),
            http_timeout_seconds: env_u64("HTTP_TIMEOUT_SECONDS", 90),
            starting_credits: env_i64("STARTING_CREDITS", 5).max(0),
        })
    }
}
