use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, Result};

const DEFAULT_API_BASE_URL: &str = "https://omgvamp-hearthstone-v1.p.rapidapi.com";

/// Typed configuration, loaded from the environment (with optional `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    // Chat platform
    pub telegram_bot_token: String,

    // Hearthstone API (RapidAPI)
    pub api_base_url: String,
    pub api_host: String,
    pub api_key: String,
    pub http_timeout: Duration,

    // Card cache
    pub cache_max_bytes: usize,
    pub cache_ttl: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        // RapidAPI credentials; register at rapidapi.com for the Hearthstone
        // API to obtain these.
        let api_key = env_str("RAPID_API_KEY").and_then(non_empty).ok_or_else(|| {
            Error::Config("RAPID_API_KEY environment variable is required".to_string())
        })?;
        let api_host = env_str("RAPID_API_HOST")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("RAPID_API_HOST environment variable is required".to_string())
            })?;
        let api_base_url =
            env_str("HEARTHSTONE_API_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let http_timeout = Duration::from_millis(env_u64("HTTP_TIMEOUT_MS").unwrap_or(10_000));

        let cache_max_bytes = env_usize("CACHE_MAX_BYTES").unwrap_or(256 * 1024);
        let cache_ttl = Duration::from_secs(env_u64("CACHE_TTL_SECS").unwrap_or(600));

        Ok(Self {
            telegram_bot_token,
            api_base_url,
            api_host,
            api_key,
            http_timeout,
            cache_max_bytes,
            cache_ttl,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
