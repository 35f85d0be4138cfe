use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    sync::Once,
    time::Duration,
};

use crate::{domain::ChatId, errors::Error, Result};

pub const DEFAULT_API_URL: &str = "https://praktikum.yandex.ru/api/user_api/homework_statuses/";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 20 * 60;
const DEFAULT_RETRY_DELAY_SECS: u64 = 5;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

const DEFAULT_LOG_FILE: &str = "logfile.log";
const DEFAULT_LOG_MAX_BYTES: u64 = 1024 * 1024;
const DEFAULT_LOG_BACKUPS: usize = 3;

/// Typed configuration for the bot.
///
/// Loaded once at startup and shared read-only for the lifetime of the process.
#[derive(Clone)]
pub struct Config {
    // Credentials
    pub praktikum_token: String,
    pub telegram_token: String,
    pub chat_id: ChatId,

    // Review API
    pub api_url: String,
    pub http_timeout: Duration,

    // Loop timing
    pub poll_interval: Duration,
    pub retry_delay: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_once();
        Self::from_lookup(env_str)
    }

    /// Build the config from an arbitrary variable lookup (the process env in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let praktikum_token = required(&lookup, "PRAKTIKUM_TOKEN")?;
        let telegram_token = required(&lookup, "TELEGRAM_TOKEN")?;
        let raw_chat_id = required(&lookup, "TELEGRAM_CHAT_ID")?;
        let chat_id = raw_chat_id.trim().parse::<i64>().map(ChatId).map_err(|_| {
            Error::Config(format!(
                "TELEGRAM_CHAT_ID must be a numeric chat id, got {raw_chat_id:?}"
            ))
        })?;

        let api_url = lookup("HOMEWORK_API_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let http_timeout = Duration::from_secs(
            parse_u64(&lookup, "HTTP_TIMEOUT_SECS").unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        );

        let poll_interval = Duration::from_secs(
            parse_u64(&lookup, "POLL_INTERVAL_SECS").unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        );
        let retry_delay = Duration::from_secs(
            parse_u64(&lookup, "RETRY_DELAY_SECS").unwrap_or(DEFAULT_RETRY_DELAY_SECS),
        );

        Ok(Self {
            praktikum_token,
            telegram_token,
            chat_id,
            api_url,
            http_timeout,
            poll_interval,
            retry_delay,
        })
    }
}

// Tokens never reach logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("praktikum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_url", &self.api_url)
            .field("http_timeout", &self.http_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

/// Where and how much to log. Separate from `Config` so logging can start
/// before credentials are checked.
#[derive(Clone, Debug)]
pub struct LogSettings {
    pub file: PathBuf,
    pub max_bytes: u64,
    pub backups: usize,
}

impl LogSettings {
    pub fn from_env() -> Self {
        load_dotenv_once();
        Self::from_lookup(env_str)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let file = lookup("LOG_FILE")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
        let max_bytes = parse_u64(&lookup, "LOG_MAX_BYTES").unwrap_or(DEFAULT_LOG_MAX_BYTES);
        let backups = lookup("LOG_BACKUPS")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_LOG_BACKUPS);

        Self {
            file,
            max_bytes,
            backups,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .and_then(non_empty)
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    lookup(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

static DOTENV: Once = Once::new();

/// Apply `.env` at most once per process, however many loaders ask for it.
fn load_dotenv_once() {
    load_dotenv_guarded(&DOTENV, Path::new(".env"));
}

fn load_dotenv_guarded(once: &Once, path: &Path) {
    once.call_once(|| load_dotenv_if_present(path));
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
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

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
