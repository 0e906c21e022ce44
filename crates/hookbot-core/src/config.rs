use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, Result};

/// Webhook settings read from the environment.
///
/// For a prefix such as `FEISHU` the variables are:
/// - `FEISHU_TOKEN`: bot token / key (required at send time, not here)
/// - `FEISHU_BASE_URL`: overrides the provider origin
/// - `FEISHU_TIMEOUT_MS`: whole-request timeout for the default HTTP client
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WebhookConfig {
    pub credential: String,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl WebhookConfig {
    /// Load `.env` from the working directory (without overriding existing
    /// variables), then read the prefixed variables.
    ///
    /// Loading `.env` writes to the process environment; call this before
    /// starting a multi-threaded runtime.
    pub fn from_env(prefix: &str) -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_vars(prefix, |key| env::var(key).ok())
    }

    /// Same as [`WebhookConfig::from_env`] but with an explicit lookup.
    pub fn from_vars(prefix: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |suffix: &str| lookup(&format!("{prefix}_{suffix}"));

        let credential = var("TOKEN").map(|s| s.trim().to_string()).unwrap_or_default();
        let base_url = var("BASE_URL").and_then(non_empty);

        let timeout = match var("TIMEOUT_MS").and_then(non_empty) {
            Some(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|e| {
                    Error::Config(format!("{prefix}_TIMEOUT_MS must be milliseconds: {e}"))
                })?;
                Some(Duration::from_millis(ms))
            }
            None => None,
        };

        Ok(Self {
            credential,
            base_url,
            timeout,
        })
    }
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

        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim();
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = &val[1..val.len() - 1];
        }

        out.push((key.to_string(), val.to_string()));
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
