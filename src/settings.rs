use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::Result;

const CONFIG_FILE: &str = "mail_time_check";
const ENV_PREFIX: &str = "MAILCHECK";
const REPORT_FILE: &str = "index.html";
const CI_OUTPUT_DIR: &str = "public";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: Option<String>,
    pub session_cookie: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_url: None,
            session_cookie: None,
            output_dir: None,
            request_timeout_secs: 10,
        }
    }
}

/// `mail_time_check.toml` (optional) overridden by `MAILCHECK_*` variables.
pub fn load() -> Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(CONFIG_FILE).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()?
        .try_deserialize::<Settings>()?;
    info!(
        base_url = ?settings.base_url,
        has_cookie = settings.session_cookie.is_some(),
        "Settings loaded"
    );
    Ok(settings)
}

pub fn is_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Report path: explicit override, else `public/` on CI, else the
/// configured output directory.
pub fn output_path(settings: &Settings, explicit: Option<&Path>, on_ci: bool) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    if on_ci {
        return Path::new(CI_OUTPUT_DIR).join(REPORT_FILE);
    }
    settings
        .output_dir
        .as_deref()
        .unwrap_or_else(|| Path::new("."))
        .join(REPORT_FILE)
}
