use crate::cache::CACHE_FILE_NAME;
use crate::client::{BASE_URL, DEFAULT_MARKET};
use crate::error::BingError;
use log::debug;
use std::env;
use std::path::{Path, PathBuf};

pub const ERROR_LOG_FILE_NAME: &str = "bing-error.txt";
pub const BASE_URL_ENV: &str = "BING_BASE_URL";
pub const MARKET_ENV: &str = "BING_MARKET";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub market: String,
    pub cache_path: PathBuf,
    pub error_log_path: PathBuf,
}

impl Settings {
    /// Defaults with the cache and error log placed in `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            base_url: BASE_URL.to_string(),
            market: DEFAULT_MARKET.to_string(),
            cache_path: dir.join(CACHE_FILE_NAME),
            error_log_path: dir.join(ERROR_LOG_FILE_NAME),
        }
    }

    /// Settings next to the running executable, with `BING_BASE_URL` and
    /// `BING_MARKET` overrides from the environment.
    pub fn from_env() -> Result<Self, BingError> {
        let settings = Self::in_dir(executable_dir()?).with_overrides(|key| env::var(key).ok());
        debug!("Resolved settings {:?}", settings);
        Ok(settings)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(market) = lookup(MARKET_ENV).filter(|v| !v.is_empty()) {
            self.market = market;
        }
        self
    }
}

/// Directory containing the running executable.
pub fn executable_dir() -> Result<PathBuf, BingError> {
    let exe = env::current_exe()
        .map_err(|e| BingError::Config(format!("cannot locate executable: {e}")))?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| BingError::Config(format!("{} has no parent directory", exe.display())))
}
