use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Fixed cadence at which an active job is re-fetched.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2500);

/// Runtime settings for the API client and controller, assembled from CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Where voice favourites are persisted; `None` keeps them in memory only.
    #[serde(default)]
    pub favorites_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: Duration::from_secs(30),
            user_agent: format!("autovideo-cli/{}", env!("CARGO_PKG_VERSION")),
            favorites_path: default_favorites_path(),
        }
    }
}

/// `<data dir>/autovideo/voice_favorites.json`, when the platform has a data dir.
pub fn default_favorites_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("autovideo").join("voice_favorites.json"))
}

/// `<cache dir>/autovideo/autovideo.log`, used for TUI logging.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("autovideo").join("autovideo.log"))
}
