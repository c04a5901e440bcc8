use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// Scheme and host of the blogging platform, without a trailing slash.
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Number of pages fetched concurrently before the driver waits.
    pub batch_size: usize,
    pub data_dir: PathBuf,
}
