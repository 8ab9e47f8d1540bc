use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5001/api";

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// API root; endpoint paths are appended verbatim.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Generation calls are slow, so this is generous.
    pub request_timeout: Duration,
    pub max_download_bytes: u64,
    /// Category sent with generic uploads.
    pub upload_category: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_download_bytes: 20 * 1024 * 1024,
            upload_category: "未分类".to_string(),
        }
    }
}

impl EngineSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}
