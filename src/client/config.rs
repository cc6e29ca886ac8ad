use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Quiet period before an inline title edit is sent.
    pub debounce: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            debounce: DEFAULT_DEBOUNCE,
            request_timeout: Duration::from_secs(5),
        }
    }
}
