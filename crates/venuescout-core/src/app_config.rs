#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    /// Production logs are plain text without ANSI colour.
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub places_api_key: String,
    pub places_base_url: String,
    pub maps_base_url: String,
    pub user_agent: String,
    /// Primary subtag only, e.g. `"en"` for `"en-US"`.
    pub language_code: String,
    pub search_radius_m: u32,
    pub max_concurrency: usize,
    pub min_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub page_size: usize,
    pub freshness_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("places_api_key", &"[redacted]")
            .field("places_base_url", &self.places_base_url)
            .field("maps_base_url", &self.maps_base_url)
            .field("user_agent", &self.user_agent)
            .field("language_code", &self.language_code)
            .field("search_radius_m", &self.search_radius_m)
            .field("max_concurrency", &self.max_concurrency)
            .field("min_interval_ms", &self.min_interval_ms)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .field("page_size", &self.page_size)
            .field("freshness_secs", &self.freshness_secs)
            .finish()
    }
}
