use log::warn;
use std::env;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Connection settings for the quiz web API, read from the same .env
/// file the web backend uses.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Don't fail if .env doesn't exist

        let base_url = sanitize_base_url(
            &env::var("QUIZMATE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        );

        let request_timeout_secs = env::var("QUIZMATE_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        ApiConfig {
            base_url,
            request_timeout_secs,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// Endpoint paths are appended verbatim, so the base must not end in a slash.
pub(crate) fn sanitize_base_url(raw: &str) -> String {
    if Url::parse(raw).is_err() {
        warn!(
            "⚠️ Configured API URL {:?} is not a valid URL, falling back to {}",
            raw, DEFAULT_API_URL
        );
        return DEFAULT_API_URL.to_string();
    }

    raw.trim_end_matches('/').to_string()
}
