use std::time::Duration;

pub const API_URL: &str = "https://stageapi.monkcommerce.app/task/products/search";

/// Environment variable consulted when no API key is passed to the builder.
pub const API_KEY_ENV: &str = "PRODUCTS_API_KEY";

/// Products requested per catalog page. A page shorter than this ends pagination.
pub const PAGE_SIZE: usize = 10;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const SCROLL_THROTTLE: Duration = Duration::from_millis(1000);

/// Distance in pixels from the bottom of the picker list that counts as "near bottom".
pub const NEAR_BOTTOM_PX: f64 = 100.0;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const PLACEHOLDER_TITLE: &str = "Select Product";
pub const REFILL_PLACEHOLDER_TITLE: &str = "Empty Product";

/// Connection settings for the remote catalog search endpoint.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Build a config for `base_url`, taking the key from `api_key` or the
    /// [`API_KEY_ENV`] environment variable.
    pub fn resolve(
        base_url: Option<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> crate::Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => api_key_from_env().ok_or(crate::UpsellError::MissingApiKey)?,
        };
        Ok(Self {
            base_url: base_url.unwrap_or_else(|| API_URL.to_string()),
            api_key,
            timeout,
        })
    }
}

pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}
