#[derive(Debug, thiserror::Error)]
pub enum UpsellError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP Error! Status: {0}")]
    Status(u16),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No catalog API key configured (set PRODUCTS_API_KEY or call api_key())")]
    MissingApiKey,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, UpsellError>;
