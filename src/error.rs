use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// User input was blank; raised before any network attempt.
    #[error("Please enter a {what}")]
    EmptyQuery { what: &'static str },

    #[error("{feed} feed unavailable: {message}")]
    FeedUnavailable { feed: &'static str, message: String },

    #[error("Refresh failed: {message}")]
    RefreshFailed { message: String },
}

impl MapError {
    pub fn feed_unavailable(feed: &'static str, message: impl Into<String>) -> Self {
        MapError::FeedUnavailable {
            feed,
            message: message.into(),
        }
    }

    /// Whether the caller should show this as a validation problem rather than an outage.
    pub fn is_user_input(&self) -> bool {
        matches!(self, MapError::EmptyQuery { .. })
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
