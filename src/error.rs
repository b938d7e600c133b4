use thiserror::Error;

/// Error kinds for the scraping pipeline. Components return these instead of
/// talking to the UI; the CLI layer decides how failures surface.
#[derive(Error, Debug)]
pub enum HunterError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, HunterError>;
