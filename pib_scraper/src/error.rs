use thiserror::Error;

/// Errors raised at component boundaries. The pipeline decides how each one degrades.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Form field '{0}' not found on listing page")]
    MissingFormField(&'static str),
    #[error("Completion API returned an error: {0}")]
    CompletionApi(String),
    #[error("Completion API returned no choices")]
    EmptyCompletion,
    #[error("Failed to render PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
