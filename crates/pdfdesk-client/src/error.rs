use pdfdesk_core::DeskError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer from the backend
    #[error("{}", api_message(.error, .details))]
    Api {
        status: u16,
        error: String,
        details: Vec<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Core(#[from] DeskError),
}

fn api_message(error: &str, details: &[String]) -> String {
    if details.is_empty() {
        error.to_string()
    } else {
        format!("{}: {}", error, details.join("; "))
    }
}

impl ClientError {
    /// HTTP status for backend errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
