//! JSON bodies exchanged with the backend

use serde::{Deserialize, Serialize};

/// `/pdf-info` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfInfoResponse {
    pub total_pages: u32,
    pub filename: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePreview {
    pub page: u32,
    /// PNG data URL; absent in the text-only fallback
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// `/pdf-previews` response. Only the first pages are rendered; `has_more`
/// tells whether the document is longer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewsResponse {
    pub previews: Vec<PagePreview>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub text_only: bool,
}

impl PreviewsResponse {
    /// Data URLs of the rendered previews, in page order
    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.previews.iter().filter_map(|p| p.image.as_deref())
    }
}

/// `/pdf-to-images` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageImagesResponse {
    pub pages: Vec<String>,
    pub total_pages: u32,
}

/// Details arrive either as a list or as a single string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorDetails {
    List(Vec<String>),
    One(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<ErrorDetails>,
}

impl ErrorBody {
    /// `(error, details)` for an error response body
    pub(crate) fn parse(body: &[u8]) -> (String, Vec<String>) {
        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => {
                let details = match parsed.details {
                    Some(ErrorDetails::List(list)) => list,
                    Some(ErrorDetails::One(one)) => vec![one],
                    None => Vec::new(),
                };
                (
                    parsed.error.unwrap_or_else(|| "Unknown error".to_string()),
                    details,
                )
            }
            Err(_) => ("Unknown error".to_string(), Vec::new()),
        }
    }
}
