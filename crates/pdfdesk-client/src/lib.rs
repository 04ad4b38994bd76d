//! Async client for the pdfdesk backend
//!
//! Wraps the HTTP contract of the PDF web application: compress, merge,
//! split, page info and previews, page images for the editor, saving
//! edits and removing blank pages.

pub mod client;
pub mod download;
pub mod error;
pub mod types;

pub use client::{ApiClient, DEFAULT_SERVER, DEFAULT_TIMEOUT};
pub use download::{filename_from_disposition, Download};
pub use error::ClientError;
pub use types::{PageImagesResponse, PagePreview, PdfInfoResponse, PreviewsResponse};
