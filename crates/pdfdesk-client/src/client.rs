//! HTTP calls to the PDF backend
//!
//! Every operation is a single POST. Uploads are multipart forms except the
//! editor save, which is a JSON body. Binary answers become [`Download`]s,
//! JSON answers are decoded into the types in [`crate::types`].

use crate::download::Download;
use crate::error::ClientError;
use crate::types::{ErrorBody, PageImagesResponse, PdfInfoResponse, PreviewsResponse};
use chrono::Utc;
use pdfdesk_core::format::{strip_pdf_extension, timestamped_name};
use pdfdesk_core::{BlankReport, CompressionLevel, DeskError, FileList, SavePayload, SplitPlan};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const COMPRESS_DEFAULT_NAME: &str = "compressed_files.pdf";
const MERGE_DEFAULT_NAME: &str = "merged_pdf.pdf";
const EDIT_DEFAULT_NAME: &str = "edited-document.pdf";

type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Client with the default request timeout
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Some(DEFAULT_TIMEOUT))
    }

    /// `None` disables the timeout
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        // Relative joins replace the last segment unless the path ends in '/'
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Compress every selected file at `level`. One file comes back as a
    /// PDF, several as a ZIP archive.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn compress(&self, files: &FileList, level: CompressionLevel) -> Result<Download> {
        if files.is_empty() {
            return Err(DeskError::Validation(vec!["Please select files first".into()]).into());
        }

        let mut form = Form::new();
        for (index, file) in files.iter().enumerate() {
            form = form
                .part("files", pdf_part(&file.name, &file.bytes)?)
                .text(format!("file_order_{}", index), index.to_string());
        }
        form = form.text("level", level.as_str());

        let response = self.post_form("compress", form).await?;
        let download = read_download(response, COMPRESS_DEFAULT_NAME).await?;
        info!(filename = %download.filename, bytes = download.len(), "Compression finished");
        Ok(download)
    }

    /// Merge in display order, sending rotations for turned files
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn merge(&self, files: &FileList) -> Result<Download> {
        if files.len() < 2 {
            return Err(DeskError::Validation(vec![
                "Please select at least 2 PDF files to merge".into(),
            ])
            .into());
        }

        let mut form = Form::new();
        for file in files.iter() {
            form = form.part("files", pdf_part(&file.name, &file.bytes)?);
        }

        let metadata = files.rotation_metadata();
        if !metadata.is_empty() {
            debug!(?metadata, "Sending rotation metadata");
            form = form.text("metadata", serde_json::to_string(&metadata)?);
        }

        let response = self.post_form("merge", form).await?;
        let download = read_download(response, MERGE_DEFAULT_NAME).await?;
        info!(filename = %download.filename, bytes = download.len(), "Merge finished");
        Ok(download)
    }

    #[instrument(skip(self, bytes, plan), fields(pdfs = plan.pdf_count()))]
    pub async fn split(&self, name: &str, bytes: &[u8], plan: &SplitPlan) -> Result<Download> {
        let mut form = Form::new().part("file", pdf_part(name, bytes)?);
        for (key, value) in plan.form_fields()? {
            form = form.text(key, value);
        }

        let default_name = timestamped_name("split_pdfs", "", "zip", Utc::now().naive_utc());
        let response = self.post_form("split-pdf", form).await?;
        let download = read_download(response, &default_name).await?;
        info!(filename = %download.filename, bytes = download.len(), "Split finished");
        Ok(download)
    }

    #[instrument(skip(self, bytes))]
    pub async fn pdf_info(&self, name: &str, bytes: &[u8]) -> Result<PdfInfoResponse> {
        let form = Form::new().part("file", pdf_part(name, bytes)?);
        let response = self.post_form("pdf-info", form).await?;
        read_json(response).await
    }

    #[instrument(skip(self, bytes))]
    pub async fn pdf_previews(&self, name: &str, bytes: &[u8]) -> Result<PreviewsResponse> {
        let form = Form::new().part("file", pdf_part(name, bytes)?);
        let response = self.post_form("pdf-previews", form).await?;
        let previews: PreviewsResponse = read_json(response).await?;
        if previews.text_only {
            warn!("Backend could not render previews; text only");
        }
        Ok(previews)
    }

    /// Render every page for the editor
    #[instrument(skip(self, bytes))]
    pub async fn pdf_to_images(&self, name: &str, bytes: &[u8]) -> Result<PageImagesResponse> {
        let form = Form::new().part("file", pdf_part(name, bytes)?);
        let response = self.post_form("pdf-to-images", form).await?;
        read_json(response).await
    }

    #[instrument(skip(self, payload), fields(pages = payload.pages.len()))]
    pub async fn save_edited_pdf(&self, payload: &SavePayload) -> Result<Download> {
        let url = self.endpoint("save-edited-pdf")?;
        debug!(%url, "POST json");
        let response = self.http.post(url).json(payload).send().await?;
        let response = check_status(response).await?;
        read_download(response, EDIT_DEFAULT_NAME).await
    }

    #[instrument(skip(self, bytes, report), fields(blank = report.blank_pages.len()))]
    pub async fn remove_blank_pages(
        &self,
        name: &str,
        bytes: &[u8],
        report: &BlankReport,
    ) -> Result<Download> {
        if !report.has_blank_pages() {
            return Err(DeskError::Validation(vec!["No blank pages to remove".into()]).into());
        }

        let form = Form::new()
            .part("file", pdf_part(name, bytes)?)
            .text("removeBlankPages", "true")
            .text("blankPages", report.blank_pages_json()?);

        let default_name = timestamped_name(
            strip_pdf_extension(name),
            "no_blanks",
            "pdf",
            Utc::now().naive_utc(),
        );
        let response = self.post_form("remove-blank-pages", form).await?;
        // The saved name is always generated locally
        let mut download = read_download(response, &default_name).await?;
        download.filename = default_name;
        Ok(download)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    async fn post_form(&self, path: &str, form: Form) -> Result<Response> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST multipart");
        let response = self.http.post(url).multipart(form).send().await?;
        check_status(response).await
    }
}

fn pdf_part(name: &str, bytes: &[u8]) -> Result<Part> {
    Ok(Part::bytes(bytes.to_vec())
        .file_name(name.to_string())
        .mime_str("application/pdf")?)
}

/// Turn non-2xx answers into `ClientError::Api`
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await?;
    let (error, details) = ErrorBody::parse(&body);
    warn!(status = status.as_u16(), %error, "Backend returned an error");
    Err(ClientError::Api {
        status: status.as_u16(),
        error,
        details,
    })
}

async fn read_download(response: Response, default_name: &str) -> Result<Download> {
    let header = |name: reqwest::header::HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let disposition = header(CONTENT_DISPOSITION);
    let content_type = header(CONTENT_TYPE);

    let bytes = response.bytes().await?.to_vec();
    Ok(Download::new(
        disposition.as_deref(),
        content_type.as_deref(),
        default_name,
        bytes,
    ))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
