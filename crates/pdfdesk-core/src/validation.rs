//! PDF input inspection
//!
//! Rejects non-PDF input before anything is queued for upload, and reads the
//! page count locally so range inputs can be bounded without a round trip.

use crate::error::DeskError;
use lopdf::Document;
use serde::Serialize;
use tracing::warn;

/// Basic facts about a selected PDF
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct PdfInfo {
    /// Number of pages in the document
    pub page_count: u32,
    /// PDF version string (e.g., "1.7")
    pub version: String,
    /// Whether the document is encrypted
    pub encrypted: bool,
    /// File size in bytes
    pub size_bytes: usize,
    /// Document title from metadata (if available)
    pub title: Option<String>,
    /// Document author from metadata (if available)
    pub author: Option<String>,
}

/// True when the file name carries a `.pdf` extension (any case)
pub fn is_pdf_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

/// Cheap check used at selection time: name and header.
///
/// A missing `%%EOF` near the end is only logged.
pub fn quick_validate(name: &str, bytes: &[u8]) -> Result<(), DeskError> {
    if !is_pdf_name(name) {
        return Err(DeskError::NotPdf(format!("{} is not a PDF file", name)));
    }

    if bytes.len() < 8 {
        return Err(DeskError::NotPdf(format!(
            "{} is too small to be a valid PDF",
            name
        )));
    }

    if !bytes.starts_with(b"%PDF-") {
        return Err(DeskError::NotPdf(format!(
            "{} is missing the %PDF- header",
            name
        )));
    }

    let tail = if bytes.len() > 1024 {
        &bytes[bytes.len() - 1024..]
    } else {
        bytes
    };

    if !tail.windows(5).any(|w| w == b"%%EOF") {
        warn!("{} has no %%EOF marker near the end; it may be truncated", name);
    }

    Ok(())
}

/// Parse the document and extract page count and metadata
pub fn inspect_pdf(bytes: &[u8]) -> Result<PdfInfo, DeskError> {
    if !bytes.starts_with(b"%PDF-") {
        return Err(DeskError::NotPdf("missing %PDF- header".into()));
    }

    let version = extract_version(bytes);
    let document = Document::load_mem(bytes).map_err(|e| DeskError::ParseError(e.to_string()))?;

    let page_count = document.get_pages().len() as u32;
    if page_count == 0 {
        return Err(DeskError::ParseError("PDF has no pages".into()));
    }

    let (title, author) = extract_metadata(&document);

    Ok(PdfInfo {
        page_count,
        version,
        encrypted: document.is_encrypted(),
        size_bytes: bytes.len(),
        title,
        author,
    })
}

/// Page count only
pub fn page_count(bytes: &[u8]) -> Result<u32, DeskError> {
    inspect_pdf(bytes).map(|info| info.page_count)
}

fn extract_version(bytes: &[u8]) -> String {
    // Header format: %PDF-1.7
    if bytes.len() >= 8 {
        if let Ok(version) = std::str::from_utf8(&bytes[5..8]) {
            return version.trim().to_string();
        }
    }
    "1.4".to_string()
}

fn extract_metadata(document: &Document) -> (Option<String>, Option<String>) {
    let info_dict = document
        .trailer
        .get(b"Info")
        .and_then(|obj| obj.as_reference())
        .ok()
        .and_then(|id| document.objects.get(&id))
        .and_then(|obj| obj.as_dict().ok());

    let Some(info_dict) = info_dict else {
        return (None, None);
    };

    let read = |key: &[u8]| {
        info_dict
            .get(key)
            .and_then(|obj| obj.as_str())
            .ok()
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .filter(|s| !s.is_empty())
    };

    (read(b"Title"), read(b"Author"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_pdf;

    #[test]
    fn test_is_pdf_name_ignores_case() {
        assert!(is_pdf_name("report.pdf"));
        assert!(is_pdf_name("REPORT.PDF"));
        assert!(!is_pdf_name("report.pdf.txt"));
        assert!(!is_pdf_name("image.png"));
    }

    #[test]
    fn test_quick_validate_rejects_wrong_extension() {
        let pdf = create_test_pdf(1);
        let err = quick_validate("notes.txt", &pdf).unwrap_err();
        assert!(matches!(err, DeskError::NotPdf(_)));
    }

    #[test]
    fn test_quick_validate_rejects_non_pdf_bytes() {
        assert!(quick_validate("fake.pdf", b"not a pdf file at all").is_err());
        assert!(quick_validate("tiny.pdf", b"tiny").is_err());
    }

    #[test]
    fn test_quick_validate_tolerates_missing_trailer() {
        let mut pdf = create_test_pdf(1);
        pdf.extend(std::iter::repeat(b'\n').take(4096));
        assert!(quick_validate("padded.pdf", &pdf).is_ok());

        let cut = &create_test_pdf(1)[..64];
        assert!(quick_validate("cut.pdf", cut).is_ok());
    }

    #[test]
    fn test_quick_validate_accepts_valid_pdf() {
        let pdf = create_test_pdf(2);
        assert!(quick_validate("ok.pdf", &pdf).is_ok());
    }

    #[test]
    fn test_inspect_pdf_reads_page_count_and_version() {
        let pdf = create_test_pdf(4);
        let info = inspect_pdf(&pdf).unwrap();
        assert_eq!(info.page_count, 4);
        assert_eq!(info.version, "1.7");
        assert_eq!(info.size_bytes, pdf.len());
        assert!(!info.encrypted);
    }

    #[test]
    fn test_page_count_rejects_garbage() {
        assert!(page_count(b"%PDF-1.7 garbage").is_err());
    }

    #[test]
    fn test_extract_version() {
        assert_eq!(extract_version(b"%PDF-1.4\n"), "1.4");
        assert_eq!(extract_version(b"%PDF-2.0\n"), "2.0");
    }
}
