//! Binary responses and the names they are saved under

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

lazy_static! {
    /// `filename=...` or `filename*=...`, quoted or bare
    static ref FILENAME_RE: Regex =
        Regex::new(r#"filename[^;=\n]*=((['"]).*?['"]|[^;\n]*)"#).unwrap();

    /// RFC 5987 extended value: `filename*=UTF-8''name.pdf`
    static ref EXT_FILENAME_RE: Regex =
        Regex::new(r"(?i)filename\*\s*=\s*([\w-]+)'[^']*'([^;\n]+)").unwrap();
}

/// A file returned by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Pick the file name from headers, falling back to `default_name`
    pub fn new(
        content_disposition: Option<&str>,
        content_type: Option<&str>,
        default_name: &str,
        bytes: Vec<u8>,
    ) -> Self {
        let filename = content_disposition
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| default_name.to_string());
        let filename = match content_type {
            Some(ct) => fix_extension(&filename, ct),
            None => filename,
        };

        Self {
            filename,
            content_type: content_type.map(str::to_string),
            bytes,
        }
    }

    pub fn is_zip(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.contains("zip"))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write into `dir` under the download's own name; returns the path
    pub async fn save_to_dir(&self, dir: &Path) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(sanitize_file_name(&self.filename));
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

/// File name from a `Content-Disposition` header value
pub fn filename_from_disposition(header: &str) -> Option<String> {
    if let Some(caps) = EXT_FILENAME_RE.captures(header) {
        let encoded = caps.get(2)?.as_str().trim();
        let name = percent_decode(encoded);
        if !name.is_empty() {
            return Some(name);
        }
    }

    let raw = FILENAME_RE.captures(header)?.get(1)?.as_str();
    let name: String = raw.trim().chars().filter(|c| *c != '"' && *c != '\'').collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Archives always end in `.zip`, PDFs in `.pdf`
fn fix_extension(filename: &str, content_type: &str) -> String {
    let wanted = if content_type.contains("zip") {
        "zip"
    } else if content_type.contains("pdf") {
        "pdf"
    } else {
        return filename.to_string();
    };

    let path = Path::new(filename);
    let has_wanted = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case(wanted))
        .unwrap_or(false);
    if has_wanted {
        return filename.to_string();
    }

    let stem = match filename.rfind('.') {
        Some(dot) if dot > 0 => &filename[..dot],
        _ => filename,
    };
    format!("{}.{}", stem, wanted)
}

/// Last path component only; never writes outside the target directory
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    if base.is_empty() || base == "." || base == ".." {
        "download".to_string()
    } else {
        base.to_string()
    }
}

fn percent_decode(input: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(input.as_bytes())).into_owned()
}
