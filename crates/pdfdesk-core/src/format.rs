//! Display helpers for sizes and download names

use chrono::NaiveDateTime;

/// Human-readable size: "0 Bytes", "500 Bytes", "1.5 KB", "2.25 MB"
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    format!("{} {}", trim_decimals(scaled), UNITS[unit])
}

/// Two decimals at most, trailing zeros dropped
fn trim_decimals(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Shorten a file name to `max_len` characters, keeping its extension
///
/// `a_very_long_report_name.pdf` with a budget of 16 becomes `a_very_lo....pdf`.
pub fn truncate_file_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) => (&name[..dot], &name[dot + 1..]),
        None => (name, ""),
    };

    let keep = max_len.saturating_sub(ext.chars().count() + 4);
    let head: String = stem.chars().take(keep).collect();

    if ext.is_empty() {
        format!("{}...", head)
    } else {
        format!("{}....{}", head, ext)
    }
}

/// Drop a trailing `.pdf` (any case)
pub fn strip_pdf_extension(name: &str) -> &str {
    let cut = name.len().saturating_sub(4);
    match name.get(cut..) {
        Some(tail) if tail.eq_ignore_ascii_case(".pdf") => &name[..cut],
        _ => name,
    }
}

/// `YYYYmmdd_HHMMSS` stamp used in every generated file name
pub fn timestamp(now: NaiveDateTime) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// `{stem}_{suffix}_{timestamp}.{ext}`, e.g. `report_no_blanks_20240101_120000.pdf`
pub fn timestamped_name(stem: &str, suffix: &str, ext: &str, now: NaiveDateTime) -> String {
    if suffix.is_empty() {
        format!("{}_{}.{}", stem, timestamp(now), ext)
    } else {
        format!("{}_{}_{}.{}", stem, suffix, timestamp(now), ext)
    }
}
