//! Blank page detection
//!
//! A page counts as blank when nearly all of its rendered pixels are
//! near-white and opaque. One linear pass per page; no other heuristics.

use crate::error::DeskError;
use crate::progress::{Progress, ProgressSink};
use crate::raster::{decode_png_data_url, RgbaImage};
use serde::Serialize;
use tracing::debug;

/// Fraction of white pixels at or above which a page is blank
pub const BLANK_THRESHOLD: f64 = 0.98;

/// Channel value a pixel must exceed on R, G and B to count as white
const WHITE_LEVEL: u8 = 240;

/// Alpha a pixel must exceed to count as white (transparent is not paper)
const OPAQUE_LEVEL: u8 = 200;

/// Ratio of near-white opaque pixels in an RGBA buffer
pub fn white_ratio(rgba: &[u8]) -> f64 {
    let total = rgba.len() / 4;
    if total == 0 {
        return 0.0;
    }

    let white = rgba
        .chunks_exact(4)
        .filter(|p| {
            p[0] > WHITE_LEVEL && p[1] > WHITE_LEVEL && p[2] > WHITE_LEVEL && p[3] > OPAQUE_LEVEL
        })
        .count();

    white as f64 / total as f64
}

/// True when the white ratio reaches `threshold`
pub fn analyze_rgba(rgba: &[u8], threshold: f64) -> bool {
    white_ratio(rgba) >= threshold
}

pub fn is_blank(image: &RgbaImage) -> bool {
    analyze_rgba(&image.pixels, BLANK_THRESHOLD)
}

/// Result of scanning a whole document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlankReport {
    /// 1-based page numbers, ascending
    pub blank_pages: Vec<u32>,
    pub total_pages: u32,
}

impl BlankReport {
    pub fn has_blank_pages(&self) -> bool {
        !self.blank_pages.is_empty()
    }

    /// Pages that survive blank removal
    pub fn kept_pages(&self) -> Vec<u32> {
        (1..=self.total_pages)
            .filter(|p| !self.blank_pages.contains(p))
            .collect()
    }

    pub fn summary(&self) -> String {
        if self.blank_pages.is_empty() {
            return "No blank pages detected".to_string();
        }
        let list = self
            .blank_pages
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Blank Pages Detected: {} pages. Pages {} appear to be blank or nearly blank. \
             Removing them leaves {} pages.",
            self.blank_pages.len(),
            list,
            (self.total_pages as usize).saturating_sub(self.blank_pages.len())
        )
    }

    /// `blankPages` form field for the removal endpoint
    pub fn blank_pages_json(&self) -> Result<String, DeskError> {
        Ok(serde_json::to_string(&self.blank_pages)?)
    }
}

/// Scan already decoded pages
pub fn detect_blank_images<P: ProgressSink>(pages: &[RgbaImage], progress: &mut P) -> BlankReport {
    let total = pages.len() as u32;
    let mut report = BlankReport {
        blank_pages: Vec::new(),
        total_pages: total,
    };

    for (i, page) in pages.iter().enumerate() {
        let page_num = i as u32 + 1;
        if is_blank(page) {
            debug!("Page {} classified as blank", page_num);
            report.blank_pages.push(page_num);
        }
        progress.report(Progress::new(page_num, total));
    }

    report
}

/// Scan pages delivered as PNG data URLs.
///
/// A page that fails to decode is treated as not blank and skipped, so one
/// bad preview never hides content.
pub fn detect_blank_pages<S, P>(pages: &[S], progress: &mut P) -> BlankReport
where
    S: AsRef<str>,
    P: ProgressSink,
{
    let total = pages.len() as u32;
    let mut report = BlankReport {
        blank_pages: Vec::new(),
        total_pages: total,
    };

    for (i, data) in pages.iter().enumerate() {
        let page_num = i as u32 + 1;
        match decode_png_data_url(data.as_ref()) {
            Ok(image) if is_blank(&image) => {
                debug!("Page {} classified as blank", page_num);
                report.blank_pages.push(page_num);
            }
            Ok(_) => {}
            Err(e) => debug!("Skipping page {}: {}", page_num, e),
        }
        progress.report(Progress::new(page_num, total));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::raster::encode_png_data_url;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    /// 10x10 white canvas with `dark` black pixels
    fn canvas_with_dark_pixels(dark: u32) -> RgbaImage {
        let mut image = RgbaImage::filled(10, 10, WHITE);
        for i in 0..dark {
            image
                .pixel_mut(i % 10, i / 10)
                .unwrap()
                .copy_from_slice(&BLACK);
        }
        image
    }

    #[test]
    fn test_all_white_canvas_is_blank() {
        assert!(is_blank(&canvas_with_dark_pixels(0)));
    }

    #[test]
    fn test_more_than_two_percent_dark_is_not_blank() {
        assert!(!is_blank(&canvas_with_dark_pixels(3)));
    }

    #[test]
    fn test_exactly_two_percent_dark_is_still_blank() {
        assert!(is_blank(&canvas_with_dark_pixels(2)));
    }

    #[test]
    fn test_transparent_white_is_not_paper() {
        let image = RgbaImage::filled(10, 10, [255, 255, 255, 0]);
        assert!(!is_blank(&image));
    }

    #[test]
    fn test_light_grey_below_level_is_not_white() {
        let image = RgbaImage::filled(4, 4, [240, 240, 240, 255]);
        assert_eq!(white_ratio(&image.pixels), 0.0);
    }

    #[test]
    fn test_empty_buffer_is_not_blank() {
        assert!(!analyze_rgba(&[], BLANK_THRESHOLD));
    }

    #[test]
    fn test_detect_blank_pages_from_data_urls() {
        let pages = vec![
            encode_png_data_url(&canvas_with_dark_pixels(40)).unwrap(),
            encode_png_data_url(&canvas_with_dark_pixels(0)).unwrap(),
            "data:image/png;base64,AAAA".to_string(),
            encode_png_data_url(&canvas_with_dark_pixels(1)).unwrap(),
        ];

        let mut updates = Vec::new();
        let report = detect_blank_pages(&pages, &mut |p: Progress| updates.push(p));

        assert_eq!(report.blank_pages, vec![2, 4]);
        assert_eq!(report.total_pages, 4);
        assert_eq!(report.kept_pages(), vec![1, 3]);
        assert_eq!(updates.len(), 4);
        assert!(updates.last().unwrap().is_complete());
    }

    #[test]
    fn test_detect_blank_images() {
        let pages = vec![canvas_with_dark_pixels(0), canvas_with_dark_pixels(50)];
        let report = detect_blank_images(&pages, &mut NoProgress);
        assert_eq!(report.blank_pages, vec![1]);
    }

    #[test]
    fn test_report_summary_and_json() {
        let report = BlankReport {
            blank_pages: vec![2, 5],
            total_pages: 6,
        };
        assert!(report.summary().contains("Pages 2, 5 appear to be blank"));
        assert!(report.summary().ends_with("leaves 4 pages."));
        assert_eq!(report.blank_pages_json().unwrap(), "[2,5]");

        let clean = BlankReport {
            blank_pages: vec![],
            total_pages: 3,
        };
        assert!(!clean.has_blank_pages());
        assert_eq!(clean.summary(), "No blank pages detected");
    }

    #[test]
    fn test_summary_with_inconsistent_counts() {
        let report = BlankReport {
            blank_pages: vec![1, 2, 3],
            total_pages: 1,
        };
        assert!(report.summary().ends_with("leaves 0 pages."));
    }
}
