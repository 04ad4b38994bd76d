//! Page ranges, page selection and split planning
//!
//! Pages are 1-indexed everywhere. Range inputs arrive as signed integers
//! because they come straight from number fields and may be negative or zero.

use crate::error::DeskError;
use crate::notice::Notice;
use serde::Serialize;
use std::collections::BTreeSet;

/// Inclusive 1-based page range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// Outcome of correcting a single from/to input pair
#[derive(Debug, Clone, PartialEq)]
pub struct ClampedRange {
    pub range: PageRange,
    pub warnings: Vec<Notice>,
}

/// Correct a from/to pair the way the range inputs do on change: each value
/// is clamped into `1..=total`, then start and end are swapped if reversed.
pub fn clamp_range_input(start: i64, end: i64, total: u32) -> ClampedRange {
    let mut warnings = Vec::new();
    let max = i64::from(total.max(1));

    let mut clamp = |value: i64| -> i64 {
        if value < 1 {
            warnings.push(Notice::warning("Page number cannot be less than 1"));
            1
        } else if value > max {
            warnings.push(Notice::warning(format!(
                "Page number cannot be greater than {}. This PDF has only {} pages.",
                max, total
            )));
            max
        } else {
            value
        }
    };

    let mut start = clamp(start);
    let mut end = clamp(end);

    if start > end {
        warnings.push(Notice::warning(format!(
            "Start page ({}) cannot be greater than end page ({})",
            start, end
        )));
        std::mem::swap(&mut start, &mut end);
    }

    ClampedRange {
        range: PageRange::new(start as u32, end as u32),
        warnings,
    }
}

/// Every message plus the ranges that passed all checks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeValidation {
    pub errors: Vec<String>,
    pub ranges: Vec<PageRange>,
}

impl RangeValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check a list of from/to pairs against the document length
pub fn validate_ranges(pairs: &[(i64, i64)], total: u32) -> RangeValidation {
    let total_i = i64::from(total);
    let mut result = RangeValidation::default();

    for (i, &(start, end)) in pairs.iter().enumerate() {
        let n = i + 1;
        let start_ok = (1..=total_i).contains(&start);
        let end_ok = (1..=total_i).contains(&end);

        if !start_ok {
            result.errors.push(format!(
                "Range {}: Start page {} is out of bounds (1-{})",
                n, start, total
            ));
        }
        if !end_ok {
            result.errors.push(format!(
                "Range {}: End page {} is out of bounds (1-{})",
                n, end, total
            ));
        }
        if start > end {
            result.errors.push(format!(
                "Range {}: Start page {} cannot be greater than end page {}",
                n, start, end
            ));
        }

        if start_ok && end_ok && start <= end {
            result.ranges.push(PageRange::new(start as u32, end as u32));
        }
    }

    result
}

/// Parse page range string like "1-3, 5, 8-10" into sorted unique page numbers.
///
/// Every page and range end must fall inside `1..=total_pages`; offending
/// parts are reported together and nothing is expanded until they pass.
pub fn parse_ranges(input: &str, total_pages: u32) -> Result<Vec<u32>, DeskError> {
    let mut bounds = Vec::new();
    let mut invalid = Vec::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (start, end) = if let Some((start, end)) = part.split_once('-') {
            let start: u32 = start
                .trim()
                .parse()
                .map_err(|_| DeskError::InvalidRange(format!("Invalid start: {}", start)))?;
            let end: u32 = end
                .trim()
                .parse()
                .map_err(|_| DeskError::InvalidRange(format!("Invalid end: {}", end)))?;

            if start > end {
                return Err(DeskError::InvalidRange(format!(
                    "Start {} > end {}",
                    start, end
                )));
            }
            (start, end)
        } else {
            let page: u32 = part
                .parse()
                .map_err(|_| DeskError::InvalidRange(format!("Invalid page: {}", part)))?;
            (page, page)
        };

        if start == 0 || end > total_pages {
            invalid.push(part.to_string());
        } else {
            bounds.push((start, end));
        }
    }

    if !invalid.is_empty() {
        return Err(DeskError::Validation(vec![format!(
            "Invalid pages: {}. Valid range is 1-{}",
            invalid.join(", "),
            total_pages
        )]));
    }

    let pages: BTreeSet<u32> = bounds
        .into_iter()
        .flat_map(|(start, end)| start..=end)
        .collect();
    Ok(pages.into_iter().collect())
}

/// Pages clicked in the page grid, in click order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSelection {
    pages: Vec<u32>,
}

impl PageSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select if unselected, unselect otherwise. Returns the new state.
    pub fn toggle(&mut self, page: u32) -> bool {
        if let Some(pos) = self.pages.iter().position(|&p| p == page) {
            self.pages.remove(pos);
            false
        } else {
            self.pages.push(page);
            true
        }
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    pub fn pages(&self) -> &[u32] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }
}

impl FromIterator<u32> for PageSelection {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        let mut selection = PageSelection::new();
        for page in iter {
            if !selection.contains(page) {
                selection.pages.push(page);
            }
        }
        selection
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// Every page becomes its own PDF
    #[default]
    All,
    /// Only the pages in the selection
    Selected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitMode {
    /// Custom from/to ranges, one output PDF per range
    Range(Vec<(i64, i64)>),
    /// Page grid, one output PDF per page
    Pages(ExtractMode),
}

/// A validated split request, ready to become form fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    pub ranges: Vec<PageRange>,
    pub split_pages: Vec<u32>,
    /// Also put one PDF with every split page into the archive
    pub merge_all: bool,
    /// Return one PDF with the selected pages instead of an archive
    pub single_pdf: bool,
}

impl SplitPlan {
    pub fn build(
        mode: &SplitMode,
        total_pages: u32,
        selection: &PageSelection,
        include_merged: bool,
    ) -> Result<Self, DeskError> {
        let mut plan = SplitPlan {
            ranges: Vec::new(),
            split_pages: Vec::new(),
            merge_all: include_merged,
            single_pdf: false,
        };

        match mode {
            SplitMode::Range(pairs) => {
                let validation = validate_ranges(pairs, total_pages);
                if !validation.is_valid() {
                    return Err(DeskError::Validation(validation.errors));
                }
                if validation.ranges.is_empty() {
                    return Err(DeskError::InvalidRange(
                        "Please add at least one valid range".into(),
                    ));
                }
                plan.ranges = validation.ranges;
            }
            SplitMode::Pages(extract) => {
                let invalid: Vec<String> = selection
                    .pages()
                    .iter()
                    .filter(|&&p| p == 0 || p > total_pages)
                    .map(|p| p.to_string())
                    .collect();
                if !invalid.is_empty() {
                    return Err(DeskError::Validation(vec![format!(
                        "Invalid pages: {}. Valid range is 1-{}",
                        invalid.join(", "),
                        total_pages
                    )]));
                }

                plan.split_pages = match extract {
                    ExtractMode::All => (1..=total_pages).collect(),
                    ExtractMode::Selected => {
                        if selection.is_empty() {
                            return Err(DeskError::InvalidRange(
                                "Please select at least one page".into(),
                            ));
                        }
                        selection.pages().to_vec()
                    }
                };
            }
        }

        Ok(plan)
    }

    /// Ask for a single PDF instead of an archive
    pub fn single_pdf(mut self, single: bool) -> Self {
        self.single_pdf = single;
        self
    }

    /// Number of individual PDFs the split produces
    pub fn pdf_count(&self) -> usize {
        if self.single_pdf {
            1
        } else if !self.ranges.is_empty() {
            self.ranges.len()
        } else {
            self.split_pages.len()
        }
    }

    /// Every page that ends up in the output, sorted and unique
    pub fn extracted_pages(&self) -> Vec<u32> {
        let pages: BTreeSet<u32> = if self.ranges.is_empty() {
            self.split_pages.iter().copied().collect()
        } else {
            self.ranges.iter().flat_map(|r| r.pages()).collect()
        };
        pages.into_iter().collect()
    }

    /// Multipart text fields for the split endpoint
    pub fn form_fields(&self) -> Result<Vec<(&'static str, String)>, DeskError> {
        let mut fields = Vec::new();

        if !self.ranges.is_empty() {
            let pairs: Vec<(u32, u32)> = self.ranges.iter().map(|r| (r.start, r.end)).collect();
            fields.push(("ranges", serde_json::to_string(&pairs)?));
        } else {
            fields.push(("splitPages", serde_json::to_string(&self.split_pages)?));
        }

        if self.merge_all {
            fields.push(("mergeAll", "true".to_string()));
        }
        if self.single_pdf {
            fields.push(("singlePDF", "true".to_string()));
        }

        Ok(fields)
    }
}
