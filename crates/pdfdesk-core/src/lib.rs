//! Client-side state for the pdfdesk PDF tools
//!
//! Everything here runs without the backend: picking and ordering files,
//! checking page ranges before a split, scanning rendered pages for blanks
//! and recording edits on page images. The HTTP side lives in
//! `pdfdesk-client`.

pub mod blank;
pub mod compression;
pub mod editor;
pub mod error;
pub mod files;
pub mod format;
pub mod notice;
pub mod progress;
pub mod ranges;
pub mod raster;
pub mod sort;
pub mod validation;

pub use blank::{detect_blank_images, detect_blank_pages, BlankReport, BLANK_THRESHOLD};
pub use compression::{CompressionLevel, CompressionSettings};
pub use editor::{
    Annotation, BrushStyle, EditorSession, PagePayload, SavePayload, Stroke, StrokeKind,
    TextStyle, Tool,
};
pub use error::DeskError;
pub use files::{FileList, RotationMeta, SelectedFile};
pub use format::{format_file_size, timestamped_name, truncate_file_name};
pub use notice::{Notice, NoticeLevel, Notices};
pub use progress::{NoProgress, Progress, ProgressSink};
pub use ranges::{
    clamp_range_input, parse_ranges, validate_ranges, ExtractMode, PageRange, PageSelection,
    SplitMode, SplitPlan,
};
pub use raster::RgbaImage;
pub use sort::{MergeSort, SortOrder};
pub use validation::{inspect_pdf, page_count, quick_validate, PdfInfo};
