//! Page editor state
//!
//! Pages arrive from the backend as PNG data URLs. Freehand strokes are
//! burned into the page image at save time; text and image annotations
//! travel alongside as JSON. Coordinates are stored in page-image pixels,
//! i.e. canvas coordinates divided by the zoom factor at input time.

use crate::error::DeskError;
use crate::raster::{decode_pixmap_data_url, encode_pixmap_data_url};
use serde::{Deserialize, Serialize};
use tiny_skia::{
    BlendMode, Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap,
    Stroke as SkiaStroke, Transform,
};

pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 1.25;
/// Longest edge a placed image gets unless a size is given
pub const MAX_IMAGE_EDGE: f64 = 200.0;

/// Scale a natural image size down (never up) to fit `MAX_IMAGE_EDGE`
pub fn fit_image_size(width: f64, height: f64) -> (f64, f64) {
    let longest = width.max(height);
    if longest <= MAX_IMAGE_EDGE || longest <= 0.0 {
        return (width, height);
    }
    let scale = MAX_IMAGE_EDGE / longest;
    (width * scale, height * scale)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    Draw,
    Eraser,
    Text,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    Draw,
    Eraser,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Brush settings captured when a stroke starts
#[derive(Debug, Clone, PartialEq)]
pub struct BrushStyle {
    pub color: String,
    pub size: f64,
    pub opacity: f64,
}

impl Default for BrushStyle {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            size: 5.0,
            opacity: 1.0,
        }
    }
}

/// One freehand path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    #[serde(rename = "type")]
    pub kind: StrokeKind,
    pub points: Vec<Point>,
    /// `"eraser"` for eraser strokes
    pub color: String,
    pub size: f64,
    pub opacity: f64,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
    pub font_family: String,
    pub color: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            font_family: "Arial".to_string(),
            color: "#000000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Annotation {
    Text {
        page: u32,
        x: f64,
        y: f64,
        text: String,
        #[serde(rename = "fontSize")]
        font_size: f64,
        #[serde(rename = "fontFamily")]
        font_family: String,
        color: String,
    },
    Image {
        page: u32,
        x: f64,
        y: f64,
        /// Image data URL
        src: String,
        width: f64,
        height: f64,
    },
}

impl Annotation {
    pub fn page(&self) -> u32 {
        match self {
            Annotation::Text { page, .. } => *page,
            Annotation::Image { page, .. } => *page,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePayload {
    pub page: u32,
    /// PNG data URL with strokes applied
    pub data: String,
}

/// Body of the save request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    pub pages: Vec<PagePayload>,
    pub annotations: Vec<Annotation>,
    #[serde(rename = "drawingPaths")]
    pub drawing_paths: Vec<Stroke>,
}

#[derive(Debug)]
pub struct EditorSession {
    pages: Vec<String>,
    current_page: u32,
    zoom: f64,
    tool: Tool,
    strokes: Vec<Stroke>,
    drawing: bool,
    annotations: Vec<Annotation>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            current_page: 1,
            zoom: 1.0,
            tool: Tool::default(),
            strokes: Vec::new(),
            drawing: false,
            annotations: Vec::new(),
        }
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the document with freshly converted pages
    pub fn load(&mut self, pages: Vec<String>) -> Result<(), DeskError> {
        if pages.is_empty() {
            return Err(DeskError::NoDocument);
        }
        self.pages = pages;
        self.current_page = 1;
        self.zoom = 1.0;
        self.strokes.clear();
        self.annotations.clear();
        self.drawing = false;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        !self.pages.is_empty()
    }

    pub fn total_pages(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// "Page 2 of 7"
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.current_page, self.total_pages().max(1))
    }

    pub fn next_page(&mut self) -> bool {
        if self.current_page < self.total_pages() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    pub fn go_to(&mut self, page: u32) -> Result<(), DeskError> {
        if page == 0 || page > self.total_pages() {
            return Err(DeskError::OutOfBounds {
                index: page as usize,
                len: self.pages.len(),
            });
        }
        self.current_page = page;
        Ok(())
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
        self.zoom
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
        self.zoom
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }

    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Start a stroke at canvas coordinates. Only the draw and eraser tools
    /// draw; returns false otherwise.
    pub fn begin_stroke(&mut self, canvas_x: f64, canvas_y: f64, style: &BrushStyle) -> bool {
        let kind = match self.tool {
            Tool::Draw => StrokeKind::Draw,
            Tool::Eraser => StrokeKind::Eraser,
            _ => return false,
        };
        if !self.is_loaded() {
            return false;
        }

        let color = match kind {
            StrokeKind::Draw => style.color.clone(),
            StrokeKind::Eraser => "eraser".to_string(),
        };

        self.strokes.push(Stroke {
            kind,
            points: vec![self.to_page_point(canvas_x, canvas_y)],
            color,
            size: style.size,
            opacity: style.opacity,
            page: self.current_page,
        });
        self.drawing = true;
        true
    }

    pub fn extend_stroke(&mut self, canvas_x: f64, canvas_y: f64) {
        if !self.drawing {
            return;
        }
        let point = self.to_page_point(canvas_x, canvas_y);
        if let Some(stroke) = self.strokes.last_mut() {
            stroke.points.push(point);
        }
    }

    pub fn end_stroke(&mut self) {
        self.drawing = false;
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Remove the most recent stroke on the current page
    pub fn undo_last(&mut self) -> Option<Stroke> {
        let page = self.current_page;
        let index = self.strokes.iter().rposition(|s| s.page == page)?;
        Some(self.strokes.remove(index))
    }

    /// Place text at canvas coordinates; whitespace-only text is discarded
    pub fn add_text(&mut self, canvas_x: f64, canvas_y: f64, text: &str, style: &TextStyle) -> bool {
        if text.trim().is_empty() || !self.is_loaded() {
            return false;
        }
        let at = self.to_page_point(canvas_x, canvas_y);
        self.annotations.push(Annotation::Text {
            page: self.current_page,
            x: at.x,
            y: at.y,
            text: text.to_string(),
            font_size: style.font_size,
            font_family: style.font_family.clone(),
            color: style.color.clone(),
        });
        true
    }

    pub fn add_image(
        &mut self,
        canvas_x: f64,
        canvas_y: f64,
        src: impl Into<String>,
        width: f64,
        height: f64,
    ) -> Result<(), DeskError> {
        if !self.is_loaded() {
            return Err(DeskError::NoDocument);
        }
        let at = self.to_page_point(canvas_x, canvas_y);
        self.annotations.push(Annotation::Image {
            page: self.current_page,
            x: at.x,
            y: at.y,
            src: src.into(),
            width,
            height,
        });
        Ok(())
    }

    pub fn delete_annotation(&mut self, index: usize) -> Result<Annotation, DeskError> {
        if index >= self.annotations.len() {
            return Err(DeskError::OutOfBounds {
                index,
                len: self.annotations.len(),
            });
        }
        Ok(self.annotations.remove(index))
    }

    /// Drop strokes and annotations on the current page only
    pub fn clear_page(&mut self) {
        let page = self.current_page;
        self.strokes.retain(|s| s.page != page);
        self.annotations.retain(|a| a.page() != page);
        self.drawing = false;
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn strokes_for_page(&self, page: u32) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter().filter(move |s| s.page == page)
    }

    pub fn annotations_for_page(&self, page: u32) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |a| a.page() == page)
    }

    /// Page image with its strokes applied, as a PNG data URL
    pub fn render_page(&self, page: u32) -> Result<String, DeskError> {
        let index = page
            .checked_sub(1)
            .map(|i| i as usize)
            .filter(|&i| i < self.pages.len())
            .ok_or(DeskError::OutOfBounds {
                index: page as usize,
                len: self.pages.len(),
            })?;

        let mut strokes = self.strokes_for_page(page).peekable();
        if strokes.peek().is_none() {
            return Ok(self.pages[index].clone());
        }

        let mut pixmap = decode_pixmap_data_url(&self.pages[index])?;
        for stroke in strokes {
            paint_stroke(&mut pixmap, stroke);
        }
        encode_pixmap_data_url(&pixmap)
    }

    /// Everything the save endpoint needs
    pub fn save_payload(&self) -> Result<SavePayload, DeskError> {
        if !self.is_loaded() {
            return Err(DeskError::NoDocument);
        }

        let pages = (1..=self.total_pages())
            .map(|page| {
                Ok(PagePayload {
                    page,
                    data: self.render_page(page)?,
                })
            })
            .collect::<Result<Vec<_>, DeskError>>()?;

        Ok(SavePayload {
            pages,
            annotations: self.annotations.clone(),
            drawing_paths: self.strokes.clone(),
        })
    }

    fn to_page_point(&self, canvas_x: f64, canvas_y: f64) -> Point {
        Point {
            x: canvas_x / self.zoom,
            y: canvas_y / self.zoom,
        }
    }
}

/// Parse "#RRGGBB", "#RGB" or the same without `#`; anything else is black
fn parse_hex_color(color: &str) -> [u8; 3] {
    let hex = color.trim_start_matches('#');
    if !hex.is_ascii() {
        return [0, 0, 0];
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
    let parsed = match hex.len() {
        6 => (channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])),
        3 => (
            channel(&hex[0..1]).map(|c| c * 17),
            channel(&hex[1..2]).map(|c| c * 17),
            channel(&hex[2..3]).map(|c| c * 17),
        ),
        _ => (None, None, None),
    };
    match parsed {
        (Some(r), Some(g), Some(b)) => [r, g, b],
        _ => [0, 0, 0],
    }
}

/// Part of segment `a`-`b` inside `bounds` (left, top, right, bottom)
fn clip_segment(a: Point, b: Point, bounds: (f64, f64, f64, f64)) -> Option<(Point, Point)> {
    let (left, top, right, bottom) = bounds;
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);

    for (p, q) in [
        (-dx, a.x - left),
        (dx, right - a.x),
        (-dy, a.y - top),
        (dy, bottom - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| Point {
        x: a.x + dx * t,
        y: a.y + dy * t,
    };
    Some((at(t0), at(t1)))
}

/// Rasterise one stroke with round caps and joins.
///
/// The whole polyline is stroked as one path, so a semi-transparent stroke
/// does not darken where it overlaps itself. Segments are clipped to the
/// page plus a margin wider than the brush before they reach the rasteriser.
fn paint_stroke(pixmap: &mut Pixmap, stroke: &Stroke) {
    let points: Vec<Point> = stroke
        .points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    let Some(&first) = points.first() else {
        return;
    };

    let width = stroke.size.max(1.0);
    let bounds = (
        -width,
        -width,
        pixmap.width() as f64 + width,
        pixmap.height() as f64 + width,
    );

    let mut paint = Paint::default();
    paint.anti_alias = true;
    let mut color = match stroke.kind {
        StrokeKind::Draw => {
            let [r, g, b] = parse_hex_color(&stroke.color);
            Color::from_rgba8(r, g, b, 255)
        }
        StrokeKind::Eraser => {
            paint.blend_mode = BlendMode::DestinationOut;
            Color::BLACK
        }
    };
    color.set_alpha(stroke.opacity.clamp(0.0, 1.0) as f32);
    paint.set_color(color);

    // a click without movement leaves a dot
    if points.iter().all(|&p| p == first) {
        if clip_segment(first, first, bounds).is_none() {
            return;
        }
        if let Some(dot) =
            PathBuilder::from_circle(first.x as f32, first.y as f32, (width / 2.0) as f32)
        {
            pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
        }
        return;
    }

    let mut builder = PathBuilder::new();
    let mut pen: Option<Point> = None;
    for pair in points.windows(2) {
        match clip_segment(pair[0], pair[1], bounds) {
            Some((start, end)) => {
                if pen != Some(start) {
                    builder.move_to(start.x as f32, start.y as f32);
                }
                builder.line_to(end.x as f32, end.y as f32);
                pen = Some(end);
            }
            None => pen = None,
        }
    }
    let Some(path) = builder.finish() else {
        return;
    };

    let style = SkiaStroke {
        width: width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..SkiaStroke::default()
    };
    pixmap.stroke_path(&path, &paint, &style, Transform::identity(), None);
}
