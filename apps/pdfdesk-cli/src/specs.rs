//! Parsers for the compact argument forms
//!
//! `--range 2-5`, `--text 1:72,90:Approved`, `--line 1:10,10;200,10;200,40`
//! and `--image 1:40,40:logo.png:120x60`.

use std::path::PathBuf;

use pdfdesk_core::editor::Point;

#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    pub page: u32,
    pub at: Point,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSpec {
    pub page: u32,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSpec {
    pub page: u32,
    pub at: Point,
    pub path: PathBuf,
    /// Display size; the image's own size fitted into 200x200 when absent
    pub size: Option<(f64, f64)>,
}

/// `START-END`, or a single page `N`
pub fn parse_range_pair(value: &str) -> Result<(i64, i64), String> {
    let value = value.trim();
    let (start, end) = match value.split_once('-') {
        Some((s, e)) => (s.trim(), e.trim()),
        None => (value, value),
    };
    let start = start
        .parse::<i64>()
        .map_err(|_| format!("invalid range start '{}'", start))?;
    let end = end
        .parse::<i64>()
        .map_err(|_| format!("invalid range end '{}'", end))?;
    Ok((start, end))
}

/// `PAGE:X,Y:TEXT`; the text may itself contain colons
pub fn parse_text_spec(value: &str) -> Result<TextSpec, String> {
    let mut parts = value.splitn(3, ':');
    let page = parse_page(parts.next())?;
    let at = parse_point(parts.next().ok_or("missing X,Y")?)?;
    let text = parts.next().ok_or("missing text")?.to_string();
    Ok(TextSpec { page, at, text })
}

/// `PAGE:X,Y;X,Y;...` with at least one point
pub fn parse_line_spec(value: &str) -> Result<LineSpec, String> {
    let (page, points) = value.split_once(':').ok_or("expected PAGE:X,Y;X,Y")?;
    let page = parse_page(Some(page))?;
    let points = points
        .split(';')
        .filter(|p| !p.trim().is_empty())
        .map(parse_point)
        .collect::<Result<Vec<_>, _>>()?;
    if points.is_empty() {
        return Err("a line needs at least one point".into());
    }
    Ok(LineSpec { page, points })
}

/// `PAGE:X,Y:PATH` with an optional `:WxH` suffix
pub fn parse_image_spec(value: &str) -> Result<ImageSpec, String> {
    let mut parts = value.splitn(3, ':');
    let page = parse_page(parts.next())?;
    let at = parse_point(parts.next().ok_or("missing X,Y")?)?;
    let rest = parts.next().ok_or("missing image path")?;

    let (path, size) = match rest.rsplit_once(':') {
        Some((path, size)) => match parse_size(size) {
            Some(size) => (path, Some(size)),
            None => (rest, None),
        },
        None => (rest, None),
    };
    if path.trim().is_empty() {
        return Err("missing image path".into());
    }

    Ok(ImageSpec {
        page,
        at,
        path: PathBuf::from(path),
        size,
    })
}

fn parse_size(value: &str) -> Option<(f64, f64)> {
    let (w, h) = value.split_once(['x', 'X'])?;
    let dim = |d: &str| {
        d.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
    };
    Some((dim(w)?, dim(h)?))
}

fn parse_page(value: Option<&str>) -> Result<u32, String> {
    let value = value.ok_or("missing page")?.trim();
    match value.parse::<u32>() {
        Ok(0) | Err(_) => Err(format!("invalid page '{}'", value)),
        Ok(page) => Ok(page),
    }
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", value))?;
    let coord = |c: &str| {
        c.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("invalid coordinate '{}'", c.trim()))
    };
    Ok(Point {
        x: coord(x)?,
        y: coord(y)?,
    })
}
