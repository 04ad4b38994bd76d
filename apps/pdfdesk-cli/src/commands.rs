//! Subcommand implementations
//!
//! Each command loads its inputs into the core session types, lets them
//! validate, then hands the result to the API client. Notices raised by
//! the sessions are logged as they are drained.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use pdfdesk_client::{ApiClient, Download};
use pdfdesk_core::format::format_file_size;
use pdfdesk_core::editor::{fit_image_size, Point};
use pdfdesk_core::raster::{decode_data_url, decode_png, to_data_url};
use pdfdesk_core::{
    clamp_range_input, detect_blank_pages, inspect_pdf, page_count, BrushStyle,
    CompressionLevel, EditorSession, ExtractMode, FileList, MergeSort, Notice, NoticeLevel,
    parse_ranges, PageSelection, Progress, SortOrder, SplitMode, SplitPlan, TextStyle, Tool,
};
use tracing::{debug, error, info, warn};

use crate::specs::{ImageSpec, LineSpec, TextSpec};

const PAGE_IMAGE_NAME: &str = "edited-pdf-page.png";

/// Shared by every command
pub struct Context {
    pub client: ApiClient,
    pub out_dir: PathBuf,
}

impl Context {
    async fn save(&self, download: &Download) -> Result<PathBuf> {
        let path = download
            .save_to_dir(&self.out_dir)
            .await
            .with_context(|| format!("Failed to write {}", download.filename))?;
        info!(
            "Saved {} ({})",
            path.display(),
            format_file_size(download.len() as u64)
        );
        Ok(path)
    }
}

pub fn log_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Info | NoticeLevel::Success => info!("{}", notice.message),
        NoticeLevel::Warning => warn!("{}", notice.message),
        NoticeLevel::Error => error!("{}", notice.message),
    }
}

/// File name and contents
pub async fn read_input(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());
    Ok((name, bytes))
}

/// Build the selection list, dropping anything that is not a PDF
pub async fn load_file_list(paths: &[PathBuf]) -> Result<FileList> {
    let mut inputs = Vec::with_capacity(paths.len());
    for path in paths {
        inputs.push(read_input(path).await?);
    }

    let mut list = FileList::new();
    list.add_files(inputs);
    for notice in list.take_notices() {
        log_notice(&notice);
    }

    if list.is_empty() {
        bail!("No valid PDF files found");
    }
    info!("{}", list.summary());
    Ok(list)
}

/// Page count from the backend, or from the local parse when it is unreachable
pub async fn total_pages(client: &ApiClient, name: &str, bytes: &[u8]) -> Result<u32> {
    match client.pdf_info(name, bytes).await {
        Ok(info) => Ok(info.total_pages),
        Err(e) => {
            warn!("Backend page info unavailable ({}); reading locally", e);
            page_count(bytes).context("Failed to read the page count")
        }
    }
}

pub async fn info(ctx: &Context, file: &Path) -> Result<()> {
    let (name, bytes) = read_input(file).await?;

    match inspect_pdf(&bytes) {
        Ok(local) => {
            println!("{}", name);
            println!("  pages:     {}", local.page_count);
            println!("  version:   {}", local.version);
            println!("  size:      {}", format_file_size(local.size_bytes as u64));
            println!("  encrypted: {}", local.encrypted);
            if let Some(title) = &local.title {
                println!("  title:     {}", title);
            }
            if let Some(author) = &local.author {
                println!("  author:    {}", author);
            }
        }
        Err(e) => warn!("Local inspection failed: {}", e),
    }

    match ctx.client.pdf_info(&name, &bytes).await {
        Ok(remote) => println!(
            "  server:    {} pages, {}",
            remote.total_pages,
            format_file_size(remote.size)
        ),
        Err(e) => debug!("Backend page info unavailable: {}", e),
    }
    Ok(())
}

pub async fn compress(
    ctx: &Context,
    files: &[PathBuf],
    level: CompressionLevel,
    sort: Option<SortOrder>,
) -> Result<()> {
    let mut list = load_file_list(files).await?;
    if let Some(order) = sort {
        list.set_sort(order);
    }
    for notice in list.take_notices() {
        log_notice(&notice);
    }

    info!("Compression level: {} ({})", level, level.description());
    let download = ctx
        .client
        .compress(&list, level)
        .await
        .context("Compression failed")?;
    ctx.save(&download).await?;
    log_notice(&Notice::success("Files compressed successfully!"));
    Ok(())
}

pub async fn merge(
    ctx: &Context,
    files: &[PathBuf],
    order: MergeSort,
    rotate: &[usize],
) -> Result<()> {
    let mut list = load_file_list(files).await?;
    list.apply_merge_sort(order);

    // Positions are 1-based in the order after sorting
    for &position in rotate {
        let id = position
            .checked_sub(1)
            .and_then(|i| list.as_slice().get(i))
            .map(|f| f.id)
            .with_context(|| format!("No file at position {}", position))?;
        let angle = list.rotate(id)?;
        debug!(position, angle, "Rotated file");
    }

    let names: Vec<&str> = list.iter().map(|f| f.name.as_str()).collect();
    info!("Merge order: {}", names.join(", "));

    let download = ctx.client.merge(&list).await.context("Merge failed")?;
    ctx.save(&download).await?;
    log_notice(&Notice::success("PDFs merged successfully!"));
    Ok(())
}

pub struct SplitArgs {
    pub ranges: Vec<(i64, i64)>,
    /// Raw `--pages` list, parsed once the page count is known
    pub pages: Option<String>,
    pub merged: bool,
    pub single: bool,
}

/// Ranges are clamped into the document like the range inputs are, then
/// the plan is validated as a whole
pub fn plan_split(args: &SplitArgs, total: u32) -> Result<SplitPlan> {
    let mode = if !args.ranges.is_empty() {
        let ranges = args
            .ranges
            .iter()
            .map(|&(start, end)| {
                let clamped = clamp_range_input(start, end, total);
                for warning in &clamped.warnings {
                    log_notice(warning);
                }
                (clamped.range.start as i64, clamped.range.end as i64)
            })
            .collect();
        SplitMode::Range(ranges)
    } else if args.pages.is_some() {
        SplitMode::Pages(ExtractMode::Selected)
    } else {
        SplitMode::Pages(ExtractMode::All)
    };

    let selection: PageSelection = match &args.pages {
        Some(pages) => parse_ranges(pages, total)?.into_iter().collect(),
        None => PageSelection::new(),
    };
    let plan = SplitPlan::build(&mode, total, &selection, args.merged)?.single_pdf(args.single);
    Ok(plan)
}

pub async fn split(ctx: &Context, file: &Path, args: &SplitArgs) -> Result<()> {
    let (name, bytes) = read_input(file).await?;
    let total = total_pages(&ctx.client, &name, &bytes).await?;

    let plan = plan_split(args, total)?;
    info!(
        "Splitting {} ({} pages) into {} PDF(s)",
        name,
        total,
        plan.pdf_count()
    );

    let download = ctx
        .client
        .split(&name, &bytes, &plan)
        .await
        .context("Split failed")?;
    ctx.save(&download).await?;

    let message = if args.merged {
        "PDF split successfully! ZIP contains individual PDFs and merged PDF."
    } else {
        "PDF split successfully! ZIP contains individual PDFs."
    };
    log_notice(&Notice::success(message));
    Ok(())
}

pub async fn previews(ctx: &Context, file: &Path, save: bool) -> Result<()> {
    let (name, bytes) = read_input(file).await?;
    let previews = ctx
        .client
        .pdf_previews(&name, &bytes)
        .await
        .context("Failed to get PDF previews")?;

    for preview in &previews.previews {
        match (&preview.image, &preview.text) {
            (Some(image), _) => {
                if save {
                    let path = ctx.out_dir.join(format!("page_{}.png", preview.page));
                    write_data_url(&path, image).await?;
                    println!("Page {}: {}", preview.page, path.display());
                } else {
                    println!("Page {}: image ({} chars)", preview.page, image.len());
                }
            }
            (None, Some(text)) => println!("Page {}: {}", preview.page, text.trim()),
            (None, None) => println!("Page {}", preview.page),
        }
    }
    if previews.has_more {
        println!("(more pages not shown)");
    }
    Ok(())
}

pub async fn blanks(ctx: &Context, file: &Path, remove: bool) -> Result<()> {
    let (name, bytes) = read_input(file).await?;
    let images = ctx
        .client
        .pdf_to_images(&name, &bytes)
        .await
        .context("Failed to render pages")?;

    let report = detect_blank_pages(&images.pages, &mut |p: Progress| {
        debug!("{} ({:.0}%)", p.message(), p.percentage())
    });
    println!("{}", report.summary());

    if remove && report.has_blank_pages() {
        let download = ctx
            .client
            .remove_blank_pages(&name, &bytes, &report)
            .await
            .context("Failed to remove blank pages")?;
        ctx.save(&download).await?;
        log_notice(&Notice::success(format!(
            "Success! Removed {} blank pages. New PDF has {} pages.",
            report.blank_pages.len(),
            report.kept_pages().len()
        )));
    }
    Ok(())
}

pub struct AnnotateArgs {
    pub texts: Vec<TextSpec>,
    pub lines: Vec<LineSpec>,
    pub images: Vec<ImageSpec>,
    pub brush: BrushStyle,
    pub text_style: TextStyle,
    pub page_image: Option<u32>,
}

/// An image file ready to be dropped on a page
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedImage {
    pub page: u32,
    pub at: Point,
    pub src: String,
    pub width: f64,
    pub height: f64,
}

/// Check the PNG and work out its display size
pub fn place_image(spec: &ImageSpec, png: &[u8]) -> Result<PlacedImage> {
    let image = decode_png(png)
        .with_context(|| format!("{} is not a readable PNG", spec.path.display()))?;
    let (width, height) = spec
        .size
        .unwrap_or_else(|| fit_image_size(image.width as f64, image.height as f64));
    Ok(PlacedImage {
        page: spec.page,
        at: spec.at,
        src: to_data_url(png),
        width,
        height,
    })
}

async fn load_images(specs: &[ImageSpec]) -> Result<Vec<PlacedImage>> {
    let mut placed = Vec::with_capacity(specs.len());
    for spec in specs {
        let png = tokio::fs::read(&spec.path)
            .await
            .with_context(|| format!("Failed to read {}", spec.path.display()))?;
        placed.push(place_image(spec, &png)?);
    }
    Ok(placed)
}

/// Replay the requested edits on a loaded editor session
pub fn apply_edits(
    editor: &mut EditorSession,
    args: &AnnotateArgs,
    images: &[PlacedImage],
) -> Result<()> {
    editor.set_tool(Tool::Text);
    for spec in &args.texts {
        editor.go_to(spec.page)?;
        if !editor.add_text(spec.at.x, spec.at.y, &spec.text, &args.text_style) {
            warn!("Skipping empty text on page {}", spec.page);
        }
    }

    editor.set_tool(Tool::Draw);
    for line in &args.lines {
        editor.go_to(line.page)?;
        let (first, rest) = match line.points.split_first() {
            Some(split) => split,
            None => continue,
        };
        editor.begin_stroke(first.x, first.y, &args.brush);
        for point in rest {
            editor.extend_stroke(point.x, point.y);
        }
        editor.end_stroke();
    }

    editor.set_tool(Tool::Image);
    for image in images {
        editor.go_to(image.page)?;
        editor.add_image(
            image.at.x,
            image.at.y,
            image.src.clone(),
            image.width,
            image.height,
        )?;
    }
    Ok(())
}

pub async fn annotate(ctx: &Context, file: &Path, args: &AnnotateArgs) -> Result<()> {
    let (name, bytes) = read_input(file).await?;
    let images = load_images(&args.images).await?;
    let rendered = ctx
        .client
        .pdf_to_images(&name, &bytes)
        .await
        .context("Failed to convert PDF")?;

    let mut editor = EditorSession::new();
    editor.load(rendered.pages)?;
    info!("Loaded {} pages", editor.total_pages());

    apply_edits(&mut editor, args, &images)?;

    if let Some(page) = args.page_image {
        let path = ctx.out_dir.join(PAGE_IMAGE_NAME);
        write_data_url(&path, &editor.render_page(page)?).await?;
        info!("Saved page {} as {}", page, path.display());
    }

    let payload = editor.save_payload()?;
    let download = ctx
        .client
        .save_edited_pdf(&payload)
        .await
        .context("Error saving PDF")?;
    ctx.save(&download).await?;
    log_notice(&Notice::success("PDF saved successfully!"));
    Ok(())
}

async fn write_data_url(path: &Path, data_url: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let png = decode_data_url(data_url)?;
    tokio::fs::write(path, png)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
