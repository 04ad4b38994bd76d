//! pdfdesk command line
//!
//! Drives the pdfdesk backend from a terminal:
//!
//! - `compress` / `merge` a list of PDFs
//! - `split` by ranges or pages
//! - `blanks` to find (and optionally drop) blank pages
//! - `annotate` to draw, add text and place images, then save the edited PDF
//! - `info` / `previews` for inspection

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use pdfdesk_client::{ApiClient, DEFAULT_SERVER};
use pdfdesk_core::{BrushStyle, CompressionLevel, MergeSort, SortOrder, TextStyle};
use tracing::{debug, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod specs;

use commands::{AnnotateArgs, Context, SplitArgs};
use specs::{
    parse_image_spec, parse_line_spec, parse_range_pair, parse_text_spec, ImageSpec, LineSpec,
    TextSpec,
};

/// Command-line arguments for pdfdesk
#[derive(Parser, Debug)]
#[command(name = "pdfdesk")]
#[command(version, about = "Compress, merge, split and edit PDFs through a pdfdesk server")]
struct Args {
    /// Backend base URL
    #[arg(long, env = "PDFDESK_SERVER", default_value = DEFAULT_SERVER, global = true)]
    server: String,

    /// Request timeout in seconds (0 disables it)
    #[arg(long, env = "PDFDESK_TIMEOUT_SECS", default_value = "120", global = true)]
    timeout_secs: u64,

    /// Directory results are written to
    #[arg(short, long, default_value = ".", global = true)]
    out_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Page count and metadata of a PDF
    Info { file: PathBuf },

    /// Compress one or more PDFs (several files come back as a ZIP)
    Compress {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// less, recommended or extreme
        #[arg(short, long, default_value = "recommended")]
        level: CompressionLevel,

        /// name-asc, name-desc, size-asc or size-desc
        #[arg(long)]
        sort: Option<SortOrder>,
    },

    /// Merge PDFs into one
    Merge {
        #[arg(num_args = 2.., required = true)]
        files: Vec<PathBuf>,

        /// asc, desc or original
        #[arg(long, default_value = "original")]
        order: MergeSort,

        /// Rotate the file at this 1-based position a quarter turn; repeat to turn further
        #[arg(long, value_name = "POSITION")]
        rotate: Vec<usize>,
    },

    /// Split a PDF by page ranges or into single pages
    Split {
        file: PathBuf,

        /// Page range such as 2-5; repeat for several output PDFs
        #[arg(long = "range", value_name = "START-END", value_parser = parse_range_pair)]
        ranges: Vec<(i64, i64)>,

        /// Pages to extract, e.g. "1-3, 5, 8"
        #[arg(long, conflicts_with = "ranges")]
        pages: Option<String>,

        /// Also include one PDF with all extracted pages
        #[arg(long)]
        merged: bool,

        /// Return a single PDF instead of an archive
        #[arg(long)]
        single: bool,
    },

    /// Show the server's page previews
    Previews {
        file: PathBuf,

        /// Write each preview as page_N.png
        #[arg(long)]
        save: bool,
    },

    /// Detect blank pages
    Blanks {
        file: PathBuf,

        /// Send the detected pages to the server for removal
        #[arg(long)]
        remove: bool,
    },

    /// Add text, freehand lines and images, then save the edited PDF
    Annotate {
        file: PathBuf,

        /// PAGE:X,Y:TEXT in page image pixels
        #[arg(long = "text", value_parser = parse_text_spec)]
        texts: Vec<TextSpec>,

        /// PAGE:X,Y;X,Y;... in page image pixels
        #[arg(long = "line", value_parser = parse_line_spec)]
        lines: Vec<LineSpec>,

        /// PAGE:X,Y:PATH[:WxH] places a PNG; without a size it is fitted into 200x200
        #[arg(long = "image", value_parser = parse_image_spec)]
        images: Vec<ImageSpec>,

        #[arg(long, default_value = "#000000")]
        color: String,

        /// Brush size in pixels
        #[arg(long, default_value = "5")]
        size: f64,

        /// Brush opacity, 0 to 1
        #[arg(long, default_value = "1")]
        opacity: f64,

        #[arg(long, default_value = "16")]
        font_size: f64,

        #[arg(long, default_value = "Arial")]
        font_family: String,

        /// Also write this page, with its strokes, as a PNG
        #[arg(long, value_name = "PAGE")]
        page_image: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let timeout = (args.timeout_secs > 0).then(|| Duration::from_secs(args.timeout_secs));
    let client = ApiClient::with_timeout(&args.server, timeout)?;
    debug!("Using server {}", client.base_url());

    let ctx = Context {
        client,
        out_dir: args.out_dir,
    };

    match args.command {
        Command::Info { file } => commands::info(&ctx, &file).await,
        Command::Compress { files, level, sort } => {
            commands::compress(&ctx, &files, level, sort).await
        }
        Command::Merge {
            files,
            order,
            rotate,
        } => commands::merge(&ctx, &files, order, &rotate).await,
        Command::Split {
            file,
            ranges,
            pages,
            merged,
            single,
        } => {
            let split = SplitArgs {
                ranges,
                pages,
                merged,
                single,
            };
            commands::split(&ctx, &file, &split).await
        }
        Command::Previews { file, save } => commands::previews(&ctx, &file, save).await,
        Command::Blanks { file, remove } => commands::blanks(&ctx, &file, remove).await,
        Command::Annotate {
            file,
            texts,
            lines,
            images,
            color,
            size,
            opacity,
            font_size,
            font_family,
            page_image,
        } => {
            let annotate = AnnotateArgs {
                texts,
                lines,
                images,
                brush: BrushStyle {
                    color: color.clone(),
                    size,
                    opacity: opacity.clamp(0.0, 1.0),
                },
                text_style: TextStyle {
                    font_size,
                    font_family,
                    color,
                },
                page_image,
            };
            commands::annotate(&ctx, &file, &annotate).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pdfdesk_core::parse_ranges;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_split_ranges() {
        let args = Args::try_parse_from([
            "pdfdesk", "split", "doc.pdf", "--range", "1-3", "--range", "5-6", "--merged",
        ])
        .unwrap();
        match args.command {
            Command::Split { ranges, merged, .. } => {
                assert_eq!(ranges, vec![(1, 3), (5, 6)]);
                assert!(merged);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_ranges_and_pages_conflict() {
        let result = Args::try_parse_from([
            "pdfdesk", "split", "doc.pdf", "--range", "1-3", "--pages", "2,4",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_pages_accept_range_syntax() {
        let args =
            Args::try_parse_from(["pdfdesk", "split", "doc.pdf", "--pages", "1-3, 5"]).unwrap();
        match args.command {
            Command::Split { pages, .. } => {
                let pages = parse_ranges(pages.as_deref().unwrap(), 10).unwrap();
                assert_eq!(pages, vec![1, 2, 3, 5]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_merge_needs_two_files() {
        assert!(Args::try_parse_from(["pdfdesk", "merge", "one.pdf"]).is_err());
        let args =
            Args::try_parse_from(["pdfdesk", "merge", "a.pdf", "b.pdf", "--rotate", "2"]).unwrap();
        match args.command {
            Command::Merge { rotate, order, .. } => {
                assert_eq!(rotate, vec![2]);
                assert_eq!(order, MergeSort::Original);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_compress_level_parse() {
        let args =
            Args::try_parse_from(["pdfdesk", "compress", "a.pdf", "-l", "extreme"]).unwrap();
        match args.command {
            Command::Compress { level, sort, .. } => {
                assert_eq!(level, CompressionLevel::Extreme);
                assert_eq!(sort, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Args::try_parse_from(["pdfdesk", "compress", "a.pdf", "-l", "max"]).is_err());
    }

    #[test]
    fn test_annotate_accepts_images() {
        let args = Args::try_parse_from([
            "pdfdesk",
            "annotate",
            "doc.pdf",
            "--image",
            "1:10,20:logo.png:50x25",
        ])
        .unwrap();
        match args.command {
            Command::Annotate { images, .. } => {
                assert_eq!(images.len(), 1);
                assert_eq!(images[0].size, Some((50.0, 25.0)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
