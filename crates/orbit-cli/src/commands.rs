// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommands: read the inputs, run one engine operation, write the result.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use orbit_core::{
    EngineError, ExportFormat, HorizontalAlign, Margins, MetadataFields, PageNumberPosition,
    PageSelection, Position, ProtectionIntent, Result, SignPlacement, VerticalAlign,
    WatermarkContent, WatermarkOptions,
};
use orbit_document::Engine;
use orbit_document::diff::PageComparison;
use serde_json::json;
use tracing::{debug, info};

/// One input document and where the result goes.
#[derive(Args, Debug)]
pub struct InOut {
    /// Input PDF
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Output file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Concatenate documents in the order given
    Merge {
        #[arg(value_name = "FILE", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Extract a page range, or burst every page into a zip archive
    Split {
        #[command(flatten)]
        io: InOut,

        /// Pages to keep, e.g. "1,3-5"; omit to burst into single pages
        #[arg(long)]
        range: Option<String>,
    },

    /// Reorder, drop or duplicate pages
    Organize {
        #[command(flatten)]
        io: InOut,

        /// 1-based source pages in output order, e.g. "3,1,1"
        #[arg(long, value_delimiter = ',', required = true)]
        order: Vec<usize>,
    },

    /// Rotate every page by a multiple of 90 degrees
    Rotate {
        #[command(flatten)]
        io: InOut,

        #[arg(long, allow_hyphen_values = true)]
        degrees: i64,
    },

    /// Shrink the visible area of every page
    Trim {
        #[command(flatten)]
        io: InOut,

        #[arg(long, default_value_t = 0.0)]
        top: f32,
        #[arg(long, default_value_t = 0.0)]
        bottom: f32,
        #[arg(long, default_value_t = 0.0)]
        left: f32,
        #[arg(long, default_value_t = 0.0)]
        right: f32,
    },

    /// Set document information fields
    Metadata {
        #[command(flatten)]
        io: InOut,

        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        /// Comma-separated
        #[arg(long, value_delimiter = ',')]
        keywords: Option<Vec<String>>,
        #[arg(long)]
        creator: Option<String>,
        #[arg(long)]
        producer: Option<String>,
    },

    /// Burn form field appearances into the page content
    Flatten {
        #[command(flatten)]
        io: InOut,
    },

    /// Drop every annotation and the interactive form
    RemoveAnnotations {
        #[command(flatten)]
        io: InOut,
    },

    /// Stamp text or an image on every page
    Watermark {
        #[command(flatten)]
        io: InOut,

        #[arg(long, conflicts_with = "image", required_unless_present = "image")]
        text: Option<String>,

        /// PNG or JPEG image
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,

        /// top-left, center, bottom-right, tiled, ...
        #[arg(long, default_value = "center")]
        position: Position,

        #[arg(long, default_value_t = 0.3)]
        opacity: f32,

        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        rotation: f32,
    },

    /// Number every page
    PageNumbers {
        #[command(flatten)]
        io: InOut,

        #[arg(long, value_enum, default_value = "bottom")]
        position: Band,

        /// Label template with {{current}} and {{total}}
        #[arg(long)]
        format: Option<String>,
    },

    /// Place a signature image
    Sign {
        #[command(flatten)]
        io: InOut,

        /// PNG signature image
        #[arg(long, value_name = "FILE")]
        signature: PathBuf,

        #[arg(long, value_enum, default_value = "right")]
        horizontal: Horizontal,

        #[arg(long, value_enum, default_value = "bottom")]
        vertical: Vertical,

        #[arg(long, value_enum, default_value = "last")]
        pages: Pages,
    },

    /// Extract the text of every page
    Text {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Line-level differences between two documents
    Diff {
        #[arg(value_name = "FIRST")]
        first: PathBuf,

        #[arg(value_name = "SECOND")]
        second: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Side-by-side comparison report with highlighted changes
    Compare {
        #[arg(value_name = "FIRST")]
        first: PathBuf,

        #[arg(value_name = "SECOND")]
        second: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Rebuild the document from lower-resolution page images
    Compress {
        #[command(flatten)]
        io: InOut,
    },

    /// Rebuild the document in shades of grey
    Grayscale {
        #[command(flatten)]
        io: InOut,
    },

    /// Rebuild the document with inverted colours
    Invert {
        #[command(flatten)]
        io: InOut,
    },

    /// Rasterize and attach a visual-lock password
    Protect {
        #[command(flatten)]
        io: InOut,

        #[arg(long)]
        password: String,

        /// Second password that also unlocks (defaults to the user password)
        #[arg(long)]
        owner_password: Option<String>,
    },

    /// Open with a password and write an unlocked copy
    Unlock {
        #[command(flatten)]
        io: InOut,

        #[arg(long)]
        password: String,
    },

    /// Black out matching text and rasterize so it cannot be recovered
    Redact {
        #[command(flatten)]
        io: InOut,

        /// Case-insensitive term; repeat for several
        #[arg(long = "term", value_name = "TEXT")]
        terms: Vec<String>,

        /// Also redact every text run containing a digit
        #[arg(long)]
        numbers: bool,
    },

    /// Recover what can be recovered from a damaged document
    Repair {
        #[command(flatten)]
        io: InOut,

        /// Finish with a rasterized rebuild
        #[arg(long)]
        deep: bool,
    },

    /// Render every page into a zip archive of images
    Images {
        #[command(flatten)]
        io: InOut,

        #[arg(long, value_enum, default_value = "jpeg")]
        format: ImageFormatArg,

        /// Password of a visual-locked input
        #[arg(long)]
        password: Option<String>,
    },

    /// Small JPEG previews of every page
    Thumbnails {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Directory for the previews
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Password of a visual-locked input
        #[arg(long)]
        password: Option<String>,
    },

    /// One page per image
    FromImages {
        #[arg(value_name = "IMAGE", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Make scanned pages searchable
    #[cfg(feature = "ocr")]
    Ocr {
        #[command(flatten)]
        io: InOut,

        /// Directory holding the detection and recognition models
        #[arg(long, value_name = "DIR")]
        models: Option<PathBuf>,

        /// Password of a visual-locked input
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Band {
    Top,
    Bottom,
}

impl From<Band> for PageNumberPosition {
    fn from(band: Band) -> Self {
        match band {
            Band::Top => PageNumberPosition::Top,
            Band::Bottom => PageNumberPosition::Bottom,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Horizontal {
    Left,
    Center,
    Right,
}

impl From<Horizontal> for HorizontalAlign {
    fn from(value: Horizontal) -> Self {
        match value {
            Horizontal::Left => HorizontalAlign::Left,
            Horizontal::Center => HorizontalAlign::Center,
            Horizontal::Right => HorizontalAlign::Right,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Vertical {
    Top,
    Center,
    Bottom,
}

impl From<Vertical> for VerticalAlign {
    fn from(value: Vertical) -> Self {
        match value {
            Vertical::Top => VerticalAlign::Top,
            Vertical::Center => VerticalAlign::Center,
            Vertical::Bottom => VerticalAlign::Bottom,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Pages {
    First,
    Last,
    All,
}

impl From<Pages> for PageSelection {
    fn from(value: Pages) -> Self {
        match value {
            Pages::First => PageSelection::First,
            Pages::Last => PageSelection::Last,
            Pages::All => PageSelection::All,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ImageFormatArg {
    Jpeg,
    Png,
}

impl From<ImageFormatArg> for ExportFormat {
    fn from(value: ImageFormatArg) -> Self {
        match value {
            ImageFormatArg::Jpeg => ExportFormat::Jpeg,
            ImageFormatArg::Png => ExportFormat::Png,
        }
    }
}

// -- I/O ----------------------------------------------------------------------

fn read(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Input read");
    Ok(bytes)
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Output written");
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string())
}

/// Read, transform, write.
fn transform(io: &InOut, op: impl FnOnce(&[u8]) -> Result<Vec<u8>>) -> Result<()> {
    let data = read(&io.input)?;
    let out = op(&data)?;
    write(&io.output, &out)
}

// -- Dispatch -----------------------------------------------------------------

pub fn execute(engine: Engine, command: Command) -> Result<()> {
    match command {
        Command::Merge { inputs, output } => {
            let documents = inputs.iter().map(|path| read(path)).collect::<Result<Vec<_>>>()?;
            let refs: Vec<&[u8]> = documents.iter().map(Vec::as_slice).collect();
            write(&output, &engine.merge(&refs)?)
        }
        Command::Split { io, range } => match range {
            Some(range) => transform(&io, |data| engine.split_range(data, &range)),
            None => {
                let name = file_name(&io.input);
                transform(&io, |data| engine.split_burst(data, &name))
            }
        },
        Command::Organize { io, order } => {
            let indices = order
                .iter()
                .map(|page| {
                    page.checked_sub(1).ok_or_else(|| {
                        EngineError::InvalidArgument("page numbers start at 1".to_string())
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            transform(&io, |data| engine.organize(data, &indices))
        }
        Command::Rotate { io, degrees } => transform(&io, |data| engine.rotate(data, degrees)),
        Command::Trim {
            io,
            top,
            bottom,
            left,
            right,
        } => {
            let margins = Margins {
                top,
                bottom,
                left,
                right,
            };
            transform(&io, |data| engine.trim(data, &margins))
        }
        Command::Metadata {
            io,
            title,
            author,
            subject,
            keywords,
            creator,
            producer,
        } => {
            let fields = MetadataFields {
                title,
                author,
                subject,
                keywords,
                creator,
                producer,
            };
            transform(&io, |data| engine.edit_metadata(data, &fields))
        }
        Command::Flatten { io } => transform(&io, |data| engine.flatten(data)),
        Command::RemoveAnnotations { io } => transform(&io, |data| engine.remove_annotations(data)),
        Command::Watermark {
            io,
            text,
            image,
            position,
            opacity,
            rotation,
        } => {
            let content = match (text, image) {
                (Some(text), _) => WatermarkContent::Text(text),
                (None, Some(path)) => WatermarkContent::Image(read(&path)?),
                (None, None) => {
                    return Err(EngineError::InvalidArgument(
                        "a watermark needs --text or --image".to_string(),
                    ));
                }
            };
            let options = WatermarkOptions {
                position,
                opacity,
                rotation,
            };
            transform(&io, |data| engine.watermark(data, &content, &options))
        }
        Command::PageNumbers {
            io,
            position,
            format,
        } => transform(&io, |data| {
            engine.add_page_numbers(data, position.into(), format.as_deref())
        }),
        Command::Sign {
            io,
            signature,
            horizontal,
            vertical,
            pages,
        } => {
            let png = read(&signature)?;
            let placement = SignPlacement {
                horizontal: horizontal.into(),
                vertical: vertical.into(),
                pages: pages.into(),
            };
            transform(&io, |data| engine.sign(data, &png, &placement))
        }
        Command::Text { input, output } => {
            let text = engine.extract_text(&read(&input)?)?;
            match output {
                Some(path) => write(&path, &text),
                None => {
                    print!("{}", String::from_utf8_lossy(&text));
                    Ok(())
                }
            }
        }
        Command::Diff { first, second, json } => {
            let pages = engine.diff(&read(&first)?, &read(&second)?)?;
            if json {
                println!("{}", diff_json(&pages));
            } else {
                print!("{}", diff_summary(&pages));
            }
            Ok(())
        }
        Command::Compare {
            first,
            second,
            output,
        } => {
            let (first_name, second_name) = (file_name(&first), file_name(&second));
            let (a, b) = (read(&first)?, read(&second)?);
            let report = engine.compare(&[
                (first_name.as_str(), a.as_slice()),
                (second_name.as_str(), b.as_slice()),
            ])?;
            write(&output, &report)
        }
        Command::Compress { io } => transform(&io, |data| engine.compress(data)),
        Command::Grayscale { io } => transform(&io, |data| engine.grayscale(data)),
        Command::Invert { io } => transform(&io, |data| engine.invert(data)),
        Command::Protect {
            io,
            password,
            owner_password,
        } => {
            let mut intent = ProtectionIntent::with_password(password);
            if let Some(owner) = owner_password {
                intent.owner_password = owner;
            }
            transform(&io, |data| engine.protect(data, &intent))
        }
        Command::Unlock { io, password } => transform(&io, |data| engine.unlock(data, &password)),
        Command::Redact { io, terms, numbers } => {
            transform(&io, |data| engine.redact(data, &terms, numbers))
        }
        Command::Repair { io, deep } => transform(&io, |data| {
            let (bytes, stage) = engine.repair(data, deep);
            info!(?stage, "Repair stage reached");
            Ok(bytes)
        }),
        Command::Images { io, format, password } => {
            let name = file_name(&io.input);
            transform(&io, |data| {
                engine.pdf_to_images(data, password.as_deref(), &name, format.into())
            })
        }
        Command::Thumbnails {
            input,
            output,
            password,
        } => {
            let thumbnails = engine.thumbnails(&read(&input)?, password.as_deref())?;
            fs::create_dir_all(&output)?;
            let name = file_name(&input);
            let base = orbit_document::archive::base_name(&name);
            for (index, jpeg) in thumbnails.iter().enumerate() {
                write(&output.join(format!("{}_thumb_{}.jpg", base, index + 1)), jpeg)?;
            }
            Ok(())
        }
        Command::FromImages { inputs, output } => {
            let images = inputs.iter().map(|path| read(path)).collect::<Result<Vec<_>>>()?;
            let refs: Vec<&[u8]> = images.iter().map(Vec::as_slice).collect();
            write(&output, &engine.images_to_pdf(&refs)?)
        }
        #[cfg(feature = "ocr")]
        Command::Ocr {
            io,
            models,
            password,
        } => {
            let config = match models {
                Some(dir) => orbit_document::OcrsConfig::from_dir(dir),
                None => orbit_document::OcrsConfig::default(),
            };
            let engine = engine.with_ocr(orbit_document::OcrsService::new(&config)?);
            transform(&io, |data| engine.ocr_pdf(data, password.as_deref()))
        }
    }
}

// -- Diff output --------------------------------------------------------------

fn diff_json(pages: &[PageComparison]) -> serde_json::Value {
    let pages: Vec<serde_json::Value> = pages
        .iter()
        .map(|page| {
            json!({
                "page": page.page + 1,
                "in_first": page.in_first,
                "in_second": page.in_second,
                "removed": page.diff.removed.iter().map(|line| line.text.as_str()).collect::<Vec<_>>(),
                "added": page.diff.added.iter().map(|line| line.text.as_str()).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "pages": pages })
}

fn diff_summary(pages: &[PageComparison]) -> String {
    let mut out = String::new();
    for page in pages {
        if page.diff.is_unchanged() && !page.is_missing_page() {
            continue;
        }
        let note = match (page.in_first, page.in_second) {
            (true, false) => " (only in first)",
            (false, true) => " (only in second)",
            _ => "",
        };
        out.push_str(&format!("Page {}{}\n", page.page + 1, note));
        for line in &page.diff.removed {
            out.push_str(&format!("- {}\n", line.text));
        }
        for line in &page.diff.added {
            out.push_str(&format!("+ {}\n", line.text));
        }
    }
    if out.is_empty() {
        out.push_str("No differences\n");
    }
    out
}
