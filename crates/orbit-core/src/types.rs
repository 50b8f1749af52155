// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Orbit document engine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Page dimensions in document units (points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// US Letter, the fallback when a page carries no usable MediaBox.
    pub const LETTER: Self = Self {
        width: 612.0,
        height: 792.0,
    };

    /// ISO A4 in points.
    pub const A4: Self = Self {
        width: 595.28,
        height: 841.89,
    };

    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// An axis-aligned rectangle in document units, origin at bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from a PDF box array `[llx, lly, urx, ury]`, normalising
    /// inverted corners.
    pub fn from_corners(llx: f32, lly: f32, urx: f32, ury: f32) -> Self {
        let (x0, x1) = if llx <= urx { (llx, urx) } else { (urx, llx) };
        let (y0, y1) = if lly <= ury { (lly, ury) } else { (ury, lly) };
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// `[llx, lly, urx, ury]` for writing back into a page dictionary.
    pub fn corners(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// A box with no area cannot be used as a crop box.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Shrink by per-side margins. `None` when the result would be degenerate.
    pub fn trimmed(&self, margins: &Margins) -> Option<Self> {
        let trimmed = Self::new(
            self.x + margins.left,
            self.y + margins.bottom,
            self.width - margins.left - margins.right,
            self.height - margins.top - margins.bottom,
        );
        (!trimmed.is_degenerate()).then_some(trimmed)
    }
}

/// Per-side crop margins in document units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

/// Placement of an overlay on a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    #[default]
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    /// Repeat the overlay on a grid covering the whole page.
    Tiled,
}

impl FromStr for Position {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top-left" => Ok(Self::TopLeft),
            "top-center" => Ok(Self::TopCenter),
            "top-right" => Ok(Self::TopRight),
            "center-left" => Ok(Self::CenterLeft),
            "center" => Ok(Self::Center),
            "center-right" => Ok(Self::CenterRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-center" => Ok(Self::BottomCenter),
            "bottom-right" => Ok(Self::BottomRight),
            "tiled" => Ok(Self::Tiled),
            other => Err(EngineError::InvalidArgument(format!(
                "unknown position '{other}'"
            ))),
        }
    }
}

/// Pixel-level colour transform applied during rasterization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    #[default]
    Identity,
    Grayscale,
    Invert,
    /// Grayscale followed by invert.
    Both,
}

impl ColorMode {
    pub fn from_flags(grayscale: bool, invert: bool) -> Self {
        match (grayscale, invert) {
            (false, false) => Self::Identity,
            (true, false) => Self::Grayscale,
            (false, true) => Self::Invert,
            (true, true) => Self::Both,
        }
    }

    pub fn grayscale(&self) -> bool {
        matches!(self, Self::Grayscale | Self::Both)
    }

    pub fn invert(&self) -> bool {
        matches!(self, Self::Invert | Self::Both)
    }
}

/// Render scale and lossy re-encode quality for rasterization-backed operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Multiplier from document units to pixels.
    pub scale: f32,
    /// Encoder quality in `0.0..=1.0`.
    pub quality: f32,
}

impl RenderSettings {
    pub const fn new(scale: f32, quality: f32) -> Self {
        Self { scale, quality }
    }

    /// Quality mapped onto the JPEG encoder's `1..=100` scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::new(2.0, 0.95)
    }
}

/// Document information fields. `None` leaves the existing value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFields {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub creator: Option<String>,
    pub producer: Option<String>,
}

/// Vertical band for page numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageNumberPosition {
    Top,
    #[default]
    Bottom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HorizontalAlign {
    Left,
    Center,
    #[default]
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerticalAlign {
    Top,
    Center,
    #[default]
    Bottom,
}

/// Which pages an overlay such as a signature lands on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageSelection {
    First,
    #[default]
    Last,
    All,
}

impl PageSelection {
    /// Zero-based page indices selected out of `page_count` pages.
    pub fn indices(&self, page_count: usize) -> Vec<usize> {
        if page_count == 0 {
            return Vec::new();
        }
        match self {
            Self::First => vec![0],
            Self::Last => vec![page_count - 1],
            Self::All => (0..page_count).collect(),
        }
    }
}

/// Where a signature image is placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignPlacement {
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
    pub pages: PageSelection,
}

/// Styling shared by text and image watermarks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WatermarkOptions {
    pub position: Position,
    /// Fill opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Counter-clockwise rotation in degrees.
    pub rotation: f32,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            position: Position::Center,
            opacity: 0.3,
            rotation: 0.0,
        }
    }
}

/// Raster formats accepted for embedded overlay images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// Sniff the format from magic bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// What a watermark draws.
#[derive(Debug, Clone, PartialEq)]
pub enum WatermarkContent {
    Text(String),
    Image(Vec<u8>),
}

/// Permissions recorded alongside a protection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    Print,
    Modify,
    Copy,
    AnnotForms,
}

impl Permission {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Modify => "modify",
            Self::Copy => "copy",
            Self::AnnotForms => "annot-forms",
        }
    }
}

/// Passwords and permissions for a protect request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionIntent {
    pub user_password: String,
    pub owner_password: String,
    pub permissions: Vec<Permission>,
}

impl ProtectionIntent {
    /// Same password for opening and ownership, every permission granted.
    pub fn with_password(password: impl Into<String>) -> Self {
        let password = password.into();
        Self {
            user_password: password.clone(),
            owner_password: password,
            permissions: vec![
                Permission::Print,
                Permission::Modify,
                Permission::Copy,
                Permission::AnnotForms,
            ],
        }
    }
}

/// Image format for page export archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    Jpeg,
    Png,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}
