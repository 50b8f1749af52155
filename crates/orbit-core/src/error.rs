// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the Orbit engine.

use thiserror::Error;

/// Top-level error type for all Orbit operations.
#[derive(Debug, Error)]
pub enum EngineError {
    // -- Input errors --
    #[error("failed to load document: {0}")]
    Load(String),

    #[error("document is password protected: {0}")]
    Encrypted(String),

    #[error("invalid page range: {0}")]
    InvalidRange(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // -- Per-page pipeline errors --
    #[error("page {page} failed to render: {reason}")]
    PageRender { page: usize, reason: String },

    #[error("page {page} failed to encode: {reason}")]
    Encode { page: usize, reason: String },

    #[error("no page could be rasterized ({attempted} attempted)")]
    NoRenderablePages { attempted: usize },

    // -- Backend errors --
    #[error("rasterizer error: {0}")]
    Rasterizer(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("failed to save document: {0}")]
    Save(String),

    #[error("archive packaging failed: {0}")]
    Archive(String),

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification used by callers to tell bad input apart from
/// unsupported features or backend failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller supplied something the engine cannot work with.
    BadInput,
    /// A backend (rasterizer, OCR, encoder) is missing or failed.
    Unsupported,
    /// Local I/O or serialization failure.
    Internal,
}

impl EngineError {
    /// Classify this error for reporting.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Load(_)
            | Self::Encrypted(_)
            | Self::InvalidRange(_)
            | Self::InvalidArgument(_)
            | Self::NoRenderablePages { .. } => ErrorClass::BadInput,
            Self::PageRender { .. }
            | Self::Encode { .. }
            | Self::Rasterizer(_)
            | Self::Ocr(_)
            | Self::Image(_) => ErrorClass::Unsupported,
            Self::Save(_) | Self::Archive(_) | Self::Io(_) | Self::Serialization(_) => {
                ErrorClass::Internal
            }
        }
    }

    /// Whether the failure is attributable to the caller's input.
    pub fn is_input_error(&self) -> bool {
        self.class() == ErrorClass::BadInput
    }
}

/// Which stage of the per-page pipeline failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageErrorKind {
    Render,
    Encode,
}

/// A failure isolated to a single page. Collected, logged, and reduced at the
/// end of a pipeline; never propagated through the page loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("page {page} ({kind:?}): {reason}")]
pub struct PageError {
    /// Zero-based page index.
    pub page: usize,
    pub kind: PageErrorKind,
    pub reason: String,
}

impl PageError {
    pub fn render(page: usize, reason: impl Into<String>) -> Self {
        Self {
            page,
            kind: PageErrorKind::Render,
            reason: reason.into(),
        }
    }

    pub fn encode(page: usize, reason: impl Into<String>) -> Self {
        Self {
            page,
            kind: PageErrorKind::Encode,
            reason: reason.into(),
        }
    }
}

impl From<PageError> for EngineError {
    fn from(err: PageError) -> Self {
        match err.kind {
            PageErrorKind::Render => Self::PageRender {
                page: err.page,
                reason: err.reason,
            },
            PageErrorKind::Encode => Self::Encode {
                page: err.page,
                reason: err.reason,
            },
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_classified_as_bad_input() {
        assert!(EngineError::InvalidRange("0".into()).is_input_error());
        assert!(EngineError::Encrypted("missing".into()).is_input_error());
        assert!(!EngineError::Rasterizer("no pdfium".into()).is_input_error());
    }

    #[test]
    fn page_error_converts_by_kind() {
        let render: EngineError = PageError::render(3, "boom").into();
        assert!(matches!(render, EngineError::PageRender { page: 3, .. }));

        let encode: EngineError = PageError::encode(1, "jpeg").into();
        assert!(matches!(encode, EngineError::Encode { page: 1, .. }));
    }
}
