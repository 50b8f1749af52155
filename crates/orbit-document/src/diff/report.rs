// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-by-page comparison of two documents and the side-by-side report.

use lopdf::ObjectId;
use orbit_core::{EngineError, PageSize, Rect, ReportConfig, Result};
use tracing::{debug, info, instrument, warn};

use crate::diff::lcs::{DiffResult, diff_lines};
use crate::geometry::Matrix;
use crate::pdf::canvas::{Canvas, Color, TextStyle};
use crate::pdf::clone::PageCopier;
use crate::pdf::fonts::{StandardFont, sanitize_text};
use crate::pdf::handle::DocumentHandle;
use crate::text::layer::{ContentTextLayer, TextLayer};
use crate::text::lines::{Line, group_lines};

/// Gap between the canvas top and the top of the embedded pages.
const HEADER_HEIGHT: f32 = 60.0;
/// Left inset of each half's embedded page.
const SLOT_INSET: f32 = 20.0;
const PAGE_LABEL_SIZE: f32 = 20.0;
const FILE_LABEL_SIZE: f32 = 14.0;
const NO_PAGE_SIZE: f32 = 18.0;

/// Diff of one page index across both documents.
#[derive(Debug, Clone, PartialEq)]
pub struct PageComparison {
    /// Zero-based page index.
    pub page: usize,
    pub in_first: bool,
    pub in_second: bool,
    pub diff: DiffResult,
}

impl PageComparison {
    /// True when one side has no page at this index.
    pub fn is_missing_page(&self) -> bool {
        !(self.in_first && self.in_second)
    }
}

fn page_lines(layer: &dyn TextLayer, index: usize) -> Result<Option<Vec<Line>>> {
    if index >= layer.page_count() {
        return Ok(None);
    }
    Ok(Some(group_lines(layer.page_runs(index)?)))
}

/// One comparison per page index up to the longer document's page count.
/// A side without a page contributes no lines.
pub fn diff_pages(first: &dyn TextLayer, second: &dyn TextLayer) -> Result<Vec<PageComparison>> {
    let pages = first.page_count().max(second.page_count());
    let mut comparisons = Vec::with_capacity(pages);
    for page in 0..pages {
        let a = page_lines(first, page)?;
        let b = page_lines(second, page)?;
        let diff = diff_lines(a.as_deref().unwrap_or(&[]), b.as_deref().unwrap_or(&[]));
        debug!(
            page,
            removed = diff.removed.len(),
            added = diff.added.len(),
            "Page diffed"
        );
        comparisons.push(PageComparison {
            page,
            in_first: a.is_some(),
            in_second: b.is_some(),
            diff,
        });
    }
    Ok(comparisons)
}

/// [`diff_pages`] over two serialized documents.
#[instrument(skip_all, fields(first_len = first.len(), second_len = second.len()))]
pub fn diff_documents(first: &[u8], second: &[u8]) -> Result<Vec<PageComparison>> {
    let first = DocumentHandle::load(first)?;
    let second = DocumentHandle::load(second)?;
    diff_pages(&ContentTextLayer::new(&first), &ContentTextLayer::new(&second))
}

// -- Report -------------------------------------------------------------------

/// A source page embedded in the report, with its placement.
struct Slot {
    form: ObjectId,
    media_box: Rect,
    scale: f32,
    origin: (f32, f32),
}

impl Slot {
    fn place(
        copier: &mut PageCopier<'_>,
        report: &mut DocumentHandle,
        source: &DocumentHandle,
        page: usize,
        base_x: f32,
        config: &ReportConfig,
    ) -> Result<Self> {
        let (form, media_box) =
            copier.copy_page_as_form(report.document_mut(), source.page_id(page)?)?;
        let scale =
            (config.slot_width / media_box.width).min(config.slot_height / media_box.height);
        let bottom = config.canvas_height - HEADER_HEIGHT - media_box.height * scale;
        Ok(Self {
            form,
            media_box,
            scale,
            origin: (base_x, bottom),
        })
    }

    fn placement(&self) -> Matrix {
        Matrix::translate(-self.media_box.x, -self.media_box.y)
            .then(&Matrix::scale(self.scale, self.scale))
            .then(&Matrix::translate(self.origin.0, self.origin.1))
    }

    /// Highlight every run of `lines` mapped into this slot.
    fn highlight(&self, canvas: &mut Canvas, lines: &[Line], color: Color, opacity: f32) {
        for run in lines.iter().flat_map(|line| &line.runs) {
            if !run.has_area() {
                continue;
            }
            let cover = run.cover_box();
            canvas.rect(
                self.origin.0 + (cover.x - self.media_box.x) * self.scale,
                self.origin.1 + (cover.y - self.media_box.y) * self.scale,
                cover.width * self.scale,
                cover.height * self.scale,
                color,
                opacity,
            );
        }
    }
}

fn report_page(
    report: &mut DocumentHandle,
    sources: [(&DocumentHandle, &mut PageCopier<'_>); 2],
    names: [&str; 2],
    comparison: &PageComparison,
    config: &ReportConfig,
) -> Result<()> {
    let (w, h) = (config.canvas_width, config.canvas_height);
    let mut canvas = Canvas::new();
    let [(first, first_copier), (second, second_copier)] = sources;

    // Left half.
    if comparison.in_first {
        let slot = Slot::place(first_copier, report, first, comparison.page, SLOT_INSET, config)?;
        canvas.xobject(slot.form, &slot.placement(), 1.0);
        slot.highlight(&mut canvas, &comparison.diff.removed, Color::RED, config.highlight_opacity);
    } else {
        canvas.text(
            &sanitize_text(&config.no_page_in_first),
            100.0,
            h / 2.0,
            &TextStyle::new(StandardFont::Helvetica, NO_PAGE_SIZE, Color::Gray(0.5)),
        );
    }

    // Right half.
    if comparison.in_second {
        let base_x = w / 2.0 + SLOT_INSET;
        let slot = Slot::place(second_copier, report, second, comparison.page, base_x, config)?;
        canvas.xobject(slot.form, &slot.placement(), 1.0);
        slot.highlight(&mut canvas, &comparison.diff.added, Color::GREEN, config.highlight_opacity);
    } else {
        canvas.text(
            &sanitize_text(&config.no_page_in_second),
            w / 2.0 + 100.0,
            h / 2.0,
            &TextStyle::new(StandardFont::Helvetica, NO_PAGE_SIZE, Color::Gray(0.5)),
        );
    }

    canvas.line((w / 2.0, h - 20.0), (w / 2.0, 20.0), 2.0, Color::Gray(0.8));

    let label = format!("{} {}", config.page_label, comparison.page + 1);
    canvas.text(
        &sanitize_text(&label),
        w / 2.0 - 30.0,
        h - 40.0,
        &TextStyle::new(StandardFont::HelveticaBold, PAGE_LABEL_SIZE, Color::BLACK),
    );
    let file_style = TextStyle::new(StandardFont::HelveticaBold, FILE_LABEL_SIZE, Color::Gray(0.3));
    canvas.text(&sanitize_text(names[0]), 50.0, h - 40.0, &file_style);
    canvas.text(&sanitize_text(names[1]), w / 2.0 + 50.0, h - 40.0, &file_style);

    canvas.into_page(report, PageSize { width: w, height: h })?;
    Ok(())
}

/// Build the comparison report for exactly two `(file name, bytes)` inputs:
/// one landscape page per page index with both source pages side by side,
/// removed lines highlighted on the left and added lines on the right.
#[instrument(skip_all, fields(inputs = files.len()))]
pub fn compare(files: &[(&str, &[u8])], config: &ReportConfig) -> Result<Vec<u8>> {
    let [(first_name, first_bytes), (second_name, second_bytes)] = files else {
        return Err(EngineError::InvalidArgument(format!(
            "compare needs exactly 2 documents, got {}",
            files.len()
        )));
    };
    let first = DocumentHandle::load(first_bytes)?;
    let second = DocumentHandle::load(second_bytes)?;
    let comparisons = diff_pages(&ContentTextLayer::new(&first), &ContentTextLayer::new(&second))?;

    let mut report = DocumentHandle::new();
    let mut first_copier = PageCopier::new(first.document());
    let mut second_copier = PageCopier::new(second.document());
    for comparison in &comparisons {
        report_page(
            &mut report,
            [(&first, &mut first_copier), (&second, &mut second_copier)],
            [*first_name, *second_name],
            comparison,
            config,
        )?;
    }
    if comparisons.is_empty() {
        warn!("Both documents are empty, report has no pages");
    }

    let changed = comparisons
        .iter()
        .filter(|c| !c.diff.is_unchanged() || c.is_missing_page())
        .count();
    info!(pages = comparisons.len(), changed, "Comparison report built");
    report.save()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::objects::{number, page_content};
    use crate::testing::{fixture_pdf, page_labels};
    use lopdf::content::Content;

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|line| line.text.as_str()).collect()
    }

    #[test]
    fn identical_documents_are_unchanged() {
        let doc = fixture_pdf(&["alpha", "beta"]);
        let comparisons = diff_documents(&doc, &doc).unwrap();
        assert_eq!(comparisons.len(), 2);
        assert!(comparisons.iter().all(|c| c.diff.is_unchanged() && !c.is_missing_page()));
    }

    #[test]
    fn changed_word_is_one_removed_and_one_added_line() {
        let comparisons =
            diff_documents(&fixture_pdf(&["alpha"]), &fixture_pdf(&["alphb"])).unwrap();
        assert_eq!(texts(&comparisons[0].diff.removed), vec!["alpha"]);
        assert_eq!(texts(&comparisons[0].diff.added), vec!["alphb"]);
    }

    #[test]
    fn extra_trailing_page_is_flagged() {
        let comparisons =
            diff_documents(&fixture_pdf(&["a"]), &fixture_pdf(&["a", "b"])).unwrap();
        assert_eq!(comparisons.len(), 2);
        assert!(!comparisons[1].in_first);
        assert!(comparisons[1].is_missing_page());
        assert_eq!(texts(&comparisons[1].diff.added), vec!["b"]);
    }

    #[test]
    fn report_has_one_landscape_page_per_index() {
        let a = fixture_pdf(&["one"]);
        let b = fixture_pdf(&["one", "two"]);
        let report = compare(&[("a.pdf", a.as_slice()), ("b.pdf", b.as_slice())], &ReportConfig::default()).unwrap();

        let handle = DocumentHandle::load(&report).unwrap();
        assert_eq!(handle.page_count(), 2);
        let size = handle.page_geometry(0).unwrap().size();
        assert_eq!((size.width, size.height), (1250.0, 900.0));

        let labels = page_labels(&report);
        assert!(labels[1].contains("(No page in File 1)"));
        assert!(labels[1].contains("Page 2"));
    }

    #[test]
    fn highlights_follow_changed_runs_into_their_slots() {
        let config = ReportConfig::default();
        let (a, b) = (fixture_pdf(&["alpha"]), fixture_pdf(&["alphb"]));
        let report = compare(&[("a.pdf", a.as_slice()), ("b.pdf", b.as_slice())], &config).unwrap();

        let handle = DocumentHandle::load(&report).unwrap();
        let page = handle
            .document()
            .get_dictionary(handle.page_id(0).unwrap())
            .unwrap();
        let ops = Content::decode(&page_content(handle.document(), page))
            .unwrap()
            .operations;
        // (fill colour, re operands) per highlight
        let rects: Vec<(Vec<f32>, Vec<f32>)> = ops
            .iter()
            .enumerate()
            .filter(|(_, op)| op.operator == "re")
            .map(|(i, op)| {
                (
                    ops[i - 1].operands.iter().filter_map(number).collect(),
                    op.operands.iter().filter_map(number).collect(),
                )
            })
            .collect();
        assert_eq!(rects.len(), 2);

        // letter fixture pages, label at (72, 700) in 24pt
        let scale = (config.slot_width / 612.0).min(config.slot_height / 792.0);
        let bottom = config.canvas_height - HEADER_HEIGHT - 792.0 * scale;
        let expected = |left: f32, text: &str| {
            let width = StandardFont::Helvetica.text_width(text, 24.0);
            vec![
                left + 72.0 * scale,
                bottom + (700.0 - 0.2 * 24.0) * scale,
                width * scale,
                1.2 * 24.0 * scale,
            ]
        };
        let close = |actual: &[f32], wanted: Vec<f32>| {
            actual.len() == 4 && actual.iter().zip(&wanted).all(|(a, w)| (a - w).abs() < 1e-2)
        };

        let (removed_fill, removed_box) = &rects[0];
        assert_eq!(removed_fill, &vec![1.0, 0.0, 0.0]);
        assert!(close(removed_box, expected(SLOT_INSET, "alpha")), "{:?}", removed_box);

        let (added_fill, added_box) = &rects[1];
        assert_eq!(added_fill, &vec![0.0, 1.0, 0.0]);
        let right = config.canvas_width / 2.0 + SLOT_INSET;
        assert!(close(added_box, expected(right, "alphb")), "{:?}", added_box);
    }

    #[test]
    fn compare_requires_two_inputs() {
        let a = fixture_pdf(&["one"]);
        let err = compare(&[("a.pdf", a.as_slice())], &ReportConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }
}
