// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Redaction: black out matching text runs, then flatten every page to an
// image so the covered text is gone rather than hidden.

use orbit_core::{EngineError, RenderSettings, Result};
use tracing::{debug, info, instrument, warn};

use crate::pdf::canvas::{Canvas, Color};
use crate::pdf::handle::DocumentHandle;
use crate::raster::backend::PageRasterizer;
use crate::raster::pipeline::{RebuildOptions, rebuild};
use crate::text::layer::{ContentTextLayer, TextLayer};
use crate::text::run::TextRun;

/// What a run must contain to be covered.
#[derive(Debug, Clone, Default)]
pub struct RedactionRule {
    /// Lower-cased, trimmed, non-empty search terms.
    terms: Vec<String>,
    redact_numbers: bool,
}

impl RedactionRule {
    pub fn new(terms: &[String], redact_numbers: bool) -> Self {
        let terms = terms
            .iter()
            .map(|term| term.trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();
        Self {
            terms,
            redact_numbers,
        }
    }

    /// A run containing any digit matches the whole run when numbers are
    /// redacted; otherwise any term occurring case-insensitively matches.
    pub fn matches(&self, text: &str) -> bool {
        if self.redact_numbers && text.chars().any(|c| c.is_ascii_digit()) {
            return true;
        }
        if self.terms.is_empty() {
            return false;
        }
        let lowered = text.to_lowercase();
        self.terms.iter().any(|term| lowered.contains(term.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && !self.redact_numbers
    }
}

/// Draw opaque boxes over the matching runs of every page. The text is still
/// present underneath; [`redact`] finishes the job.
pub fn cover_matches(handle: &mut DocumentHandle, rule: &RedactionRule) -> Result<usize> {
    let pages: Vec<Vec<TextRun>> = {
        let layer = ContentTextLayer::new(handle);
        (0..layer.page_count())
            .map(|index| layer.page_runs(index))
            .collect::<Result<_>>()?
    };

    let mut covered = 0;
    for (index, runs) in pages.iter().enumerate() {
        let mut canvas = Canvas::new();
        for run in runs.iter().filter(|run| rule.matches(&run.text)) {
            let cover = run.cover_box();
            canvas.rect(cover.x, cover.y, cover.width, cover.height, Color::BLACK, 1.0);
            covered += 1;
        }
        if !canvas.is_empty() {
            let page_id = handle.page_id(index)?;
            canvas.stamp(handle, page_id)?;
            debug!(page = index, "Matches covered");
        }
    }
    Ok(covered)
}

/// Cover every run matching `terms` (or containing a digit when
/// `redact_numbers` is set) and rasterize the result.
///
/// Rasterization is mandatory: if it fails the call fails, and the covered
/// vector intermediate is never returned.
#[instrument(skip_all, fields(bytes_len = data.len(), terms = terms.len(), redact_numbers = redact_numbers))]
pub fn redact(
    rasterizer: &dyn PageRasterizer,
    data: &[u8],
    terms: &[String],
    redact_numbers: bool,
    settings: RenderSettings,
) -> Result<Vec<u8>> {
    let rule = RedactionRule::new(terms, redact_numbers);
    if rule.is_empty() {
        warn!("No redaction terms given, output is only flattened");
    }

    let mut handle = DocumentHandle::load(data)?;
    let covered = cover_matches(&mut handle, &rule)?;
    let intermediate = handle.save()?;

    let options = RebuildOptions {
        settings,
        ..RebuildOptions::default()
    };
    let rebuilt = rebuild(rasterizer, &intermediate, &options).map_err(|err| {
        EngineError::Rasterizer(format!("redaction could not be finalized: {}", err))
    })?;
    if !rebuilt.skipped.is_empty() {
        warn!(skipped = rebuilt.skipped.len(), "Pages dropped from the redacted output");
    }
    info!(covered, pages = rebuilt.rendered, "Redaction complete");
    rebuilt.handle.save()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRasterizer, fixture_pdf, page_labels, pdf_with_content};

    fn terms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rule_normalises_terms() {
        let rule = RedactionRule::new(&terms(&["  Secret ", "", "   "]), false);
        assert!(rule.matches("TOP SECRET file"));
        assert!(!rule.matches("public"));
    }

    #[test]
    fn digits_flag_the_whole_run() {
        let rule = RedactionRule::new(&[], true);
        assert!(rule.matches("Account: 12345"));
        assert!(!rule.matches("no digits"));
        assert!(!RedactionRule::new(&[], false).matches("12345"));
    }

    #[test]
    fn covering_adds_boxes_only_where_matched() {
        let mut handle = DocumentHandle::load(&fixture_pdf(&["secret", "public"])).unwrap();
        let rule = RedactionRule::new(&terms(&["secret"]), false);
        assert_eq!(cover_matches(&mut handle, &rule).unwrap(), 1);
    }

    #[test]
    fn text_beside_an_inline_image_is_covered() {
        let doc = pdf_with_content(&[
            "BT /F1 24 Tf 72 700 Td (secret) Tj ET q 10 0 0 10 0 0 cm BI /W 1 /H 1 /CS /G /BPC 8 ID a EI Q",
        ]);
        let mut handle = DocumentHandle::load(&doc).unwrap();
        let rule = RedactionRule::new(&terms(&["secret"]), false);
        assert_eq!(cover_matches(&mut handle, &rule).unwrap(), 1);
    }

    #[test]
    fn unreadable_page_text_stops_redaction() {
        let doc = pdf_with_content(&["BT /F1 24 Tf 72 700 Td (secret) Tj ET BI /W 1 ID"]);
        let err = redact(
            &FakeRasterizer::default(),
            &doc,
            &terms(&["secret"]),
            false,
            RenderSettings::new(0.1, 0.9),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Load(_)), "{:?}", err);
    }

    #[test]
    fn output_has_no_extractable_text() {
        let doc = fixture_pdf(&["secret", "public"]);
        let out = redact(
            &FakeRasterizer::default(),
            &doc,
            &terms(&["secret"]),
            false,
            RenderSettings::new(0.1, 0.9),
        )
        .unwrap();
        let labels = page_labels(&out);
        assert_eq!(labels.len(), 2);
        assert!(labels.iter().all(|label| label.is_empty()));
    }

    #[test]
    fn raster_failure_is_a_hard_error() {
        let doc = fixture_pdf(&["secret"]);
        let rasterizer = FakeRasterizer {
            failing_pages: vec![0],
            ..FakeRasterizer::default()
        };
        let err = redact(&rasterizer, &doc, &terms(&["secret"]), false, RenderSettings::new(0.1, 0.9))
            .unwrap_err();
        assert!(matches!(err, EngineError::Rasterizer(_)));
    }
}
