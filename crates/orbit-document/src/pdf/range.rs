// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page range expressions: comma-separated singles and inclusive `a-b` spans,
// 1-indexed.

use std::collections::BTreeSet;

use orbit_core::{EngineError, Result};

/// Resolve `expression` against a document of `page_count` pages.
///
/// Returns ascending, de-duplicated, 1-based page numbers. Out-of-range
/// numbers are dropped and spans are clamped to `[1, page_count]`; parts that
/// are not numbers, including spans missing a bound (`-3`, `3-`), are ignored. An empty result is an
/// [`EngineError::InvalidRange`].
pub fn parse_page_range(expression: &str, page_count: usize) -> Result<Vec<usize>> {
    let mut pages = BTreeSet::new();

    for part in expression.split(',').map(str::trim) {
        if part.contains('-') {
            let mut bounds = part.split('-').map(|bound| bound.trim().parse::<i64>());
            let (Some(Ok(start)), Some(Ok(end))) = (bounds.next(), bounds.next()) else {
                continue;
            };
            let start = start.max(1);
            let end = end.min(page_count as i64);
            for page in start..=end {
                pages.insert(page as usize);
            }
        } else if let Ok(page) = part.parse::<i64>()
            && page >= 1
            && page <= page_count as i64
        {
            pages.insert(page as usize);
        }
    }

    if pages.is_empty() {
        return Err(EngineError::InvalidRange(format!(
            "'{}' selects no pages of a {} page document",
            expression, page_count
        )));
    }
    Ok(pages.into_iter().collect())
}
