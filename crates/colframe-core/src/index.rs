//! Pure selector-normalization helpers (the index resolver).
//!
//! These helpers are intentionally independent of columns and tables. They
//! define a stable, documented mapping from heterogeneous row selectors
//! (single indices, index lists, open/closed/negative ranges, `{start, len}`
//! spans) to bounds-checked absolute positions:
//!
//! - Negative positions count from the end: `-1` is the last element.
//! - Ranges are expanded in order and clipped at the end of the sequence;
//!   the *start* of a range or span must itself be in range.
//! - Duplicates across selectors are preserved, except in
//!   [`resolve_unique_sorted`], which deduplicates and sorts for row-set
//!   identity comparisons.
//! - An empty selector list is always in range and resolves to nothing.

use snafu::ensure;

use crate::error::{IndexOutOfRangeSnafu, RangeBoundsSnafu, Result};

/// A possibly open-ended, possibly negative row range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSelector {
    /// Start bound; `None` means open at the front.
    pub start: Option<i64>,
    /// End bound; `None` means open at the back.
    pub end: Option<i64>,
    /// Whether the end bound is inclusive.
    pub inclusive: bool,
}

impl RangeSelector {
    /// Closed inclusive range `start..=end`.
    pub fn closed(start: i64, end: i64) -> Self {
        RangeSelector {
            start: Some(start),
            end: Some(end),
            inclusive: true,
        }
    }

    /// Half-open range `start..end`.
    pub fn half_open(start: i64, end: i64) -> Self {
        RangeSelector {
            start: Some(start),
            end: Some(end),
            inclusive: false,
        }
    }

    /// Open-ended range `start..`.
    pub fn from_start(start: i64) -> Self {
        RangeSelector {
            start: Some(start),
            end: None,
            inclusive: true,
        }
    }

    /// Open-fronted range `..=end`.
    pub fn to_end(end: i64) -> Self {
        RangeSelector {
            start: None,
            end: Some(end),
            inclusive: true,
        }
    }
}

/// One row selector in a heterogeneous selector list.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSelector {
    /// A single (possibly negative) index.
    Index(i64),
    /// An explicit list of (possibly negative) indices.
    Indices(Vec<i64>),
    /// A range of indices.
    Range(RangeSelector),
    /// A `{start, len}` span; `len` may overrun the end of the sequence
    /// but `start` must be in range.
    Span {
        /// First index of the span (possibly negative).
        start: i64,
        /// Number of elements requested.
        len: usize,
    },
}

impl From<i64> for RowSelector {
    fn from(i: i64) -> Self {
        RowSelector::Index(i)
    }
}

impl From<RangeSelector> for RowSelector {
    fn from(r: RangeSelector) -> Self {
        RowSelector::Range(r)
    }
}

/// Resolve one possibly-negative index against `len`.
///
/// Valid inputs lie in `[-len, len - 1]`; negative values count from the
/// end.
pub fn resolve_index(index: i64, len: usize) -> Result<usize> {
    let n = len as i64;
    ensure!(
        index >= -n && index < n,
        IndexOutOfRangeSnafu { index, len }
    );
    Ok(if index < 0 { (n + index) as usize } else { index as usize })
}

/// Resolve an open-ended range to a closed signed `(start, end)` pair.
///
/// An open start resolves to the first position: `0` when the end bound is
/// non-negative, otherwise `-(max(len, |end|))` so the result stays in the
/// end bound's sign domain. An open end resolves symmetrically to the last
/// position: `-1` when the start bound is negative, otherwise
/// `max(len, start) - 1`. A fully open range over an empty sequence cannot
/// be expressed as a closed range and fails.
pub fn normalize_range(range: &RangeSelector, len: usize) -> Result<(i64, i64)> {
    let n = len as i64;

    // Fold the inclusivity flag into the end bound first. An exclusive end
    // of 0 excludes everything and has no closed-inclusive form.
    let end = match (range.end, range.inclusive) {
        (Some(0), false) => {
            return RangeBoundsSnafu {
                start: range.start,
                end: range.end,
                len,
            }
            .fail()
        }
        (Some(e), false) => Some(e - 1),
        (e, true) => e,
        (None, false) => None,
    };

    let start = match range.start {
        Some(s) => s,
        None => match end {
            Some(e) if e < 0 => -(n.max(e.abs())),
            _ => 0,
        },
    };
    let end = match end {
        Some(e) => e,
        None => {
            ensure!(
                len > 0,
                RangeBoundsSnafu {
                    start: range.start,
                    end: range.end,
                    len,
                }
            );
            if start < 0 { -1 } else { n.max(start) - 1 }
        }
    };
    Ok((start, end))
}

/// Expand a range into absolute positions, clipping at the sequence end.
///
/// The resolved start must lie in `[-len, len]` (`len` itself yields an
/// empty expansion, matching slice semantics); positions past the end are
/// clipped rather than rejected.
pub fn expand_range(range: &RangeSelector, len: usize) -> Result<Vec<usize>> {
    let (start, end) = normalize_range(range, len)?;
    let n = len as i64;

    ensure!(
        start >= -n && start <= n,
        IndexOutOfRangeSnafu { index: start, len }
    );
    let abs_start = if start < 0 { (n + start) as usize } else { start as usize };
    let abs_end = if end < 0 { n + end } else { end.min(n - 1) };

    if abs_end < 0 || (abs_start as i64) > abs_end {
        return Ok(Vec::new());
    }
    Ok((abs_start..=abs_end as usize).collect())
}

/// Expand a `{start, len}` span. The start must be in range; the length
/// may overrun and is clipped.
pub fn expand_span(start: i64, span_len: usize, len: usize) -> Result<Vec<usize>> {
    let abs_start = resolve_index(start, len)?;
    let abs_end = (abs_start + span_len).min(len);
    Ok((abs_start..abs_end).collect())
}

/// Resolve a heterogeneous selector list into an ordered absolute index
/// sequence, preserving duplicates across selectors.
pub fn resolve_indices(selectors: &[RowSelector], len: usize) -> Result<Vec<usize>> {
    let mut out = Vec::new();
    for selector in selectors {
        match selector {
            RowSelector::Index(i) => out.push(resolve_index(*i, len)?),
            RowSelector::Indices(list) => {
                for i in list {
                    out.push(resolve_index(*i, len)?);
                }
            }
            RowSelector::Range(r) => out.extend(expand_range(r, len)?),
            RowSelector::Span { start, len: span } => {
                out.extend(expand_span(*start, *span, len)?)
            }
        }
    }
    Ok(out)
}

/// Resolve selectors into a deduplicated, sorted absolute index set.
///
/// Used where the *identity* of the selected row set matters rather than
/// traversal order (for example, row deletion).
pub fn resolve_unique_sorted(selectors: &[RowSelector], len: usize) -> Result<Vec<usize>> {
    let mut out = resolve_indices(selectors, len)?;
    out.sort_unstable();
    out.dedup();
    Ok(out)
}

/// True iff every resolved absolute value lies in `[-size, size - 1]`.
///
/// An empty selector list is always in range.
pub fn in_range(selectors: &[RowSelector], size: usize) -> bool {
    resolve_indices(selectors, size).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_index_resolution_wraps_negatives() {
        assert_eq!(resolve_index(0, 4).unwrap(), 0);
        assert_eq!(resolve_index(-1, 4).unwrap(), 3);
        assert_eq!(resolve_index(-4, 4).unwrap(), 0);
        assert!(resolve_index(4, 4).is_err());
        assert!(resolve_index(-5, 4).is_err());
    }

    #[test]
    fn open_start_resolves_by_end_sign() {
        // (..=2) over 5 -> 0..=2
        assert_eq!(normalize_range(&RangeSelector::to_end(2), 5).unwrap(), (0, 2));
        // (..=-2) over 5 -> -5..=-2
        assert_eq!(
            normalize_range(&RangeSelector::to_end(-2), 5).unwrap(),
            (-5, -2)
        );
        // (..=-9) over 5 -> -9..=-9; start expressed as -(max(5, 9))
        assert_eq!(
            normalize_range(&RangeSelector::to_end(-9), 5).unwrap(),
            (-9, -9)
        );
    }

    #[test]
    fn open_end_resolves_by_start_sign() {
        assert_eq!(
            normalize_range(&RangeSelector::from_start(2), 5).unwrap(),
            (2, 4)
        );
        assert_eq!(
            normalize_range(&RangeSelector::from_start(-3), 5).unwrap(),
            (-3, -1)
        );
    }

    #[test]
    fn fully_open_range_over_empty_sequence_fails() {
        let open = RangeSelector {
            start: None,
            end: None,
            inclusive: true,
        };
        assert_eq!(normalize_range(&open, 3).unwrap(), (0, 2));
        assert!(normalize_range(&open, 0).is_err());
    }

    #[test]
    fn exclusive_zero_end_has_no_closed_form() {
        assert!(normalize_range(&RangeSelector::half_open(0, 0), 5).is_err());
    }

    #[test]
    fn range_expansion_clips_overrun_but_checks_start() {
        assert_eq!(
            expand_range(&RangeSelector::closed(2, 10), 5).unwrap(),
            vec![2, 3, 4]
        );
        assert_eq!(
            expand_range(&RangeSelector::closed(-3, -1), 5).unwrap(),
            vec![2, 3, 4]
        );
        // start == len is an allowed empty slice; past it is not
        assert_eq!(expand_range(&RangeSelector::closed(5, 9), 5).unwrap(), vec![]);
        assert!(expand_range(&RangeSelector::closed(6, 9), 5).is_err());
    }

    #[test]
    fn backwards_range_expands_to_nothing() {
        assert_eq!(expand_range(&RangeSelector::closed(3, 1), 5).unwrap(), vec![]);
    }

    #[test]
    fn span_start_checked_length_clipped() {
        assert_eq!(expand_span(3, 10, 5).unwrap(), vec![3, 4]);
        assert_eq!(expand_span(-2, 1, 5).unwrap(), vec![3]);
        assert!(expand_span(5, 1, 5).is_err());
    }

    #[test]
    fn mixed_selectors_preserve_order_and_duplicates() {
        let sel = vec![
            RowSelector::Index(3),
            RowSelector::Range(RangeSelector::closed(0, 1)),
            RowSelector::Index(0),
            RowSelector::Indices(vec![1, 1]),
        ];
        assert_eq!(resolve_indices(&sel, 4).unwrap(), vec![3, 0, 1, 0, 1, 1]);
        assert_eq!(resolve_unique_sorted(&sel, 4).unwrap(), vec![0, 1, 3]);
    }

    #[test]
    fn empty_selector_list_is_always_in_range() {
        assert!(in_range(&[], 0));
        assert!(in_range(&[], 10));
        assert!(in_range(&[RowSelector::Index(-3)], 3));
        assert!(!in_range(&[RowSelector::Index(3)], 3));
    }
}
