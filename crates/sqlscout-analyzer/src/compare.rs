//! Plan Comparator - before/after view of two execution plans

use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};
use sqlscout_core::PlanRow;

/// One line of a plan comparison; a missing side is an empty string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanComparisonRow {
    pub before: String,
    pub after: String,
}

/// Pairs the `detail` of each plan step by position.
///
/// The result is as long as the longer plan. No attempt is made to align
/// steps that describe the same table.
pub fn compare(before: &[PlanRow], after: &[PlanRow]) -> Vec<PlanComparisonRow> {
    before
        .iter()
        .zip_longest(after)
        .map(|pair| {
            let (before, after) = match pair {
                EitherOrBoth::Both(b, a) => (b.detail.clone(), a.detail.clone()),
                EitherOrBoth::Left(b) => (b.detail.clone(), String::new()),
                EitherOrBoth::Right(a) => (String::new(), a.detail.clone()),
            };
            PlanComparisonRow { before, after }
        })
        .collect()
}
