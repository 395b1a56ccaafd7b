//! Conventional-vs-recycled improvement percentages per factor.

use crate::domain::models::{AggregateSummary, Scope};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorComparison {
    pub improvement_percent: f64,
    pub comparable: bool,
}

impl FactorComparison {
    const NOT_COMPARABLE: FactorComparison = FactorComparison {
        improvement_percent: 0.0,
        comparable: false,
    };
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub scope: Scope,
    pub conventional: BTreeMap<String, f64>,
    pub recycled: BTreeMap<String, f64>,
    pub improvements: BTreeMap<String, FactorComparison>,
}

/// Relative reduction going from `conventional` to `recycled`, in percent.
/// Positive means the recycled value is lower. A zero baseline has no
/// defined ratio and is reported as not comparable.
pub fn improvement(conventional: f64, recycled: f64) -> FactorComparison {
    if conventional == 0.0 || !conventional.is_finite() || !recycled.is_finite() {
        return FactorComparison::NOT_COMPARABLE;
    }
    let pct = (conventional - recycled) / conventional * 100.0;
    if !pct.is_finite() {
        return FactorComparison::NOT_COMPARABLE;
    }
    FactorComparison {
        improvement_percent: pct,
        comparable: true,
    }
}

/// Compares every factor named on either side; a factor present on only one
/// side is not comparable.
pub fn compare(
    conventional: &BTreeMap<String, f64>,
    recycled: &BTreeMap<String, f64>,
) -> BTreeMap<String, FactorComparison> {
    conventional
        .keys()
        .chain(recycled.keys())
        .map(|key| {
            let cmp = match (conventional.get(key), recycled.get(key)) {
                (Some(c), Some(r)) => improvement(*c, *r),
                _ => FactorComparison::NOT_COMPARABLE,
            };
            (key.clone(), cmp)
        })
        .collect()
}

pub fn compare_summaries(
    scope: Scope,
    conventional: &AggregateSummary,
    recycled: &AggregateSummary,
) -> ComparisonResult {
    let conventional = conventional.factor_map();
    let recycled = recycled.factor_map();
    let improvements = compare(&conventional, &recycled);
    ComparisonResult {
        scope,
        conventional,
        recycled,
        improvements,
    }
}
