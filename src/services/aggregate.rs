//! Client-side reduction of stage records into per-unit and total summaries.
//!
//! Additive factors are summed over the matching scope partition; the quality
//! score is averaged over the records that actually report it. Records with an
//! unrecognized scope are skipped.

use crate::domain::factors::Factor;
use crate::domain::models::{AggregateSummary, Mismatch, Scope, StageRecord, Totals};

pub fn aggregate(stages: &[StageRecord]) -> Totals {
    Totals {
        per_unit: summarize(stages, &Scope::PerUnit),
        total: summarize(stages, &Scope::Total),
    }
}

pub fn summarize(stages: &[StageRecord], scope: &Scope) -> AggregateSummary {
    let partition: Vec<&StageRecord> = stages.iter().filter(|s| &s.scope == scope).collect();
    let sum = |factor: Factor| {
        partition
            .iter()
            .filter_map(|s| factor.of_stage(s))
            .fold(0.0, |acc, v| acc + v)
    };

    let units = match scope {
        Scope::Total => partition
            .iter()
            .filter_map(|s| s.units)
            .fold(None, |acc: Option<u64>, n| Some(acc.unwrap_or(0).saturating_add(n))),
        Scope::PerUnit if !partition.is_empty() => Some(1),
        _ => None,
    };

    AggregateSummary {
        scope: Some(scope.clone()),
        units,
        electricity_kwh: sum(Factor::Electricity),
        carbon_kgco2e: sum(Factor::Carbon),
        natural_gas_nm3: sum(Factor::NaturalGas),
        wastewater_l: sum(Factor::Wastewater),
        manufacturing_cost_per_unit: sum(Factor::ManufacturingCost),
        transport_cost_usd: sum(Factor::TransportCost),
        quality_score: mean(partition.iter().filter_map(|s| s.quality_score)),
    }
}

/// Arithmetic mean; an empty input averages to 0.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (total, count) = values.fold((0.0, 0usize), |(t, c), v| (t + v, c + 1));
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Factor-by-factor differences between two sets of totals. `units` is not
/// compared: the service reports the batch size, not a sum over stages.
pub fn diff_totals(computed: &Totals, reported: &Totals, rel_tol: f64) -> Vec<Mismatch> {
    let mut out = Vec::new();
    for scope in [Scope::PerUnit, Scope::Total] {
        let (Some(c), Some(r)) = (computed.for_scope(&scope), reported.for_scope(&scope)) else {
            continue;
        };
        for factor in Factor::ALL {
            let (a, b) = (c.value(factor), r.value(factor));
            let scale = a.abs().max(b.abs()).max(1.0);
            if (a - b).abs() > rel_tol * scale {
                out.push(Mismatch {
                    scope: scope.as_str().to_string(),
                    factor: factor.key().to_string(),
                    computed: a,
                    reported: b,
                });
            }
        }
    }
    out
}
