//! Text rendering for calculation results, comparisons and the draft form.

use crate::domain::factors::{Direction, Factor};
use crate::domain::form::{FormState, ResultsTab, Section};
use crate::domain::models::{
    AggregateReport, Product, RouteType, Scope, StageRecord, StagesResponse,
};
use crate::services::compare::ComparisonResult;

/// Rounds to at most `max_dp` decimals, drops trailing zeros and groups
/// thousands (`1234.5` -> `1,234.5`).
pub fn format_measure(v: f64, max_dp: usize) -> String {
    let fixed = format!("{:.*}", max_dp, v);
    let (negative, digits) = match fixed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, fixed.as_str()),
    };
    let (int, frac) = digits.split_once('.').unwrap_or((digits, ""));
    let frac = frac.trim_end_matches('0');

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = frac.is_empty() && int.chars().all(|c| c == '0');
    let sign = if negative && !is_zero { "-" } else { "" };
    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}

fn card(label: &str, value: f64, unit: &str) -> String {
    format!("{}\t{} {}", label, format_measure(value, 2), unit)
        .trim_end()
        .to_string()
}

pub fn summary_cards(resp: &StagesResponse) -> Vec<String> {
    let per = &resp.totals.per_unit;
    let tot = &resp.totals.total;
    vec![
        card("Per-unit Electricity", per.electricity_kwh, "kWh"),
        card("Per-unit CO₂", per.carbon_kgco2e, "kg"),
        card("Per-unit Cost", per.manufacturing_cost_per_unit, "USD"),
        card("Total Electricity", tot.electricity_kwh, "kWh"),
        card("Total CO₂", tot.carbon_kgco2e, "kg"),
        card("Total Cost", tot.manufacturing_cost_per_unit, "USD"),
        card("Total Transport", tot.transport_cost_usd, "USD"),
        card("Total Wastewater", tot.wastewater_l, "L"),
        card("Avg Quality", per.quality_score, ""),
    ]
}

const TABLE_COLUMNS: [Factor; 7] = [
    Factor::Quality,
    Factor::Electricity,
    Factor::Carbon,
    Factor::NaturalGas,
    Factor::Wastewater,
    Factor::ManufacturingCost,
    Factor::TransportCost,
];

pub fn stage_row(rec: &StageRecord) -> String {
    let mut cols = vec![
        rec.stage.clone(),
        rec.scope.as_str().to_string(),
        rec.units.map(|u| u.to_string()).unwrap_or_default(),
    ];
    for factor in TABLE_COLUMNS {
        let v = factor.of_stage(rec).unwrap_or(0.0);
        cols.push(format!("{:.*}", factor.table_precision(), v));
    }
    cols.join("\t")
}

pub fn stage_table(stages: &[StageRecord]) -> Vec<String> {
    let mut header = vec!["stage", "scope", "units"];
    header.extend(TABLE_COLUMNS.iter().map(|f| f.key()));
    let mut out = vec![header.join("\t")];
    out.extend(stages.iter().map(stage_row));
    out
}

/// Per-factor totals with each per-unit stage's share of the per-unit sum.
pub fn factor_breakdown(resp: &StagesResponse) -> Vec<String> {
    let per_unit: Vec<&StageRecord> = resp
        .stages
        .iter()
        .filter(|s| s.scope == Scope::PerUnit)
        .collect();
    let mut out = Vec::new();
    for factor in Factor::ADDITIVE {
        out.push(card(
            factor.label(),
            resp.totals.total.value(factor),
            factor.unit(),
        ));
        let sum = resp.totals.per_unit.value(factor);
        for s in &per_unit {
            let v = factor.of_stage(s).unwrap_or(0.0);
            let share = if sum > 0.0 { v / sum * 100.0 } else { 0.0 };
            out.push(format!("  {}\t{:.1}%", s.stage, share));
        }
    }
    out.push(card(
        Factor::Quality.label(),
        resp.totals.per_unit.quality_score,
        Factor::Quality.unit(),
    ));
    out
}

/// Improvement estimates derived from the batch totals.
pub fn recommendation_lines(resp: &StagesResponse) -> Vec<String> {
    let tot = &resp.totals.total;
    vec![
        "Switch to Renewable Energy".to_string(),
        format!(
            "  Potential savings: {:.2} kg CO₂e",
            tot.carbon_kgco2e * 0.7
        ),
        "Consider Recycled Route".to_string(),
        format!(
            "  Estimated reduction: {:.1} kWh",
            tot.electricity_kwh * 0.5
        ),
        "Optimize End-of-Life".to_string(),
        "  Impact reduction: 15% lower carbon footprint".to_string(),
        "Process Optimization".to_string(),
        format!(
            "  Cost savings: up to ${:.2}",
            tot.manufacturing_cost_per_unit * 0.1
        ),
    ]
}

/// `requested_units` covers services that leave `totals.total.units` out.
pub fn render_results(resp: &StagesResponse, tab: ResultsTab, requested_units: u32) -> Vec<String> {
    let units = resp
        .totals
        .total
        .units
        .unwrap_or_else(|| u64::from(requested_units));
    let mut out = vec![format!(
        "Environmental impact analysis for {} units",
        units
    )];
    match tab {
        ResultsTab::Overview => out.extend(summary_cards(resp)),
        ResultsTab::Stages => out.extend(stage_table(&resp.stages)),
        ResultsTab::Factors => out.extend(factor_breakdown(resp)),
        ResultsTab::Recommendations => out.extend(recommendation_lines(resp)),
    }
    out
}

pub fn render_aggregate(report: &AggregateReport) -> Vec<String> {
    let mut out = vec![format!("{} stage records", report.stage_count)];
    for (name, summary) in [
        ("per_unit", &report.totals.per_unit),
        ("total", &report.totals.total),
    ] {
        match summary.units {
            Some(n) => out.push(format!("{} (per {} units)", name, n)),
            None => out.push(name.to_string()),
        }
        for factor in Factor::ALL {
            out.push(format!(
                "  {}",
                card(factor.label(), summary.value(factor), factor.unit())
            ));
        }
    }
    for m in report.mismatches.iter().flatten() {
        out.push(format!(
            "mismatch\t{}\t{}\tcomputed {}\treported {}",
            m.scope, m.factor, m.computed, m.reported
        ));
    }
    out
}

pub fn render_comparison(result: &ComparisonResult) -> Vec<String> {
    let mut out = vec![format!(
        "Route comparison ({})",
        result.scope.as_str()
    )];
    for (key, cmp) in &result.improvements {
        let factor = Factor::from_key(key);
        let c = result.conventional.get(key).copied().unwrap_or(0.0);
        let r = result.recycled.get(key).copied().unwrap_or(0.0);
        let verdict = if cmp.comparable {
            let pct = cmp.improvement_percent;
            let word = if pct > 0.0 { "lower" } else { "higher" };
            format!("{:.1}% {}", pct.abs(), word)
        } else {
            "not comparable".to_string()
        };
        let note = match factor.map(Factor::direction) {
            Some(Direction::HigherIsBetter) => " (higher is better)",
            _ => "",
        };
        out.push(format!(
            "{}\tconventional {}\trecycled {}\t{}{}",
            factor.map(Factor::label).unwrap_or(key.as_str()),
            format_measure(c, 2),
            format_measure(r, 2),
            verdict,
            note
        ));
    }
    out.extend(recommendations(result));
    out
}

fn recommendations(result: &ComparisonResult) -> Vec<String> {
    let pct = |f: Factor| {
        result
            .improvements
            .get(f.key())
            .filter(|c| c.comparable)
            .map(|c| c.improvement_percent)
    };
    let mut out = Vec::new();
    match pct(Factor::Carbon) {
        Some(p) if p > 0.0 => out.push("Recommended: Recycled Route".to_string()),
        Some(_) => out.push("Recommended: Conventional Route".to_string()),
        None => {}
    }
    let lines = [
        (Factor::Carbon, "lower CO₂ emissions"),
        (Factor::Electricity, "less electricity usage"),
        (Factor::ManufacturingCost, "cost reduction"),
    ];
    for (factor, text) in lines {
        if let Some(p) = pct(factor) {
            out.push(format!("  • {:.1}% {}", p, text));
        }
    }
    if let Some(q) = result.conventional.get(Factor::Quality.key()) {
        out.push(format!(
            "Conventional route quality score: {}",
            format_measure(*q, 2)
        ));
    }
    out
}

/// Draft form grouped by section, showing only the fields that apply.
pub fn render_form(form: &FormState) -> Vec<String> {
    let mut out = Vec::new();
    let mut section = |s: Section, title: &str, fields: Vec<(&str, String)>| {
        if form.is_expanded(s) {
            out.push(format!("▾ {}", title));
            for (k, v) in fields {
                out.push(format!("  {}\t{}", k, v));
            }
        } else {
            out.push(format!("▸ {} (collapsed)", title));
        }
    };

    let mut basic = vec![
        ("product", enum_name(&form.product)),
        ("units", form.units.to_string()),
        ("route_type", enum_name(&form.route_type)),
    ];
    if form.route_type == RouteType::Conventional {
        basic.push(("bauxite_grade", enum_name(&form.bauxite_grade)));
    }
    basic.push(("energy_source", enum_name(&form.energy_source)));
    section(Section::Basic, "Basic Information", basic);

    let dims = match form.product {
        Product::Pipe => {
            let p = &form.dimensions.pipe;
            vec![
                ("dimensions.pipe.outer_radius_m", p.outer_radius_m.to_string()),
                ("dimensions.pipe.inner_radius_m", p.inner_radius_m.to_string()),
                ("dimensions.pipe.length_m", p.length_m.to_string()),
            ]
        }
        Product::Sheet => {
            let s = &form.dimensions.sheet;
            vec![
                ("dimensions.sheet.thickness_m", s.thickness_m.to_string()),
                ("dimensions.sheet.width_m", s.width_m.to_string()),
                ("dimensions.sheet.length_m", s.length_m.to_string()),
            ]
        }
    };
    section(Section::Dimensions, "Dimensions", dims);
    section(
        Section::Advanced,
        "Advanced Options",
        vec![("eol_option", enum_name(&form.eol_option))],
    );
    out
}

fn enum_name<T: serde::Serialize>(v: &T) -> String {
    match serde_json::to_value(v) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}
