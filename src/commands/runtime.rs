use crate::cli::{Cli, Commands};
use crate::config::Settings;
use crate::domain::form::{FormState, ResultsTab};
use crate::domain::models::{
    AggregateReport, CalcReport, CalculationRequest, RouteType, Scope, StagesResponse,
};
use crate::services::aggregate::{aggregate, diff_totals};
use crate::services::api::{decode_stages_response, ApiClient};
use crate::services::compare::compare_summaries;
use crate::services::output::{print_one, print_report};
use crate::services::report::{render_aggregate, render_comparison, render_results};
use crate::services::request::{apply_overrides, build_request};
use crate::services::storage::{
    audit, is_current, issue_token, load_form, load_history, load_state, save_history,
    InFlightGuard,
};
use anyhow::Context;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Relative tolerance when checking service totals against the stage records.
const TOTALS_TOLERANCE: f64 = 1e-6;

pub fn handle_runtime_commands(cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Calc { set, tab } => run_calc(cli, settings, set, *tab)?,
        Commands::Compare { set, scope } => run_compare(cli, settings, set, scope.scope())?,
        Commands::Aggregate { file, verify } => run_aggregate(cli, file, *verify)?,
        Commands::Health => {
            let client = ApiClient::new(&settings.api_base, settings.timeout_ms)?;
            let body = client.health()?;
            print_one(cli.json, body, |b| {
                format!(
                    "status: {}",
                    b.get("status")
                        .and_then(|s| s.as_str())
                        .unwrap_or("unknown")
                )
            })?;
        }
        Commands::Form { .. } | Commands::History { .. } => {}
    }
    Ok(())
}

fn run_calc(
    cli: &Cli,
    settings: &Settings,
    overrides: &[String],
    tab: ResultsTab,
) -> anyhow::Result<()> {
    let form = apply_overrides(load_form()?, overrides)?;
    let request = build_request(&form)?;
    let client = ApiClient::new(&settings.api_base, settings.timeout_ms)?;

    let (response, history_id) = {
        let _guard = InFlightGuard::acquire()?;
        let token = issue_token()?;
        let response = client.calculate(&request)?;
        let history_id = record_if_current(token, &request, &response)?;
        (response, history_id)
    };

    let computed = aggregate(&response.stages);
    let mismatches = diff_totals(&computed, &response.totals, TOTALS_TOLERANCE);
    for m in &mismatches {
        warn!(
            scope = %m.scope,
            factor = %m.factor,
            computed = m.computed,
            reported = m.reported,
            "service totals disagree with stage records"
        );
    }

    let report = CalcReport {
        request,
        response,
        computed,
        mismatches,
        history_id,
    };
    print_report(cli.json, &report, |r| {
        let mut lines = render_results(&r.response, tab, r.request.units);
        if let Some(id) = r.history_id {
            lines.push(format!("saved as history #{}", id));
        }
        lines
    })
}

fn record_if_current(
    token: u64,
    request: &CalculationRequest,
    response: &StagesResponse,
) -> anyhow::Result<Option<u64>> {
    let mut history = load_history()?;
    let Some(entry) =
        history.record_current(token, &load_state()?, request, &response.totals, chrono::Utc::now())?
    else {
        warn!(token, "a newer submission was issued; not recording this response");
        return Ok(None);
    };
    save_history(&history)?;
    info!(id = entry.id, "calculation recorded");
    audit(
        "calc",
        serde_json::json!({
            "id": entry.id,
            "product": entry.product,
            "route": entry.route,
            "fingerprint": entry.fingerprint
        }),
    );
    Ok(Some(entry.id))
}

fn with_route(form: &FormState, route: RouteType) -> anyhow::Result<CalculationRequest> {
    let mut draft = form.clone();
    draft.route_type = route;
    Ok(build_request(&draft)?)
}

fn run_compare(
    cli: &Cli,
    settings: &Settings,
    overrides: &[String],
    scope: Scope,
) -> anyhow::Result<()> {
    let form = apply_overrides(load_form()?, overrides)?;
    let conventional_req = with_route(&form, RouteType::Conventional)?;
    let recycled_req = with_route(&form, RouteType::Recycle)?;
    let client = ApiClient::new(&settings.api_base, settings.timeout_ms)?;

    let (conventional, recycled) = {
        let _guard = InFlightGuard::acquire()?;
        let token = issue_token()?;
        let conventional = client.calculate(&conventional_req)?;
        let recycled = client.calculate(&recycled_req)?;
        if !is_current(token)? {
            warn!(token, "a newer submission was issued during comparison");
        }
        (aggregate(&conventional.stages), aggregate(&recycled.stages))
    };

    let result = compare_summaries(
        scope.clone(),
        &conventional.for_scope(&scope).cloned().unwrap_or_default(),
        &recycled.for_scope(&scope).cloned().unwrap_or_default(),
    );
    audit(
        "compare",
        serde_json::json!({
            "product": conventional_req.product,
            "scope": scope.as_str()
        }),
    );
    print_report(cli.json, &result, render_comparison)
}

fn read_input(file: &Path) -> anyhow::Result<String> {
    if file == Path::new("-") {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        return Ok(body);
    }
    std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))
}

fn run_aggregate(cli: &Cli, file: &Path, verify: bool) -> anyhow::Result<()> {
    let response = decode_stages_response(&read_input(file)?)?;
    let totals = aggregate(&response.stages);
    let mismatches = verify.then(|| diff_totals(&totals, &response.totals, TOTALS_TOLERANCE));
    let report = AggregateReport {
        stage_count: response.stages.len(),
        totals,
        mismatches,
    };
    print_report(cli.json, &report, render_aggregate)?;

    let diverging = report.mismatches.as_ref().map(Vec::len).unwrap_or(0);
    if diverging > 0 {
        anyhow::bail!("{} factor(s) disagree with the totals in {}", diverging, file.display());
    }
    Ok(())
}
