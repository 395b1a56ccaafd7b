use crate::cli::{Cli, Commands, FormCommands, HistoryCommands};
use crate::domain::form::{FormAction, FormState};
use crate::domain::models::HistoryEntry;
use crate::services::output::{print_one, print_out, print_report};
use crate::services::report::{format_measure, render_form};
use crate::services::storage::{audit, load_form, load_history, save_form, save_history};

fn history_row(e: &HistoryEntry) -> String {
    format!(
        "{}\t{}\t{} Route\t{} Energy\t{} units\t{}\t{} kg CO₂\t${}",
        e.id,
        e.product,
        e.route,
        e.energy,
        e.units,
        e.date,
        format_measure(e.co2, 2),
        format_measure(e.cost, 2)
    )
}

pub fn handle_form_commands(cli: &Cli) -> anyhow::Result<bool> {
    let Commands::Form { command } = &cli.command else {
        return Ok(false);
    };

    let current = load_form()?;
    let action = match command {
        FormCommands::Show => {
            print_report(cli.json, &current, render_form)?;
            return Ok(true);
        }
        FormCommands::Set { path, value } => FormAction::SetField {
            path: path.clone(),
            value: value.clone(),
        },
        FormCommands::Reset => FormAction::Reset,
        FormCommands::Toggle { section } => FormAction::ToggleSection(*section),
    };

    let next: FormState = current.apply(&action)?;
    save_form(&next)?;
    audit("form", serde_json::json!({"action": format!("{:?}", action)}));
    print_report(cli.json, &next, render_form)?;
    Ok(true)
}

pub fn handle_history_commands(cli: &Cli) -> anyhow::Result<bool> {
    let Commands::History { command } = &cli.command else {
        return Ok(false);
    };

    let mut history = load_history()?;
    match command {
        HistoryCommands::List { search, product } => {
            let items: Vec<HistoryEntry> = history
                .filter(search.as_deref().unwrap_or(""), *product)
                .into_iter()
                .cloned()
                .collect();
            if items.is_empty() && !cli.json {
                if search.is_some() || !matches!(product, crate::cli::ProductFilter::All) {
                    println!("no calculations found; try adjusting your search or filter");
                } else {
                    println!("no calculations found; run `alulca calc` to create one");
                }
            }
            print_out(cli.json, &items, history_row)?;
        }
        HistoryCommands::Show { id } => {
            let entry = history.get(*id)?.clone();
            print_one(cli.json, entry, history_row)?;
        }
        HistoryCommands::Remove { id } => {
            let removed = history.remove(*id)?;
            save_history(&history)?;
            audit("history_remove", serde_json::json!({"id": removed.id}));
            print_one(cli.json, removed, |e| format!("removed #{}", e.id))?;
        }
        HistoryCommands::Clear => {
            let n = history.clear();
            save_history(&history)?;
            audit("history_clear", serde_json::json!({"removed": n}));
            print_one(cli.json, n, |n| format!("removed {} entries", n))?;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::history_row;
    use crate::domain::models::HistoryEntry;

    #[test]
    fn history_row_rounds_sums() {
        let e = HistoryEntry {
            id: 3,
            product: "Aluminum Pipe".into(),
            route: "Conventional".into(),
            energy: "Renewable".into(),
            units: 4,
            co2: 12.640000000000002,
            cost: 1231.6000000000001,
            date: "2024-01-12T09:30:00Z".into(),
            fingerprint: String::new(),
        };
        assert_eq!(
            history_row(&e),
            "3\tAluminum Pipe\tConventional Route\tRenewable Energy\t4 units\t2024-01-12T09:30:00Z\t12.64 kg CO₂\t$1,231.6"
        );
    }
}
