use crate::domain::form::{ResultsTab, Section};
use crate::domain::models::Scope;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "alulca", version, about = "Aluminium LCA dashboard CLI")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        help = "Calculation API base URL (overrides ALULCA_API_BASE and config.toml)"
    )]
    pub api: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calculate the saved draft against the API
    Calc {
        #[arg(long = "set", value_name = "PATH=VALUE", help = "Override a draft field for this run")]
        set: Vec<String>,
        #[arg(long, value_enum, default_value_t = ResultsTab::Overview)]
        tab: ResultsTab,
    },
    /// Compare conventional and recycled routes for the saved draft
    Compare {
        #[arg(long = "set", value_name = "PATH=VALUE", help = "Override a draft field for this run")]
        set: Vec<String>,
        #[arg(long, value_enum, default_value_t = ScopeArg::Total)]
        scope: ScopeArg,
    },
    /// Recompute summaries from a saved API response (`-` reads stdin)
    Aggregate {
        file: PathBuf,
        #[arg(long, default_value_t = false, help = "Fail if the file's totals disagree")]
        verify: bool,
    },
    Form {
        #[command(subcommand)]
        command: FormCommands,
    },
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Check that the calculation API is reachable
    Health,
}

#[derive(Subcommand, Debug)]
pub enum FormCommands {
    Show,
    Set { path: String, value: String },
    Reset,
    Toggle {
        #[arg(value_enum)]
        section: Section,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = ProductFilter::All)]
        product: ProductFilter,
    },
    Show {
        id: u64,
    },
    Remove {
        id: u64,
    },
    Clear,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProductFilter {
    All,
    Pipe,
    Sheet,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ScopeArg {
    Total,
    #[value(name = "per_unit")]
    PerUnit,
}

impl ScopeArg {
    pub fn scope(self) -> Scope {
        match self {
            ScopeArg::Total => Scope::Total,
            ScopeArg::PerUnit => Scope::PerUnit,
        }
    }
}
