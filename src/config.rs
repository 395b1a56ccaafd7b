use crate::services::storage::config_dir;
use serde::Deserialize;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const API_BASE_ENV: &str = "ALULCA_API_BASE";

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    api_base: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base: String,
    pub timeout_ms: u64,
}

/// `--api` beats `ALULCA_API_BASE`, which beats `config.toml`.
pub fn load_settings(cli_api: Option<&str>) -> anyhow::Result<Settings> {
    let path = config_dir()?.join("config.toml");
    let file = if path.exists() {
        let raw = std::fs::read_to_string(&path)?;
        toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("invalid {}: {}", path.display(), e))?
    } else {
        ConfigFile::default()
    };
    let env = std::env::var(API_BASE_ENV).ok();
    Ok(resolve(file, env, cli_api))
}

fn resolve(file: ConfigFile, env: Option<String>, cli_api: Option<&str>) -> Settings {
    let api_base = cli_api
        .map(str::to_string)
        .or(env.filter(|v| !v.trim().is_empty()))
        .or(file.api_base)
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    Settings {
        api_base,
        timeout_ms: file.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
    }
}
