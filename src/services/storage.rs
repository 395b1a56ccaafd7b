use crate::domain::form::FormState;
use crate::domain::models::{History, State};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum SubmitError {
    #[error("a calculation is already in flight (remove {0} if it is stale)")]
    InFlight(String),
}

pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home).join(".config").join("alulca"))
}

pub fn audit(action: &str, data: serde_json::Value) {
    let path = match config_dir() {
        Ok(dir) => dir.join("audit.jsonl"),
        Err(_) => return,
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let event = serde_json::json!({
        "ts": chrono::Utc::now().to_rfc3339(),
        "action": action,
        "data": data
    });
    let line = format!("{}\n", event);
    let _ = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut f| f.write_all(line.as_bytes()));
}

fn load_json<T: DeserializeOwned + Default>(path: &Path) -> anyhow::Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn state_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("state.json"))
}

fn form_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("form.json"))
}

fn history_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("history.json"))
}

pub fn inflight_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("inflight.lock"))
}

pub fn load_state() -> anyhow::Result<State> {
    load_json(&state_path()?)
}

pub fn save_state(s: &State) -> anyhow::Result<()> {
    save_json(&state_path()?, s)
}

pub fn load_form() -> anyhow::Result<FormState> {
    load_json(&form_path()?)
}

pub fn save_form(form: &FormState) -> anyhow::Result<()> {
    save_json(&form_path()?, form)
}

pub fn load_history() -> anyhow::Result<History> {
    load_json(&history_path()?)
}

pub fn save_history(h: &History) -> anyhow::Result<()> {
    save_json(&history_path()?, h)
}

/// Hands out the next request token and records it as the latest.
pub fn issue_token() -> anyhow::Result<u64> {
    let mut state = load_state()?;
    state.last_token += 1;
    save_state(&state)?;
    Ok(state.last_token)
}

/// A response may only be recorded if no newer submission has been issued.
pub fn is_current(token: u64) -> anyhow::Result<bool> {
    Ok(load_state()?.last_token == token)
}

/// Marker file held for the duration of one submission.
pub struct InFlightGuard {
    path: PathBuf,
}

impl InFlightGuard {
    pub fn acquire() -> anyhow::Result<Self> {
        Self::acquire_at(inflight_path()?)
    }

    fn acquire_at(path: PathBuf) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(mut f) => {
                writeln!(f, "{}", std::process::id())?;
                Ok(Self { path })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(SubmitError::InFlight(path.to_string_lossy().to_string()).into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
