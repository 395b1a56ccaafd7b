use crate::cli::ProductFilter;
use crate::domain::models::{CalculationRequest, History, HistoryEntry, State, Totals};
use crate::services::request::fingerprint;
use chrono::{DateTime, SecondsFormat, Utc};

#[derive(thiserror::Error, Debug)]
pub enum HistoryError {
    #[error("no calculation with id {0}")]
    NotFound(u64),
}

impl ProductFilter {
    fn matches(self, product_label: &str) -> bool {
        let label = product_label.to_ascii_lowercase();
        match self {
            ProductFilter::All => true,
            ProductFilter::Pipe => label.contains("pipe"),
            ProductFilter::Sheet => label.contains("sheet"),
        }
    }
}

impl History {
    pub fn record(
        &mut self,
        req: &CalculationRequest,
        totals: &Totals,
        at: DateTime<Utc>,
    ) -> anyhow::Result<HistoryEntry> {
        self.next_id += 1;
        let entry = HistoryEntry {
            id: self.next_id,
            product: req.product.label().to_string(),
            route: req.route_type.label().to_string(),
            energy: req.energy_source.label().to_string(),
            units: req.units,
            co2: totals.total.carbon_kgco2e,
            cost: totals.total.manufacturing_cost_per_unit,
            date: at.to_rfc3339_opts(SecondsFormat::Secs, true),
            fingerprint: fingerprint(req)?,
        };
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Records only when `token` is still the latest one handed out, so a
    /// response that a newer submission overtook never lands in history.
    pub fn record_current(
        &mut self,
        token: u64,
        state: &State,
        req: &CalculationRequest,
        totals: &Totals,
        at: DateTime<Utc>,
    ) -> anyhow::Result<Option<HistoryEntry>> {
        if state.last_token != token {
            return Ok(None);
        }
        self.record(req, totals, at).map(Some)
    }

    /// Newest first. `search` matches product or route, case-insensitively;
    /// both the search and the product filter must hold.
    pub fn filter(&self, search: &str, product: ProductFilter) -> Vec<&HistoryEntry> {
        let needle = search.trim().to_lowercase();
        self.entries
            .iter()
            .rev()
            .filter(|e| {
                needle.is_empty()
                    || e.product.to_lowercase().contains(&needle)
                    || e.route.to_lowercase().contains(&needle)
            })
            .filter(|e| product.matches(&e.product))
            .collect()
    }

    pub fn get(&self, id: u64) -> Result<&HistoryEntry, HistoryError> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or(HistoryError::NotFound(id))
    }

    pub fn remove(&mut self, id: u64) -> Result<HistoryEntry, HistoryError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(HistoryError::NotFound(id))?;
        Ok(self.entries.remove(idx))
    }

    pub fn clear(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }
}
