use crate::domain::models::{CalculationRequest, StageRecord, StagesResponse, Totals};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),
    #[error("{}", status_text(.status, .body))]
    Status { status: u16, body: String },
    #[error("Invalid data structure received from API")]
    InvalidStructure,
}

fn status_text(status: &u16, body: &str) -> String {
    if body.trim().is_empty() {
        format!("API {}", status)
    } else {
        body.to_string()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

pub struct ApiClient {
    base: String,
    http: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(base: &str, timeout_ms: u64) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn calculate(&self, req: &CalculationRequest) -> Result<StagesResponse, ApiError> {
        let url = self.url("/dashboard/stages");
        debug!(%url, product = ?req.product, route = ?req.route_type, "submitting calculation");
        let resp = self.http.post(&url).json(req).send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        decode_stages_response(&body)
    }

    pub fn health(&self) -> Result<Value, ApiError> {
        let resp = self.http.get(self.url("/health")).send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|_| ApiError::InvalidStructure)
    }
}

/// Decodes a calculation response, refusing bodies without a `stages` array
/// and a `totals` object instead of guessing. Within that shape nothing fails:
/// non-object stage entries are skipped and measurements are coerced.
pub fn decode_stages_response(body: &str) -> Result<StagesResponse, ApiError> {
    let doc: Value = serde_json::from_str(body).map_err(|_| ApiError::InvalidStructure)?;
    let (Some(stages), Some(totals)) = (
        doc.get("stages").and_then(Value::as_array),
        doc.get("totals").and_then(Value::as_object),
    ) else {
        return Err(ApiError::InvalidStructure);
    };

    let records: Vec<StageRecord> = stages
        .iter()
        .filter_map(Value::as_object)
        .map(StageRecord::from_map)
        .collect();
    if records.len() != stages.len() {
        debug!(
            skipped = stages.len() - records.len(),
            "ignoring stage entries that are not objects"
        );
    }

    let extra = |key: &str| doc.get(key).filter(|v| !v.is_null()).cloned();
    Ok(StagesResponse {
        stages: records,
        totals: Totals::from_map(totals),
        baselines_used: extra("baselines_used"),
        data_csv: extra("data_csv"),
    })
}

#[cfg(test)]
mod tests {
    use super::{decode_stages_response, ApiError};
    use serde_json::json;

    #[test]
    fn missing_totals_or_stages_is_invalid_structure() {
        for body in [
            r#"{"stages": []}"#,
            r#"{"totals": {}}"#,
            r#"{"stages": {}, "totals": {}}"#,
            r#"[]"#,
            "not json",
        ] {
            assert!(matches!(
                decode_stages_response(body),
                Err(ApiError::InvalidStructure)
            ));
        }
    }

    #[test]
    fn partial_totals_default_to_zero() {
        let resp = decode_stages_response(
            r#"{"stages": [{"stage": "Extrusion", "scope": "total", "carbon_kgco2e": 3}],
                "totals": {"total": {"carbon_kgco2e": 3}},
                "data_csv": "data/processed/train.csv"}"#,
        )
        .unwrap();
        assert_eq!(resp.stages.len(), 1);
        assert_eq!(resp.totals.total.carbon_kgco2e, 3.0);
        assert_eq!(resp.totals.per_unit.electricity_kwh, 0.0);
        assert_eq!(resp.data_csv, Some(json!("data/processed/train.csv")));
    }

    #[test]
    fn both_quality_spellings_in_one_record_decode() {
        let resp = decode_stages_response(
            &json!({
                "stages": [{
                    "stage": "Casting",
                    "scope": "per_unit",
                    "quality_score": 0.85,
                    "Quality_Score": 0.4,
                    "manufacturing_cost_per_unit_usd": 2.5,
                    "manufacturing_cost_per_unit": 9.0
                }],
                "totals": {"per_unit": {}}
            })
            .to_string(),
        )
        .unwrap();
        assert_eq!(resp.stages[0].quality_score, Some(0.85));
        assert_eq!(resp.stages[0].manufacturing_cost_per_unit_usd, Some(2.5));
    }

    #[test]
    fn both_spellings_in_totals_keep_the_canonical_value() {
        let resp = decode_stages_response(
            &json!({
                "stages": [],
                "totals": {
                    "total": {
                        "quality_score": 0.8,
                        "Quality_Score": 0.1,
                        "manufacturing_cost_per_unit": 40.0,
                        "manufacturing_cost_per_unit_usd": 1.0
                    },
                    "per_unit": {"Quality_Score": 0.7, "manufacturing_cost_per_unit_usd": 4.0}
                }
            })
            .to_string(),
        )
        .unwrap();
        assert_eq!(resp.totals.total.quality_score, 0.8);
        assert_eq!(resp.totals.total.manufacturing_cost_per_unit, 40.0);
        assert_eq!(resp.totals.per_unit.quality_score, 0.7);
        assert_eq!(resp.totals.per_unit.manufacturing_cost_per_unit, 4.0);
    }

    #[test]
    fn extra_keys_of_any_shape_are_kept() {
        let resp = decode_stages_response(
            &json!({
                "stages": [],
                "totals": {},
                "data_csv": 7,
                "baselines_used": ["electricity_kwh"]
            })
            .to_string(),
        )
        .unwrap();
        assert_eq!(resp.data_csv, Some(json!(7)));
        assert_eq!(resp.baselines_used, Some(json!(["electricity_kwh"])));
    }

    #[test]
    fn non_object_stage_entries_are_skipped() {
        let resp = decode_stages_response(
            &json!({
                "stages": [null, 3, "Casting", {"stage": "Rolling", "scope": "total", "carbon_kgco2e": 2}],
                "totals": {"total": "n/a"}
            })
            .to_string(),
        )
        .unwrap();
        assert_eq!(resp.stages.len(), 1);
        assert_eq!(resp.stages[0].stage, "Rolling");
        assert_eq!(resp.totals.total.carbon_kgco2e, 0.0);
    }

    #[test]
    fn status_error_surfaces_body_verbatim() {
        let e = ApiError::Status {
            status: 422,
            body: "units: ensure this value is greater than or equal to 1".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "units: ensure this value is greater than or equal to 1"
        );
        let empty = ApiError::Status {
            status: 502,
            body: String::new(),
        };
        assert_eq!(empty.to_string(), "API 502");
    }
}
