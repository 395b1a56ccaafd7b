use crate::domain::factors::Factor;
use crate::domain::lenient;
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    Pipe,
    Sheet,
}

impl Product {
    pub fn label(self) -> &'static str {
        match self {
            Product::Pipe => "Aluminum Pipe",
            Product::Sheet => "Aluminum Sheet",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    Conventional,
    Recycle,
}

impl RouteType {
    pub fn label(self) -> &'static str {
        match self {
            RouteType::Conventional => "Conventional",
            RouteType::Recycle => "Recycled",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BauxiteGrade {
    High,
    Medium,
    Low,
    Na,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EnergySource {
    Renewable,
    #[value(name = "non_renewable")]
    NonRenewable,
}

impl EnergySource {
    pub fn label(self) -> &'static str {
        match self {
            EnergySource::Renewable => "Renewable",
            EnergySource::NonRenewable => "Non-renewable",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EolOption {
    Recycle,
    Reuse,
    Landfill,
}

/// Body of `POST /dashboard/stages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub product: Product,
    pub units: u32,
    pub route_type: RouteType,
    pub bauxite_grade: BauxiteGrade,
    pub energy_source: EnergySource,
    pub eol_option: EolOption,
    pub outer_radius_m: f64,
    pub inner_radius_m: f64,
    pub length_m: f64,
    pub thickness_m: f64,
    pub width_m: f64,
    pub sheet_length_m: f64,
}

/// Which aggregate bucket a stage record contributes to.
///
/// Anything the service sends besides `per_unit`/`total` is kept verbatim in
/// `Other` so it still shows in the stage table, but aggregation ignores it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    PerUnit,
    Total,
    Other(String),
}

impl Scope {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "per_unit" => Scope::PerUnit,
            "total" => Scope::Total,
            other => Scope::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Scope::PerUnit => "per_unit",
            Scope::Total => "total",
            Scope::Other(s) => s.as_str(),
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Other(String::new())
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(d)?;
        Ok(Scope::from_wire(&lenient::text(&raw)))
    }
}

/// One measured production stage as returned by the calculation service.
///
/// Measurements are `Option` so "not measured" stays distinguishable from an
/// explicit zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageRecord {
    pub stage: String,
    pub scope: Scope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electricity_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbon_kgco2e: Option<f64>,
    #[serde(rename = "naturalGas_nm3", skip_serializing_if = "Option::is_none")]
    pub natural_gas_nm3: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wastewater_l: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturing_cost_per_unit_usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_cost_usd: Option<f64>,
}

impl StageRecord {
    /// Never fails: unknown keys are ignored and each measurement is coerced
    /// on its own.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            stage: map.get("stage").map(lenient::text).unwrap_or_default(),
            scope: map
                .get("scope")
                .map(|v| Scope::from_wire(&lenient::text(v)))
                .unwrap_or_default(),
            units: map.get("units").and_then(lenient::coerce_count),
            quality_score: lenient::measure(lenient::pick(map, "quality_score", "Quality_Score")),
            electricity_kwh: lenient::measure(map.get("electricity_kwh")),
            carbon_kgco2e: lenient::measure(map.get("carbon_kgco2e")),
            natural_gas_nm3: lenient::measure(map.get("naturalGas_nm3")),
            wastewater_l: lenient::measure(map.get("wastewater_l")),
            manufacturing_cost_per_unit_usd: lenient::measure(lenient::pick(
                map,
                "manufacturing_cost_per_unit_usd",
                "manufacturing_cost_per_unit",
            )),
            transport_cost_usd: lenient::measure(map.get("transport_cost_usd")),
        }
    }
}

impl<'de> Deserialize<'de> for StageRecord {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(d)?;
        Ok(Self::from_map(&map))
    }
}

/// Factor totals for one scope, keyed the way the service's `totals` are.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    pub units: Option<u64>,
    pub electricity_kwh: f64,
    pub carbon_kgco2e: f64,
    #[serde(rename = "naturalGas_nm3")]
    pub natural_gas_nm3: f64,
    pub wastewater_l: f64,
    pub manufacturing_cost_per_unit: f64,
    pub transport_cost_usd: f64,
    pub quality_score: f64,
}

impl<'de> Deserialize<'de> for AggregateSummary {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(d)?;
        Ok(Self::from_map(&map))
    }
}

impl AggregateSummary {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            scope: map
                .get("scope")
                .filter(|v| !v.is_null())
                .map(|v| Scope::from_wire(&lenient::text(v))),
            units: map.get("units").and_then(lenient::coerce_count),
            electricity_kwh: lenient::value(map.get("electricity_kwh")),
            carbon_kgco2e: lenient::value(map.get("carbon_kgco2e")),
            natural_gas_nm3: lenient::value(map.get("naturalGas_nm3")),
            wastewater_l: lenient::value(map.get("wastewater_l")),
            manufacturing_cost_per_unit: lenient::value(lenient::pick(
                map,
                "manufacturing_cost_per_unit",
                "manufacturing_cost_per_unit_usd",
            )),
            transport_cost_usd: lenient::value(map.get("transport_cost_usd")),
            quality_score: lenient::value(lenient::pick(map, "quality_score", "Quality_Score")),
        }
    }

    pub fn value(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Carbon => self.carbon_kgco2e,
            Factor::Electricity => self.electricity_kwh,
            Factor::ManufacturingCost => self.manufacturing_cost_per_unit,
            Factor::Wastewater => self.wastewater_l,
            Factor::NaturalGas => self.natural_gas_nm3,
            Factor::TransportCost => self.transport_cost_usd,
            Factor::Quality => self.quality_score,
        }
    }

    /// The summary as a plain factor-name mapping.
    pub fn factor_map(&self) -> BTreeMap<String, f64> {
        Factor::ALL
            .iter()
            .map(|f| (f.key().to_string(), self.value(*f)))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub per_unit: AggregateSummary,
    pub total: AggregateSummary,
}

impl Totals {
    /// A scope that is missing or not an object reads as all zeros.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let scope = |key: &str| {
            map.get(key)
                .and_then(Value::as_object)
                .map(AggregateSummary::from_map)
                .unwrap_or_default()
        };
        Self {
            per_unit: scope("per_unit"),
            total: scope("total"),
        }
    }

    pub fn for_scope(&self, scope: &Scope) -> Option<&AggregateSummary> {
        match scope {
            Scope::PerUnit => Some(&self.per_unit),
            Scope::Total => Some(&self.total),
            Scope::Other(_) => None,
        }
    }
}

/// Decoded body of a successful `POST /dashboard/stages`.
///
/// Extra keys are carried through untouched, whatever their shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagesResponse {
    pub stages: Vec<StageRecord>,
    pub totals: Totals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baselines_used: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_csv: Option<Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub id: u64,
    pub product: String,
    pub route: String,
    pub energy: String,
    pub units: u32,
    pub co2: f64,
    pub cost: f64,
    pub date: String,
    pub fingerprint: String,
}

#[derive(Serialize, Deserialize, Default, Debug)]
pub struct History {
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct State {
    /// Last request token handed out; only the response carrying it is current.
    #[serde(default)]
    pub last_token: u64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Mismatch {
    pub scope: String,
    pub factor: String,
    pub computed: f64,
    pub reported: f64,
}

#[derive(Serialize)]
pub struct CalcReport {
    pub request: CalculationRequest,
    #[serde(flatten)]
    pub response: StagesResponse,
    pub computed: Totals,
    pub mismatches: Vec<Mismatch>,
    pub history_id: Option<u64>,
}

#[derive(Serialize)]
pub struct AggregateReport {
    pub stage_count: usize,
    pub totals: Totals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mismatches: Option<Vec<Mismatch>>,
}
