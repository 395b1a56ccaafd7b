use crate::domain::models::StageRecord;
use serde::Serialize;

/// Whether a smaller or larger value is the better outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Factor {
    Carbon,
    Electricity,
    ManufacturingCost,
    Wastewater,
    NaturalGas,
    TransportCost,
    Quality,
}

impl Factor {
    pub const ALL: [Factor; 7] = [
        Factor::Carbon,
        Factor::Electricity,
        Factor::ManufacturingCost,
        Factor::Wastewater,
        Factor::NaturalGas,
        Factor::TransportCost,
        Factor::Quality,
    ];

    /// Factors whose scope summary is a plain sum.
    pub const ADDITIVE: [Factor; 6] = [
        Factor::Carbon,
        Factor::Electricity,
        Factor::ManufacturingCost,
        Factor::Wastewater,
        Factor::NaturalGas,
        Factor::TransportCost,
    ];

    /// Key used in `totals` summaries.
    pub fn key(self) -> &'static str {
        match self {
            Factor::Carbon => "carbon_kgco2e",
            Factor::Electricity => "electricity_kwh",
            Factor::ManufacturingCost => "manufacturing_cost_per_unit",
            Factor::Wastewater => "wastewater_l",
            Factor::NaturalGas => "naturalGas_nm3",
            Factor::TransportCost => "transport_cost_usd",
            Factor::Quality => "quality_score",
        }
    }

    pub fn from_key(key: &str) -> Option<Factor> {
        match key {
            "manufacturing_cost_per_unit_usd" => Some(Factor::ManufacturingCost),
            "Quality_Score" => Some(Factor::Quality),
            other => Factor::ALL.into_iter().find(|f| f.key() == other),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Factor::Carbon => "CO₂ Emissions",
            Factor::Electricity => "Electricity",
            Factor::ManufacturingCost => "Manufacturing Cost",
            Factor::Wastewater => "Wastewater",
            Factor::NaturalGas => "Natural Gas",
            Factor::TransportCost => "Transport Cost",
            Factor::Quality => "Quality Score",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Factor::Carbon => "kg CO₂e",
            Factor::Electricity => "kWh",
            Factor::ManufacturingCost | Factor::TransportCost => "USD",
            Factor::Wastewater => "L",
            Factor::NaturalGas => "Nm³",
            Factor::Quality => "",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Factor::Quality => Direction::HigherIsBetter,
            _ => Direction::LowerIsBetter,
        }
    }

    /// Decimal places used in the stage table.
    pub fn table_precision(self) -> usize {
        match self {
            Factor::NaturalGas => 3,
            _ => 2,
        }
    }

    pub fn of_stage(self, rec: &StageRecord) -> Option<f64> {
        match self {
            Factor::Carbon => rec.carbon_kgco2e,
            Factor::Electricity => rec.electricity_kwh,
            Factor::ManufacturingCost => rec.manufacturing_cost_per_unit_usd,
            Factor::Wastewater => rec.wastewater_l,
            Factor::NaturalGas => rec.natural_gas_nm3,
            Factor::TransportCost => rec.transport_cost_usd,
            Factor::Quality => rec.quality_score,
        }
    }
}
