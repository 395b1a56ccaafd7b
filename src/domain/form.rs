//! Draft calculation form.
//!
//! The form is one immutable value. Every edit goes through
//! [`FormState::apply`], which returns a new state or an error and never
//! leaves a half-updated form behind. Fields are addressed by dot paths that
//! mirror the serialized shape (`dimensions.pipe.outer_radius_m`).

use crate::domain::models::{
    BauxiteGrade, CalculationRequest, EnergySource, EolOption, Product, RouteType,
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FormError {
    #[error("unknown form field: {0}")]
    UnknownField(String),
    #[error("form field {0} is a group, not a value")]
    NotALeaf(String),
    #[error("invalid value for {path}: {value:?}")]
    InvalidValue { path: String, value: String },
    #[error("override must look like PATH=VALUE: {0}")]
    MalformedOverride(String),
    #[error("invalid request: {0}")]
    Invalid(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Basic,
    Dimensions,
    Advanced,
}

/// Which block of a calculation result gets rendered in text mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ResultsTab {
    #[default]
    Overview,
    Stages,
    Factors,
    Recommendations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeDims {
    pub outer_radius_m: f64,
    pub inner_radius_m: f64,
    pub length_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetDims {
    pub thickness_m: f64,
    pub width_m: f64,
    pub length_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub pipe: PipeDims,
    pub sheet: SheetDims,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sections {
    pub basic: bool,
    pub dimensions: bool,
    pub advanced: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    pub product: Product,
    pub units: u32,
    pub route_type: RouteType,
    pub bauxite_grade: BauxiteGrade,
    pub energy_source: EnergySource,
    pub eol_option: EolOption,
    pub dimensions: Dimensions,
    pub sections: Sections,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            product: Product::Pipe,
            units: 10,
            route_type: RouteType::Conventional,
            bauxite_grade: BauxiteGrade::Medium,
            energy_source: EnergySource::Renewable,
            eol_option: EolOption::Recycle,
            dimensions: Dimensions {
                pipe: PipeDims {
                    outer_radius_m: 0.05,
                    inner_radius_m: 0.045,
                    length_m: 2.0,
                },
                sheet: SheetDims {
                    thickness_m: 0.004,
                    width_m: 1.2,
                    length_m: 2.5,
                },
            },
            sections: Sections {
                basic: true,
                dimensions: true,
                advanced: false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    SetField { path: String, value: String },
    ToggleSection(Section),
    Reset,
}

impl FormAction {
    /// Parses a `PATH=VALUE` override as given on the command line.
    pub fn parse_override(raw: &str) -> Result<FormAction, FormError> {
        match raw.split_once('=') {
            Some((path, value)) if !path.trim().is_empty() => Ok(FormAction::SetField {
                path: path.trim().to_string(),
                value: value.to_string(),
            }),
            _ => Err(FormError::MalformedOverride(raw.to_string())),
        }
    }
}

/// Flat request field names accepted in place of their nested paths.
const FIELD_ALIASES: &[(&str, &str)] = &[
    ("outer_radius_m", "dimensions.pipe.outer_radius_m"),
    ("inner_radius_m", "dimensions.pipe.inner_radius_m"),
    ("length_m", "dimensions.pipe.length_m"),
    ("thickness_m", "dimensions.sheet.thickness_m"),
    ("width_m", "dimensions.sheet.width_m"),
    ("sheet_length_m", "dimensions.sheet.length_m"),
];

pub fn canonical_path(path: &str) -> &str {
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == path)
        .map(|(_, full)| *full)
        .unwrap_or(path)
}

impl FormState {
    pub fn apply(&self, action: &FormAction) -> Result<FormState, FormError> {
        match action {
            FormAction::SetField { path, value } => self.set_field(path, value),
            FormAction::ToggleSection(section) => {
                let mut next = self.clone();
                let flag = match section {
                    Section::Basic => &mut next.sections.basic,
                    Section::Dimensions => &mut next.sections.dimensions,
                    Section::Advanced => &mut next.sections.advanced,
                };
                *flag = !*flag;
                Ok(next)
            }
            FormAction::Reset => Ok(FormState::default()),
        }
    }

    pub fn is_expanded(&self, section: Section) -> bool {
        match section {
            Section::Basic => self.sections.basic,
            Section::Dimensions => self.sections.dimensions,
            Section::Advanced => self.sections.advanced,
        }
    }

    fn set_field(&self, path: &str, value: &str) -> Result<FormState, FormError> {
        let path = canonical_path(path.trim());
        let invalid = || FormError::InvalidValue {
            path: path.to_string(),
            value: value.to_string(),
        };

        let mut doc = serde_json::to_value(self).map_err(|e| FormError::Invalid(e.to_string()))?;
        let pointer = format!("/{}", path.replace('.', "/"));
        let slot = doc
            .pointer_mut(&pointer)
            .ok_or_else(|| FormError::UnknownField(path.to_string()))?;

        let raw = value.trim();
        let next = match slot {
            Value::Object(_) | Value::Array(_) => return Err(FormError::NotALeaf(path.to_string())),
            Value::Bool(_) => Value::Bool(raw.parse::<bool>().map_err(|_| invalid())?),
            Value::Number(n) if n.is_u64() => Value::from(raw.parse::<u64>().map_err(|_| invalid())?),
            Value::Number(_) => {
                let x = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|x| x.is_finite())
                    .ok_or_else(invalid)?;
                serde_json::Number::from_f64(x)
                    .map(Value::Number)
                    .ok_or_else(invalid)?
            }
            _ => Value::String(raw.to_string()),
        };
        *slot = next;

        serde_json::from_value(doc).map_err(|_| invalid())
    }

    /// Request payload for this draft; grade is only meaningful for the
    /// conventional route and is sent as `na` otherwise.
    pub fn to_request(&self) -> CalculationRequest {
        let bauxite_grade = match self.route_type {
            RouteType::Conventional => self.bauxite_grade,
            RouteType::Recycle => BauxiteGrade::Na,
        };
        CalculationRequest {
            product: self.product,
            units: self.units,
            route_type: self.route_type,
            bauxite_grade,
            energy_source: self.energy_source,
            eol_option: self.eol_option,
            outer_radius_m: self.dimensions.pipe.outer_radius_m,
            inner_radius_m: self.dimensions.pipe.inner_radius_m,
            length_m: self.dimensions.pipe.length_m,
            thickness_m: self.dimensions.sheet.thickness_m,
            width_m: self.dimensions.sheet.width_m,
            sheet_length_m: self.dimensions.sheet.length_m,
        }
    }
}
