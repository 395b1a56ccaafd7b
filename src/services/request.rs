use crate::domain::form::{FormAction, FormError, FormState};
use crate::domain::models::{CalculationRequest, Product};
use sha2::{Digest, Sha256};

/// Applies command-line `PATH=VALUE` overrides on top of the saved draft.
pub fn apply_overrides(form: FormState, overrides: &[String]) -> Result<FormState, FormError> {
    overrides.iter().try_fold(form, |acc, raw| {
        let action = FormAction::parse_override(raw)?;
        acc.apply(&action)
    })
}

pub fn build_request(form: &FormState) -> Result<CalculationRequest, FormError> {
    let req = form.to_request();
    validate_request(&req)?;
    Ok(req)
}

/// Mirrors the service's own input constraints so bad drafts fail before any I/O.
pub fn validate_request(req: &CalculationRequest) -> Result<(), FormError> {
    if req.units < 1 {
        return Err(FormError::Invalid("units must be at least 1".to_string()));
    }
    let dims = [
        ("outer_radius_m", req.outer_radius_m),
        ("inner_radius_m", req.inner_radius_m),
        ("length_m", req.length_m),
        ("thickness_m", req.thickness_m),
        ("width_m", req.width_m),
        ("sheet_length_m", req.sheet_length_m),
    ];
    if let Some((name, _)) = dims.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
        return Err(FormError::Invalid(format!("{} must be a non-negative number", name)));
    }
    match req.product {
        Product::Pipe => {
            if req.outer_radius_m <= 0.0 || req.length_m <= 0.0 {
                return Err(FormError::Invalid(
                    "pipe needs a positive outer_radius_m and length_m".to_string(),
                ));
            }
            if req.inner_radius_m >= req.outer_radius_m {
                return Err(FormError::Invalid(
                    "inner_radius_m must be smaller than outer_radius_m".to_string(),
                ));
            }
        }
        Product::Sheet => {
            if req.thickness_m <= 0.0 || req.width_m <= 0.0 || req.sheet_length_m <= 0.0 {
                return Err(FormError::Invalid(
                    "sheet needs positive thickness_m, width_m and sheet_length_m".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// SHA-256 of the serialized payload, used to spot repeated calculations.
pub fn fingerprint(req: &CalculationRequest) -> anyhow::Result<String> {
    let canonical = serde_json::to_vec(req)?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::{apply_overrides, build_request, fingerprint};
    use crate::domain::form::{FormError, FormState};
    use crate::domain::models::Product;

    fn overrides(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_draft_is_a_valid_pipe_request() {
        let req = build_request(&FormState::default()).unwrap();
        assert_eq!(req.product, Product::Pipe);
        assert_eq!(req.units, 10);
    }

    #[test]
    fn zero_units_are_rejected() {
        let form = apply_overrides(FormState::default(), &overrides(&["units=0"])).unwrap();
        assert!(matches!(build_request(&form), Err(FormError::Invalid(_))));
    }

    #[test]
    fn pipe_wall_must_have_thickness() {
        let form = apply_overrides(
            FormState::default(),
            &overrides(&["outer_radius_m=0.04", "inner_radius_m=0.04"]),
        )
        .unwrap();
        assert!(build_request(&form).is_err());
    }

    #[test]
    fn sheet_ignores_pipe_dimensions() {
        let form = apply_overrides(
            FormState::default(),
            &overrides(&["product=sheet", "outer_radius_m=0", "length_m=0"]),
        )
        .unwrap();
        assert!(build_request(&form).is_ok());

        let flat = apply_overrides(form, &overrides(&["thickness_m=0"])).unwrap();
        assert!(build_request(&flat).is_err());
    }

    #[test]
    fn negative_dimensions_are_rejected() {
        let form =
            apply_overrides(FormState::default(), &overrides(&["width_m=-1"])).unwrap();
        assert!(build_request(&form).is_err());
    }

    #[test]
    fn fingerprint_tracks_payload() {
        let a = build_request(&FormState::default()).unwrap();
        let mut b = a.clone();
        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
        b.units = 11;
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
        assert_eq!(fingerprint(&a).unwrap().len(), 64);
    }
}
