//! Shared data model layer (structs/enums only).
//!
//! ## Purpose
//! - Keep wire DTOs (request payload, stage records, totals) in one place.
//! - Keep the factor catalogue and the form state next to the types they describe.
//! - Make JSON output schema changes explicit and reviewable.
//!
//! ## Files
//! - `models.rs`: request/response/report structs and the choice enums.
//! - `factors.rs`: factor keys, labels, units and better-direction.
//! - `form.rs`: draft form state and its reducer-style transitions.
//! - `lenient.rs`: decoding helpers that coerce malformed measurements.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/network side effects.
//!
//! ## Compatibility note
//! Changes in these structs can affect `--json` outputs and integration contracts.
//! Keep schema-impacting changes explicit and synchronized with `docs/contracts/*`.

pub mod factors;
pub mod form;
pub mod lenient;
pub mod models;
