//! Service layer containing business logic and side-effect helpers.
//!
//! ## Service map
//! - `aggregate.rs`: stage records -> per-unit/total summaries, totals diffing.
//! - `compare.rs`: conventional vs recycled improvement percentages.
//! - `api.rs`: calculation API client and response validation.
//! - `request.rs`: draft overrides, request validation, fingerprints.
//! - `history.rs`: local calculation history queries and mutations.
//! - `storage.rs`: local state/form/history persistence, in-flight guard, audit log.
//! - `report.rs`: text rendering of results, comparisons and the form.
//! - `output.rs`: JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod aggregate;
pub mod api;
pub mod compare;
pub mod history;
pub mod output;
pub mod report;
pub mod request;
pub mod storage;
