// libs/clinic-cell/src/fixtures.rs
//
// The MedDent reference catalog: two clinics, five doctors, eight procedures.
// Used by tests across the workspace and as the CLI fallback catalog.

use shared_models::AppError;

use crate::services::Catalog;

pub const MEDDENT_CATALOG_JSON: &str = include_str!("../data/meddent.json");

pub fn meddent_catalog() -> Result<Catalog, AppError> {
    Catalog::from_json_str(MEDDENT_CATALOG_JSON)
}
