//! Plant catalog backend.
//!
//! One canonical implementation of the catalog logic the client screens
//! share:
//! - `filter`: pure filter evaluation over plant records
//! - `pager`: fixed-size pagination
//! - `favorites`: persisted favorites set
//! - `import`: batch import reconciliation (new/duplicate partitioning)
//! - `source`: CSV dataset loading (remote, local, or mock)
//! - `catalog`: the insert/update store seam with an in-memory backend
//! - `api_server`: the axum HTTP layer over all of the above

pub mod api_server;
pub mod assistant;
pub mod catalog;
pub mod error;
pub mod favorites;
pub mod filter;
pub mod import;
pub mod model;
pub mod pager;
pub mod source;

// Re-export commonly used types
pub use api_server::{create_router, AppState};
pub use catalog::{CatalogStore, MemoryCatalog};
pub use error::CatalogError;
pub use favorites::FavoritesStore;
pub use filter::PlantFilters;
pub use import::{DuplicatePolicy, ImportOutcome, ImportProgress, Reconciliation};
pub use model::{NewPlant, PlantRecord};
