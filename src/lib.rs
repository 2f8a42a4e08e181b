//! geoload — batch geocoding loader with a persistent SQLite cache.
//!
//! Reads place names from a text file, fetches geodata for each from a
//! remote JSON API, and stores the raw response body in a local
//! `Locations` table. Addresses already in the table are skipped without
//! a network call, so re-running over the same input is cheap.

pub mod geocode;
pub mod loader;
pub mod store;
pub mod types;

pub use geocode::{check_geodata, GeocodeClient, GeocodeService, GeodataVerdict};
pub use loader::{Loader, RunSummary};
pub use store::LocationStore;
pub use types::{GeoloadError, LineOutcome};
