#![deny(missing_docs)]
//! Shipyard core library.
//!
//! This crate holds the ship catalog domain: validation, the derived rating,
//! composable filter predicates, sorting and paging, the persistence trait,
//! and the catalog service that ties them together.

pub mod domain;
pub mod error;
pub mod filter;
pub mod paging;
pub mod rating;
pub mod service;
pub mod store;
pub mod validation;

pub use domain::{NewShip, Ship, ShipId, ShipPatch, ShipType, start_of_year};
pub use error::{Result, ShipyardError};
pub use filter::{
    Criterion, Range, ShipFilter, ShipPredicate, filter_by_crew_size, filter_by_name,
    filter_by_planet, filter_by_prod_date, filter_by_rating, filter_by_ship_type, filter_by_speed,
    filter_by_usage,
};
pub use paging::{DEFAULT_PAGE_SIZE, PageParams, PageRequest, SortField, paginate};
pub use rating::{RATING_BASE_YEAR, RATING_SCALE, compute_rating, rate_new_ship, rate_ship, round2};
pub use service::CatalogService;
pub use store::{InMemoryShipStore, ShipStore};
pub use validation::{parse_ship_id, require_complete, validate_patch};
