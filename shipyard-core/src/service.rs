//! Catalog orchestration: validation, rating, and CRUD against a store.

use std::sync::Arc;

use log::{debug, info};

use crate::domain::{Ship, ShipId, ShipPatch};
use crate::error::{Result, ShipyardError};
use crate::filter::ShipPredicate;
use crate::paging::PageRequest;
use crate::rating::{rate_new_ship, rate_ship};
use crate::store::ShipStore;
use crate::validation::{require_complete, validate_patch};

/// Ship catalog service.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ShipStore + Send + Sync>,
}

impl CatalogService {
    /// Build a service over the given store.
    pub fn new(store: Arc<dyn ShipStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// Build a service over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(crate::store::InMemoryShipStore::new()))
    }

    /// Validate and store a new ship. `isUsed` defaults to `false`.
    pub fn create(&self, patch: ShipPatch) -> Result<Ship> {
        let ship = require_complete(patch)?;
        let rating = rate_new_ship(&ship);
        let stored = self.store.insert(ship, rating)?;
        info!("created ship {} ({})", stored.id, stored.name);
        Ok(stored)
    }

    /// Overwrite the fields present in `patch` and recompute the rating.
    pub fn update(&self, id: ShipId, patch: ShipPatch) -> Result<Ship> {
        validate_patch(&patch)?;
        let mut ship = self
            .store
            .find_by_id(id)?
            .ok_or(ShipyardError::NotFound(id))?;
        patch.merge_into(&mut ship);
        ship.rating = rate_ship(&ship);
        let stored = self.store.save(ship)?;
        info!("updated ship {id}, rating {}", stored.rating);
        Ok(stored)
    }

    /// Fetch a ship as stored.
    pub fn get(&self, id: ShipId) -> Result<Ship> {
        debug!("fetching ship {id}");
        self.store
            .find_by_id(id)?
            .ok_or(ShipyardError::NotFound(id))
    }

    /// Remove a ship.
    pub fn delete(&self, id: ShipId) -> Result<()> {
        if !self.store.exists_by_id(id)? {
            return Err(ShipyardError::NotFound(id));
        }
        self.store.delete_by_id(id)?;
        info!("deleted ship {id}");
        Ok(())
    }

    /// One page of matching ships.
    pub fn list(&self, predicate: &ShipPredicate, page: &PageRequest) -> Result<Vec<Ship>> {
        debug!(
            "listing ships: {} criteria, order {}, page {} of size {}",
            predicate.criteria().len(),
            page.order,
            page.page_number,
            page.page_size
        );
        self.store.find_page(predicate, page)
    }

    /// Number of matching ships, ignoring paging.
    pub fn count(&self, predicate: &ShipPredicate) -> Result<u64> {
        debug!("counting ships: {} criteria", predicate.criteria().len());
        self.store.count(predicate)
    }
}
