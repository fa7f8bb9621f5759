//! Persistence abstraction for the ship catalog.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::{NewShip, Ship, ShipId};
use crate::error::{Result, ShipyardError};
use crate::filter::ShipPredicate;
use crate::paging::{PageRequest, paginate};

/// Storage backend for ships.
///
/// Single-record reads and writes are atomic; filtered scans are not isolated
/// from concurrent writes.
#[cfg_attr(test, mockall::automock)]
pub trait ShipStore {
    /// One sorted page of ships matching the predicate.
    fn find_page(&self, predicate: &ShipPredicate, page: &PageRequest) -> Result<Vec<Ship>>;
    /// Every ship matching the predicate, in id order.
    fn find_all(&self, predicate: &ShipPredicate) -> Result<Vec<Ship>>;
    /// Number of ships matching the predicate.
    fn count(&self, predicate: &ShipPredicate) -> Result<u64> {
        Ok(self.find_all(predicate)?.len() as u64)
    }
    /// Whether a ship with the identifier exists.
    fn exists_by_id(&self, id: ShipId) -> Result<bool>;
    /// Fetch a ship by identifier.
    fn find_by_id(&self, id: ShipId) -> Result<Option<Ship>>;
    /// Store a new ship, assigning its identifier.
    fn insert(&self, ship: NewShip, rating: f64) -> Result<Ship>;
    /// Overwrite an existing ship.
    fn save(&self, ship: Ship) -> Result<Ship>;
    /// Remove a ship by identifier.
    fn delete_by_id(&self, id: ShipId) -> Result<()>;
}

#[derive(Debug, Default)]
struct Shelf {
    last_id: ShipId,
    ships: BTreeMap<ShipId, Ship>,
}

/// Process-local store backed by a sorted map.
#[derive(Debug, Default)]
pub struct InMemoryShipStore {
    shelf: Mutex<Shelf>,
}

impl InMemoryShipStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn shelf(&self) -> Result<MutexGuard<'_, Shelf>> {
        self.shelf
            .lock()
            .map_err(|_| ShipyardError::storage("in-memory store poisoned"))
    }
}

impl ShipStore for InMemoryShipStore {
    fn find_page(&self, predicate: &ShipPredicate, page: &PageRequest) -> Result<Vec<Ship>> {
        Ok(paginate(self.find_all(predicate)?, page))
    }

    fn find_all(&self, predicate: &ShipPredicate) -> Result<Vec<Ship>> {
        let shelf = self.shelf()?;
        Ok(shelf
            .ships
            .values()
            .filter(|ship| predicate.matches(ship))
            .cloned()
            .collect())
    }

    fn exists_by_id(&self, id: ShipId) -> Result<bool> {
        Ok(self.shelf()?.ships.contains_key(&id))
    }

    fn find_by_id(&self, id: ShipId) -> Result<Option<Ship>> {
        Ok(self.shelf()?.ships.get(&id).cloned())
    }

    fn insert(&self, ship: NewShip, rating: f64) -> Result<Ship> {
        let mut shelf = self.shelf()?;
        shelf.last_id += 1;
        let stored = ship.into_ship(shelf.last_id, rating);
        shelf.ships.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn save(&self, ship: Ship) -> Result<Ship> {
        let mut shelf = self.shelf()?;
        match shelf.ships.get_mut(&ship.id) {
            Some(slot) => {
                *slot = ship.clone();
                Ok(ship)
            }
            None => Err(ShipyardError::NotFound(ship.id)),
        }
    }

    fn delete_by_id(&self, id: ShipId) -> Result<()> {
        self.shelf()?
            .ships
            .remove(&id)
            .map(|_| ())
            .ok_or(ShipyardError::NotFound(id))
    }
}
