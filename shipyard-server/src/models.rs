//! Database models for the Shipyard server.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use shipyard_core::{NewShip, Ship, ShipId, ShipType, ShipyardError};

use crate::schema::ships;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, AsChangeset)]
#[diesel(table_name = ships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
/// Ship database record.
pub struct ShipRecord {
    /// Ship identifier.
    pub id: ShipId,
    /// Ship name.
    pub name: String,
    /// Planet of origin.
    pub planet: String,
    /// Ship type label.
    pub ship_type: String,
    /// Production timestamp.
    pub prod_date: DateTime<Utc>,
    /// Whether the ship is second-hand.
    pub is_used: bool,
    /// Speed.
    pub speed: f64,
    /// Crew size.
    pub crew_size: i32,
    /// Stored rating.
    pub rating: f64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ships)]
/// Insertable ship record.
pub struct NewShipRecord {
    /// Ship name.
    pub name: String,
    /// Planet of origin.
    pub planet: String,
    /// Ship type label.
    pub ship_type: String,
    /// Production timestamp.
    pub prod_date: DateTime<Utc>,
    /// Whether the ship is second-hand.
    pub is_used: bool,
    /// Speed.
    pub speed: f64,
    /// Crew size.
    pub crew_size: i32,
    /// Computed rating.
    pub rating: f64,
}

impl NewShipRecord {
    /// Record for a validated ship and its rating.
    pub fn new(ship: NewShip, rating: f64) -> Self {
        Self {
            name: ship.name,
            planet: ship.planet,
            ship_type: ship.ship_type.as_str().to_string(),
            prod_date: ship.prod_date,
            is_used: ship.is_used,
            speed: ship.speed,
            crew_size: ship.crew_size,
            rating,
        }
    }
}

impl From<Ship> for ShipRecord {
    fn from(ship: Ship) -> Self {
        Self {
            id: ship.id,
            name: ship.name,
            planet: ship.planet,
            ship_type: ship.ship_type.as_str().to_string(),
            prod_date: ship.prod_date,
            is_used: ship.is_used,
            speed: ship.speed,
            crew_size: ship.crew_size,
            rating: ship.rating,
        }
    }
}

impl TryFrom<ShipRecord> for Ship {
    type Error = ShipyardError;

    fn try_from(record: ShipRecord) -> Result<Self, Self::Error> {
        let ship_type = record.ship_type.parse::<ShipType>().map_err(|_| {
            ShipyardError::storage(format!(
                "ship {} has unknown type {:?}",
                record.id, record.ship_type
            ))
        })?;
        Ok(Ship {
            id: record.id,
            name: record.name,
            planet: record.planet,
            ship_type,
            prod_date: record.prod_date,
            is_used: record.is_used,
            speed: record.speed,
            crew_size: record.crew_size,
            rating: record.rating,
        })
    }
}
