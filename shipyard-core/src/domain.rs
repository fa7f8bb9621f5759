//! Domain entities for Shipyard.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ShipyardError;

/// Store-assigned ship identifier.
pub type ShipId = i64;

/// Ship classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipType {
    /// Cargo and passenger carrier.
    Transport,
    /// Armed vessel.
    Military,
    /// Trading vessel.
    Merchant,
}

impl ShipType {
    /// Every known ship type, in declaration order.
    pub fn all() -> &'static [ShipType] {
        &[ShipType::Transport, ShipType::Military, ShipType::Merchant]
    }

    /// Wire and storage label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipType::Transport => "TRANSPORT",
            ShipType::Military => "MILITARY",
            ShipType::Merchant => "MERCHANT",
        }
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipType {
    type Err = ShipyardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        ShipType::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                ShipyardError::validation("shipType", format!("unknown ship type {value:?}"))
            })
    }
}

/// A ship as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ship {
    /// Store-assigned identifier.
    pub id: ShipId,
    /// Ship name.
    pub name: String,
    /// Home planet.
    pub planet: String,
    /// Ship classification.
    pub ship_type: ShipType,
    /// Production date, epoch milliseconds on the wire.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub prod_date: DateTime<Utc>,
    /// Whether the ship has been used before.
    pub is_used: bool,
    /// Maximum speed as a fraction of light speed.
    pub speed: f64,
    /// Number of crew members.
    pub crew_size: i32,
    /// Derived rating, recomputed on every write.
    pub rating: f64,
}

impl Ship {
    /// UTC calendar year of production.
    pub fn prod_year(&self) -> i32 {
        self.prod_date.year()
    }
}

/// Partial ship payload used for both create and update requests.
///
/// An absent field means "leave unchanged"; there is no way to clear a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipPatch {
    /// Ship name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Home planet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planet: Option<String>,
    /// Ship classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_type: Option<ShipType>,
    /// Production date in epoch milliseconds.
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<i64>)]
    pub prod_date: Option<DateTime<Utc>>,
    /// Whether the ship has been used before.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_used: Option<bool>,
    /// Maximum speed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Number of crew members.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crew_size: Option<i32>,
}

impl ShipPatch {
    /// Whether no field is present.
    pub fn is_empty(&self) -> bool {
        self == &ShipPatch::default()
    }

    /// Overwrite the fields of `ship` that are present in this patch.
    ///
    /// The rating is left untouched; callers recompute it afterwards.
    pub fn merge_into(self, ship: &mut Ship) {
        if let Some(name) = self.name {
            ship.name = name;
        }
        if let Some(planet) = self.planet {
            ship.planet = planet;
        }
        if let Some(ship_type) = self.ship_type {
            ship.ship_type = ship_type;
        }
        if let Some(prod_date) = self.prod_date {
            ship.prod_date = prod_date;
        }
        if let Some(is_used) = self.is_used {
            ship.is_used = is_used;
        }
        if let Some(speed) = self.speed {
            ship.speed = speed;
        }
        if let Some(crew_size) = self.crew_size {
            ship.crew_size = crew_size;
        }
    }
}

/// A complete, validated ship that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShip {
    /// Ship name.
    pub name: String,
    /// Home planet.
    pub planet: String,
    /// Ship classification.
    pub ship_type: ShipType,
    /// Production date.
    pub prod_date: DateTime<Utc>,
    /// Whether the ship has been used before.
    pub is_used: bool,
    /// Maximum speed.
    pub speed: f64,
    /// Number of crew members.
    pub crew_size: i32,
}

impl NewShip {
    /// UTC calendar year of production.
    pub fn prod_year(&self) -> i32 {
        self.prod_date.year()
    }

    /// Attach the identifier and rating assigned at insertion time.
    pub fn into_ship(self, id: ShipId, rating: f64) -> Ship {
        Ship {
            id,
            name: self.name,
            planet: self.planet,
            ship_type: self.ship_type,
            prod_date: self.prod_date,
            is_used: self.is_used,
            speed: self.speed,
            crew_size: self.crew_size,
            rating,
        }
    }
}

/// First instant of `year` in UTC, if representable.
pub fn start_of_year(year: i32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()
}
