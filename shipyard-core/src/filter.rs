//! Composable filter predicates for ship listings and counts.
//!
//! Every builder returns `None` when it was given nothing to filter on, and
//! [`ShipPredicate::and`] treats `None` as "no restriction". A predicate built
//! from an empty [`ShipFilter`] therefore matches every ship.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::domain::{Ship, ShipType};
use crate::error::{Result, ShipyardError};

/// Inclusive bounds with at least one side set.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Range<T> {
    /// Lower bound, inclusive.
    pub min: Option<T>,
    /// Upper bound, inclusive.
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Range<T> {
    /// Build a range, or `None` when both bounds are absent.
    pub fn new(min: Option<T>, max: Option<T>) -> Option<Self> {
        if min.is_none() && max.is_none() {
            return None;
        }
        Some(Self { min, max })
    }

    /// Whether `value` lies within the bounds.
    pub fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// A single restriction on ships.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Name contains the text, ignoring case.
    NameContains(String),
    /// Planet contains the text, ignoring case.
    PlanetContains(String),
    /// Ship type equals the value.
    ShipTypeIs(ShipType),
    /// Production date within the bounds.
    ProducedWithin(Range<DateTime<Utc>>),
    /// Usage flag equals the value.
    UsedIs(bool),
    /// Speed within the bounds.
    SpeedWithin(Range<f64>),
    /// Crew size within the bounds.
    CrewSizeWithin(Range<i32>),
    /// Rating within the bounds.
    RatingWithin(Range<f64>),
}

impl Criterion {
    /// Evaluate the criterion against a ship.
    pub fn matches(&self, ship: &Ship) -> bool {
        match self {
            Criterion::NameContains(needle) => contains_ignore_case(&ship.name, needle),
            Criterion::PlanetContains(needle) => contains_ignore_case(&ship.planet, needle),
            Criterion::ShipTypeIs(kind) => ship.ship_type == *kind,
            Criterion::ProducedWithin(range) => range.contains(ship.prod_date),
            Criterion::UsedIs(is_used) => ship.is_used == *is_used,
            Criterion::SpeedWithin(range) => range.contains(ship.speed),
            Criterion::CrewSizeWithin(range) => range.contains(ship.crew_size),
            Criterion::RatingWithin(range) => range.contains(ship.rating),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_uppercase().contains(&needle.to_uppercase())
}

/// Conjunction of criteria. With no criteria it matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipPredicate {
    criteria: Vec<Criterion>,
}

impl ShipPredicate {
    /// Predicate without restrictions.
    pub fn any() -> Self {
        Self::default()
    }

    /// Add a criterion; `None` leaves the predicate unchanged.
    pub fn and(mut self, criterion: Option<Criterion>) -> Self {
        self.criteria.extend(criterion);
        self
    }

    /// Criteria in the order they were added.
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// Whether the predicate matches every ship.
    pub fn is_unrestricted(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Whether the ship satisfies every criterion.
    pub fn matches(&self, ship: &Ship) -> bool {
        self.criteria
            .iter()
            .all(|criterion| criterion.matches(ship))
    }
}

/// Case-insensitive substring match on the name.
pub fn filter_by_name(name: Option<&str>) -> Option<Criterion> {
    name.map(|text| Criterion::NameContains(text.to_string()))
}

/// Case-insensitive substring match on the planet.
pub fn filter_by_planet(planet: Option<&str>) -> Option<Criterion> {
    planet.map(|text| Criterion::PlanetContains(text.to_string()))
}

/// Exact ship type match.
pub fn filter_by_ship_type(ship_type: Option<ShipType>) -> Option<Criterion> {
    ship_type.map(Criterion::ShipTypeIs)
}

/// Production date window from epoch-millisecond bounds.
///
/// `after` is inclusive. `before` is exclusive: the upper bound becomes
/// `before - 1ms`. Both compare instants, not calendar years, so a window of
/// `[start of year, start of year + 1 day)` leaves out ships produced later
/// in that same year.
pub fn filter_by_prod_date(after: Option<i64>, before: Option<i64>) -> Result<Option<Criterion>> {
    let min = after.map(|millis| instant("after", millis)).transpose()?;
    let max = before
        .map(|millis| {
            let upper = millis
                .checked_sub(1)
                .ok_or_else(|| ShipyardError::validation("before", "timestamp out of range"))?;
            instant("before", upper)
        })
        .transpose()?;
    Ok(Range::new(min, max).map(Criterion::ProducedWithin))
}

fn instant(field: &'static str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        ShipyardError::validation(field, format!("timestamp {millis} out of range"))
    })
}

/// Exact usage flag match.
pub fn filter_by_usage(is_used: Option<bool>) -> Option<Criterion> {
    is_used.map(Criterion::UsedIs)
}

/// Inclusive speed bounds. Non-finite bounds are rejected.
pub fn filter_by_speed(
    min_speed: Option<f64>,
    max_speed: Option<f64>,
) -> Result<Option<Criterion>> {
    let min = finite("minSpeed", min_speed)?;
    let max = finite("maxSpeed", max_speed)?;
    Ok(Range::new(min, max).map(Criterion::SpeedWithin))
}

/// Inclusive crew size bounds.
pub fn filter_by_crew_size(
    min_crew_size: Option<i32>,
    max_crew_size: Option<i32>,
) -> Option<Criterion> {
    Range::new(min_crew_size, max_crew_size).map(Criterion::CrewSizeWithin)
}

/// Inclusive rating bounds. Non-finite bounds are rejected.
pub fn filter_by_rating(
    min_rating: Option<f64>,
    max_rating: Option<f64>,
) -> Result<Option<Criterion>> {
    let min = finite("minRating", min_rating)?;
    let max = finite("maxRating", max_rating)?;
    Ok(Range::new(min, max).map(Criterion::RatingWithin))
}

// Postgres orders NaN above every number while `PartialOrd` never matches it.
fn finite(field: &'static str, bound: Option<f64>) -> Result<Option<f64>> {
    match bound {
        Some(value) if !value.is_finite() => {
            Err(ShipyardError::validation(field, format!("{value} is not a finite number")))
        }
        _ => Ok(bound),
    }
}

/// Optional filter parameters shared by listing and counting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ShipFilter {
    /// Substring of the ship name, case-insensitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Substring of the planet, case-insensitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planet: Option<String>,
    /// Exact ship type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_type: Option<ShipType>,
    /// Earliest production instant, epoch milliseconds, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<i64>,
    /// Latest production instant, epoch milliseconds, exclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<i64>,
    /// Usage flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_used: Option<bool>,
    /// Minimum speed, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_speed: Option<f64>,
    /// Maximum speed, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f64>,
    /// Minimum crew size, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_crew_size: Option<i32>,
    /// Maximum crew size, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_crew_size: Option<i32>,
    /// Minimum rating, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    /// Maximum rating, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<f64>,
}

impl ShipFilter {
    /// Compose the conjunction of every supplied criterion.
    pub fn predicate(&self) -> Result<ShipPredicate> {
        Ok(ShipPredicate::any()
            .and(filter_by_name(self.name.as_deref()))
            .and(filter_by_planet(self.planet.as_deref()))
            .and(filter_by_ship_type(self.ship_type))
            .and(filter_by_prod_date(self.after, self.before)?)
            .and(filter_by_usage(self.is_used))
            .and(filter_by_speed(self.min_speed, self.max_speed)?)
            .and(filter_by_crew_size(self.min_crew_size, self.max_crew_size))
            .and(filter_by_rating(self.min_rating, self.max_rating)?))
    }
}
