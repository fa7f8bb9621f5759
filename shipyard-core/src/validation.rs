//! Input validation for ship payloads and identifiers.

use chrono::Datelike;

use crate::domain::{NewShip, ShipId, ShipPatch};
use crate::error::{Result, ShipyardError};

/// Maximum length of names and planets, in characters.
pub const MAX_TEXT_LEN: usize = 50;
/// Earliest accepted production year.
pub const MIN_PROD_YEAR: i32 = 2800;
/// Latest accepted production year.
pub const MAX_PROD_YEAR: i32 = 3019;
/// Slowest accepted speed.
pub const MIN_SPEED: f64 = 0.01;
/// Fastest accepted speed.
pub const MAX_SPEED: f64 = 0.99;
/// Smallest accepted crew.
pub const MIN_CREW_SIZE: i32 = 1;
/// Largest accepted crew.
pub const MAX_CREW_SIZE: i32 = 9999;

/// Check every present field of `patch` against its constraint.
///
/// Absent fields are not checked, which is what partial updates rely on.
pub fn validate_patch(patch: &ShipPatch) -> Result<()> {
    if let Some(name) = &patch.name {
        check_text("name", name)?;
    }
    if let Some(planet) = &patch.planet {
        check_text("planet", planet)?;
    }
    if let Some(prod_date) = &patch.prod_date {
        let year = prod_date.year();
        if !(MIN_PROD_YEAR..=MAX_PROD_YEAR).contains(&year) {
            return Err(ShipyardError::validation(
                "prodDate",
                format!("year {year} is not between {MIN_PROD_YEAR} and {MAX_PROD_YEAR}"),
            ));
        }
    }
    if let Some(speed) = patch.speed {
        // NaN fails the range check as well.
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(ShipyardError::validation(
                "speed",
                format!("{speed} is not between {MIN_SPEED} and {MAX_SPEED}"),
            ));
        }
    }
    if let Some(crew_size) = patch.crew_size {
        if !(MIN_CREW_SIZE..=MAX_CREW_SIZE).contains(&crew_size) {
            return Err(ShipyardError::validation(
                "crewSize",
                format!("{crew_size} is not between {MIN_CREW_SIZE} and {MAX_CREW_SIZE}"),
            ));
        }
    }
    Ok(())
}

/// Turn a create payload into a complete ship.
///
/// All fields except `isUsed` are required; `isUsed` defaults to `false`.
pub fn require_complete(patch: ShipPatch) -> Result<NewShip> {
    let missing: Vec<&str> = [
        ("name", patch.name.is_none()),
        ("planet", patch.planet.is_none()),
        ("shipType", patch.ship_type.is_none()),
        ("prodDate", patch.prod_date.is_none()),
        ("speed", patch.speed.is_none()),
        ("crewSize", patch.crew_size.is_none()),
    ]
    .into_iter()
    .filter_map(|(field, absent)| absent.then_some(field))
    .collect();
    if !missing.is_empty() {
        return Err(ShipyardError::IncompleteInput(format!(
            "not enough data to create a ship, missing: {}",
            missing.join(", ")
        )));
    }
    validate_patch(&patch)?;

    match patch {
        ShipPatch {
            name: Some(name),
            planet: Some(planet),
            ship_type: Some(ship_type),
            prod_date: Some(prod_date),
            is_used,
            speed: Some(speed),
            crew_size: Some(crew_size),
        } => Ok(NewShip {
            name,
            planet,
            ship_type,
            prod_date,
            is_used: is_used.unwrap_or(false),
            speed,
            crew_size,
        }),
        _ => Err(ShipyardError::IncompleteInput(
            "not enough data to create a ship".to_string(),
        )),
    }
}

/// Parse an identifier taken from a request path.
pub fn parse_ship_id(raw: &str) -> Result<ShipId> {
    let id: ShipId = raw
        .parse()
        .map_err(|_| ShipyardError::InvalidIdentifier(format!("{raw:?} is not a number")))?;
    if id < 1 {
        return Err(ShipyardError::InvalidIdentifier(format!("{id} is less than one")));
    }
    Ok(id)
}

fn check_text(field: &'static str, value: &str) -> Result<()> {
    let len = value.chars().count();
    if len == 0 || len > MAX_TEXT_LEN {
        return Err(ShipyardError::validation(
            field,
            format!("length {len} is not between 1 and {MAX_TEXT_LEN}"),
        ));
    }
    Ok(())
}
