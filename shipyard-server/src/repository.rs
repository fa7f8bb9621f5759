//! PostgreSQL implementation of the ship store.

use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};

use shipyard_core::{
    Criterion, NewShip, PageRequest, Result, Ship, ShipId, ShipPredicate, ShipStore, ShipyardError,
    SortField,
};

use crate::db::DbPool;
use crate::models::{NewShipRecord, ShipRecord};
use crate::schema::ships;

type ShipQuery = ships::BoxedQuery<'static, Pg>;

/// Ship store backed by the `ships` table.
#[derive(Clone)]
pub struct PgShipStore {
    pool: DbPool,
}

impl PgShipStore {
    /// Build a store over an initialized pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<PgConnection>>> {
        self.pool.get().map_err(ShipyardError::storage)
    }
}

macro_rules! within {
    ($query:expr, $column:expr, $range:expr) => {{
        let mut query = $query;
        if let Some(min) = $range.min {
            query = query.filter($column.ge(min));
        }
        if let Some(max) = $range.max {
            query = query.filter($column.le(max));
        }
        query
    }};
}

/// Pattern matching `needle` anywhere, with LIKE wildcards taken literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn filtered(predicate: &ShipPredicate) -> ShipQuery {
    let mut query = ships::table.into_boxed();
    for criterion in predicate.criteria() {
        query = match criterion {
            Criterion::NameContains(needle) => {
                query.filter(ships::name.ilike(contains_pattern(needle)))
            }
            Criterion::PlanetContains(needle) => {
                query.filter(ships::planet.ilike(contains_pattern(needle)))
            }
            Criterion::ShipTypeIs(kind) => query.filter(ships::ship_type.eq(kind.as_str())),
            Criterion::ProducedWithin(range) => within!(query, ships::prod_date, range),
            Criterion::UsedIs(is_used) => query.filter(ships::is_used.eq(*is_used)),
            Criterion::SpeedWithin(range) => within!(query, ships::speed, range),
            Criterion::CrewSizeWithin(range) => within!(query, ships::crew_size, range),
            Criterion::RatingWithin(range) => within!(query, ships::rating, range),
        };
    }
    query
}

fn ordered(query: ShipQuery, order: SortField) -> ShipQuery {
    match order {
        SortField::Id => query.order(ships::id.asc()),
        SortField::Speed => query.order((ships::speed.asc(), ships::id.asc())),
        SortField::CrewSize => query.order((ships::crew_size.asc(), ships::id.asc())),
        SortField::Rating => query.order((ships::rating.asc(), ships::id.asc())),
        SortField::ProdDate => query.order((ships::prod_date.asc(), ships::id.asc())),
    }
}

fn into_ships(records: Vec<ShipRecord>) -> Result<Vec<Ship>> {
    records.into_iter().map(Ship::try_from).collect()
}

impl ShipStore for PgShipStore {
    fn find_page(&self, predicate: &ShipPredicate, page: &PageRequest) -> Result<Vec<Ship>> {
        let mut conn = self.conn()?;
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let records = ordered(filtered(predicate), page.order)
            .offset(offset)
            .limit(i64::from(page.page_size))
            .load::<ShipRecord>(&mut conn)
            .map_err(ShipyardError::storage)?;
        into_ships(records)
    }

    fn find_all(&self, predicate: &ShipPredicate) -> Result<Vec<Ship>> {
        let mut conn = self.conn()?;
        let records = ordered(filtered(predicate), SortField::Id)
            .load::<ShipRecord>(&mut conn)
            .map_err(ShipyardError::storage)?;
        into_ships(records)
    }

    fn count(&self, predicate: &ShipPredicate) -> Result<u64> {
        let mut conn = self.conn()?;
        let total: i64 = filtered(predicate)
            .count()
            .get_result(&mut conn)
            .map_err(ShipyardError::storage)?;
        u64::try_from(total).map_err(ShipyardError::storage)
    }

    fn exists_by_id(&self, id: ShipId) -> Result<bool> {
        let mut conn = self.conn()?;
        diesel::select(diesel::dsl::exists(ships::table.find(id)))
            .get_result(&mut conn)
            .map_err(ShipyardError::storage)
    }

    fn find_by_id(&self, id: ShipId) -> Result<Option<Ship>> {
        let mut conn = self.conn()?;
        ships::table
            .find(id)
            .first::<ShipRecord>(&mut conn)
            .optional()
            .map_err(ShipyardError::storage)?
            .map(Ship::try_from)
            .transpose()
    }

    fn insert(&self, ship: NewShip, rating: f64) -> Result<Ship> {
        let mut conn = self.conn()?;
        let record = diesel::insert_into(ships::table)
            .values(&NewShipRecord::new(ship, rating))
            .get_result::<ShipRecord>(&mut conn)
            .map_err(ShipyardError::storage)?;
        Ship::try_from(record)
    }

    fn save(&self, ship: Ship) -> Result<Ship> {
        let mut conn = self.conn()?;
        let id = ship.id;
        let record = ShipRecord::from(ship);
        diesel::update(ships::table.find(id))
            .set(&record)
            .get_result::<ShipRecord>(&mut conn)
            .optional()
            .map_err(ShipyardError::storage)?
            .ok_or(ShipyardError::NotFound(id))
            .and_then(Ship::try_from)
    }

    fn delete_by_id(&self, id: ShipId) -> Result<()> {
        let mut conn = self.conn()?;
        let removed = diesel::delete(ships::table.find(id))
            .execute(&mut conn)
            .map_err(ShipyardError::storage)?;
        if removed == 0 {
            return Err(ShipyardError::NotFound(id));
        }
        Ok(())
    }
}
