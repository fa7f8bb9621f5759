//! Sort fields and page requests for ship listings.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Ship;
use crate::error::{Result, ShipyardError};

/// Page size used when the client does not send one.
pub const DEFAULT_PAGE_SIZE: u32 = 3;

/// Field a listing is sorted by, ascending.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortField {
    /// Store identifier.
    #[default]
    Id,
    /// Speed.
    Speed,
    /// Crew size.
    CrewSize,
    /// Rating.
    Rating,
    /// Production date.
    ProdDate,
}

impl SortField {
    /// Every sort field.
    pub fn all() -> &'static [SortField] {
        &[
            SortField::Id,
            SortField::Speed,
            SortField::CrewSize,
            SortField::Rating,
            SortField::ProdDate,
        ]
    }

    /// Token accepted in the `order` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "ID",
            SortField::Speed => "SPEED",
            SortField::CrewSize => "CREW_SIZE",
            SortField::Rating => "RATING",
            SortField::ProdDate => "PROD_DATE",
        }
    }

    /// Compare two ships by this field only.
    pub fn compare(&self, left: &Ship, right: &Ship) -> Ordering {
        match self {
            SortField::Id => left.id.cmp(&right.id),
            SortField::Speed => left.speed.total_cmp(&right.speed),
            SortField::CrewSize => left.crew_size.cmp(&right.crew_size),
            SortField::Rating => left.rating.total_cmp(&right.rating),
            SortField::ProdDate => left.prod_date.cmp(&right.prod_date),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ShipyardError;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        SortField::all()
            .iter()
            .copied()
            .find(|field| field.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                ShipyardError::validation("order", format!("unknown sort field {value:?}"))
            })
    }
}

/// Sort order and page window for a listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Field to sort by, ascending.
    pub order: SortField,
    /// Zero-based page index.
    pub page_number: u32,
    /// Maximum number of ships per page, at least one.
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            order: SortField::Id,
            page_number: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a page request, filling defaults for absent values.
    pub fn new(
        order: Option<SortField>,
        page_number: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<Self> {
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(ShipyardError::validation("pageSize", "must be at least 1"));
        }
        Ok(Self {
            order: order.unwrap_or_default(),
            page_number: page_number.unwrap_or(0),
            page_size,
        })
    }

    /// Number of matching ships before the first one on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number).saturating_mul(u64::from(self.page_size))
    }
}

/// Sort and page query parameters of a listing.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Sort field, `ID` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortField>,
    /// Zero-based page index, 0 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Page size, 3 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl PageParams {
    /// Resolve defaults and validate the page size.
    pub fn page_request(&self) -> Result<PageRequest> {
        PageRequest::new(self.order, self.page_number, self.page_size)
    }
}

/// Sort `ships` by the requested field (ties by id) and cut out one page.
pub fn paginate(mut ships: Vec<Ship>, page: &PageRequest) -> Vec<Ship> {
    ships.sort_by(|left, right| {
        page.order
            .compare(left, right)
            .then_with(|| left.id.cmp(&right.id))
    });
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    ships
        .into_iter()
        .skip(offset)
        .take(page.page_size as usize)
        .collect()
}
