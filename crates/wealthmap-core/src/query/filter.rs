//! Filter compiler: loose request parameters into a structured predicate
//!
//! Pure transformation with no side effects. The only failure mode is an
//! out-of-range `page`/`pageSize`; every other malformed input (bad income
//! bounds, partial `near` triples, unknown sort fields) is ignored so that a
//! sloppy client still gets a sensible result set.

use crate::error::{Result, StoreError};

/// Default page size when the caller does not supply one
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Raw, optional query parameters as they arrive from the request
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub min_income: Option<String>,
    pub max_income: Option<String>,
    /// `lng,lat,maxDistanceMeters`
    pub near: Option<String>,
    /// `field_direction`, e.g. `createdAt_desc`
    pub sort: Option<String>,
}

/// Geospatial constraint: points within `max_distance_m` of the center,
/// nearest first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearFilter {
    pub longitude: f64,
    pub latitude: f64,
    pub max_distance_m: f64,
}

/// Compiled predicate over the property set
///
/// Absent fields impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    /// Case-insensitive substring match on the property name
    pub name: Option<String>,
    /// Case-insensitive substring match on the address city
    pub city: Option<String>,
    /// Case-insensitive substring match on the address state
    pub state: Option<String>,
    /// Closed lower bound on owner monthly income
    pub min_income: Option<f64>,
    /// Closed upper bound on owner monthly income
    pub max_income: Option<f64>,
    pub near: Option<NearFilter>,
}

/// Sortable property fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Name,
    MonthlyIncome,
    City,
    State,
}

impl SortField {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "createdAt" => Some(SortField::CreatedAt),
            "name" => Some(SortField::Name),
            "monthlyIncome" => Some(SortField::MonthlyIncome),
            "city" => Some(SortField::City),
            "state" => Some(SortField::State),
            _ => None,
        }
    }

    /// Backing column for the ORDER BY clause
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Name => "name",
            SortField::MonthlyIncome => "monthly_income",
            SortField::City => "city",
            SortField::State => "state",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Normalized pagination and ordering spec
///
/// Ties on the sort key are always broken by `id` ascending so that a result
/// set with equal keys paginates identically across requests.
#[derive(Debug, Clone, Copy)]
pub struct PageSpec {
    pub page: u32,
    pub page_size: u32,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort_field: SortField::CreatedAt,
            sort_direction: SortDirection::Desc,
        }
    }
}

impl PageSpec {
    /// Row offset of the first item on this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

/// Compile raw parameters into a predicate and page spec
pub fn compile(params: &ListParams) -> Result<(PropertyFilter, PageSpec)> {
    let page = parse_page(params.page.as_deref(), "page", 1)?;
    let page_size = parse_page(params.page_size.as_deref(), "pageSize", DEFAULT_PAGE_SIZE)?;
    let (sort_field, sort_direction) = parse_sort(params.sort.as_deref());

    let filter = PropertyFilter {
        name: non_empty(params.name.as_deref()),
        city: non_empty(params.city.as_deref()),
        state: non_empty(params.state.as_deref()),
        min_income: parse_finite(params.min_income.as_deref()),
        max_income: parse_finite(params.max_income.as_deref()),
        near: parse_near(params.near.as_deref()),
    };

    let spec = PageSpec {
        page,
        page_size,
        sort_field,
        sort_direction,
    };

    Ok((filter, spec))
}

fn parse_page(value: Option<&str>, field: &str, default: u32) -> Result<u32> {
    match value {
        None => Ok(default),
        Some(s) => {
            let n: i64 = s
                .trim()
                .parse()
                .map_err(|_| StoreError::Validation(format!("{field} must be an integer")))?;
            if n < 1 || n > i64::from(u32::MAX) {
                return Err(StoreError::Validation(format!("{field} must be >= 1")));
            }
            Ok(n as u32)
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_finite(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Parse `lng,lat,distance`; anything short of three finite numbers is
/// treated as absent, never an error
fn parse_near(value: Option<&str>) -> Option<NearFilter> {
    let parts: Vec<f64> = value?
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [lng, lat, dist] if lng.is_finite() && lat.is_finite() && dist.is_finite() => {
            Some(NearFilter {
                longitude: *lng,
                latitude: *lat,
                max_distance_m: *dist,
            })
        }
        _ => None,
    }
}

/// Parse `field_direction`; unknown fields fall back to the default
/// `createdAt` descending, and any direction other than `desc` sorts
/// ascending
fn parse_sort(value: Option<&str>) -> (SortField, SortDirection) {
    let default = (SortField::CreatedAt, SortDirection::Desc);
    let Some(sort) = value else {
        return default;
    };
    let (field_str, dir_str) = match sort.rsplit_once('_') {
        Some((f, d)) => (f, d),
        None => (sort, ""),
    };
    let Some(field) = SortField::parse(field_str) else {
        return default;
    };
    let direction = if dir_str == "desc" {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    (field, direction)
}
