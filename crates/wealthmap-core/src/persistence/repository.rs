//! Repository for CRUD and query operations on the property directory
//!
//! The repository is the only shared mutable resource in the system; bookmark
//! uniqueness is enforced here by the store's unique index rather than by
//! in-process locking, so the guarantee holds across processes sharing the
//! database file.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};
use uuid::Uuid;

use super::schema::{Schema, SCHEMA_VERSION};
use crate::bookmark::{Bookmark, BookmarkId, ExpandedBookmark};
use crate::error::{Result, StoreError};
use crate::geo;
use crate::property::{Address, GeoPoint, OwnerDetails, Property, PropertyId, Sex};
use crate::query::{PageSpec, PropertyFilter};

const PROPERTY_COLUMNS: &str = "id, name, street, city, state, zip_code, longitude, latitude, \
     property_image, owner_name, owner_age, owner_sex, owner_email, owner_mobile, \
     owner_occupation, monthly_income, total_wealth, owner_image, created_at";

const PREFIXED_PROPERTY_COLUMNS: &str =
    "p.id, p.name, p.street, p.city, p.state, p.zip_code, p.longitude, p.latitude, \
     p.property_image, p.owner_name, p.owner_age, p.owner_sex, p.owner_email, p.owner_mobile, \
     p.owner_occupation, p.monthly_income, p.total_wealth, p.owner_image, p.created_at";

/// One page of query results with total-count metadata
#[derive(Debug, Clone)]
pub struct PropertyPage {
    pub items: Vec<Property>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
}

/// Repository over the SQLite store
pub struct Repository {
    conn: rusqlite::Connection,
}

impl Repository {
    /// Open (or create) a repository at the given database path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = rusqlite::Connection::open(path)?;
        Self::setup(conn)
    }

    /// Create an in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        Self::setup(conn)
    }

    fn setup(conn: rusqlite::Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        geo::register_functions(&conn)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Initialize the database schema
    fn initialize(&self) -> Result<()> {
        let current_version = self.get_schema_version().unwrap_or(0);

        if current_version == 0 {
            self.conn.execute_batch(Schema::create_tables())?;
            self.set_schema_version(SCHEMA_VERSION)?;
        } else if current_version < SCHEMA_VERSION {
            for version in current_version..SCHEMA_VERSION {
                if let Some(migration) = Schema::migration(version, version + 1) {
                    self.conn.execute_batch(migration)?;
                }
            }
            self.set_schema_version(SCHEMA_VERSION)?;
        }

        Ok(())
    }

    fn get_schema_version(&self) -> Option<u32> {
        self.conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY applied_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok()
    }

    fn set_schema_version(&self, version: u32) -> Result<()> {
        self.conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
        Ok(())
    }

    // ==================== Property Operations ====================

    /// Insert a property created by the administration path
    pub fn insert_property(&self, property: &Property) -> Result<()> {
        property.validate()?;

        self.conn.execute(
            r#"
            INSERT INTO properties
            (id, name, street, city, state, zip_code, longitude, latitude, property_image,
             owner_name, owner_age, owner_sex, owner_email, owner_mobile, owner_occupation,
             monthly_income, total_wealth, owner_image, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            "#,
            params![
                property.id.to_string(),
                property.name,
                property.address.street,
                property.address.city,
                property.address.state,
                property.address.zip_code,
                property.location.longitude,
                property.location.latitude,
                property.property_image,
                property.owner_details.owner_name,
                property.owner_details.age,
                property.owner_details.sex.as_str(),
                property.owner_details.email,
                property.owner_details.mobile_number,
                property.owner_details.occupation,
                property.owner_details.monthly_income,
                property.owner_details.total_wealth,
                property.owner_details.owner_image,
                property.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Get a property snapshot by ID
    pub fn get_property(&self, id: PropertyId) -> Result<Option<Property>> {
        let sql = format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = ?1");
        let result = self
            .conn
            .query_row(&sql, [id.to_string()], |row| property_from_row(row, 0));

        match result {
            Ok(property) => Ok(Some(property)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a property; dependent bookmarks are cascade-deleted in the
    /// same statement's transaction
    pub fn delete_property(&self, id: PropertyId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM properties WHERE id = ?1", [id.to_string()])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("Property not found: {id}")));
        }
        Ok(())
    }

    /// Execute a compiled predicate and return one page of results
    ///
    /// `total` counts every matching record regardless of pagination, and a
    /// page past the end of the result set yields an empty item list. When a
    /// `near` constraint is present the results are ordered by distance from
    /// its center, overriding the requested sort; `id` breaks ties either way.
    pub fn search_properties(
        &self,
        filter: &PropertyFilter,
        page: &PageSpec,
    ) -> Result<PropertyPage> {
        let (where_sql, where_params) = where_clause(filter);

        let count_sql = format!("SELECT COUNT(*) FROM properties{where_sql}");
        let total: i64 = self.conn.query_row(
            &count_sql,
            params_from_iter(where_params.iter()),
            |row| row.get(0),
        )?;
        let total = total as u64;

        let mut select_params = where_params;
        let order_sql = match &filter.near {
            Some(near) => {
                select_params.push(Value::Real(near.longitude));
                select_params.push(Value::Real(near.latitude));
                "ORDER BY haversine_m(longitude, latitude, ?, ?) ASC, id ASC".to_string()
            }
            None => format!(
                "ORDER BY {} {}, id ASC",
                page.sort_field.column(),
                page.sort_direction.keyword()
            ),
        };
        // the u64 offset can exceed i64, and SQLite reads a negative OFFSET
        // as 0; clamp so an absurd page still lands past the end
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        select_params.push(Value::Integer(i64::from(page.page_size)));
        select_params.push(Value::Integer(offset));

        let select_sql = format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties{where_sql} {order_sql} LIMIT ? OFFSET ?"
        );
        let mut stmt = self.conn.prepare(&select_sql)?;
        let items = stmt
            .query_map(params_from_iter(select_params.iter()), |row| {
                property_from_row(row, 0)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(PropertyPage {
            items,
            total,
            total_pages: total.div_ceil(u64::from(page.page_size)),
            current_page: page.page,
        })
    }

    // ==================== Bookmark Guard ====================

    /// Create a bookmark after verifying the property exists
    ///
    /// The duplicate check is the unique index on (user_email, property_id):
    /// of two racing calls for the same pair, exactly one insert succeeds and
    /// the other surfaces a conflict.
    pub fn add_bookmark(&self, user_email: &str, property_id: PropertyId) -> Result<ExpandedBookmark> {
        let property = self
            .get_property(property_id)?
            .ok_or_else(|| StoreError::NotFound(format!("Property not found: {property_id}")))?;

        let bookmark = Bookmark::new(user_email.to_string(), property_id);
        self.insert_bookmark_row(&bookmark)?;

        Ok(ExpandedBookmark { bookmark, property })
    }

    /// Insert a bookmark row, translating the constraint it trips
    ///
    /// The unique index firing means the pair is already bookmarked; the
    /// foreign key firing means the property vanished after the existence
    /// check, which is a not-found, not a duplicate.
    fn insert_bookmark_row(&self, bookmark: &Bookmark) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO bookmarks (id, user_email, property_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    bookmark.id.to_string(),
                    bookmark.user_email,
                    bookmark.property.to_string(),
                    bookmark.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(f, _)
                    if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
                {
                    StoreError::Conflict("Property already bookmarked".to_string())
                }
                rusqlite::Error::SqliteFailure(f, _)
                    if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
                {
                    StoreError::NotFound(format!("Property not found: {}", bookmark.property))
                }
                other => other.into(),
            })?;
        Ok(())
    }

    /// Remove a bookmark by ID
    pub fn remove_bookmark(&self, id: BookmarkId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1", [id.to_string()])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("Bookmark not found: {id}")));
        }
        Ok(())
    }

    /// List a user's bookmarks newest-first, each expanded with the current
    /// snapshot of its property
    pub fn list_bookmarks(&self, user_email: &str) -> Result<Vec<ExpandedBookmark>> {
        let sql = format!(
            "SELECT b.id, b.user_email, b.property_id, b.created_at, {PREFIXED_PROPERTY_COLUMNS} \
             FROM bookmarks b \
             JOIN properties p ON p.id = b.property_id \
             WHERE b.user_email = ?1 \
             ORDER BY b.created_at DESC, b.id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let bookmarks = stmt
            .query_map([user_email], |row| {
                let bookmark = Bookmark {
                    id: BookmarkId(parse_uuid(row, 0)?),
                    user_email: row.get(1)?,
                    property: PropertyId(parse_uuid(row, 2)?),
                    created_at: parse_timestamp(row, 3)?,
                };
                let property = property_from_row(row, 4)?;
                Ok(ExpandedBookmark { bookmark, property })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(bookmarks)
    }
}

/// Translate a compiled predicate into a WHERE clause and its bind values
fn where_clause(filter: &PropertyFilter) -> (String, Vec<Value>) {
    let mut conditions: Vec<&str> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    // LIKE is case-insensitive for ASCII in SQLite, matching the original
    // case-insensitive substring semantics; filter text is escaped so
    // `%`/`_` match literally instead of acting as wildcards
    if let Some(name) = &filter.name {
        conditions.push("name LIKE '%' || ? || '%' ESCAPE '\\'");
        params.push(Value::Text(escape_like(name)));
    }
    if let Some(city) = &filter.city {
        conditions.push("city LIKE '%' || ? || '%' ESCAPE '\\'");
        params.push(Value::Text(escape_like(city)));
    }
    if let Some(state) = &filter.state {
        conditions.push("state LIKE '%' || ? || '%' ESCAPE '\\'");
        params.push(Value::Text(escape_like(state)));
    }
    if let Some(min) = filter.min_income {
        conditions.push("monthly_income >= ?");
        params.push(Value::Real(min));
    }
    if let Some(max) = filter.max_income {
        conditions.push("monthly_income <= ?");
        params.push(Value::Real(max));
    }
    if let Some(near) = &filter.near {
        conditions.push("haversine_m(longitude, latitude, ?, ?) <= ?");
        params.push(Value::Real(near.longitude));
        params.push(Value::Real(near.latitude));
        params.push(Value::Real(near.max_distance_m));
    }

    let sql = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    (sql, params)
}

/// Escape LIKE metacharacters so filter text matches as a literal substring
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_uuid(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e))
}

fn parse_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

/// Map a property row starting at column `base`
fn property_from_row(row: &rusqlite::Row, base: usize) -> rusqlite::Result<Property> {
    let sex_str: String = row.get(base + 11)?;
    Ok(Property {
        id: PropertyId(parse_uuid(row, base)?),
        name: row.get(base + 1)?,
        address: Address {
            street: row.get(base + 2)?,
            city: row.get(base + 3)?,
            state: row.get(base + 4)?,
            zip_code: row.get(base + 5)?,
        },
        location: GeoPoint {
            longitude: row.get(base + 6)?,
            latitude: row.get(base + 7)?,
        },
        property_image: row.get(base + 8)?,
        owner_details: OwnerDetails {
            owner_name: row.get(base + 9)?,
            age: row.get(base + 10)?,
            sex: Sex::parse(&sex_str).map_err(|e| conversion_error(base + 11, e))?,
            email: row.get(base + 12)?,
            mobile_number: row.get(base + 13)?,
            occupation: row.get(base + 14)?,
            monthly_income: row.get(base + 15)?,
            total_wealth: row.get(base + 16)?,
            owner_image: row.get(base + 17)?,
        },
        created_at: parse_timestamp(row, base + 18)?,
    })
}
