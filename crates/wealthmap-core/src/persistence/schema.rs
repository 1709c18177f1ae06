//! SQLite schema for the property directory

/// Schema version for migrations
pub const SCHEMA_VERSION: u32 = 1;

/// SQLite schema definition
pub struct Schema;

impl Schema {
    /// Get the complete schema SQL
    pub fn create_tables() -> &'static str {
        r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Properties table
CREATE TABLE IF NOT EXISTS properties (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    street TEXT NOT NULL,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    zip_code TEXT NOT NULL,
    longitude REAL NOT NULL,
    latitude REAL NOT NULL,
    property_image TEXT NOT NULL,
    owner_name TEXT NOT NULL,
    owner_age INTEGER NOT NULL,
    owner_sex TEXT NOT NULL,
    owner_email TEXT NOT NULL,
    owner_mobile TEXT NOT NULL,
    owner_occupation TEXT NOT NULL,
    monthly_income REAL NOT NULL,
    total_wealth REAL NOT NULL,
    owner_image TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_properties_name ON properties(name);
CREATE INDEX IF NOT EXISTS idx_properties_city ON properties(city);
CREATE INDEX IF NOT EXISTS idx_properties_state ON properties(state);
CREATE INDEX IF NOT EXISTS idx_properties_city_state ON properties(city, state);
CREATE INDEX IF NOT EXISTS idx_properties_income ON properties(monthly_income);
CREATE INDEX IF NOT EXISTS idx_properties_income_occupation ON properties(monthly_income, owner_occupation);
CREATE INDEX IF NOT EXISTS idx_properties_created ON properties(created_at);

-- Bookmarks table
--
-- The unique index on (user_email, property_id) is the concurrency-correctness
-- mechanism for bookmark creation; the cascade keeps bookmarks consistent when
-- their property is deleted.
CREATE TABLE IF NOT EXISTS bookmarks (
    id TEXT PRIMARY KEY,
    user_email TEXT NOT NULL,
    property_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (property_id) REFERENCES properties(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_bookmarks_user_property ON bookmarks(user_email, property_id);
CREATE INDEX IF NOT EXISTS idx_bookmarks_user ON bookmarks(user_email);
CREATE INDEX IF NOT EXISTS idx_bookmarks_property ON bookmarks(property_id);
"#
    }

    /// Get migration SQL for a specific version
    pub fn migration(from_version: u32, to_version: u32) -> Option<&'static str> {
        match (from_version, to_version) {
            // Add migrations here as the schema evolves
            _ => None,
        }
    }
}
