//! Geospatial distance math and its SQL binding

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// Mean Earth radius in meters (IUGG)
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance in meters between two WGS 84 points
pub fn haversine_meters(lng1: f64, lat1: f64, lng2: f64, lat2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

/// Register the `haversine_m(lng1, lat1, lng2, lat2)` scalar function
///
/// Marked deterministic so SQLite may reuse results within a statement; lets
/// radius filtering and distance ordering run inside the query itself.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "haversine_m",
        4,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let lng1: f64 = ctx.get(0)?;
            let lat1: f64 = ctx.get(1)?;
            let lng2: f64 = ctx.get(2)?;
            let lat2: f64 = ctx.get(3)?;
            Ok(haversine_meters(lng1, lat1, lng2, lat2))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        assert_eq!(haversine_meters(-122.42, 37.77, -122.42, 37.77), 0.0);
    }

    #[test]
    fn test_known_distance_sf_to_la() {
        // San Francisco to Los Angeles, roughly 559 km
        let d = haversine_meters(-122.4194, 37.7749, -118.2437, 34.0522);
        assert!((d - 559_000.0).abs() < 5_000.0, "got {d}");
    }

    #[test]
    fn test_symmetry() {
        let d1 = haversine_meters(-122.42, 37.77, -73.99, 40.73);
        let d2 = haversine_meters(-73.99, 40.73, -122.42, 37.77);
        assert!((d1 - d2).abs() < 1e-6);
    }

    #[test]
    fn test_sql_function_matches_native() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        register_functions(&conn).unwrap();
        let from_sql: f64 = conn
            .query_row(
                "SELECT haversine_m(-122.4194, 37.7749, -118.2437, 34.0522)",
                [],
                |row| row.get(0),
            )
            .unwrap();
        let native = haversine_meters(-122.4194, 37.7749, -118.2437, 34.0522);
        assert!((from_sql - native).abs() < 1e-9);
    }
}
