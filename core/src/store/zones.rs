use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::debug;

use super::{select_where, update_by_id, Columns};
use crate::model::zone::DEFAULT_RADIUS_METERS;
use crate::model::{FloodZone, FloodZonePatch, NewFloodZone, ZoneFilter};
use crate::{ReliefError, Result};

fn from_row(row: &Row<'_>) -> rusqlite::Result<FloodZone> {
    Ok(FloodZone {
        id: row.get("id")?,
        name: row.get("name")?,
        district: row.get("district")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        radius_meters: row.get("radius_meters")?,
        risk_level: row.get("risk_level")?,
        water_level_cm: row.get("water_level_cm")?,
        description: row.get("description")?,
        is_active: row.get("is_active")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn list(conn: &Connection, filter: &ZoneFilter) -> Result<Vec<FloodZone>> {
    let mut columns = Columns::new();
    columns.push("is_active", filter.active);
    columns.push("district", filter.district.clone());
    select_where(conn, "flood_zones", columns, from_row)
}

pub(crate) fn get(conn: &Connection, id: i64) -> Result<FloodZone> {
    conn.query_row("SELECT * FROM flood_zones WHERE id = ?1", [id], from_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => ReliefError::not_found("zone", id),
            other => other.into(),
        })
}

pub(crate) fn create(conn: &Connection, zone: &NewFloodZone) -> Result<FloodZone> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO flood_zones (name, district, latitude, longitude, radius_meters, risk_level,
                                  water_level_cm, description, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        params![
            zone.name.trim(),
            zone.district.trim(),
            zone.latitude,
            zone.longitude,
            zone.radius_meters.unwrap_or(DEFAULT_RADIUS_METERS),
            zone.risk_level,
            zone.water_level_cm,
            zone.description,
            zone.is_active.unwrap_or(true),
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(target: "store", zone_id = id, risk = %zone.risk_level, "Flood zone created");
    get(conn, id)
}

pub(crate) fn update(conn: &Connection, id: i64, patch: &FloodZonePatch) -> Result<FloodZone> {
    let mut columns = Columns::new();
    columns.push("name", patch.name.as_deref().map(|s| s.trim().to_string()));
    columns.push("district", patch.district.as_deref().map(|s| s.trim().to_string()));
    columns.push("latitude", patch.latitude);
    columns.push("longitude", patch.longitude);
    columns.push("radius_meters", patch.radius_meters);
    columns.push("risk_level", patch.risk_level);
    columns.push("water_level_cm", patch.water_level_cm);
    columns.push("description", patch.description.clone());
    columns.push("is_active", patch.is_active);

    if !update_by_id(conn, "flood_zones", id, columns, true)? {
        return Err(ReliefError::not_found("zone", id));
    }
    get(conn, id)
}
