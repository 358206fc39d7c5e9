use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::info;

use super::{ensure_optional, select_where, update_by_id, Columns};
use crate::model::{AlertFilter, NewWeatherAlert, WeatherAlert, WeatherAlertPatch};
use crate::{ReliefError, Result};

fn from_row(row: &Row<'_>) -> rusqlite::Result<WeatherAlert> {
    Ok(WeatherAlert {
        id: row.get("id")?,
        title: row.get("title")?,
        message: row.get("message")?,
        alert_type: row.get("alert_type")?,
        severity: row.get("severity")?,
        zone_id: row.get("zone_id")?,
        is_active: row.get("is_active")?,
        valid_until: row.get("valid_until")?,
        issued_by: row.get("issued_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn list(conn: &Connection, filter: &AlertFilter) -> Result<Vec<WeatherAlert>> {
    let mut columns = Columns::new();
    columns.push("is_active", filter.active);
    columns.push("severity", filter.severity);
    columns.push("zone_id", filter.zone_id);
    select_where(conn, "weather_alerts", columns, from_row)
}

pub(crate) fn get(conn: &Connection, id: i64) -> Result<WeatherAlert> {
    conn.query_row("SELECT * FROM weather_alerts WHERE id = ?1", [id], from_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => ReliefError::not_found("alert", id),
            other => other.into(),
        })
}

pub(crate) fn create(
    conn: &Connection,
    alert: &NewWeatherAlert,
    issued_by: Option<&str>,
) -> Result<WeatherAlert> {
    ensure_optional(conn, "flood_zones", alert.zone_id, "zone")?;

    let now = Utc::now();
    conn.execute(
        "INSERT INTO weather_alerts (title, message, alert_type, severity, zone_id, is_active,
                                     valid_until, issued_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            alert.title.trim(),
            alert.message.trim(),
            alert.alert_type.trim(),
            alert.severity,
            alert.zone_id,
            alert.is_active.unwrap_or(true),
            alert.valid_until,
            issued_by,
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(target: "store", alert_id = id, severity = %alert.severity, "Weather alert issued");
    get(conn, id)
}

pub(crate) fn update(conn: &Connection, id: i64, patch: &WeatherAlertPatch) -> Result<WeatherAlert> {
    ensure_optional(conn, "flood_zones", patch.zone_id, "zone")?;

    let mut columns = Columns::new();
    columns.push("title", patch.title.as_deref().map(|s| s.trim().to_string()));
    columns.push("message", patch.message.as_deref().map(|s| s.trim().to_string()));
    columns.push("alert_type", patch.alert_type.as_deref().map(|s| s.trim().to_string()));
    columns.push("severity", patch.severity);
    columns.push("zone_id", patch.zone_id);
    columns.push("is_active", patch.is_active);
    columns.push("valid_until", patch.valid_until);

    if !update_by_id(conn, "weather_alerts", id, columns, true)? {
        return Err(ReliefError::not_found("alert", id));
    }
    get(conn, id)
}
