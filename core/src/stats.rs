//! Dashboard statistics
//!
//! Headline numbers for the dashboard cards. All values are plain aggregates
//! over the current tables; nothing is cached.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Flood zones currently marked active
    pub active_zones: i64,
    /// Registered affected individuals
    pub affected_population: i64,
    /// Percentage of all stocked units already handed out (0-100)
    pub distribution_rate: i64,
    pub response_teams: i64,
    pub active_alerts: i64,
    pub deployed_teams: i64,
    /// People evacuated or already in a shelter
    pub evacuated_count: i64,
    pub total_resources: i64,
}

/// Rounded percentage of distributed over stocked; 0 when nothing is stocked.
pub fn distribution_rate(distributed: i64, total: i64) -> i64 {
    percent(distributed as f64, total as f64)
}

fn percent(distributed: f64, total: f64) -> i64 {
    if total <= 0.0 {
        return 0;
    }
    ((distributed / total) * 100.0).round() as i64
}

fn count(conn: &Connection, sql: &str) -> Result<i64> {
    Ok(conn.query_row(sql, [], |row| row.get(0))?)
}

pub(crate) fn compute(conn: &Connection) -> Result<DashboardStats> {
    // TOTAL() sums as REAL and cannot overflow
    let (total, distributed): (f64, f64) = conn.query_row(
        "SELECT TOTAL(quantity), TOTAL(distributed) FROM relief_resources",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(DashboardStats {
        active_zones: count(conn, "SELECT COUNT(*) FROM flood_zones WHERE is_active = 1")?,
        affected_population: count(conn, "SELECT COUNT(*) FROM affected_population")?,
        distribution_rate: percent(distributed, total),
        response_teams: count(conn, "SELECT COUNT(*) FROM response_teams")?,
        active_alerts: count(conn, "SELECT COUNT(*) FROM weather_alerts WHERE is_active = 1")?,
        deployed_teams: count(
            conn,
            "SELECT COUNT(*) FROM response_teams WHERE status = 'deployed'",
        )?,
        evacuated_count: count(
            conn,
            "SELECT COUNT(*) FROM affected_population
             WHERE evacuation_status IN ('evacuated', 'sheltered')",
        )?,
        total_resources: count(conn, "SELECT COUNT(*) FROM relief_resources")?,
    })
}
