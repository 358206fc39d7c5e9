use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::debug;

use super::{ensure_optional, select_where, update_by_id, Columns};
use crate::model::{NewResponseTeam, ResponseTeam, ResponseTeamPatch, TeamFilter};
use crate::validation::FieldError;
use crate::{ReliefError, Result};

fn from_row(row: &Row<'_>) -> rusqlite::Result<ResponseTeam> {
    Ok(ResponseTeam {
        id: row.get("id")?,
        name: row.get("name")?,
        team_type: row.get("team_type")?,
        leader_name: row.get("leader_name")?,
        contact_number: row.get("contact_number")?,
        member_count: row.get("member_count")?,
        status: row.get("status")?,
        assigned_zone_id: row.get("assigned_zone_id")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn list(conn: &Connection, filter: &TeamFilter) -> Result<Vec<ResponseTeam>> {
    let mut columns = Columns::new();
    columns.push("status", filter.status);
    columns.push("assigned_zone_id", filter.zone_id);
    select_where(conn, "response_teams", columns, from_row)
}

pub(crate) fn get(conn: &Connection, id: i64) -> Result<ResponseTeam> {
    conn.query_row("SELECT * FROM response_teams WHERE id = ?1", [id], from_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => ReliefError::not_found("team", id),
            other => other.into(),
        })
}

pub(crate) fn create(conn: &Connection, team: &NewResponseTeam) -> Result<ResponseTeam> {
    ensure_optional(conn, "flood_zones", team.assigned_zone_id, "zone")?;

    let now = Utc::now();
    conn.execute(
        "INSERT INTO response_teams (name, team_type, leader_name, contact_number, member_count,
                                     status, assigned_zone_id, latitude, longitude,
                                     created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        params![
            team.name.trim(),
            team.team_type.trim(),
            team.leader_name.trim(),
            team.contact_number,
            team.member_count.unwrap_or(1),
            team.status.unwrap_or_default(),
            team.assigned_zone_id,
            team.latitude,
            team.longitude,
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(target: "store", team_id = id, "Response team created");
    get(conn, id)
}

pub(crate) fn update(conn: &Connection, id: i64, patch: &ResponseTeamPatch) -> Result<ResponseTeam> {
    ensure_optional(conn, "flood_zones", patch.assigned_zone_id, "zone")?;

    // A position is either complete or absent once merged with the stored row
    if patch.latitude.is_some() != patch.longitude.is_some() {
        let current = get(conn, id)?;
        let latitude = patch.latitude.or(current.latitude);
        let longitude = patch.longitude.or(current.longitude);
        if latitude.is_some() != longitude.is_some() {
            return Err(ReliefError::Validation(vec![FieldError::new(
                "latitude",
                "latitude and longitude must be given together",
            )]));
        }
    }

    let mut columns = Columns::new();
    columns.push("name", patch.name.as_deref().map(|s| s.trim().to_string()));
    columns.push("team_type", patch.team_type.as_deref().map(|s| s.trim().to_string()));
    columns.push(
        "leader_name",
        patch.leader_name.as_deref().map(|s| s.trim().to_string()),
    );
    columns.push("contact_number", patch.contact_number.clone());
    columns.push("member_count", patch.member_count);
    columns.push("status", patch.status);
    columns.push("assigned_zone_id", patch.assigned_zone_id);
    columns.push("latitude", patch.latitude);
    columns.push("longitude", patch.longitude);

    if !update_by_id(conn, "response_teams", id, columns, true)? {
        return Err(ReliefError::not_found("team", id));
    }
    get(conn, id)
}
