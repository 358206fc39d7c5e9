use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::debug;

use super::{ensure_optional, select_where, update_by_id, Columns};
use crate::model::{AffectedPerson, AffectedPersonPatch, NewAffectedPerson, PopulationFilter};
use crate::{ReliefError, Result};

fn from_row(row: &Row<'_>) -> rusqlite::Result<AffectedPerson> {
    Ok(AffectedPerson {
        id: row.get("id")?,
        full_name: row.get("full_name")?,
        age: row.get("age")?,
        gender: row.get("gender")?,
        contact_number: row.get("contact_number")?,
        address: row.get("address")?,
        zone_id: row.get("zone_id")?,
        family_size: row.get("family_size")?,
        evacuation_status: row.get("evacuation_status")?,
        priority: row.get("priority")?,
        medical_needs: row.get("medical_needs")?,
        registered_by: row.get("registered_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn list(conn: &Connection, filter: &PopulationFilter) -> Result<Vec<AffectedPerson>> {
    let mut columns = Columns::new();
    columns.push("zone_id", filter.zone_id);
    columns.push("evacuation_status", filter.evacuation_status);
    columns.push("priority", filter.priority);
    select_where(conn, "affected_population", columns, from_row)
}

pub(crate) fn get(conn: &Connection, id: i64) -> Result<AffectedPerson> {
    conn.query_row(
        "SELECT * FROM affected_population WHERE id = ?1",
        [id],
        from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => ReliefError::not_found("person", id),
        other => other.into(),
    })
}

pub(crate) fn create(
    conn: &Connection,
    person: &NewAffectedPerson,
    registered_by: Option<&str>,
) -> Result<AffectedPerson> {
    ensure_optional(conn, "flood_zones", person.zone_id, "zone")?;

    let now = Utc::now();
    conn.execute(
        "INSERT INTO affected_population (full_name, age, gender, contact_number, address, zone_id,
                                          family_size, evacuation_status, priority, medical_needs,
                                          registered_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
        params![
            person.full_name.trim(),
            person.age,
            person.gender,
            person.contact_number,
            person.address,
            person.zone_id,
            person.family_size.unwrap_or(1),
            person.evacuation_status.unwrap_or_default(),
            person.priority.unwrap_or_default(),
            person.medical_needs,
            registered_by,
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(target: "store", person_id = id, zone_id = ?person.zone_id, "Affected person registered");
    get(conn, id)
}

pub(crate) fn update(
    conn: &Connection,
    id: i64,
    patch: &AffectedPersonPatch,
) -> Result<AffectedPerson> {
    ensure_optional(conn, "flood_zones", patch.zone_id, "zone")?;

    let mut columns = Columns::new();
    columns.push("full_name", patch.full_name.as_deref().map(|s| s.trim().to_string()));
    columns.push("age", patch.age);
    columns.push("gender", patch.gender.clone());
    columns.push("contact_number", patch.contact_number.clone());
    columns.push("address", patch.address.clone());
    columns.push("zone_id", patch.zone_id);
    columns.push("family_size", patch.family_size);
    columns.push("evacuation_status", patch.evacuation_status);
    columns.push("priority", patch.priority);
    columns.push("medical_needs", patch.medical_needs.clone());

    if !update_by_id(conn, "affected_population", id, columns, true)? {
        return Err(ReliefError::not_found("person", id));
    }
    get(conn, id)
}
