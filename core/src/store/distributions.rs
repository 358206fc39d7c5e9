use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::{info, warn};

use super::{ensure_optional, resources, select_where, update_by_id, Columns};
use crate::model::{Distribution, DistributionFilter, DistributionPatch, NewDistribution};
use crate::{ReliefError, Result};

fn from_row(row: &Row<'_>) -> rusqlite::Result<Distribution> {
    Ok(Distribution {
        id: row.get("id")?,
        resource_id: row.get("resource_id")?,
        zone_id: row.get("zone_id")?,
        population_id: row.get("population_id")?,
        quantity: row.get("quantity")?,
        recipient_count: row.get("recipient_count")?,
        notes: row.get("notes")?,
        distributed_by: row.get("distributed_by")?,
        distributed_at: row.get("distributed_at")?,
    })
}

pub(crate) fn list(conn: &Connection, filter: &DistributionFilter) -> Result<Vec<Distribution>> {
    let mut columns = Columns::new();
    columns.push("resource_id", filter.resource_id);
    columns.push("zone_id", filter.zone_id);
    select_where(conn, "distributions", columns, from_row)
}

pub(crate) fn get(conn: &Connection, id: i64) -> Result<Distribution> {
    conn.query_row("SELECT * FROM distributions WHERE id = ?1", [id], from_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => ReliefError::not_found("distribution", id),
            other => other.into(),
        })
}

pub(crate) fn create(
    conn: &mut Connection,
    distribution: &NewDistribution,
    distributed_by: Option<&str>,
) -> Result<Distribution> {
    let tx = conn.transaction()?;

    ensure_optional(&tx, "flood_zones", distribution.zone_id, "zone")?;
    ensure_optional(
        &tx,
        "affected_population",
        distribution.population_id,
        "person",
    )?;

    let resource = resources::get(&tx, distribution.resource_id)?;
    if resource.available() < distribution.quantity {
        warn!(
            target: "store",
            resource_id = resource.id,
            requested = distribution.quantity,
            available = resource.available(),
            "Insufficient stock for distribution"
        );
        return Err(ReliefError::Conflict(format!(
            "insufficient stock: {} {} of {} available",
            resource.available(),
            resource.unit,
            resource.name
        )));
    }

    let now = Utc::now();
    tx.execute(
        "UPDATE relief_resources SET distributed = distributed + ?1, updated_at = ?2 WHERE id = ?3",
        params![distribution.quantity, now, resource.id],
    )?;
    tx.execute(
        "INSERT INTO distributions (resource_id, zone_id, population_id, quantity,
                                    recipient_count, notes, distributed_by, distributed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            distribution.resource_id,
            distribution.zone_id,
            distribution.population_id,
            distribution.quantity,
            distribution.recipient_count.unwrap_or(1),
            distribution.notes,
            distributed_by,
            now,
        ],
    )?;
    let id = tx.last_insert_rowid();
    let created = get(&tx, id)?;
    tx.commit()?;

    info!(
        target: "store",
        distribution_id = id,
        resource_id = resource.id,
        quantity = distribution.quantity,
        "Distribution logged"
    );
    Ok(created)
}

pub(crate) fn update(conn: &Connection, id: i64, patch: &DistributionPatch) -> Result<Distribution> {
    let mut columns = Columns::new();
    columns.push("recipient_count", patch.recipient_count);
    columns.push("notes", patch.notes.clone());

    if !update_by_id(conn, "distributions", id, columns, false)? {
        return Err(ReliefError::not_found("distribution", id));
    }
    get(conn, id)
}
