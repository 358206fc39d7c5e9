use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::{debug, warn};

use super::{ensure_optional, select_where, update_by_id, Columns};
use crate::model::{NewReliefResource, ReliefResource, ReliefResourcePatch};
use crate::{ReliefError, Result};

pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<ReliefResource> {
    Ok(ReliefResource {
        id: row.get("id")?,
        name: row.get("name")?,
        resource_type: row.get("resource_type")?,
        quantity: row.get("quantity")?,
        unit: row.get("unit")?,
        distributed: row.get("distributed")?,
        location: row.get("location")?,
        zone_id: row.get("zone_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn list(conn: &Connection) -> Result<Vec<ReliefResource>> {
    select_where(conn, "relief_resources", Columns::new(), from_row)
}

pub(crate) fn get(conn: &Connection, id: i64) -> Result<ReliefResource> {
    conn.query_row(
        "SELECT * FROM relief_resources WHERE id = ?1",
        [id],
        from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => ReliefError::not_found("resource", id),
        other => other.into(),
    })
}

pub(crate) fn create(conn: &Connection, resource: &NewReliefResource) -> Result<ReliefResource> {
    ensure_optional(conn, "flood_zones", resource.zone_id, "zone")?;

    let now = Utc::now();
    conn.execute(
        "INSERT INTO relief_resources (name, resource_type, quantity, unit, distributed,
                                       location, zone_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?7)",
        params![
            resource.name.trim(),
            resource.resource_type.trim(),
            resource.quantity,
            resource.unit.trim(),
            resource.location,
            resource.zone_id,
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(target: "store", resource_id = id, quantity = resource.quantity, "Relief resource added");
    get(conn, id)
}

pub(crate) fn update(
    conn: &mut Connection,
    id: i64,
    patch: &ReliefResourcePatch,
) -> Result<ReliefResource> {
    let tx = conn.transaction()?;
    ensure_optional(&tx, "flood_zones", patch.zone_id, "zone")?;

    let current = get(&tx, id)?;
    if let Some(quantity) = patch.quantity {
        if quantity < current.distributed {
            warn!(
                target: "store",
                resource_id = id,
                quantity,
                distributed = current.distributed,
                "Rejected stock reduction below distributed amount"
            );
            return Err(ReliefError::Conflict(format!(
                "quantity {quantity} is below the {} {} already distributed",
                current.distributed, current.unit
            )));
        }
    }

    let mut columns = Columns::new();
    columns.push("name", patch.name.as_deref().map(|s| s.trim().to_string()));
    columns.push(
        "resource_type",
        patch.resource_type.as_deref().map(|s| s.trim().to_string()),
    );
    columns.push("quantity", patch.quantity);
    columns.push("unit", patch.unit.as_deref().map(|s| s.trim().to_string()));
    columns.push("location", patch.location.clone());
    columns.push("zone_id", patch.zone_id);

    update_by_id(&tx, "relief_resources", id, columns, true)?;
    let updated = get(&tx, id)?;
    tx.commit()?;
    Ok(updated)
}
