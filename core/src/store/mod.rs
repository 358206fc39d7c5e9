//! Relational storage (SQLite)
//!
//! One connection guarded by an async mutex. Each table lives in its own
//! submodule as plain functions over `&Connection`; `Store` wraps them so
//! handlers only ever hold the lock for a single statement or transaction.
//!
//! - Lists are newest first.
//! - Patches touch only the fields present and bump `updated_at`.
//! - Foreign keys are checked up front so a bad reference reports which
//!   field was wrong instead of a bare constraint failure.

mod alerts;
mod distributions;
mod population;
mod resources;
mod schema;
mod teams;
mod users;
mod zones;

use chrono::{Duration, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params_from_iter, Connection};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::model::*;
use crate::stats::{self, DashboardStats};
use crate::{ReliefError, Result};

/// Handle to the relief database. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (or create) the database file and apply the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        schema::apply_schema(&conn)?;

        info!(target: "store", path = %path.display(), "Database opened");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::apply_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    // ----- flood zones -----

    pub async fn list_zones(&self, filter: &ZoneFilter) -> Result<Vec<FloodZone>> {
        let conn = self.conn.lock().await;
        zones::list(&conn, filter)
    }

    pub async fn get_zone(&self, id: i64) -> Result<FloodZone> {
        let conn = self.conn.lock().await;
        zones::get(&conn, id)
    }

    pub async fn create_zone(&self, zone: &NewFloodZone) -> Result<FloodZone> {
        let conn = self.conn.lock().await;
        zones::create(&conn, zone)
    }

    pub async fn update_zone(&self, id: i64, patch: &FloodZonePatch) -> Result<FloodZone> {
        let conn = self.conn.lock().await;
        zones::update(&conn, id, patch)
    }

    // ----- affected population -----

    pub async fn list_population(&self, filter: &PopulationFilter) -> Result<Vec<AffectedPerson>> {
        let conn = self.conn.lock().await;
        population::list(&conn, filter)
    }

    pub async fn get_person(&self, id: i64) -> Result<AffectedPerson> {
        let conn = self.conn.lock().await;
        population::get(&conn, id)
    }

    pub async fn create_person(
        &self,
        person: &NewAffectedPerson,
        registered_by: Option<&str>,
    ) -> Result<AffectedPerson> {
        let conn = self.conn.lock().await;
        population::create(&conn, person, registered_by)
    }

    pub async fn update_person(
        &self,
        id: i64,
        patch: &AffectedPersonPatch,
    ) -> Result<AffectedPerson> {
        let conn = self.conn.lock().await;
        population::update(&conn, id, patch)
    }

    // ----- relief resources -----

    pub async fn list_resources(&self) -> Result<Vec<ReliefResource>> {
        let conn = self.conn.lock().await;
        resources::list(&conn)
    }

    pub async fn get_resource(&self, id: i64) -> Result<ReliefResource> {
        let conn = self.conn.lock().await;
        resources::get(&conn, id)
    }

    pub async fn create_resource(&self, resource: &NewReliefResource) -> Result<ReliefResource> {
        let conn = self.conn.lock().await;
        resources::create(&conn, resource)
    }

    pub async fn update_resource(
        &self,
        id: i64,
        patch: &ReliefResourcePatch,
    ) -> Result<ReliefResource> {
        let mut conn = self.conn.lock().await;
        resources::update(&mut conn, id, patch)
    }

    // ----- distributions -----

    pub async fn list_distributions(&self, filter: &DistributionFilter) -> Result<Vec<Distribution>> {
        let conn = self.conn.lock().await;
        distributions::list(&conn, filter)
    }

    pub async fn get_distribution(&self, id: i64) -> Result<Distribution> {
        let conn = self.conn.lock().await;
        distributions::get(&conn, id)
    }

    /// Logs a distribution and draws the stock down in one transaction.
    pub async fn create_distribution(
        &self,
        distribution: &NewDistribution,
        distributed_by: Option<&str>,
    ) -> Result<Distribution> {
        let mut conn = self.conn.lock().await;
        distributions::create(&mut conn, distribution, distributed_by)
    }

    pub async fn update_distribution(
        &self,
        id: i64,
        patch: &DistributionPatch,
    ) -> Result<Distribution> {
        let conn = self.conn.lock().await;
        distributions::update(&conn, id, patch)
    }

    // ----- weather alerts -----

    pub async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<WeatherAlert>> {
        let conn = self.conn.lock().await;
        alerts::list(&conn, filter)
    }

    pub async fn get_alert(&self, id: i64) -> Result<WeatherAlert> {
        let conn = self.conn.lock().await;
        alerts::get(&conn, id)
    }

    pub async fn create_alert(
        &self,
        alert: &NewWeatherAlert,
        issued_by: Option<&str>,
    ) -> Result<WeatherAlert> {
        let conn = self.conn.lock().await;
        alerts::create(&conn, alert, issued_by)
    }

    pub async fn update_alert(&self, id: i64, patch: &WeatherAlertPatch) -> Result<WeatherAlert> {
        let conn = self.conn.lock().await;
        alerts::update(&conn, id, patch)
    }

    // ----- response teams -----

    pub async fn list_teams(&self, filter: &TeamFilter) -> Result<Vec<ResponseTeam>> {
        let conn = self.conn.lock().await;
        teams::list(&conn, filter)
    }

    pub async fn get_team(&self, id: i64) -> Result<ResponseTeam> {
        let conn = self.conn.lock().await;
        teams::get(&conn, id)
    }

    pub async fn create_team(&self, team: &NewResponseTeam) -> Result<ResponseTeam> {
        let conn = self.conn.lock().await;
        teams::create(&conn, team)
    }

    pub async fn update_team(&self, id: i64, patch: &ResponseTeamPatch) -> Result<ResponseTeam> {
        let conn = self.conn.lock().await;
        teams::update(&conn, id, patch)
    }

    // ----- users and sessions -----

    pub async fn upsert_user(&self, user: &UpsertUser) -> Result<User> {
        let conn = self.conn.lock().await;
        users::upsert(&conn, user)
    }

    pub async fn get_user(&self, id: &str) -> Result<User> {
        let conn = self.conn.lock().await;
        users::get(&conn, id)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock().await;
        users::list(&conn)
    }

    pub async fn update_profile(&self, id: &str, patch: &ProfilePatch) -> Result<User> {
        let conn = self.conn.lock().await;
        users::update_profile(&conn, id, patch)
    }

    pub async fn set_user_role(&self, id: &str, role: UserRole) -> Result<User> {
        let conn = self.conn.lock().await;
        users::set_role(&conn, id, role)
    }

    pub async fn create_session(&self, user_id: &str, ttl: Duration) -> Result<Session> {
        let conn = self.conn.lock().await;
        users::create_session(&conn, user_id, ttl)
    }

    /// Resolves a session token to its user; expired sessions resolve to `None`.
    pub async fn session_user(&self, token: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().await;
        users::session_user(&conn, token, Utc::now())
    }

    pub async fn delete_session(&self, token: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        users::delete_session(&conn, token)
    }

    pub async fn purge_expired_sessions(&self) -> Result<usize> {
        let conn = self.conn.lock().await;
        users::purge_expired(&conn, Utc::now())
    }

    // ----- dashboard -----

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let conn = self.conn.lock().await;
        stats::compute(&conn)
    }
}

/// Column/value pairs for dynamic `WHERE` and `SET` clauses.
#[derive(Default)]
pub(crate) struct Columns {
    names: Vec<&'static str>,
    values: Vec<Box<dyn ToSql>>,
}

impl Columns {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds the column only when a value is present.
    pub(crate) fn push<T: ToSql + 'static>(&mut self, name: &'static str, value: Option<T>) {
        if let Some(v) = value {
            self.names.push(name);
            self.values.push(Box::new(v));
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn where_clause(&self) -> String {
        if self.names.is_empty() {
            String::new()
        } else {
            let conds: Vec<String> = self.names.iter().map(|n| format!("{n} = ?")).collect();
            format!(" WHERE {}", conds.join(" AND "))
        }
    }

    fn set_clause(&self) -> String {
        let sets: Vec<String> = self.names.iter().map(|n| format!("{n} = ?")).collect();
        sets.join(", ")
    }
}

/// `SELECT * FROM {table} [WHERE ...] ORDER BY id DESC`
pub(crate) fn select_where<T, F>(
    conn: &Connection,
    table: &str,
    filter: Columns,
    map: F,
) -> Result<Vec<T>>
where
    F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
{
    let sql = format!(
        "SELECT * FROM {table}{} ORDER BY id DESC",
        filter.where_clause()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(filter.values.iter()), map)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Applies the given assignments to one row keyed by `id`.
/// Returns `false` when no row matched.
pub(crate) fn update_by_id<K: ToSql + 'static>(
    conn: &Connection,
    table: &str,
    key: K,
    mut assignments: Columns,
    touch_updated_at: bool,
) -> Result<bool> {
    if touch_updated_at {
        assignments.push("updated_at", Some(Utc::now()));
    }
    if assignments.is_empty() {
        return Ok(true);
    }

    let sql = format!("UPDATE {table} SET {} WHERE id = ?", assignments.set_clause());
    assignments.values.push(Box::new(key));
    let changed = conn.execute(&sql, params_from_iter(assignments.values.iter()))?;
    Ok(changed > 0)
}

/// Fails with `NotFound` naming `what` when the referenced row is missing.
pub(crate) fn ensure_exists(conn: &Connection, table: &str, id: i64, what: &str) -> Result<()> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)");
    let exists: bool = conn.query_row(&sql, [id], |row| row.get(0))?;
    if exists {
        Ok(())
    } else {
        Err(ReliefError::not_found(what, id))
    }
}

pub(crate) fn ensure_optional(
    conn: &Connection,
    table: &str,
    id: Option<i64>,
    what: &str,
) -> Result<()> {
    match id {
        Some(id) => ensure_exists(conn, table, id, what),
        None => Ok(()),
    }
}
