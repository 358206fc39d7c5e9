use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::{debug, info};
use uuid::Uuid;

use super::{update_by_id, Columns};
use crate::model::{ProfilePatch, Session, UpsertUser, User, UserRole};
use crate::{ReliefError, Result};

fn from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        profile_image_url: row.get("profile_image_url")?,
        organization: row.get("organization")?,
        role: row.get("role")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Inserts a first-time user or refreshes identity claims; role and
/// organization are owned by this system and left untouched.
pub(crate) fn upsert(conn: &Connection, user: &UpsertUser) -> Result<User> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO users (id, email, first_name, last_name, profile_image_url, role,
                            created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
         ON CONFLICT(id) DO UPDATE SET
           email = COALESCE(excluded.email, users.email),
           first_name = COALESCE(excluded.first_name, users.first_name),
           last_name = COALESCE(excluded.last_name, users.last_name),
           profile_image_url = COALESCE(excluded.profile_image_url, users.profile_image_url),
           updated_at = excluded.updated_at",
        params![
            user.id,
            user.email,
            user.first_name,
            user.last_name,
            user.profile_image_url,
            UserRole::default(),
            now,
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(ref err, _) if err.code == ErrorCode::ConstraintViolation => {
            ReliefError::Conflict("email is already registered to another user".to_string())
        }
        other => other.into(),
    })?;

    debug!(target: "store", user_id = %user.id, "User upserted");
    get(conn, &user.id)
}

pub(crate) fn get(conn: &Connection, id: &str) -> Result<User> {
    conn.query_row("SELECT * FROM users WHERE id = ?1", [id], from_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => ReliefError::not_found("user", id),
            other => other.into(),
        })
}

pub(crate) fn list(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare("SELECT * FROM users ORDER BY created_at DESC")?;
    let rows = stmt.query_map([], from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub(crate) fn update_profile(conn: &Connection, id: &str, patch: &ProfilePatch) -> Result<User> {
    let mut columns = Columns::new();
    columns.push("first_name", patch.first_name.clone());
    columns.push("last_name", patch.last_name.clone());
    columns.push("organization", patch.organization.clone());

    if !update_by_id(conn, "users", id.to_string(), columns, true)? {
        return Err(ReliefError::not_found("user", id));
    }
    get(conn, id)
}

pub(crate) fn set_role(conn: &Connection, id: &str, role: UserRole) -> Result<User> {
    let mut columns = Columns::new();
    columns.push("role", Some(role));

    if !update_by_id(conn, "users", id.to_string(), columns, true)? {
        return Err(ReliefError::not_found("user", id));
    }
    info!(target: "store", user_id = %id, role = %role, "User role changed");
    get(conn, id)
}

pub(crate) fn create_session(conn: &Connection, user_id: &str, ttl: Duration) -> Result<Session> {
    let session = Session {
        token: Uuid::new_v4().simple().to_string(),
        user_id: user_id.to_string(),
        expires_at: Utc::now() + ttl,
    };
    conn.execute(
        "INSERT INTO sessions (sid, user_id, expires_at) VALUES (?1, ?2, ?3)",
        params![session.token, session.user_id, session.expires_at],
    )?;
    Ok(session)
}

pub(crate) fn session_user(
    conn: &Connection,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<User>> {
    let found: Option<(String, DateTime<Utc>)> = conn
        .query_row(
            "SELECT user_id, expires_at FROM sessions WHERE sid = ?1",
            [token],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match found {
        Some((user_id, expires_at)) if expires_at > now => Ok(Some(get(conn, &user_id)?)),
        _ => Ok(None),
    }
}

pub(crate) fn delete_session(conn: &Connection, token: &str) -> Result<bool> {
    let removed = conn.execute("DELETE FROM sessions WHERE sid = ?1", [token])?;
    Ok(removed > 0)
}

/// Expiry is compared in Rust so the stored timestamp format never matters.
pub(crate) fn purge_expired(conn: &Connection, now: DateTime<Utc>) -> Result<usize> {
    let expired: Vec<String> = {
        let mut stmt = conn.prepare("SELECT sid, expires_at FROM sessions")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, DateTime<Utc>>(1)?))
        })?;
        let expired = rows
            .filter_map(|r| r.ok())
            .filter(|(_, expires_at)| *expires_at <= now)
            .map(|(sid, _)| sid)
            .collect();
        expired
    };

    for sid in &expired {
        conn.execute("DELETE FROM sessions WHERE sid = ?1", [sid])?;
    }
    if !expired.is_empty() {
        info!(target: "store", purged = expired.len(), "Expired sessions purged");
    }
    Ok(expired.len())
}
