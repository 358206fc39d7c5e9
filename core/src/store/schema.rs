use rusqlite::Connection;

/// Idempotent; safe to run on every start.
pub(crate) fn apply_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS users (
          id TEXT PRIMARY KEY,
          email TEXT UNIQUE,
          first_name TEXT,
          last_name TEXT,
          profile_image_url TEXT,
          organization TEXT,
          role TEXT NOT NULL DEFAULT 'field_worker',
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
          sid TEXT PRIMARY KEY,
          user_id TEXT NOT NULL,
          expires_at TEXT NOT NULL,
          FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_expire ON sessions(expires_at);

        CREATE TABLE IF NOT EXISTS flood_zones (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          district TEXT NOT NULL,
          latitude REAL NOT NULL,
          longitude REAL NOT NULL,
          radius_meters INTEGER NOT NULL DEFAULT 1000,
          risk_level TEXT NOT NULL,
          water_level_cm REAL,
          description TEXT,
          is_active INTEGER NOT NULL DEFAULT 1,
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS affected_population (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          full_name TEXT NOT NULL,
          age INTEGER,
          gender TEXT,
          contact_number TEXT,
          address TEXT,
          zone_id INTEGER,
          family_size INTEGER NOT NULL DEFAULT 1,
          evacuation_status TEXT NOT NULL DEFAULT 'not_evacuated',
          priority TEXT NOT NULL DEFAULT 'medium',
          medical_needs TEXT,
          registered_by TEXT,
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL,
          FOREIGN KEY(zone_id) REFERENCES flood_zones(id),
          FOREIGN KEY(registered_by) REFERENCES users(id)
        );

        CREATE TABLE IF NOT EXISTS relief_resources (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          resource_type TEXT NOT NULL,
          quantity INTEGER NOT NULL,
          unit TEXT NOT NULL,
          distributed INTEGER NOT NULL DEFAULT 0,
          location TEXT,
          zone_id INTEGER,
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL,
          CHECK (distributed >= 0 AND distributed <= quantity),
          FOREIGN KEY(zone_id) REFERENCES flood_zones(id)
        );

        CREATE TABLE IF NOT EXISTS distributions (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          resource_id INTEGER NOT NULL,
          zone_id INTEGER,
          population_id INTEGER,
          quantity INTEGER NOT NULL,
          recipient_count INTEGER NOT NULL DEFAULT 1,
          notes TEXT,
          distributed_by TEXT,
          distributed_at TEXT NOT NULL,
          FOREIGN KEY(resource_id) REFERENCES relief_resources(id),
          FOREIGN KEY(zone_id) REFERENCES flood_zones(id),
          FOREIGN KEY(population_id) REFERENCES affected_population(id),
          FOREIGN KEY(distributed_by) REFERENCES users(id)
        );

        CREATE TABLE IF NOT EXISTS weather_alerts (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          title TEXT NOT NULL,
          message TEXT NOT NULL,
          alert_type TEXT NOT NULL,
          severity TEXT NOT NULL,
          zone_id INTEGER,
          is_active INTEGER NOT NULL DEFAULT 1,
          valid_until TEXT,
          issued_by TEXT,
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL,
          FOREIGN KEY(zone_id) REFERENCES flood_zones(id),
          FOREIGN KEY(issued_by) REFERENCES users(id)
        );

        CREATE TABLE IF NOT EXISTS response_teams (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          team_type TEXT NOT NULL,
          leader_name TEXT NOT NULL,
          contact_number TEXT,
          member_count INTEGER NOT NULL DEFAULT 1,
          status TEXT NOT NULL DEFAULT 'available',
          assigned_zone_id INTEGER,
          latitude REAL,
          longitude REAL,
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL,
          FOREIGN KEY(assigned_zone_id) REFERENCES flood_zones(id)
        );
        ",
    )
}
