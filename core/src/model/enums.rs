//! Enumerated columns. Stored and sent over the wire as snake_case strings.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                match raw {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: UnknownVariant| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

string_enum!(
    /// Flood risk of a zone
    RiskLevel, "risk level" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
);

string_enum!(
    /// Where an affected person is in the evacuation process
    EvacuationStatus, "evacuation status" {
        NotEvacuated => "not_evacuated",
        InProgress => "in_progress",
        Evacuated => "evacuated",
        Sheltered => "sheltered",
    }
);

string_enum!(
    /// Assistance priority of an affected person
    Priority, "priority" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
);

string_enum!(
    AlertSeverity, "alert severity" {
        Info => "info",
        Warning => "warning",
        Severe => "severe",
        Extreme => "extreme",
    }
);

string_enum!(
    TeamStatus, "team status" {
        Available => "available",
        Deployed => "deployed",
        Returning => "returning",
        Unavailable => "unavailable",
    }
);

string_enum!(
    /// Role of a dashboard user
    UserRole, "user role" {
        DistrictOfficer => "district_officer",
        Ngo => "ngo",
        FieldWorker => "field_worker",
    }
);

impl Default for EvacuationStatus {
    fn default() -> Self {
        EvacuationStatus::NotEvacuated
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Default for TeamStatus {
    fn default() -> Self {
        TeamStatus::Available
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::FieldWorker
    }
}
