/// Row types and insert/patch payloads for every table
pub mod alert;
pub mod distribution;
pub mod enums;
pub mod population;
pub mod resource;
pub mod team;
pub mod user;
pub mod zone;

pub use alert::{AlertFilter, NewWeatherAlert, WeatherAlert, WeatherAlertPatch};
pub use distribution::{Distribution, DistributionFilter, DistributionPatch, NewDistribution};
pub use enums::{
    AlertSeverity, EvacuationStatus, Priority, RiskLevel, TeamStatus, UnknownVariant, UserRole,
};
pub use population::{AffectedPerson, AffectedPersonPatch, NewAffectedPerson, PopulationFilter};
pub use resource::{NewReliefResource, ReliefResource, ReliefResourcePatch};
pub use team::{NewResponseTeam, ResponseTeam, ResponseTeamPatch, TeamFilter};
pub use user::{ProfilePatch, Session, UpsertUser, User};
pub use zone::{FloodZone, FloodZonePatch, NewFloodZone, ZoneFilter};
