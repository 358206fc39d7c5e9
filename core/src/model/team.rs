use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TeamStatus;
use crate::validation::{require_changes, Validate, Violations};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTeam {
    pub id: i64,
    pub name: String,
    pub team_type: String,
    pub leader_name: String,
    pub contact_number: Option<String>,
    pub member_count: i64,
    pub status: TeamStatus,
    pub assigned_zone_id: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResponseTeam {
    pub name: String,
    pub team_type: String,
    pub leader_name: String,
    pub contact_number: Option<String>,
    pub member_count: Option<i64>,
    pub status: Option<TeamStatus>,
    pub assigned_zone_id: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Validate for NewResponseTeam {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.required("name", &self.name);
        v.required("teamType", &self.team_type);
        v.required("leaderName", &self.leader_name);
        v.at_least("memberCount", self.member_count, 1);
        v.latitude("latitude", self.latitude);
        v.longitude("longitude", self.longitude);
        if self.latitude.is_some() != self.longitude.is_some() {
            v.push("latitude", "latitude and longitude must be given together");
        }
        v.finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTeamPatch {
    pub name: Option<String>,
    pub team_type: Option<String>,
    pub leader_name: Option<String>,
    pub contact_number: Option<String>,
    pub member_count: Option<i64>,
    pub status: Option<TeamStatus>,
    pub assigned_zone_id: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ResponseTeamPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.team_type.is_none()
            && self.leader_name.is_none()
            && self.contact_number.is_none()
            && self.member_count.is_none()
            && self.status.is_none()
            && self.assigned_zone_id.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
    }
}

impl Validate for ResponseTeamPatch {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        require_changes(&mut v, !self.is_empty());
        v.not_blank("name", self.name.as_deref());
        v.not_blank("teamType", self.team_type.as_deref());
        v.not_blank("leaderName", self.leader_name.as_deref());
        v.at_least("memberCount", self.member_count, 1);
        v.latitude("latitude", self.latitude);
        v.longitude("longitude", self.longitude);
        v.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamFilter {
    pub status: Option<TeamStatus>,
    pub zone_id: Option<i64>,
}
