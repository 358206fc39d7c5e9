use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EvacuationStatus, Priority};
use crate::validation::{require_changes, Validate, Violations};
use crate::Result;

/// A registered affected individual (head of household)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedPerson {
    pub id: i64,
    pub full_name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub zone_id: Option<i64>,
    pub family_size: i64,
    pub evacuation_status: EvacuationStatus,
    pub priority: Priority,
    pub medical_needs: Option<String>,
    pub registered_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAffectedPerson {
    pub full_name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub zone_id: Option<i64>,
    pub family_size: Option<i64>,
    pub evacuation_status: Option<EvacuationStatus>,
    pub priority: Option<Priority>,
    pub medical_needs: Option<String>,
}

impl Validate for NewAffectedPerson {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.required("fullName", &self.full_name);
        v.at_least("age", self.age, 0);
        v.at_least("familySize", self.family_size, 1);
        v.finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedPersonPatch {
    pub full_name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub zone_id: Option<i64>,
    pub family_size: Option<i64>,
    pub evacuation_status: Option<EvacuationStatus>,
    pub priority: Option<Priority>,
    pub medical_needs: Option<String>,
}

impl AffectedPersonPatch {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.contact_number.is_none()
            && self.address.is_none()
            && self.zone_id.is_none()
            && self.family_size.is_none()
            && self.evacuation_status.is_none()
            && self.priority.is_none()
            && self.medical_needs.is_none()
    }
}

impl Validate for AffectedPersonPatch {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        require_changes(&mut v, !self.is_empty());
        v.not_blank("fullName", self.full_name.as_deref());
        v.at_least("age", self.age, 0);
        v.at_least("familySize", self.family_size, 1);
        v.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationFilter {
    pub zone_id: Option<i64>,
    pub evacuation_status: Option<EvacuationStatus>,
    pub priority: Option<Priority>,
}
