use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{require_changes, Validate, Violations};
use crate::Result;

/// Largest stock a single resource line may hold
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Inventory line for a relief item (rice, tarpaulin, ORS...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliefResource {
    pub id: i64,
    pub name: String,
    pub resource_type: String,
    pub quantity: i64,
    pub unit: String,
    pub distributed: i64,
    pub location: Option<String>,
    pub zone_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReliefResource {
    pub fn available(&self) -> i64 {
        self.quantity - self.distributed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReliefResource {
    pub name: String,
    pub resource_type: String,
    pub quantity: i64,
    pub unit: String,
    pub location: Option<String>,
    pub zone_id: Option<i64>,
}

impl Validate for NewReliefResource {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.required("name", &self.name);
        v.required("resourceType", &self.resource_type);
        v.required("unit", &self.unit);
        v.at_least("quantity", Some(self.quantity), 0);
        v.at_most("quantity", Some(self.quantity), MAX_QUANTITY);
        v.finish()
    }
}

/// `distributed` is not patchable; it only moves through distributions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliefResourcePatch {
    pub name: Option<String>,
    pub resource_type: Option<String>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub location: Option<String>,
    pub zone_id: Option<i64>,
}

impl ReliefResourcePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.resource_type.is_none()
            && self.quantity.is_none()
            && self.unit.is_none()
            && self.location.is_none()
            && self.zone_id.is_none()
    }
}

impl Validate for ReliefResourcePatch {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        require_changes(&mut v, !self.is_empty());
        v.not_blank("name", self.name.as_deref());
        v.not_blank("resourceType", self.resource_type.as_deref());
        v.not_blank("unit", self.unit.as_deref());
        v.at_least("quantity", self.quantity, 0);
        v.at_most("quantity", self.quantity, MAX_QUANTITY);
        v.finish()
    }
}
