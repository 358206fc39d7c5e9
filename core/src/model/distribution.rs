use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{require_changes, Validate, Violations};
use crate::Result;

/// A logged hand-out of some quantity of one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub id: i64,
    pub resource_id: i64,
    pub zone_id: Option<i64>,
    pub population_id: Option<i64>,
    pub quantity: i64,
    pub recipient_count: i64,
    pub notes: Option<String>,
    pub distributed_by: Option<String>,
    pub distributed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDistribution {
    pub resource_id: i64,
    pub zone_id: Option<i64>,
    pub population_id: Option<i64>,
    pub quantity: i64,
    pub recipient_count: Option<i64>,
    pub notes: Option<String>,
}

impl Validate for NewDistribution {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.at_least("quantity", Some(self.quantity), 1);
        v.at_least("recipientCount", self.recipient_count, 1);
        v.finish()
    }
}

/// Quantities are final once logged; only bookkeeping fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionPatch {
    pub recipient_count: Option<i64>,
    pub notes: Option<String>,
}

impl Validate for DistributionPatch {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        require_changes(
            &mut v,
            self.recipient_count.is_some() || self.notes.is_some(),
        );
        v.at_least("recipientCount", self.recipient_count, 1);
        v.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionFilter {
    pub resource_id: Option<i64>,
    pub zone_id: Option<i64>,
}
