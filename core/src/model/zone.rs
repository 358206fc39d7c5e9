use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RiskLevel;
use crate::validation::{require_changes, Validate, Violations};
use crate::Result;

pub const DEFAULT_RADIUS_METERS: i64 = 1000;

/// A flooded or at-risk area, drawn on the map as a circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloodZone {
    pub id: i64,
    pub name: String,
    pub district: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: i64,
    pub risk_level: RiskLevel,
    pub water_level_cm: Option<f64>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFloodZone {
    pub name: String,
    pub district: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: Option<i64>,
    pub risk_level: RiskLevel,
    pub water_level_cm: Option<f64>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl Validate for NewFloodZone {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.required("name", &self.name);
        v.required("district", &self.district);
        v.latitude("latitude", Some(self.latitude));
        v.longitude("longitude", Some(self.longitude));
        v.at_least("radiusMeters", self.radius_meters, 1);
        v.non_negative_f64("waterLevelCm", self.water_level_cm);
        v.finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloodZonePatch {
    pub name: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: Option<i64>,
    pub risk_level: Option<RiskLevel>,
    pub water_level_cm: Option<f64>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl FloodZonePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.district.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.radius_meters.is_none()
            && self.risk_level.is_none()
            && self.water_level_cm.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
    }
}

impl Validate for FloodZonePatch {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        require_changes(&mut v, !self.is_empty());
        v.not_blank("name", self.name.as_deref());
        v.not_blank("district", self.district.as_deref());
        v.latitude("latitude", self.latitude);
        v.longitude("longitude", self.longitude);
        v.at_least("radiusMeters", self.radius_meters, 1);
        v.non_negative_f64("waterLevelCm", self.water_level_cm);
        v.finish()
    }
}

/// Query filter for zone listings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneFilter {
    pub active: Option<bool>,
    pub district: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReliefError;

    fn zone() -> NewFloodZone {
        NewFloodZone {
            name: "Riverside Ward".into(),
            district: "Sylhet".into(),
            latitude: 24.89,
            longitude: 91.87,
            radius_meters: None,
            risk_level: RiskLevel::High,
            water_level_cm: Some(120.0),
            description: None,
            is_active: None,
        }
    }

    #[test]
    fn accepts_minimal_zone() {
        assert!(zone().validate().is_ok());
    }

    #[test]
    fn rejects_zero_radius_and_blank_district() {
        let mut z = zone();
        z.radius_meters = Some(0);
        z.district = String::new();
        let Err(ReliefError::Validation(errors)) = z.validate() else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn deserializes_camel_case_payload() {
        let z: NewFloodZone = serde_json::from_str(
            r#"{"name":"A","district":"B","latitude":1.0,"longitude":2.0,"riskLevel":"critical","radiusMeters":2500}"#,
        )
        .unwrap();
        assert_eq!(z.risk_level, RiskLevel::Critical);
        assert_eq!(z.radius_meters, Some(2500));
    }

    #[test]
    fn empty_patch_is_rejected() {
        assert!(FloodZonePatch::default().validate().is_err());
        let patch = FloodZonePatch {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }
}
