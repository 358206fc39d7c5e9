use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AlertSeverity;
use crate::validation::{require_changes, Validate, Violations};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherAlert {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub alert_type: String,
    pub severity: AlertSeverity,
    pub zone_id: Option<i64>,
    pub is_active: bool,
    pub valid_until: Option<DateTime<Utc>>,
    pub issued_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWeatherAlert {
    pub title: String,
    pub message: String,
    pub alert_type: String,
    pub severity: AlertSeverity,
    pub zone_id: Option<i64>,
    pub is_active: Option<bool>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl Validate for NewWeatherAlert {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.required("title", &self.title);
        v.required("message", &self.message);
        v.required("alertType", &self.alert_type);
        if let Some(until) = self.valid_until {
            if until <= Utc::now() {
                v.push("validUntil", "must be in the future");
            }
        }
        v.finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherAlertPatch {
    pub title: Option<String>,
    pub message: Option<String>,
    pub alert_type: Option<String>,
    pub severity: Option<AlertSeverity>,
    pub zone_id: Option<i64>,
    pub is_active: Option<bool>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl WeatherAlertPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.message.is_none()
            && self.alert_type.is_none()
            && self.severity.is_none()
            && self.zone_id.is_none()
            && self.is_active.is_none()
            && self.valid_until.is_none()
    }
}

impl Validate for WeatherAlertPatch {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        require_changes(&mut v, !self.is_empty());
        v.not_blank("title", self.title.as_deref());
        v.not_blank("message", self.message.as_deref());
        v.not_blank("alertType", self.alert_type.as_deref());
        v.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertFilter {
    pub active: Option<bool>,
    pub severity: Option<AlertSeverity>,
    pub zone_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn alert() -> NewWeatherAlert {
        NewWeatherAlert {
            title: "Flash flood warning".into(),
            message: "River expected to breach embankment overnight".into(),
            alert_type: "flood".into(),
            severity: AlertSeverity::Severe,
            zone_id: None,
            is_active: None,
            valid_until: None,
        }
    }

    #[test]
    fn accepts_open_ended_alert() {
        assert!(alert().validate().is_ok());
    }

    #[test]
    fn expiry_in_the_past_is_rejected() {
        let mut a = alert();
        a.valid_until = Some(Utc::now() - Duration::hours(1));
        assert!(a.validate().is_err());
    }
}
