use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserRole;
use crate::validation::{require_changes, Validate, Violations};
use crate::Result;

/// A dashboard user. `id` is the subject issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub organization: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Claims forwarded by the identity provider at sign-in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUser {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}

impl Validate for UpsertUser {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.required("id", &self.id);
        v.not_blank("email", self.email.as_deref());
        v.finish()
    }
}

/// Fields a user may change on their own profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub organization: Option<String>,
}

impl Validate for ProfilePatch {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        require_changes(
            &mut v,
            self.first_name.is_some() || self.last_name.is_some() || self.organization.is_some(),
        );
        v.not_blank("firstName", self.first_name.as_deref());
        v.not_blank("lastName", self.last_name.as_deref());
        v.not_blank("organization", self.organization.as_deref());
        v.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}
