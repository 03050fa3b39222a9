//! Membership DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// A row of the `memberships` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub membership_type: String,
    pub started_at: NaiveDate,
    /// `None` means a lifetime membership.
    #[serde(default)]
    pub expires_at: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Membership {
    /// Active iff lifetime or expiring after `today`.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        match self.expires_at {
            None => true,
            Some(expiry) => expiry > today,
        }
    }
}

/// DTO for creating a membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub patient_id: Uuid,
    pub membership_type: String,
    pub started_at: NaiveDate,
    pub expires_at: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl CreateMembership {
    pub fn validate(&self) -> Result<()> {
        if self.membership_type.trim().is_empty() {
            return Err(AppError::validation("Membership type cannot be empty"));
        }
        if let Some(expiry) = self.expires_at
            && expiry < self.started_at
        {
            return Err(AppError::validation("Membership cannot expire before it starts"));
        }
        Ok(())
    }
}

/// DTO for updating a membership.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMembership {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(expires_at: Option<NaiveDate>) -> Membership {
        Membership {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            membership_type: "Gold".into(),
            started_at: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            expires_at,
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn test_lifetime_membership_is_active() {
        let today = NaiveDate::from_ymd_opt(2030, 6, 1).unwrap();
        assert!(membership(None).is_active(today));
    }

    #[test]
    fn test_expiry_boundary() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(membership(NaiveDate::from_ymd_opt(2025, 6, 2)).is_active(today));
        assert!(!membership(NaiveDate::from_ymd_opt(2025, 6, 1)).is_active(today));
        assert!(!membership(NaiveDate::from_ymd_opt(2025, 5, 1)).is_active(today));
    }

    #[test]
    fn test_create_rejects_inverted_dates() {
        let dto = CreateMembership {
            patient_id: Uuid::new_v4(),
            membership_type: "Silver".into(),
            started_at: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            expires_at: NaiveDate::from_ymd_opt(2025, 5, 1),
            notes: None,
        };
        assert!(dto.validate().is_err());
    }
}
