//! Roles and patient-account links.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Permission tier of a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    /// Cashier: transactions and expenses only.
    Kasir,
    /// Least privilege; used whenever the role cannot be determined.
    #[default]
    Viewer,
    Patient,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Admin, Role::Staff, Role::Kasir, Role::Viewer, Role::Patient];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Kasir => "kasir",
            Role::Viewer => "viewer",
            Role::Patient => "patient",
        }
    }

    pub fn is_patient(&self) -> bool {
        *self == Role::Patient
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| AppError::validation(format!("Unknown role '{s}'")))
    }
}

/// A row of the `user_roles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: Uuid,
    pub role: Role,
}

/// A row of the `patient_accounts` table: one principal, one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub patient_id: Uuid,
}

/// DTO for linking a principal to a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientAccount {
    pub user_id: Uuid,
    pub patient_id: Uuid,
}

/// DTO for re-pointing an account link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePatientAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Uuid>,
}
