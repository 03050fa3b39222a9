//! Patient records and DTOs for create and update operations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Patient lifecycle status. Any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientStatus {
    /// Prospective patient (not yet treated).
    #[default]
    Calon,
    Pasien,
    Member,
    /// Regular customer without membership.
    LanggananNonmember,
}

impl PatientStatus {
    pub const ALL: [PatientStatus; 4] = [
        PatientStatus::Calon,
        PatientStatus::Pasien,
        PatientStatus::Member,
        PatientStatus::LanggananNonmember,
    ];

    /// Stored value as used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Calon => "calon",
            PatientStatus::Pasien => "pasien",
            PatientStatus::Member => "member",
            PatientStatus::LanggananNonmember => "langganan_nonmember",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            PatientStatus::Calon => "Calon Pasien",
            PatientStatus::Pasien => "Pasien",
            PatientStatus::Member => "Member",
            PatientStatus::LanggananNonmember => "Langganan",
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        PatientStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| AppError::validation(format!("Unknown patient status '{s}'")))
    }
}

/// A row of the `patients` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    #[serde(default)]
    pub patient_code: Option<String>,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub status: PatientStatus,
    #[serde(default)]
    pub therapy_date: Option<NaiveDate>,
    #[serde(default)]
    pub complaint: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    /// Case-insensitive match on name, phone, email or patient code.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        let hit = |field: Option<&str>| field.is_some_and(|v| v.to_lowercase().contains(&term));

        hit(Some(&self.full_name))
            || hit(self.phone.as_deref())
            || hit(self.email.as_deref())
            || hit(self.patient_code.as_deref())
    }
}

/// DTO for creating a patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePatient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_code: Option<String>,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub status: PatientStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub therapy_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complaint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreatePatient {
    /// Check required fields.
    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(AppError::validation("Patient name cannot be empty"));
        }
        Ok(())
    }
}

/// DTO for updating a patient. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePatient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_code: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PatientStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub therapy_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complaint: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl UpdatePatient {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.full_name
            && name.trim().is_empty()
        {
            return Err(AppError::validation("Patient name cannot be empty"));
        }
        Ok(())
    }
}
