//! Patient self-registration.

use tracing::{info, warn};

use crate::auth::{AuthBackend, Principal, SignUp};
use crate::db::{Backend, patient, patient_account, user_role};
use crate::error::{AppError, Result};
use crate::models::account::{CreatePatientAccount, PatientAccount, Role};
use crate::models::patient::{CreatePatient, Patient, PatientStatus};

pub const MIN_PASSWORD_LEN: usize = 6;

/// What a prospective patient fills in.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub complaint: Option<String>,
}

impl RegistrationForm {
    /// Checks run before any backend call.
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(AppError::validation("Email wajib diisi"));
        }
        if self.password != self.confirm_password {
            return Err(AppError::validation("Password tidak cocok"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "Password minimal {MIN_PASSWORD_LEN} karakter"
            )));
        }
        if self.full_name.trim().is_empty() {
            return Err(AppError::validation("Nama lengkap wajib diisi"));
        }
        Ok(())
    }

    fn patient(&self) -> CreatePatient {
        CreatePatient {
            full_name: self.full_name.trim().to_string(),
            phone: non_empty(&self.phone),
            email: Some(self.email.trim().to_string()),
            address: non_empty(&self.address),
            complaint: non_empty(&self.complaint),
            status: PatientStatus::Calon,
            ..Default::default()
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Result of a registration.
#[derive(Debug, Clone)]
pub struct RegistrationResult {
    pub principal: Principal,
    pub patient: Patient,
    pub account: PatientAccount,
    /// `false` when the account exists but still carries its default role.
    pub role_assigned: bool,
}

impl RegistrationResult {
    pub fn summary(&self) -> String {
        let base = format!("Registrasi berhasil untuk {}", self.patient.full_name);
        if self.role_assigned {
            format!("{base}. Silakan cek email untuk verifikasi.")
        } else {
            format!("{base}, tetapi peran pasien belum terpasang. Hubungi admin klinik.")
        }
    }
}

/// Sign up, create the patient, link the account and assign the patient
/// role.
///
/// Steps run in order and are not rolled back. A failure before the link
/// exists aborts the flow; a failed role assignment is logged and reported
/// through [`RegistrationResult::role_assigned`].
pub async fn register_patient(
    auth: &impl AuthBackend,
    db: &impl Backend,
    form: RegistrationForm,
) -> Result<RegistrationResult> {
    form.validate()?;

    let principal = auth
        .sign_up(&SignUp {
            email: form.email.trim().to_string(),
            password: form.password.clone(),
            full_name: form.full_name.trim().to_string(),
        })
        .await?;
    info!("Registered account {}", principal.id);

    let patient = patient::create(db, form.patient()).await?;
    let account = patient_account::create(
        db,
        CreatePatientAccount {
            user_id: principal.id,
            patient_id: patient.id,
        },
    )
    .await?;

    let role_assigned = match user_role::set_role(db, principal.id, Role::Patient).await {
        Ok(true) => true,
        Ok(false) => {
            warn!("No role row for {} to mark as patient", principal.id);
            false
        }
        Err(e) => {
            warn!("Role update error for {}: {e}", principal.id);
            false
        }
    };

    info!("Patient {} linked to account {}", patient.id, principal.id);

    Ok(RegistrationResult {
        principal,
        patient,
        account,
        role_assigned,
    })
}
