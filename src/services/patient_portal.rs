//! What a signed-in patient sees about themselves.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::db::financial_entry::{self, EntryFilter};
use crate::db::{Backend, category, membership, patient, patient_account};
use crate::error::{AppError, Result};
use crate::models::finance::{FinancialEntry, find_category};
use crate::models::membership::Membership;
use crate::models::patient::Patient;

/// A financial entry of the patient with its category name resolved.
#[derive(Debug, Clone, Serialize)]
pub struct PatientTransaction {
    pub entry: FinancialEntry,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MembershipStatus {
    pub membership: Membership,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientOverview {
    pub patient: Patient,
    /// Latest date first.
    pub transactions: Vec<PatientTransaction>,
    /// Most recently started first.
    pub memberships: Vec<MembershipStatus>,
}

impl PatientOverview {
    pub fn has_active_membership(&self) -> bool {
        self.memberships.iter().any(|m| m.active)
    }
}

/// Load the patient linked to `user_id`, with transactions and memberships.
pub async fn patient_overview(db: &impl Backend, user_id: Uuid, today: NaiveDate) -> Result<PatientOverview> {
    let account = patient_account::get_by_user(db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Data pasien tidak ditemukan"))?;

    let patient = patient::get_by_id(db, account.patient_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Patient {} not found", account.patient_id)))?;

    let categories = category::list_all(db).await?;
    let transactions = financial_entry::list(db, &EntryFilter::for_patient(patient.id))
        .await?
        .into_iter()
        .map(|entry| PatientTransaction {
            category: find_category(&categories, entry.category_id).map(|c| c.name.clone()),
            entry,
        })
        .collect();

    let memberships = membership::list_by_patient(db, patient.id)
        .await?
        .into_iter()
        .map(|m| MembershipStatus {
            active: m.is_active(today),
            membership: m,
        })
        .collect();

    Ok(PatientOverview {
        patient,
        transactions,
        memberships,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Table;
    use crate::db::memory::MemoryBackend;
    use serde_json::json;

    #[tokio::test]
    async fn test_overview_of_linked_patient() {
        let db = MemoryBackend::new();
        let user_id = Uuid::new_v4();
        let mine = db
            .insert(Table::Patients, json!({ "full_name": "Siti", "status": "member" }))
            .await
            .unwrap();
        let other = db
            .insert(Table::Patients, json!({ "full_name": "Budi", "status": "pasien" }))
            .await
            .unwrap();
        db.insert(
            Table::PatientAccounts,
            json!({ "user_id": user_id, "patient_id": mine["id"] }),
        )
        .await
        .unwrap();
        let bekam = db
            .insert(
                Table::FinancialCategories,
                json!({ "name": "Bekam", "is_income": true, "is_fixed": false }),
            )
            .await
            .unwrap();
        for (date, patient) in [("2025-02-01", &mine), ("2025-03-01", &mine), ("2025-03-02", &other)] {
            db.insert(
                Table::FinancialEntries,
                json!({
                    "entry_date": date,
                    "entry_type": "income",
                    "amount": 150_000,
                    "category_id": bekam["id"],
                    "patient_id": patient["id"],
                }),
            )
            .await
            .unwrap();
        }
        for (start, expiry) in [("2024-01-01", Some("2024-12-31")), ("2025-01-01", None)] {
            db.insert(
                Table::Memberships,
                json!({
                    "patient_id": mine["id"],
                    "membership_type": "Gold",
                    "started_at": start,
                    "expires_at": expiry,
                }),
            )
            .await
            .unwrap();
        }

        let today = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();
        let overview = patient_overview(&db, user_id, today).await.unwrap();

        assert_eq!(overview.patient.full_name, "Siti");
        assert_eq!(overview.transactions.len(), 2);
        assert_eq!(overview.transactions[0].entry.entry_date.to_string(), "2025-03-01");
        assert_eq!(overview.transactions[0].category.as_deref(), Some("Bekam"));
        assert_eq!(overview.memberships.len(), 2);
        assert!(overview.memberships[0].active);
        assert!(!overview.memberships[1].active);
        assert!(overview.has_active_membership());
    }

    #[tokio::test]
    async fn test_unlinked_principal() {
        let db = MemoryBackend::new();
        let today = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();
        let result = patient_overview(&db, Uuid::new_v4(), today).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
