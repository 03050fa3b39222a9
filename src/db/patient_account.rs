//! Patient-account link repository.

use uuid::Uuid;

use super::{Backend, Query, Table, decode_row, decode_rows, encode};
use crate::error::Result;
use crate::models::account::{CreatePatientAccount, PatientAccount, UpdatePatientAccount};

/// List all account links.
pub async fn list_all(db: &impl Backend) -> Result<Vec<PatientAccount>> {
    let rows = db.select(Table::PatientAccounts, &Query::new()).await?;
    decode_rows(Table::PatientAccounts, rows)
}

/// Find the link of a principal, if any.
pub async fn get_by_user(db: &impl Backend, user_id: Uuid) -> Result<Option<PatientAccount>> {
    let query = Query::new().eq("user_id", user_id).limit(1);
    let rows = db.select(Table::PatientAccounts, &query).await?;
    match rows.into_iter().next() {
        Some(row) => Ok(Some(decode_row(Table::PatientAccounts, row)?)),
        None => Ok(None),
    }
}

/// Link a principal to a patient.
pub async fn create(db: &impl Backend, data: CreatePatientAccount) -> Result<PatientAccount> {
    let row = db.insert(Table::PatientAccounts, encode(&data)?).await?;
    decode_row(Table::PatientAccounts, row)
}

/// Re-point an existing link.
pub async fn update(db: &impl Backend, id: Uuid, data: UpdatePatientAccount) -> Result<Option<PatientAccount>> {
    let rows = db
        .update(Table::PatientAccounts, &Query::by_id(id), encode(&data)?)
        .await?;
    match rows.into_iter().next() {
        Some(row) => Ok(Some(decode_row(Table::PatientAccounts, row)?)),
        None => Ok(None),
    }
}

/// Delete a link by ID.
pub async fn delete(db: &impl Backend, id: Uuid) -> Result<bool> {
    let deleted = db.delete(Table::PatientAccounts, &Query::by_id(id)).await?;
    Ok(deleted > 0)
}
