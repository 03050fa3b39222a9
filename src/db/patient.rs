//! Patient repository with CRUD operations.

use uuid::Uuid;

use super::{Backend, Query, Table, decode_row, decode_rows, encode};
use crate::error::Result;
use crate::models::patient::{CreatePatient, Patient, UpdatePatient};

/// List all patients, newest first.
pub async fn list_all(db: &impl Backend) -> Result<Vec<Patient>> {
    let rows = db
        .select(Table::Patients, &Query::new().order_desc("created_at"))
        .await?;
    decode_rows(Table::Patients, rows)
}

/// List patients matching a search term (name, phone, email or code).
pub async fn search(db: &impl Backend, term: &str) -> Result<Vec<Patient>> {
    let patients = list_all(db).await?;
    Ok(patients.into_iter().filter(|p| p.matches(term)).collect())
}

/// Get patient by ID.
pub async fn get_by_id(db: &impl Backend, id: Uuid) -> Result<Option<Patient>> {
    let rows = db.select(Table::Patients, &Query::by_id(id).limit(1)).await?;
    match rows.into_iter().next() {
        Some(row) => Ok(Some(decode_row(Table::Patients, row)?)),
        None => Ok(None),
    }
}

/// Number of patients visible to the principal.
pub async fn count(db: &impl Backend) -> Result<u64> {
    db.count(Table::Patients, &Query::new()).await
}

/// Create a new patient.
pub async fn create(db: &impl Backend, data: CreatePatient) -> Result<Patient> {
    data.validate()?;
    let row = db.insert(Table::Patients, encode(&data)?).await?;
    decode_row(Table::Patients, row)
}

/// Update an existing patient. Returns `None` when no row has this id.
pub async fn update(db: &impl Backend, id: Uuid, data: UpdatePatient) -> Result<Option<Patient>> {
    data.validate()?;
    let rows = db.update(Table::Patients, &Query::by_id(id), encode(&data)?).await?;
    match rows.into_iter().next() {
        Some(row) => Ok(Some(decode_row(Table::Patients, row)?)),
        None => Ok(None),
    }
}

/// Delete a patient by ID.
pub async fn delete(db: &impl Backend, id: Uuid) -> Result<bool> {
    let deleted = db.delete(Table::Patients, &Query::by_id(id)).await?;
    Ok(deleted > 0)
}
