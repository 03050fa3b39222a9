//! Membership repository.

use uuid::Uuid;

use super::{Backend, Query, Table, decode_row, decode_rows, encode};
use crate::error::Result;
use crate::models::membership::{CreateMembership, Membership, UpdateMembership};

/// List all memberships, most recently started first.
pub async fn list_all(db: &impl Backend) -> Result<Vec<Membership>> {
    let rows = db
        .select(Table::Memberships, &Query::new().order_desc("started_at"))
        .await?;
    decode_rows(Table::Memberships, rows)
}

/// List memberships of one patient, most recently started first.
pub async fn list_by_patient(db: &impl Backend, patient_id: Uuid) -> Result<Vec<Membership>> {
    let query = Query::new().eq("patient_id", patient_id).order_desc("started_at");
    let rows = db.select(Table::Memberships, &query).await?;
    decode_rows(Table::Memberships, rows)
}

/// Create a new membership.
pub async fn create(db: &impl Backend, data: CreateMembership) -> Result<Membership> {
    data.validate()?;
    let row = db.insert(Table::Memberships, encode(&data)?).await?;
    decode_row(Table::Memberships, row)
}

/// Update an existing membership.
pub async fn update(db: &impl Backend, id: Uuid, data: UpdateMembership) -> Result<Option<Membership>> {
    let rows = db.update(Table::Memberships, &Query::by_id(id), encode(&data)?).await?;
    match rows.into_iter().next() {
        Some(row) => Ok(Some(decode_row(Table::Memberships, row)?)),
        None => Ok(None),
    }
}

/// Delete a membership by ID.
pub async fn delete(db: &impl Backend, id: Uuid) -> Result<bool> {
    let deleted = db.delete(Table::Memberships, &Query::by_id(id)).await?;
    Ok(deleted > 0)
}
