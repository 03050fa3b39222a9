//! Financial entry repository for the transactions ledger and reports.

use chrono::NaiveDate;
use uuid::Uuid;

use super::{Backend, Query, Table, decode_row, decode_rows, encode, stamp_creator};
use crate::error::Result;
use crate::models::finance::{CreateFinancialEntry, EntryType, FinancialEntry, UpdateFinancialEntry};

/// Optional restrictions for listing entries. Bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub patient_id: Option<Uuid>,
    pub entry_type: Option<EntryType>,
}

impl EntryFilter {
    /// Entries dated within `[from, to]`.
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        }
    }

    /// Entries attached to one patient.
    pub fn for_patient(patient_id: Uuid) -> Self {
        Self {
            patient_id: Some(patient_id),
            ..Default::default()
        }
    }

    fn to_query(&self) -> Query {
        let mut query = Query::new();
        if let Some(from) = self.from {
            query = query.gte("entry_date", from);
        }
        if let Some(to) = self.to {
            query = query.lte("entry_date", to);
        }
        if let Some(patient_id) = self.patient_id {
            query = query.eq("patient_id", patient_id);
        }
        if let Some(entry_type) = self.entry_type {
            query = query.eq("entry_type", entry_type);
        }
        query.order_desc("entry_date")
    }
}

/// List all entries, latest date first.
pub async fn list_all(db: &impl Backend) -> Result<Vec<FinancialEntry>> {
    list(db, &EntryFilter::default()).await
}

/// List entries matching the filter, latest date first.
pub async fn list(db: &impl Backend, filter: &EntryFilter) -> Result<Vec<FinancialEntry>> {
    let rows = db.select(Table::FinancialEntries, &filter.to_query()).await?;
    decode_rows(Table::FinancialEntries, rows)
}

/// Create a new entry stamped with the acting principal.
pub async fn create(db: &impl Backend, created_by: Uuid, data: CreateFinancialEntry) -> Result<FinancialEntry> {
    data.validate()?;
    let row = stamp_creator(encode(&data)?, created_by);
    let inserted = db.insert(Table::FinancialEntries, row).await?;
    decode_row(Table::FinancialEntries, inserted)
}

/// Update an existing entry.
pub async fn update(db: &impl Backend, id: Uuid, data: UpdateFinancialEntry) -> Result<Option<FinancialEntry>> {
    data.validate()?;
    let rows = db
        .update(Table::FinancialEntries, &Query::by_id(id), encode(&data)?)
        .await?;
    match rows.into_iter().next() {
        Some(row) => Ok(Some(decode_row(Table::FinancialEntries, row)?)),
        None => Ok(None),
    }
}

/// Delete an entry by ID.
pub async fn delete(db: &impl Backend, id: Uuid) -> Result<bool> {
    let deleted = db.delete(Table::FinancialEntries, &Query::by_id(id)).await?;
    Ok(deleted > 0)
}
