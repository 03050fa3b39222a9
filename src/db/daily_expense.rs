//! Daily expense repository.

use chrono::NaiveDate;
use uuid::Uuid;

use super::{Backend, Query, Table, decode_row, decode_rows, encode, stamp_creator};
use crate::error::Result;
use crate::models::expense::{CreateDailyExpense, DailyExpense, UpdateDailyExpense};

/// List all daily expenses, latest date first.
pub async fn list_all(db: &impl Backend) -> Result<Vec<DailyExpense>> {
    let rows = db
        .select(Table::DailyExpenses, &Query::new().order_desc("expense_date"))
        .await?;
    decode_rows(Table::DailyExpenses, rows)
}

/// Get daily expenses within a date range (inclusive).
pub async fn get_by_date_range(db: &impl Backend, start_date: NaiveDate, end_date: NaiveDate) -> Result<Vec<DailyExpense>> {
    let query = Query::new()
        .gte("expense_date", start_date)
        .lte("expense_date", end_date)
        .order_desc("expense_date");
    let rows = db.select(Table::DailyExpenses, &query).await?;
    decode_rows(Table::DailyExpenses, rows)
}

/// Create a new daily expense stamped with the acting principal.
pub async fn create(db: &impl Backend, created_by: Uuid, data: CreateDailyExpense) -> Result<DailyExpense> {
    data.validate()?;
    let row = stamp_creator(encode(&data)?, created_by);
    let inserted = db.insert(Table::DailyExpenses, row).await?;
    decode_row(Table::DailyExpenses, inserted)
}

/// Update an existing daily expense.
pub async fn update(db: &impl Backend, id: Uuid, data: UpdateDailyExpense) -> Result<Option<DailyExpense>> {
    data.validate()?;
    let rows = db
        .update(Table::DailyExpenses, &Query::by_id(id), encode(&data)?)
        .await?;
    match rows.into_iter().next() {
        Some(row) => Ok(Some(decode_row(Table::DailyExpenses, row)?)),
        None => Ok(None),
    }
}

/// Delete a daily expense by ID.
pub async fn delete(db: &impl Backend, id: Uuid) -> Result<bool> {
    let deleted = db.delete(Table::DailyExpenses, &Query::by_id(id)).await?;
    Ok(deleted > 0)
}
