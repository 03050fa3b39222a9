//! Backend reachability check and table counts.

use super::{Backend, Query, Table};
use crate::error::Result;

/// Test backend access by counting categories (readable by every staff role).
pub async fn test_connection(db: &impl Backend) -> Result<()> {
    db.count(Table::FinancialCategories, &Query::new()).await?;
    Ok(())
}

/// Get record counts for the main tables.
pub async fn get_table_counts(db: &impl Backend) -> Result<TableCounts> {
    let patients = db.count(Table::Patients, &Query::new()).await?;
    let financial_entries = db.count(Table::FinancialEntries, &Query::new()).await?;
    let daily_expenses = db.count(Table::DailyExpenses, &Query::new()).await?;

    Ok(TableCounts {
        patients,
        financial_entries,
        daily_expenses,
    })
}

/// Table record counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCounts {
    pub patients: u64,
    pub financial_entries: u64,
    pub daily_expenses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryBackend;
    use serde_json::json;

    #[tokio::test]
    async fn test_counts() {
        let db = MemoryBackend::new();
        db.insert(Table::Patients, json!({ "full_name": "A", "status": "calon" }))
            .await
            .unwrap();
        db.insert(Table::DailyExpenses, json!({ "expense_date": "2025-03-01", "amount": 10 }))
            .await
            .unwrap();

        test_connection(&db).await.unwrap();
        let counts = get_table_counts(&db).await.unwrap();
        assert_eq!(
            counts,
            TableCounts {
                patients: 1,
                financial_entries: 0,
                daily_expenses: 1,
            }
        );
    }
}
