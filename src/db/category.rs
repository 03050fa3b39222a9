//! Financial category repository.

use uuid::Uuid;

use super::{Backend, Query, Table, decode_row, decode_rows, encode};
use crate::error::Result;
use crate::models::finance::{CreateCategory, FinancialCategory, UpdateCategory};

/// List all categories ordered by name.
pub async fn list_all(db: &impl Backend) -> Result<Vec<FinancialCategory>> {
    let rows = db
        .select(Table::FinancialCategories, &Query::new().order_asc("name"))
        .await?;
    decode_rows(Table::FinancialCategories, rows)
}

/// List only expense categories (`is_income = false`), ordered by name.
pub async fn list_expense(db: &impl Backend) -> Result<Vec<FinancialCategory>> {
    let query = Query::new().eq("is_income", false).order_asc("name");
    let rows = db.select(Table::FinancialCategories, &query).await?;
    decode_rows(Table::FinancialCategories, rows)
}

/// Create a new category.
pub async fn create(db: &impl Backend, data: CreateCategory) -> Result<FinancialCategory> {
    data.validate()?;
    let row = db.insert(Table::FinancialCategories, encode(&data)?).await?;
    decode_row(Table::FinancialCategories, row)
}

/// Rename a category.
pub async fn update(db: &impl Backend, id: Uuid, data: UpdateCategory) -> Result<Option<FinancialCategory>> {
    data.validate()?;
    let rows = db
        .update(Table::FinancialCategories, &Query::by_id(id), encode(&data)?)
        .await?;
    match rows.into_iter().next() {
        Some(row) => Ok(Some(decode_row(Table::FinancialCategories, row)?)),
        None => Ok(None),
    }
}

/// Delete a category by ID.
pub async fn delete(db: &impl Backend, id: Uuid) -> Result<bool> {
    let deleted = db.delete(Table::FinancialCategories, &Query::by_id(id)).await?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryBackend;
    use crate::error::AppError;

    async fn seed(db: &MemoryBackend) {
        for (name, is_income, is_fixed) in [
            ("Sewa", false, true),
            ("Konsultasi", true, false),
            ("Bahan Bekam", false, false),
        ] {
            create(
                db,
                CreateCategory {
                    name: name.into(),
                    is_income,
                    is_fixed,
                },
            )
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let db = MemoryBackend::new();
        seed(&db).await;
        let names: Vec<_> = list_all(&db).await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Bahan Bekam", "Konsultasi", "Sewa"]);
    }

    #[tokio::test]
    async fn test_list_expense_excludes_income() {
        let db = MemoryBackend::new();
        seed(&db).await;
        let cats = list_expense(&db).await.unwrap();
        assert_eq!(cats.len(), 2);
        assert!(cats.iter().all(|c| !c.is_income));
    }

    #[tokio::test]
    async fn test_rename_keeps_flags() {
        let db = MemoryBackend::new();
        seed(&db).await;
        let sewa = list_all(&db).await.unwrap().into_iter().find(|c| c.name == "Sewa").unwrap();
        let renamed = update(
            &db,
            sewa.id,
            UpdateCategory {
                name: Some("Sewa Ruko".into()),
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(renamed.name, "Sewa Ruko");
        assert!(renamed.is_fixed);
        assert!(!renamed.is_income);
    }

    #[tokio::test]
    async fn test_rename_to_blank_is_rejected() {
        let db = MemoryBackend::new();
        seed(&db).await;
        let sewa = list_all(&db).await.unwrap().into_iter().find(|c| c.name == "Sewa").unwrap();
        let calls = db.call_count();

        let result = update(&db, sewa.id, UpdateCategory { name: Some(" ".into()) }).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(db.call_count(), calls);
        assert!(list_all(&db).await.unwrap().iter().any(|c| c.name == "Sewa"));
    }
}
