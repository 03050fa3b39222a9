//! Financial entries and categories.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Classification of a financial record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Income,
    Expense,
    Saving,
}

impl EntryType {
    pub const ALL: [EntryType; 3] = [EntryType::Income, EntryType::Expense, EntryType::Saving];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Income => "income",
            EntryType::Expense => "expense",
            EntryType::Saving => "saving",
        }
    }

    /// Indonesian label used in tables and reports.
    pub fn label(&self) -> &'static str {
        match self {
            EntryType::Income => "Pemasukan",
            EntryType::Expense => "Pengeluaran",
            EntryType::Saving => "Tabungan",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        EntryType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| AppError::validation(format!("Unknown entry type '{s}'")))
    }
}

/// A row of the `financial_entries` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialEntry {
    pub id: Uuid,
    pub entry_date: NaiveDate,
    pub entry_type: EntryType,
    pub amount: Decimal,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub patient_id: Option<Uuid>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A row of the `financial_categories` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialCategory {
    pub id: Uuid,
    pub name: String,
    pub is_income: bool,
    /// Fixed (recurring, constant) versus variable cost.
    pub is_fixed: bool,
}

/// Find a category by id in an already-fetched list.
pub fn find_category(categories: &[FinancialCategory], id: Option<Uuid>) -> Option<&FinancialCategory> {
    let id = id?;
    categories.iter().find(|c| c.id == id)
}

/// DTO for creating a financial entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFinancialEntry {
    pub entry_date: NaiveDate,
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub category_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl CreateFinancialEntry {
    pub fn validate(&self) -> Result<()> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(AppError::validation("Amount cannot be negative"));
        }
        Ok(())
    }
}

/// DTO for updating a financial entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFinancialEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<EntryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl UpdateFinancialEntry {
    pub fn validate(&self) -> Result<()> {
        if let Some(amount) = self.amount
            && amount.is_sign_negative()
            && !amount.is_zero()
        {
            return Err(AppError::validation("Amount cannot be negative"));
        }
        Ok(())
    }
}

/// DTO for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub is_income: bool,
    pub is_fixed: bool,
}

impl CreateCategory {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Category name cannot be empty"));
        }
        Ok(())
    }
}

/// DTO for updating a category. Only the name is editable; the income and
/// fixed flags classify existing rows and stay as created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UpdateCategory {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err(AppError::validation("Category name cannot be empty"));
        }
        Ok(())
    }
}
