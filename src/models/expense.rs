//! Daily expense ledger DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// A row of the `daily_expenses` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyExpense {
    pub id: Uuid,
    pub expense_date: NaiveDate,
    pub amount: Decimal,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// DTO for creating a daily expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDailyExpense {
    pub expense_date: NaiveDate,
    pub amount: Decimal,
    pub category_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl CreateDailyExpense {
    pub fn validate(&self) -> Result<()> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(AppError::validation("Amount cannot be negative"));
        }
        Ok(())
    }
}

/// DTO for updating a daily expense.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDailyExpense {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl UpdateDailyExpense {
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
