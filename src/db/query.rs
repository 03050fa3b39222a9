//! Table names and the filter/order builder shared by all backends.

use std::fmt;

/// Managed tables of the clinic backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Patients,
    PatientAccounts,
    FinancialEntries,
    FinancialCategories,
    DailyExpenses,
    Memberships,
    UserRoles,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Patients => "patients",
            Table::PatientAccounts => "patient_accounts",
            Table::FinancialEntries => "financial_entries",
            Table::FinancialCategories => "financial_categories",
            Table::DailyExpenses => "daily_expenses",
            Table::Memberships => "memberships",
            Table::UserRoles => "user_roles",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operator of a column filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gte => "gte",
            FilterOp::Lte => "lte",
        }
    }
}

/// `column <op> value`, values in their textual wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub op: FilterOp,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

/// Row selection: conjunction of filters, ordering and an optional limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the single row with this id.
    pub fn by_id(id: impl fmt::Display) -> Self {
        Self::new().eq("id", id)
    }

    pub fn eq(self, column: &'static str, value: impl fmt::Display) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    pub fn gte(self, column: &'static str, value: impl fmt::Display) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    pub fn lte(self, column: &'static str, value: impl fmt::Display) -> Self {
        self.filter(column, FilterOp::Lte, value)
    }

    fn filter(mut self, column: &'static str, op: FilterOp, value: impl fmt::Display) -> Self {
        self.filters.push(Filter {
            column,
            op,
            value: value.to_string(),
        });
        self
    }

    pub fn order_asc(mut self, column: &'static str) -> Self {
        self.order.push(Order {
            column,
            ascending: true,
        });
        self
    }

    pub fn order_desc(mut self, column: &'static str) -> Self {
        self.order.push(Order {
            column,
            ascending: false,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render as REST query parameters (`column=op.value`, `order=...`, `limit=...`).
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|f| (f.column.to_string(), format!("{}.{}", f.op.as_str(), f.value)))
            .collect();

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_for_date_range() {
        let query = Query::new()
            .gte("entry_date", "2025-03-01")
            .lte("entry_date", "2025-03-31")
            .order_desc("entry_date");

        assert_eq!(
            query.to_params(),
            vec![
                ("entry_date".to_string(), "gte.2025-03-01".to_string()),
                ("entry_date".to_string(), "lte.2025-03-31".to_string()),
                ("order".to_string(), "entry_date.desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_multiple_orders_and_limit() {
        let query = Query::new().order_asc("name").order_desc("created_at").limit(1);
        assert_eq!(
            query.to_params(),
            vec![
                ("order".to_string(), "name.asc,created_at.desc".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_by_id() {
        let query = Query::by_id(42);
        assert_eq!(query.to_params(), vec![("id".to_string(), "eq.42".to_string())]);
    }
}
