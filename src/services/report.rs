//! Monthly financial report.

use serde::Serialize;
use tracing::info;

use crate::aggregate::{self, CategoryAmount, ExpenseSplit, Totals, TrendPoint, YearMonth};
use crate::db::financial_entry::{self, EntryFilter};
use crate::db::{Backend, category, daily_expense};
use crate::error::Result;
use crate::models::expense::DailyExpense;
use crate::models::finance::{FinancialCategory, FinancialEntry};

/// Report of one month, with the 12-month trend of its year.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub month: YearMonth,
    /// Entries of the month, latest date first. Also the rows of the CSV export.
    pub entries: Vec<FinancialEntry>,
    pub daily_expenses: Vec<DailyExpense>,
    pub categories: Vec<FinancialCategory>,
    pub totals: Totals,
    pub income_by_category: Vec<CategoryAmount>,
    pub expense_split: ExpenseSplit,
    /// January through December of the report year.
    pub trend: Vec<TrendPoint>,
}

impl MonthlyReport {
    /// Category name of an entry, if it has a known one.
    pub fn category_name(&self, entry: &FinancialEntry) -> Option<&str> {
        crate::models::finance::find_category(&self.categories, entry.category_id).map(|c| c.name.as_str())
    }
}

/// Load and aggregate the report of `month`.
pub async fn monthly_report(db: &impl Backend, month: YearMonth) -> Result<MonthlyReport> {
    let year = YearMonth::of_year(month.year);
    let (year_start, year_end) = match (year.first(), year.last()) {
        (Some(first), Some(last)) => (first.first_day(), last.last_day()),
        _ => (month.first_day(), month.last_day()),
    };

    let categories = category::list_all(db).await?;
    let year_entries = financial_entry::list(db, &EntryFilter::between(year_start, year_end)).await?;
    let year_daily = daily_expense::get_by_date_range(db, year_start, year_end).await?;

    let in_month = |date| YearMonth::of(date) == month;
    let entries: Vec<FinancialEntry> = year_entries.iter().filter(|e| in_month(e.entry_date)).cloned().collect();
    let daily_expenses: Vec<DailyExpense> = year_daily.iter().filter(|e| in_month(e.expense_date)).cloned().collect();

    info!(
        "Report {}-{:02}: {} entries, {} daily expenses",
        month.year,
        month.month,
        entries.len(),
        daily_expenses.len()
    );

    Ok(MonthlyReport {
        month,
        totals: aggregate::totals(&entries, &daily_expenses),
        income_by_category: aggregate::income_by_category(&entries, &categories),
        expense_split: aggregate::expense_split(&entries, &daily_expenses, &categories),
        trend: aggregate::monthly_trend(&year_entries, &year_daily, &year),
        entries,
        daily_expenses,
        categories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Table;
    use crate::db::memory::MemoryBackend;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[tokio::test]
    async fn test_report_month_and_year_trend() {
        let db = MemoryBackend::new();
        let konsultasi = db
            .insert(
                Table::FinancialCategories,
                json!({ "name": "Konsultasi", "is_income": true, "is_fixed": false }),
            )
            .await
            .unwrap();
        for (date, kind, amount) in [
            ("2025-03-04", "income", 500_000),
            ("2025-03-31", "saving", 10_000),
            ("2025-07-02", "income", 300_000),
            ("2024-03-04", "income", 999_999),
        ] {
            db.insert(
                Table::FinancialEntries,
                json!({ "entry_date": date, "entry_type": kind, "amount": amount, "category_id": konsultasi["id"] }),
            )
            .await
            .unwrap();
        }
        db.insert(Table::DailyExpenses, json!({ "expense_date": "2025-03-02", "amount": 20_000 }))
            .await
            .unwrap();

        let report = monthly_report(&db, YearMonth::new(2025, 3).unwrap()).await.unwrap();

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].entry_date.to_string(), "2025-03-31");
        assert_eq!(report.category_name(&report.entries[1]), Some("Konsultasi"));
        assert_eq!(report.totals.income, Decimal::from(500_000));
        assert_eq!(report.totals.net(), Decimal::from(480_000));
        assert_eq!(
            report.income_by_category,
            vec![CategoryAmount::new("Konsultasi", Decimal::from(500_000))]
        );
        assert_eq!(report.expense_split.variable, Decimal::from(20_000));

        assert_eq!(report.trend.len(), 12);
        assert_eq!(report.trend[2].totals.daily_expense, Decimal::from(20_000));
        assert_eq!(report.trend[6].totals.income, Decimal::from(300_000));
        let year_income: Decimal = report.trend.iter().map(|p| p.totals.income).sum();
        assert_eq!(year_income, Decimal::from(800_000));
    }
}
