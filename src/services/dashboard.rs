//! Staff dashboard summary.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::aggregate::{self, CategoryAmount, ExpenseSplit, Totals, TrendPoint, YearMonth};
use crate::db::financial_entry::{self, EntryFilter};
use crate::db::{Backend, category, daily_expense, patient};
use crate::error::Result;

/// Months shown in the savings trend.
pub const TREND_MONTHS: usize = 6;

/// Figures on the staff dashboard for the month containing `today`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub month: YearMonth,
    pub patient_count: u64,
    pub totals: Totals,
    pub income_by_category: Vec<CategoryAmount>,
    pub expense_split: ExpenseSplit,
    /// Trailing months, oldest first, ending with `month`.
    pub trend: Vec<TrendPoint>,
}

impl DashboardSummary {
    pub fn net(&self) -> rust_decimal::Decimal {
        self.totals.net()
    }
}

/// Load the dashboard figures.
///
/// The trend months are fetched with one range query; the current month is
/// cut from that same result.
pub async fn dashboard_summary(db: &impl Backend, today: NaiveDate) -> Result<DashboardSummary> {
    let month = YearMonth::of(today);
    let months = month.trailing(TREND_MONTHS);
    let first = months.first().copied().unwrap_or(month);

    let patient_count = patient::count(db).await?;
    let categories = category::list_all(db).await?;
    let range_entries = financial_entry::list(db, &EntryFilter::between(first.first_day(), month.last_day())).await?;
    let daily = daily_expense::get_by_date_range(db, month.first_day(), month.last_day()).await?;

    debug!(
        "Dashboard {}-{}: {} entries in range, {} daily expenses",
        month.year,
        month.month,
        range_entries.len(),
        daily.len()
    );

    let month_entries: Vec<_> = range_entries
        .iter()
        .filter(|e| YearMonth::of(e.entry_date) == month)
        .cloned()
        .collect();

    Ok(DashboardSummary {
        month,
        patient_count,
        totals: aggregate::totals(&month_entries, &daily),
        income_by_category: aggregate::income_by_category(&month_entries, &categories),
        expense_split: aggregate::expense_split(&month_entries, &daily, &categories),
        trend: aggregate::monthly_trend(&range_entries, &[], &months),
    })
}
