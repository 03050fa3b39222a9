//! Dashboard and report figures computed from already-fetched records.
//!
//! Everything here is pure: no backend calls, no clock. Each function walks
//! its input lists once.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::expense::DailyExpense;
use crate::models::finance::{EntryType, FinancialCategory, FinancialEntry, find_category};

/// Bucket name for income without a known category.
pub const OTHER_CATEGORY: &str = "Lainnya";
pub const FIXED_LABEL: &str = "Tetap";
pub const VARIABLE_LABEL: &str = "Variabel";

/// Short Indonesian month names, January first.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Sums per entry type plus the daily expense ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub saving: Decimal,
    pub daily_expense: Decimal,
}

impl Totals {
    /// Income minus both expense ledgers. Savings are not deducted.
    pub fn net(&self) -> Decimal {
        self.income - self.expense - self.daily_expense
    }

    /// Expense entries and daily expenses together.
    pub fn total_expense(&self) -> Decimal {
        self.expense + self.daily_expense
    }

    fn add_entry(&mut self, entry: &FinancialEntry) {
        match entry.entry_type {
            EntryType::Income => self.income += entry.amount,
            EntryType::Expense => self.expense += entry.amount,
            EntryType::Saving => self.saving += entry.amount,
        }
    }
}

/// Sum entries by type and daily expenses.
pub fn totals(entries: &[FinancialEntry], daily: &[DailyExpense]) -> Totals {
    let mut totals = Totals::default();
    for entry in entries {
        totals.add_entry(entry);
    }
    totals.daily_expense = daily.iter().map(|e| e.amount).sum();
    totals
}

/// A named amount, ready for a pie or bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAmount {
    pub name: String,
    pub amount: Decimal,
}

impl CategoryAmount {
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

/// Sum income entries by category name, in order of first appearance.
///
/// Entries whose category is unset or unknown share one `Lainnya` bucket.
pub fn income_by_category(entries: &[FinancialEntry], categories: &[FinancialCategory]) -> Vec<CategoryAmount> {
    let mut buckets: Vec<CategoryAmount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in entries.iter().filter(|e| e.entry_type == EntryType::Income) {
        let name = find_category(categories, entry.category_id)
            .map(|c| c.name.as_str())
            .unwrap_or(OTHER_CATEGORY);

        match index.get(name) {
            Some(&i) => buckets[i].amount += entry.amount,
            None => {
                index.insert(name, buckets.len());
                buckets.push(CategoryAmount::new(name, entry.amount));
            }
        }
    }
    buckets
}

/// Expenses split by their category's fixed flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExpenseSplit {
    pub fixed: Decimal,
    pub variable: Decimal,
}

impl ExpenseSplit {
    pub fn total(&self) -> Decimal {
        self.fixed + self.variable
    }

    /// `[Tetap, Variabel]`, zero buckets included.
    pub fn breakdown(&self) -> [CategoryAmount; 2] {
        [
            CategoryAmount::new(FIXED_LABEL, self.fixed),
            CategoryAmount::new(VARIABLE_LABEL, self.variable),
        ]
    }
}

/// Split expense entries and daily expenses into fixed and variable costs.
/// Anything without a known category counts as variable.
pub fn expense_split(
    entries: &[FinancialEntry],
    daily: &[DailyExpense],
    categories: &[FinancialCategory],
) -> ExpenseSplit {
    let mut split = ExpenseSplit::default();
    let mut add = |category_id: Option<Uuid>, amount: Decimal| {
        if find_category(categories, category_id).is_some_and(|c| c.is_fixed) {
            split.fixed += amount;
        } else {
            split.variable += amount;
        }
    };

    for entry in entries.iter().filter(|e| e.entry_type == EntryType::Expense) {
        add(entry.category_id, entry.amount);
    }
    for expense in daily {
        add(expense.category_id, expense.amount);
    }
    split
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.succ().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn pred(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Short month name, e.g. `Agu`.
    pub fn label(&self) -> &'static str {
        MONTH_LABELS[(self.month as usize - 1) % 12]
    }

    /// The `count` months ending with `self`, oldest first.
    pub fn trailing(&self, count: usize) -> Vec<YearMonth> {
        let mut months = Vec::with_capacity(count);
        let mut current = *self;
        for _ in 0..count {
            months.push(current);
            current = current.pred();
        }
        months.reverse();
        months
    }

    /// January through December of `year`.
    pub fn of_year(year: i32) -> Vec<YearMonth> {
        (1..=12).map(|month| YearMonth { year, month }).collect()
    }
}

/// Totals of one month of a trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub month: YearMonth,
    pub label: &'static str,
    pub totals: Totals,
}

/// Bucket entries and daily expenses into `months`. Records outside those
/// months are ignored; months without records report zeros.
pub fn monthly_trend(entries: &[FinancialEntry], daily: &[DailyExpense], months: &[YearMonth]) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = months
        .iter()
        .map(|&month| TrendPoint {
            month,
            label: month.label(),
            totals: Totals::default(),
        })
        .collect();
    let index: HashMap<YearMonth, usize> = months.iter().enumerate().map(|(i, m)| (*m, i)).collect();

    for entry in entries {
        if let Some(&i) = index.get(&YearMonth::of(entry.entry_date)) {
            points[i].totals.add_entry(entry);
        }
    }
    for expense in daily {
        if let Some(&i) = index.get(&YearMonth::of(expense.expense_date)) {
            points[i].totals.daily_expense += expense.amount;
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn category(name: &str, is_income: bool, is_fixed: bool) -> FinancialCategory {
        FinancialCategory {
            id: Uuid::new_v4(),
            name: name.to_string(),
            is_income,
            is_fixed,
        }
    }

    fn entry(on: &str, entry_type: EntryType, amount: i64, category_id: Option<Uuid>) -> FinancialEntry {
        FinancialEntry {
            id: Uuid::new_v4(),
            entry_date: date(on),
            entry_type,
            amount: Decimal::from(amount),
            category_id,
            patient_id: None,
            notes: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    fn daily(on: &str, amount: i64, category_id: Option<Uuid>) -> DailyExpense {
        DailyExpense {
            id: Uuid::new_v4(),
            expense_date: date(on),
            amount: Decimal::from(amount),
            category_id,
            notes: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_march_scenario() {
        let konsultasi = category("Konsultasi", true, false);
        let sewa = category("Sewa", false, true);
        let entries = vec![
            entry("2025-03-04", EntryType::Income, 500_000, Some(konsultasi.id)),
            entry("2025-03-10", EntryType::Expense, 200_000, Some(sewa.id)),
        ];
        let categories = vec![konsultasi, sewa];

        let t = totals(&entries, &[]);
        assert_eq!(t.income, Decimal::from(500_000));
        assert_eq!(t.expense, Decimal::from(200_000));
        assert_eq!(t.net(), Decimal::from(300_000));

        assert_eq!(
            income_by_category(&entries, &categories),
            vec![CategoryAmount::new("Konsultasi", Decimal::from(500_000))]
        );

        let split = expense_split(&entries, &[], &categories);
        assert_eq!(
            split.breakdown(),
            [
                CategoryAmount::new("Tetap", Decimal::from(200_000)),
                CategoryAmount::new("Variabel", Decimal::ZERO),
            ]
        );
    }

    #[test]
    fn test_net_deducts_both_expense_ledgers() {
        let entries = vec![
            entry("2025-03-01", EntryType::Income, 1_000, None),
            entry("2025-03-02", EntryType::Income, 250, None),
            entry("2025-03-03", EntryType::Expense, 300, None),
            entry("2025-03-04", EntryType::Saving, 100, None),
        ];
        let daily = vec![daily("2025-03-05", 50, None), daily("2025-03-06", 25, None)];

        let t = totals(&entries, &daily);
        assert_eq!(t.saving, Decimal::from(100));
        assert_eq!(t.daily_expense, Decimal::from(75));
        assert_eq!(t.net(), t.income - t.expense - t.daily_expense);
        assert_eq!(t.net(), Decimal::from(875));
    }

    #[test]
    fn test_split_covers_all_expenses() {
        let fixed = category("Gaji", false, true);
        let variable = category("Bahan", false, false);
        let entries = vec![
            entry("2025-03-01", EntryType::Expense, 400, Some(fixed.id)),
            entry("2025-03-02", EntryType::Expense, 150, Some(variable.id)),
            entry("2025-03-03", EntryType::Expense, 70, None),
            entry("2025-03-04", EntryType::Income, 9_999, Some(fixed.id)),
        ];
        let daily = vec![daily("2025-03-05", 30, Some(fixed.id)), daily("2025-03-06", 20, None)];
        let categories = vec![fixed, variable];

        let split = expense_split(&entries, &daily, &categories);
        assert_eq!(split.fixed, Decimal::from(430));
        assert_eq!(split.variable, Decimal::from(240));
        assert_eq!(split.total(), totals(&entries, &daily).total_expense());
    }

    #[test]
    fn test_income_buckets_partition_entries() {
        let bekam = category("Bekam", true, false);
        let entries = vec![
            entry("2025-03-01", EntryType::Income, 100, Some(bekam.id)),
            entry("2025-03-02", EntryType::Income, 40, None),
            entry("2025-03-03", EntryType::Income, 60, Some(Uuid::new_v4())),
            entry("2025-03-04", EntryType::Income, 5, Some(bekam.id)),
            entry("2025-03-05", EntryType::Expense, 1_000, Some(bekam.id)),
        ];

        let buckets = income_by_category(&entries, &[bekam]);
        assert_eq!(
            buckets,
            vec![
                CategoryAmount::new("Bekam", Decimal::from(105)),
                CategoryAmount::new(OTHER_CATEGORY, Decimal::from(100)),
            ]
        );
        let sum: Decimal = buckets.iter().map(|b| b.amount).sum();
        assert_eq!(sum, totals(&entries, &[]).income);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(totals(&[], &[]), Totals::default());
        assert!(income_by_category(&[], &[]).is_empty());
        assert_eq!(expense_split(&[], &[], &[]).breakdown()[1].amount, Decimal::ZERO);
    }

    #[test]
    fn test_year_month_navigation() {
        let jan = YearMonth::new(2025, 1).unwrap();
        assert_eq!(jan.pred(), YearMonth::new(2024, 12).unwrap());
        assert_eq!(jan.pred().succ(), jan);
        assert_eq!(YearMonth::new(2024, 2).unwrap().last_day(), date("2024-02-29"));
        assert_eq!(YearMonth::new(2025, 12).unwrap().last_day(), date("2025-12-31"));
        assert_eq!(YearMonth::new(2025, 8).unwrap().label(), "Agu");
        assert!(YearMonth::new(2025, 13).is_none());

        let six = YearMonth::new(2025, 3).unwrap().trailing(6);
        assert_eq!(six.first(), Some(&YearMonth::new(2024, 10).unwrap()));
        assert_eq!(six.last(), Some(&YearMonth::new(2025, 3).unwrap()));
        assert_eq!(YearMonth::of_year(2025).len(), 12);
    }

    #[test]
    fn test_monthly_trend_buckets_by_year_and_month() {
        let entries = vec![
            entry("2025-01-15", EntryType::Saving, 100, None),
            entry("2025-01-31", EntryType::Income, 700, None),
            entry("2024-01-10", EntryType::Saving, 999, None),
            entry("2025-03-01", EntryType::Saving, 50, None),
        ];
        let daily = vec![daily("2025-03-20", 10, None)];
        let months = YearMonth::new(2025, 3).unwrap().trailing(3);

        let trend = monthly_trend(&entries, &daily, &months);
        let labels: Vec<_> = trend.iter().map(|p| p.label).collect();
        assert_eq!(labels, vec!["Jan", "Feb", "Mar"]);
        assert_eq!(trend[0].totals.saving, Decimal::from(100));
        assert_eq!(trend[0].totals.income, Decimal::from(700));
        assert_eq!(trend[1].totals, Totals::default());
        assert_eq!(trend[2].totals.saving, Decimal::from(50));
        assert_eq!(trend[2].totals.net(), Decimal::from(-10));
    }
}
