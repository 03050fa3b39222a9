use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use uuid::Uuid;

use alfatih_clinic::aggregate::{self, YearMonth};
use alfatih_clinic::db::financial_entry::{self, EntryFilter};
use alfatih_clinic::db::{category, daily_expense};
use alfatih_clinic::export;
use alfatih_clinic::models::{
    CreateCategory, CreateDailyExpense, CreateFinancialEntry, DailyExpense, EntryType, UpdateCategory,
    UpdateDailyExpense, UpdateFinancialEntry, format_rupiah, parse_amount,
};
use alfatih_clinic::resolver::Route;

use super::formatting::{print_category_row, print_entry_row, print_expense_row};
use super::{Context, confirm_delete, patch_id, patch_text};

fn amount_patch(value: Option<String>) -> Result<Option<Decimal>> {
    Ok(value.as_deref().map(parse_amount).transpose()?)
}

#[derive(Subcommand, Debug)]
pub enum Transactions {
    /// List entries, latest date first
    List(ListTransactions),
    /// Record an entry
    Add(AddTransaction),
    /// Edit an entry; an empty value clears optional fields
    Edit(EditTransaction),
    /// Delete an entry
    Delete {
        id: Uuid,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct ListTransactions {
    /// First date (inclusive)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last date (inclusive)
    #[arg(long)]
    pub to: Option<NaiveDate>,
    #[arg(long)]
    pub patient: Option<Uuid>,
    #[arg(long = "type")]
    pub entry_type: Option<EntryType>,
    /// Also write the listed entries to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AddTransaction {
    #[arg(long = "type")]
    pub entry_type: EntryType,
    #[arg(short, long)]
    pub amount: String,
    /// Entry date, today when omitted
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub category: Option<Uuid>,
    #[arg(long)]
    pub patient: Option<Uuid>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditTransaction {
    pub id: Uuid,
    #[arg(long = "type")]
    pub entry_type: Option<EntryType>,
    #[arg(short, long)]
    pub amount: Option<String>,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub patient: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl Transactions {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let session = ctx.staff(Route::Transactions).await?;
        let db = &ctx.client;

        match self {
            Transactions::List(args) => {
                let filter = EntryFilter {
                    from: args.from,
                    to: args.to,
                    patient_id: args.patient,
                    entry_type: args.entry_type,
                };
                let entries = financial_entry::list(db, &filter).await?;
                let categories = category::list_all(db).await?;
                for entry in &entries {
                    print_entry_row(entry, &categories);
                }
                let totals = aggregate::totals(&entries, &[]);
                println!(
                    "{} transaksi | Pemasukan {} | Pengeluaran {} | Tabungan {}",
                    entries.len(),
                    format_rupiah(totals.income),
                    format_rupiah(totals.expense),
                    format_rupiah(totals.saving)
                );
                if let Some(path) = args.csv {
                    export::export_entries_to_csv(&entries, &categories, &path)?;
                    println!("CSV ditulis ke {}", path.display());
                }
            }
            Transactions::Add(args) => {
                let data = CreateFinancialEntry {
                    entry_date: args.date.unwrap_or_else(|| Local::now().date_naive()),
                    entry_type: args.entry_type,
                    amount: parse_amount(&args.amount)?,
                    category_id: args.category,
                    patient_id: args.patient,
                    notes: patch_text(args.notes).flatten(),
                };
                let entry = financial_entry::create(db, session.user_id(), data).await?;
                println!(
                    "{} {} dicatat ({})",
                    entry.entry_type.label(),
                    format_rupiah(entry.amount),
                    entry.id
                );
            }
            Transactions::Edit(args) => {
                let update = UpdateFinancialEntry {
                    entry_date: args.date,
                    entry_type: args.entry_type,
                    amount: amount_patch(args.amount)?,
                    category_id: patch_id(args.category)?,
                    patient_id: patch_id(args.patient)?,
                    notes: patch_text(args.notes),
                };
                match financial_entry::update(db, args.id, update).await? {
                    Some(entry) => println!("Transaksi {} diperbarui", entry.id),
                    None => println!("Transaksi {} tidak ditemukan", args.id),
                }
            }
            Transactions::Delete { id, yes } => {
                if !confirm_delete("transaksi", id, yes)? {
                    return Ok(());
                }
                if financial_entry::delete(db, id).await? {
                    println!("Transaksi {id} dihapus");
                } else {
                    println!("Transaksi {id} tidak ditemukan");
                }
            }
        }
        Ok(())
    }
}

#[derive(Subcommand, Debug)]
pub enum Expenses {
    /// List daily expenses, latest date first
    List {
        /// Limit to one month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
    },
    /// Record a daily expense
    Add {
        #[arg(short, long)]
        amount: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        category: Option<Uuid>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Edit a daily expense; an empty value clears optional fields
    Edit {
        id: Uuid,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a daily expense
    Delete {
        id: Uuid,
        #[arg(short, long)]
        yes: bool,
    },
}

/// Sum of the expenses dated `today`.
fn total_on(expenses: &[DailyExpense], today: NaiveDate) -> Decimal {
    expenses.iter().filter(|e| e.expense_date == today).map(|e| e.amount).sum()
}

fn parse_month(value: &str) -> Result<YearMonth> {
    let (year, month) = value
        .split_once('-')
        .ok_or_else(|| anyhow::anyhow!("Bulan harus berformat YYYY-MM"))?;
    YearMonth::new(year.parse()?, month.parse()?).ok_or_else(|| anyhow::anyhow!("Bulan tidak valid: {value}"))
}

impl Expenses {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let session = ctx.staff(Route::Expenses).await?;
        let db = &ctx.client;

        match self {
            Expenses::List { month } => {
                let expenses = match month.as_deref() {
                    Some(value) => {
                        let month = parse_month(value)?;
                        daily_expense::get_by_date_range(db, month.first_day(), month.last_day()).await?
                    }
                    None => daily_expense::list_all(db).await?,
                };
                let categories = category::list_expense(db).await?;
                for expense in &expenses {
                    print_expense_row(expense, &categories);
                }
                let total: Decimal = expenses.iter().map(|e| e.amount).sum();
                let today_total = total_on(&expenses, Local::now().date_naive());
                println!(
                    "{} pengeluaran | Total {} | Pengeluaran Hari Ini {}",
                    expenses.len(),
                    format_rupiah(total),
                    format_rupiah(today_total)
                );
            }
            Expenses::Add {
                amount,
                date,
                category,
                notes,
            } => {
                let data = CreateDailyExpense {
                    expense_date: date.unwrap_or_else(|| Local::now().date_naive()),
                    amount: parse_amount(&amount)?,
                    category_id: category,
                    notes: patch_text(notes).flatten(),
                };
                let expense = daily_expense::create(db, session.user_id(), data).await?;
                println!("Pengeluaran {} dicatat ({})", format_rupiah(expense.amount), expense.id);
            }
            Expenses::Edit {
                id,
                amount,
                date,
                category,
                notes,
            } => {
                let update = UpdateDailyExpense {
                    expense_date: date,
                    amount: amount_patch(amount)?,
                    category_id: patch_id(category)?,
                    notes: patch_text(notes),
                };
                match daily_expense::update(db, id, update).await? {
                    Some(expense) => println!("Pengeluaran {} diperbarui", expense.id),
                    None => println!("Pengeluaran {id} tidak ditemukan"),
                }
            }
            Expenses::Delete { id, yes } => {
                if !confirm_delete("pengeluaran", id, yes)? {
                    return Ok(());
                }
                if daily_expense::delete(db, id).await? {
                    println!("Pengeluaran {id} dihapus");
                } else {
                    println!("Pengeluaran {id} tidak ditemukan");
                }
            }
        }
        Ok(())
    }
}

#[derive(Subcommand, Debug)]
pub enum Categories {
    /// List categories by name
    List {
        /// Only expense categories
        #[arg(long)]
        expense: bool,
    },
    /// Add a category
    Add {
        name: String,
        /// Income category (default: expense)
        #[arg(long)]
        income: bool,
        /// Fixed cost (default: variable)
        #[arg(long)]
        fixed: bool,
    },
    /// Rename a category
    Rename { id: Uuid, name: String },
    /// Delete a category
    Delete {
        id: Uuid,
        #[arg(short, long)]
        yes: bool,
    },
}

impl Categories {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        ctx.staff(Route::Transactions).await?;
        let db = &ctx.client;

        match self {
            Categories::List { expense } => {
                let categories = if expense {
                    category::list_expense(db).await?
                } else {
                    category::list_all(db).await?
                };
                for c in &categories {
                    print_category_row(c);
                }
            }
            Categories::Add { name, income, fixed } => {
                let created = category::create(
                    db,
                    CreateCategory {
                        name,
                        is_income: income,
                        is_fixed: fixed,
                    },
                )
                .await?;
                print_category_row(&created);
            }
            Categories::Rename { id, name } => {
                match category::update(db, id, UpdateCategory { name: Some(name) }).await? {
                    Some(updated) => print_category_row(&updated),
                    None => println!("Kategori {id} tidak ditemukan"),
                }
            }
            Categories::Delete { id, yes } => {
                if !confirm_delete("kategori", id, yes)? {
                    return Ok(());
                }
                if category::delete(db, id).await? {
                    println!("Kategori {id} dihapus");
                } else {
                    println!("Kategori {id} tidak ditemukan");
                }
            }
        }
        Ok(())
    }
}
