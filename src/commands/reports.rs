use std::path::PathBuf;

use anyhow::{Result, anyhow};
use chrono::{Datelike, Local};
use clap::Args;
use tracing::info;

use alfatih_clinic::aggregate::YearMonth;
use alfatih_clinic::config::AppConfig;
use alfatih_clinic::contact::{ContactLinks, ContactPurpose};
use alfatih_clinic::db;
use alfatih_clinic::export;
use alfatih_clinic::models::format_rupiah;
use alfatih_clinic::resolver::Route;
use alfatih_clinic::services;

use super::Context;
use super::formatting::{print_breakdowns, print_totals, print_trend};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Report year, current year when omitted
    #[arg(long)]
    pub year: Option<i32>,
    /// Report month (1-12), current month when omitted
    #[arg(long)]
    pub month: Option<u32>,
    /// Write laporan-<year>-<month>.csv
    #[arg(long)]
    pub csv: bool,
    /// Write an Excel workbook
    #[arg(long)]
    pub xlsx: bool,
    /// Directory for exported files
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct ContactArgs {
    /// booking, question or consultation
    #[arg(default_value = "booking")]
    pub purpose: ContactPurpose,
}

pub async fn status(ctx: &Context) -> Result<()> {
    println!("Klinik:  {}", ctx.config.clinic.name);
    println!("Config:  {}", ctx.config_path.display());
    println!("Backend: {}", ctx.config.backend.url);

    let reachable = ctx.client.test_connection().await?;
    println!("Auth:    {}", if reachable { "OK" } else { "tidak tersedia" });

    ctx.staff(Route::Dashboard).await?;
    db::test_connection(&ctx.client).await?;
    let counts = db::get_table_counts(&ctx.client).await?;
    info!(
        "Tables: {} patients, {} financial entries, {} daily expenses",
        counts.patients, counts.financial_entries, counts.daily_expenses
    );
    println!("Pasien:      {}", counts.patients);
    println!("Transaksi:   {}", counts.financial_entries);
    println!("Pengeluaran: {}", counts.daily_expenses);
    Ok(())
}

pub async fn dashboard(ctx: &Context) -> Result<()> {
    ctx.staff(Route::Dashboard).await?;
    let today = Local::now().date_naive();
    let summary = services::dashboard_summary(&ctx.client, today).await?;

    println!("Dashboard {} {}", summary.month.label(), summary.month.year);
    println!("Total Pasien:\t\t\t{}", summary.patient_count);
    print_totals(&summary.totals);
    println!();
    print_breakdowns(&summary.income_by_category, &summary.expense_split);
    println!();
    println!("Tren Tabungan:");
    for point in &summary.trend {
        println!("  {} {}  {:>16}", point.label, point.month.year, format_rupiah(point.totals.saving));
    }
    Ok(())
}

pub async fn report(ctx: &Context, args: ReportArgs) -> Result<()> {
    ctx.staff(Route::Reports).await?;
    let today = Local::now().date_naive();
    let month = YearMonth::new(args.year.unwrap_or(today.year()), args.month.unwrap_or(today.month()))
        .ok_or_else(|| anyhow!("Bulan harus 1-12"))?;

    let report = services::monthly_report(&ctx.client, month).await?;

    println!("Laporan {} {}", month.label(), month.year);
    print_totals(&report.totals);
    println!();
    print_breakdowns(&report.income_by_category, &report.expense_split);
    println!();
    println!("Tren {}:", month.year);
    print_trend(&report.trend);

    if args.csv {
        let path = args.output_dir.join(export::csv_filename(month));
        export::export_entries_to_csv(&report.entries, &report.categories, &path)?;
        println!("Laporan berhasil diunduh: {}", path.display());
    }
    if args.xlsx {
        let path = args.output_dir.join(export::generate_export_filename("laporan"));
        export::export_report_to_excel(&report, &path)?;
        println!("Excel ditulis ke {}", path.display());
    }
    Ok(())
}

pub fn contact(args: ContactArgs, config: &AppConfig) -> Result<()> {
    let links = ContactLinks::new(&config.clinic);
    println!("WhatsApp: {}", links.whatsapp(args.purpose));
    println!("Lokasi:   {}", links.maps());
    Ok(())
}
