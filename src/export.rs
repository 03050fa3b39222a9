//! CSV and Excel export of financial reports.

use std::io::Write;
use std::path::Path;

use chrono::Local;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};

use crate::aggregate::YearMonth;
use crate::error::Result;
use crate::models::finance::{FinancialCategory, FinancialEntry, find_category};
use crate::services::MonthlyReport;

const CSV_HEADERS: [&str; 5] = ["Tanggal", "Tipe", "Kategori", "Jumlah", "Catatan"];

/// `laporan-<year>-<month>.csv`, month without zero padding.
pub fn csv_filename(month: YearMonth) -> String {
    format!("laporan-{}-{}.csv", month.year, month.month)
}

/// Default filename for an Excel export.
pub fn generate_export_filename(prefix: &str) -> String {
    let now = Local::now();
    format!("{prefix}_{ts}.xlsx", ts = now.format("%Y%m%d_%H%M%S"))
}

/// Write entries as CSV: date, type, category name, amount, notes.
pub fn write_entries_csv<W: Write>(
    writer: W,
    entries: &[FinancialEntry],
    categories: &[FinancialCategory],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADERS)?;

    for entry in entries {
        let category = find_category(categories, entry.category_id)
            .map(|c| c.name.as_str())
            .unwrap_or("");
        wtr.write_record([
            entry.entry_date.to_string().as_str(),
            entry.entry_type.as_str(),
            category,
            entry.amount.normalize().to_string().as_str(),
            entry.notes.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Export entries to a CSV file.
pub fn export_entries_to_csv(entries: &[FinancialEntry], categories: &[FinancialCategory], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_entries_csv(file, entries, categories)
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x2E7D32))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin)
}

fn amount(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn write_headers(worksheet: &mut Worksheet, headers: &[&str], format: &Format) -> Result<()> {
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, format)?;
    }
    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

/// Export a monthly report as a workbook with a transactions sheet and a
/// summary sheet.
pub fn export_report_to_excel(report: &MonthlyReport, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = header_format();
    let money = Format::new().set_num_format("#,##0");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Transaksi")?;
    write_headers(worksheet, &CSV_HEADERS, &header)?;

    worksheet.set_column_width(0, 12)?;
    worksheet.set_column_width(1, 14)?;
    worksheet.set_column_width(2, 25)?;
    worksheet.set_column_width(3, 15)?;
    worksheet.set_column_width(4, 40)?;

    for (idx, entry) in report.entries.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet.write_string(row, 0, entry.entry_date.to_string())?;
        worksheet.write_string(row, 1, entry.entry_type.label())?;
        worksheet.write_string(row, 2, report.category_name(entry).unwrap_or(""))?;
        worksheet.write_number_with_format(row, 3, amount(entry.amount), &money)?;
        worksheet.write_string(row, 4, entry.notes.as_deref().unwrap_or(""))?;
    }

    if !report.entries.is_empty() {
        worksheet.autofilter(0, 0, report.entries.len() as u32, 4)?;
    }

    let summary = workbook.add_worksheet();
    summary.set_name("Ringkasan")?;
    write_headers(summary, &["Bulan", "Pemasukan", "Pengeluaran", "Tabungan", "Pengeluaran Harian", "Saldo"], &header)?;
    summary.set_column_width(0, 12)?;
    for col in 1..=5 {
        summary.set_column_width(col, 18)?;
    }

    for (idx, point) in report.trend.iter().enumerate() {
        let row = (idx + 1) as u32;
        let t = &point.totals;
        summary.write_string(row, 0, format!("{} {}", point.label, point.month.year))?;
        summary.write_number_with_format(row, 1, amount(t.income), &money)?;
        summary.write_number_with_format(row, 2, amount(t.expense), &money)?;
        summary.write_number_with_format(row, 3, amount(t.saving), &money)?;
        summary.write_number_with_format(row, 4, amount(t.daily_expense), &money)?;
        summary.write_number_with_format(row, 5, amount(t.net()), &money)?;
    }

    // Selected month breakdowns below the trend.
    let mut row = report.trend.len() as u32 + 2;
    summary.write_string_with_format(row, 0, "Pemasukan per Kategori", &header)?;
    for bucket in &report.income_by_category {
        row += 1;
        summary.write_string(row, 0, &bucket.name)?;
        summary.write_number_with_format(row, 1, amount(bucket.amount), &money)?;
    }

    row += 2;
    summary.write_string_with_format(row, 0, "Pengeluaran", &header)?;
    for bucket in report.expense_split.breakdown() {
        row += 1;
        summary.write_string(row, 0, &bucket.name)?;
        summary.write_number_with_format(row, 1, amount(bucket.amount), &money)?;
    }

    workbook.save(path)?;
    Ok(())
}
