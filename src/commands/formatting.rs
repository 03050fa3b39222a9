//! Plain-text output of records.

use alfatih_clinic::aggregate::{CategoryAmount, ExpenseSplit, Totals, TrendPoint};
use alfatih_clinic::models::{DailyExpense, FinancialCategory, FinancialEntry, Membership, Patient, find_category, format_rupiah};
use alfatih_clinic::resolver::NavItem;

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

pub fn print_menu(menu: &[&NavItem]) {
    println!("Menu:");
    for item in menu {
        println!("  {:<20} {}", item.label, item.route);
    }
}

pub fn print_patient(patient: &Patient) {
    println!("Nama:\t\t{}", patient.full_name);
    println!("Kode:\t\t{}", or_dash(patient.patient_code.as_deref()));
    println!("Status:\t\t{}", patient.status.label());
    println!("Telepon:\t{}", or_dash(patient.phone.as_deref()));
    println!("Email:\t\t{}", or_dash(patient.email.as_deref()));
    println!("Alamat:\t\t{}", or_dash(patient.address.as_deref()));
    println!("Keluhan:\t{}", or_dash(patient.complaint.as_deref()));
    match patient.therapy_date {
        Some(date) => println!("Terapi:\t\t{date}"),
        None => println!("Terapi:\t\t-"),
    }
    println!("Catatan:\t{}", or_dash(patient.notes.as_deref()));
}

pub fn print_patient_row(patient: &Patient) {
    println!(
        "{}  {:<10} {:<28} {:<16} {}",
        patient.id,
        or_dash(patient.patient_code.as_deref()),
        patient.full_name,
        or_dash(patient.phone.as_deref()),
        patient.status.label()
    );
}

pub fn print_entry_row(entry: &FinancialEntry, categories: &[FinancialCategory]) {
    let category = find_category(categories, entry.category_id).map(|c| c.name.as_str());
    println!(
        "{}  {}  {:<12} {:<20} {:>16}  {}",
        entry.id,
        entry.entry_date,
        entry.entry_type.label(),
        or_dash(category),
        format_rupiah(entry.amount),
        entry.notes.as_deref().unwrap_or("")
    );
}

pub fn print_expense_row(expense: &DailyExpense, categories: &[FinancialCategory]) {
    let category = find_category(categories, expense.category_id).map(|c| c.name.as_str());
    println!(
        "{}  {}  {:<20} {:>16}  {}",
        expense.id,
        expense.expense_date,
        or_dash(category),
        format_rupiah(expense.amount),
        expense.notes.as_deref().unwrap_or("")
    );
}

pub fn print_category_row(category: &FinancialCategory) {
    let kind = if category.is_income { "Pemasukan" } else { "Pengeluaran" };
    let cost = if category.is_fixed { "Tetap" } else { "Variabel" };
    println!("{}  {:<24} {:<12} {}", category.id, category.name, kind, cost);
}

pub fn print_membership_row(membership: &Membership, active: bool) {
    let until = membership
        .expires_at
        .map(|d| d.to_string())
        .unwrap_or_else(|| "seumur hidup".to_string());
    println!(
        "{}  {}  {:<15} {}  {:<12} {}",
        membership.id,
        membership.patient_id,
        membership.membership_type,
        membership.started_at,
        until,
        if active { "Aktif" } else { "Berakhir" }
    );
}

pub fn print_totals(totals: &Totals) {
    println!("Total Pemasukan:\t\t{}", format_rupiah(totals.income));
    println!("Total Pengeluaran:\t\t{}", format_rupiah(totals.expense));
    println!("Total Tabungan:\t\t\t{}", format_rupiah(totals.saving));
    println!("Pengeluaran Harian:\t\t{}", format_rupiah(totals.daily_expense));
    println!("Saldo Bersih:\t\t\t{}", format_rupiah(totals.net()));
}

pub fn print_breakdowns(income: &[CategoryAmount], split: &ExpenseSplit) {
    println!("Pemasukan per kategori:");
    if income.is_empty() {
        println!("  (tidak ada)");
    }
    for bucket in income {
        println!("  {:<24} {:>16}", bucket.name, format_rupiah(bucket.amount));
    }
    println!("Pengeluaran (Tetap vs Variabel):");
    for bucket in split.breakdown() {
        println!("  {:<24} {:>16}", bucket.name, format_rupiah(bucket.amount));
    }
}

pub fn print_trend(trend: &[TrendPoint]) {
    println!(
        "  {:<9} {:>16} {:>16} {:>16} {:>16}",
        "Bulan", "Pemasukan", "Pengeluaran", "Tabungan", "Saldo"
    );
    for point in trend {
        let t = &point.totals;
        println!(
            "  {:<4}{:<5} {:>16} {:>16} {:>16} {:>16}",
            point.label,
            point.month.year,
            format_rupiah(t.income),
            format_rupiah(t.total_expense()),
            format_rupiah(t.saving),
            format_rupiah(t.net())
        );
    }
}
