//! Data models for patients, finances, memberships and accounts.

pub mod account;
pub mod expense;
pub mod finance;
pub mod membership;
pub mod money;
pub mod patient;

pub use account::{CreatePatientAccount, PatientAccount, Role, UpdatePatientAccount, UserRole};
pub use expense::{CreateDailyExpense, DailyExpense, UpdateDailyExpense};
pub use finance::{
    CreateCategory, CreateFinancialEntry, EntryType, FinancialCategory, FinancialEntry, UpdateCategory,
    UpdateFinancialEntry, find_category,
};
pub use membership::{CreateMembership, Membership, UpdateMembership};
pub use money::{format_rupiah, parse_amount};
pub use patient::{CreatePatient, Patient, PatientStatus, UpdatePatient};
