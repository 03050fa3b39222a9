//! Multi-call flows built on the record access layer and the aggregation
//! engine.

pub mod dashboard;
pub mod patient_portal;
pub mod registration;
pub mod report;

pub use dashboard::{DashboardSummary, dashboard_summary};
pub use patient_portal::{PatientOverview, patient_overview};
pub use registration::{RegistrationForm, RegistrationResult, register_patient};
pub use report::{MonthlyReport, monthly_report};
