use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use uuid::Uuid;

use alfatih_clinic::db::patient;
use alfatih_clinic::models::{CreatePatient, PatientStatus, UpdatePatient};
use alfatih_clinic::resolver::Route;

use super::formatting::{print_patient, print_patient_row};
use super::{Context, confirm_delete, patch_text};

#[derive(Subcommand, Debug)]
pub enum Patients {
    /// List patients, newest first
    List(ListPatients),
    /// Show one patient
    Show {
        id: Uuid,
    },
    /// Add a patient
    Add(AddPatient),
    /// Edit a patient; an empty value clears the field
    Edit(EditPatient),
    /// Delete a patient
    Delete {
        id: Uuid,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct ListPatients {
    /// Filter by name, phone, email or code
    #[arg(short, long)]
    pub search: Option<String>,
    #[arg(long)]
    pub status: Option<PatientStatus>,
}

#[derive(Args, Debug)]
pub struct AddPatient {
    #[arg(short = 'n', long)]
    pub full_name: String,
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long, default_value = "calon")]
    pub status: PatientStatus,
    #[arg(long)]
    pub therapy_date: Option<NaiveDate>,
    #[arg(long)]
    pub complaint: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditPatient {
    pub id: Uuid,
    #[arg(short = 'n', long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub status: Option<PatientStatus>,
    /// Therapy date (YYYY-MM-DD); empty clears it
    #[arg(long)]
    pub therapy_date: Option<String>,
    #[arg(long)]
    pub complaint: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl Patients {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        ctx.staff(Route::Patients).await?;
        let db = &ctx.client;

        match self {
            Patients::List(args) => {
                let patients = match args.search.as_deref() {
                    Some(term) => patient::search(db, term).await?,
                    None => patient::list_all(db).await?,
                };
                let mut shown = 0;
                for p in patients.iter().filter(|p| args.status.is_none_or(|s| p.status == s)) {
                    print_patient_row(p);
                    shown += 1;
                }
                println!("{shown} pasien");
            }
            Patients::Show { id } => {
                let found = patient::get_by_id(db, id)
                    .await?
                    .ok_or_else(|| anyhow!("Pasien {id} tidak ditemukan"))?;
                print_patient(&found);
            }
            Patients::Add(args) => {
                let created = patient::create(
                    db,
                    CreatePatient {
                        patient_code: args.code,
                        full_name: args.full_name,
                        phone: args.phone,
                        email: args.email,
                        address: args.address,
                        status: args.status,
                        therapy_date: args.therapy_date,
                        complaint: args.complaint,
                        notes: args.notes,
                    },
                )
                .await?;
                println!("Pasien ditambahkan: {} ({})", created.full_name, created.id);
            }
            Patients::Edit(args) => {
                let therapy_date = match patch_text(args.therapy_date) {
                    None => None,
                    Some(None) => Some(None),
                    Some(Some(v)) => Some(Some(v.parse::<NaiveDate>()?)),
                };
                let update = UpdatePatient {
                    patient_code: patch_text(args.code),
                    full_name: args.full_name,
                    phone: patch_text(args.phone),
                    email: patch_text(args.email),
                    address: patch_text(args.address),
                    status: args.status,
                    therapy_date,
                    complaint: patch_text(args.complaint),
                    notes: patch_text(args.notes),
                };
                match patient::update(db, args.id, update).await? {
                    Some(updated) => println!("Pasien diperbarui: {} [{}]", updated.full_name, updated.status.label()),
                    None => println!("Pasien {} tidak ditemukan", args.id),
                }
            }
            Patients::Delete { id, yes } => {
                if !confirm_delete("pasien", id, yes)? {
                    return Ok(());
                }
                if patient::delete(db, id).await? {
                    println!("Pasien {id} dihapus");
                } else {
                    println!("Pasien {id} tidak ditemukan");
                }
            }
        }
        Ok(())
    }
}
