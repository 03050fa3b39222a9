use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Subcommand;
use uuid::Uuid;

use alfatih_clinic::db::membership;
use alfatih_clinic::models::{CreateMembership, UpdateMembership};
use alfatih_clinic::resolver::Route;

use super::formatting::print_membership_row;
use super::{Context, confirm_delete, patch_text};

#[derive(Subcommand, Debug)]
pub enum Memberships {
    /// List memberships, most recently started first
    List {
        #[arg(long)]
        patient: Option<Uuid>,
        /// Only active memberships
        #[arg(long)]
        active: bool,
    },
    /// Add a membership
    Add {
        #[arg(long)]
        patient: Uuid,
        /// Membership type, e.g. Gold
        #[arg(long = "type")]
        membership_type: String,
        /// Start date, today when omitted
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Expiry date; omit for a lifetime membership
        #[arg(long)]
        expires: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Edit a membership; `--expires ""` makes it lifetime
    Edit {
        id: Uuid,
        #[arg(long = "type")]
        membership_type: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        expires: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a membership
    Delete {
        id: Uuid,
        #[arg(short, long)]
        yes: bool,
    },
}

impl Memberships {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        ctx.staff(Route::Patients).await?;
        let db = &ctx.client;
        let today = Local::now().date_naive();

        match self {
            Memberships::List { patient, active } => {
                let memberships = match patient {
                    Some(patient_id) => membership::list_by_patient(db, patient_id).await?,
                    None => membership::list_all(db).await?,
                };
                for m in memberships.iter().filter(|m| !active || m.is_active(today)) {
                    print_membership_row(m, m.is_active(today));
                }
            }
            Memberships::Add {
                patient,
                membership_type,
                start,
                expires,
                notes,
            } => {
                let created = membership::create(
                    db,
                    CreateMembership {
                        patient_id: patient,
                        membership_type,
                        started_at: start.unwrap_or(today),
                        expires_at: expires,
                        notes: patch_text(notes).flatten(),
                    },
                )
                .await?;
                print_membership_row(&created, created.is_active(today));
            }
            Memberships::Edit {
                id,
                membership_type,
                start,
                expires,
                notes,
            } => {
                let expires_at = match patch_text(expires) {
                    None => None,
                    Some(None) => Some(None),
                    Some(Some(v)) => Some(Some(v.parse::<NaiveDate>()?)),
                };
                let update = UpdateMembership {
                    membership_type,
                    started_at: start,
                    expires_at,
                    notes: patch_text(notes),
                };
                match membership::update(db, id, update).await? {
                    Some(updated) => print_membership_row(&updated, updated.is_active(today)),
                    None => println!("Membership {id} tidak ditemukan"),
                }
            }
            Memberships::Delete { id, yes } => {
                if !confirm_delete("membership", id, yes)? {
                    return Ok(());
                }
                if membership::delete(db, id).await? {
                    println!("Membership {id} dihapus");
                } else {
                    println!("Membership {id} tidak ditemukan");
                }
            }
        }
        Ok(())
    }
}
