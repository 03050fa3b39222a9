//! Config setup, sign-in/out, registration and the patient view.

use std::path::Path;

use anyhow::{Result, bail};
use chrono::Local;
use clap::Args;
use inquire::Password;

use alfatih_clinic::AppError;
use alfatih_clinic::auth::AuthBackend;
use alfatih_clinic::config::AppConfig;
use alfatih_clinic::models::format_rupiah;
use alfatih_clinic::resolver::{self, Landing, Portal, menu_for};
use alfatih_clinic::services::{self, RegistrationForm};

use super::Context;
use super::formatting::{print_menu, print_patient};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(short, long)]
    pub email: String,
    /// Password (prompted when omitted)
    #[arg(long, env = "ALFATIH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Sign in through the patient portal
    #[arg(long)]
    pub patient: bool,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(short, long)]
    pub email: String,
    #[arg(short = 'n', long)]
    pub full_name: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub complaint: Option<String>,
    /// Password (prompted twice when omitted)
    #[arg(long, env = "ALFATIH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

pub fn init(args: InitArgs, config: AppConfig, path: &Path) -> Result<()> {
    if path.exists() && !args.force {
        bail!("{} already exists, use --force to overwrite", path.display());
    }
    config.validate()?;
    config.save(path)?;
    println!("Config written to {}", path.display());
    Ok(())
}

fn password(given: Option<String>, prompt: &str) -> Result<String> {
    match given {
        Some(password) => Ok(password),
        None => Ok(Password::new(prompt).without_confirmation().prompt()?),
    }
}

pub async fn login(ctx: &Context, args: LoginArgs) -> Result<()> {
    let password = password(args.password, "Password:")?;

    let result = if args.patient {
        resolver::patient_login(&ctx.client, &ctx.client, &args.email, &password).await
    } else {
        resolver::staff_login(&ctx.client, &ctx.client, &args.email, &password).await
    };
    ctx.persist();

    let landing = match result {
        Ok(landing) => landing,
        Err(AppError::AuthFailed(msg)) => bail!("Login gagal: {msg}"),
        Err(e) => return Err(e.into()),
    };

    match &landing {
        Landing::Staff { context, menu } => {
            println!("Masuk sebagai {} ({})", args.email, context.role);
            print_menu(menu);
        }
        Landing::Patient { .. } => println!("Masuk ke portal pasien. Lihat data Anda dengan `me`."),
        Landing::Redirect { to, .. } => println!("Login berhasil, dialihkan ke {to}"),
    }
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    let portal = match ctx.client.session() {
        Some(session) => Portal::of(resolver::resolve_role(&ctx.client, session.user.id).await),
        None => Portal::Staff,
    };
    let route = resolver::sign_out(&ctx.client, portal).await?;
    ctx.persist();
    println!("Keluar. Login kembali di {route}");
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    let Some(session) = ctx.client.current_session().await? else {
        ctx.persist();
        bail!("Belum login");
    };
    ctx.persist();

    let role = resolver::resolve_role(&ctx.client, session.user.id).await;
    println!("User:   {}", session.user.email.as_deref().unwrap_or("-"));
    println!("ID:     {}", session.user.id);
    println!("Peran:  {role}");
    println!("Portal: {}", Portal::of(role).dashboard_route());
    if !role.is_patient() {
        print_menu(&menu_for(role));
    }
    Ok(())
}

pub async fn register(ctx: &Context, args: RegisterArgs) -> Result<()> {
    let (password, confirm_password) = match args.password {
        Some(p) => (p.clone(), p),
        None => (
            password(None, "Password:")?,
            password(None, "Ulangi password:")?,
        ),
    };

    let form = RegistrationForm {
        email: args.email,
        password,
        confirm_password,
        full_name: args.full_name,
        phone: args.phone,
        address: args.address,
        complaint: args.complaint,
    };

    let result = services::register_patient(&ctx.client, &ctx.client, form).await?;
    ctx.persist();
    println!("{}", result.summary());
    Ok(())
}

pub async fn me(ctx: &Context) -> Result<()> {
    let context = ctx.patient().await?;
    let today = Local::now().date_naive();
    let overview = services::patient_overview(&ctx.client, context.user_id(), today).await?;

    print_patient(&overview.patient);

    println!();
    println!("Riwayat transaksi:");
    if overview.transactions.is_empty() {
        println!("  (belum ada)");
    }
    for tx in &overview.transactions {
        println!(
            "  {}  {:<12} {:<20} {:>15}",
            tx.entry.entry_date,
            tx.entry.entry_type.label(),
            tx.category.as_deref().unwrap_or("-"),
            format_rupiah(tx.entry.amount)
        );
    }

    println!();
    println!("Membership:");
    if overview.memberships.is_empty() {
        println!("  (belum ada)");
    }
    for m in &overview.memberships {
        let until = match m.membership.expires_at {
            Some(date) => date.to_string(),
            None => "seumur hidup".to_string(),
        };
        let state = if m.active { "Aktif" } else { "Berakhir" };
        println!(
            "  {:<15} mulai {}  sampai {:<12} {}",
            m.membership.membership_type, m.membership.started_at, until, state
        );
    }
    Ok(())
}
