//! Command-line surface of the console.

mod finance;
mod formatting;
mod memberships;
mod patients;
mod reports;
mod session;

use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::Confirm;
use tracing::error;
use uuid::Uuid;

use alfatih_clinic::auth::SessionStore;
use alfatih_clinic::client::BackendClient;
use alfatih_clinic::config::AppConfig;
use alfatih_clinic::resolver::{self, Landing, Portal, Route, SessionContext};

pub use finance::{Categories, Expenses, Transactions};
pub use memberships::Memberships;
pub use patients::Patients;
pub use reports::{ContactArgs, ReportArgs};
pub use session::{InitArgs, LoginArgs, RegisterArgs};

/// Back-office console for Rumah Sehat Al-Fatih.
#[derive(Parser, Debug)]
#[command(name = "alfatih-clinic", version)]
pub struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long, global = true)]
    pub dev: bool,

    /// Explicit config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend project URL
    #[arg(long, env = "ALFATIH_BACKEND_URL", global = true)]
    pub url: Option<String>,

    /// Backend anon key
    #[arg(long, env = "ALFATIH_ANON_KEY", global = true, hide_env_values = true)]
    pub anon_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the config file
    Init(InitArgs),
    /// Check backend reachability and table counts
    Status,
    /// Sign in (staff by default)
    Login(LoginArgs),
    /// Sign out
    Logout,
    /// Show the signed-in principal, role and menu
    Whoami,
    /// Register as a new patient
    Register(RegisterArgs),
    /// Patient records
    #[command(subcommand)]
    Patients(Patients),
    /// Financial entries
    #[command(subcommand)]
    Transactions(Transactions),
    /// Daily expense ledger
    #[command(subcommand)]
    Expenses(Expenses),
    /// Financial categories
    #[command(subcommand)]
    Categories(Categories),
    /// Patient memberships
    #[command(subcommand)]
    Memberships(Memberships),
    /// Current month dashboard
    Dashboard,
    /// Monthly report with optional CSV/Excel export
    Report(ReportArgs),
    /// Patient view of the signed-in patient
    Me,
    /// WhatsApp and maps links
    Contact(ContactArgs),
}

/// Shared state of one command invocation.
pub struct Context {
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub client: BackendClient,
    pub store: SessionStore,
}

impl Context {
    fn new(config: AppConfig, config_path: PathBuf) -> Result<Self> {
        config.validate().map_err(|e| {
            anyhow!(
                "{e}. Run `alfatih-clinic init` or set ALFATIH_BACKEND_URL / ALFATIH_ANON_KEY"
            )
        })?;
        let store = SessionStore::new(AppConfig::session_path());
        let client = BackendClient::new(&config.backend)?.with_session(store.load());
        Ok(Self {
            config,
            config_path,
            client,
            store,
        })
    }

    /// Resolve the staff session and check the role may open `route`.
    pub async fn staff(&self, route: Route) -> Result<SessionContext> {
        let landing = resolver::check_session(&self.client, &self.client, Portal::Staff).await;
        self.persist();
        match landing {
            Landing::Staff { context, .. } => {
                if !context.can_open(route) {
                    bail!("Peran {} tidak memiliki akses ke {}", context.role, route);
                }
                Ok(context)
            }
            other => Err(redirect_error(&other)),
        }
    }

    /// Resolve the patient session.
    pub async fn patient(&self) -> Result<SessionContext> {
        let landing = resolver::check_session(&self.client, &self.client, Portal::Patient).await;
        self.persist();
        match landing {
            Landing::Patient { context } => Ok(context),
            other => Err(redirect_error(&other)),
        }
    }

    /// Store the client's current session for the next invocation.
    pub fn persist(&self) {
        let result = match self.client.session() {
            Some(session) => self.store.save(&session),
            None => self.store.clear(),
        };
        if let Err(e) = result {
            error!("Failed to persist session at {:?}: {}", self.store.path(), e);
        }
    }
}

fn redirect_error(landing: &Landing) -> anyhow::Error {
    let hint = match landing.route() {
        Route::Auth => "Belum login. Jalankan `alfatih-clinic login`.".to_string(),
        Route::PatientLogin => "Belum login. Jalankan `alfatih-clinic login --patient`.".to_string(),
        Route::PatientDashboard => "Akun pasien. Gunakan `alfatih-clinic me`.".to_string(),
        Route::Dashboard => "Akun staf. Gunakan `alfatih-clinic dashboard`.".to_string(),
        other => format!("Dialihkan ke {other}"),
    };
    match landing {
        Landing::Redirect {
            notice: Some(notice), ..
        } => anyhow!("{notice} {hint}"),
        _ => anyhow!(hint),
    }
}

/// Ask before deleting unless `--yes` was given.
pub fn confirm_delete(what: &str, id: Uuid, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    let answer = Confirm::new(&format!("Hapus {what} {id}?"))
        .with_default(false)
        .prompt()?;
    Ok(answer)
}

/// Run one command.
pub async fn run(command: Command, config: AppConfig, config_path: PathBuf) -> Result<()> {
    if let Command::Init(args) = command {
        return session::init(args, config, &config_path);
    }
    if let Command::Contact(args) = command {
        return reports::contact(args, &config);
    }

    let ctx = Context::new(config, config_path)?;
    match command {
        Command::Status => reports::status(&ctx).await,
        Command::Login(args) => session::login(&ctx, args).await,
        Command::Logout => session::logout(&ctx).await,
        Command::Whoami => session::whoami(&ctx).await,
        Command::Register(args) => session::register(&ctx, args).await,
        Command::Patients(cmd) => cmd.run(&ctx).await,
        Command::Transactions(cmd) => cmd.run(&ctx).await,
        Command::Expenses(cmd) => cmd.run(&ctx).await,
        Command::Categories(cmd) => cmd.run(&ctx).await,
        Command::Memberships(cmd) => cmd.run(&ctx).await,
        Command::Dashboard => reports::dashboard(&ctx).await,
        Command::Report(args) => reports::report(&ctx, args).await,
        Command::Me => session::me(&ctx).await,
        Command::Init(_) | Command::Contact(_) => Ok(()),
    }
}

/// Turn an edit argument into a patch: absent keeps, empty clears.
pub fn patch_text(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| {
        let v = v.trim().to_string();
        if v.is_empty() { None } else { Some(v) }
    })
}

/// Like [`patch_text`] for an id reference.
pub fn patch_id(value: Option<String>) -> Result<Option<Option<Uuid>>> {
    match patch_text(value) {
        None => Ok(None),
        Some(None) => Ok(Some(None)),
        Some(Some(v)) => Ok(Some(Some(v.parse()?))),
    }
}
