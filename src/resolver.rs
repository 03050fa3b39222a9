//! Session/role resolution: who is signed in, with which role, and where
//! they belong.
//!
//! The landing decision itself ([`landing_for`]) is a pure function of the
//! portal and the resolved [`SessionContext`], so handling the same auth event
//! twice always yields the same destination.

use std::fmt;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::{AuthBackend, AuthEvent, AuthEvents, AuthSubscription, Principal};
use crate::db::{Backend, user_role};
use crate::error::{AppError, Result};
use crate::models::account::Role;

/// Client-side navigation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Auth,
    PatientLogin,
    PatientRegister,
    Dashboard,
    Patients,
    Transactions,
    Expenses,
    Reports,
    PatientDashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Auth => "/auth",
            Route::PatientLogin => "/patient-login",
            Route::PatientRegister => "/patient-register",
            Route::Dashboard => "/dashboard",
            Route::Patients => "/dashboard/patients",
            Route::Transactions => "/dashboard/transactions",
            Route::Expenses => "/dashboard/expenses",
            Route::Reports => "/dashboard/reports",
            Route::PatientDashboard => "/patient-dashboard",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// The two signed-in areas, each with its own login entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Portal {
    Staff,
    Patient,
}

impl Portal {
    pub fn login_route(&self) -> Route {
        match self {
            Portal::Staff => Route::Auth,
            Portal::Patient => Route::PatientLogin,
        }
    }

    pub fn dashboard_route(&self) -> Route {
        match self {
            Portal::Staff => Route::Dashboard,
            Portal::Patient => Route::PatientDashboard,
        }
    }

    /// The portal a role belongs to.
    pub fn of(role: Role) -> Portal {
        if role.is_patient() { Portal::Patient } else { Portal::Staff }
    }
}

/// Staff navigation item with the roles allowed to see it.
#[derive(Debug, PartialEq, Eq)]
pub struct NavItem {
    pub route: Route,
    pub label: &'static str,
    pub roles: &'static [Role],
}

impl NavItem {
    pub fn allows(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

const ALL_STAFF: &[Role] = &[Role::Admin, Role::Staff, Role::Kasir, Role::Viewer];
const NO_KASIR: &[Role] = &[Role::Admin, Role::Staff, Role::Viewer];

/// Staff dashboard menu, in display order.
pub static MENU: [NavItem; 5] = [
    NavItem {
        route: Route::Dashboard,
        label: "Dashboard",
        roles: ALL_STAFF,
    },
    NavItem {
        route: Route::Patients,
        label: "Data Pasien",
        roles: NO_KASIR,
    },
    NavItem {
        route: Route::Transactions,
        label: "Transaksi",
        roles: ALL_STAFF,
    },
    NavItem {
        route: Route::Expenses,
        label: "Pengeluaran Harian",
        roles: ALL_STAFF,
    },
    NavItem {
        route: Route::Reports,
        label: "Laporan",
        roles: NO_KASIR,
    },
];

/// Menu items visible to a role.
pub fn menu_for(role: Role) -> Vec<&'static NavItem> {
    MENU.iter().filter(|item| item.allows(role)).collect()
}

/// Resolved principal and role, passed explicitly to whatever needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub principal: Principal,
    pub role: Role,
}

impl SessionContext {
    pub fn user_id(&self) -> Uuid {
        self.principal.id
    }

    /// Whether the staff menu lets this role open `route`.
    pub fn can_open(&self, route: Route) -> bool {
        MENU.iter().any(|item| item.route == route && item.allows(self.role))
    }
}

/// Where a principal ends up after a session check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Landing {
    /// Stay on the staff dashboard shell with a filtered menu.
    Staff {
        context: SessionContext,
        menu: Vec<&'static NavItem>,
    },
    /// Stay on the patient dashboard.
    Patient { context: SessionContext },
    /// Leave for another route, optionally with a notice for the user.
    Redirect { to: Route, notice: Option<&'static str> },
}

impl Landing {
    fn redirect(to: Route) -> Self {
        Landing::Redirect { to, notice: None }
    }

    /// The route the principal is on after this landing.
    pub fn route(&self) -> Route {
        match self {
            Landing::Staff { .. } => Route::Dashboard,
            Landing::Patient { .. } => Route::PatientDashboard,
            Landing::Redirect { to, .. } => *to,
        }
    }

    pub fn context(&self) -> Option<&SessionContext> {
        match self {
            Landing::Staff { context, .. } | Landing::Patient { context } => Some(context),
            Landing::Redirect { .. } => None,
        }
    }
}

pub const NOTICE_NOT_PATIENT: &str = "Akses ditolak. Anda bukan pasien.";
pub const NOTICE_SIGNED_OUT: &str = "Sesi berakhir, silakan login kembali.";

/// Decide the landing for a resolved context entering `portal`.
pub fn landing_for(portal: Portal, context: SessionContext) -> Landing {
    match (portal, context.role.is_patient()) {
        (Portal::Staff, true) => Landing::redirect(Route::PatientDashboard),
        (Portal::Staff, false) => {
            let menu = menu_for(context.role);
            Landing::Staff { context, menu }
        }
        (Portal::Patient, true) => Landing::Patient { context },
        (Portal::Patient, false) => Landing::Redirect {
            to: Route::Dashboard,
            notice: Some(NOTICE_NOT_PATIENT),
        },
    }
}

/// Look up a principal's role. A missing row or a failed lookup both yield
/// [`Role::Viewer`].
pub async fn resolve_role(db: &impl Backend, user_id: Uuid) -> Role {
    match user_role::get_role(db, user_id).await {
        Ok(Some(role)) => role,
        Ok(None) => Role::Viewer,
        Err(e) => {
            warn!("Error fetching role for {user_id}, falling back to viewer: {e}");
            Role::Viewer
        }
    }
}

async fn resolve_context(db: &impl Backend, principal: Principal) -> SessionContext {
    let role = resolve_role(db, principal.id).await;
    SessionContext { principal, role }
}

/// Session check on entering a portal's dashboard.
pub async fn check_session(auth: &impl AuthBackend, db: &impl Backend, portal: Portal) -> Landing {
    let session = match auth.current_session().await {
        Ok(Some(session)) => session,
        Ok(None) => return Landing::redirect(portal.login_route()),
        Err(e) => {
            error!("Auth check error: {e}");
            return Landing::redirect(portal.login_route());
        }
    };

    let context = resolve_context(db, session.user).await;
    landing_for(portal, context)
}

/// Session check on a login page: an already signed-in principal is sent to
/// the dashboard of its role.
pub async fn login_page_redirect(auth: &impl AuthBackend, db: &impl Backend) -> Option<Route> {
    match auth.current_session().await {
        Ok(Some(session)) => {
            let role = resolve_role(db, session.user.id).await;
            Some(Portal::of(role).dashboard_route())
        }
        Ok(None) => None,
        Err(e) => {
            warn!("Session check on login page failed: {e}");
            None
        }
    }
}

/// Staff login: any role is accepted; patients are sent to their dashboard.
pub async fn staff_login(auth: &impl AuthBackend, db: &impl Backend, email: &str, password: &str) -> Result<Landing> {
    let session = auth.sign_in(email, password).await?;
    let context = resolve_context(db, session.user).await;
    info!("Staff login: {} as {}", context.user_id(), context.role);
    Ok(landing_for(Portal::Staff, context))
}

/// Patient login: non-patient principals are signed out again and rejected.
pub async fn patient_login(
    auth: &impl AuthBackend,
    db: &impl Backend,
    email: &str,
    password: &str,
) -> Result<Landing> {
    let session = auth.sign_in(email, password).await?;
    let context = resolve_context(db, session.user).await;

    if !context.role.is_patient() {
        warn!("Non-patient {} tried the patient login", context.user_id());
        if let Err(e) = auth.sign_out().await {
            error!("Sign-out after rejected patient login failed: {e}");
        }
        return Err(AppError::WrongPortal(
            "Akun ini bukan akun pasien. Silakan login di halaman admin.".into(),
        ));
    }

    Ok(landing_for(Portal::Patient, context))
}

/// Sign out and return the login route of the portal.
pub async fn sign_out(auth: &impl AuthBackend, portal: Portal) -> Result<Route> {
    auth.sign_out().await?;
    Ok(portal.login_route())
}

/// Observer of auth-state changes for one portal.
///
/// Attach when a portal is entered; dropping the resolver detaches it.
pub struct RoleResolver {
    portal: Portal,
    subscription: AuthSubscription,
    context: Option<SessionContext>,
}

impl RoleResolver {
    pub fn attach(portal: Portal, events: &AuthEvents) -> Self {
        Self {
            portal,
            subscription: events.subscribe(),
            context: None,
        }
    }

    pub fn portal(&self) -> Portal {
        self.portal
    }

    /// Context from the last handled event.
    pub fn context(&self) -> Option<&SessionContext> {
        self.context.as_ref()
    }

    /// Apply one auth event. Idempotent: the same event and role always give
    /// the same landing.
    pub async fn handle(&mut self, event: &AuthEvent, db: &impl Backend) -> Landing {
        match event {
            AuthEvent::SignedOut => {
                self.context = None;
                Landing::Redirect {
                    to: self.portal.login_route(),
                    notice: Some(NOTICE_SIGNED_OUT),
                }
            }
            AuthEvent::SignedIn(session) => {
                let context = resolve_context(db, session.user.clone()).await;
                let landing = landing_for(self.portal, context);
                self.context = landing.context().cloned();
                landing
            }
        }
    }

    /// Wait for the next auth event and apply it. `None` once the event
    /// source is gone.
    pub async fn next_landing(&mut self, db: &impl Backend) -> Option<Landing> {
        let event = self.subscription.next().await?;
        Some(self.handle(&event, db).await)
    }

    /// Apply every event already delivered; returns the last landing.
    pub async fn drain(&mut self, db: &impl Backend) -> Option<Landing> {
        let mut last = None;
        while let Some(event) = self.subscription.try_next() {
            last = Some(self.handle(&event, db).await);
        }
        last
    }
}
