//! In-memory backend for tests: same traits as the HTTP client, no network.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{Backend, Filter, FilterOp, Query, Table};
use crate::auth::{AuthBackend, AuthEvent, AuthEvents, Principal, Session, SignUp};
use crate::error::{AppError, Result};
use crate::models::account::Role;

/// Operation kinds that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Select,
    Insert,
    Update,
    Delete,
}

struct User {
    id: Uuid,
    password: String,
}

pub struct MemoryBackend {
    tables: Mutex<HashMap<Table, Vec<Value>>>,
    failures: Mutex<HashSet<(Table, Op)>>,
    auth_down: AtomicBool,
    users: Mutex<HashMap<String, User>>,
    session: Mutex<Option<Session>>,
    events: AuthEvents,
    clock: DateTime<Utc>,
    seq: AtomicUsize,
    calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashSet::new()),
            auth_down: AtomicBool::new(false),
            users: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
            events: AuthEvents::new(),
            clock: Utc::now(),
            seq: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Make every later `op` on `table` fail with a backend error.
    pub fn fail_on(&self, table: Table, op: Op) {
        self.failures.lock().unwrap().insert((table, op));
    }

    /// Make every later session check fail with a backend error.
    pub fn fail_auth(&self) {
        self.auth_down.store(true, AtomicOrdering::SeqCst);
    }

    /// Number of table calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    /// Register a user that can sign in. `role` seeds its `user_roles` row.
    pub fn add_user(&self, email: &str, password: &str, role: Option<Role>) -> Uuid {
        let id = Uuid::new_v4();
        self.users.lock().unwrap().insert(
            email.to_string(),
            User {
                id,
                password: password.to_string(),
            },
        );
        if let Some(role) = role {
            self.seed_role(id, role);
        }
        id
    }

    pub fn seed_role(&self, user_id: Uuid, role: Role) {
        let row = serde_json::json!({ "user_id": user_id, "role": role });
        self.tables.lock().unwrap().entry(Table::UserRoles).or_default().push(row);
    }

    /// All rows of a table, in insertion order.
    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.tables.lock().unwrap().get(&table).cloned().unwrap_or_default()
    }

    fn enter(&self, table: Table, op: Op) -> Result<()> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if self.failures.lock().unwrap().contains(&(table, op)) {
            return Err(AppError::backend(500, format!("{op:?} on {table} failed")));
        }
        Ok(())
    }

    /// Strictly increasing timestamps so "newest first" is deterministic.
    fn next_timestamp(&self) -> String {
        let seq = self.seq.fetch_add(1, AtomicOrdering::SeqCst) as i64;
        (self.clock + Duration::seconds(seq)).to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

fn matches(row: &Value, filter: &Filter) -> bool {
    let Some(actual) = text(row.get(filter.column)) else {
        return false;
    };
    let ordering = compare_text(&actual, &filter.value);
    match filter.op {
        FilterOp::Eq => actual == filter.value,
        FilterOp::Gte => ordering != Ordering::Less,
        FilterOp::Lte => ordering != Ordering::Greater,
    }
}

fn select_rows(rows: &[Value], query: &Query) -> Vec<Value> {
    let mut selected: Vec<Value> = rows
        .iter()
        .filter(|row| query.filters.iter().all(|f| matches(row, f)))
        .cloned()
        .collect();

    for order in query.order.iter().rev() {
        selected.sort_by(|a, b| {
            let ord = match (text(a.get(order.column)), text(b.get(order.column))) {
                (Some(x), Some(y)) => compare_text(&x, &y),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if order.ascending { ord } else { ord.reverse() }
        });
    }

    if let Some(limit) = query.limit {
        selected.truncate(limit);
    }
    selected
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>> {
        self.enter(table, Op::Select)?;
        Ok(select_rows(&self.rows(table), query))
    }

    async fn count(&self, table: Table, query: &Query) -> Result<u64> {
        self.enter(table, Op::Select)?;
        Ok(select_rows(&self.rows(table), query).len() as u64)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value> {
        self.enter(table, Op::Insert)?;
        let Value::Object(mut map) = row else {
            return Err(AppError::backend(400, "row must be an object"));
        };
        map.entry("id").or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        let stamp = self.next_timestamp();
        map.entry("created_at").or_insert(Value::String(stamp));

        let row = Value::Object(map);
        self.tables.lock().unwrap().entry(table).or_default().push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, query: &Query, patch: Value) -> Result<Vec<Value>> {
        self.enter(table, Op::Update)?;
        let patch: Map<String, Value> = match patch {
            Value::Object(map) => map,
            _ => return Err(AppError::backend(400, "patch must be an object")),
        };

        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table).or_default();
        let mut updated = Vec::new();
        for row in rows.iter_mut() {
            if query.filters.iter().all(|f| matches(row, f))
                && let Value::Object(map) = row
            {
                for (key, value) in &patch {
                    map.insert(key.clone(), value.clone());
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: Table, query: &Query) -> Result<u64> {
        self.enter(table, Op::Delete)?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table).or_default();
        let before = rows.len();
        rows.retain(|row| !query.filters.iter().all(|f| matches(row, f)));
        Ok((before - rows.len()) as u64)
    }
}

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let id = {
            let users = self.users.lock().unwrap();
            match users.get(email) {
                Some(user) if user.password == password => user.id,
                _ => return Err(AppError::AuthFailed("Invalid login credentials".into())),
            }
        };

        let session = Session {
            access_token: format!("token-{id}"),
            refresh_token: None,
            expires_at: None,
            user: Principal {
                id,
                email: Some(email.to_string()),
            },
        };
        *self.session.lock().unwrap() = Some(session.clone());
        self.events.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, data: &SignUp) -> Result<Principal> {
        if self.users.lock().unwrap().contains_key(&data.email) {
            return Err(AppError::AuthFailed("User already registered".into()));
        }
        // The hosted backend creates a default role row for every new account.
        let id = self.add_user(&data.email, &data.password, Some(Role::Viewer));
        Ok(Principal {
            id,
            email: Some(data.email.clone()),
        })
    }

    async fn sign_out(&self) -> Result<()> {
        *self.session.lock().unwrap() = None;
        self.events.emit(AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>> {
        if self.auth_down.load(AtomicOrdering::SeqCst) {
            return Err(AppError::backend(500, "auth service unavailable"));
        }
        Ok(self.session.lock().unwrap().clone())
    }

    fn auth_events(&self) -> &AuthEvents {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_filters_compare_numbers_and_dates() {
        let db = MemoryBackend::new();
        for (date, amount) in [("2025-03-01", 5), ("2025-03-15", 50), ("2025-04-01", 500)] {
            db.insert(Table::FinancialEntries, json!({ "entry_date": date, "amount": amount }))
                .await
                .unwrap();
        }

        let query = Query::new().gte("amount", 10).lte("entry_date", "2025-03-31");
        let rows = db.select(Table::FinancialEntries, &query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["amount"], json!(50));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let db = MemoryBackend::new();
        db.fail_on(Table::Patients, Op::Insert);
        let result = db.insert(Table::Patients, json!({ "full_name": "X" })).await;
        assert!(matches!(result, Err(AppError::Backend { status: 500, .. })));
        assert!(db.rows(Table::Patients).is_empty());
    }
}
