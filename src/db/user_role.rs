//! Role lookup and assignment on the `user_roles` table.

use serde_json::json;
use uuid::Uuid;

use super::{Backend, Query, Table, decode_row};
use crate::error::Result;
use crate::models::account::{Role, UserRole};

/// Get the role row of a principal. `None` when the principal has no row.
pub async fn get_role(db: &impl Backend, user_id: Uuid) -> Result<Option<Role>> {
    let query = Query::new().eq("user_id", user_id).limit(1);
    let rows = db.select(Table::UserRoles, &query).await?;
    match rows.into_iter().next() {
        Some(row) => {
            let user_role: UserRole = decode_row(Table::UserRoles, row)?;
            Ok(Some(user_role.role))
        }
        None => Ok(None),
    }
}

/// Set the role of a principal. Returns `false` when the principal has no
/// role row to update.
pub async fn set_role(db: &impl Backend, user_id: Uuid, role: Role) -> Result<bool> {
    let query = Query::new().eq("user_id", user_id);
    let rows = db.update(Table::UserRoles, &query, json!({ "role": role })).await?;
    Ok(!rows.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryBackend;

    #[tokio::test]
    async fn test_missing_row() {
        let db = MemoryBackend::new();
        let user = Uuid::new_v4();
        assert_eq!(get_role(&db, user).await.unwrap(), None);
        assert!(!set_role(&db, user, Role::Admin).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let db = MemoryBackend::new();
        let user = Uuid::new_v4();
        db.seed_role(user, Role::Viewer);

        assert!(set_role(&db, user, Role::Kasir).await.unwrap());
        assert_eq!(get_role(&db, user).await.unwrap(), Some(Role::Kasir));
    }
}
