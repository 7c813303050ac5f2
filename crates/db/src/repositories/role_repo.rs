//! Repository for the `roles` lookup table and `user_roles` assignments.

use std::collections::HashMap;

use notekeep_core::types::DbId;
use sqlx::PgConnection;

use crate::models::role::Role;

/// Provides role lookups and user role assignment.
pub struct RoleRepo;

impl RoleRepo {
    /// Find a role by its unique name (e.g. `"admin"`).
    pub async fn find_by_name(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>(
            "SELECT id, name, description, created_at FROM roles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(conn)
        .await
    }

    /// Grant a role to a user. Granting a role twice is a no-op.
    pub async fn assign(
        conn: &mut PgConnection,
        user_id: DbId,
        role_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Names of every role granted to a user, sorted.
    pub async fn names_for_user(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT r.name FROM roles r
             JOIN user_roles ur ON ur.role_id = r.id
             WHERE ur.user_id = $1
             ORDER BY r.name",
        )
        .bind(user_id)
        .fetch_all(conn)
        .await
    }

    /// Role names for a batch of users, grouped by user id.
    pub async fn names_for_users(
        conn: &mut PgConnection,
        user_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<String>>, sqlx::Error> {
        let rows: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT ur.user_id, r.name FROM user_roles ur
             JOIN roles r ON r.id = ur.role_id
             WHERE ur.user_id = ANY($1)
             ORDER BY ur.user_id, r.name",
        )
        .bind(user_ids)
        .fetch_all(conn)
        .await?;

        let mut grouped: HashMap<DbId, Vec<String>> = HashMap::new();
        for (user_id, name) in rows {
            grouped.entry(user_id).or_default().push(name);
        }
        Ok(grouped)
    }
}
