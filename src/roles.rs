//! Role Storage
//!
//! Roles live in `roles` and are attached through `users_roles`. Every
//! grant or removal writes a `role_audits` row naming the acting user.

use crate::error::AuthError;
use crate::models::{Role, RoleAuditAction};

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Roles currently granted to a user
pub async fn fetch_roles(db: &PgPool, user_id: Uuid) -> Result<Vec<Role>, AuthError> {
    let names: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT r.name FROM roles r
        JOIN users_roles ur ON ur.role_id = r.id
        WHERE ur.user_id = $1
        ORDER BY r.name
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(names
        .into_iter()
        .filter_map(|(name,)| match name.parse::<Role>() {
            Ok(role) => Some(role),
            Err(_) => {
                tracing::warn!(user_id = %user_id, role = %name, "Ignoring unknown role");
                None
            }
        })
        .collect())
}

/// Grant a role; returns false when the user already had it
pub async fn grant_role(
    conn: &mut PgConnection,
    user_id: Uuid,
    role: Role,
    whodunnit: Option<Uuid>,
) -> Result<bool, AuthError> {
    let (role_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO roles (name) VALUES ($1)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(role.as_str())
    .fetch_one(&mut *conn)
    .await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO users_roles (user_id, role_id) VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(role_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if inserted == 0 {
        return Ok(false);
    }

    record_audit(conn, user_id, role_id, RoleAuditAction::Added, whodunnit).await?;
    tracing::info!(user_id = %user_id, role = %role, whodunnit = ?whodunnit, "Role added");

    Ok(true)
}

/// Remove a role; returns false when the user did not have it
pub async fn revoke_role(
    conn: &mut PgConnection,
    user_id: Uuid,
    role: Role,
    whodunnit: Option<Uuid>,
) -> Result<bool, AuthError> {
    let removed: Option<(Uuid,)> = sqlx::query_as(
        r#"
        DELETE FROM users_roles ur
        USING roles r
        WHERE ur.role_id = r.id AND ur.user_id = $1 AND r.name = $2
        RETURNING r.id
        "#,
    )
    .bind(user_id)
    .bind(role.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    let Some((role_id,)) = removed else {
        return Ok(false);
    };

    record_audit(conn, user_id, role_id, RoleAuditAction::Removed, whodunnit).await?;
    tracing::info!(user_id = %user_id, role = %role, whodunnit = ?whodunnit, "Role removed");

    Ok(true)
}

async fn record_audit(
    conn: &mut PgConnection,
    user_id: Uuid,
    role_id: Uuid,
    action: RoleAuditAction,
    whodunnit: Option<Uuid>,
) -> Result<(), AuthError> {
    sqlx::query(
        r#"
        INSERT INTO role_audits (user_id, role_id, action, whodunnit)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_id)
    .bind(role_id)
    .bind(action.as_str())
    .bind(whodunnit.map(|id| id.to_string()))
    .execute(conn)
    .await?;

    Ok(())
}
