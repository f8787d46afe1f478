//! User resources
//!
//! Every handler here runs behind `require_auth` and checks `UserPolicy`
//! before touching the record.

use super::AppState;
use crate::error::AuthError;
use crate::extractors::{CurrentUser, JsonBody, PathParam};
use crate::jobs::Job;
use crate::models::*;
use crate::policy::{authorize, UserPolicy};

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

fn resource(user: &User, roles: &[Role]) -> UserResource {
    UserResource::from(UserAttributes::new(user, roles))
}

/// GET /api/v1/users
pub async fn index(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse, AuthError> {
    let scope = UserPolicy::new(&current).scope();
    let users = state.users.list(scope).await?;

    let data: Vec<UserResource> = users
        .iter()
        .map(|(user, roles)| resource(user, roles))
        .collect();

    Ok(Json(Document { data }))
}

/// GET /api/v1/users/me
pub async fn me(current: CurrentUser) -> Result<impl IntoResponse, AuthError> {
    authorize(UserPolicy::new(&current).me())?;

    Ok(Json(Document {
        data: resource(&current.user, &current.roles),
    }))
}

/// GET /api/v1/users/:id
pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    current: CurrentUser,
) -> Result<impl IntoResponse, AuthError> {
    authorize(UserPolicy::new(&current).show(id))?;

    let (user, roles) = state.users.get(id).await?;

    Ok(Json(Document {
        data: resource(&user, &roles),
    }))
}

/// PATCH|PUT /api/v1/users/:id
///
/// A new phone number is unconfirmed and gets a fresh code
pub async fn update(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    current: CurrentUser,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> Result<impl IntoResponse, AuthError> {
    authorize(UserPolicy::new(&current).update(id))?;

    let updated = state.users.update(id, req.user).await?;

    if updated.phone_changed {
        state.jobs.enqueue(Job::SendPhoneConfirmation {
            email: updated.user.email.clone(),
        });
    }

    Ok(Json(Document {
        data: resource(&updated.user, &updated.roles),
    }))
}

/// PATCH /api/v1/users/:id/password
pub async fn update_password(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    current: CurrentUser,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    authorize(UserPolicy::new(&current).update_password(id))?;

    state.users.change_password(id, req.user).await?;

    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// DELETE /api/v1/users/:id
pub async fn destroy(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    current: CurrentUser,
) -> Result<impl IntoResponse, AuthError> {
    authorize(UserPolicy::new(&current).destroy(id))?;

    state.users.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================
// Role Administration
// ============================================

/// POST /api/v1/users/:id/roles
pub async fn add_role(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    current: CurrentUser,
    JsonBody(req): JsonBody<RoleRequest>,
) -> Result<impl IntoResponse, AuthError> {
    authorize(UserPolicy::new(&current).manage_roles())?;

    let role: Role = req.role.parse().map_err(AuthError::Validation)?;
    let (user, roles) = state.users.add_role(id, role, current.user.id).await?;

    Ok(Json(Document {
        data: resource(&user, &roles),
    }))
}

/// DELETE /api/v1/users/:id/roles/:role
pub async fn remove_role(
    State(state): State<AppState>,
    PathParam((id, role)): PathParam<(Uuid, String)>,
    current: CurrentUser,
) -> Result<impl IntoResponse, AuthError> {
    authorize(UserPolicy::new(&current).manage_roles())?;

    let role: Role = role.parse().map_err(AuthError::Validation)?;
    let (user, roles) = state.users.remove_role(id, role, current.user.id).await?;

    Ok(Json(Document {
        data: resource(&user, &roles),
    }))
}
