// rest/routes/auth.rs — Registration, login, and whoami routes.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::rest::extract::CurrentUser;
use crate::users::Role;
use crate::AppContext;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    /// Defaults to `user`. The register endpoint accepts `admin` for
    /// bootstrap setups; lock this down behind a flag before exposing the
    /// API beyond a trusted network.
    pub role: Option<Role>,
}

pub async fn register(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = body.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::validation("email must be a valid address"));
    }
    if body.password.is_empty() {
        return Err(ApiError::validation("password must not be empty"));
    }
    if ctx.users.find_by_email(email).await?.is_some() {
        return Err(ApiError::validation("email already registered"));
    }

    let password_hash = hash_password(&body.password)?;
    let role = body.role.unwrap_or(Role::User);
    let user = ctx.users.create(email, &password_hash, role).await?;

    info!(user_id = %user.id, role = %user.role, "user registered");
    Ok(Json(serde_json::to_value(&user).map_err(anyhow::Error::from)?))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = ctx
        .users
        .find_by_email(body.email.trim())
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    if !user.is_active || !verify_password(&body.password, &user.password_hash) {
        return Err(ApiError::Unauthenticated);
    }

    let access_token = ctx.signer.issue(&user);
    Ok(Json(json!({
        "access_token": access_token,
        "token_type": "bearer",
    })))
}

pub async fn me(user: CurrentUser) -> Result<Json<Value>, ApiError> {
    Ok(Json(
        serde_json::to_value(&user.0).map_err(anyhow::Error::from)?,
    ))
}
