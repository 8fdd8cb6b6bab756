//! Request extractor resolving the bearer token to the current user.
//!
//! Verifies the JWT, then loads the user row so deactivated accounts and
//! stale role claims are caught on every request. Every failure mode is a
//! uniform `Unauthenticated`.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use std::sync::Arc;

use crate::auth::bearer_token;
use crate::error::ApiError;
use crate::tasks::Principal;
use crate::users::User;
use crate::AppContext;

/// The authenticated user behind the request.
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.0.id.clone(),
            role: self.0.role(),
        }
    }
}

impl FromRequestParts<Arc<AppContext>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;
        let token = bearer_token(header_value).ok_or(ApiError::Unauthenticated)?;

        let principal = ctx.signer.principal_for(token)?;
        let user = ctx
            .users
            .get(&principal.id)
            .await?
            .ok_or(ApiError::Unauthenticated)?;
        if !user.is_active {
            return Err(ApiError::Unauthenticated);
        }
        Ok(CurrentUser(user))
    }
}
