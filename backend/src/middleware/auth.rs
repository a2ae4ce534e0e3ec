use std::sync::Arc;

use aide::OperationIo;
use axum::{
    extract::{FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::Response,
    Extension,
};
use roast_storage::user::UserSeed;

use crate::{
    jwt::{FirebaseClaims, FirebaseVerifier},
    types::{AppError, Environment},
};

/// Authenticated user information extracted from the Firebase ID token
#[derive(Debug, Clone, OperationIo)]
pub struct AuthenticatedUser {
    /// Firebase user ID (`sub`)
    pub user_id: String,
    /// Display name from the token, if the provider supplied one
    pub display_name: Option<String>,
    /// Profile photo URL from the token
    pub picture: Option<String>,
}

impl From<FirebaseClaims> for AuthenticatedUser {
    fn from(claims: FirebaseClaims) -> Self {
        Self {
            user_id: claims.sub,
            display_name: claims.name,
            picture: claims.picture,
        }
    }
}

impl AuthenticatedUser {
    /// Rejects requests acting on another user's behalf
    ///
    /// # Errors
    ///
    /// Returns a 400 `AppError` when `user_id` is not the caller
    pub fn ensure_is(&self, user_id: &str) -> Result<(), AppError> {
        if self.user_id == user_id {
            Ok(())
        } else {
            Err(AppError::new(
                StatusCode::BAD_REQUEST,
                "user_mismatch",
                "userID does not match the authenticated user",
            ))
        }
    }

    /// Profile fields used when the user is seen for the first time
    #[must_use]
    pub fn seed(&self) -> UserSeed {
        UserSeed {
            display_name: self.display_name.clone().unwrap_or_default(),
            profile_photo_url: self.picture.clone().unwrap_or_default(),
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            AppError::new(
                StatusCode::UNAUTHORIZED,
                "missing_auth",
                "Authentication required",
            )
        })
    }
}

/// Firebase authentication middleware
///
/// This middleware:
/// 1. Extracts Bearer token from Authorization header
/// 2. Verifies it as a Firebase ID token
/// 3. Adds `AuthenticatedUser` to request extensions
/// 4. Returns 401 for invalid/missing tokens
///
/// Locally, `DISABLE_AUTH=true` skips verification and uses the token as the user ID.
///
/// # Errors
///
/// - `AppError` - Invalid/missing token with 401 status code
pub async fn auth_middleware(
    Extension(verifier): Extension<Arc<FirebaseVerifier>>,
    Extension(environment): Extension<Environment>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let stripped_auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if environment.disable_auth() {
        if let Some(token) = stripped_auth_header {
            let authenticated_user = AuthenticatedUser {
                user_id: token.to_string(),
                display_name: None,
                picture: None,
            };
            request.extensions_mut().insert(authenticated_user);
        }

        return Ok(next.run(request).await);
    }

    let token = stripped_auth_header.ok_or_else(|| {
        AppError::new(
            StatusCode::UNAUTHORIZED,
            "missing_token",
            "Authorization header must contain a valid Bearer token",
        )
    })?;

    let claims = verifier.verify(token).await.map_err(|err| {
        tracing::debug!("Rejected ID token: {err}");
        AppError::new(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Invalid or expired token",
        )
    })?;

    tracing::Span::current().record("user_id", claims.sub.as_str());
    request.extensions_mut().insert(AuthenticatedUser::from(claims));

    Ok(next.run(request).await)
}
