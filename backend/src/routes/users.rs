use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use roast_storage::{
    keys::roast_pk,
    roast::RoastStorage,
    user::{User, UserStorage},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use super::reviews::ReviewResponse;
use crate::{
    middleware::AuthenticatedUser,
    types::{validate_roast_id, AppError, ValidatedJson},
};

/// Request to save or unsave a roast
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct SavedRoastRequest {
    /// Must be the authenticated user
    #[serde(rename = "userID")]
    #[validate(length(min = 1, message = "userID is required"))]
    pub user_id: String,
    #[serde(rename = "roastID")]
    #[validate(custom(function = "validate_roast_id"))]
    pub roast_id: String,
}

/// Profile fields a user may change
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserSettingsRequest {
    #[validate(length(max = 100, message = "displayName is too long"))]
    pub display_name: String,
    #[validate(length(max = 100, message = "firstName is too long"))]
    pub first_name: String,
    #[validate(length(max = 100, message = "lastName is too long"))]
    pub last_name: String,
}

/// A user profile
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "profilePhotoURL")]
    pub profile_photo_url: String,
    /// Saved roast IDs
    pub saved_roasts: Vec<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            display_name: user.display_name,
            first_name: user.first_name,
            last_name: user.last_name,
            profile_photo_url: user.profile_photo_url,
            saved_roasts: user.saved_roasts,
        }
    }
}

/// Adds a roast to the caller's saved list
#[instrument(skip(roasts, users, user, payload), fields(roast_id = %payload.roast_id))]
pub async fn save_roast(
    Extension(roasts): Extension<Arc<RoastStorage>>,
    Extension(users): Extension<Arc<UserStorage>>,
    user: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<SavedRoastRequest>,
) -> Result<Json<UserResponse>, AppError> {
    user.ensure_is(&payload.user_id)?;

    if roasts.get_by_prefix(&roast_pk(&payload.roast_id)).await?.is_none() {
        return Err(AppError::not_found("roast_not_found", "Roast not found"));
    }

    let updated = users
        .update_saved_roasts(&payload.user_id, &payload.roast_id)
        .await?;

    Ok(Json(updated.into()))
}

/// Removes a roast from the caller's saved list
#[instrument(skip(users, user, payload), fields(roast_id = %payload.roast_id))]
pub async fn remove_saved_roast(
    Extension(users): Extension<Arc<UserStorage>>,
    user: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<SavedRoastRequest>,
) -> Result<Json<UserResponse>, AppError> {
    user.ensure_is(&payload.user_id)?;

    let updated = users
        .remove_saved_roast(&payload.user_id, &payload.roast_id)
        .await?;

    Ok(Json(updated.into()))
}

/// Returns the caller's profile, creating it on first access
#[instrument(skip(users, user))]
pub async fn get_user(
    Extension(users): Extension<Arc<UserStorage>>,
    user: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    user.ensure_is(&user_id)?;

    let profile = users.get_or_create(&user_id, user.seed()).await?;

    Ok(Json(profile.into()))
}

/// Lists every review a user has written
#[instrument(skip(users))]
pub async fn get_user_reviews(
    Extension(users): Extension<Arc<UserStorage>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let reviews = users.get_user_reviews(&user_id).await?;

    Ok(Json(reviews.into_iter().map(Into::into).collect()))
}

/// Updates the caller's names
#[instrument(skip(users, user, payload))]
pub async fn update_user_settings(
    Extension(users): Extension<Arc<UserStorage>>,
    user: AuthenticatedUser,
    Path(user_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UserSettingsRequest>,
) -> Result<Json<UserResponse>, AppError> {
    user.ensure_is(&user_id)?;

    let updated = users
        .update_settings(
            &user_id,
            &payload.display_name,
            &payload.first_name,
            &payload.last_name,
        )
        .await?;

    Ok(Json(updated.into()))
}
