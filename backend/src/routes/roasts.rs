use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use chrono::Utc;
use roast_storage::{
    keys::{roast_pk, to_pascal_case},
    roast::{Roast, RoastStorage},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::{Validate, ValidationError};

use crate::types::{roast_id_from_path, validate_roast_id, AppError, ValidatedJson};

/// Request to create a roast
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoastRequest {
    /// Display name; the roast ID is its PascalCase form
    #[validate(custom(function = "validate_roast_name"))]
    pub name: String,
    #[serde(rename = "imageURL", default)]
    pub image_url: String,
    #[validate(range(min = 0, message = "priceRange must not be negative"))]
    pub price_range: i64,
    pub location: Option<String>,
}

/// Request to delete a roast by name
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct DeleteRoastRequest {
    #[validate(custom(function = "validate_roast_name"))]
    pub name: String,
}

/// A roast and its aggregate ratings
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoastResponse {
    #[serde(rename = "roastID")]
    pub roast_id: String,
    pub name: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub price_range: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub review_count: i64,
    /// Mean of every review's overall rating, `0` without reviews
    pub overall_rating: f64,
    pub meat_rating: f64,
    pub potatoes_rating: f64,
    pub veg_rating: f64,
    pub gravy_rating: f64,
}

impl From<Roast> for RoastResponse {
    fn from(roast: Roast) -> Self {
        Self {
            roast_id: roast.roast_id,
            name: roast.name,
            image_url: roast.image_url,
            price_range: roast.price_range,
            location: roast.location,
            review_count: roast.review_count,
            overall_rating: roast.overall_rating,
            meat_rating: roast.meat_rating,
            potatoes_rating: roast.potatoes_rating,
            veg_rating: roast.veg_rating,
            gravy_rating: roast.gravy_rating,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn validate_roast_name(name: &str) -> Result<(), ValidationError> {
    validate_roast_id(&to_pascal_case(name))
        .map_err(|_| ValidationError::new("invalid_name").with_message("invalid roast name".into()))
}

/// Creates a roast, replacing any roast with the same name
#[instrument(skip(roasts, payload), fields(name = %payload.name))]
pub async fn create_roast(
    Extension(roasts): Extension<Arc<RoastStorage>>,
    ValidatedJson(payload): ValidatedJson<CreateRoastRequest>,
) -> Result<Json<RoastResponse>, AppError> {
    let roast = Roast::new(
        &payload.name,
        &payload.image_url,
        payload.price_range,
        payload.location,
        Utc::now(),
    );

    roasts.create(&roast).await?;

    info!("Roast {} created", roast.roast_id);
    Ok(Json(roast.into()))
}

/// Deletes a roast's profile; its reviews stay in the table
#[instrument(skip(roasts, payload), fields(name = %payload.name))]
pub async fn delete_roast(
    Extension(roasts): Extension<Arc<RoastStorage>>,
    ValidatedJson(payload): ValidatedJson<DeleteRoastRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let roast_key = roast_pk(&to_pascal_case(&payload.name));

    if roasts.get_by_prefix(&roast_key).await?.is_none() {
        return Err(AppError::not_found("roast_not_found", "Roast not found"));
    }

    roasts.delete(&roast_key).await?;

    Ok(Json(MessageResponse {
        message: format!("Roast {} deleted", payload.name.trim()),
    }))
}

/// Lists every roast
#[instrument(skip(roasts))]
pub async fn get_all_roasts(
    Extension(roasts): Extension<Arc<RoastStorage>>,
) -> Result<Json<Vec<RoastResponse>>, AppError> {
    let all = roasts.get_all().await?;

    info!("Returning {} roasts", all.len());
    Ok(Json(all.into_iter().map(Into::into).collect()))
}

/// Returns one roast by ID
#[instrument(skip(roasts))]
pub async fn get_roast(
    Extension(roasts): Extension<Arc<RoastStorage>>,
    Path(roast_id): Path<String>,
) -> Result<Json<RoastResponse>, AppError> {
    let roast_id = roast_id_from_path(&roast_id)?;

    let roast = roasts
        .get_by_prefix(&roast_pk(roast_id))
        .await?
        .ok_or_else(|| AppError::not_found("roast_not_found", "Roast not found"))?;

    Ok(Json(roast.into()))
}
