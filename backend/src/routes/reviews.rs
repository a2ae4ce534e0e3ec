use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use chrono::Utc;
use roast_storage::{
    keys::{review_sk, roast_pk},
    ratings::{CategoryRatings, Direction, RatingAggregator, RatingError},
    review::{NewReview, Review, ReviewStorage},
    roast::RoastStorage,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use validator::Validate;

use super::roasts::MessageResponse;
use crate::{
    middleware::AuthenticatedUser,
    types::{roast_id_from_path, validate_roast_id, AppError, ValidatedJson},
};

/// Request to review a roast
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    #[serde(rename = "roastID")]
    #[validate(custom(function = "validate_roast_id"))]
    pub roast_id: String,

    /// Must be the authenticated user
    #[serde(rename = "userID")]
    #[validate(length(min = 1, message = "userID is required"))]
    pub user_id: String,

    #[validate(range(min = 1, max = 10, message = "overallRating must be between 1 and 10"))]
    pub overall_rating: u8,
    #[validate(range(min = 1, max = 10, message = "meatRating must be between 1 and 10"))]
    pub meat_rating: u8,
    #[validate(range(min = 1, max = 10, message = "potatoesRating must be between 1 and 10"))]
    pub potatoes_rating: u8,
    #[validate(range(min = 1, max = 10, message = "vegRating must be between 1 and 10"))]
    pub veg_rating: u8,
    #[validate(range(min = 1, max = 10, message = "gravyRating must be between 1 and 10"))]
    pub gravy_rating: u8,

    pub comment: Option<String>,
    /// Defaults to the roast's name
    #[serde(default)]
    pub roast_name: String,
    #[serde(rename = "imageURL", default)]
    pub image_url: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl CreateReviewRequest {
    const fn ratings(&self) -> CategoryRatings {
        CategoryRatings {
            overall: self.overall_rating,
            meat: self.meat_rating,
            potatoes: self.potatoes_rating,
            veg: self.veg_rating,
            gravy: self.gravy_rating,
        }
    }
}

/// Request to remove a review
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct RemoveReviewRequest {
    #[serde(rename = "roastID")]
    #[validate(custom(function = "validate_roast_id"))]
    pub roast_id: String,
    #[serde(rename = "reviewID")]
    #[validate(length(min = 1, message = "reviewID is required"))]
    pub review_id: String,
}

/// A single review
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    #[serde(rename = "reviewID")]
    pub review_id: String,
    #[serde(rename = "roastID")]
    pub roast_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub overall_rating: u8,
    pub meat_rating: u8,
    pub potatoes_rating: u8,
    pub veg_rating: u8,
    pub gravy_rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub roast_name: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    /// Epoch milliseconds
    pub date_added: i64,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            review_id: review.review_id,
            roast_id: review.roast_id,
            user_id: review.user_id,
            overall_rating: review.overall_rating,
            meat_rating: review.meat_rating,
            potatoes_rating: review.potatoes_rating,
            veg_rating: review.veg_rating,
            gravy_rating: review.gravy_rating,
            comment: review.comment,
            roast_name: review.roast_name,
            image_url: review.image_url,
            display_name: review.display_name,
            first_name: review.first_name,
            last_name: review.last_name,
            date_added: review.date_added,
        }
    }
}

/// Stores a review and folds its ratings into the roast's aggregate
///
/// The review is deleted again when the aggregate cannot be updated.
#[instrument(skip(roasts, reviews, ratings, user, payload), fields(roast_id = %payload.roast_id))]
pub async fn create_review(
    Extension(roasts): Extension<Arc<RoastStorage>>,
    Extension(reviews): Extension<Arc<ReviewStorage>>,
    Extension(ratings): Extension<Arc<RatingAggregator>>,
    user: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<CreateReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    user.ensure_is(&payload.user_id)?;

    let roast = roasts
        .get_by_prefix(&roast_pk(&payload.roast_id))
        .await?
        .ok_or_else(|| AppError::not_found("roast_not_found", "Roast not found"))?;

    let category_ratings = payload.ratings();
    let roast_name = if payload.roast_name.is_empty() {
        roast.name
    } else {
        payload.roast_name
    };

    let review = Review::new(
        NewReview {
            roast_id: payload.roast_id,
            ratings: category_ratings,
            comment: payload.comment,
            roast_name,
            image_url: payload.image_url,
            user_id: payload.user_id,
            display_name: payload.display_name,
            first_name: payload.first_name,
            last_name: payload.last_name,
        },
        Utc::now(),
    );

    // Detached so a dropped request cannot stop between the two writes
    let review = tokio::spawn(add_review(reviews, ratings, review))
        .await
        .map_err(|err| {
            error!("Review task failed: {err}");
            AppError::internal()
        })??;

    info!("Review {} added to {}", review.review_id, review.roast_id);
    Ok(Json(review.into()))
}

/// Stores a review and aggregates it, deleting the review again if aggregation fails
async fn add_review(
    reviews: Arc<ReviewStorage>,
    ratings: Arc<RatingAggregator>,
    review: Review,
) -> Result<Review, AppError> {
    reviews.create(&review).await?;

    if let Err(err) = ratings
        .apply_review_delta(&review.roast_key, &review.ratings(), Direction::Add)
        .await
    {
        warn!("Aggregate update failed, removing review {}", review.review_id);
        if let Err(undo_err) = reviews.remove(&review.roast_key, &review.sk).await {
            error!(
                "Failed to remove review {} after aggregate failure: {undo_err}",
                review.review_id
            );
        }
        return Err(err.into());
    }

    Ok(review)
}

/// Lists a roast's reviews, oldest first
#[instrument(skip(reviews))]
pub async fn get_reviews(
    Extension(reviews): Extension<Arc<ReviewStorage>>,
    Path(roast_id): Path<String>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let roast_id = roast_id_from_path(&roast_id)?;

    let found = reviews.get_by_roast(&roast_pk(roast_id)).await?;
    if found.is_empty() {
        return Err(AppError::not_found("reviews_not_found", "No reviews found"));
    }

    Ok(Json(found.into_iter().map(Into::into).collect()))
}

/// Removes the caller's review and takes its ratings out of the roast's aggregate
///
/// The review is written back when the aggregate cannot be updated.
/// The removal and aggregate update run detached from the request, like review creation.
#[instrument(skip(reviews, ratings, user, payload), fields(roast_id = %payload.roast_id, review_id = %payload.review_id))]
pub async fn remove_review(
    Extension(reviews): Extension<Arc<ReviewStorage>>,
    Extension(ratings): Extension<Arc<RatingAggregator>>,
    user: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<RemoveReviewRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let roast_key = roast_pk(&payload.roast_id);
    let sk = review_sk(&payload.review_id);

    let review = reviews
        .get_by_key(&roast_key, &sk)
        .await?
        .ok_or_else(|| AppError::not_found("review_not_found", "Review not found"))?;

    user.ensure_is(&review.user_id)?;

    let review_id = review.review_id.clone();
    tokio::spawn(withdraw_review(reviews, ratings, review))
        .await
        .map_err(|err| {
            error!("Review removal task failed: {err}");
            AppError::internal()
        })??;

    Ok(Json(MessageResponse {
        message: format!("Review {review_id} removed"),
    }))
}

/// Deletes a review and takes it out of the aggregate, writing it back if that fails
///
/// A review whose roast was deleted has no aggregate left to correct, so its removal stands.
async fn withdraw_review(
    reviews: Arc<ReviewStorage>,
    ratings: Arc<RatingAggregator>,
    review: Review,
) -> Result<(), AppError> {
    reviews.remove(&review.roast_key, &review.sk).await?;

    match ratings
        .apply_review_delta(&review.roast_key, &review.ratings(), Direction::Remove)
        .await
    {
        Ok(_) => Ok(()),
        Err(RatingError::RoastNotFound(roast_key)) => {
            info!(
                "Removed review {} of deleted roast {roast_key}",
                review.review_id
            );
            Ok(())
        }
        Err(err) => {
            warn!("Aggregate update failed, restoring review {}", review.review_id);
            if let Err(undo_err) = reviews.restore(&review).await {
                error!(
                    "Failed to restore review {} after aggregate failure: {undo_err}",
                    review.review_id
                );
            }
            Err(err.into())
        }
    }
}
