//! Review storage
//!
//! Reviews share their roast's partition (`ROAST#<RoastID>`) under `REVIEW#<ReviewID>`
//! sort keys, so a roast's reviews come back in creation order from a single query.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::keys::{generate_review_id, review_sk, roast_pk, REVIEW_PREFIX};
use crate::ratings::CategoryRatings;
use crate::store::{Item, ItemKey, StoreResult, TableStore};

/// A user's review of a roast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Review {
    /// Partition key of the reviewed roast
    #[serde(rename = "PK")]
    pub roast_key: String,
    /// Sort key, `REVIEW#<ReviewID>`
    #[serde(rename = "SK")]
    pub sk: String,
    #[serde(rename = "RoastID")]
    pub roast_id: String,
    #[serde(rename = "ReviewID")]
    pub review_id: String,
    pub overall_rating: u8,
    pub meat_rating: u8,
    pub potatoes_rating: u8,
    pub veg_rating: u8,
    pub gravy_rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub roast_name: String,
    #[serde(rename = "ImageURL", default)]
    pub image_url: String,
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Creation time in epoch milliseconds
    pub date_added: i64,
}

/// Caller-supplied fields of a review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub roast_id: String,
    pub ratings: CategoryRatings,
    pub comment: Option<String>,
    pub roast_name: String,
    pub image_url: String,
    pub user_id: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
}

impl Review {
    /// Builds a review with a freshly generated identifier
    #[must_use]
    pub fn new(new_review: NewReview, now: DateTime<Utc>) -> Self {
        let review_id = generate_review_id(now);

        Self {
            roast_key: roast_pk(&new_review.roast_id),
            sk: review_sk(&review_id),
            roast_id: new_review.roast_id,
            review_id,
            overall_rating: new_review.ratings.overall,
            meat_rating: new_review.ratings.meat,
            potatoes_rating: new_review.ratings.potatoes,
            veg_rating: new_review.ratings.veg,
            gravy_rating: new_review.ratings.gravy,
            comment: new_review.comment,
            roast_name: new_review.roast_name,
            image_url: new_review.image_url,
            user_id: new_review.user_id,
            display_name: new_review.display_name,
            first_name: new_review.first_name,
            last_name: new_review.last_name,
            date_added: now.timestamp_millis(),
        }
    }

    #[must_use]
    pub const fn ratings(&self) -> CategoryRatings {
        CategoryRatings {
            overall: self.overall_rating,
            meat: self.meat_rating,
            potatoes: self.potatoes_rating,
            veg: self.veg_rating,
            gravy: self.gravy_rating,
        }
    }
}

/// Review repository over the shared table
pub struct ReviewStorage {
    store: Arc<dyn TableStore>,
}

impl ReviewStorage {
    #[must_use]
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Inserts a review
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConditionalCheckFailed` if a review with the same key already
    /// exists, or other `StoreError` if the write fails
    pub async fn create(&self, review: &Review) -> StoreResult<()> {
        let item: Item = serde_dynamo::to_item(review)?;
        self.store.put_new(item).await?;

        info!("Stored review {} for {}", review.review_id, review.roast_key);
        Ok(())
    }

    /// Lists a roast's reviews, oldest first
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query or deserialization fails
    pub async fn get_by_roast(&self, roast_key: &str) -> StoreResult<Vec<Review>> {
        let items = self.store.query_prefix(roast_key, REVIEW_PREFIX).await?;

        items
            .into_iter()
            .map(|item| serde_dynamo::from_item(item).map_err(Into::into))
            .collect()
    }

    /// Reads one review by its full key
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read or deserialization fails
    pub async fn get_by_key(&self, roast_key: &str, review_sk: &str) -> StoreResult<Option<Review>> {
        self.store
            .get(&ItemKey::new(roast_key, review_sk))
            .await?
            .map(serde_dynamo::from_item)
            .transpose()
            .map_err(Into::into)
    }

    /// Deletes a review
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails
    pub async fn remove(&self, roast_key: &str, review_sk: &str) -> StoreResult<()> {
        self.store.delete(&ItemKey::new(roast_key, review_sk)).await?;

        info!("Removed review {review_sk} from {roast_key}");
        Ok(())
    }

    /// Writes a previously removed review back
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if serialization or the write fails
    pub async fn restore(&self, review: &Review) -> StoreResult<()> {
        let item: Item = serde_dynamo::to_item(review)?;
        self.store.put(item).await?;

        info!("Restored review {} for {}", review.review_id, review.roast_key);
        Ok(())
    }
}
