//! Running rating averages for roasts
//!
//! A roast keeps one mean per category plus the number of reviews behind it. Adding or
//! removing a review shifts every mean incrementally. The arithmetic lives in
//! [`Aggregate::apply`]; [`RatingAggregator`] wraps it in a versioned read-modify-write
//! against the roast item and retries when another writer got there first.

mod error;

use std::{sync::Arc, time::Duration};

use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use error::{RatingError, RatingResult};

use crate::roast::{Roast, RoastStorage};
use crate::store::StoreError;

/// The five category ratings carried by a single review, each in `1..=10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRatings {
    pub overall: u8,
    pub meat: u8,
    pub potatoes: u8,
    pub veg: u8,
    pub gravy: u8,
}

/// Whether a review is entering or leaving the aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Add,
    Remove,
}

/// Review count and per-category means of a roast
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aggregate {
    pub review_count: i64,
    pub overall: f64,
    pub meat: f64,
    pub potatoes: f64,
    pub veg: f64,
    pub gravy: f64,
}

impl Aggregate {
    /// Returns the aggregate after adding or removing one review.
    ///
    /// Contributed ratings are integers, so `mean * count` is rounded back to the exact
    /// integer total before the delta is applied. This keeps `Add` followed by `Remove`
    /// of the same ratings an exact inverse. When the count drops to zero or below the
    /// aggregate resets to all zeros.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn apply(&self, ratings: &CategoryRatings, direction: Direction) -> Self {
        let review_count = match direction {
            Direction::Add => self.review_count + 1,
            Direction::Remove => self.review_count - 1,
        };

        if review_count <= 0 {
            return Self::default();
        }

        let previous_count = self.review_count.max(0) as f64;
        let shift = |mean: f64, rating: u8| {
            let total = (mean * previous_count).round();
            let total = match direction {
                Direction::Add => total + f64::from(rating),
                Direction::Remove => total - f64::from(rating),
            };
            total / review_count as f64
        };

        Self {
            review_count,
            overall: shift(self.overall, ratings.overall),
            meat: shift(self.meat, ratings.meat),
            potatoes: shift(self.potatoes, ratings.potatoes),
            veg: shift(self.veg, ratings.veg),
            gravy: shift(self.gravy, ratings.gravy),
        }
    }
}

/// Default backoff for aggregate write conflicts
///
/// - Min delay: 10ms
/// - Max delay: 500ms
/// - Max retries: 5
/// - Jitter enabled
#[must_use]
pub fn conflict_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(10))
        .with_max_delay(Duration::from_millis(500))
        .with_max_times(5)
        .with_jitter()
}

/// Applies review deltas to a roast's stored aggregate
pub struct RatingAggregator {
    roasts: Arc<RoastStorage>,
    backoff: ExponentialBuilder,
}

impl RatingAggregator {
    #[must_use]
    pub fn new(roasts: Arc<RoastStorage>) -> Self {
        Self {
            roasts,
            backoff: conflict_backoff(),
        }
    }

    /// Replaces the conflict backoff
    #[must_use]
    pub fn with_backoff(mut self, backoff: ExponentialBuilder) -> Self {
        self.backoff = backoff;
        self
    }

    /// Adds or removes one review's ratings from the roast's aggregate
    ///
    /// # Arguments
    ///
    /// * `roast_key` - Partition key of the roast (`ROAST#<id>`)
    /// * `ratings` - The review's category ratings
    /// * `direction` - Whether the review is being added or removed
    ///
    /// # Returns
    ///
    /// The roast as written, with its new aggregate and version
    ///
    /// # Errors
    ///
    /// * `RatingError::RoastNotFound` - the roast does not exist
    /// * `RatingError::Conflict` - the versioned write kept failing after every retry
    /// * `RatingError::Store` - any other store failure
    pub async fn apply_review_delta(
        &self,
        roast_key: &str,
        ratings: &CategoryRatings,
        direction: Direction,
    ) -> RatingResult<Roast> {
        let roast = (|| async move { self.try_apply(roast_key, ratings, direction).await })
            .retry(self.backoff)
            .when(|err| matches!(err, RatingError::Store(StoreError::ConditionalCheckFailed)))
            .notify(|_, delay| {
                warn!("Aggregate for {roast_key} changed concurrently, retrying in {delay:?}");
            })
            .await
            .map_err(|err| match err {
                RatingError::Store(StoreError::ConditionalCheckFailed) => {
                    RatingError::Conflict(roast_key.to_string())
                }
                other => other,
            })?;

        info!(
            "Applied {direction:?} to {roast_key}: {} reviews, overall {}",
            roast.review_count, roast.overall_rating
        );

        Ok(roast)
    }

    async fn try_apply(
        &self,
        roast_key: &str,
        ratings: &CategoryRatings,
        direction: Direction,
    ) -> RatingResult<Roast> {
        let roast = self
            .roasts
            .get_by_prefix(roast_key)
            .await?
            .ok_or_else(|| RatingError::RoastNotFound(roast_key.to_string()))?;

        let aggregate = roast.aggregate().apply(ratings, direction);
        let updated = self.roasts.update(&roast.with_aggregate(aggregate)).await?;

        Ok(updated)
    }
}
