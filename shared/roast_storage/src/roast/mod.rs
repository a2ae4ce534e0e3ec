//! Roast storage
//!
//! A roast lives at `ROAST#<RoastID>` / `PROFILE#<YYYYMMDD>` and carries the running
//! rating aggregate of its reviews, guarded by a `Version` counter.

use std::sync::Arc;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::info;

use crate::keys::{roast_pk, roast_sk, to_pascal_case, PROFILE_PREFIX, ROAST_PREFIX};
use crate::ratings::Aggregate;
use crate::store::{Condition, Item, ItemKey, ScanFilter, StoreResult, TableStore};

/// Roast attributes written by partial updates
#[derive(Debug, Clone, Copy, Display)]
#[strum(serialize_all = "PascalCase")]
pub enum RoastAttribute {
    ReviewCount,
    OverallRating,
    MeatRating,
    PotatoesRating,
    VegRating,
    GravyRating,
    /// Incremented on every aggregate write
    Version,
}

/// A roast dinner venue and its aggregate ratings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Roast {
    /// Partition key, `ROAST#<RoastID>`
    #[serde(rename = "PK")]
    pub roast_key: String,
    /// Sort key, `PROFILE#<YYYYMMDD>`
    #[serde(rename = "SK")]
    pub sk: String,
    #[serde(rename = "RoastID")]
    pub roast_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "ImageURL", default)]
    pub image_url: String,
    #[serde(default)]
    pub price_range: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub review_count: i64,
    #[serde(default)]
    pub overall_rating: f64,
    #[serde(default)]
    pub meat_rating: f64,
    #[serde(default)]
    pub potatoes_rating: f64,
    #[serde(default)]
    pub veg_rating: f64,
    #[serde(default)]
    pub gravy_rating: f64,
    #[serde(default)]
    pub version: i64,
}

impl Roast {
    /// Builds a new roast with no reviews
    ///
    /// The identifier is the PascalCase form of `name`; the sort key records `created_at`'s date.
    #[must_use]
    pub fn new(
        name: &str,
        image_url: &str,
        price_range: i64,
        location: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let roast_id = to_pascal_case(name);

        Self {
            roast_key: roast_pk(&roast_id),
            sk: roast_sk(created_at),
            roast_id,
            name: name.trim().to_string(),
            image_url: image_url.to_string(),
            price_range,
            location,
            review_count: 0,
            overall_rating: 0.0,
            meat_rating: 0.0,
            potatoes_rating: 0.0,
            veg_rating: 0.0,
            gravy_rating: 0.0,
            version: 0,
        }
    }

    #[must_use]
    pub const fn aggregate(&self) -> Aggregate {
        Aggregate {
            review_count: self.review_count,
            overall: self.overall_rating,
            meat: self.meat_rating,
            potatoes: self.potatoes_rating,
            veg: self.veg_rating,
            gravy: self.gravy_rating,
        }
    }

    /// Returns a copy carrying `aggregate`; the version is left untouched
    #[must_use]
    pub fn with_aggregate(&self, aggregate: Aggregate) -> Self {
        Self {
            review_count: aggregate.review_count,
            overall_rating: aggregate.overall,
            meat_rating: aggregate.meat,
            potatoes_rating: aggregate.potatoes,
            veg_rating: aggregate.veg,
            gravy_rating: aggregate.gravy,
            ..self.clone()
        }
    }

    fn key(&self) -> ItemKey {
        ItemKey::new(&self.roast_key, &self.sk)
    }
}

fn number(value: impl ToString) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

/// Roast repository over the shared table
pub struct RoastStorage {
    store: Arc<dyn TableStore>,
}

impl RoastStorage {
    #[must_use]
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Writes a roast, overwriting any roast stored under the same key
    ///
    /// Profile items left under the key by a create on an earlier day are removed, so a
    /// roast key always holds a single profile.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if serialization, the write or the cleanup fails
    pub async fn create(&self, roast: &Roast) -> StoreResult<()> {
        let item: Item = serde_dynamo::to_item(roast)?;
        self.store.put(item).await?;

        let stale = self
            .store
            .query_prefix(&roast.roast_key, PROFILE_PREFIX)
            .await?;
        for item in &stale {
            let key = ItemKey::from_item(item)?;
            if key.sk != roast.sk {
                self.store.delete(&key).await?;
                info!("Replaced roast profile {} {}", key.pk, key.sk);
            }
        }

        info!("Stored roast {}", roast.roast_key);
        Ok(())
    }

    /// Finds the profile item of a roast
    ///
    /// # Arguments
    ///
    /// * `roast_key` - Partition key, `ROAST#<RoastID>`
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query or deserialization fails
    pub async fn get_by_prefix(&self, roast_key: &str) -> StoreResult<Option<Roast>> {
        let items = self.store.query_prefix(roast_key, PROFILE_PREFIX).await?;

        items
            .into_iter()
            .next()
            .map(serde_dynamo::from_item)
            .transpose()
            .map_err(Into::into)
    }

    /// Lists every roast in the table
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the scan or deserialization fails
    pub async fn get_all(&self) -> StoreResult<Vec<Roast>> {
        let items = self
            .store
            .scan(ScanFilter::PkPrefix(ROAST_PREFIX.to_string()))
            .await?;

        items
            .into_iter()
            .filter(|item| {
                ItemKey::from_item(item).is_ok_and(|key| key.sk.starts_with(PROFILE_PREFIX))
            })
            .map(|item| serde_dynamo::from_item(item).map_err(Into::into))
            .collect()
    }

    /// Writes a roast's aggregate if nobody else has since `roast.version` was read
    ///
    /// # Returns
    ///
    /// The roast as stored, with its version incremented
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConditionalCheckFailed` when the stored version differs or the
    /// roast no longer exists, or other `StoreError` if the write fails
    pub async fn update(&self, roast: &Roast) -> StoreResult<Roast> {
        let version = roast.version + 1;

        let changes = Item::from([
            (RoastAttribute::ReviewCount.to_string(), number(roast.review_count)),
            (RoastAttribute::OverallRating.to_string(), number(roast.overall_rating)),
            (RoastAttribute::MeatRating.to_string(), number(roast.meat_rating)),
            (RoastAttribute::PotatoesRating.to_string(), number(roast.potatoes_rating)),
            (RoastAttribute::VegRating.to_string(), number(roast.veg_rating)),
            (RoastAttribute::GravyRating.to_string(), number(roast.gravy_rating)),
            (RoastAttribute::Version.to_string(), number(version)),
        ]);

        // Roasts written before versioning carry no Version attribute
        let condition = if roast.version == 0 {
            Condition::EqualsOrAbsent {
                attribute: RoastAttribute::Version.to_string(),
                value: number(roast.version),
            }
        } else {
            Condition::Equals {
                attribute: RoastAttribute::Version.to_string(),
                value: number(roast.version),
            }
        };

        self.store
            .update(&roast.key(), changes, Some(condition))
            .await?;

        Ok(Roast {
            version,
            ..roast.clone()
        })
    }

    /// Deletes every profile item of a roast; its reviews are left in place
    ///
    /// # Returns
    ///
    /// The number of items deleted
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query or a delete fails
    pub async fn delete(&self, roast_key: &str) -> StoreResult<usize> {
        let items = self.store.query_prefix(roast_key, PROFILE_PREFIX).await?;

        for item in &items {
            self.store.delete(&ItemKey::from_item(item)?).await?;
        }

        info!("Deleted {} profile item(s) of {roast_key}", items.len());
        Ok(items.len())
    }
}
