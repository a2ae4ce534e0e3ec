//! User profile storage
//!
//! Profiles live at `USER#<UserID>` / `PROFILE#<UserID>` and are created lazily the
//! first time a signed-in user is looked up.

mod error;

use std::sync::Arc;

use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};
use tracing::info;

pub use error::{UserStorageError, UserStorageResult};

use crate::keys::{user_pk, user_sk, PROFILE_PREFIX, REVIEW_PREFIX};
use crate::review::Review;
use crate::store::{Item, ItemKey, ScanFilter, TableStore};

/// A user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    /// Partition key, `USER#<UserID>`
    #[serde(rename = "PK")]
    pub user_key: String,
    /// Sort key, `PROFILE#<UserID>`
    #[serde(rename = "SK")]
    pub sk: String,
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(rename = "ProfilePhotoURL", default)]
    pub profile_photo_url: String,
    /// Roast IDs, each at most once
    #[serde(default)]
    pub saved_roasts: Vec<String>,
}

/// Profile fields known when a user is first seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSeed {
    pub display_name: String,
    pub profile_photo_url: String,
}

impl User {
    #[must_use]
    pub fn new(user_id: &str, seed: UserSeed) -> Self {
        Self {
            user_key: user_pk(user_id),
            sk: user_sk(user_id),
            user_id: user_id.to_string(),
            display_name: seed.display_name,
            first_name: String::new(),
            last_name: String::new(),
            profile_photo_url: seed.profile_photo_url,
            saved_roasts: Vec::new(),
        }
    }
}

/// User repository over the shared table
pub struct UserStorage {
    store: Arc<dyn TableStore>,
}

impl UserStorage {
    #[must_use]
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Finds a user's profile by partition key (`USER#<UserID>`)
    ///
    /// # Errors
    ///
    /// Returns `UserStorageError::Store` if the query or deserialization fails
    pub async fn get_by_prefix(&self, user_key: &str) -> UserStorageResult<Option<User>> {
        let items = self.store.query_prefix(user_key, PROFILE_PREFIX).await?;

        Ok(items
            .into_iter()
            .next()
            .map(serde_dynamo::from_item)
            .transpose()?)
    }

    /// Writes a new profile
    ///
    /// # Errors
    ///
    /// Returns `UserStorageError::Store` if serialization or the write fails
    pub async fn create(&self, user: &User) -> UserStorageResult<()> {
        let item: Item = serde_dynamo::to_item(user)?;
        self.store.put(item).await?;

        info!("Created user {}", user.user_id);
        Ok(())
    }

    /// Replaces a stored profile
    ///
    /// # Errors
    ///
    /// Returns `UserStorageError::Store` if serialization or the write fails
    pub async fn update(&self, user: &User) -> UserStorageResult<()> {
        let item: Item = serde_dynamo::to_item(user)?;
        self.store.put(item).await?;
        Ok(())
    }

    /// Returns the stored profile, creating it from `seed` on first access
    ///
    /// # Errors
    ///
    /// Returns `UserStorageError::Store` if the read or write fails
    pub async fn get_or_create(&self, user_id: &str, seed: UserSeed) -> UserStorageResult<User> {
        if let Some(user) = self.get_by_prefix(&user_pk(user_id)).await? {
            return Ok(user);
        }

        let user = User::new(user_id, seed);
        self.create(&user).await?;
        Ok(user)
    }

    async fn require(&self, user_id: &str) -> UserStorageResult<User> {
        self.get_by_prefix(&user_pk(user_id))
            .await?
            .ok_or_else(|| UserStorageError::NotFound(user_id.to_string()))
    }

    /// Adds a roast to the user's saved list; saving it twice changes nothing
    ///
    /// # Errors
    ///
    /// * `UserStorageError::NotFound` - the user has no profile
    /// * `UserStorageError::Store` - the read or write fails
    pub async fn update_saved_roasts(&self, user_id: &str, roast_id: &str) -> UserStorageResult<User> {
        let mut user = self.require(user_id).await?;

        if user.saved_roasts.iter().any(|saved| saved == roast_id) {
            return Ok(user);
        }

        user.saved_roasts.push(roast_id.to_string());
        self.update(&user).await?;

        info!("User {user_id} saved {roast_id}");
        Ok(user)
    }

    /// Removes a roast from the user's saved list
    ///
    /// # Errors
    ///
    /// * `UserStorageError::NotFound` - the user has no profile
    /// * `UserStorageError::SavedRoastNotFound` - the roast is not in the list
    /// * `UserStorageError::Store` - the read or write fails
    pub async fn remove_saved_roast(&self, user_id: &str, roast_id: &str) -> UserStorageResult<User> {
        let mut user = self.require(user_id).await?;

        let position = user
            .saved_roasts
            .iter()
            .position(|saved| saved == roast_id)
            .ok_or_else(|| UserStorageError::SavedRoastNotFound(roast_id.to_string()))?;
        user.saved_roasts.remove(position);
        self.update(&user).await?;

        info!("User {user_id} unsaved {roast_id}");
        Ok(user)
    }

    /// Overwrites a user's display, first and last name
    ///
    /// # Errors
    ///
    /// * `UserStorageError::NotFound` - the user has no profile
    /// * `UserStorageError::Store` - the read or write fails
    pub async fn update_settings(
        &self,
        user_id: &str,
        display_name: &str,
        first_name: &str,
        last_name: &str,
    ) -> UserStorageResult<User> {
        let user = User {
            display_name: display_name.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            ..self.require(user_id).await?
        };
        self.update(&user).await?;

        Ok(user)
    }

    /// Lists every review written by a user
    ///
    /// # Errors
    ///
    /// Returns `UserStorageError::Store` if the scan or deserialization fails
    pub async fn get_user_reviews(&self, user_id: &str) -> UserStorageResult<Vec<Review>> {
        // TODO: query a UserID secondary index instead of scanning the table
        let items = self
            .store
            .scan(ScanFilter::AttributeEquals {
                attribute: "UserID".to_string(),
                value: AttributeValue::S(user_id.to_string()),
            })
            .await?;

        Ok(items
            .into_iter()
            .filter(|item| {
                ItemKey::from_item(item).is_ok_and(|key| key.sk.starts_with(REVIEW_PREFIX))
            })
            .map(serde_dynamo::from_item)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
