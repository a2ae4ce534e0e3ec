//! Table store seam
//!
//! Repositories talk to the table through [`TableStore`] so the `DynamoDB` client can be
//! swapped for an in-process map in tests.

mod dynamodb;
mod error;
#[cfg(any(test, feature = "in-memory"))]
mod memory;

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use strum::Display;

pub use dynamodb::DynamoDbStore;
pub use error::{StoreError, StoreResult};
#[cfg(any(test, feature = "in-memory"))]
pub use memory::InMemoryStore;

/// A stored item: attribute name to value
pub type Item = HashMap<String, AttributeValue>;

/// Key attributes of the table
#[derive(Debug, Clone, Copy, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum KeyAttribute {
    /// Partition key
    Pk,
    /// Sort key
    Sk,
}

/// Composite primary key of an item
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    #[must_use]
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }

    /// Reads the key attributes of a stored item
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingKeyAttribute` if either attribute is absent or not a string
    pub fn from_item(item: &Item) -> StoreResult<Self> {
        let read = |attribute: KeyAttribute| {
            item.get(&attribute.to_string())
                .and_then(|value| value.as_s().ok())
                .cloned()
                .ok_or_else(|| StoreError::MissingKeyAttribute(attribute.to_string()))
        };

        Ok(Self {
            pk: read(KeyAttribute::Pk)?,
            sk: read(KeyAttribute::Sk)?,
        })
    }
}

/// Precondition for a conditional update
///
/// Every condition also requires the item to exist.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The attribute must hold `value`
    Equals {
        attribute: String,
        value: AttributeValue,
    },
    /// The attribute must hold `value` or be absent
    EqualsOrAbsent {
        attribute: String,
        value: AttributeValue,
    },
}

/// Filter applied to a full table scan
#[derive(Debug, Clone, PartialEq)]
pub enum ScanFilter {
    /// Partition key begins with the prefix
    PkPrefix(String),
    /// The attribute holds exactly `value`
    AttributeEquals {
        attribute: String,
        value: AttributeValue,
    },
}

/// Minimal key-value operations over the single table
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Reads one item by its full key
    async fn get(&self, key: &ItemKey) -> StoreResult<Option<Item>>;

    /// Writes an item, replacing any existing item with the same key
    async fn put(&self, item: Item) -> StoreResult<()>;

    /// Writes an item only if no item with the same key exists
    ///
    /// Fails with `StoreError::ConditionalCheckFailed` otherwise.
    async fn put_new(&self, item: Item) -> StoreResult<()>;

    /// Sets the given attributes on an item
    ///
    /// Without a condition the item is created when missing. With a condition that does
    /// not hold the call fails with `StoreError::ConditionalCheckFailed`.
    async fn update(
        &self,
        key: &ItemKey,
        changes: Item,
        condition: Option<Condition>,
    ) -> StoreResult<()>;

    /// Deletes an item; deleting a missing item succeeds
    async fn delete(&self, key: &ItemKey) -> StoreResult<()>;

    /// Returns every item in the partition whose sort key begins with `sk_prefix`
    async fn query_prefix(&self, pk: &str, sk_prefix: &str) -> StoreResult<Vec<Item>>;

    /// Returns every item in the table matching the filter
    async fn scan(&self, filter: ScanFilter) -> StoreResult<Vec<Item>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_key_attribute_names() {
        assert_eq!(KeyAttribute::Pk.to_string(), "PK");
        assert_eq!(KeyAttribute::Sk.to_string(), "SK");
    }

    #[test]
    fn test_item_key_from_item() {
        let item = Item::from([
            ("PK".to_string(), AttributeValue::S("ROAST#Coffee".to_string())),
            ("SK".to_string(), AttributeValue::S("PROFILE#20240101".to_string())),
        ]);
        assert_eq!(
            ItemKey::from_item(&item).unwrap(),
            ItemKey::new("ROAST#Coffee", "PROFILE#20240101")
        );
    }

    #[test]
    fn test_item_key_from_item_missing_sort_key() {
        let item = Item::from([(
            "PK".to_string(),
            AttributeValue::S("ROAST#Coffee".to_string()),
        )]);
        assert!(matches!(
            ItemKey::from_item(&item),
            Err(StoreError::MissingKeyAttribute(attribute)) if attribute == "SK"
        ));
    }
}
