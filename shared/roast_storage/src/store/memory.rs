//! In-process table store for tests and local experiments

use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use tokio::sync::RwLock;

use super::{
    Condition, Item, ItemKey, KeyAttribute, ScanFilter, StoreError, StoreResult, TableStore,
};

/// Table store holding items in a sorted map keyed by `(PK, SK)`
#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: RwLock<BTreeMap<(String, String), Item>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

fn condition_holds(item: Option<&Item>, condition: &Condition) -> bool {
    let Some(item) = item else {
        return false;
    };

    match condition {
        Condition::Equals { attribute, value } => item.get(attribute) == Some(value),
        Condition::EqualsOrAbsent { attribute, value } => {
            item.get(attribute).is_none_or(|current| current == value)
        }
    }
}

#[async_trait]
impl TableStore for InMemoryStore {
    async fn get(&self, key: &ItemKey) -> StoreResult<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.get(&(key.pk.clone(), key.sk.clone())).cloned())
    }

    async fn put(&self, item: Item) -> StoreResult<()> {
        let key = ItemKey::from_item(&item)?;
        self.items.write().await.insert((key.pk, key.sk), item);
        Ok(())
    }

    async fn put_new(&self, item: Item) -> StoreResult<()> {
        let key = ItemKey::from_item(&item)?;
        let mut items = self.items.write().await;

        if items.contains_key(&(key.pk.clone(), key.sk.clone())) {
            return Err(StoreError::ConditionalCheckFailed);
        }

        items.insert((key.pk, key.sk), item);
        Ok(())
    }

    async fn update(
        &self,
        key: &ItemKey,
        changes: Item,
        condition: Option<Condition>,
    ) -> StoreResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut items = self.items.write().await;
        let map_key = (key.pk.clone(), key.sk.clone());

        if let Some(condition) = &condition {
            if !condition_holds(items.get(&map_key), condition) {
                return Err(StoreError::ConditionalCheckFailed);
            }
        }

        let item = items.entry(map_key).or_insert_with(|| {
            Item::from([
                (
                    KeyAttribute::Pk.to_string(),
                    AttributeValue::S(key.pk.clone()),
                ),
                (
                    KeyAttribute::Sk.to_string(),
                    AttributeValue::S(key.sk.clone()),
                ),
            ])
        });
        item.extend(changes);

        Ok(())
    }

    async fn delete(&self, key: &ItemKey) -> StoreResult<()> {
        self.items
            .write()
            .await
            .remove(&(key.pk.clone(), key.sk.clone()));
        Ok(())
    }

    async fn query_prefix(&self, pk: &str, sk_prefix: &str) -> StoreResult<Vec<Item>> {
        let items = self.items.read().await;

        Ok(items
            .iter()
            .filter(|((item_pk, item_sk), _)| item_pk == pk && item_sk.starts_with(sk_prefix))
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn scan(&self, filter: ScanFilter) -> StoreResult<Vec<Item>> {
        let items = self.items.read().await;

        Ok(items
            .iter()
            .filter(|((pk, _), item)| match &filter {
                ScanFilter::PkPrefix(prefix) => pk.starts_with(prefix.as_str()),
                ScanFilter::AttributeEquals { attribute, value } => {
                    item.get(attribute) == Some(value)
                }
            })
            .map(|(_, item)| item.clone())
            .collect())
    }
}
