//! `DynamoDB` implementation of the table store

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    error::SdkError,
    types::{
        AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
        ScalarAttributeType, TableStatus,
    },
    Client as DynamoDbClient,
};
use tracing::info;

use super::{
    Condition, Item, ItemKey, KeyAttribute, ScanFilter, StoreError, StoreResult, TableStore,
};

const TABLE_READY_ATTEMPTS: u32 = 30;
const TABLE_READY_INTERVAL: Duration = Duration::from_secs(1);

/// Table store backed by a `DynamoDB` table
pub struct DynamoDbStore {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
}

impl DynamoDbStore {
    /// Creates a new store over an existing table
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured Dynamo DB client
    /// * `table_name` - Name of the single table holding every entity
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
        }
    }

    /// Creates the table when it does not exist and waits until it is active
    ///
    /// Used against local emulators; deployed tables are provisioned out of band.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the table cannot be described or created, or does not
    /// become active in time
    pub async fn ensure_table(&self) -> StoreResult<()> {
        match self
            .dynamodb_client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
        {
            Ok(_) => return Ok(()),
            Err(SdkError::ServiceError(ref svc)) if svc.err().is_resource_not_found_exception() => {
            }
            Err(err) => return Err(err.into()),
        }

        info!("Creating table {}", self.table_name);

        self.dynamodb_client
            .create_table()
            .table_name(&self.table_name)
            .attribute_definitions(key_definition(KeyAttribute::Pk)?)
            .attribute_definitions(key_definition(KeyAttribute::Sk)?)
            .key_schema(key_schema(KeyAttribute::Pk, KeyType::Hash)?)
            .key_schema(key_schema(KeyAttribute::Sk, KeyType::Range)?)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await?;

        for _ in 0..TABLE_READY_ATTEMPTS {
            let response = self
                .dynamodb_client
                .describe_table()
                .table_name(&self.table_name)
                .send()
                .await?;

            if response.table().and_then(|table| table.table_status()) == Some(&TableStatus::Active)
            {
                info!("Table {} is active", self.table_name);
                return Ok(());
            }

            tokio::time::sleep(TABLE_READY_INTERVAL).await;
        }

        Err(StoreError::TableNotReady(self.table_name.clone()))
    }
}

fn key_definition(attribute: KeyAttribute) -> StoreResult<AttributeDefinition> {
    Ok(AttributeDefinition::builder()
        .attribute_name(attribute.to_string())
        .attribute_type(ScalarAttributeType::S)
        .build()?)
}

fn key_schema(attribute: KeyAttribute, key_type: KeyType) -> StoreResult<KeySchemaElement> {
    Ok(KeySchemaElement::builder()
        .attribute_name(attribute.to_string())
        .key_type(key_type)
        .build()?)
}

fn key_item(key: &ItemKey) -> Item {
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
}

#[async_trait]
impl TableStore for DynamoDbStore {
    async fn get(&self, key: &ItemKey) -> StoreResult<Option<Item>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key_item(key)))
            .send()
            .await?;

        Ok(response.item)
    }

    async fn put(&self, item: Item) -> StoreResult<()> {
        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await?;

        Ok(())
    }

    async fn put_new(&self, item: Item) -> StoreResult<()> {
        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#pk)")
            .expression_attribute_names("#pk", KeyAttribute::Pk.to_string())
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    StoreError::ConditionalCheckFailed
                } else {
                    err.into()
                }
            })?;

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

        let mut request = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(key_item(key)));

        let mut assignments = Vec::with_capacity(changes.len());
        for (index, (attribute, value)) in changes.into_iter().enumerate() {
            assignments.push(format!("#a{index} = :a{index}"));
            request = request
                .expression_attribute_names(format!("#a{index}"), attribute)
                .expression_attribute_values(format!(":a{index}"), value);
        }
        request = request.update_expression(format!("SET {}", assignments.join(", ")));

        if let Some(condition) = condition {
            let (expression, attribute, value) = match condition {
                Condition::Equals { attribute, value } => {
                    ("attribute_exists(#pk) AND #cond = :cond", attribute, value)
                }
                Condition::EqualsOrAbsent { attribute, value } => (
                    "attribute_exists(#pk) AND (attribute_not_exists(#cond) OR #cond = :cond)",
                    attribute,
                    value,
                ),
            };
            request = request
                .condition_expression(expression)
                .expression_attribute_names("#pk", KeyAttribute::Pk.to_string())
                .expression_attribute_names("#cond", attribute)
                .expression_attribute_values(":cond", value);
        }

        request.send().await.map_err(|err| {
            if matches!(
                err,
                SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
            ) {
                StoreError::ConditionalCheckFailed
            } else {
                err.into()
            }
        })?;

        Ok(())
    }

    async fn delete(&self, key: &ItemKey) -> StoreResult<()> {
        self.dynamodb_client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key_item(key)))
            .send()
            .await?;

        Ok(())
    }

    async fn query_prefix(&self, pk: &str, sk_prefix: &str) -> StoreResult<Vec<Item>> {
        let items = self
            .dynamodb_client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("#pk = :pk AND begins_with(#sk, :sk)")
            .expression_attribute_names("#pk", KeyAttribute::Pk.to_string())
            .expression_attribute_names("#sk", KeyAttribute::Sk.to_string())
            .expression_attribute_values(":pk", AttributeValue::S(pk.to_string()))
            .expression_attribute_values(":sk", AttributeValue::S(sk_prefix.to_string()))
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(items)
    }

    async fn scan(&self, filter: ScanFilter) -> StoreResult<Vec<Item>> {
        let request = self.dynamodb_client.scan().table_name(&self.table_name);

        let request = match filter {
            ScanFilter::PkPrefix(prefix) => request
                .filter_expression("begins_with(#pk, :prefix)")
                .expression_attribute_names("#pk", KeyAttribute::Pk.to_string())
                .expression_attribute_values(":prefix", AttributeValue::S(prefix)),
            ScanFilter::AttributeEquals { attribute, value } => request
                .filter_expression("#attr = :value")
                .expression_attribute_names("#attr", attribute)
                .expression_attribute_values(":value", value),
        };

        let items = request
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(items)
    }
}
