//! Error types for table store operations

use aws_sdk_dynamodb::error::{BuildError, SdkError};
use aws_sdk_dynamodb::operation::{
    create_table::CreateTableError, delete_item::DeleteItemError,
    describe_table::DescribeTableError, get_item::GetItemError, put_item::PutItemError,
    query::QueryError, scan::ScanError, update_item::UpdateItemError,
};
use thiserror::Error;

/// Result type alias for table store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a [`super::TableStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read an item from `DynamoDB`
    #[error("Failed to get item from DynamoDB: {0:?}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Failed to write an item to `DynamoDB`
    #[error("Failed to put item into DynamoDB: {0:?}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to update an item in `DynamoDB`
    #[error("Failed to update item in DynamoDB: {0:?}")]
    DynamoDbUpdateError(#[from] SdkError<UpdateItemError>),

    /// Failed to delete an item from `DynamoDB`
    #[error("Failed to delete item from DynamoDB: {0:?}")]
    DynamoDbDeleteError(#[from] SdkError<DeleteItemError>),

    /// Failed to query items from `DynamoDB`
    #[error("Failed to query items from DynamoDB: {0:?}")]
    DynamoDbQueryError(#[from] SdkError<QueryError>),

    /// Failed to scan items from `DynamoDB`
    #[error("Failed to scan items from DynamoDB: {0:?}")]
    DynamoDbScanError(#[from] SdkError<ScanError>),

    /// Failed to describe the table
    #[error("Failed to describe DynamoDB table: {0:?}")]
    DynamoDbDescribeTableError(#[from] SdkError<DescribeTableError>),

    /// Failed to create the table
    #[error("Failed to create DynamoDB table: {0:?}")]
    DynamoDbCreateTableError(#[from] SdkError<CreateTableError>),

    /// A write condition did not hold
    #[error("Conditional check failed")]
    ConditionalCheckFailed,

    /// An item is missing one of its key attributes
    #[error("Item is missing key attribute {0}")]
    MissingKeyAttribute(String),

    /// A request could not be built
    #[error("Invalid DynamoDB request: {0}")]
    InvalidRequest(#[from] BuildError),

    /// The table did not become active in time
    #[error("Table {0} is not ready")]
    TableNotReady(String),

    /// Failed to convert between an entity and a stored item
    #[error("Failed to convert item: {0}")]
    SerializationError(String),
}

impl From<serde_dynamo::Error> for StoreError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
