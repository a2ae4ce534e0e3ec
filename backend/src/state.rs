//! Application state management

use std::sync::Arc;

use roast_storage::{
    ratings::RatingAggregator, review::ReviewStorage, roast::RoastStorage, store::TableStore,
    user::UserStorage,
};

use crate::media_storage::MediaStorage;

/// Repositories and clients shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub roasts: Arc<RoastStorage>,
    pub reviews: Arc<ReviewStorage>,
    pub users: Arc<UserStorage>,
    /// Keeps roast aggregates in step with their reviews
    pub ratings: Arc<RatingAggregator>,
    /// Presigned image uploads
    pub media_storage: Arc<MediaStorage>,
}

impl AppState {
    /// Builds every repository over the same table
    #[must_use]
    pub fn new(store: Arc<dyn TableStore>, media_storage: Arc<MediaStorage>) -> Self {
        let roasts = Arc::new(RoastStorage::new(store.clone()));

        Self {
            ratings: Arc::new(RatingAggregator::new(roasts.clone())),
            reviews: Arc::new(ReviewStorage::new(store.clone())),
            users: Arc::new(UserStorage::new(store)),
            roasts,
            media_storage,
        }
    }
}
