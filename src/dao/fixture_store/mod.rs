mod feed;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

pub use feed::ChangeFeed;

use crate::dao::models::{
    ChangeEvent, DrawEntity, EventFilter, MatchEntity, MatchPatch, PredictionEntity,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use futures::stream::BoxStream;

/// Abstraction over the persisted matches, predictions and gift-exchange draw.
///
/// Every successful write emits a [`ChangeEvent`] to subscribers, including the
/// subscriber that issued the write.
pub trait FixtureStore: Send + Sync {
    /// All matches ordered by ascending id.
    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>>;
    fn find_match(&self, id: u32) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;
    /// Insert a match unless one with the same id already exists.
    fn seed_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<bool>>;
    /// Partial update by primary key; `None` when the id is unknown.
    fn update_match(
        &self,
        id: u32,
        patch: MatchPatch,
    ) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;
    fn list_predictions(&self) -> BoxFuture<'static, StorageResult<Vec<PredictionEntity>>>;
    /// Insert-or-replace keyed by `(participant_id, match_id)`.
    fn upsert_prediction(
        &self,
        prediction: PredictionEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn current_draw(&self) -> BoxFuture<'static, StorageResult<Option<DrawEntity>>>;
    /// Atomically replace the whole pairing set.
    fn replace_draw(&self, draw: DrawEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete every pairing.
    fn clear_draw(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn subscribe(&self, filter: EventFilter) -> StorageResult<BoxStream<'static, ChangeEvent>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
