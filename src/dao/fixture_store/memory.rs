//! Process-local fixture store used for development deployments and tests.

use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use futures::{future::BoxFuture, stream::BoxStream};
use indexmap::IndexMap;
use thiserror::Error;
use tokio::sync::RwLock;

use super::{ChangeFeed, FixtureStore};
use crate::dao::{
    models::{ChangeEvent, DrawEntity, EventFilter, MatchEntity, MatchPatch, PredictionEntity},
    storage::{StorageError, StorageResult},
};

/// Failures raised by the in-memory backend.
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    /// The store was switched offline.
    #[error("in-memory store is offline")]
    Offline,
}

impl From<MemoryStoreError> for StorageError {
    fn from(err: MemoryStoreError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}

#[derive(Default)]
struct Tables {
    matches: BTreeMap<u32, MatchEntity>,
    predictions: IndexMap<(String, u32), PredictionEntity>,
    draw: Option<DrawEntity>,
}

/// Fixture store keeping every table behind a single lock.
///
/// Events are published while the write lock is held so subscribers observe
/// them in write order.
#[derive(Clone, Default)]
pub struct InMemoryFixtureStore {
    tables: Arc<RwLock<Tables>>,
    feed: ChangeFeed,
    offline: Arc<AtomicBool>,
}

impl InMemoryFixtureStore {
    /// Empty, online store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle availability; while offline every operation fails.
    pub fn set_online(&self, online: bool) {
        self.offline.store(!online, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), MemoryStoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(MemoryStoreError::Offline)
        } else {
            Ok(())
        }
    }
}

impl FixtureStore for InMemoryFixtureStore {
    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let tables = store.tables.read().await;
            Ok(tables.matches.values().cloned().collect())
        })
    }

    fn find_match(&self, id: u32) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let tables = store.tables.read().await;
            Ok(tables.matches.get(&id).cloned())
        })
    }

    fn seed_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let mut tables = store.tables.write().await;
            if tables.matches.contains_key(&entity.id) {
                return Ok(false);
            }
            tables.matches.insert(entity.id, entity.clone());
            store.feed.publish(ChangeEvent::MatchUpdated {
                old: None,
                new: entity,
            });
            Ok(true)
        })
    }

    fn update_match(
        &self,
        id: u32,
        patch: MatchPatch,
    ) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let mut tables = store.tables.write().await;
            let Some(entity) = tables.matches.get_mut(&id) else {
                return Ok(None);
            };
            let old = entity.clone();
            patch.apply_to(entity);
            let new = entity.clone();
            store.feed.publish(ChangeEvent::MatchUpdated {
                old: Some(old),
                new: new.clone(),
            });
            Ok(Some(new))
        })
    }

    fn list_predictions(&self) -> BoxFuture<'static, StorageResult<Vec<PredictionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let tables = store.tables.read().await;
            Ok(tables.predictions.values().cloned().collect())
        })
    }

    fn upsert_prediction(
        &self,
        prediction: PredictionEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let mut tables = store.tables.write().await;
            let key = (prediction.participant_id.clone(), prediction.match_id);
            let old = tables.predictions.insert(key, prediction.clone());
            store.feed.publish(ChangeEvent::PredictionUpserted {
                old,
                new: prediction,
            });
            Ok(())
        })
    }

    fn current_draw(&self) -> BoxFuture<'static, StorageResult<Option<DrawEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let tables = store.tables.read().await;
            Ok(tables.draw.clone())
        })
    }

    fn replace_draw(&self, draw: DrawEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let mut tables = store.tables.write().await;
            let old = tables.draw.replace(draw.clone());
            store.feed.publish(ChangeEvent::DrawReplaced {
                old,
                new: Some(draw),
            });
            Ok(())
        })
    }

    fn clear_draw(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let mut tables = store.tables.write().await;
            let old = tables.draw.take();
            store
                .feed
                .publish(ChangeEvent::DrawReplaced { old, new: None });
            Ok(())
        })
    }

    fn subscribe(&self, filter: EventFilter) -> StorageResult<BoxStream<'static, ChangeEvent>> {
        self.ensure_online()?;
        Ok(self.feed.subscribe(filter))
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online().map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.health_check()
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use futures::StreamExt;
    use uuid::Uuid;

    use super::*;
    use crate::dao::models::{MatchStatusEntity, PairingEntity};

    fn fixture(id: u32) -> MatchEntity {
        MatchEntity::upcoming(id, "Spain", "Uruguay", "15 Jun", "18:00", "Atlanta")
    }

    fn draw(pairs: &[(&str, &str)]) -> DrawEntity {
        DrawEntity {
            id: Uuid::new_v4(),
            drawn_at: SystemTime::now(),
            pairings: pairs
                .iter()
                .map(|(giver, receiver)| PairingEntity {
                    giver_id: (*giver).into(),
                    receiver_id: (*receiver).into(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn matches_are_listed_by_id() {
        let store = InMemoryFixtureStore::new();
        store.seed_match(fixture(3)).await.unwrap();
        store.seed_match(fixture(1)).await.unwrap();
        store.seed_match(fixture(2)).await.unwrap();

        let ids: Vec<u32> = store
            .list_matches()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn seeding_never_overwrites() {
        let store = InMemoryFixtureStore::new();
        assert!(store.seed_match(fixture(1)).await.unwrap());
        store
            .update_match(1, MatchPatch::finalize(2, 0))
            .await
            .unwrap();

        assert!(!store.seed_match(fixture(1)).await.unwrap());
        let stored = store.find_match(1).await.unwrap().unwrap();
        assert_eq!(stored.status, MatchStatusEntity::Finished);
    }

    #[tokio::test]
    async fn update_of_unknown_match_is_none() {
        let store = InMemoryFixtureStore::new();
        let updated = store
            .update_match(9, MatchPatch::finalize(1, 1))
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn prediction_upsert_overwrites_by_composite_key() {
        let store = InMemoryFixtureStore::new();
        let mut events = store.subscribe(EventFilter::all()).unwrap();
        let first = PredictionEntity {
            participant_id: "p1".into(),
            match_id: 1,
            home_score: 1,
            away_score: 0,
        };
        let second = PredictionEntity {
            home_score: 2,
            ..first.clone()
        };

        store.upsert_prediction(first.clone()).await.unwrap();
        store.upsert_prediction(second.clone()).await.unwrap();

        assert_eq!(store.list_predictions().await.unwrap(), vec![second.clone()]);
        events.next().await;
        assert_eq!(
            events.next().await,
            Some(ChangeEvent::PredictionUpserted {
                old: Some(first),
                new: second,
            })
        );
    }

    #[tokio::test]
    async fn draw_replace_is_wholesale() {
        let store = InMemoryFixtureStore::new();
        let old = draw(&[("p1", "p2"), ("p2", "p3"), ("p3", "p1")]);
        let new = draw(&[("p1", "p3"), ("p3", "p2"), ("p2", "p1")]);

        store.replace_draw(old).await.unwrap();
        store.replace_draw(new.clone()).await.unwrap();

        assert_eq!(store.current_draw().await.unwrap(), Some(new));
        store.clear_draw().await.unwrap();
        assert_eq!(store.current_draw().await.unwrap(), None);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = InMemoryFixtureStore::new();
        store.set_online(false);

        assert!(store.list_matches().await.is_err());
        assert!(store.health_check().await.is_err());
        assert!(store.subscribe(EventFilter::all()).is_err());

        store.set_online(true);
        assert!(store.health_check().await.is_ok());
    }
}
