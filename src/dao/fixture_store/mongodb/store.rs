use std::{future::Future, sync::Arc};

use futures::{TryStreamExt, future::BoxFuture, stream::BoxStream};
use mongodb::{
    Client, Collection, Database,
    bson::doc,
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoDrawDocument, MongoMatchDocument, MongoPredictionDocument, current_draw_doc_id,
        match_doc_id, prediction_doc_id,
    },
};
use crate::dao::{
    fixture_store::{ChangeFeed, FixtureStore},
    models::{ChangeEvent, DrawEntity, EventFilter, MatchEntity, MatchPatch, PredictionEntity},
    storage::StorageResult,
};

const MATCH_COLLECTION_NAME: &str = "matches";
const PREDICTION_COLLECTION_NAME: &str = "predictions";
const DRAW_COLLECTION_NAME: &str = "draws";

/// MongoDB-backed fixture store.
///
/// MongoDB change streams require a replica set, so change events are
/// published by this adapter after each successful write instead. This
/// assumes a single server process writes to the database.
///
/// Every write holds the adapter's write lock until its event is published,
/// so subscribers see events in the order the database applied the writes.
#[derive(Clone)]
pub struct MongoFixtureStore {
    inner: Arc<MongoInner>,
    feed: ChangeFeed,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
    writes: Mutex<()>,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoFixtureStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
            writes: Mutex::new(()),
        });

        let store = Self {
            inner,
            feed: ChangeFeed::default(),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.prediction_collection().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"match_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("prediction_match_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: PREDICTION_COLLECTION_NAME,
                index: "match_id",
                source,
            })?;

        Ok(())
    }

    async fn match_collection(&self) -> Collection<MongoMatchDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoMatchDocument>(MATCH_COLLECTION_NAME)
    }

    async fn prediction_collection(&self) -> Collection<MongoPredictionDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoPredictionDocument>(PREDICTION_COLLECTION_NAME)
    }

    async fn draw_collection(&self) -> Collection<MongoDrawDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoDrawDocument>(DRAW_COLLECTION_NAME)
    }

    async fn list_matches(&self) -> MongoResult<Vec<MatchEntity>> {
        let collection = self.match_collection().await;

        let documents: Vec<MongoMatchDocument> = collection
            .find(doc! {})
            .sort(doc! {"_id": 1})
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn find_match(&self, id: u32) -> MongoResult<Option<MatchEntity>> {
        let collection = self.match_collection().await;

        collection
            .find_one(match_doc_id(id))
            .await
            .map(|maybe| maybe.map(Into::into))
            .map_err(|source| MongoDaoError::LoadMatch { id, source })
    }

    async fn seed_match(&self, entity: MatchEntity) -> MongoResult<bool> {
        let id = entity.id;
        let collection = self.match_collection().await;

        write_and_publish(&self.inner.writes, &self.feed, async move {
            // `_id` comes from the filter on insert, so it is left out of `$setOnInsert`.
            let result = collection
                .update_one(
                    match_doc_id(id),
                    doc! {
                        "$setOnInsert": {
                            "home": &entity.home,
                            "away": &entity.away,
                            "date": &entity.date,
                            "time": &entity.time,
                            "stadium": &entity.stadium,
                            "status": entity.status.as_str(),
                            "result_home": entity.result_home.map(i64::from),
                            "result_away": entity.result_away.map(i64::from),
                        }
                    },
                )
                .upsert(true)
                .await
                .map_err(|source| MongoDaoError::SaveMatch { id, source })?;

            let inserted = result.upserted_id.is_some();
            if !inserted {
                debug!(match_id = id, "match already present; seed skipped");
                return Ok((false, None));
            }
            Ok::<_, MongoDaoError>((
                true,
                Some(ChangeEvent::MatchUpdated {
                    old: None,
                    new: entity,
                }),
            ))
        })
        .await
    }

    async fn update_match(&self, id: u32, patch: MatchPatch) -> MongoResult<Option<MatchEntity>> {
        let collection = self.match_collection().await;

        write_and_publish(&self.inner.writes, &self.feed, async move {
            let previous = collection
                .find_one_and_update(
                    match_doc_id(id),
                    doc! {
                        "$set": {
                            "status": patch.status.as_str(),
                            "result_home": patch.result_home.map(i64::from),
                            "result_away": patch.result_away.map(i64::from),
                        }
                    },
                )
                .return_document(ReturnDocument::Before)
                .await
                .map_err(|source| MongoDaoError::SaveMatch { id, source })?;

            let Some(previous) = previous else {
                return Ok((None, None));
            };

            let old: MatchEntity = previous.into();
            let mut new = old.clone();
            patch.apply_to(&mut new);
            let event = ChangeEvent::MatchUpdated {
                old: Some(old),
                new: new.clone(),
            };
            Ok::<_, MongoDaoError>((Some(new), Some(event)))
        })
        .await
    }

    async fn list_predictions(&self) -> MongoResult<Vec<PredictionEntity>> {
        let collection = self.prediction_collection().await;

        let documents: Vec<MongoPredictionDocument> = collection
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListPredictions { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListPredictions { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn upsert_prediction(&self, prediction: PredictionEntity) -> MongoResult<()> {
        let collection = self.prediction_collection().await;
        let document: MongoPredictionDocument = prediction.clone().into();

        write_and_publish(&self.inner.writes, &self.feed, async move {
            let previous = collection
                .find_one_and_replace(
                    prediction_doc_id(&prediction.participant_id, prediction.match_id),
                    &document,
                )
                .upsert(true)
                .return_document(ReturnDocument::Before)
                .await
                .map_err(|source| MongoDaoError::SavePrediction {
                    participant_id: prediction.participant_id.clone(),
                    match_id: prediction.match_id,
                    source,
                })?;

            let event = ChangeEvent::PredictionUpserted {
                old: previous.map(Into::into),
                new: prediction,
            };
            Ok::<_, MongoDaoError>(((), Some(event)))
        })
        .await
    }

    async fn current_draw(&self) -> MongoResult<Option<DrawEntity>> {
        let collection = self.draw_collection().await;

        collection
            .find_one(current_draw_doc_id())
            .await
            .map(|maybe| maybe.map(Into::into))
            .map_err(|source| MongoDaoError::LoadDraw { source })
    }

    async fn replace_draw(&self, draw: DrawEntity) -> MongoResult<()> {
        let collection = self.draw_collection().await;
        let document: MongoDrawDocument = draw.clone().into();

        write_and_publish(&self.inner.writes, &self.feed, async move {
            // A single-document replace keeps the old and new pairing sets from
            // ever being visible side by side.
            let previous = collection
                .find_one_and_replace(current_draw_doc_id(), &document)
                .upsert(true)
                .return_document(ReturnDocument::Before)
                .await
                .map_err(|source| MongoDaoError::SaveDraw { source })?;

            let event = ChangeEvent::DrawReplaced {
                old: previous.map(Into::into),
                new: Some(draw),
            };
            Ok::<_, MongoDaoError>(((), Some(event)))
        })
        .await
    }

    async fn clear_draw(&self) -> MongoResult<()> {
        let collection = self.draw_collection().await;

        write_and_publish(&self.inner.writes, &self.feed, async move {
            let previous = collection
                .find_one_and_delete(current_draw_doc_id())
                .await
                .map_err(|source| MongoDaoError::SaveDraw { source })?;

            let event = ChangeEvent::DrawReplaced {
                old: previous.map(Into::into),
                new: None,
            };
            Ok::<_, MongoDaoError>(((), Some(event)))
        })
        .await
    }
}

/// Run `write` and publish the event it yields while holding `writes`.
async fn write_and_publish<T, F>(writes: &Mutex<()>, feed: &ChangeFeed, write: F) -> MongoResult<T>
where
    F: Future<Output = MongoResult<(T, Option<ChangeEvent>)>>,
{
    let _guard = writes.lock().await;
    let (value, event) = write.await?;
    if let Some(event) = event {
        feed.publish(event);
    }
    Ok(value)
}

impl FixtureStore for MongoFixtureStore {
    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_matches().await.map_err(Into::into) })
    }

    fn find_match(&self, id: u32) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_match(id).await.map_err(Into::into) })
    }

    fn seed_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.seed_match(entity).await.map_err(Into::into) })
    }

    fn update_match(
        &self,
        id: u32,
        patch: MatchPatch,
    ) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.update_match(id, patch).await.map_err(Into::into) })
    }

    fn list_predictions(&self) -> BoxFuture<'static, StorageResult<Vec<PredictionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_predictions().await.map_err(Into::into) })
    }

    fn upsert_prediction(
        &self,
        prediction: PredictionEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert_prediction(prediction)
                .await
                .map_err(Into::into)
        })
    }

    fn current_draw(&self) -> BoxFuture<'static, StorageResult<Option<DrawEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.current_draw().await.map_err(Into::into) })
    }

    fn replace_draw(&self, draw: DrawEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.replace_draw(draw).await.map_err(Into::into) })
    }

    fn clear_draw(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.clear_draw().await.map_err(Into::into) })
    }

    fn subscribe(&self, filter: EventFilter) -> StorageResult<BoxStream<'static, ChangeEvent>> {
        Ok(self.feed.subscribe(filter))
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
