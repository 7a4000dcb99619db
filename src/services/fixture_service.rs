use tracing::info;

use crate::{
    dao::{fixture_store::FixtureStore, storage::StorageResult},
    dto::fixture::{MatchSummary, PredictionSummary, ScoreInput},
    error::ServiceError,
    state::{
        SharedState,
        auth::Role,
        fixtures::{Match, MatchId, Prediction, PredictionKey, Score},
        sync::{LocalMutation, Snapshot},
    },
};

/// Read matches, predictions and the current draw in one pass.
pub async fn load_snapshot(store: &dyn FixtureStore) -> StorageResult<Snapshot> {
    let matches = store.list_matches().await?;
    let predictions = store.list_predictions().await?;
    let draw = store.current_draw().await?;

    Ok(Snapshot {
        matches: matches.into_iter().map(Match::from).collect(),
        predictions: predictions.into_iter().map(Prediction::from).collect(),
        draw: draw.map(Into::into),
    })
}

/// Every match ordered by id.
pub async fn list_matches(state: &SharedState) -> Result<Vec<MatchSummary>, ServiceError> {
    let store = state.require_fixture_store().await?;
    let matches = store.list_matches().await?;
    Ok(matches
        .into_iter()
        .map(|entity| MatchSummary::from(&Match::from(entity)))
        .collect())
}

/// A single match.
pub async fn get_match(state: &SharedState, id: MatchId) -> Result<MatchSummary, ServiceError> {
    let store = state.require_fixture_store().await?;
    let entity = store
        .find_match(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match {id}")))?;
    Ok(MatchSummary::from(&Match::from(entity)))
}

/// Every stored prediction.
pub async fn list_predictions(
    state: &SharedState,
) -> Result<Vec<PredictionSummary>, ServiceError> {
    let store = state.require_fixture_store().await?;
    let predictions = store.list_predictions().await?;
    Ok(predictions
        .into_iter()
        .map(|entity| PredictionSummary::from(&Prediction::from(entity)))
        .collect())
}

/// Place or overwrite the caller's prediction for `match_id`.
///
/// Finished matches are locked; the finished check and the store write run
/// under the shared side of the write gate. The prediction is applied to the server
/// cache before the store write and stays there if the write fails.
pub async fn submit_prediction(
    state: &SharedState,
    role: &Role,
    match_id: MatchId,
    input: ScoreInput,
) -> Result<PredictionSummary, ServiceError> {
    let participant_id = role
        .participant_id()
        .ok_or_else(|| ServiceError::Unauthorized("only participants can predict".into()))?;
    if !state.roster().contains(participant_id) {
        return Err(ServiceError::NotFound(format!(
            "participant `{participant_id}`"
        )));
    }
    let score = Score::try_from_signed(input.home, input.away)?;

    let _gate = state.write_gate().read().await;
    let store = state.require_fixture_store().await?;
    let entity = store
        .find_match(match_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match {match_id}")))?;
    if Match::from(entity).is_finished() {
        return Err(ServiceError::InvalidState(format!(
            "match {match_id} is finished; predictions are locked"
        )));
    }

    let prediction = Prediction {
        key: PredictionKey::new(participant_id, match_id),
        score,
    };
    let mutation = LocalMutation::PlacePrediction(prediction.clone());
    state
        .update_board(|cache| cache.apply_local(&mutation))
        .await;

    store.upsert_prediction(prediction.clone().into()).await?;
    info!(participant_id, match_id, "prediction saved");

    Ok(PredictionSummary::from(&prediction))
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use futures::{StreamExt, future::BoxFuture, stream::BoxStream};
    use tokio::{sync::Notify, time::sleep};

    use super::*;
    use crate::{
        dao::{
            fixture_store::memory::InMemoryFixtureStore,
            models::{
                ChangeEvent, DrawEntity, EventFilter, MatchEntity, MatchPatch, PredictionEntity,
            },
        },
        services::{
            finalization_service::finalize_match,
            test_support::{commissioner, participant, seeded_state},
        },
    };

    /// Store whose prediction writes stall after signalling that they began.
    struct SlowUpserts {
        inner: InMemoryFixtureStore,
        started: Arc<Notify>,
    }

    impl FixtureStore for SlowUpserts {
        fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
            self.inner.list_matches()
        }

        fn find_match(&self, id: u32) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
            self.inner.find_match(id)
        }

        fn seed_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<bool>> {
            self.inner.seed_match(entity)
        }

        fn update_match(
            &self,
            id: u32,
            patch: MatchPatch,
        ) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
            self.inner.update_match(id, patch)
        }

        fn list_predictions(&self) -> BoxFuture<'static, StorageResult<Vec<PredictionEntity>>> {
            self.inner.list_predictions()
        }

        fn upsert_prediction(
            &self,
            prediction: PredictionEntity,
        ) -> BoxFuture<'static, StorageResult<()>> {
            let inner = self.inner.clone();
            let started = self.started.clone();
            Box::pin(async move {
                started.notify_one();
                sleep(Duration::from_millis(50)).await;
                inner.upsert_prediction(prediction).await
            })
        }

        fn current_draw(&self) -> BoxFuture<'static, StorageResult<Option<DrawEntity>>> {
            self.inner.current_draw()
        }

        fn replace_draw(&self, draw: DrawEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.replace_draw(draw)
        }

        fn clear_draw(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.clear_draw()
        }

        fn subscribe(&self, filter: EventFilter) -> StorageResult<BoxStream<'static, ChangeEvent>> {
            self.inner.subscribe(filter)
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.health_check()
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.try_reconnect()
        }
    }

    #[tokio::test]
    async fn prediction_is_stored_and_cached() {
        let (state, store) = seeded_state().await;
        state
            .update_board(|cache| cache.hydrate(Snapshot::default()))
            .await;

        let saved = submit_prediction(
            &state,
            &participant("p1"),
            1,
            ScoreInput { home: 2, away: 0 },
        )
        .await
        .unwrap();

        assert_eq!((saved.home, saved.away), (2, 0));
        assert_eq!(store.list_predictions().await.unwrap().len(), 1);
        assert_eq!(state.board().read().await.predictions().count(), 1);
    }

    #[tokio::test]
    async fn finished_matches_reject_predictions() {
        let (state, store) = seeded_state().await;
        store
            .update_match(1, MatchPatch::finalize(1, 0))
            .await
            .unwrap();

        let result = submit_prediction(
            &state,
            &participant("p1"),
            1,
            ScoreInput { home: 1, away: 0 },
        )
        .await;

        assert!(matches!(result, Err(ServiceError::InvalidState(_))));
        assert!(store.list_predictions().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn finalize_waits_for_an_in_flight_prediction() {
        let (state, store) = seeded_state().await;
        let started = Arc::new(Notify::new());
        state
            .install_fixture_store(Arc::new(SlowUpserts {
                inner: store.clone(),
                started: started.clone(),
            }))
            .await;
        let mut events = store.subscribe(EventFilter::all()).unwrap();

        let predicting = {
            let state = state.clone();
            tokio::spawn(async move {
                submit_prediction(&state, &participant("p1"), 1, ScoreInput { home: 1, away: 1 })
                    .await
            })
        };
        started.notified().await;

        finalize_match(&state, 1, ScoreInput { home: 2, away: 0 }, &commissioner())
            .await
            .unwrap();
        predicting.await.unwrap().unwrap();

        assert!(matches!(
            events.next().await,
            Some(ChangeEvent::PredictionUpserted { .. })
        ));
        assert!(matches!(
            events.next().await,
            Some(ChangeEvent::MatchUpdated { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn prediction_after_finalize_is_rejected() {
        let (state, store) = seeded_state().await;
        let started = Arc::new(Notify::new());
        state
            .install_fixture_store(Arc::new(SlowUpserts {
                inner: store.clone(),
                started: started.clone(),
            }))
            .await;

        let first = {
            let state = state.clone();
            tokio::spawn(async move {
                submit_prediction(&state, &participant("p1"), 1, ScoreInput { home: 0, away: 0 })
                    .await
            })
        };
        started.notified().await;
        finalize_match(&state, 1, ScoreInput { home: 3, away: 1 }, &commissioner())
            .await
            .unwrap();
        first.await.unwrap().unwrap();

        let late =
            submit_prediction(&state, &participant("p2"), 1, ScoreInput { home: 3, away: 1 })
                .await;
        assert!(matches!(late, Err(ServiceError::InvalidState(_))));
        assert_eq!(store.list_predictions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn negative_scores_and_unknown_matches_are_rejected() {
        let (state, store) = seeded_state().await;

        let negative = submit_prediction(
            &state,
            &participant("p2"),
            1,
            ScoreInput { home: -1, away: 0 },
        )
        .await;
        let unknown = submit_prediction(
            &state,
            &participant("p2"),
            99,
            ScoreInput { home: 1, away: 0 },
        )
        .await;

        assert!(matches!(negative, Err(ServiceError::InvalidInput(_))));
        assert!(matches!(unknown, Err(ServiceError::NotFound(_))));
        assert!(store.list_predictions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn commissioner_cannot_predict() {
        let (state, _store) = seeded_state().await;
        let result =
            submit_prediction(&state, &commissioner(), 1, ScoreInput { home: 0, away: 0 }).await;
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn unavailable_store_is_surfaced() {
        let (state, store) = seeded_state().await;
        store.set_online(false);

        let result = submit_prediction(
            &state,
            &participant("p4"),
            2,
            ScoreInput { home: 0, away: 3 },
        )
        .await;

        assert!(matches!(result, Err(ServiceError::Unavailable(_))));
        store.set_online(true);
        assert!(store.list_predictions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn snapshot_reads_every_table() {
        let (_state, store) = seeded_state().await;
        let snapshot = load_snapshot(&store).await.unwrap();
        assert_eq!(snapshot.matches.len(), 2);
        assert!(snapshot.predictions.is_empty());
        assert!(snapshot.draw.is_none());
    }
}
