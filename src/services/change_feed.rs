use std::{sync::Arc, time::Duration};

use futures::StreamExt;
use tokio::{sync::watch, time::sleep};
use tracing::{info, warn};

use crate::{
    dao::{fixture_store::FixtureStore, models::EventFilter, storage::StorageResult},
    services::{fixture_service, sse_events},
    state::{
        SharedState,
        sync::{ClientCache, apply_change_event},
    },
};

/// Pause before subscribing again after the feed ended.
const RESYNC_DELAY: Duration = Duration::from_secs(1);

/// Keep the server cache in step with the store and fan changes out over SSE.
///
/// Each cycle subscribes, hydrates from a snapshot, then folds events until the
/// feed ends or the store degrades, after which the cache drops back to loading.
pub async fn run(state: SharedState) {
    let mut degraded = state.degraded_watcher();

    loop {
        let Some(store) = wait_for_store(&state, &mut degraded).await else {
            return;
        };

        match follow(&state, store, &mut degraded).await {
            Ok(()) => info!("change feed ended; resynchronizing"),
            Err(err) => warn!(error = %err, "change feed failed; resynchronizing"),
        }

        state.update_board(ClientCache::begin_resync).await;
        sleep(RESYNC_DELAY).await;
    }
}

async fn wait_for_store(
    state: &SharedState,
    degraded: &mut watch::Receiver<bool>,
) -> Option<Arc<dyn FixtureStore>> {
    loop {
        if !*degraded.borrow_and_update() {
            if let Some(store) = state.fixture_store().await {
                return Some(store);
            }
        }
        if degraded.changed().await.is_err() {
            return None;
        }
    }
}

/// One subscribe, hydrate and fold cycle.
async fn follow(
    state: &SharedState,
    store: Arc<dyn FixtureStore>,
    degraded: &mut watch::Receiver<bool>,
) -> StorageResult<()> {
    let mut events = store.subscribe(EventFilter::all())?;

    // Events arriving while the snapshot loads are buffered by the cache and
    // replayed on hydration.
    let snapshot = {
        let load = fixture_service::load_snapshot(store.as_ref());
        tokio::pin!(load);
        loop {
            tokio::select! {
                result = &mut load => break result?,
                next = events.next() => match next {
                    Some(event) => {
                        state.update_board(|cache| apply_change_event(cache, &event)).await;
                    }
                    None => return Ok(()),
                },
            }
        }
    };

    state.update_board(|cache| cache.hydrate(snapshot)).await;
    info!("server cache synchronized with store");
    publish_leaderboard(state).await;

    loop {
        tokio::select! {
            next = events.next() => {
                let Some(event) = next else {
                    return Ok(());
                };
                state.update_board(|cache| apply_change_event(cache, &event)).await;
                sse_events::broadcast_change(state, &event);
                publish_leaderboard(state).await;
            }
            changed = degraded.changed() => {
                if changed.is_err() || *degraded.borrow_and_update() {
                    return Ok(());
                }
            }
        }
    }
}

async fn publish_leaderboard(state: &SharedState) {
    let standings = state.board().read().await.leaderboard(state.roster());
    sse_events::broadcast_leaderboard(state, &standings);
}

#[cfg(test)]
mod tests {
    use tokio::time::timeout;

    use super::*;
    use crate::{
        dto::fixture::ScoreInput,
        services::{
            finalization_service,
            test_support::{commissioner, seeded_state},
        },
        state::fixtures::Score,
    };

    async fn wait_until<F>(state: &SharedState, mut check: F)
    where
        F: FnMut(&ClientCache) -> bool,
    {
        timeout(Duration::from_secs(5), async {
            loop {
                if check(&*state.board().read().await) {
                    return;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn cache_hydrates_and_follows_finalization() {
        let (state, _store) = seeded_state().await;
        let mut sse = state.public_sse().subscribe();
        tokio::spawn(run(state.clone()));

        wait_until(&state, ClientCache::is_synced).await;
        assert_eq!(state.board().read().await.matches().count(), 2);

        finalization_service::finalize_match(
            &state,
            2,
            ScoreInput { home: 0, away: 2 },
            &commissioner(),
        )
        .await
        .unwrap();

        wait_until(&state, |cache| {
            cache.find_match(2).and_then(|m| m.final_score()) == Some(Score::new(0, 2))
        })
        .await;

        let mut names = Vec::new();
        while let Ok(Ok(event)) = timeout(Duration::from_millis(200), sse.recv()).await {
            names.extend(event.event);
        }
        assert!(names.iter().any(|name| name == "match.updated"));
        assert!(names.iter().any(|name| name == "leaderboard.updated"));
    }

    #[tokio::test]
    async fn degradation_returns_cache_to_loading() {
        let (state, _store) = seeded_state().await;
        tokio::spawn(run(state.clone()));
        wait_until(&state, ClientCache::is_synced).await;

        state.update_degraded(true);

        wait_until(&state, |cache| !cache.is_synced()).await;
        state.update_degraded(false);
        wait_until(&state, ClientCache::is_synced).await;
    }
}
