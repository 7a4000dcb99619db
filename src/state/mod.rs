pub mod auth;
pub mod draw;
pub mod fixtures;
pub mod roster;
pub mod scoring;
mod sse;
pub mod sync;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig, dao::fixture_store::FixtureStore, error::ServiceError,
    services::sse_events, state::fixtures::ParticipantId,
};

pub use self::sse::SseHub;
use self::{roster::Roster, sync::ClientCache};

pub type SharedState = Arc<AppState>;

/// Capacity of the public SSE broadcast channel.
const PUBLIC_SSE_CAPACITY: usize = 64;

/// Central application state: store handle, sessions, and the server-side cache.
pub struct AppState {
    config: AppConfig,
    fixture_store: RwLock<Option<Arc<dyn FixtureStore>>>,
    degraded: watch::Sender<bool>,
    sse: SseHub,
    sessions: DashMap<String, ParticipantId>,
    board: RwLock<ClientCache>,
    write_gate: RwLock<()>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a fixture store is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            fixture_store: RwLock::new(None),
            degraded: degraded_tx,
            sse: SseHub::new(PUBLIC_SSE_CAPACITY),
            sessions: DashMap::new(),
            board: RwLock::new(ClientCache::new()),
            write_gate: RwLock::new(()),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Configured roster.
    pub fn roster(&self) -> &Roster {
        self.config.roster()
    }

    /// Obtain a handle to the current fixture store, if one is installed.
    pub async fn fixture_store(&self) -> Option<Arc<dyn FixtureStore>> {
        let guard = self.fixture_store.read().await;
        guard.as_ref().cloned()
    }

    /// Fixture store for a write or a fresh read; fails while degraded.
    pub async fn require_fixture_store(&self) -> Result<Arc<dyn FixtureStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.fixture_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new fixture store implementation and leave degraded mode.
    pub async fn install_fixture_store(&self, store: Arc<dyn FixtureStore>) {
        {
            let mut guard = self.fixture_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update the degraded flag, announcing it on SSE when the value changes.
    pub fn update_degraded(&self, value: bool) {
        let changed = self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
        if changed {
            sse_events::broadcast_system_status(&self.sse, value);
        }
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Session token to participant registry.
    pub fn sessions(&self) -> &DashMap<String, ParticipantId> {
        &self.sessions
    }

    /// Server-side cache folded from the store's change feed.
    pub fn board(&self) -> &RwLock<ClientCache> {
        &self.board
    }

    /// Replace the cache with `f(cache)` under the write lock.
    pub async fn update_board<F>(&self, f: F)
    where
        F: FnOnce(ClientCache) -> ClientCache,
    {
        let mut guard = self.board.write().await;
        let current = std::mem::take(&mut *guard);
        *guard = f(current);
    }

    /// Orders writes within this process.
    ///
    /// Commissioner writes take the exclusive side. Predictions take the
    /// shared side across their finished check and store write, so a match
    /// cannot be finalized in between.
    pub fn write_gate(&self) -> &RwLock<()> {
        &self.write_gate
    }
}
