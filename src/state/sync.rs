//! Cache of store state kept current by folding change events.
//!
//! [`apply_change_event`] is the only way inbound notifications touch the
//! cache. Records are replaced by natural key, never merged, so duplicate
//! delivery and optimistic local writes both settle to the store's value.

use std::collections::{BTreeMap, HashMap};

use super::{
    draw::Draw,
    fixtures::{Match, MatchId, MatchStatus, Prediction, PredictionKey, Score},
    roster::Roster,
    scoring::{Standing, compute_leaderboard},
};
use crate::dao::models::ChangeEvent;

/// Synchronization phase of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    /// Waiting for the first full snapshot; events are buffered.
    #[default]
    Loading,
    /// Snapshot applied; events are folded in as they arrive.
    Synced,
}

/// Full read of the store used to hydrate a cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Every match.
    pub matches: Vec<Match>,
    /// Every prediction.
    pub predictions: Vec<Prediction>,
    /// Current draw, if any.
    pub draw: Option<Draw>,
}

/// Write applied locally before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalMutation {
    /// A participant placed or edited a prediction.
    PlacePrediction(Prediction),
    /// The commissioner finalized a match.
    FinalizeMatch {
        /// Target match.
        match_id: MatchId,
        /// Final score.
        score: Score,
    },
    /// The commissioner marked a match live, clearing any result.
    MarkLive {
        /// Target match.
        match_id: MatchId,
    },
    /// A new draw replaced the previous one, or the draw was cleared.
    ReplaceDraw(Option<Draw>),
}

/// In-memory view of matches, predictions and the draw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientCache {
    phase: SyncPhase,
    matches: BTreeMap<MatchId, Match>,
    predictions: HashMap<PredictionKey, Prediction>,
    draw: Option<Draw>,
    pending: Vec<ChangeEvent>,
}

impl ClientCache {
    /// Empty cache in the loading phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Whether a snapshot has been applied.
    pub fn is_synced(&self) -> bool {
        self.phase == SyncPhase::Synced
    }

    /// Matches ordered by id.
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    /// Match by id.
    pub fn find_match(&self, id: MatchId) -> Option<&Match> {
        self.matches.get(&id)
    }

    /// Every cached prediction, in no particular order.
    pub fn predictions(&self) -> impl Iterator<Item = &Prediction> {
        self.predictions.values()
    }

    /// Current draw.
    pub fn draw(&self) -> Option<&Draw> {
        self.draw.as_ref()
    }

    /// Number of events waiting for a snapshot.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Replace the cache contents with `snapshot`, then replay buffered events.
    ///
    /// The snapshot may already include some of the buffered writes, so an
    /// event is replayed only when its `old` value is what the cache holds at
    /// that point. Older events are skipped instead of rolling a record back.
    pub fn hydrate(self, snapshot: Snapshot) -> Self {
        let Snapshot {
            matches,
            predictions,
            draw,
        } = snapshot;

        let mut cache = Self {
            phase: SyncPhase::Synced,
            matches: matches.into_iter().map(|m| (m.id, m)).collect(),
            predictions: predictions
                .into_iter()
                .map(|p| (p.key.clone(), p))
                .collect(),
            draw,
            pending: Vec::new(),
        };
        for event in &self.pending {
            if cache.continues_from(event) {
                cache = apply_change_event(cache, event);
            }
        }
        cache
    }

    fn continues_from(&self, event: &ChangeEvent) -> bool {
        match event {
            ChangeEvent::MatchUpdated { old, new } => {
                self.matches.get(&new.id) == old.clone().map(Match::from).as_ref()
            }
            ChangeEvent::PredictionUpserted { old, new } => {
                let key = PredictionKey::new(new.participant_id.as_str(), new.match_id);
                self.predictions.get(&key) == old.clone().map(Prediction::from).as_ref()
            }
            ChangeEvent::DrawReplaced { old, .. } => {
                self.draw == old.clone().map(Draw::from)
            }
        }
    }

    /// Drop back to loading, keeping the stale records readable until the
    /// next snapshot lands.
    pub fn begin_resync(mut self) -> Self {
        self.phase = SyncPhase::Loading;
        self.pending.clear();
        self
    }

    /// Apply an optimistic write.
    ///
    /// The resulting records are identical to what the store's event for the
    /// same write carries, so the later event overwrites them with equal values.
    pub fn apply_local(mut self, mutation: &LocalMutation) -> Self {
        match mutation {
            LocalMutation::PlacePrediction(prediction) => {
                self.predictions
                    .insert(prediction.key.clone(), prediction.clone());
            }
            LocalMutation::FinalizeMatch { match_id, score } => {
                if let Some(entry) = self.matches.get_mut(match_id) {
                    entry.finalize(*score);
                }
            }
            LocalMutation::MarkLive { match_id } => {
                if let Some(entry) = self.matches.get_mut(match_id) {
                    entry.status = MatchStatus::Live;
                    entry.result = None;
                }
            }
            LocalMutation::ReplaceDraw(draw) => {
                self.draw = draw.clone();
            }
        }
        self
    }

    /// Leaderboard over the cached records.
    pub fn leaderboard(&self, roster: &Roster) -> Vec<Standing> {
        compute_leaderboard(roster, self.predictions.values(), self.matches.values())
    }
}

/// Fold one change event into the cache.
///
/// While loading, the event is buffered for replay after hydration.
pub fn apply_change_event(mut cache: ClientCache, event: &ChangeEvent) -> ClientCache {
    if cache.phase == SyncPhase::Loading {
        cache.pending.push(event.clone());
        return cache;
    }

    match event {
        ChangeEvent::MatchUpdated { new, .. } => {
            let record = Match::from(new.clone());
            cache.matches.insert(record.id, record);
        }
        ChangeEvent::PredictionUpserted { new, .. } => {
            let record = Prediction::from(new.clone());
            cache.predictions.insert(record.key.clone(), record);
        }
        ChangeEvent::DrawReplaced { new, .. } => {
            cache.draw = new.clone().map(Draw::from);
        }
    }
    cache
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use uuid::Uuid;

    use super::*;
    use crate::dao::models::{
        DrawEntity, MatchEntity, MatchPatch, PairingEntity, PredictionEntity,
    };

    fn entity(id: MatchId) -> MatchEntity {
        MatchEntity::upcoming(id, "Argentina", "Algeria", "16 Jun", "21:00", "Kansas City")
    }

    fn finalized(id: MatchId, home: u32, away: u32) -> MatchEntity {
        let mut entity = entity(id);
        MatchPatch::finalize(home, away).apply_to(&mut entity);
        entity
    }

    fn prediction(participant: &str, match_id: MatchId, home: u32, away: u32) -> PredictionEntity {
        PredictionEntity {
            participant_id: participant.into(),
            match_id,
            home_score: home,
            away_score: away,
        }
    }

    fn synced() -> ClientCache {
        ClientCache::new().hydrate(Snapshot {
            matches: vec![entity(1).into(), entity(2).into()],
            predictions: Vec::new(),
            draw: None,
        })
    }

    #[test]
    fn duplicate_delivery_is_idempotent() {
        let event = ChangeEvent::PredictionUpserted {
            old: None,
            new: prediction("p1", 1, 2, 1),
        };

        let once = apply_change_event(synced(), &event);
        let twice = apply_change_event(once.clone(), &event);

        assert_eq!(once, twice);
    }

    #[test]
    fn records_are_replaced_not_merged() {
        let first = ChangeEvent::PredictionUpserted {
            old: None,
            new: prediction("p1", 1, 2, 1),
        };
        let second = ChangeEvent::PredictionUpserted {
            old: Some(prediction("p1", 1, 2, 1)),
            new: prediction("p1", 1, 0, 0),
        };

        let cache = apply_change_event(apply_change_event(synced(), &first), &second);

        let stored: Vec<&Prediction> = cache.predictions().collect();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].score, Score::new(0, 0));
    }

    #[test]
    fn optimistic_finalize_matches_later_event() {
        let optimistic = synced().apply_local(&LocalMutation::FinalizeMatch {
            match_id: 1,
            score: Score::new(2, 1),
        });
        let confirmed = apply_change_event(
            optimistic.clone(),
            &ChangeEvent::MatchUpdated {
                old: Some(entity(1)),
                new: finalized(1, 2, 1),
            },
        );

        assert_eq!(optimistic, confirmed);
    }

    #[test]
    fn optimistic_prediction_matches_later_event() {
        let record: Prediction = prediction("p2", 2, 1, 1).into();
        let optimistic = synced().apply_local(&LocalMutation::PlacePrediction(record));
        let confirmed = apply_change_event(
            optimistic.clone(),
            &ChangeEvent::PredictionUpserted {
                old: None,
                new: prediction("p2", 2, 1, 1),
            },
        );

        assert_eq!(optimistic, confirmed);
    }

    #[test]
    fn events_before_snapshot_are_replayed() {
        let loading = apply_change_event(
            ClientCache::new(),
            &ChangeEvent::MatchUpdated {
                old: Some(entity(1)),
                new: finalized(1, 3, 0),
            },
        );
        assert_eq!(loading.phase(), SyncPhase::Loading);
        assert_eq!(loading.pending_len(), 1);

        let cache = loading.hydrate(Snapshot {
            matches: vec![entity(1).into()],
            predictions: Vec::new(),
            draw: None,
        });

        assert!(cache.is_synced());
        assert_eq!(cache.pending_len(), 0);
        assert_eq!(
            cache.find_match(1).and_then(Match::final_score),
            Some(Score::new(3, 0))
        );
    }

    #[test]
    fn buffered_events_already_in_snapshot_are_skipped() {
        let first = ChangeEvent::MatchUpdated {
            old: Some(entity(1)),
            new: finalized(1, 1, 0),
        };
        let second = ChangeEvent::MatchUpdated {
            old: Some(finalized(1, 1, 0)),
            new: finalized(1, 2, 0),
        };

        // Snapshot read after both writes: nothing to replay.
        let loading = apply_change_event(ClientCache::new(), &first);
        let cache = loading.hydrate(Snapshot {
            matches: vec![finalized(1, 2, 0).into()],
            predictions: Vec::new(),
            draw: None,
        });
        assert_eq!(
            cache.find_match(1).and_then(Match::final_score),
            Some(Score::new(2, 0))
        );

        // Snapshot read between the writes: only the second one replays.
        let loading = apply_change_event(apply_change_event(ClientCache::new(), &first), &second);
        let cache = loading.hydrate(Snapshot {
            matches: vec![finalized(1, 1, 0).into()],
            predictions: Vec::new(),
            draw: None,
        });
        assert_eq!(
            cache.find_match(1).and_then(Match::final_score),
            Some(Score::new(2, 0))
        );
    }

    #[test]
    fn buffered_prediction_newer_than_snapshot_is_replayed() {
        let loading = apply_change_event(
            ClientCache::new(),
            &ChangeEvent::PredictionUpserted {
                old: Some(prediction("p1", 1, 0, 0)),
                new: prediction("p1", 1, 4, 2),
            },
        );

        let cache = loading.hydrate(Snapshot {
            matches: vec![entity(1).into()],
            predictions: vec![prediction("p1", 1, 0, 0).into()],
            draw: None,
        });

        let stored: Vec<&Prediction> = cache.predictions().collect();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].score, Score::new(4, 2));
    }

    #[test]
    fn draw_is_replaced_wholesale_and_cleared() {
        let draw = DrawEntity {
            id: Uuid::new_v4(),
            drawn_at: SystemTime::now(),
            pairings: vec![
                PairingEntity {
                    giver_id: "p1".into(),
                    receiver_id: "p2".into(),
                },
                PairingEntity {
                    giver_id: "p2".into(),
                    receiver_id: "p1".into(),
                },
            ],
        };

        let drawn = apply_change_event(
            synced(),
            &ChangeEvent::DrawReplaced {
                old: None,
                new: Some(draw.clone()),
            },
        );
        assert_eq!(
            drawn.draw().and_then(|d| d.receiver_for("p1")).map(String::as_str),
            Some("p2")
        );

        let cleared = apply_change_event(
            drawn,
            &ChangeEvent::DrawReplaced {
                old: Some(draw),
                new: None,
            },
        );
        assert!(cleared.draw().is_none());
    }

    #[test]
    fn resync_keeps_stale_records_until_next_snapshot() {
        let cache = synced().begin_resync();
        assert_eq!(cache.phase(), SyncPhase::Loading);
        assert_eq!(cache.matches().count(), 2);
    }
}
