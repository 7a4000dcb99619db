use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Lifecycle status of a match as persisted by the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatusEntity {
    /// Kick-off has not happened yet.
    Upcoming,
    /// The match is being played.
    Live,
    /// The real-world result has been recorded.
    Finished,
}

impl MatchStatusEntity {
    /// Stored string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatusEntity::Upcoming => "UPCOMING",
            MatchStatusEntity::Live => "LIVE",
            MatchStatusEntity::Finished => "FINISHED",
        }
    }
}

/// Match record as persisted by the store.
///
/// The result columns are nullable at the storage level; the domain layer
/// normalises records that break the "result iff finished" rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Stable numeric identifier.
    pub id: u32,
    /// Home team label.
    pub home: String,
    /// Away team label.
    pub away: String,
    /// Scheduled date label.
    pub date: String,
    /// Scheduled kick-off time label.
    pub time: String,
    /// Venue label.
    pub stadium: String,
    /// Lifecycle status.
    pub status: MatchStatusEntity,
    /// Finalized home goals.
    pub result_home: Option<u32>,
    /// Finalized away goals.
    pub result_away: Option<u32>,
}

impl MatchEntity {
    /// Build a fresh, upcoming match without a result.
    pub fn upcoming(
        id: u32,
        home: impl Into<String>,
        away: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        stadium: impl Into<String>,
    ) -> Self {
        Self {
            id,
            home: home.into(),
            away: away.into(),
            date: date.into(),
            time: time.into(),
            stadium: stadium.into(),
            status: MatchStatusEntity::Upcoming,
            result_home: None,
            result_away: None,
        }
    }
}

/// Partial update applied to a match: status and result columns only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPatch {
    /// New lifecycle status.
    pub status: MatchStatusEntity,
    /// New home result (cleared when `None`).
    pub result_home: Option<u32>,
    /// New away result (cleared when `None`).
    pub result_away: Option<u32>,
}

impl MatchPatch {
    /// Patch marking a match as finished with the given result.
    pub fn finalize(home: u32, away: u32) -> Self {
        Self {
            status: MatchStatusEntity::Finished,
            result_home: Some(home),
            result_away: Some(away),
        }
    }

    /// Patch marking a match as live and clearing any previous result.
    pub fn live() -> Self {
        Self {
            status: MatchStatusEntity::Live,
            result_home: None,
            result_away: None,
        }
    }

    /// Apply the patch to an entity in place, leaving schedule fields untouched.
    pub fn apply_to(&self, entity: &mut MatchEntity) {
        entity.status = self.status;
        entity.result_home = self.result_home;
        entity.result_away = self.result_away;
    }
}

/// A participant's predicted score for one match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictionEntity {
    /// Roster identity of the predictor.
    pub participant_id: String,
    /// Match the prediction applies to.
    pub match_id: u32,
    /// Predicted home goals.
    pub home_score: u32,
    /// Predicted away goals.
    pub away_score: u32,
}

/// One giver -> receiver edge of the gift exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PairingEntity {
    /// Participant giving the gift.
    pub giver_id: String,
    /// Participant receiving the gift.
    pub receiver_id: String,
}

/// The complete pairing set of one draw, stored and replaced as a single unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawEntity {
    /// Identifier of the draw epoch.
    pub id: Uuid,
    /// When the draw was performed.
    pub drawn_at: SystemTime,
    /// Every pairing produced by the draw.
    pub pairings: Vec<PairingEntity>,
}

/// Kinds of records that emit change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Match records.
    Match,
    /// Prediction records.
    Prediction,
    /// Gift-exchange draw.
    Draw,
}

/// Change notification emitted by a fixture store after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A match record was written.
    MatchUpdated {
        /// Value before the write.
        old: Option<MatchEntity>,
        /// Value after the write.
        new: MatchEntity,
    },
    /// A prediction was inserted or overwritten.
    PredictionUpserted {
        /// Value before the write.
        old: Option<PredictionEntity>,
        /// Value after the write.
        new: PredictionEntity,
    },
    /// The draw was replaced wholesale (`new` is `None` once cleared).
    DrawReplaced {
        /// Draw before the write.
        old: Option<DrawEntity>,
        /// Draw after the write.
        new: Option<DrawEntity>,
    },
}

impl ChangeEvent {
    /// Kind of record carried by the event.
    pub fn kind(&self) -> EntityKind {
        match self {
            ChangeEvent::MatchUpdated { .. } => EntityKind::Match,
            ChangeEvent::PredictionUpserted { .. } => EntityKind::Prediction,
            ChangeEvent::DrawReplaced { .. } => EntityKind::Draw,
        }
    }
}

/// Selects which change events a subscriber receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventFilter {
    matches: bool,
    predictions: bool,
    draws: bool,
}

impl EventFilter {
    /// Receive every kind of change.
    pub fn all() -> Self {
        Self {
            matches: true,
            predictions: true,
            draws: true,
        }
    }

    /// Receive a single kind of change.
    pub fn only(kind: EntityKind) -> Self {
        Self {
            matches: kind == EntityKind::Match,
            predictions: kind == EntityKind::Prediction,
            draws: kind == EntityKind::Draw,
        }
    }

    /// Whether the filter lets the event through.
    pub fn accepts(&self, event: &ChangeEvent) -> bool {
        match event.kind() {
            EntityKind::Match => self.matches,
            EntityKind::Prediction => self.predictions,
            EntityKind::Draw => self.draws,
        }
    }
}
