//! Domain model for matches, predictions and finalized scores.

use std::cmp::Ordering;

use thiserror::Error;

use crate::dao::models::{MatchEntity, MatchPatch, MatchStatusEntity, PredictionEntity};

/// Numeric match identifier.
pub type MatchId = u32;
/// Stable roster identity of a participant.
pub type ParticipantId = String;

/// A (home, away) goal pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Score {
    /// Home goals.
    pub home: u32,
    /// Away goals.
    pub away: u32,
}

/// Rejected score input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    /// One side of the score was below zero.
    #[error("scores must be non-negative (got {home}-{away})")]
    Negative {
        /// Submitted home value.
        home: i64,
        /// Submitted away value.
        away: i64,
    },
    /// One side did not fit the supported range.
    #[error("score {value} is out of range")]
    OutOfRange {
        /// Offending value.
        value: i64,
    },
}

impl Score {
    /// Build a score from already validated goal counts.
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    /// Build a score from untrusted signed input.
    pub fn try_from_signed(home: i64, away: i64) -> Result<Self, ScoreError> {
        if home < 0 || away < 0 {
            return Err(ScoreError::Negative { home, away });
        }
        let home = u32::try_from(home).map_err(|_| ScoreError::OutOfRange { value: home })?;
        let away = u32::try_from(away).map_err(|_| ScoreError::OutOfRange { value: away })?;
        Ok(Self { home, away })
    }

    /// Outcome class: `Greater` for a home win, `Equal` for a draw, `Less` for an away win.
    pub fn outcome(&self) -> Ordering {
        self.home.cmp(&self.away)
    }
}

/// Match lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    /// Not started.
    Upcoming,
    /// In play.
    Live,
    /// Result recorded.
    Finished,
}

impl From<MatchStatusEntity> for MatchStatus {
    fn from(value: MatchStatusEntity) -> Self {
        match value {
            MatchStatusEntity::Upcoming => MatchStatus::Upcoming,
            MatchStatusEntity::Live => MatchStatus::Live,
            MatchStatusEntity::Finished => MatchStatus::Finished,
        }
    }
}

impl From<MatchStatus> for MatchStatusEntity {
    fn from(value: MatchStatus) -> Self {
        match value {
            MatchStatus::Upcoming => MatchStatusEntity::Upcoming,
            MatchStatus::Live => MatchStatusEntity::Live,
            MatchStatus::Finished => MatchStatusEntity::Finished,
        }
    }
}

/// A scheduled tournament match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Stable identifier.
    pub id: MatchId,
    /// Home team.
    pub home: String,
    /// Away team.
    pub away: String,
    /// Date label.
    pub date: String,
    /// Kick-off label.
    pub time: String,
    /// Venue label.
    pub stadium: String,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// Finalized result. Only ever kept for finished matches.
    pub result: Option<Score>,
}

impl Match {
    /// The result to score against, if the match is finished and carries one.
    ///
    /// A finished match with a missing result is not comparable and yields `None`.
    pub fn final_score(&self) -> Option<Score> {
        match self.status {
            MatchStatus::Finished => self.result,
            _ => None,
        }
    }

    /// Whether the match has been finalized.
    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    /// Apply a finalization in place, overwriting any previous result.
    pub fn finalize(&mut self, score: Score) {
        self.status = MatchStatus::Finished;
        self.result = Some(score);
    }
}

impl From<MatchEntity> for Match {
    fn from(value: MatchEntity) -> Self {
        let status = MatchStatus::from(value.status);
        // A half-present pair or a result on a non-finished match is dropped.
        let result = match (status, value.result_home, value.result_away) {
            (MatchStatus::Finished, Some(home), Some(away)) => Some(Score { home, away }),
            _ => None,
        };
        Self {
            id: value.id,
            home: value.home,
            away: value.away,
            date: value.date,
            time: value.time,
            stadium: value.stadium,
            status,
            result,
        }
    }
}

/// Key of a prediction: one per participant and match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PredictionKey {
    /// Predictor.
    pub participant_id: ParticipantId,
    /// Predicted match.
    pub match_id: MatchId,
}

impl PredictionKey {
    /// Build a key from its two parts.
    pub fn new(participant_id: impl Into<ParticipantId>, match_id: MatchId) -> Self {
        Self {
            participant_id: participant_id.into(),
            match_id,
        }
    }
}

/// A participant's predicted score for a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    /// Who predicted which match.
    pub key: PredictionKey,
    /// Predicted score.
    pub score: Score,
}

impl From<PredictionEntity> for Prediction {
    fn from(value: PredictionEntity) -> Self {
        Self {
            key: PredictionKey::new(value.participant_id, value.match_id),
            score: Score::new(value.home_score, value.away_score),
        }
    }
}

impl From<Prediction> for PredictionEntity {
    fn from(value: Prediction) -> Self {
        Self {
            participant_id: value.key.participant_id,
            match_id: value.key.match_id,
            home_score: value.score.home,
            away_score: value.score.away,
        }
    }
}

/// Store patch finalizing a match with `score`.
pub fn finalize_patch(score: Score) -> MatchPatch {
    MatchPatch::finalize(score.home, score.away)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(status: MatchStatusEntity, home: Option<u32>, away: Option<u32>) -> MatchEntity {
        MatchEntity {
            result_home: home,
            result_away: away,
            status,
            ..MatchEntity::upcoming(1, "Brazil", "Morocco", "13 Jun", "21:00", "New Jersey")
        }
    }

    #[test]
    fn negative_scores_are_rejected() {
        assert_eq!(
            Score::try_from_signed(-1, 2),
            Err(ScoreError::Negative { home: -1, away: 2 })
        );
        assert!(Score::try_from_signed(0, i64::from(u32::MAX) + 1).is_err());
        assert_eq!(Score::try_from_signed(3, 0), Ok(Score::new(3, 0)));
    }

    #[test]
    fn outcome_classes_are_distinct() {
        assert_eq!(Score::new(2, 1).outcome(), Ordering::Greater);
        assert_eq!(Score::new(0, 0).outcome(), Ordering::Equal);
        assert_eq!(Score::new(0, 3).outcome(), Ordering::Less);
    }

    #[test]
    fn result_on_unfinished_match_is_dropped() {
        let live: Match = entity(MatchStatusEntity::Live, Some(1), Some(0)).into();
        assert_eq!(live.result, None);
        assert_eq!(live.final_score(), None);
    }

    #[test]
    fn finished_match_without_full_result_is_not_comparable() {
        let partial: Match = entity(MatchStatusEntity::Finished, Some(1), None).into();
        assert!(partial.is_finished());
        assert_eq!(partial.final_score(), None);
    }

    #[test]
    fn finished_match_exposes_result() {
        let done: Match = entity(MatchStatusEntity::Finished, Some(2), Some(2)).into();
        assert_eq!(done.final_score(), Some(Score::new(2, 2)));
    }
}
