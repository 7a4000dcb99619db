//! Wire types for matches and predictions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::state::fixtures::{Match, MatchStatus, Prediction, Score};

/// Highest goal count accepted for a single side.
const MAX_GOALS: i64 = 99;

/// Match lifecycle status as exposed over HTTP.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatusDto {
    Upcoming,
    Live,
    Finished,
}

impl From<MatchStatus> for MatchStatusDto {
    fn from(value: MatchStatus) -> Self {
        match value {
            MatchStatus::Upcoming => MatchStatusDto::Upcoming,
            MatchStatus::Live => MatchStatusDto::Live,
            MatchStatus::Finished => MatchStatusDto::Finished,
        }
    }
}

/// A (home, away) goal pair.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
pub struct ScoreDto {
    pub home: u32,
    pub away: u32,
}

impl From<Score> for ScoreDto {
    fn from(value: Score) -> Self {
        Self {
            home: value.home,
            away: value.away,
        }
    }
}

/// Match view model.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchSummary {
    pub id: u32,
    pub home: String,
    pub away: String,
    pub date: String,
    pub time: String,
    pub stadium: String,
    pub status: MatchStatusDto,
    /// Finalized score, present only once the match is finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ScoreDto>,
}

impl From<&Match> for MatchSummary {
    fn from(value: &Match) -> Self {
        Self {
            id: value.id,
            home: value.home.clone(),
            away: value.away.clone(),
            date: value.date.clone(),
            time: value.time.clone(),
            stadium: value.stadium.clone(),
            status: value.status.into(),
            result: value.final_score().map(Into::into),
        }
    }
}

/// Score submitted by a participant or the commissioner.
///
/// Goals are signed on the wire so negative input is answered with a 400
/// rather than a deserialization failure.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema, Validate)]
pub struct ScoreInput {
    #[validate(range(min = 0, max = MAX_GOALS))]
    pub home: i64,
    #[validate(range(min = 0, max = MAX_GOALS))]
    pub away: i64,
}

/// Stored prediction as exposed over HTTP.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PredictionSummary {
    pub participant_id: String,
    pub match_id: u32,
    pub home: u32,
    pub away: u32,
}

impl From<&Prediction> for PredictionSummary {
    fn from(value: &Prediction) -> Self {
        Self {
            participant_id: value.key.participant_id.clone(),
            match_id: value.key.match_id,
            home: value.score.home,
            away: value.score.away,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_goals_fail_validation() {
        let input = ScoreInput { home: -1, away: 0 };
        assert!(input.validate().is_err());
        let input = ScoreInput { home: 2, away: 1 };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn absurd_goal_counts_fail_validation() {
        let input = ScoreInput { home: 0, away: 100 };
        assert!(input.validate().is_err());
    }
}
