use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{roster::Roster, scoring::Standing};

/// One ranked leaderboard row.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct StandingDto {
    /// 1-based position in the ordering.
    pub position: usize,
    pub participant_id: String,
    pub name: String,
    pub avatar: String,
    pub points: u32,
    pub exact_count: u32,
}

/// Leaderboard payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub standings: Vec<StandingDto>,
    /// True when served from the server cache because the store could not be read.
    pub stale: bool,
}

impl LeaderboardResponse {
    /// Decorate computed standings with roster display data.
    pub fn new(standings: &[Standing], roster: &Roster, stale: bool) -> Self {
        let standings = standings
            .iter()
            .enumerate()
            .map(|(index, standing)| {
                let (name, avatar) = roster
                    .get(&standing.participant_id)
                    .map(|p| (p.name.clone(), p.avatar.clone()))
                    .unwrap_or_default();
                StandingDto {
                    position: index + 1,
                    participant_id: standing.participant_id.clone(),
                    name,
                    avatar,
                    points: standing.points,
                    exact_count: standing.exact_count,
                }
            })
            .collect();
        Self { standings, stale }
    }
}
