//! Prediction scoring and leaderboard computation.

use std::collections::HashMap;

use super::{
    fixtures::{Match, MatchId, ParticipantId, Prediction, Score},
    roster::Roster,
};

/// Points for predicting the exact final score.
pub const EXACT_POINTS: u32 = 3;
/// Points for predicting the right outcome with a wrong score.
pub const OUTCOME_POINTS: u32 = 1;

/// How a single prediction compared against a final result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Exact score.
    Exact,
    /// Same winner, or both draws.
    Outcome,
    /// Neither.
    Miss,
}

impl Verdict {
    /// Points awarded for the verdict.
    pub fn points(self) -> u32 {
        match self {
            Verdict::Exact => EXACT_POINTS,
            Verdict::Outcome => OUTCOME_POINTS,
            Verdict::Miss => 0,
        }
    }
}

/// Compare a prediction against a final score.
pub fn judge(predicted: Score, actual: Score) -> Verdict {
    if predicted == actual {
        Verdict::Exact
    } else if predicted.outcome() == actual.outcome() {
        Verdict::Outcome
    } else {
        Verdict::Miss
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// Ranked participant.
    pub participant_id: ParticipantId,
    /// Total points.
    pub points: u32,
    /// Number of exact-score hits.
    pub exact_count: u32,
}

/// Rank every roster member against the finished matches.
///
/// Each participant appears exactly once, with zero rows for those who have
/// not scored. Predictions from unknown participants or for matches that are
/// not finished are ignored. Ties on points and exact hits keep roster order.
pub fn compute_leaderboard<'a>(
    roster: &Roster,
    predictions: impl IntoIterator<Item = &'a Prediction>,
    matches: impl IntoIterator<Item = &'a Match>,
) -> Vec<Standing> {
    let results: HashMap<MatchId, Score> = matches
        .into_iter()
        .filter_map(|m| m.final_score().map(|score| (m.id, score)))
        .collect();

    let mut tally: HashMap<&str, (u32, u32)> = HashMap::new();
    for prediction in predictions {
        let participant = prediction.key.participant_id.as_str();
        if !roster.contains(participant) {
            continue;
        }
        let Some(actual) = results.get(&prediction.key.match_id) else {
            continue;
        };
        let verdict = judge(prediction.score, *actual);
        let entry = tally.entry(participant).or_default();
        entry.0 += verdict.points();
        if verdict == Verdict::Exact {
            entry.1 += 1;
        }
    }

    let mut standings: Vec<Standing> = roster
        .ids()
        .map(|id| {
            let (points, exact_count) = tally.get(id.as_str()).copied().unwrap_or_default();
            Standing {
                participant_id: id.clone(),
                points,
                exact_count,
            }
        })
        .collect();

    // `sort_by` is stable, so equal rows stay in roster order.
    standings.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.exact_count.cmp(&a.exact_count))
    });
    standings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        fixtures::{MatchStatus, PredictionKey},
        roster::Participant,
    };

    fn roster(ids: &[&str]) -> Roster {
        Roster::new(
            ids.iter()
                .map(|id| Participant::new(*id, id.to_uppercase(), "⚽", "code")),
        )
    }

    fn finished(id: MatchId, home: u32, away: u32) -> Match {
        Match {
            id,
            home: "A".into(),
            away: "B".into(),
            date: String::new(),
            time: String::new(),
            stadium: String::new(),
            status: MatchStatus::Finished,
            result: Some(Score::new(home, away)),
        }
    }

    fn predict(participant: &str, match_id: MatchId, home: u32, away: u32) -> Prediction {
        Prediction {
            key: PredictionKey::new(participant, match_id),
            score: Score::new(home, away),
        }
    }

    fn row(standings: &[Standing], id: &str) -> (u32, u32) {
        let standing = standings
            .iter()
            .find(|s| s.participant_id == id)
            .unwrap();
        (standing.points, standing.exact_count)
    }

    #[test]
    fn verdicts_follow_outcome_classes() {
        let actual = Score::new(2, 1);
        assert_eq!(judge(Score::new(2, 1), actual), Verdict::Exact);
        assert_eq!(judge(Score::new(3, 0), actual), Verdict::Outcome);
        assert_eq!(judge(Score::new(1, 1), actual), Verdict::Miss);
        assert_eq!(judge(Score::new(0, 0), Score::new(3, 3)), Verdict::Outcome);
        assert_eq!(judge(Score::new(0, 2), actual), Verdict::Miss);
    }

    #[test]
    fn exact_and_outcome_points_accumulate() {
        let roster = roster(&["p1", "p2", "p3"]);
        let matches = vec![finished(1, 2, 1)];
        let predictions = vec![
            predict("p1", 1, 2, 1),
            predict("p2", 1, 1, 0),
            predict("p3", 1, 0, 0),
        ];

        let standings = compute_leaderboard(&roster, &predictions, &matches);

        assert_eq!(row(&standings, "p1"), (3, 1));
        assert_eq!(row(&standings, "p2"), (1, 0));
        assert_eq!(row(&standings, "p3"), (0, 0));
        let order: Vec<&str> = standings.iter().map(|s| s.participant_id.as_str()).collect();
        assert_eq!(order, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn unfinished_and_resultless_matches_score_nothing() {
        let roster = roster(&["p1"]);
        let mut live = finished(1, 1, 0);
        live.status = MatchStatus::Live;
        let mut upcoming = finished(3, 2, 2);
        upcoming.status = MatchStatus::Upcoming;
        let mut resultless = finished(2, 0, 0);
        resultless.result = None;
        let matches = vec![live, resultless, upcoming];
        let predictions = vec![
            predict("p1", 1, 1, 0),
            predict("p1", 2, 0, 0),
            predict("p1", 3, 2, 2),
        ];

        let standings = compute_leaderboard(&roster, &predictions, &matches);

        assert_eq!(row(&standings, "p1"), (0, 0));
    }

    #[test]
    fn exact_count_breaks_points_ties() {
        let roster = roster(&["p1", "p2"]);
        let matches = vec![finished(1, 1, 0), finished(2, 2, 2), finished(3, 0, 1)];
        // p1: three outcome hits = 3 points, 0 exact.
        // p2: one exact hit = 3 points, 1 exact.
        let predictions = vec![
            predict("p1", 1, 2, 0),
            predict("p1", 2, 1, 1),
            predict("p1", 3, 0, 2),
            predict("p2", 1, 1, 0),
        ];

        let standings = compute_leaderboard(&roster, &predictions, &matches);

        assert_eq!(standings[0].participant_id, "p2");
        assert_eq!(standings[1].participant_id, "p1");
        assert_eq!(standings[0].points, standings[1].points);
    }

    #[test]
    fn full_ties_keep_roster_order() {
        let roster = roster(&["p3", "p1", "p2"]);
        let standings = compute_leaderboard(&roster, &Vec::<Prediction>::new(), &Vec::<Match>::new());
        let order: Vec<&str> = standings.iter().map(|s| s.participant_id.as_str()).collect();
        assert_eq!(order, vec!["p3", "p1", "p2"]);
    }

    #[test]
    fn strangers_are_ignored() {
        let roster = roster(&["p1"]);
        let matches = vec![finished(1, 1, 0)];
        let predictions = vec![predict("ghost", 1, 1, 0)];

        let standings = compute_leaderboard(&roster, &predictions, &matches);

        assert_eq!(standings.len(), 1);
        assert_eq!(row(&standings, "p1"), (0, 0));
    }

    #[test]
    fn recomputation_is_deterministic() {
        let roster = roster(&["p1", "p2"]);
        let matches = vec![finished(1, 3, 1), finished(2, 0, 0)];
        let predictions = vec![
            predict("p2", 1, 3, 1),
            predict("p1", 2, 0, 0),
            predict("p1", 1, 2, 0),
        ];

        let first = compute_leaderboard(&roster, &predictions, &matches);
        let reversed: Vec<Prediction> = predictions.iter().rev().cloned().collect();
        let second = compute_leaderboard(&roster, &reversed, &matches);

        assert_eq!(first, second);
    }
}
