//! Gift-exchange draw: a single random cycle over the roster.

use std::{collections::HashSet, time::SystemTime};

use indexmap::IndexMap;
use rand::{Rng, seq::SliceRandom};
use thiserror::Error;
use uuid::Uuid;

use super::{fixtures::ParticipantId, roster::Roster};
use crate::dao::models::{DrawEntity, PairingEntity};

/// Rejected draw requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    /// Fewer than two participants cannot form a cycle without a self-pairing.
    #[error("a draw needs at least 2 participants, got {count}")]
    NotEnoughParticipants {
        /// Roster size at the time of the draw.
        count: usize,
    },
    /// The same participant was listed twice.
    #[error("participant `{id}` appears more than once")]
    DuplicateParticipant {
        /// Repeated id.
        id: ParticipantId,
    },
}

/// Shuffle `participants` and link each one to the next, wrapping around.
///
/// The result is one directed cycle of length `n` in giver order, so nobody
/// draws themself.
pub fn draw_assignments<R>(
    participants: &[ParticipantId],
    rng: &mut R,
) -> Result<Vec<(ParticipantId, ParticipantId)>, DrawError>
where
    R: Rng + ?Sized,
{
    let mut seen = HashSet::with_capacity(participants.len());
    for id in participants {
        if !seen.insert(id) {
            return Err(DrawError::DuplicateParticipant { id: id.clone() });
        }
    }
    if participants.len() < 2 {
        return Err(DrawError::NotEnoughParticipants {
            count: participants.len(),
        });
    }

    let mut order = participants.to_vec();
    order.shuffle(rng);

    let n = order.len();
    Ok((0..n)
        .map(|i| (order[i].clone(), order[(i + 1) % n].clone()))
        .collect())
}

/// Draw for every member of `roster`.
pub fn draw_roster<R>(roster: &Roster, rng: &mut R) -> Result<Draw, DrawError>
where
    R: Rng + ?Sized,
{
    let ids: Vec<ParticipantId> = roster.ids().cloned().collect();
    let pairs = draw_assignments(&ids, rng)?;
    Ok(Draw {
        id: Uuid::new_v4(),
        drawn_at: SystemTime::now(),
        pairings: pairs.into_iter().collect(),
    })
}

/// A complete pairing set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    /// Draw epoch.
    pub id: Uuid,
    /// When the draw was made.
    pub drawn_at: SystemTime,
    /// Giver to receiver, in draw order.
    pub pairings: IndexMap<ParticipantId, ParticipantId>,
}

impl Draw {
    /// Receiver assigned to `giver`.
    pub fn receiver_for(&self, giver: &str) -> Option<&ParticipantId> {
        self.pairings.get(giver)
    }

    /// Whether the pairings form exactly one cycle through every giver.
    pub fn is_single_cycle(&self) -> bool {
        is_single_cycle(&self.pairings)
    }
}

/// Check that following giver -> receiver links from any start visits every
/// giver exactly once and returns to the start.
pub fn is_single_cycle(pairings: &IndexMap<ParticipantId, ParticipantId>) -> bool {
    let n = pairings.len();
    if n < 2 {
        return false;
    }
    let receivers: HashSet<&ParticipantId> = pairings.values().collect();
    if receivers.len() != n || pairings.iter().any(|(giver, receiver)| giver == receiver) {
        return false;
    }
    let Some(start) = pairings.keys().next() else {
        return false;
    };
    let mut current = start;
    for step in 1..=n {
        let Some(next) = pairings.get(current) else {
            return false;
        };
        if next == start {
            return step == n;
        }
        current = next;
    }
    false
}

impl From<DrawEntity> for Draw {
    fn from(value: DrawEntity) -> Self {
        Self {
            id: value.id,
            drawn_at: value.drawn_at,
            pairings: value
                .pairings
                .into_iter()
                .map(|pairing| (pairing.giver_id, pairing.receiver_id))
                .collect(),
        }
    }
}

impl From<Draw> for DrawEntity {
    fn from(value: Draw) -> Self {
        Self {
            id: value.id,
            drawn_at: value.drawn_at,
            pairings: value
                .pairings
                .into_iter()
                .map(|(giver_id, receiver_id)| PairingEntity {
                    giver_id,
                    receiver_id,
                })
                .collect(),
        }
    }
}
