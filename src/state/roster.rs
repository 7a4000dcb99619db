//! Fixed participant roster and access-code authentication.

use indexmap::IndexMap;

use super::fixtures::ParticipantId;

/// A roster member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Stable identity.
    pub id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Avatar glyph.
    pub avatar: String,
    access_code: String,
}

impl Participant {
    /// Create a participant; the access code is normalized to upper case.
    pub fn new(
        id: impl Into<ParticipantId>,
        name: impl Into<String>,
        avatar: impl Into<String>,
        access_code: &str,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: avatar.into(),
            access_code: normalize_code(access_code),
        }
    }

    /// Case-insensitive access-code comparison.
    pub fn accepts_code(&self, candidate: &str) -> bool {
        normalize_code(candidate) == self.access_code
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Ordered, duplicate-free set of participants.
///
/// Iteration order is the configured roster order, which is also the
/// leaderboard tie-break order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: IndexMap<ParticipantId, Participant>,
}

impl Roster {
    /// Build a roster, keeping the first entry when an id repeats.
    pub fn new(participants: impl IntoIterator<Item = Participant>) -> Self {
        let mut members = IndexMap::new();
        for participant in participants {
            members
                .entry(participant.id.clone())
                .or_insert(participant);
        }
        Self { members }
    }

    /// Lookup by id.
    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.members.get(id)
    }

    /// Whether `id` is a roster member.
    pub fn contains(&self, id: &str) -> bool {
        self.members.contains_key(id)
    }

    /// Participants in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.members.values()
    }

    /// Participant ids in roster order.
    pub fn ids(&self) -> impl Iterator<Item = &ParticipantId> {
        self.members.keys()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the roster has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Return the participant when `code` matches their access code.
    pub fn authenticate(&self, id: &str, code: &str) -> Option<&Participant> {
        self.get(id).filter(|participant| participant.accepts_code(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::new([
            Participant::new("p1", "Özmerç", "😼", "1hj8"),
            Participant::new("p2", "Eren", "🤡", "QW89"),
        ])
    }

    #[test]
    fn access_codes_ignore_case() {
        let roster = roster();
        assert!(roster.authenticate("p1", "1HJ8").is_some());
        assert!(roster.authenticate("p1", "1hj8").is_some());
        assert!(roster.authenticate("p2", "qw89").is_some());
    }

    #[test]
    fn wrong_code_or_unknown_id_is_rejected() {
        let roster = roster();
        assert!(roster.authenticate("p1", "QW89").is_none());
        assert!(roster.authenticate("p9", "1HJ8").is_none());
    }

    #[test]
    fn duplicate_ids_keep_first_entry_and_order() {
        let roster = Roster::new([
            Participant::new("p2", "Eren", "🤡", "a"),
            Participant::new("p1", "Özmerç", "😼", "b"),
            Participant::new("p2", "Impostor", "👻", "c"),
        ]);
        let names: Vec<&str> = roster.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Eren", "Özmerç"]);
    }
}
