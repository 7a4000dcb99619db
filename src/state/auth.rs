//! Caller roles resolved from request credentials.

use super::fixtures::ParticipantId;
use crate::error::ServiceError;

/// Proof that the caller presented the commissioner secret.
///
/// Only [`CommissionerGrant::verify`] can produce one, so any function taking a
/// grant is unreachable for participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionerGrant {
    _private: (),
}

impl CommissionerGrant {
    /// Check a presented token against the configured secret.
    ///
    /// Without a configured secret no grant is ever issued.
    pub fn verify(configured: Option<&str>, presented: &str) -> Option<Self> {
        match configured {
            Some(secret) if !secret.is_empty() && secret == presented => {
                Some(Self { _private: () })
            }
            _ => None,
        }
    }
}

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// A roster member acting on their own behalf.
    Participant(ParticipantId),
    /// The operator allowed to finalize matches and run the draw.
    Commissioner(CommissionerGrant),
}

impl Role {
    /// Participant identity, if the caller is one.
    pub fn participant_id(&self) -> Option<&str> {
        match self {
            Role::Participant(id) => Some(id),
            Role::Commissioner(_) => None,
        }
    }

    /// Commissioner grant, if the caller holds one.
    pub fn commissioner(&self) -> Option<CommissionerGrant> {
        match self {
            Role::Commissioner(grant) => Some(*grant),
            Role::Participant(_) => None,
        }
    }

    /// Grant for commissioner-only operations; participants are refused.
    pub fn require_commissioner(&self) -> Result<CommissionerGrant, ServiceError> {
        self.commissioner()
            .ok_or_else(|| ServiceError::Unauthorized("commissioner role required".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_requires_matching_secret() {
        assert!(CommissionerGrant::verify(Some("s3cret"), "s3cret").is_some());
        assert!(CommissionerGrant::verify(Some("s3cret"), "S3CRET").is_none());
        assert!(CommissionerGrant::verify(None, "").is_none());
        assert!(CommissionerGrant::verify(Some(""), "").is_none());
    }

    #[test]
    fn participant_role_has_no_grant() {
        let role = Role::Participant("p1".into());
        assert_eq!(role.commissioner(), None);
        assert_eq!(role.participant_id(), Some("p1"));
        assert!(matches!(
            role.require_commissioner(),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn commissioner_role_yields_its_grant() {
        let grant = CommissionerGrant::verify(Some("s3cret"), "s3cret").unwrap();
        let role = Role::Commissioner(grant);
        assert_eq!(role.require_commissioner().unwrap(), grant);
        assert_eq!(role.participant_id(), None);
    }
}
