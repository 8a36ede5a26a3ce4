use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Resolution status of a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum KeyStatus {
    /// Key is still receiving records. Never written to the status table.
    Unvalidated,
    /// At least one live user id carries a self-certification.
    Valid,
    /// Valid and certified by at least one interesting key.
    Certified,
    /// The dump flags the key as expired.
    Expired,
    /// Revoked by its owner.
    RevokedByOwner,
    /// Revoked by a designated third-party revoker.
    RevokedByDesignatedRevoker,
    /// No live user id carries a self-certification.
    Invalid,
}

impl KeyStatus {
    /// Whether no further transition is possible.
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Unvalidated | Self::Valid)
    }

    /// Whether the key counts as valid in reports (`V` or `VC`).
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid | Self::Certified)
    }

    /// Code written to the key-status table.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unvalidated => "?",
            Self::Valid => "V",
            Self::Certified => "VC",
            Self::Expired => "E",
            Self::RevokedByOwner => "Ro",
            Self::RevokedByDesignatedRevoker => "Rd",
            Self::Invalid => "I",
        }
    }
}

impl FromStr for KeyStatus {
    type Err = CoreError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code {
            "V" => Ok(Self::Valid),
            "VC" => Ok(Self::Certified),
            "E" => Ok(Self::Expired),
            "Ro" => Ok(Self::RevokedByOwner),
            "Rd" => Ok(Self::RevokedByDesignatedRevoker),
            "I" => Ok(Self::Invalid),
            other => Err(CoreError::InvalidStatusCode(other.to_string())),
        }
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unvalidated => write!(f, "Unvalidated"),
            Self::Valid => write!(f, "Valid"),
            Self::Certified => write!(f, "Certified"),
            Self::Expired => write!(f, "Expired"),
            Self::RevokedByOwner => write!(f, "RevokedByOwner"),
            Self::RevokedByDesignatedRevoker => write!(f, "RevokedByDesignatedRevoker"),
            Self::Invalid => write!(f, "Invalid"),
        }
    }
}

/// Facts that resolve a key's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatusEvent {
    /// Commit found a most recent self-certification.
    SelfCertified,
    /// Commit found no self-certification on any live user id.
    NoSelfCertification,
    /// The dump flags the key as expired.
    FlaggedExpired,
    /// Key revocation issued by the key itself, or the dump's revoked flag.
    RevokedByOwner,
    /// Key revocation issued by another key.
    RevokedByDesignatedRevoker,
    /// Refinement found a certification from an interesting key.
    CertifiedByInterestingKey,
}

/// Key status transitions.
///
/// Valid transitions:
/// - Unvalidated → Valid (SelfCertified)
/// - Unvalidated → Invalid (NoSelfCertification)
/// - Unvalidated → Expired (FlaggedExpired)
/// - Unvalidated → RevokedByOwner (RevokedByOwner)
/// - Unvalidated → RevokedByDesignatedRevoker (RevokedByDesignatedRevoker)
/// - Valid → Certified (CertifiedByInterestingKey)
pub struct KeyStatusMachine;

impl KeyStatusMachine {
    /// Attempt a transition. Returns the new status or an error for
    /// transitions the resolution rules never take.
    pub fn transition(current: KeyStatus, event: KeyStatusEvent) -> Result<KeyStatus, CoreError> {
        let next = match (current, event) {
            (KeyStatus::Unvalidated, KeyStatusEvent::SelfCertified) => KeyStatus::Valid,
            (KeyStatus::Unvalidated, KeyStatusEvent::NoSelfCertification) => KeyStatus::Invalid,
            (KeyStatus::Unvalidated, KeyStatusEvent::FlaggedExpired) => KeyStatus::Expired,
            (KeyStatus::Unvalidated, KeyStatusEvent::RevokedByOwner) => KeyStatus::RevokedByOwner,
            (KeyStatus::Unvalidated, KeyStatusEvent::RevokedByDesignatedRevoker) => {
                KeyStatus::RevokedByDesignatedRevoker
            }
            (KeyStatus::Valid, KeyStatusEvent::CertifiedByInterestingKey) => KeyStatus::Certified,
            _ => {
                return Err(CoreError::InvalidStatusTransition {
                    from: current,
                    to: Self::target(event),
                });
            }
        };

        tracing::trace!(from = %current, to = %next, event = ?event, "key status transition");

        Ok(next)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: KeyStatus, event: KeyStatusEvent) -> bool {
        Self::transition(current, event).is_ok()
    }

    fn target(event: KeyStatusEvent) -> KeyStatus {
        match event {
            KeyStatusEvent::SelfCertified => KeyStatus::Valid,
            KeyStatusEvent::NoSelfCertification => KeyStatus::Invalid,
            KeyStatusEvent::FlaggedExpired => KeyStatus::Expired,
            KeyStatusEvent::RevokedByOwner => KeyStatus::RevokedByOwner,
            KeyStatusEvent::RevokedByDesignatedRevoker => KeyStatus::RevokedByDesignatedRevoker,
            KeyStatusEvent::CertifiedByInterestingKey => KeyStatus::Certified,
        }
    }
}
