//! In-memory trust model: keys, their user ids, certifications and
//! revocations, plus the commit-time resolution rules.

use std::collections::BTreeMap;

use wot_core::{
    CertificationLevel, HashAlgorithm, KeyId, KeyStatus, KeyStatusEvent, KeyStatusMachine,
    PublicKeyAlgorithm, ResolverConfig, RevocationKind,
};

use crate::corpus::{CorpusEntry, EdgeBlock};
use crate::error::ResolveError;
use crate::records::{PubRecord, RevRecord, SigRecord};
use crate::status_table::StatusLine;

/// A certification of a user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certification {
    pub issuer: KeyId,
    pub date: String,
    pub expires: String,
    /// Raw flag letters from the dump.
    pub flags: String,
    pub level: CertificationLevel,
    pub pk_algorithm: PublicKeyAlgorithm,
    pub hash_algorithm: HashAlgorithm,
    pub version: u8,
    /// The dump flags this certification as expired.
    pub expired: bool,
    /// Revoked by a later revocation from the same issuer.
    pub revoked: bool,
}

impl Certification {
    /// Whether the exclusion policy keeps this certification out of
    /// retention.
    pub fn is_excluded(&self, config: &ResolverConfig) -> bool {
        (config.exclude_revoked_certifications && self.revoked)
            || (config.exclude_expired_certifications && self.expired)
            || config.is_deprecated(self.hash_algorithm)
    }

    pub fn to_corpus_entry(&self) -> CorpusEntry {
        CorpusEntry {
            issuer: self.issuer.clone(),
            date: self.date.clone(),
            expires: self.expires.clone(),
            flags: self.flags.clone(),
            level: self.level,
            pk_algorithm: self.pk_algorithm,
            hash_algorithm: self.hash_algorithm,
            version: self.version,
        }
    }
}

impl From<SigRecord> for Certification {
    fn from(sig: SigRecord) -> Self {
        let expired = sig.flags.contains('e');
        Self {
            issuer: sig.issuer,
            date: sig.date,
            expires: sig.expires,
            flags: sig.flags,
            level: sig.level,
            pk_algorithm: sig.pk_algorithm,
            hash_algorithm: sig.hash_algorithm,
            version: sig.version,
            expired,
            revoked: false,
        }
    }
}

/// A revocation signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revocation {
    pub issuer: KeyId,
    pub date: String,
    pub kind: RevocationKind,
    pub version: u8,
    pub pk_algorithm: PublicKeyAlgorithm,
    pub hash_algorithm: HashAlgorithm,
}

impl From<RevRecord> for Revocation {
    fn from(rev: RevRecord) -> Self {
        Self {
            issuer: rev.issuer,
            date: rev.date,
            kind: rev.kind,
            version: rev.version,
            pk_algorithm: rev.pk_algorithm,
            hash_algorithm: rev.hash_algorithm,
        }
    }
}

/// Whether a candidate dated `candidate` replaces the record dated
/// `current`. Equal dates keep the earlier record.
fn is_newer(current: Option<&str>, candidate: &str) -> bool {
    current.map_or(true, |date| date < candidate)
}

/// A user id bound to a key.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    /// Revoked by its owner.
    pub revoked: bool,
    certifications: BTreeMap<KeyId, Certification>,
    revocations: BTreeMap<KeyId, Revocation>,
    self_certification: Option<Certification>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            revoked: false,
            certifications: BTreeMap::new(),
            revocations: BTreeMap::new(),
            self_certification: None,
        }
    }

    /// Retain `cert` if it is the latest non-excluded candidate from its
    /// issuer.
    pub fn add_certification(&mut self, owner: &KeyId, cert: Certification, config: &ResolverConfig) {
        if cert.is_excluded(config) {
            return;
        }
        if &cert.issuer == owner {
            let current = self.self_certification.as_ref().map(|c| c.date.as_str());
            if is_newer(current, &cert.date) {
                self.self_certification = Some(cert);
            }
        } else {
            let current = self.certifications.get(&cert.issuer).map(|c| c.date.as_str());
            if is_newer(current, &cert.date) {
                self.certifications.insert(cert.issuer.clone(), cert);
            }
        }
    }

    /// Record a certification revocation. A self-issued one revokes the
    /// user id; third-party ones are retained per issuer, latest first.
    pub fn add_revocation(&mut self, owner: &KeyId, rev: Revocation) {
        if &rev.issuer == owner {
            self.revoked = true;
        } else {
            let current = self.revocations.get(&rev.issuer).map(|r| r.date.as_str());
            if is_newer(current, &rev.date) {
                self.revocations.insert(rev.issuer.clone(), rev);
            }
        }
    }

    /// Flag every retained certification that predates a retained
    /// revocation from the same issuer.
    pub fn commit(&mut self) {
        for (issuer, rev) in &self.revocations {
            if let Some(cert) = self.certifications.get_mut(issuer) {
                if cert.date < rev.date {
                    cert.revoked = true;
                }
            }
        }
    }

    pub fn certifications(&self) -> impl Iterator<Item = &Certification> {
        self.certifications.values()
    }

    pub fn certification_from(&self, issuer: &KeyId) -> Option<&Certification> {
        self.certifications.get(issuer)
    }

    pub fn revocation_from(&self, issuer: &KeyId) -> Option<&Revocation> {
        self.revocations.get(issuer)
    }

    pub fn self_certification(&self) -> Option<&Certification> {
        self.self_certification.as_ref()
    }

    /// Not revoked and self-certified.
    pub fn is_live(&self) -> bool {
        !self.revoked && self.self_certification.is_some()
    }
}

/// Who revoked a key, from a key-revocation record.
#[derive(Debug, Clone, PartialEq, Eq)]
struct KeyRevocation {
    issuer: KeyId,
    by_owner: bool,
}

/// A public key receiving records from the dump.
#[derive(Debug, Clone)]
pub struct Key {
    pub key_id: KeyId,
    pub bit_length: u32,
    pub pk_algorithm: PublicKeyAlgorithm,
    pub created: String,
    pub expires: String,
    pub version: u8,
    flagged_revoked: bool,
    flagged_expired: bool,
    identities: Vec<Identity>,
    key_revocation: Option<KeyRevocation>,
}

impl From<PubRecord> for Key {
    fn from(record: PubRecord) -> Self {
        Self {
            flagged_revoked: record.is_flagged_revoked(),
            flagged_expired: record.is_flagged_expired(),
            key_id: record.key_id,
            bit_length: record.bit_length,
            pk_algorithm: record.pk_algorithm,
            created: record.created,
            expires: record.expires,
            version: record.version,
            identities: Vec::new(),
            key_revocation: None,
        }
    }
}

impl Key {
    pub fn add_identity(&mut self, identity: Identity) {
        self.identities.push(identity);
    }

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    pub fn has_identity(&self) -> bool {
        !self.identities.is_empty()
    }

    /// Attach a certification to the most recent user id.
    pub fn add_certification(
        &mut self,
        line: usize,
        cert: Certification,
        config: &ResolverConfig,
    ) -> Result<(), ResolveError> {
        let owner = &self.key_id;
        let identity = self.identities.last_mut().ok_or_else(|| {
            ResolveError::structural(line, format!("sig on key {} before any uid", owner))
        })?;
        identity.add_certification(owner, cert, config);
        Ok(())
    }

    /// Apply a revocation to the key or to the most recent user id.
    /// Subkey and unknown revocations are ignored.
    pub fn add_revocation(&mut self, line: usize, rev: Revocation) -> Result<(), ResolveError> {
        if self.identities.is_empty() {
            return Err(ResolveError::structural(
                line,
                format!("rev on key {} before any uid", self.key_id),
            ));
        }
        match rev.kind {
            RevocationKind::KeyRevocation => {
                self.key_revocation = Some(KeyRevocation {
                    by_owner: rev.issuer == self.key_id,
                    issuer: rev.issuer,
                });
            }
            RevocationKind::CertificationRevocation => {
                let owner = &self.key_id;
                if let Some(identity) = self.identities.last_mut() {
                    identity.add_revocation(owner, rev);
                }
            }
            RevocationKind::SubkeyRevocation | RevocationKind::Unknown(_) => {}
        }
        Ok(())
    }

    /// Finalize the key: resolve every user id, fold their certifications
    /// into one per issuer, and settle the status.
    pub fn commit(mut self, config: &ResolverConfig) -> CommittedKey {
        let mut valid_identities = 0;
        let mut self_certification: Option<Certification> = None;
        let mut certifications: BTreeMap<KeyId, Certification> = BTreeMap::new();

        for identity in &mut self.identities {
            identity.commit();
            if !identity.is_live() {
                continue;
            }
            valid_identities += 1;

            let candidates = identity
                .self_certification
                .iter()
                .chain(identity.certifications.values());
            for cert in candidates {
                if cert.is_excluded(config) {
                    continue;
                }
                if cert.issuer == self.key_id {
                    let current = self_certification.as_ref().map(|c| c.date.as_str());
                    if is_newer(current, &cert.date) {
                        self_certification = Some(cert.clone());
                    }
                } else {
                    let current = certifications.get(&cert.issuer).map(|c| c.date.as_str());
                    if is_newer(current, &cert.date) {
                        certifications.insert(cert.issuer.clone(), cert.clone());
                    }
                }
            }
        }

        let event = match &self.key_revocation {
            Some(rev) if rev.by_owner => KeyStatusEvent::RevokedByOwner,
            Some(_) => KeyStatusEvent::RevokedByDesignatedRevoker,
            None if self.flagged_revoked => KeyStatusEvent::RevokedByOwner,
            None if self.flagged_expired => KeyStatusEvent::FlaggedExpired,
            None if self_certification.is_some() => KeyStatusEvent::SelfCertified,
            None => KeyStatusEvent::NoSelfCertification,
        };
        // Every first-pass event is legal from Unvalidated.
        let status = KeyStatusMachine::transition(KeyStatus::Unvalidated, event)
            .unwrap_or(KeyStatus::Invalid);

        CommittedKey {
            key_id: self.key_id,
            status,
            bit_length: self.bit_length,
            pk_algorithm: self.pk_algorithm,
            created: self.created,
            expires: self.expires,
            version: self.version,
            valid_identities,
            revoker: self.key_revocation.map(|rev| rev.issuer),
            self_certification,
            certifications,
        }
    }
}

/// A key after its first-pass resolution.
#[derive(Debug, Clone)]
pub struct CommittedKey {
    pub key_id: KeyId,
    pub status: KeyStatus,
    pub bit_length: u32,
    pub pk_algorithm: PublicKeyAlgorithm,
    pub created: String,
    pub expires: String,
    pub version: u8,
    pub valid_identities: usize,
    pub revoker: Option<KeyId>,
    pub self_certification: Option<Certification>,
    /// One retained third-party certification per issuer.
    pub certifications: BTreeMap<KeyId, Certification>,
}

impl CommittedKey {
    /// Valid and holding at least one third-party certification.
    pub fn is_interesting(&self) -> bool {
        self.status == KeyStatus::Valid && !self.certifications.is_empty()
    }

    pub fn status_line(&self) -> StatusLine {
        StatusLine {
            status: self.status,
            key_id: self.key_id.clone(),
            pk_algorithm: self.pk_algorithm,
            bit_length: self.bit_length,
            created: self.created.clone(),
            expires: self.expires.clone(),
            version: self.version,
            valid_identities: self.valid_identities,
        }
    }

    /// The key's edge block, present only for interesting keys.
    pub fn edge_block(&self) -> Option<EdgeBlock> {
        if !self.is_interesting() {
            return None;
        }
        Some(EdgeBlock {
            signee: self.key_id.clone(),
            entries: self
                .certifications
                .values()
                .map(Certification::to_corpus_entry)
                .collect(),
        })
    }
}
