//! First resolution pass: dump records in, key-status table and raw edge
//! corpus out.

use std::collections::HashSet;
use std::io::{BufRead, Write};

use wot_core::{KeyId, ResolverConfig};

use crate::error::ResolveError;
use crate::model::{Certification, CommittedKey, Identity, Key, Revocation};
use crate::policy::PolicyUriTable;
use crate::records::{Record, RecordReader};

/// What the first pass hands to the second.
#[derive(Debug, Clone, Default)]
pub struct FirstPass {
    /// Keys that are valid and hold at least one third-party certification.
    pub interesting: HashSet<KeyId>,
    /// Policy URIs of every issuer seen, before filtering.
    pub policy_uris: PolicyUriTable,
    /// `pub` records processed.
    pub keys: usize,
    /// Edge blocks written to the raw corpus.
    pub edge_blocks: usize,
}

/// Incremental trust-model builder. Feed it records in dump order; each
/// `pub` finalizes the key before it.
pub struct Resolver {
    config: ResolverConfig,
    current: Option<Key>,
    /// Issuer of the latest `sig` of the current key, owner of any
    /// following policy-URI subpacket.
    last_issuer: Option<KeyId>,
    interesting: HashSet<KeyId>,
    policy_uris: PolicyUriTable,
    keys: usize,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            current: None,
            last_issuer: None,
            interesting: HashSet::new(),
            policy_uris: PolicyUriTable::new(),
            keys: 0,
        }
    }

    /// Apply one record. Returns the previous key once a new `pub`
    /// finalizes it.
    pub fn push(&mut self, line: usize, record: Record) -> Result<Option<CommittedKey>, ResolveError> {
        match record {
            Record::Pub(record) => {
                let committed = self.commit_current();
                self.current = Some(Key::from(record));
                self.last_issuer = None;
                self.keys += 1;
                if self.config.progress_interval > 0 && self.keys % self.config.progress_interval == 0 {
                    tracing::info!(
                        keys = self.keys,
                        interesting = self.interesting.len(),
                        "resolution progress"
                    );
                }
                Ok(committed)
            }
            Record::Uid(record) => {
                let key = self
                    .current
                    .as_mut()
                    .ok_or_else(|| ResolveError::structural(line, "uid before any pub"))?;
                key.add_identity(Identity::new(record.user_id));
                Ok(None)
            }
            Record::Sig(record) => {
                let key = self
                    .current
                    .as_mut()
                    .ok_or_else(|| ResolveError::structural(line, "sig before any pub"))?;
                let issuer = record.issuer.clone();
                key.add_certification(line, Certification::from(record), &self.config)?;
                self.last_issuer = Some(issuer);
                Ok(None)
            }
            Record::Rev(record) => {
                let key = self
                    .current
                    .as_mut()
                    .ok_or_else(|| ResolveError::structural(line, "rev before any pub"))?;
                key.add_revocation(line, Revocation::from(record))?;
                Ok(None)
            }
            Record::Spk(record) => {
                if !record.is_policy_uri() {
                    return Ok(None);
                }
                let issuer = self.last_issuer.clone().ok_or_else(|| {
                    ResolveError::structural(line, "policy URI subpacket before any sig of the key")
                })?;
                self.policy_uris.insert(issuer, record.data);
                Ok(None)
            }
        }
    }

    /// Finalize the last key of the stream.
    pub fn finish(&mut self) -> Option<CommittedKey> {
        self.last_issuer = None;
        self.commit_current()
    }

    fn commit_current(&mut self) -> Option<CommittedKey> {
        let committed = self.current.take()?.commit(&self.config);
        if committed.is_interesting() {
            self.interesting.insert(committed.key_id.clone());
        }
        Some(committed)
    }

    pub fn keys(&self) -> usize {
        self.keys
    }

    pub fn interesting(&self) -> &HashSet<KeyId> {
        &self.interesting
    }

    pub fn into_first_pass(self, edge_blocks: usize) -> FirstPass {
        FirstPass {
            interesting: self.interesting,
            policy_uris: self.policy_uris,
            keys: self.keys,
            edge_blocks,
        }
    }
}

/// Run the first pass over a whole dump, writing one status line per key
/// to `status_out` and one edge block per interesting key to `corpus_out`.
pub fn resolve<R, S, C>(
    dump: R,
    status_out: &mut S,
    corpus_out: &mut C,
    config: &ResolverConfig,
) -> Result<FirstPass, ResolveError>
where
    R: BufRead,
    S: Write,
    C: Write,
{
    let mut resolver = Resolver::new(config.clone());
    let mut edge_blocks = 0;

    let mut emit = |key: CommittedKey| -> Result<(), ResolveError> {
        writeln!(status_out, "{}", key.status_line())
            .map_err(ResolveError::io("writing key-status table"))?;
        if let Some(block) = key.edge_block() {
            block
                .write_to(corpus_out)
                .map_err(ResolveError::io("writing edge corpus"))?;
            edge_blocks += 1;
        }
        Ok(())
    };

    for item in RecordReader::new(dump) {
        let (line, record) = item?;
        if let Some(key) = resolver.push(line, record)? {
            emit(key)?;
        }
    }
    if let Some(key) = resolver.finish() {
        emit(key)?;
    }

    status_out
        .flush()
        .map_err(ResolveError::io("writing key-status table"))?;
    corpus_out
        .flush()
        .map_err(ResolveError::io("writing edge corpus"))?;

    let first = resolver.into_first_pass(edge_blocks);
    tracing::info!(
        keys = first.keys,
        interesting = first.interesting.len(),
        edge_blocks = first.edge_blocks,
        policy_uris = first.policy_uris.len(),
        "first pass complete"
    );
    Ok(first)
}
