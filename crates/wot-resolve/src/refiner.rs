//! Second resolution pass: restrict the raw edge corpus to interesting
//! issuers and promote the keys they certify.

use std::collections::HashSet;
use std::io::{BufRead, Write};

use wot_core::{KeyId, KeyStatus, KeyStatusEvent, KeyStatusMachine};

use crate::corpus::{CorpusEntry, EdgeBlock, EdgeCorpusReader};
use crate::error::ResolveError;
use crate::resolver::FirstPass;
use crate::status_table::StatusTableReader;

/// Counters from the second pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Refinement {
    /// Keys promoted from `V` to `VC`.
    pub certified: usize,
    /// Edge blocks written to the canonical corpus.
    pub edge_blocks: usize,
    /// Certifications written to the canonical corpus.
    pub certifications: usize,
    /// Blocks left empty once non-interesting issuers are removed.
    pub dropped_blocks: usize,
    /// Later blocks for a signee that was already emitted.
    pub duplicate_blocks: usize,
    /// (issuer, uri) pairs written to the policy-URI table.
    pub policy_uris: usize,
}

/// Keep the entries whose issuer is interesting, each distinct line once
/// and in input order.
fn filter_block(block: EdgeBlock, interesting: &HashSet<KeyId>) -> EdgeBlock {
    let mut seen: HashSet<CorpusEntry> = HashSet::new();
    let entries = block
        .entries
        .into_iter()
        .filter(|entry| interesting.contains(&entry.issuer))
        .filter(|entry| seen.insert(entry.clone()))
        .collect();
    EdgeBlock {
        signee: block.signee,
        entries,
    }
}

/// Run the second pass over the first pass's raw artifacts.
pub fn refine<CI, SI, CO, SO, PO>(
    first: &FirstPass,
    corpus_in: CI,
    status_in: SI,
    corpus_out: &mut CO,
    status_out: &mut SO,
    policy_out: &mut PO,
) -> Result<Refinement, ResolveError>
where
    CI: BufRead,
    SI: BufRead,
    CO: Write,
    SO: Write,
    PO: Write,
{
    let mut refinement = Refinement::default();
    let mut trusted: HashSet<KeyId> = HashSet::new();

    for block in EdgeCorpusReader::with_stage(corpus_in, "reading raw edge corpus") {
        let block = block?;
        if trusted.contains(&block.signee) {
            refinement.duplicate_blocks += 1;
            continue;
        }
        if !first.interesting.contains(&block.signee) {
            refinement.dropped_blocks += 1;
            continue;
        }
        let block = filter_block(block, &first.interesting);
        if block.entries.is_empty() {
            tracing::debug!(signee = %block.signee, "no interesting issuer left");
            refinement.dropped_blocks += 1;
            continue;
        }
        block
            .write_to(corpus_out)
            .map_err(ResolveError::io("writing edge corpus"))?;
        refinement.edge_blocks += 1;
        refinement.certifications += block.entries.len();
        trusted.insert(block.signee);
    }

    for line in StatusTableReader::new(status_in) {
        let mut line = line?;
        if line.status == KeyStatus::Valid && trusted.contains(&line.key_id) {
            line.status =
                KeyStatusMachine::transition(line.status, KeyStatusEvent::CertifiedByInterestingKey)?;
            refinement.certified += 1;
        }
        writeln!(status_out, "{}", line).map_err(ResolveError::io("writing key-status table"))?;
    }

    let mut policy_uris = first.policy_uris.clone();
    policy_uris.retain_issuers(&first.interesting);
    policy_uris
        .write_to(policy_out)
        .map_err(ResolveError::io("writing policy-URI table"))?;
    refinement.policy_uris = policy_uris.len();

    corpus_out
        .flush()
        .map_err(ResolveError::io("writing edge corpus"))?;
    status_out
        .flush()
        .map_err(ResolveError::io("writing key-status table"))?;
    policy_out
        .flush()
        .map_err(ResolveError::io("writing policy-URI table"))?;

    tracing::info!(
        certified = refinement.certified,
        edge_blocks = refinement.edge_blocks,
        certifications = refinement.certifications,
        dropped = refinement.dropped_blocks,
        duplicates = refinement.duplicate_blocks,
        policy_uris = refinement.policy_uris,
        "second pass complete"
    );
    Ok(refinement)
}
