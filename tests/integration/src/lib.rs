//! Fixtures shared by the integration tests: a keyring dump builder and
//! helpers that run both resolution passes in memory.

use std::collections::BTreeSet;

use wot_core::ResolverConfig;
use wot_resolve::{refine, resolve, FirstPass, Refinement, ResolveError};

/// Full-width key id for a one-byte label, e.g. `0xAA` -> `00000000000000AA`.
pub fn key_id(label: u8) -> String {
    format!("{:016X}", label)
}

/// Builds a keyring dump line by line.
#[derive(Debug, Default, Clone)]
pub struct DumpBuilder {
    lines: Vec<String>,
}

impl DumpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A version 4, 2048-bit RSA key created in 2005.
    pub fn key(self, id: &str, flags: &str) -> Self {
        self.key_with(id, flags, 2048, 1, "2005-01-01")
    }

    pub fn key_with(mut self, id: &str, flags: &str, bits: u32, pk: u8, created: &str) -> Self {
        self.lines
            .push(format!("pub:{}:{}:{}:{}:{}::4:", flags, bits, pk, id, created));
        self
    }

    pub fn uid(mut self, user_id: &str) -> Self {
        self.lines.push(format!("uid:-::::::::{}:", user_id));
        self
    }

    /// Positive self-certification with SHA256.
    pub fn self_sig(self, id: &str, date: &str) -> Self {
        self.sig_with(id, date, "13", "", 8)
    }

    /// Generic third-party certification with SHA256.
    pub fn sig(self, issuer: &str, date: &str) -> Self {
        self.sig_with(issuer, date, "10", "", 8)
    }

    pub fn sig_with(mut self, issuer: &str, date: &str, level: &str, flags: &str, hash: u8) -> Self {
        self.lines.push(format!(
            "sig:{}:{}::{}:{}:4:1:{}",
            issuer, date, level, flags, hash
        ));
        self
    }

    /// `kind` is the revocation signature type in hex: `20` key, `30`
    /// certification.
    pub fn rev(mut self, issuer: &str, date: &str, kind: &str) -> Self {
        self.lines
            .push(format!("rev:{}:{}::{}::4:1:8", issuer, date, kind));
        self
    }

    /// Certification policy URI subpacket for the preceding `sig`.
    pub fn policy_uri(mut self, uri: &str) -> Self {
        let escaped = uri.replace('\\', "\\\\").replace(':', "\\x3a");
        self.lines
            .push(format!("spk:26:0:{}:{}", uri.len(), escaped));
        self
    }

    /// A valid key with one user id and its self-certification.
    pub fn valid_key(self, id: &str) -> Self {
        self.key(id, "")
            .uid(&format!("Owner of {}", id))
            .self_sig(id, "2005-01-01")
    }

    pub fn build(&self) -> String {
        let mut dump = self.lines.join("\n");
        dump.push('\n');
        dump
    }
}

/// Everything both resolution passes produced for one dump.
#[derive(Debug)]
pub struct Resolved {
    pub first: FirstPass,
    pub refinement: Refinement,
    pub raw_status: String,
    pub raw_corpus: String,
    pub status: String,
    pub corpus: String,
    pub policy_uris: String,
}

impl Resolved {
    /// Status code of the first line for `id` in the final status table.
    pub fn status_of(&self, id: &str) -> Option<&str> {
        self.status.lines().find_map(|line| {
            let mut fields = line.split(';');
            let code = fields.next()?;
            (fields.next()? == id).then_some(code)
        })
    }

    /// Valid identity count of the first line for `id`.
    pub fn valid_identities_of(&self, id: &str) -> Option<usize> {
        self.status.lines().find_map(|line| {
            let fields: Vec<&str> = line.split(';').collect();
            if fields.get(1) != Some(&id) {
                return None;
            }
            fields.get(7)?.parse().ok()
        })
    }

    /// Signees with a block in the canonical corpus.
    pub fn signees(&self) -> BTreeSet<&str> {
        self.corpus
            .lines()
            .filter_map(|line| line.strip_prefix('p'))
            .collect()
    }
}

/// Run the first and second pass over `dump` entirely in memory.
pub fn resolve_dump(dump: &str, config: &ResolverConfig) -> Result<Resolved, ResolveError> {
    let mut raw_status = Vec::new();
    let mut raw_corpus = Vec::new();
    let first = resolve(dump.as_bytes(), &mut raw_status, &mut raw_corpus, config)?;

    let mut status = Vec::new();
    let mut corpus = Vec::new();
    let mut policy_uris = Vec::new();
    let refinement = refine(
        &first,
        raw_corpus.as_slice(),
        raw_status.as_slice(),
        &mut corpus,
        &mut status,
        &mut policy_uris,
    )?;

    let text = |bytes: Vec<u8>| String::from_utf8_lossy(&bytes).into_owned();
    Ok(Resolved {
        first,
        refinement,
        raw_status: text(raw_status),
        raw_corpus: text(raw_corpus),
        status: text(status),
        corpus: text(corpus),
        policy_uris: text(policy_uris),
    })
}

/// Connectivity rows for a strong set whose degrees are derived from
/// `edges` (signer, signee). Mean distance and eccentricity are fixed.
pub fn strong_set_connectivity(ids: &[&str], edges: &[(&str, &str)]) -> String {
    let mut rows = String::new();
    for id in ids {
        let in_degree = edges.iter().filter(|(_, to)| to == id).count();
        let out_degree = edges.iter().filter(|(from, _)| from == id).count();
        let cross = edges
            .iter()
            .filter(|(from, to)| from == id && edges.contains(&(*to, *from)))
            .count();
        rows.push_str(&format!(
            "{id};1.5;{i};{o};{c};{i};{o};{c};2;1\n",
            id = id,
            i = in_degree,
            o = out_degree,
            c = cross
        ));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_builder_lines() {
        let dump = DumpBuilder::new()
            .valid_key(&key_id(0xAA))
            .sig(&key_id(0xBB), "2006-01-01")
            .policy_uri("http://example.org/policy")
            .build();
        assert_eq!(
            dump,
            "pub::2048:1:00000000000000AA:2005-01-01::4:\n\
             uid:-::::::::Owner of 00000000000000AA:\n\
             sig:00000000000000AA:2005-01-01::13::4:1:8\n\
             sig:00000000000000BB:2006-01-01::10::4:1:8\n\
             spk:26:0:25:http\\x3a//example.org/policy\n"
        );
    }

    #[test]
    fn test_connectivity_degrees() {
        let rows = strong_set_connectivity(&["A1", "B2"], &[("A1", "B2"), ("B2", "A1")]);
        assert_eq!(rows, "A1;1.5;1;1;1;1;1;1;2;1\nB2;1.5;1;1;1;1;1;1;2;1\n");
    }
}
