use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::{BufRead, Write};

use wot_core::KeyId;

use crate::error::ResolveError;
use crate::records::{escape_line, unescape};

/// Certification-policy URIs declared per issuer, deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyUriTable {
    uris: BTreeMap<KeyId, BTreeSet<String>>,
}

impl PolicyUriTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the pair was already present.
    pub fn insert(&mut self, issuer: KeyId, uri: impl Into<String>) -> bool {
        self.uris.entry(issuer).or_default().insert(uri.into())
    }

    pub fn uris_of(&self, issuer: &KeyId) -> Option<&BTreeSet<String>> {
        self.uris.get(issuer)
    }

    pub fn issuers(&self) -> usize {
        self.uris.len()
    }

    /// Number of distinct (issuer, uri) pairs.
    pub fn len(&self) -> usize {
        self.uris.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    /// Keep only the issuers in `keep`.
    pub fn retain_issuers(&mut self, keep: &HashSet<KeyId>) {
        self.uris.retain(|issuer, _| keep.contains(issuer));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyId, &str)> {
        self.uris
            .iter()
            .flat_map(|(issuer, uris)| uris.iter().map(move |uri| (issuer, uri.as_str())))
    }

    /// Write `issuer;uri` lines, sorted by issuer then uri. URIs are
    /// escaped so each pair stays on one line.
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for (issuer, uri) in self.iter() {
            writeln!(out, "{};{}", issuer, escape_line(uri))?;
        }
        Ok(())
    }

    pub fn read_from<R: BufRead>(reader: R) -> Result<Self, ResolveError> {
        let mut table = Self::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(ResolveError::io("reading policy-URI table"))?;
            if line.trim().is_empty() {
                continue;
            }
            // URIs may themselves contain ';'.
            let (issuer, uri) = line.split_once(';').ok_or_else(|| {
                ResolveError::malformed(index + 1, "policy-URI line has no ';' separator")
            })?;
            let issuer = KeyId::new(issuer)
                .map_err(|e| ResolveError::malformed(index + 1, e.to_string()))?;
            table.insert(issuer, unescape(uri));
        }
        Ok(table)
    }
}
