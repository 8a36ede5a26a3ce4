//! Key and certification breakdown tables.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use wot_core::{version_bucket, CertificationLevel, HashAlgorithm, KeyId, KeyStatus, PublicKeyAlgorithm};
use wot_resolve::{CorpusEntry, StatusLine};

/// Key counts in one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KeyCounts {
    pub valid: usize,
    pub certified: usize,
    pub reachable: usize,
    pub strong: usize,
}

/// Certification counts in one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CertificationCounts {
    pub valid: usize,
    pub reachable: usize,
    pub strong: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row<C> {
    pub bucket: u32,
    pub label: String,
    pub counts: C,
}

fn rows<C: Copy>(table: &BTreeMap<u32, C>, label: impl Fn(u32) -> String) -> Vec<Row<C>> {
    table
        .iter()
        .map(|(&bucket, &counts)| Row {
            bucket,
            label: label(bucket),
            counts,
        })
        .collect()
}

fn preset<C: Default>(buckets: impl IntoIterator<Item = u32>) -> BTreeMap<u32, C> {
    buckets.into_iter().map(|b| (b, C::default())).collect()
}

pub const KEY_LENGTH_BUCKETS: [u32; 7] = [0, 1024, 1025, 2048, 2049, 4096, 9999];
pub const YEAR_BEFORE: u32 = 0;
pub const YEAR_FUTURE: u32 = 9999;
const FIRST_YEAR: u32 = 1992;

pub fn key_length_bucket(bits: u32) -> u32 {
    match bits {
        0..=1023 => 0,
        1024 => 1024,
        1025..=2047 => 1025,
        2048 => 2048,
        2049..=4095 => 2049,
        4096 => 4096,
        _ => 9999,
    }
}

pub fn key_length_label(bucket: u32) -> String {
    match bucket {
        0 => "Less than 1024".to_string(),
        1025 => "Between 1024 and 2048".to_string(),
        2049 => "Between 2048 and 4096".to_string(),
        9999 => "More than 4096".to_string(),
        other => other.to_string(),
    }
}

/// Creation-year bucket of a `YYYY-MM-DD` date. Unparseable dates land
/// with the pre-1992 keys.
pub fn year_bucket(created: &str, current_year: u32) -> u32 {
    let year = created.get(..4).and_then(|y| y.parse::<u32>().ok());
    match year {
        Some(year) if year > current_year => YEAR_FUTURE,
        Some(year) if year >= FIRST_YEAR => year,
        _ => YEAR_BEFORE,
    }
}

pub fn year_label(bucket: u32) -> String {
    match bucket {
        YEAR_BEFORE => "Before 1992".to_string(),
        YEAR_FUTURE => "In the future".to_string(),
        year => year.to_string(),
    }
}

fn version_label(bucket: u32) -> String {
    if bucket == 0 {
        "Other".to_string()
    } else {
        format!("v{}", bucket)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyTotals {
    /// Distinct key ids in the status table.
    pub keys: usize,
    pub expired: usize,
    pub revoked: usize,
    pub revoked_by_owner: usize,
    pub revoked_by_designated_revoker: usize,
    pub invalid: usize,
    pub valid: usize,
    pub certified: usize,
    pub reachable: usize,
    pub strong: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyStatistics {
    pub totals: KeyTotals,
    pub by_version: Vec<Row<KeyCounts>>,
    pub by_pk_algorithm: Vec<Row<KeyCounts>>,
    pub by_key_length: Vec<Row<KeyCounts>>,
    pub by_creation_year: Vec<Row<KeyCounts>>,
}

/// Accumulates [`KeyStatistics`] from status lines, first occurrence per
/// key id.
pub struct KeyStatisticsBuilder {
    current_year: u32,
    seen: HashSet<KeyId>,
    totals: KeyTotals,
    by_version: BTreeMap<u32, KeyCounts>,
    by_pk_algorithm: BTreeMap<u32, KeyCounts>,
    by_key_length: BTreeMap<u32, KeyCounts>,
    by_creation_year: BTreeMap<u32, KeyCounts>,
}

impl KeyStatisticsBuilder {
    pub fn new(current_year: u32) -> Self {
        let years = [YEAR_BEFORE, YEAR_FUTURE]
            .into_iter()
            .chain(FIRST_YEAR..=current_year.max(FIRST_YEAR));
        Self {
            current_year,
            seen: HashSet::new(),
            totals: KeyTotals::default(),
            by_version: preset([0, 2, 3, 4]),
            by_pk_algorithm: preset(PublicKeyAlgorithm::BUCKETS.map(u32::from)),
            by_key_length: preset(KEY_LENGTH_BUCKETS),
            by_creation_year: preset(years),
        }
    }

    /// Count one status line. Returns false for a repeated key id.
    pub fn record(&mut self, line: &StatusLine, reachable: bool, strong: bool) -> bool {
        if !self.seen.insert(line.key_id.clone()) {
            return false;
        }
        self.totals.keys += 1;
        match line.status {
            KeyStatus::Expired => self.totals.expired += 1,
            KeyStatus::RevokedByOwner => {
                self.totals.revoked += 1;
                self.totals.revoked_by_owner += 1;
            }
            KeyStatus::RevokedByDesignatedRevoker => {
                self.totals.revoked += 1;
                self.totals.revoked_by_designated_revoker += 1;
            }
            KeyStatus::Invalid => self.totals.invalid += 1,
            KeyStatus::Valid | KeyStatus::Certified => {
                self.totals.valid += 1;
                if line.status == KeyStatus::Certified {
                    self.totals.certified += 1;
                }
            }
            KeyStatus::Unvalidated => {}
        }

        let buckets = [
            (&mut self.by_version, u32::from(version_bucket(line.version))),
            (&mut self.by_pk_algorithm, u32::from(line.pk_algorithm.bucket())),
            (&mut self.by_key_length, key_length_bucket(line.bit_length)),
            (
                &mut self.by_creation_year,
                year_bucket(&line.created, self.current_year),
            ),
        ];
        for (table, bucket) in buckets {
            let counts = table.entry(bucket).or_default();
            if line.status.is_valid() {
                counts.valid += 1;
            }
            if line.status == KeyStatus::Certified {
                counts.certified += 1;
            }
            if reachable {
                counts.reachable += 1;
            }
            if strong {
                counts.strong += 1;
            }
        }
        true
    }

    pub fn finish(mut self, reachable: usize, strong: usize) -> KeyStatistics {
        self.totals.reachable = reachable;
        self.totals.strong = strong;
        KeyStatistics {
            totals: self.totals,
            by_version: rows(&self.by_version, version_label),
            by_pk_algorithm: rows(&self.by_pk_algorithm, |b| {
                PublicKeyAlgorithm::bucket_label(b as u8).to_string()
            }),
            by_key_length: rows(&self.by_key_length, key_length_label),
            by_creation_year: rows(&self.by_creation_year, year_label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificationStatistics {
    pub totals: CertificationCounts,
    pub by_hash_algorithm: Vec<Row<CertificationCounts>>,
    pub by_version: Vec<Row<CertificationCounts>>,
    pub by_level: Vec<Row<CertificationCounts>>,
}

/// Accumulates [`CertificationStatistics`] from corpus entries.
pub struct CertificationStatisticsBuilder {
    totals: CertificationCounts,
    by_hash_algorithm: BTreeMap<u32, CertificationCounts>,
    by_version: BTreeMap<u32, CertificationCounts>,
    by_level: BTreeMap<u32, CertificationCounts>,
}

impl Default for CertificationStatisticsBuilder {
    fn default() -> Self {
        Self {
            totals: CertificationCounts::default(),
            by_hash_algorithm: preset(HashAlgorithm::BUCKETS.map(u32::from)),
            by_version: preset([0, 2, 3, 4]),
            by_level: preset(CertificationLevel::BUCKETS.map(u32::from)),
        }
    }
}

impl CertificationStatisticsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one certification. `reachable` and `strong` hold when both
    /// endpoints are members of the set.
    pub fn record(&mut self, entry: &CorpusEntry, reachable: bool, strong: bool) {
        let buckets = [
            (
                &mut self.by_hash_algorithm,
                u32::from(entry.hash_algorithm.bucket()),
            ),
            (&mut self.by_version, u32::from(version_bucket(entry.version))),
            (&mut self.by_level, u32::from(entry.level.bucket())),
        ];
        for counts in buckets
            .into_iter()
            .map(|(table, bucket)| table.entry(bucket).or_default())
            .chain(std::iter::once(&mut self.totals))
        {
            counts.valid += 1;
            if reachable {
                counts.reachable += 1;
            }
            if strong {
                counts.strong += 1;
            }
        }
    }

    pub fn finish(self) -> CertificationStatistics {
        CertificationStatistics {
            totals: self.totals,
            by_hash_algorithm: rows(&self.by_hash_algorithm, |b| {
                HashAlgorithm::bucket_label(b as u8).to_string()
            }),
            by_version: rows(&self.by_version, version_label),
            by_level: rows(&self.by_level, |b| {
                CertificationLevel::bucket_label(b as u8).to_string()
            }),
        }
    }
}
