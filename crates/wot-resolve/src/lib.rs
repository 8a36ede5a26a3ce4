//! WoT Resolve — Trust-graph resolution for OpenPGP keyring dumps.
//!
//! This crate provides:
//! - [`RecordReader`] — a streaming decoder for line-oriented dump records.
//! - [`Key`], [`Identity`], [`Certification`], [`Revocation`] — the in-memory
//!   trust model and its commit-time rules.
//! - [`Resolver`] / [`resolve`] — the first pass, producing the key-status
//!   table and the raw edge corpus.
//! - [`refine`] — the second pass, producing the canonical edge corpus and
//!   the policy-URI table.

pub mod corpus;
pub mod error;
pub mod model;
pub mod policy;
pub mod records;
pub mod refiner;
pub mod resolver;
pub mod status_table;

#[cfg(test)]
mod proptests;

// Re-exports for convenience.
pub use corpus::{CorpusEntry, EdgeBlock, EdgeCorpusReader};
pub use error::ResolveError;
pub use model::{Certification, CommittedKey, Identity, Key, Revocation};
pub use policy::PolicyUriTable;
pub use records::{parse_line, Record, RecordReader};
pub use refiner::{refine, Refinement};
pub use resolver::{resolve, FirstPass, Resolver};
pub use status_table::{StatusLine, StatusTableReader};
