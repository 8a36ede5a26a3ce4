//! WoT Core — Fundamental types, errors, and configuration shared by the
//! trust-graph resolver and the strong-set analytics engine.

pub mod config;
pub mod error;
pub mod key_status;
pub mod types;


pub use config::{AnalyticsConfig, ResolverConfig};
pub use error::CoreError;
pub use key_status::{KeyStatus, KeyStatusEvent, KeyStatusMachine};
pub use types::{
    version_bucket, CertificationLevel, HashAlgorithm, KeyId, PublicKeyAlgorithm, RevocationKind,
};
