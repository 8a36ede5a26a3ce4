//! Property-based tests for retention and the two resolution passes.

use proptest::prelude::*;

use wot_core::{CertificationLevel, HashAlgorithm, KeyId, KeyStatus, PublicKeyAlgorithm, ResolverConfig};

use crate::model::{Certification, Identity};
use crate::{refine, resolve, StatusTableReader};

fn date(day: u8) -> String {
    format!("2004-{:02}-{:02}", day / 28 + 1, day % 28 + 1)
}

fn cert(issuer: &KeyId, day: u8) -> Certification {
    Certification {
        issuer: issuer.clone(),
        date: date(day),
        expires: String::new(),
        flags: String::new(),
        level: CertificationLevel::Generic,
        pk_algorithm: PublicKeyAlgorithm::Dsa,
        hash_algorithm: HashAlgorithm::Sha1,
        version: 4,
        expired: false,
        revoked: false,
    }
}

/// One generated key: whether it self-certifies, and which other keys
/// (by index) certify it on which day.
#[derive(Debug, Clone)]
struct KeySpec {
    self_signed: bool,
    flags: &'static str,
    certifiers: Vec<(usize, u8)>,
}

fn key_spec(keys: usize) -> impl Strategy<Value = KeySpec> {
    (
        any::<bool>(),
        prop_oneof![Just(""), Just(""), Just("e"), Just("r")],
        prop::collection::vec((0..keys, 0u8..200), 0..6),
    )
        .prop_map(|(self_signed, flags, certifiers)| KeySpec {
            self_signed,
            flags,
            certifiers,
        })
}

fn dump_strategy() -> impl Strategy<Value = String> {
    (1usize..8)
        .prop_flat_map(|keys| prop::collection::vec(key_spec(keys), keys))
        .prop_map(|specs| {
            let mut dump = String::new();
            for (index, spec) in specs.iter().enumerate() {
                let key_id = format!("{:016X}", index + 1);
                dump.push_str(&format!("pub:{}:1024:17:{}:2001-01-01::4:\n", spec.flags, key_id));
                dump.push_str("uid:-::::::::someone:\n");
                if spec.self_signed {
                    dump.push_str(&format!("sig:{}:2001-01-01::13::4:17:2\n", key_id));
                }
                for (issuer, day) in &spec.certifiers {
                    dump.push_str(&format!(
                        "sig:{:016X}:{}::10::4:17:2\n",
                        issuer + 1,
                        date(*day)
                    ));
                }
            }
            dump
        })
}

fn run(dump: &str) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let config = ResolverConfig::default();
    let mut raw_status = Vec::new();
    let mut raw_corpus = Vec::new();
    let first = resolve(dump.as_bytes(), &mut raw_status, &mut raw_corpus, &config).unwrap();

    let mut corpus = Vec::new();
    let mut status = Vec::new();
    let mut policy = Vec::new();
    refine(
        &first,
        raw_corpus.as_slice(),
        raw_status.as_slice(),
        &mut corpus,
        &mut status,
        &mut policy,
    )
    .unwrap();
    (status, corpus, policy)
}

proptest! {
    /// The retained certification per issuer carries the latest date.
    #[test]
    fn retained_certification_has_max_date(days in prop::collection::vec(0u8..200, 1..20)) {
        let owner = KeyId::new("AA").unwrap();
        let issuer = KeyId::new("BB").unwrap();
        let mut identity = Identity::new("x");
        for day in &days {
            identity.add_certification(&owner, cert(&issuer, *day), &ResolverConfig::default());
        }
        let max = days.iter().copied().max().unwrap();
        prop_assert_eq!(&identity.certification_from(&issuer).unwrap().date, &date(max));
    }

    /// Two runs over the same dump produce identical artifacts.
    #[test]
    fn resolution_is_idempotent(dump in dump_strategy()) {
        prop_assert_eq!(run(&dump), run(&dump));
    }

    /// Every key reaches a first- or second-pass terminal status, and each
    /// certified key heads a block of the canonical corpus.
    #[test]
    fn certified_keys_have_edges(dump in dump_strategy()) {
        let (status, corpus, _) = run(&dump);
        let corpus = String::from_utf8(corpus).unwrap();
        for line in StatusTableReader::new(status.as_slice()) {
            let line = line.unwrap();
            prop_assert!(line.status.is_final() || line.status == KeyStatus::Valid);
            if line.status == KeyStatus::Certified {
                let header = format!("p{}\n", line.key_id);
                prop_assert!(corpus.contains(&header));
            }
        }
    }
}
