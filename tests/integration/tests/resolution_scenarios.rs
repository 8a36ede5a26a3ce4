//! Integration test: both resolution passes over hand-built keyring dumps.
//!
//! Covers status resolution, the interesting-key filter of the second
//! pass, policy-URI attribution and byte-level idempotence.

use wot_core::{KeyId, ResolverConfig};
use wot_integration_tests::{key_id, resolve_dump, DumpBuilder};
use wot_resolve::ResolveError;

fn resolve_default(dump: &str) -> wot_integration_tests::Resolved {
    resolve_dump(dump, &ResolverConfig::default()).unwrap()
}

// =========================================================================
// Key status
// =========================================================================

#[test]
fn test_revoked_flag_without_records() {
    let k1 = key_id(0x01);
    let dump = DumpBuilder::new().key(&k1, "r").build();
    let resolved = resolve_default(&dump);

    assert_eq!(resolved.status_of(&k1), Some("Ro"));
    assert_eq!(resolved.valid_identities_of(&k1), Some(0));
    assert!(resolved.corpus.is_empty());
}

#[test]
fn test_key_without_self_certification_is_invalid() {
    let k1 = key_id(0x01);
    let k2 = key_id(0x02);
    let dump = DumpBuilder::new()
        .valid_key(&k2)
        .key(&k1, "")
        .uid("No self signature")
        .sig(&k2, "2006-01-01")
        .build();
    let resolved = resolve_default(&dump);

    assert_eq!(resolved.status_of(&k1), Some("I"));
    assert!(!resolved.first.interesting.contains(&k1.parse::<KeyId>().unwrap()));
}

#[test]
fn test_expired_flag() {
    let k1 = key_id(0x01);
    let dump = DumpBuilder::new()
        .key(&k1, "e")
        .uid("Expired")
        .self_sig(&k1, "2005-01-01")
        .build();
    assert_eq!(resolve_default(&dump).status_of(&k1), Some("E"));
}

#[test]
fn test_key_revocation_by_designated_revoker() {
    let k1 = key_id(0x01);
    let k2 = key_id(0x02);
    let dump = DumpBuilder::new()
        .valid_key(&k1)
        .rev(&k2, "2007-01-01", "20")
        .build();
    assert_eq!(resolve_default(&dump).status_of(&k1), Some("Rd"));
}

#[test]
fn test_key_revocation_overrides_flags() {
    let k1 = key_id(0x01);
    let dump = DumpBuilder::new()
        .key(&k1, "e")
        .uid("Owner")
        .self_sig(&k1, "2005-01-01")
        .rev(&k1, "2007-01-01", "20")
        .build();
    assert_eq!(resolve_default(&dump).status_of(&k1), Some("Ro"));
}

// =========================================================================
// Interesting keys and the second pass
// =========================================================================

#[test]
fn test_certification_by_uninteresting_key_does_not_certify() {
    // K1 is valid but nobody certifies it, so it confers nothing.
    let k1 = key_id(0x01);
    let k2 = key_id(0x02);
    let dump = DumpBuilder::new()
        .valid_key(&k1)
        .valid_key(&k2)
        .sig(&k1, "2006-01-01")
        .build();
    let resolved = resolve_default(&dump);

    assert_eq!(resolved.status_of(&k1), Some("V"));
    assert_eq!(resolved.status_of(&k2), Some("V"));
    assert!(resolved.raw_corpus.contains(&format!("p{}", k2)));
    assert!(resolved.corpus.is_empty());
    assert_eq!(resolved.refinement.certified, 0);
    assert_eq!(resolved.refinement.dropped_blocks, 1);
}

#[test]
fn test_mutual_certification_promotes_both() {
    let k1 = key_id(0x01);
    let k2 = key_id(0x02);
    let dump = DumpBuilder::new()
        .valid_key(&k1)
        .sig(&k2, "2006-01-01")
        .valid_key(&k2)
        .sig(&k1, "2006-02-01")
        .build();
    let resolved = resolve_default(&dump);

    assert_eq!(resolved.status_of(&k1), Some("VC"));
    assert_eq!(resolved.status_of(&k2), Some("VC"));
    assert_eq!(
        resolved.signees().into_iter().collect::<Vec<_>>(),
        vec![k1.as_str(), k2.as_str()]
    );
    assert_eq!(resolved.refinement.certifications, 2);
}

#[test]
fn test_only_latest_certification_per_issuer_is_kept() {
    let k1 = key_id(0x01);
    let k2 = key_id(0x02);
    let dump = DumpBuilder::new()
        .valid_key(&k1)
        .sig(&k2, "2006-01-01")
        .sig(&k2, "2009-05-05")
        .sig(&k2, "2007-01-01")
        .valid_key(&k2)
        .sig(&k1, "2006-02-01")
        .build();
    let resolved = resolve_default(&dump);

    let block: Vec<&str> = resolved
        .corpus
        .lines()
        .skip_while(|line| *line != format!("p{}", k1))
        .skip(1)
        .take_while(|line| line.starts_with('s'))
        .collect();
    assert_eq!(block.len(), 1);
    assert!(block[0].starts_with(&format!("s{};2009-05-05;", k2)));
}

#[test]
fn test_retroactive_certification_revocation() {
    let k1 = key_id(0x01);
    let k2 = key_id(0x02);
    let dump = DumpBuilder::new()
        .valid_key(&k1)
        .sig(&k2, "2006-01-01")
        .rev(&k2, "2008-01-01", "30")
        .valid_key(&k2)
        .sig(&k1, "2006-02-01")
        .build();
    let resolved = resolve_default(&dump);

    // K2's certification of K1 is revoked, so K1 holds no edges and K2 is
    // certified by a key that is not interesting.
    assert_eq!(resolved.status_of(&k1), Some("V"));
    assert_eq!(resolved.status_of(&k2), Some("V"));
    assert!(resolved.corpus.is_empty());
}

#[test]
fn test_revoked_identity_contributes_nothing() {
    let k1 = key_id(0x01);
    let k2 = key_id(0x02);
    let dump = DumpBuilder::new()
        .valid_key(&k1)
        .uid("Retired address")
        .self_sig(&k1, "2005-01-01")
        .sig(&k2, "2006-01-01")
        .rev(&k1, "2007-01-01", "30")
        .build();
    let resolved = resolve_default(&dump);

    assert_eq!(resolved.status_of(&k1), Some("V"));
    assert_eq!(resolved.valid_identities_of(&k1), Some(1));
    assert!(!resolved.first.interesting.contains(&k1.parse::<KeyId>().unwrap()));
}

#[test]
fn test_deprecated_hash_policy() {
    let k1 = key_id(0x01);
    let k2 = key_id(0x02);
    let dump = DumpBuilder::new()
        .valid_key(&k1)
        .sig_with(&k2, "2006-01-01", "10", "", 1)
        .valid_key(&k2)
        .sig(&k1, "2006-02-01")
        .build();

    let lenient = resolve_default(&dump);
    assert_eq!(lenient.status_of(&k1), Some("VC"));

    let strict = ResolverConfig {
        exclude_deprecated_hash_algorithms: true,
        deprecated_hash_algorithms: vec![1],
        ..ResolverConfig::default()
    };
    let resolved = resolve_dump(&dump, &strict).unwrap();
    assert_eq!(resolved.status_of(&k1), Some("V"));
    assert_eq!(resolved.status_of(&k2), Some("V"));
}

#[test]
fn test_unknown_hash_algorithm_is_carried() {
    let k1 = key_id(0x01);
    let k2 = key_id(0x02);
    let dump = DumpBuilder::new()
        .valid_key(&k1)
        .sig_with(&k2, "2006-01-01", "10", "", 50)
        .valid_key(&k2)
        .sig(&k1, "2006-02-01")
        .build();
    let resolved = resolve_default(&dump);

    assert_eq!(resolved.status_of(&k1), Some("VC"));
    assert!(resolved
        .corpus
        .contains(&format!("s{};2006-01-01;;;0;1;50;4", k2)));
}

#[test]
fn test_duplicate_key_blocks_first_occurrence_wins() {
    let k1 = key_id(0x01);
    let k2 = key_id(0x02);
    let dump = DumpBuilder::new()
        .valid_key(&k1)
        .sig(&k2, "2006-01-01")
        .valid_key(&k2)
        .sig(&k1, "2006-02-01")
        .valid_key(&k1)
        .sig(&k2, "2010-01-01")
        .build();
    let resolved = resolve_default(&dump);

    assert_eq!(resolved.refinement.edge_blocks, 2);
    assert_eq!(resolved.refinement.duplicate_blocks, 1);
    assert!(!resolved.corpus.contains("2010-01-01"));
    assert_eq!(resolved.status.lines().count(), 3);
}

// =========================================================================
// Policy URIs
// =========================================================================

#[test]
fn test_policy_uris_only_for_interesting_issuers() {
    let k1 = key_id(0x01);
    let k2 = key_id(0x02);
    let k3 = key_id(0x03);
    let dump = DumpBuilder::new()
        .valid_key(&k1)
        .sig(&k2, "2006-01-01")
        .policy_uri("http://k2.example/policy")
        .policy_uri("http://k2.example/policy")
        .valid_key(&k2)
        .sig(&k1, "2006-02-01")
        .sig(&k3, "2006-03-01")
        .policy_uri("http://k3.example/policy")
        .valid_key(&k3)
        .build();
    let resolved = resolve_default(&dump);

    assert_eq!(
        resolved.policy_uris,
        format!("{};http://k2.example/policy\n", k2)
    );
    assert_eq!(resolved.refinement.policy_uris, 1);
}

// =========================================================================
// Failure policy and idempotence
// =========================================================================

#[test]
fn test_sig_before_uid_is_fatal() {
    let k1 = key_id(0x01);
    let dump = DumpBuilder::new()
        .key(&k1, "")
        .self_sig(&k1, "2005-01-01")
        .build();
    let err = resolve_dump(&dump, &ResolverConfig::default()).unwrap_err();
    assert!(matches!(err, ResolveError::Structural { line: 2, .. }));
}

#[test]
fn test_resolution_is_idempotent() {
    let ids: Vec<String> = (1..=5).map(key_id).collect();
    let mut builder = DumpBuilder::new();
    for (i, id) in ids.iter().enumerate() {
        builder = builder.valid_key(id);
        for (j, issuer) in ids.iter().enumerate() {
            if i != j && (i + j) % 2 == 1 {
                builder = builder.sig(issuer, &format!("2006-0{}-01", j + 1));
            }
        }
    }
    let dump = builder.build();

    let first = resolve_default(&dump);
    let second = resolve_default(&dump);
    assert_eq!(first.status, second.status);
    assert_eq!(first.corpus, second.corpus);
    assert_eq!(first.policy_uris, second.policy_uris);
}
