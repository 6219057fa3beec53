//! Policy address derivation tests.

mod common;

use std::collections::HashSet;

use common::*;
use shield_policy_interface::derivation::{
    DerivationBackend, Ed25519Sha256, create_program_address, find_program_address_with,
};
use shield_policy_interface::pda::verify_policy_address;
use shield_policy_interface::{
    PolicyError, PolicySeeds, SHIELD_PROGRAM_ID as INTERFACE_PROGRAM_ID, find_policy_address,
    find_policy_address_with_program_id,
};
use solana_pubkey::Pubkey;
use test_case::test_case;

/// Backend that treats every candidate as a curve point.
struct NeverOffCurve;

impl DerivationBackend for NeverOffCurve {
    fn hash(&self, parts: &[&[u8]]) -> [u8; 32] {
        Ed25519Sha256.hash(parts)
    }

    fn is_on_curve(&self, _candidate: &[u8; 32]) -> bool {
        true
    }
}

#[test]
fn test_default_program_id_matches_id_crate() {
    assert_eq!(INTERFACE_PROGRAM_ID, SHIELD_PROGRAM_ID.to_bytes());
}

#[test]
fn test_derivation_is_deterministic() {
    let mut rng = rng();
    for _ in 0..32 {
        let mint = random_identity(&mut rng);
        let first = find_policy_address(&mint).unwrap();
        for _ in 0..3 {
            assert_eq!(find_policy_address(&mint).unwrap(), first);
        }
    }
}

#[test]
fn test_matches_reference_implementation() {
    let mut rng = rng();
    for _ in 0..256 {
        let mint = random_identity(&mut rng);
        let derived = find_policy_address(&mint).unwrap();
        let (address, bump) = reference_policy_pda(&mint, &SHIELD_PROGRAM_ID);

        assert_eq!(derived.address, address, "mint {mint:?}");
        assert_eq!(derived.bump, bump, "mint {mint:?}");
    }
}

#[test]
fn test_matches_reference_for_alternate_programs() {
    let mut rng = rng();
    for _ in 0..64 {
        let mint = random_identity(&mut rng);
        let program_id = random_identity(&mut rng);
        let derived = find_policy_address_with_program_id(&mint, &program_id);
        let expected = reference_policy_pda(&mint, &Pubkey::new_from_array(program_id));

        let derived = derived.unwrap();
        assert_eq!((derived.address, derived.bump), expected);
    }
}

#[test]
fn test_distinct_mints_never_collide() {
    let mut rng = rng();
    let mut mints = HashSet::new();
    let mut addresses = HashSet::new();

    while mints.len() < 1_000 {
        let mint = random_identity(&mut rng);
        if !mints.insert(mint) {
            continue;
        }
        let derived = find_policy_address(&mint).unwrap();
        assert!(addresses.insert(derived.address), "collision {mint:?}");
    }
}

#[test_case([0u8; 32] ; "zero mint")]
#[test_case([0xffu8; 32] ; "saturated mint")]
#[test_case(*b"So11111111111111111111111111111\x01" ; "ascii mint")]
fn test_edge_mints(mint: [u8; 32]) {
    let derived = find_policy_address(&mint).unwrap();
    assert_eq!(
        (derived.address, derived.bump),
        reference_policy_pda(&mint, &SHIELD_PROGRAM_ID)
    );
    assert!(!Ed25519Sha256.is_on_curve(&derived.address));
}

#[test]
fn test_bump_exhaustion() {
    let seeds = PolicySeeds { mint: [7u8; 32] }.to_seed_set();
    let result = find_program_address_with(&NeverOffCurve, &seeds, &INTERFACE_PROGRAM_ID);
    assert_eq!(result, Err(PolicyError::BumpSeedExhausted));
}

#[test]
fn test_canonical_bump_is_highest_off_curve() {
    let mut rng = rng();
    for _ in 0..16 {
        let mint = random_identity(&mut rng);
        let seeds = PolicySeeds { mint }.to_seed_set();
        let derived = find_policy_address(&mint).unwrap();

        for bump in derived.bump.saturating_add(1)..=u8::MAX {
            if bump == derived.bump {
                continue;
            }
            assert_eq!(
                create_program_address(&seeds, bump, &INTERFACE_PROGRAM_ID),
                Err(PolicyError::InvalidSeeds)
            );
        }
        assert_eq!(
            create_program_address(&seeds, derived.bump, &INTERFACE_PROGRAM_ID),
            Ok(derived.address)
        );
    }
}

#[test]
fn test_verify_matches_reference() {
    let mint = [21u8; 32];
    let (address, bump) = reference_policy_pda(&mint, &SHIELD_PROGRAM_ID);
    assert_eq!(
        verify_policy_address(&mint, &address, bump, &INTERFACE_PROGRAM_ID),
        Ok(())
    );
}
