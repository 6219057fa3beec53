//! Shared helpers for integration tests.

#![allow(dead_code)]

use rand::{Rng, SeedableRng, rngs::StdRng};
use solana_pubkey::Pubkey;

/// Shield program ID (from centralized shield-program-ids crate)
const SHIELD_ID_BYTES: [u8; 32] = five8_const::decode_32_const(shield_program_ids::SHIELD_ID);
pub const SHIELD_PROGRAM_ID: Pubkey = Pubkey::new_from_array(SHIELD_ID_BYTES);

/// Policy PDA seeds (must match src/seeds.rs)
pub const SHIELD_SEED: &[u8] = b"shield";
pub const POLICY_SEED: &[u8] = b"policy";

/// Reference derivation of the policy PDA.
pub fn reference_policy_pda(mint: &[u8; 32], program_id: &Pubkey) -> ([u8; 32], u8) {
    let (address, bump) =
        Pubkey::find_program_address(&[SHIELD_SEED, POLICY_SEED, mint.as_ref()], program_id);
    (address.to_bytes(), bump)
}

/// Deterministic RNG so failures reproduce.
pub fn rng() -> StdRng {
    StdRng::seed_from_u64(0x5e1d)
}

/// Random 32-byte identity.
pub fn random_identity(rng: &mut StdRng) -> [u8; 32] {
    rng.r#gen()
}
