//! Off-chain program derived address (PDA) derivation.
//!
//! Mirrors the runtime's `find_program_address` so clients compute the same
//! address the program validates:
//!
//! ```text
//! candidate = sha256(seed_0 || .. || seed_n || [bump] || program_id || "ProgramDerivedAddress")
//! ```
//!
//! Bumps are scanned from 255 down to 0 and the first candidate that is not a
//! valid Ed25519 point wins. The scan order is part of the contract: changing
//! it could select a different canonical bump for already-deployed accounts.

use ed25519_dalek::VerifyingKey;
use pinocchio::pubkey::Pubkey;
use sha2::{Digest, Sha256};

use crate::error::{PolicyError, trace};
use crate::seeds::{MAX_SEEDS, SeedSet};

/// Marker appended to every PDA hash preimage.
pub const PDA_MARKER: &[u8; 21] = b"ProgramDerivedAddress";

/// A derived address together with the bump that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DerivedAddress {
    /// Off-curve program address
    pub address: Pubkey,
    /// Canonical bump seed
    pub bump: u8,
}

impl From<DerivedAddress> for (Pubkey, u8) {
    fn from(derived: DerivedAddress) -> Self {
        (derived.address, derived.bump)
    }
}

/// Hash function and curve test used by address derivation.
///
/// Production code uses [`Ed25519Sha256`]. The trait exists so tests can
/// substitute a backend that never produces an off-curve candidate.
pub trait DerivationBackend {
    /// Hash the concatenation of `parts` into a 32-byte candidate.
    fn hash(&self, parts: &[&[u8]]) -> [u8; 32];

    /// Returns true if `candidate` decodes to a point on the signing curve.
    fn is_on_curve(&self, candidate: &[u8; 32]) -> bool;
}

/// SHA-256 candidates tested against the edwards25519 curve.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Sha256;

impl DerivationBackend for Ed25519Sha256 {
    fn hash(&self, parts: &[&[u8]]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize().into()
    }

    fn is_on_curve(&self, candidate: &[u8; 32]) -> bool {
        VerifyingKey::from_bytes(candidate).is_ok()
    }
}

/// Compute the candidate address for one bump, rejecting on-curve results.
fn candidate<B: DerivationBackend>(
    backend: &B,
    seeds: &SeedSet,
    bump: u8,
    program_id: &Pubkey,
) -> Option<Pubkey> {
    let bump = [bump];
    let mut parts: [&[u8]; MAX_SEEDS + 2] = [&[]; MAX_SEEDS + 2];
    let mut count = 0;
    for seed in seeds.iter() {
        parts[count] = seed;
        count += 1;
    }
    parts[count] = &bump;
    parts[count + 1] = program_id.as_ref();
    parts[count + 2] = PDA_MARKER;
    count += 3;

    let address = backend.hash(&parts[..count]);
    if backend.is_on_curve(&address) {
        None
    } else {
        Some(address)
    }
}

/// Derive the canonical program address for `seeds` under `program_id`.
///
/// # Errors
///
/// Returns `BumpSeedExhausted` if every bump yields an on-curve candidate.
pub fn find_program_address(
    seeds: &SeedSet,
    program_id: &Pubkey,
) -> Result<DerivedAddress, PolicyError> {
    find_program_address_with(&Ed25519Sha256, seeds, program_id)
}

/// Derive the canonical program address using an explicit backend.
///
/// # Errors
///
/// Returns `BumpSeedExhausted` if every bump yields an on-curve candidate.
pub fn find_program_address_with<B: DerivationBackend>(
    backend: &B,
    seeds: &SeedSet,
    program_id: &Pubkey,
) -> Result<DerivedAddress, PolicyError> {
    for bump in (0..=u8::MAX).rev() {
        if let Some(address) = candidate(backend, seeds, bump, program_id) {
            return Ok(DerivedAddress { address, bump });
        }
    }

    Err(trace(
        "no off-curve candidate in bump range",
        PolicyError::BumpSeedExhausted,
    ))
}

/// Compute the program address for a known bump.
///
/// # Errors
///
/// Returns `InvalidSeeds` if the candidate lies on the curve.
pub fn create_program_address(
    seeds: &SeedSet,
    bump: u8,
    program_id: &Pubkey,
) -> Result<Pubkey, PolicyError> {
    let Some(address) = candidate(&Ed25519Sha256, seeds, bump, program_id) else {
        return Err(trace("candidate on curve", PolicyError::InvalidSeeds));
    };
    Ok(address)
}
