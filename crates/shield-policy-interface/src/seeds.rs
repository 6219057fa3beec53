//! Seed schema for Shield program derived addresses.
//!
//! Seed order and encoding are part of the wire contract: changing either
//! changes every derived policy address.

use alloc::vec::Vec;

use pinocchio::pubkey::Pubkey;

use crate::error::{PolicyError, trace};

/// Namespace seed shared by every Shield PDA.
pub const SHIELD_SEED: &[u8] = b"shield";

/// Kind seed for policy accounts.
pub const POLICY_SEED: &[u8] = b"policy";

/// Maximum length of a single seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds, including the bump.
pub const MAX_SEEDS: usize = 16;

/// Ordered list of seed byte strings.
///
/// Holds at most `MAX_SEEDS - 1` seeds so the bump always fits.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SeedSet {
    seeds: Vec<Vec<u8>>,
}

impl SeedSet {
    /// Build a seed set from raw seeds, enforcing the runtime's seed limits.
    ///
    /// # Errors
    ///
    /// Returns `MaxSeedLengthExceeded` if a seed is longer than
    /// [`MAX_SEED_LEN`] or the seeds leave no room for the bump.
    pub fn new(seeds: &[&[u8]]) -> Result<Self, PolicyError> {
        if seeds.len() >= MAX_SEEDS {
            return Err(trace("seed count", PolicyError::MaxSeedLengthExceeded));
        }
        if seeds.iter().any(|seed| seed.len() > MAX_SEED_LEN) {
            return Err(trace("long seed", PolicyError::MaxSeedLengthExceeded));
        }

        Ok(Self {
            seeds: seeds.iter().map(|seed| seed.to_vec()).collect(),
        })
    }

    /// Number of seeds, excluding the bump.
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    /// Returns true if the set holds no seeds.
    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    /// Iterate over the seeds in derivation order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.seeds.iter().map(Vec::as_slice)
    }
}

/// Variable inputs of the policy PDA.
///
/// Seeds: `["shield", "policy", mint]`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PolicySeeds {
    /// The Token-2022 mint the policy belongs to
    pub mint: Pubkey,
}

impl PolicySeeds {
    /// Seeds in derivation order, without the bump.
    pub fn as_slices(&self) -> [&[u8]; 3] {
        [SHIELD_SEED, POLICY_SEED, self.mint.as_ref()]
    }

    /// Build the ordered seed set.
    pub fn to_seed_set(&self) -> SeedSet {
        // Three seeds of at most 32 bytes each always satisfy the limits.
        SeedSet {
            seeds: self.as_slices().iter().map(|seed| seed.to_vec()).collect(),
        }
    }
}
