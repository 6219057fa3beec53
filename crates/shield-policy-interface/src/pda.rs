//! Program Derived Address (PDA) helpers
//!
//! All PDAs are derived using standardized seeds for each account type.
//!
//! - Policy: `["shield", "policy", mint]` under the Shield program
//! - Associated token account: `[owner, token_program, mint]` under the
//!   associated token account program

use pinocchio::pubkey::Pubkey;

use crate::derivation::{DerivedAddress, create_program_address, find_program_address};
use crate::error::{PolicyError, trace};
use crate::program_ids::{ASSOCIATED_TOKEN_PROGRAM_ID, SHIELD_PROGRAM_ID, TOKEN_2022_PROGRAM_ID};
use crate::seeds::{PolicySeeds, SeedSet};

/// Derive the policy PDA for `mint` under the default Shield program.
///
/// # Errors
///
/// Returns `BumpSeedExhausted` if no bump yields an off-curve address.
pub fn find_policy_address(mint: &Pubkey) -> Result<DerivedAddress, PolicyError> {
    find_policy_address_with_program_id(mint, &SHIELD_PROGRAM_ID)
}

/// Derive the policy PDA for `mint` under an alternate deployment.
///
/// # Errors
///
/// Returns `BumpSeedExhausted` if no bump yields an off-curve address.
pub fn find_policy_address_with_program_id(
    mint: &Pubkey,
    program_id: &Pubkey,
) -> Result<DerivedAddress, PolicyError> {
    let seeds = PolicySeeds { mint: *mint }.to_seed_set();
    find_program_address(&seeds, program_id)
}

/// Check that `address` is the policy PDA of `mint` for the given bump.
///
/// # Errors
///
/// Returns `InvalidSeeds` when the address does not match, including when the
/// bump produces an on-curve candidate.
pub fn verify_policy_address(
    mint: &Pubkey,
    address: &Pubkey,
    bump: u8,
    program_id: &Pubkey,
) -> Result<(), PolicyError> {
    let seeds = PolicySeeds { mint: *mint }.to_seed_set();
    let expected = create_program_address(&seeds, bump, program_id)?;
    if expected != *address {
        return Err(trace("address mismatch", PolicyError::InvalidSeeds));
    }
    Ok(())
}

/// Derive the Token-2022 associated token account of `owner` for `mint`.
///
/// Instructions authorize the owner through this account's token balance.
///
/// # Errors
///
/// Returns `BumpSeedExhausted` if no bump yields an off-curve address.
pub fn find_associated_token_address(
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<DerivedAddress, PolicyError> {
    let seeds = SeedSet::new(&[&owner[..], &TOKEN_2022_PROGRAM_ID[..], &mint[..]])?;
    find_program_address(&seeds, &ASSOCIATED_TOKEN_PROGRAM_ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_address_is_deterministic() {
        let mint = [42u8; 32];
        let first = find_policy_address(&mint).unwrap();
        let second = find_policy_address(&mint).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_default_program_id_is_used() {
        let mint = [42u8; 32];
        assert_eq!(
            find_policy_address(&mint),
            find_policy_address_with_program_id(&mint, &SHIELD_PROGRAM_ID)
        );
    }

    #[test]
    fn test_program_id_changes_address() {
        let mint = [42u8; 32];
        let default = find_policy_address(&mint).unwrap();
        let other = find_policy_address_with_program_id(&mint, &[1u8; 32]);
        assert_ne!(default.address, other.unwrap().address);
    }

    #[test]
    fn test_verify_policy_address() {
        let mint = [8u8; 32];
        let DerivedAddress { address, bump } = find_policy_address(&mint).unwrap();
        assert_eq!(
            verify_policy_address(&mint, &address, bump, &SHIELD_PROGRAM_ID),
            Ok(())
        );
        assert_eq!(
            verify_policy_address(&[9u8; 32], &address, bump, &SHIELD_PROGRAM_ID),
            Err(PolicyError::InvalidSeeds)
        );
    }

    #[test]
    fn test_associated_token_address_depends_on_owner() {
        let mint = [1u8; 32];
        let a = find_associated_token_address(&[2u8; 32], &mint).unwrap();
        let b = find_associated_token_address(&[3u8; 32], &mint).unwrap();
        assert_ne!(a.address, b.address);
    }
}
