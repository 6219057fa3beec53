//! Program ID constants.
//!
//! These program IDs are imported from the central `shield-program-ids` crate,
//! which is the single source of truth for all program addresses.

use pinocchio::pubkey::Pubkey;

// =============================================================================
// Program IDs (imported from shield-program-ids crate)
// =============================================================================

/// Shield policy program ID.
///
/// Default program identity for every derivation helper in this crate.
pub const SHIELD_PROGRAM_ID: Pubkey = five8_const::decode_32_const(shield_program_ids::SHIELD_ID);

/// System program ID.
pub const SYSTEM_PROGRAM_ID: Pubkey =
    five8_const::decode_32_const(shield_program_ids::SYSTEM_PROGRAM_ID);

/// SPL Token-2022 program ID.
pub const TOKEN_2022_PROGRAM_ID: Pubkey =
    pinocchio_pubkey::pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

/// Associated token account program ID.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    pinocchio_pubkey::pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Check if a program ID is the Shield program compiled into this crate.
pub fn is_shield_program(program_id: &Pubkey) -> bool {
    *program_id == SHIELD_PROGRAM_ID
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_program_is_zero() {
        assert_eq!(SYSTEM_PROGRAM_ID, [0u8; 32]);
    }

    #[test]
    fn test_token_ids_match_id_crate() {
        assert_eq!(
            TOKEN_2022_PROGRAM_ID,
            five8_const::decode_32_const(shield_program_ids::TOKEN_2022_PROGRAM_ID)
        );
        assert_eq!(
            ASSOCIATED_TOKEN_PROGRAM_ID,
            five8_const::decode_32_const(shield_program_ids::ASSOCIATED_TOKEN_PROGRAM_ID)
        );
    }

    #[test]
    fn test_is_shield_program() {
        assert!(is_shield_program(&SHIELD_PROGRAM_ID));
        assert!(!is_shield_program(&SYSTEM_PROGRAM_ID));
    }
}
