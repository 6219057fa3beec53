//! Single source of truth for the program IDs the Shield policy contract uses.
//!
//! Program IDs are `&'static str` constants so they can be decoded at compile
//! time (see `shield-policy-interface::program_ids`) or parsed by off-chain
//! tooling without pulling in any Solana crate.
//!
//! # Usage
//!
//! ```rust,ignore
//! const SHIELD_PROGRAM_ID: Pubkey = five8_const::decode_32_const(shield_program_ids::SHIELD_ID);
//! ```

#![no_std]

// =============================================================================
// Shield Program ID
// =============================================================================

/// Shield policy program ID.
///
/// The program is deployed at the same address on every cluster. Alternate
/// deployments pass their own program ID to the `*_with_program_id` helpers.
pub const SHIELD_ID: &str = "b1ockYL7X6sGtJzueDbxRVBEEPN4YeqoLW276R3MX8W";

// =============================================================================
// Programs referenced by Shield instructions
// =============================================================================

/// System program ID.
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// SPL Token-2022 program ID. Policy mints are Token-2022 mints.
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

/// Associated token account program ID.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";
