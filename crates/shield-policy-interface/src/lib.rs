//! Shield Policy Interface
//!
//! Client-side contract of the Shield program: where a mint's policy account
//! lives, how its bytes are laid out and versioned, and what each instruction
//! does to its size.
//!
//! # Architecture
//!
//! ```text
//! mint ──▶ seeds ──▶ derivation ──▶ policy address (pda)
//!                                        │
//!                                        ▼
//! account data ──▶ discriminator ──▶ layout (schema table) ──▶ account
//!                                                                │
//!                  instruction builders ◀── byte_delta ◀─────────┘
//! ```
//!
//! Everything here is pure and synchronous. Nothing performs I/O or holds
//! shared state, so all types are plain data and safe to use from any thread.
//!
//! # Modules
//!
//! - [`seeds`]: Seed schema (`["shield", "policy", mint]`)
//! - [`derivation`]: Program derived address search
//! - [`pda`]: Policy and associated token account addresses
//! - [`layout`]: Versioned header records and the schema table
//! - [`discriminator`]: Account kind recognition
//! - [`account`]: Decoded policy accounts and their mutations
//! - [`byte_delta`]: Per-instruction size and rent accounting
//! - [`instruction`]: Instruction data and account lists
//! - [`snapshot`]: Policy evaluation over a set of decoded accounts
//! - [`error`]: Policy error types
//! - [`program_ids`]: Program ID constants

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod account;
pub mod byte_delta;
pub mod derivation;
pub mod discriminator;
mod error;
pub mod instruction;
pub mod layout;
pub mod pda;
mod program_ids;
pub mod seeds;
pub mod snapshot;

pub use account::{PolicyAccount, ShieldAccount};
pub use byte_delta::InstructionByteDelta;
pub use derivation::DerivedAddress;
pub use discriminator::{AccountKind, SchemaVersion, discriminator_of};
pub use error::*;
pub use layout::{PermissionStrategy, size_of};
pub use pda::{find_policy_address, find_policy_address_with_program_id};
pub use program_ids::*;
pub use seeds::{PolicySeeds, SeedSet};
