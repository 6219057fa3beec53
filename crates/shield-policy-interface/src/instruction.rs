//! Shield instruction data and account lists.
//!
//! Instruction data is a one-byte variant index followed by the variant's
//! fields, little-endian, with no padding or trailing bytes:
//!
//! ```text
//! CreatePolicy     [0, strategy u8]
//! AddIdentity      [1, identity [u8; 32]]
//! RemoveIdentity   [2, index u64]
//! ReplaceIdentity  [3, index u64, identity [u8; 32]]
//! ClosePolicy      [4]
//! ```
//!
//! The owner authorizes every instruction by holding a positive balance in
//! its Token-2022 associated token account for the policy's mint.

use alloc::vec::Vec;

use num_enum::TryFromPrimitive;
use pinocchio::pubkey::Pubkey;

use crate::derivation::DerivedAddress;
use crate::error::{PolicyError, trace};
use crate::layout::{IDENTITY_LEN, PermissionStrategy};
use crate::pda::{find_associated_token_address, find_policy_address_with_program_id};
use crate::program_ids::{SHIELD_PROGRAM_ID, SYSTEM_PROGRAM_ID};

// ============================================================================
// Instruction data
// ============================================================================

/// Variant index of each Shield instruction.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, strum::IntoStaticStr)]
pub enum InstructionTag {
    /// Create a policy account for a mint
    CreatePolicy = 0,
    /// Add an identity to a policy
    AddIdentity = 1,
    /// Vacate an identity slot
    RemoveIdentity = 2,
    /// Overwrite an identity slot
    ReplaceIdentity = 3,
    /// Close a policy and reclaim its rent
    ClosePolicy = 4,
}

impl InstructionTag {
    /// Convert to u8 for instruction data
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Decoded Shield instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShieldInstruction {
    /// Create a policy account for a mint.
    CreatePolicy {
        /// How the policy treats listed identities
        strategy: PermissionStrategy,
    },
    /// Add an identity to the policy.
    AddIdentity {
        /// Identity to list
        identity: Pubkey,
    },
    /// Vacate the identity slot at `index`.
    RemoveIdentity {
        /// Slot index
        index: u64,
    },
    /// Overwrite the identity slot at `index`.
    ReplaceIdentity {
        /// Slot index
        index: u64,
        /// New identity
        identity: Pubkey,
    },
    /// Close the policy.
    ClosePolicy,
}

impl ShieldInstruction {
    /// Variant index.
    pub const fn tag(&self) -> InstructionTag {
        match self {
            Self::CreatePolicy { .. } => InstructionTag::CreatePolicy,
            Self::AddIdentity { .. } => InstructionTag::AddIdentity,
            Self::RemoveIdentity { .. } => InstructionTag::RemoveIdentity,
            Self::ReplaceIdentity { .. } => InstructionTag::ReplaceIdentity,
            Self::ClosePolicy => InstructionTag::ClosePolicy,
        }
    }

    /// Serialize to instruction data.
    pub fn pack(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(1 + 8 + IDENTITY_LEN);
        data.push(self.tag().to_u8());
        match self {
            Self::CreatePolicy { strategy } => data.push((*strategy).into()),
            Self::AddIdentity { identity } => data.extend_from_slice(identity),
            Self::RemoveIdentity { index } => data.extend_from_slice(&index.to_le_bytes()),
            Self::ReplaceIdentity { index, identity } => {
                data.extend_from_slice(&index.to_le_bytes());
                data.extend_from_slice(identity);
            }
            Self::ClosePolicy => {}
        }
        data
    }

    /// Parse instruction data. Trailing bytes are rejected.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInstructionData` for empty data, an unknown tag, or a
    /// field of the wrong length, and `InvalidStrategy` for an unknown
    /// strategy byte.
    pub fn unpack(data: &[u8]) -> Result<Self, PolicyError> {
        let Some((&tag, rest)) = data.split_first() else {
            return Err(trace("empty data", PolicyError::InvalidInstructionData));
        };
        let Ok(tag) = InstructionTag::try_from(tag) else {
            return Err(trace("unknown tag", PolicyError::InvalidInstructionData));
        };

        let instruction = match tag {
            InstructionTag::CreatePolicy => {
                let [strategy] = fixed::<1>(rest)?;
                Self::CreatePolicy {
                    strategy: PermissionStrategy::from_u8(strategy)?,
                }
            }
            InstructionTag::AddIdentity => Self::AddIdentity {
                identity: fixed::<IDENTITY_LEN>(rest)?,
            },
            InstructionTag::RemoveIdentity => Self::RemoveIdentity {
                index: u64::from_le_bytes(fixed::<8>(rest)?),
            },
            InstructionTag::ReplaceIdentity => {
                let Some((index, identity)) = rest.split_at_checked(8) else {
                    return Err(trace("short data", PolicyError::InvalidInstructionData));
                };
                Self::ReplaceIdentity {
                    index: u64::from_le_bytes(fixed::<8>(index)?),
                    identity: fixed::<IDENTITY_LEN>(identity)?,
                }
            }
            InstructionTag::ClosePolicy => {
                fixed::<0>(rest)?;
                Self::ClosePolicy
            }
        };
        Ok(instruction)
    }
}

/// Read exactly `N` bytes.
fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], PolicyError> {
    let Ok(field) = <[u8; N]>::try_from(bytes) else {
        return Err(trace("field size", PolicyError::InvalidInstructionData));
    };
    Ok(field)
}

// ============================================================================
// Account Layout Constants
// ============================================================================

/// Account indices for `CreatePolicy`, `AddIdentity` and `ClosePolicy`.
///
/// Account layout (6 accounts):
/// 0. mint - Token-2022 mint the policy belongs to
/// 1. token_account - Owner's associated token account for the mint
/// 2. policy (mut) - Policy PDA
/// 3. payer (mut, signer) - Funds rent, receives it back on close
/// 4. owner (mut, signer) - Holder of the token account
/// 5. system_program - System program
pub mod payer_accounts {
    /// Mint account
    pub const MINT: usize = 0;
    /// Owner's token account
    pub const TOKEN_ACCOUNT: usize = 1;
    /// Policy account (writable)
    pub const POLICY: usize = 2;
    /// Rent payer (writable, signer)
    pub const PAYER: usize = 3;
    /// Policy owner (writable, signer)
    pub const OWNER: usize = 4;
    /// System program
    pub const SYSTEM_PROGRAM: usize = 5;
    /// Total number of accounts
    pub const COUNT: usize = 6;
}

/// Account indices for `RemoveIdentity` and `ReplaceIdentity`.
///
/// Account layout (4 accounts):
/// 0. mint
/// 1. token_account
/// 2. policy (mut)
/// 3. owner (mut, signer)
pub mod owner_accounts {
    /// Mint account
    pub const MINT: usize = 0;
    /// Owner's token account
    pub const TOKEN_ACCOUNT: usize = 1;
    /// Policy account (writable)
    pub const POLICY: usize = 2;
    /// Policy owner (writable, signer)
    pub const OWNER: usize = 3;
    /// Total number of accounts
    pub const COUNT: usize = 4;
}

// ============================================================================
// Instruction builders
// ============================================================================

/// Account reference of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountMeta {
    /// Account address
    pub pubkey: Pubkey,
    /// Whether the account signs the transaction
    pub is_signer: bool,
    /// Whether the instruction may write the account
    pub is_writable: bool,
}

impl AccountMeta {
    /// Read-only, non-signer account.
    pub const fn readonly(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            is_signer: false,
            is_writable: false,
        }
    }

    /// Writable, non-signer account.
    pub const fn writable(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            is_signer: false,
            is_writable: true,
        }
    }

    /// Writable signer.
    pub const fn writable_signer(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            is_signer: true,
            is_writable: true,
        }
    }
}

/// A fully built instruction, ready to be placed in a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Program that executes the instruction
    pub program_id: Pubkey,
    /// Accounts in program order
    pub accounts: Vec<AccountMeta>,
    /// Packed [`ShieldInstruction`]
    pub data: Vec<u8>,
}

/// `CreatePolicy` instruction together with the policy address it creates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatePolicy {
    /// Built instruction
    pub instruction: Instruction,
    /// Derived policy address and bump
    pub policy: DerivedAddress,
}

/// Builds Shield instructions for one program deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstructionBuilder {
    program_id: Pubkey,
}

impl Default for InstructionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InstructionBuilder {
    /// Builder for the default Shield deployment.
    pub const fn new() -> Self {
        Self::with_program_id(SHIELD_PROGRAM_ID)
    }

    /// Builder for an alternate deployment.
    pub const fn with_program_id(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    /// Program ID placed in built instructions.
    pub const fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// Derive the policy PDA of `mint` for this deployment.
    ///
    /// # Errors
    ///
    /// Returns `BumpSeedExhausted` if no bump yields an off-curve address.
    pub fn policy_address(&self, mint: &Pubkey) -> Result<DerivedAddress, PolicyError> {
        find_policy_address_with_program_id(mint, &self.program_id)
    }

    /// Build `CreatePolicy`. The owner pays when `payer` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `BumpSeedExhausted` if the policy or token account address
    /// cannot be derived. The same holds for every other builder.
    pub fn create_policy(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
        payer: Option<&Pubkey>,
        strategy: PermissionStrategy,
    ) -> Result<CreatePolicy, PolicyError> {
        let policy = self.policy_address(mint)?;
        let accounts = self.payer_accounts(mint, &policy.address, owner, payer)?;
        let instruction = self.build(accounts, ShieldInstruction::CreatePolicy { strategy });
        Ok(CreatePolicy {
            instruction,
            policy,
        })
    }

    /// Build `AddIdentity`. The owner pays when `payer` is `None`.
    ///
    /// # Errors
    ///
    /// See [`Self::create_policy`].
    pub fn add_identity(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
        payer: Option<&Pubkey>,
        identity: &Pubkey,
    ) -> Result<Instruction, PolicyError> {
        let policy = self.policy_address(mint)?;
        let accounts = self.payer_accounts(mint, &policy.address, owner, payer)?;
        let instruction = ShieldInstruction::AddIdentity {
            identity: *identity,
        };
        Ok(self.build(accounts, instruction))
    }

    /// Build `RemoveIdentity` for the slot at `index`.
    ///
    /// # Errors
    ///
    /// See [`Self::create_policy`].
    pub fn remove_identity(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
        index: u64,
    ) -> Result<Instruction, PolicyError> {
        let policy = self.policy_address(mint)?;
        let accounts = self.owner_accounts(mint, &policy.address, owner)?;
        let instruction = ShieldInstruction::RemoveIdentity { index };
        Ok(self.build(accounts, instruction))
    }

    /// Build `ReplaceIdentity` for the slot at `index`.
    ///
    /// # Errors
    ///
    /// See [`Self::create_policy`].
    pub fn replace_identity(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
        index: u64,
        identity: &Pubkey,
    ) -> Result<Instruction, PolicyError> {
        let policy = self.policy_address(mint)?;
        let accounts = self.owner_accounts(mint, &policy.address, owner)?;
        let instruction = ShieldInstruction::ReplaceIdentity {
            index,
            identity: *identity,
        };
        Ok(self.build(accounts, instruction))
    }

    /// Build `ClosePolicy`. Rent returns to `payer`, or the owner when `None`.
    ///
    /// # Errors
    ///
    /// See [`Self::create_policy`].
    pub fn close_policy(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
        payer: Option<&Pubkey>,
    ) -> Result<Instruction, PolicyError> {
        let policy = self.policy_address(mint)?;
        let accounts = self.payer_accounts(mint, &policy.address, owner, payer)?;
        Ok(self.build(accounts, ShieldInstruction::ClosePolicy))
    }

    fn build(&self, accounts: Vec<AccountMeta>, instruction: ShieldInstruction) -> Instruction {
        Instruction {
            program_id: self.program_id,
            accounts,
            data: instruction.pack(),
        }
    }

    fn payer_accounts(
        &self,
        mint: &Pubkey,
        policy: &Pubkey,
        owner: &Pubkey,
        payer: Option<&Pubkey>,
    ) -> Result<Vec<AccountMeta>, PolicyError> {
        let token_account = find_associated_token_address(owner, mint)?;
        Ok(alloc::vec![
            AccountMeta::readonly(*mint),
            AccountMeta::readonly(token_account.address),
            AccountMeta::writable(*policy),
            AccountMeta::writable_signer(*payer.unwrap_or(owner)),
            AccountMeta::writable_signer(*owner),
            AccountMeta::readonly(SYSTEM_PROGRAM_ID),
        ])
    }

    fn owner_accounts(
        &self,
        mint: &Pubkey,
        policy: &Pubkey,
        owner: &Pubkey,
    ) -> Result<Vec<AccountMeta>, PolicyError> {
        let token_account = find_associated_token_address(owner, mint)?;
        Ok(alloc::vec![
            AccountMeta::readonly(*mint),
            AccountMeta::readonly(token_account.address),
            AccountMeta::writable(*policy),
            AccountMeta::writable_signer(*owner),
        ])
    }
}
