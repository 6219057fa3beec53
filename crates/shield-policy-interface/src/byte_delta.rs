//! Instruction byte-delta and rent accounting.
//!
//! A byte delta is the policy account's post-instruction length minus its
//! pre-instruction length. Transaction builders use it to pre-fund storage;
//! nothing here touches account data.
//!
//! | Instruction       | Delta                                     |
//! |-------------------|-------------------------------------------|
//! | `CreatePolicy`    | `+size_of(policy, version)`               |
//! | `AddIdentity`     | `+32`, a new slot is always appended      |
//! | `RemoveIdentity`  | `0`                                       |
//! | `ReplaceIdentity` | `0`                                       |
//! | `ClosePolicy`     | `-current_len`                            |
//! | migration v1→v2   | `size_of(policy, 2) - size_of(policy, 1)` |
//!
//! Vacant slots are only refilled by `ReplaceIdentity`.

use crate::discriminator::{AccountKind, SchemaVersion};
use crate::error::{PolicyError, trace};
use crate::layout::{IDENTITY_LEN, size_of};

/// Signed change of an account's length caused by one instruction.
pub type InstructionByteDelta = i64;

/// Delta of `RemoveIdentity`; slots are vacated in place.
pub const REMOVE_IDENTITY_DELTA: InstructionByteDelta = 0;

/// Delta of `ReplaceIdentity`; slots are overwritten in place.
pub const REPLACE_IDENTITY_DELTA: InstructionByteDelta = 0;

// ============================================================================
// Rent parameters (cluster defaults)
// ============================================================================

/// Lamports charged per byte per year.
pub const LAMPORTS_PER_BYTE_YEAR: u64 = 3_480;

/// Years of rent an account must hold to be rent exempt.
pub const EXEMPTION_THRESHOLD_YEARS: u64 = 2;

/// Bytes of metadata the runtime charges for on top of account data.
pub const ACCOUNT_STORAGE_OVERHEAD: u64 = 128;

// ============================================================================
// Byte deltas
// ============================================================================

/// Delta between two account lengths.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if either length or their difference does
/// not fit in an [`InstructionByteDelta`].
pub fn size_delta(pre_len: usize, post_len: usize) -> Result<InstructionByteDelta, PolicyError> {
    let pre = to_delta(pre_len)?;
    let post = to_delta(post_len)?;
    let Some(delta) = post.checked_sub(pre) else {
        return Err(trace("delta overflow", PolicyError::ArithmeticOverflow));
    };
    Ok(delta)
}

/// Delta of `CreatePolicy` writing a `version` header into a fresh account.
pub const fn create_policy_delta(version: SchemaVersion) -> InstructionByteDelta {
    size_of(AccountKind::Policy, version) as InstructionByteDelta
}

/// Delta of `AddIdentity`. The program reallocates by one slot on every add.
pub const fn add_identity_delta() -> InstructionByteDelta {
    IDENTITY_LEN as InstructionByteDelta
}

/// Delta of migrating a v1 policy header to v2.
pub const fn migrate_policy_delta() -> InstructionByteDelta {
    create_policy_delta(SchemaVersion::V2) - create_policy_delta(SchemaVersion::V1)
}

/// Delta of `ClosePolicy` on an account currently `current_len` bytes long.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if `current_len` does not fit in an
/// [`InstructionByteDelta`].
pub fn close_policy_delta(current_len: usize) -> Result<InstructionByteDelta, PolicyError> {
    size_delta(current_len, 0)
}

fn to_delta(len: usize) -> Result<InstructionByteDelta, PolicyError> {
    let Ok(delta) = InstructionByteDelta::try_from(len) else {
        return Err(trace("length overflow", PolicyError::ArithmeticOverflow));
    };
    Ok(delta)
}

// ============================================================================
// Rent
// ============================================================================

/// Rent-exempt minimum balance for an account holding `data_len` bytes.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if the balance does not fit in a `u64`.
pub fn minimum_balance(data_len: usize) -> Result<u64, PolicyError> {
    let Some(lamports) = (data_len as u64)
        .checked_add(ACCOUNT_STORAGE_OVERHEAD)
        .and_then(|bytes| bytes.checked_mul(LAMPORTS_PER_BYTE_YEAR))
        .and_then(|total| total.checked_mul(EXEMPTION_THRESHOLD_YEARS))
    else {
        return Err(trace("balance overflow", PolicyError::ArithmeticOverflow));
    };
    Ok(lamports)
}

/// Lamports the payer funds (positive) or receives back (negative) when an
/// account moves from `pre_len` to `post_len`.
///
/// `None` means the account does not exist on that side and holds nothing.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if either minimum balance overflows.
pub fn rent_delta(pre_len: Option<usize>, post_len: Option<usize>) -> Result<i128, PolicyError> {
    let balance = |len: Option<usize>| -> Result<i128, PolicyError> {
        let lamports = len.map(minimum_balance).transpose()?;
        Ok(lamports.map_or(0, i128::from))
    };
    Ok(balance(post_len)? - balance(pre_len)?)
}
