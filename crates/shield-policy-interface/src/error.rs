//! Policy error types.

use core::fmt;

use num_enum::TryFromPrimitive;
use pinocchio::program_error::ProgramError;

/// Error codes surfaced by the Shield policy contract.
///
/// Codes are stable: clients match on them across versions. Every failure is
/// local and synchronous, and no operation leaves partially written state
/// behind when it returns one of these.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, strum::IntoStaticStr)]
pub enum PolicyError {
    /// No bump in `[0, 255]` produced an off-curve address
    BumpSeedExhausted = 0,

    /// Account data length disagrees with the size its schema revision mandates
    LayoutMismatch = 1,

    /// Leading tag matches no registered account kind
    UnknownDiscriminator = 2,

    /// A seed is longer than 32 bytes or too many seeds were supplied
    MaxSeedLengthExceeded = 3,

    /// Seeds and bump derive an on-curve (signable) address
    InvalidSeeds = 4,

    /// Stored permission strategy is neither allow nor deny
    InvalidStrategy = 5,

    /// Identity index points outside the account's identity slots
    InvalidIndexToReferenceIdentity = 6,

    /// Referenced identity slot is vacant
    IdentityNotFound = 7,

    /// Instruction data could not be decoded
    InvalidInstructionData = 8,

    /// Arithmetic overflow in size accounting
    ArithmeticOverflow = 9,

    /// Policy address is not part of the evaluated snapshot
    PolicyNotFound = 10,

    /// Account already uses the latest schema revision
    AlreadyMigrated = 11,
}

impl PolicyError {
    /// Convert to error code
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    /// Create from error code
    pub fn from_u32(code: u32) -> Option<Self> {
        Self::try_from(code).ok()
    }

    /// Variant name, used in log lines.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::BumpSeedExhausted => "unable to find a viable program address bump seed",
            Self::LayoutMismatch => "account data length does not match its schema revision",
            Self::UnknownDiscriminator => "account discriminator matches no registered kind",
            Self::MaxSeedLengthExceeded => "max seed length exceeded",
            Self::InvalidSeeds => "provided seeds do not result in a valid address",
            Self::InvalidStrategy => "invalid permission strategy",
            Self::InvalidIndexToReferenceIdentity => "invalid index to reference identity",
            Self::IdentityNotFound => "identity not found",
            Self::InvalidInstructionData => "invalid instruction data",
            Self::ArithmeticOverflow => "arithmetic overflow",
            Self::PolicyNotFound => "policy not found",
            Self::AlreadyMigrated => "policy already uses the latest schema revision",
        };
        f.write_str(message)
    }
}

impl From<PolicyError> for ProgramError {
    fn from(e: PolicyError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

/// Logs the error name, a short reason and the call site, then returns the error.
#[track_caller]
pub(crate) fn trace(msg: &str, error: PolicyError) -> PolicyError {
    let caller = core::panic::Location::caller();
    pinocchio_log::log!(
        "{}: {} @ {}:{}",
        error.name(),
        msg,
        caller.file(),
        caller.line()
    );
    error
}
