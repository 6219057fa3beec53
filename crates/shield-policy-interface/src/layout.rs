//! Policy account layouts.
//!
//! # Layout
//!
//! ```text
//! v1 (7 bytes)   kind u8 | strategy u8 | bump u8 | identities_len [u8; 4]
//! v2 (39 bytes)  kind u8 | strategy u8 | bump u8 | mint [u8; 32] | identities_len [u8; 4]
//! ```
//!
//! The header is followed by zero or more 32-byte identity slots. A zeroed
//! slot is vacant. `identities_len` is little-endian and counts occupied
//! slots only.
//!
//! Every revision is a row in [`SCHEMA`]; adding a revision means adding a
//! row and its record type, not a new decoding path.

use bytemuck::{Pod, Zeroable};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use pinocchio::pubkey::Pubkey;

use crate::discriminator::{self, AccountKind, POLICY_V1_TAG, POLICY_V2_TAG, SchemaVersion};
use crate::error::{PolicyError, trace};

/// Size of one identity slot.
pub const IDENTITY_LEN: usize = 32;

/// Size of the `identities_len` counter.
pub const IDENTITIES_LEN_SIZE: usize = 4;

// ============================================================================
// Schema table
// ============================================================================

/// One revision of an account kind's byte layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchemaRevision {
    /// Account kind this revision belongs to
    pub kind: AccountKind,
    /// Revision number
    pub version: SchemaVersion,
    /// Discriminator stored at offset 0
    pub tag: u8,
    /// Exact header length in bytes
    pub header_len: usize,
    /// Offset of the little-endian `identities_len` counter
    pub identities_len_offset: usize,
}

/// Policy header without owner mint.
pub const POLICY_V1: SchemaRevision = SchemaRevision {
    kind: AccountKind::Policy,
    version: SchemaVersion::V1,
    tag: POLICY_V1_TAG,
    header_len: PolicyV1::SIZE,
    identities_len_offset: 3,
};

/// Policy header with owner mint.
pub const POLICY_V2: SchemaRevision = SchemaRevision {
    kind: AccountKind::Policy,
    version: SchemaVersion::V2,
    tag: POLICY_V2_TAG,
    header_len: PolicyV2::SIZE,
    identities_len_offset: 3 + IDENTITY_LEN,
};

/// Every registered revision. Tags are unique across the table.
pub const SCHEMA: &[SchemaRevision] = &[POLICY_V1, POLICY_V2];

/// Look up the row for `(kind, version)`.
pub const fn revision(kind: AccountKind, version: SchemaVersion) -> &'static SchemaRevision {
    match (kind, version) {
        (AccountKind::Policy, SchemaVersion::V1) => &POLICY_V1,
        (AccountKind::Policy, SchemaVersion::V2) => &POLICY_V2,
    }
}

/// Look up the row whose discriminator is `tag`.
pub fn revision_by_tag(tag: u8) -> Option<&'static SchemaRevision> {
    SCHEMA.iter().find(|revision| revision.tag == tag)
}

/// Exact header size of `(kind, version)`.
pub const fn size_of(kind: AccountKind, version: SchemaVersion) -> usize {
    revision(kind, version).header_len
}

/// Total account length for a header plus `slots` identity slots.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if the length does not fit in a `usize`.
pub fn account_len(
    kind: AccountKind,
    version: SchemaVersion,
    slots: usize,
) -> Result<usize, PolicyError> {
    let Some(len) = slots
        .checked_mul(IDENTITY_LEN)
        .and_then(|bytes| bytes.checked_add(size_of(kind, version)))
    else {
        return Err(trace("length overflow", PolicyError::ArithmeticOverflow));
    };
    Ok(len)
}

// ============================================================================
// Permission strategy
// ============================================================================

/// How a policy treats the identities it lists.
#[repr(u8)]
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, strum::IntoStaticStr,
)]
pub enum PermissionStrategy {
    /// Listed identities are denied
    Deny = 0,
    /// Listed identities are allowed
    Allow = 1,
}

impl PermissionStrategy {
    /// Parse a stored strategy byte.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStrategy` for any byte other than `0` or `1`.
    pub fn from_u8(value: u8) -> Result<Self, PolicyError> {
        let Ok(strategy) = Self::try_from(value) else {
            return Err(trace("unknown strategy", PolicyError::InvalidStrategy));
        };
        Ok(strategy)
    }
}

// ============================================================================
// Header records
// ============================================================================

/// First policy header revision.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct PolicyV1 {
    /// Discriminator (`POLICY_V1_TAG`)
    pub kind: u8,
    /// [`PermissionStrategy`] byte
    pub strategy: u8,
    /// Canonical bump of the policy address
    pub bump: u8,
    /// Occupied identity slots, little-endian
    pub identities_len: [u8; IDENTITIES_LEN_SIZE],
}

impl PolicyV1 {
    /// Size of serialized header
    pub const SIZE: usize = 7;

    /// Build a header with no identities.
    pub fn new(strategy: PermissionStrategy, bump: u8) -> Self {
        Self {
            kind: POLICY_V1_TAG,
            strategy: strategy.into(),
            bump,
            identities_len: [0; IDENTITIES_LEN_SIZE],
        }
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes.copy_from_slice(bytemuck::bytes_of(self));
        bytes
    }

    /// Deserialize from a blob of exactly [`Self::SIZE`] bytes.
    ///
    /// # Errors
    ///
    /// Returns `UnknownDiscriminator` for an unregistered tag,
    /// `LayoutMismatch` for another revision's tag or a wrong length, and
    /// `InvalidStrategy` for an unknown strategy byte.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PolicyError> {
        let header: Self = decode_exact(bytes, &POLICY_V1)?;
        PermissionStrategy::from_u8(header.strategy)?;
        Ok(header)
    }

    /// Occupied identity count.
    pub fn identities_len(&self) -> u32 {
        u32::from_le_bytes(self.identities_len)
    }
}

/// Second policy header revision. A strict superset of [`PolicyV1`].
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct PolicyV2 {
    /// Discriminator (`POLICY_V2_TAG`)
    pub kind: u8,
    /// [`PermissionStrategy`] byte
    pub strategy: u8,
    /// Canonical bump of the policy address
    pub bump: u8,
    /// Mint the policy belongs to
    pub mint: Pubkey,
    /// Occupied identity slots, little-endian
    pub identities_len: [u8; IDENTITIES_LEN_SIZE],
}

impl PolicyV2 {
    /// Size of serialized header
    pub const SIZE: usize = 39;

    /// Build a header with no identities.
    pub fn new(strategy: PermissionStrategy, bump: u8, mint: Pubkey) -> Self {
        Self {
            kind: POLICY_V2_TAG,
            strategy: strategy.into(),
            bump,
            mint,
            identities_len: [0; IDENTITIES_LEN_SIZE],
        }
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes.copy_from_slice(bytemuck::bytes_of(self));
        bytes
    }

    /// Deserialize from a blob of exactly [`Self::SIZE`] bytes.
    ///
    /// A v1 blob is rejected with `LayoutMismatch`; use [`PolicyV2::migrate`]
    /// to read one through this revision.
    ///
    /// # Errors
    ///
    /// Same as [`PolicyV1::from_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PolicyError> {
        let header: Self = decode_exact(bytes, &POLICY_V2)?;
        PermissionStrategy::from_u8(header.strategy)?;
        Ok(header)
    }

    /// Lift a v1 header, zero-filling the mint.
    pub fn from_v1(v1: &PolicyV1) -> Self {
        Self {
            kind: POLICY_V2_TAG,
            strategy: v1.strategy,
            bump: v1.bump,
            mint: Pubkey::default(),
            identities_len: v1.identities_len,
        }
    }

    /// Read a v1 blob through the v2 layout.
    ///
    /// New fields are zeroed; nothing past the v1 buffer is read. A v2 blob
    /// fails with `AlreadyMigrated`.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyMigrated` for a v2 blob, otherwise whatever
    /// [`PolicyV1::from_bytes`] reports.
    pub fn migrate(bytes: &[u8]) -> Result<Self, PolicyError> {
        if discriminator::resolve(bytes)?.version == SchemaVersion::V2 {
            return Err(trace("already v2", PolicyError::AlreadyMigrated));
        }
        Ok(Self::from_v1(&PolicyV1::from_bytes(bytes)?))
    }

    /// Occupied identity count.
    pub fn identities_len(&self) -> u32 {
        u32::from_le_bytes(self.identities_len)
    }
}

/// Copy a header out of `bytes`, checking tag and exact length.
fn decode_exact<T: Pod>(bytes: &[u8], expected: &SchemaRevision) -> Result<T, PolicyError> {
    let found = discriminator::resolve(bytes)?;
    if found.tag != expected.tag || bytes.len() != expected.header_len {
        return Err(trace("header mismatch", PolicyError::LayoutMismatch));
    }
    Ok(bytemuck::pod_read_unaligned(bytes))
}

// ============================================================================
// Revision-agnostic header
// ============================================================================

/// A decoded policy header of any revision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyHeader {
    /// First revision
    V1(PolicyV1),
    /// Second revision
    V2(PolicyV2),
}

impl PolicyHeader {
    /// Decode a header blob, dispatching on its discriminator.
    ///
    /// # Errors
    ///
    /// Same as the matching revision's `from_bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, PolicyError> {
        match discriminator::resolve(bytes)?.version {
            SchemaVersion::V1 => PolicyV1::from_bytes(bytes).map(Self::V1),
            SchemaVersion::V2 => PolicyV2::from_bytes(bytes).map(Self::V2),
        }
    }

    /// Append the serialized header to `out`.
    pub fn encode_into(&self, out: &mut alloc::vec::Vec<u8>) {
        match self {
            Self::V1(header) => out.extend_from_slice(&header.to_bytes()),
            Self::V2(header) => out.extend_from_slice(&header.to_bytes()),
        }
    }

    /// Schema row of this header.
    pub fn revision(&self) -> &'static SchemaRevision {
        revision(AccountKind::Policy, self.version())
    }

    /// Schema revision.
    pub fn version(&self) -> SchemaVersion {
        match self {
            Self::V1(_) => SchemaVersion::V1,
            Self::V2(_) => SchemaVersion::V2,
        }
    }

    /// Permission strategy.
    ///
    /// The record fields are public, so the byte is checked on every read.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStrategy` if the stored byte is unknown.
    pub fn strategy(&self) -> Result<PermissionStrategy, PolicyError> {
        let byte = match self {
            Self::V1(header) => header.strategy,
            Self::V2(header) => header.strategy,
        };
        PermissionStrategy::from_u8(byte)
    }

    /// Canonical bump of the policy address.
    pub fn bump(&self) -> u8 {
        match self {
            Self::V1(header) => header.bump,
            Self::V2(header) => header.bump,
        }
    }

    /// Owner mint, when the revision records it.
    pub fn mint(&self) -> Option<&Pubkey> {
        match self {
            Self::V1(_) => None,
            Self::V2(header) => Some(&header.mint),
        }
    }

    /// Occupied identity count.
    pub fn identities_len(&self) -> u32 {
        match self {
            Self::V1(header) => header.identities_len(),
            Self::V2(header) => header.identities_len(),
        }
    }

    /// Overwrite the occupied identity count.
    pub fn set_identities_len(&mut self, len: u32) {
        let bytes = len.to_le_bytes();
        match self {
            Self::V1(header) => header.identities_len = bytes,
            Self::V2(header) => header.identities_len = bytes,
        }
    }
}
