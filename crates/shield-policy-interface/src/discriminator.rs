//! Account discriminators for the Shield program.
//!
//! The discriminator is the first byte of account data. It is read before
//! anything else and resolved through the schema table in [`crate::layout`].
//!
//! Deployed policy accounts carry one tag per schema revision (`0` for v1,
//! `1` for v2). Both tags map back to [`AccountKind::Policy`], so callers that
//! only care about the kind never need to know the revision.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::{PolicyError, trace};
use crate::layout::{self, SchemaRevision};

/// Byte offset of the discriminator within account data.
pub const DISCRIMINATOR_OFFSET: usize = 0;

/// Discriminator width in bytes.
pub const DISCRIMINATOR_LEN: usize = 1;

/// Tag written by the first policy schema revision.
pub const POLICY_V1_TAG: u8 = 0;

/// Tag written by the second policy schema revision.
pub const POLICY_V2_TAG: u8 = 1;

/// Logical account kinds defined by the Shield program.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
pub enum AccountKind {
    /// Access-control policy bound to a mint
    Policy,
}

/// Schema revision of an account kind.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum SchemaVersion {
    /// Header without owner mint
    V1 = 1,
    /// Header with owner mint
    V2 = 2,
}

impl SchemaVersion {
    /// Revision new accounts are written with.
    pub const LATEST: Self = Self::V2;
}

/// Tag that new accounts of `kind` are written with.
pub const fn discriminator_of(kind: AccountKind) -> u8 {
    layout::revision(kind, SchemaVersion::LATEST).tag
}

/// Read the raw discriminator byte.
///
/// # Errors
///
/// Returns `LayoutMismatch` if `data` is empty.
pub fn read_discriminator(data: &[u8]) -> Result<u8, PolicyError> {
    let Some(tag) = data.get(DISCRIMINATOR_OFFSET) else {
        return Err(trace("empty account data", PolicyError::LayoutMismatch));
    };
    Ok(*tag)
}

/// Resolve the schema revision named by the leading tag of `data`.
///
/// # Errors
///
/// Returns `LayoutMismatch` if `data` is empty and `UnknownDiscriminator` if
/// no revision is registered under its tag.
pub fn resolve(data: &[u8]) -> Result<&'static SchemaRevision, PolicyError> {
    let tag = read_discriminator(data)?;
    let Some(revision) = layout::revision_by_tag(tag) else {
        return Err(trace("unknown tag", PolicyError::UnknownDiscriminator));
    };
    Ok(revision)
}

/// Recognize the account kind stored in `data`, whatever its revision.
///
/// # Errors
///
/// Same as [`resolve`].
pub fn kind_of(data: &[u8]) -> Result<AccountKind, PolicyError> {
    resolve(data).map(|revision| revision.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminator_of_policy() {
        assert_eq!(discriminator_of(AccountKind::Policy), POLICY_V2_TAG);
    }

    #[test]
    fn test_both_revisions_are_policy() {
        assert_eq!(kind_of(&[POLICY_V1_TAG]), Ok(AccountKind::Policy));
        assert_eq!(kind_of(&[POLICY_V2_TAG, 0, 0]), Ok(AccountKind::Policy));
    }

    #[test]
    fn test_resolve_reports_version() {
        let v1 = resolve(&[POLICY_V1_TAG]).unwrap();
        assert_eq!(v1.version, SchemaVersion::V1);
        let v2 = resolve(&[POLICY_V2_TAG]).unwrap();
        assert_eq!(v2.version, SchemaVersion::V2);
    }

    #[test]
    fn test_unknown_tag() {
        for tag in 2..=u8::MAX {
            assert_eq!(
                resolve(&[tag]).err(),
                Some(PolicyError::UnknownDiscriminator)
            );
        }
    }

    #[test]
    fn test_empty_data() {
        assert_eq!(read_discriminator(&[]), Err(PolicyError::LayoutMismatch));
    }

    #[test]
    fn test_version_codes() {
        assert_eq!(SchemaVersion::try_from(1u8).ok(), Some(SchemaVersion::V1));
        assert_eq!(u8::from(SchemaVersion::V2), 2);
        assert!(SchemaVersion::try_from(3u8).is_err());
    }
}
