//! Decoded policy accounts.
//!
//! [`PolicyAccount`] is an owned copy of a policy account's data. Its
//! operations apply the program's instructions to that copy and report the
//! resulting byte delta, so a client can predict the post-instruction state
//! and the storage it has to fund.
//!
//! Every operation validates before it mutates: on error the account is left
//! exactly as it was.

use alloc::vec::Vec;

use pinocchio::pubkey::Pubkey;

use crate::byte_delta::{self, InstructionByteDelta};
use crate::discriminator::{self, AccountKind, SchemaVersion};
use crate::error::{PolicyError, trace};
use crate::layout::{self, IDENTITY_LEN, PermissionStrategy, PolicyHeader, PolicyV1, PolicyV2};

/// Returns true if `identity` marks a vacant slot.
#[inline]
pub fn is_vacant(identity: &Pubkey) -> bool {
    *identity == Pubkey::default()
}

/// A policy header and its identity slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyAccount {
    header: PolicyHeader,
    slots: Vec<Pubkey>,
}

impl PolicyAccount {
    /// State right after `CreatePolicy` with a `version` header.
    ///
    /// `mint` is recorded only by revisions that store it. Returns the account
    /// and the creation delta.
    pub fn create(
        version: SchemaVersion,
        strategy: PermissionStrategy,
        bump: u8,
        mint: &Pubkey,
    ) -> (Self, InstructionByteDelta) {
        let header = match version {
            SchemaVersion::V1 => PolicyHeader::V1(PolicyV1::new(strategy, bump)),
            SchemaVersion::V2 => PolicyHeader::V2(PolicyV2::new(strategy, bump, *mint)),
        };
        let account = Self {
            header,
            slots: Vec::new(),
        };
        (account, byte_delta::create_policy_delta(version))
    }

    /// Decode full account data: header followed by whole identity slots.
    ///
    /// # Errors
    ///
    /// Returns `UnknownDiscriminator` for data that is not a policy,
    /// `InvalidStrategy` for an unknown strategy byte, and `LayoutMismatch`
    /// when the header is truncated, a trailing slot is partial, or
    /// `identities_len` exceeds the slot count.
    pub fn decode(data: &[u8]) -> Result<Self, PolicyError> {
        let revision = discriminator::resolve(data)?;
        if revision.kind != AccountKind::Policy {
            return Err(trace("not a policy", PolicyError::UnknownDiscriminator));
        }
        if data.len() < revision.header_len
            || (data.len() - revision.header_len) % IDENTITY_LEN != 0
        {
            return Err(trace("policy data length", PolicyError::LayoutMismatch));
        }

        let (header, identities) = data.split_at(revision.header_len);
        let header = PolicyHeader::decode(header)?;
        let slots: Vec<Pubkey> = identities
            .chunks_exact(IDENTITY_LEN)
            .map(|chunk| {
                let mut identity = Pubkey::default();
                identity.copy_from_slice(chunk);
                identity
            })
            .collect();

        if header.identities_len() as usize > slots.len() {
            return Err(trace("count exceeds slots", PolicyError::LayoutMismatch));
        }

        Ok(Self { header, slots })
    }

    /// Serialize to account data.
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.len());
        self.header.encode_into(&mut data);
        for slot in &self.slots {
            data.extend_from_slice(slot);
        }
        data
    }

    /// Account data length in bytes.
    pub fn len(&self) -> usize {
        self.header.revision().header_len + self.slots.len() * IDENTITY_LEN
    }

    /// Always false: a policy account holds at least its header.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Decoded header.
    pub fn header(&self) -> &PolicyHeader {
        &self.header
    }

    /// Schema revision of the header.
    pub fn version(&self) -> SchemaVersion {
        self.header.version()
    }

    /// Permission strategy.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStrategy` if the header's strategy byte is unknown.
    pub fn strategy(&self) -> Result<PermissionStrategy, PolicyError> {
        self.header.strategy()
    }

    /// Canonical bump of the policy address.
    pub fn bump(&self) -> u8 {
        self.header.bump()
    }

    /// Owner mint, when the header records it.
    pub fn mint(&self) -> Option<&Pubkey> {
        self.header.mint()
    }

    /// All identity slots, vacant ones included.
    pub fn slots(&self) -> &[Pubkey] {
        &self.slots
    }

    /// Occupied identities in slot order.
    pub fn identities(&self) -> impl Iterator<Item = &Pubkey> {
        self.slots.iter().filter(|identity| !is_vacant(identity))
    }

    /// Returns true if `identity` occupies a slot.
    pub fn contains(&self, identity: &Pubkey) -> bool {
        !is_vacant(identity) && self.slots.contains(identity)
    }

    /// Index of the first vacant slot, the cheapest target for
    /// [`Self::replace_identity`].
    pub fn vacant_slot(&self) -> Option<usize> {
        self.slots.iter().position(is_vacant)
    }

    /// Apply `AddIdentity`: append a new slot holding `identity`.
    ///
    /// Vacant slots are left in place.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInstructionData` for the all-zero identity and
    /// `ArithmeticOverflow` if `identities_len` is saturated.
    pub fn add_identity(&mut self, identity: &Pubkey) -> Result<InstructionByteDelta, PolicyError> {
        if is_vacant(identity) {
            return Err(trace("vacant key", PolicyError::InvalidInstructionData));
        }
        let count = self.incremented_count()?;

        self.slots.push(*identity);
        self.header.set_identities_len(count);
        Ok(byte_delta::add_identity_delta())
    }

    /// Apply `RemoveIdentity`: vacate the slot at `index`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIndexToReferenceIdentity` for an index past the last
    /// slot, `IdentityNotFound` if the slot is already vacant, and
    /// `LayoutMismatch` if `identities_len` is already zero.
    pub fn remove_identity(&mut self, index: usize) -> Result<InstructionByteDelta, PolicyError> {
        let slot = self.slot(index)?;
        if is_vacant(slot) {
            return Err(trace("slot vacant", PolicyError::IdentityNotFound));
        }
        let Some(count) = self.header.identities_len().checked_sub(1) else {
            return Err(trace("count underflow", PolicyError::LayoutMismatch));
        };

        self.slots[index] = Pubkey::default();
        self.header.set_identities_len(count);
        Ok(byte_delta::REMOVE_IDENTITY_DELTA)
    }

    /// Apply `ReplaceIdentity`: overwrite the slot at `index`.
    ///
    /// Filling a vacant slot counts as a new identity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInstructionData` for the all-zero identity,
    /// `InvalidIndexToReferenceIdentity` for an index past the last slot, and
    /// `ArithmeticOverflow` if filling a vacant slot saturates the count.
    pub fn replace_identity(
        &mut self,
        index: usize,
        identity: &Pubkey,
    ) -> Result<InstructionByteDelta, PolicyError> {
        if is_vacant(identity) {
            return Err(trace("vacant key", PolicyError::InvalidInstructionData));
        }
        let was_vacant = is_vacant(self.slot(index)?);
        let count = if was_vacant {
            self.incremented_count()?
        } else {
            self.header.identities_len()
        };

        self.slots[index] = *identity;
        self.header.set_identities_len(count);
        Ok(byte_delta::REPLACE_IDENTITY_DELTA)
    }

    /// Rewrite a v1 header as v2, recording `mint`.
    ///
    /// Identity slots move with the header and keep their order.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyMigrated` if the header is already v2.
    pub fn migrate(&mut self, mint: &Pubkey) -> Result<InstructionByteDelta, PolicyError> {
        let PolicyHeader::V1(v1) = self.header else {
            return Err(trace("already v2", PolicyError::AlreadyMigrated));
        };

        let mut v2 = PolicyV2::from_v1(&v1);
        v2.mint = *mint;
        self.header = PolicyHeader::V2(v2);
        Ok(byte_delta::migrate_policy_delta())
    }

    /// Apply `ClosePolicy`, consuming the account.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the length does not fit in a delta.
    pub fn close(self) -> Result<InstructionByteDelta, PolicyError> {
        byte_delta::close_policy_delta(self.len())
    }

    fn slot(&self, index: usize) -> Result<&Pubkey, PolicyError> {
        let Some(slot) = self.slots.get(index) else {
            return Err(trace(
                "index outside identity slots",
                PolicyError::InvalidIndexToReferenceIdentity,
            ));
        };
        Ok(slot)
    }

    fn incremented_count(&self) -> Result<u32, PolicyError> {
        let Some(count) = self.header.identities_len().checked_add(1) else {
            return Err(trace("count overflow", PolicyError::ArithmeticOverflow));
        };
        Ok(count)
    }
}

/// Any account owned by the Shield program, recognized by discriminator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShieldAccount {
    /// Policy account of any revision
    Policy(PolicyAccount),
}

impl ShieldAccount {
    /// Decode account data, dispatching on its discriminator.
    ///
    /// # Errors
    ///
    /// Returns `UnknownDiscriminator` for an unregistered tag, otherwise
    /// whatever the kind's decoder reports.
    pub fn decode(data: &[u8]) -> Result<Self, PolicyError> {
        match discriminator::kind_of(data)? {
            AccountKind::Policy => PolicyAccount::decode(data).map(Self::Policy),
        }
    }

    /// Logical kind of the account.
    pub fn kind(&self) -> AccountKind {
        match self {
            Self::Policy(_) => AccountKind::Policy,
        }
    }
}

/// Expected length of a policy account with `slots` identity slots.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if the length does not fit in a `usize`.
pub fn policy_account_len(version: SchemaVersion, slots: usize) -> Result<usize, PolicyError> {
    layout::account_len(AccountKind::Policy, version, slots)
}
