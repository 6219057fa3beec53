//! Point-in-time view of decoded policies.
//!
//! A [`PolicySnapshot`] indexes policies by address and answers whether an
//! identity is allowed by an ordered list of policies.

use alloc::collections::{BTreeMap, BTreeSet};

use pinocchio::pubkey::Pubkey;

use crate::account::PolicyAccount;
use crate::error::{PolicyError, trace};
use crate::layout::PermissionStrategy;

#[derive(Clone, Debug)]
struct Entry {
    slot: u64,
    strategy: PermissionStrategy,
}

/// Policies keyed by address, with the slot each was observed at.
#[derive(Clone, Debug, Default)]
pub struct PolicySnapshot {
    policies: BTreeMap<Pubkey, Entry>,
    lookup: BTreeSet<(Pubkey, Pubkey)>,
}

impl PolicySnapshot {
    /// Empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `account` at `address` as observed at `slot`.
    ///
    /// An update from a slot older than or equal to the stored one is
    /// ignored. Returns true if the snapshot changed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStrategy` if the account's strategy byte is unknown;
    /// the snapshot is left unchanged.
    pub fn insert(
        &mut self,
        address: Pubkey,
        slot: u64,
        account: &PolicyAccount,
    ) -> Result<bool, PolicyError> {
        if self
            .policies
            .get(&address)
            .is_some_and(|current| slot <= current.slot)
        {
            return Ok(false);
        }
        let strategy = account.strategy()?;

        self.forget_identities(&address);
        for identity in account.identities() {
            self.lookup.insert((address, *identity));
        }
        self.policies.insert(address, Entry { slot, strategy });
        Ok(true)
    }

    /// Drop the policy at `address`. Returns true if it was present.
    pub fn remove(&mut self, address: &Pubkey) -> bool {
        self.forget_identities(address);
        self.policies.remove(address).is_some()
    }

    /// Number of policies held.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns true if no policy is held.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Slot the policy at `address` was observed at.
    pub fn slot(&self, address: &Pubkey) -> Option<u64> {
        self.policies.get(address).map(|entry| entry.slot)
    }

    /// Decide whether `identity` is allowed by `policies`, in order.
    ///
    /// The first policy that lists the identity decides: `Deny` rejects,
    /// `Allow` accepts. When none lists it, the identity is allowed unless one
    /// of the consulted policies uses the `Allow` strategy.
    ///
    /// Policies are consulted lazily: an address the snapshot lacks only
    /// matters if no earlier policy lists the identity.
    ///
    /// # Errors
    ///
    /// Returns `PolicyNotFound` on the first consulted address the snapshot
    /// lacks.
    pub fn is_allowed(&self, policies: &[Pubkey], identity: &Pubkey) -> Result<bool, PolicyError> {
        let mut allowed = true;

        for address in policies {
            let Some(entry) = self.policies.get(address) else {
                return Err(trace("unknown policy", PolicyError::PolicyNotFound));
            };

            if self.lookup.contains(&(*address, *identity)) {
                return Ok(entry.strategy == PermissionStrategy::Allow);
            }
            if entry.strategy == PermissionStrategy::Allow {
                allowed = false;
            }
        }

        Ok(allowed)
    }

    fn forget_identities(&mut self, address: &Pubkey) {
        self.lookup.retain(|(policy, _)| policy != address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discriminator::SchemaVersion;

    const DENY_LIST: Pubkey = [1u8; 32];
    const ALLOW_LIST: Pubkey = [2u8; 32];
    const LISTED: Pubkey = [10u8; 32];
    const OTHER: Pubkey = [11u8; 32];

    fn policy(strategy: PermissionStrategy, identities: &[Pubkey]) -> PolicyAccount {
        let (mut account, _) = PolicyAccount::create(SchemaVersion::V2, strategy, 255, &[0xee; 32]);
        for identity in identities {
            account.add_identity(identity).unwrap();
        }
        account
    }

    fn snapshot() -> PolicySnapshot {
        let deny = policy(PermissionStrategy::Deny, &[LISTED]);
        let allow = policy(PermissionStrategy::Allow, &[LISTED]);

        let mut snapshot = PolicySnapshot::new();
        snapshot.insert(DENY_LIST, 1, &deny).unwrap();
        snapshot.insert(ALLOW_LIST, 1, &allow).unwrap();
        snapshot
    }

    #[test]
    fn test_deny_list() {
        let snapshot = snapshot();
        assert_eq!(snapshot.is_allowed(&[DENY_LIST], &LISTED), Ok(false));
        assert_eq!(snapshot.is_allowed(&[DENY_LIST], &OTHER), Ok(true));
    }

    #[test]
    fn test_allow_list() {
        let snapshot = snapshot();
        assert_eq!(snapshot.is_allowed(&[ALLOW_LIST], &LISTED), Ok(true));
        assert_eq!(snapshot.is_allowed(&[ALLOW_LIST], &OTHER), Ok(false));
    }

    #[test]
    fn test_first_listing_policy_decides() {
        let snapshot = snapshot();
        let deny_first = [DENY_LIST, ALLOW_LIST];
        let allow_first = [ALLOW_LIST, DENY_LIST];
        assert_eq!(snapshot.is_allowed(&deny_first, &LISTED), Ok(false));
        assert_eq!(snapshot.is_allowed(&allow_first, &LISTED), Ok(true));
    }

    #[test]
    fn test_no_policies_allows() {
        assert_eq!(PolicySnapshot::new().is_allowed(&[], &LISTED), Ok(true));
    }

    #[test]
    fn test_missing_policy() {
        assert_eq!(
            snapshot().is_allowed(&[DENY_LIST, [3u8; 32]], &OTHER),
            Err(PolicyError::PolicyNotFound)
        );
    }

    #[test]
    fn test_unreached_missing_policy_is_ignored() {
        let snapshot = snapshot();
        let missing = [3u8; 32];

        let allow_first = [ALLOW_LIST, missing];
        assert_eq!(snapshot.is_allowed(&allow_first, &LISTED), Ok(true));
        let deny_first = [DENY_LIST, missing];
        assert_eq!(snapshot.is_allowed(&deny_first, &LISTED), Ok(false));

        assert_eq!(
            snapshot.is_allowed(&allow_first, &OTHER),
            Err(PolicyError::PolicyNotFound)
        );
    }

    #[test]
    fn test_stale_update_is_ignored() {
        let mut snapshot = snapshot();
        let emptied = policy(PermissionStrategy::Deny, &[]);
        assert_eq!(snapshot.insert(DENY_LIST, 1, &emptied), Ok(false));
        assert_eq!(snapshot.is_allowed(&[DENY_LIST], &LISTED), Ok(false));

        assert_eq!(snapshot.insert(DENY_LIST, 2, &emptied), Ok(true));
        assert_eq!(snapshot.is_allowed(&[DENY_LIST], &LISTED), Ok(true));
        assert_eq!(snapshot.slot(&DENY_LIST), Some(2));
    }

    #[test]
    fn test_remove() {
        let mut snapshot = snapshot();
        assert!(snapshot.remove(&ALLOW_LIST));
        assert!(!snapshot.remove(&ALLOW_LIST));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.is_allowed(&[ALLOW_LIST], &LISTED),
            Err(PolicyError::PolicyNotFound)
        );
    }
}
