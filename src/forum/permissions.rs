//! Advisory checks for showing edit/delete affordances.
//!
//! These never authorize anything: the backend repeats the same rule on
//! every write.

use crate::forum::backend::ForumBackend;
use crate::forum::domain::UserId;
use crate::forum::roles::{RoleResolver, RoleState};

/// True iff the actor owns the resource or holds a content-moderating role.
pub fn can_modify(owner: &UserId, actor: Option<&UserId>, roles: &RoleState) -> bool {
    match actor {
        Some(actor) => actor == owner || roles.can_moderate_content(),
        None => false,
    }
}

/// Owner/role check that looks the actor's roles up first.
pub struct PermissionGate<'a> {
    backend: &'a dyn ForumBackend,
}

impl<'a> PermissionGate<'a> {
    pub fn new(backend: &'a dyn ForumBackend) -> Self {
        Self { backend }
    }

    pub async fn can_modify(&self, owner: &UserId, actor: Option<&UserId>) -> bool {
        let Some(actor) = actor else {
            return false;
        };
        if actor == owner {
            return true;
        }

        // The resolver logs lookup failures and leaves the default state
        let mut resolver = RoleResolver::new(self.backend);
        let roles = resolver.resolve(Some(actor)).await;
        roles.can_moderate_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forum::domain::{Role, SubscriptionTier};
    use crate::forum::testing::RecordingBackend;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn state(roles: &[Role]) -> RoleState {
        RoleState::derive(roles.iter().copied().collect(), SubscriptionTier::Free)
    }

    #[test]
    fn owner_may_modify() {
        let owner = UserId::new("u1");
        assert!(can_modify(&owner, Some(&owner), &RoleState::default()));
    }

    #[test]
    fn anonymous_may_not_modify() {
        let owner = UserId::new("u1");
        assert!(!can_modify(&owner, None, &state(&[Role::Admin])));
    }

    #[test]
    fn elevated_roles_may_modify() {
        let owner = UserId::new("u1");
        let actor = UserId::new("u2");
        for role in [Role::Creator, Role::Admin, Role::Moderator] {
            assert!(can_modify(&owner, Some(&actor), &state(&[role])));
        }
        assert!(!can_modify(&owner, Some(&actor), &state(&[Role::Support])));
    }

    proptest! {
        #[test]
        fn strangers_without_elevated_roles_never_modify(
            owner in "[a-z0-9]{1,12}",
            actor in "[a-z0-9]{1,12}",
            with_support in any::<bool>(),
            tier_idx in 0usize..SubscriptionTier::ALL.len(),
        ) {
            prop_assume!(owner != actor);
            let roles: BTreeSet<Role> = if with_support {
                BTreeSet::from([Role::Support])
            } else {
                BTreeSet::new()
            };
            let roles = RoleState::derive(roles, SubscriptionTier::ALL[tier_idx]);
            prop_assert!(!can_modify(&UserId::new(owner), Some(&UserId::new(actor)), &roles));
        }
    }

    #[tokio::test]
    async fn gate_looks_up_roles() {
        let backend = RecordingBackend::new();
        let owner = backend.add_user("owner", &[], SubscriptionTier::Free);
        let moderator = backend.add_user("moder", &[Role::Moderator], SubscriptionTier::Free);
        let stranger = backend.add_user("stranger", &[], SubscriptionTier::Premium);

        let gate = PermissionGate::new(&backend);
        assert!(gate.can_modify(&owner, Some(&owner)).await);
        assert!(gate.can_modify(&owner, Some(&moderator)).await);
        assert!(!gate.can_modify(&owner, Some(&stranger)).await);
        assert!(!gate.can_modify(&owner, None).await);
    }

    #[tokio::test]
    async fn gate_denies_when_lookup_fails() {
        let backend = RecordingBackend::new();
        let owner = backend.add_user("owner", &[], SubscriptionTier::Free);
        let admin = backend.add_user("admin", &[Role::Admin], SubscriptionTier::Free);
        backend.fail("fetch_roles", "timeout");

        let gate = PermissionGate::new(&backend);
        assert!(!gate.can_modify(&owner, Some(&admin)).await);
    }
}
