use serde::Serialize;
use std::collections::BTreeSet;

use crate::forum::backend::{BackendError, ForumBackend};
use crate::forum::domain::{Role, SubscriptionTier, UserId};

/// Access derived from a user's roles and subscription tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleState {
    pub roles: BTreeSet<Role>,
    pub is_creator: bool,
    pub is_admin: bool,
    pub is_moderator: bool,
    pub can_access_admin: bool,
    pub effective_subscription_type: SubscriptionTier,
    pub has_premium_access: bool,
}

impl RoleState {
    pub fn derive(roles: BTreeSet<Role>, tier: SubscriptionTier) -> Self {
        let is_creator = roles.contains(&Role::Creator);
        let is_admin = roles.contains(&Role::Admin);
        let is_moderator = roles.contains(&Role::Moderator);

        let effective_subscription_type = if is_creator || is_admin {
            SubscriptionTier::Admin
        } else {
            tier
        };

        Self {
            can_access_admin: !roles.is_empty(),
            has_premium_access: effective_subscription_type != SubscriptionTier::Free,
            roles,
            is_creator,
            is_admin,
            is_moderator,
            effective_subscription_type,
        }
    }

    pub fn can_moderate_content(&self) -> bool {
        self.roles.iter().any(|role| role.can_moderate_content())
    }

    pub fn can_manage_users(&self) -> bool {
        self.roles.iter().any(|role| role.can_manage_users())
    }
}

/// Fetches roles and subscription tier for a user and derives [`RoleState`].
///
/// Each call to [`resolve`](Self::resolve) hits the backend again; nothing is
/// cached between calls. When the backend fails the previous state is kept.
pub struct RoleResolver<'a> {
    backend: &'a dyn ForumBackend,
    state: RoleState,
}

impl<'a> RoleResolver<'a> {
    pub fn new(backend: &'a dyn ForumBackend) -> Self {
        Self {
            backend,
            state: RoleState::default(),
        }
    }

    pub fn state(&self) -> &RoleState {
        &self.state
    }

    pub fn into_state(self) -> RoleState {
        self.state
    }

    pub async fn resolve(&mut self, user: Option<&UserId>) -> &RoleState {
        let Some(user) = user else {
            self.state = RoleState::default();
            return &self.state;
        };

        match self.fetch(user).await {
            Ok(state) => self.state = state,
            Err(e) => tracing::error!("Failed to resolve roles for {}: {}", user, e),
        }
        &self.state
    }

    async fn fetch(&self, user: &UserId) -> Result<RoleState, BackendError> {
        let roles = self.backend.fetch_roles(user).await?;
        let tier = self
            .backend
            .fetch_profile(user)
            .await?
            .map(|profile| profile.subscription_type)
            .unwrap_or_default();
        Ok(RoleState::derive(roles, tier))
    }
}

/// Admin-panel role switches for one user: the local set flips first and is
/// put back if the backend refuses.
#[derive(Debug, Clone)]
pub struct RoleSwitch {
    target: UserId,
    roles: BTreeSet<Role>,
    error: Option<String>,
}

impl RoleSwitch {
    pub fn new(target: UserId, roles: BTreeSet<Role>) -> Self {
        Self {
            target,
            roles,
            error: None,
        }
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn toggle(
        &mut self,
        backend: &dyn ForumBackend,
        actor: &UserId,
        role: Role,
    ) -> Result<bool, BackendError> {
        let enabled = !self.roles.contains(&role);
        self.set(backend, actor, role, enabled).await?;
        Ok(enabled)
    }

    pub async fn set(
        &mut self,
        backend: &dyn ForumBackend,
        actor: &UserId,
        role: Role,
        enabled: bool,
    ) -> Result<(), BackendError> {
        let previous = self.roles.clone();
        if enabled {
            self.roles.insert(role);
        } else {
            self.roles.remove(&role);
        }
        self.error = None;

        let result = if enabled {
            backend.grant_role(actor, &self.target, role).await
        } else {
            backend.revoke_role(actor, &self.target, role).await
        };

        if let Err(e) = result {
            tracing::warn!("Role change {} for {} reverted: {}", role, self.target, e);
            self.roles = previous;
            self.error = Some(e.to_string());
            return Err(e);
        }
        Ok(())
    }
}
