/// Ownership policy engine
///
/// Every mutating operation in the service asks `authorize` whether an actor
/// may perform an action on a resource. The decision depends only on the
/// actor's identity and role, the resource's owner and kind, and the action.
/// Nothing here touches storage.
///
/// Reads of blogs, articles and comments are public. Article and comment
/// deletion carry a moderator exception that blog deletion does not.
pub mod claims;

pub use claims::ClaimsReader;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::metrics::authz::AUTHZ_DECISIONS_TOTAL;

// ============================================================================
// Roles and actors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    RegularUser,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::RegularUser => "regular_user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "regular_user" => Ok(Role::RegularUser),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(AppError::InvalidToken(format!("unknown role '{}'", other))),
        }
    }
}

/// Identity read from a bearer token, rebuilt on every call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub subject_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(subject_id: Uuid, role: Role) -> Self {
        Self { subject_id, role }
    }

    fn is_staff(&self) -> bool {
        matches!(self.role, Role::Moderator | Role::Admin)
    }
}

// ============================================================================
// Resources and actions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    ChangePassword,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::ChangePassword => "change_password",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A user account; carries the target's role
    User { role: Role },
    Blog,
    /// Owned transitively through the parent blog
    Article,
    Comment,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::User { .. } => "user",
            ResourceKind::Blog => "blog",
            ResourceKind::Article => "article",
            ResourceKind::Comment => "comment",
        }
    }
}

/// The thing being acted on, reduced to what the policy needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub owner_id: Uuid,
}

impl Resource {
    /// A user account; its owner is the account itself
    pub fn user(id: Uuid, role: Role) -> Self {
        Self {
            kind: ResourceKind::User { role },
            owner_id: id,
        }
    }

    pub fn blog(owner_id: Uuid) -> Self {
        Self {
            kind: ResourceKind::Blog,
            owner_id,
        }
    }

    /// An article, owned by whoever owns its blog
    pub fn article(blog_owner_id: Uuid) -> Self {
        Self {
            kind: ResourceKind::Article,
            owner_id: blog_owner_id,
        }
    }

    pub fn comment(user_id: Uuid) -> Self {
        Self {
            kind: ResourceKind::Comment,
            owner_id: user_id,
        }
    }
}

// ============================================================================
// Decisions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Only the owner may do this
    NotOwner,
    /// Only the account holder may do this, whatever the actor's role
    SelfOnly,
    /// Actor's role is too low for a cross-user action
    InsufficientRole,
    /// Target is staff and the actor is a moderator
    ProtectedTarget,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DenyReason::NotOwner => "only the owner may perform this action",
            DenyReason::SelfOnly => "only the account holder may perform this action",
            DenyReason::InsufficientRole => "role does not permit this action",
            DenyReason::ProtectedTarget => "moderators cannot act on staff accounts",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decide whether `actor` may perform `action` on `resource`
pub fn authorize(actor: &Actor, resource: &Resource, action: Action) -> Decision {
    use Decision::{Allow, Deny};

    if action == Action::Read && !matches!(resource.kind, ResourceKind::User { .. }) {
        return Allow;
    }

    if resource.owner_id == actor.subject_id {
        return Allow;
    }

    match (resource.kind, action) {
        (ResourceKind::User { role: target }, Action::Read) => match actor.role {
            Role::Admin => Allow,
            Role::Moderator if target == Role::RegularUser => Allow,
            Role::Moderator => Deny(DenyReason::ProtectedTarget),
            Role::RegularUser => Deny(DenyReason::NotOwner),
        },
        (ResourceKind::User { .. }, Action::Delete) => match actor.role {
            Role::Admin => Allow,
            _ => Deny(DenyReason::InsufficientRole),
        },
        (ResourceKind::User { role: target }, Action::Create) => match (target, actor.role) {
            (Role::RegularUser, _) => Allow,
            (_, Role::Admin) => Allow,
            _ => Deny(DenyReason::InsufficientRole),
        },
        (ResourceKind::User { .. }, Action::Update | Action::ChangePassword) => {
            Deny(DenyReason::SelfOnly)
        }
        (ResourceKind::Article | ResourceKind::Comment, Action::Delete) if actor.is_staff() => {
            Allow
        }
        _ => Deny(DenyReason::NotOwner),
    }
}

/// Run the policy and turn a denial into `AppError::Forbidden`
///
/// Records the outcome in `blog_authz_decisions_total`.
pub fn enforce(actor: &Actor, resource: &Resource, action: Action) -> Result<()> {
    let decision = authorize(actor, resource, action);

    let outcome = if decision.is_allowed() { "allow" } else { "deny" };
    AUTHZ_DECISIONS_TOTAL
        .with_label_values(&[resource.kind.as_str(), action.as_str(), outcome])
        .inc();

    match decision {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            tracing::debug!(
                actor = %actor.subject_id,
                role = %actor.role,
                resource = resource.kind.as_str(),
                action = action.as_str(),
                %reason,
                "authorization denied"
            );
            Err(AppError::Forbidden(reason.to_string()))
        }
    }
}
