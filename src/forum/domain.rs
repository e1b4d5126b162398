// Domain types - plain values, no I/O
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a user profile (UUID v7 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returned when a stored or submitted enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Elevated permission grant, independent of the subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Creator,
    Admin,
    Moderator,
    Support,
}

string_enum!(Role, "role", {
    Creator => "creator",
    Admin => "admin",
    Moderator => "moderator",
    Support => "support",
});

impl Role {
    /// Roles that may edit or delete content owned by someone else.
    pub fn can_moderate_content(&self) -> bool {
        matches!(self, Role::Creator | Role::Admin | Role::Moderator)
    }

    /// Roles that may grant roles and change subscription tiers.
    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Creator | Role::Admin)
    }
}

/// Billing-derived access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Premium,
    Business,
    Sponsor,
    Admin,
}

string_enum!(SubscriptionTier, "subscription tier", {
    Free => "free",
    Premium => "premium",
    Business => "business",
    Sponsor => "sponsor",
    Admin => "admin",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicCategory {
    Frontend,
    Backend,
    Fullstack,
}

string_enum!(TopicCategory, "category", {
    Frontend => "frontend",
    Backend => "backend",
    Fullstack => "fullstack",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Freelance,
    Internship,
}

string_enum!(JobType, "job type", {
    FullTime => "full-time",
    PartTime => "part-time",
    Contract => "contract",
    Freelance => "freelance",
    Internship => "internship",
});

/// Moderation state of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationFlags {
    pub is_banned: bool,
    pub is_muted: bool,
    pub is_frozen: bool,
}

impl ModerationFlags {
    /// Russian explanation of why this profile may not publish, if it may not.
    pub fn write_block_reason(&self) -> Option<&'static str> {
        if self.is_banned {
            Some("Ваш аккаунт заблокирован")
        } else if self.is_frozen {
            Some("Ваш аккаунт заморожен")
        } else if self.is_muted {
            Some("Вы не можете публиковать сообщения")
        } else {
            None
        }
    }
}
