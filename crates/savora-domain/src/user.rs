//! User domain types.

use serde::{Deserialize, Serialize};

/// Role tag attached to a user account.
///
/// Wire format: snake_case string, stored as a JSON array on the user row.
/// Orthogonal to the boolean super-privilege flag — tags describe what a
/// user *is*, the flag describes what a user *may administer*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTag {
    Member,
    Creator,
    Moderator,
}

impl RoleTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Creator => "creator",
            Self::Moderator => "moderator",
        }
    }
}
