//! Closed role enumeration and the capability matrix.
//!
//! Every authorization decision matches exhaustively on [`Role`] so a new
//! role cannot slip through an access check unnoticed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Subject role carried inside bearer credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access, including deletes.
    Admin,
    /// Operational access: read, create, update.
    Manager,
    /// Read-only access.
    Resident,
}

/// Mutating or reading intent checked against the capability matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// List or fetch entities.
    Read,
    /// Create a new entity.
    Create,
    /// Modify an existing entity.
    Update,
    /// Remove an entity.
    Delete,
}

/// Error raised when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {value}")]
pub struct RoleParseError {
    /// The unrecognised input.
    pub value: String,
}

impl Role {
    /// Stable wire/storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::Resident => "RESIDENT",
        }
    }

    /// Whether this role may perform `action`.
    pub const fn permits(self, action: Action) -> bool {
        match (self, action) {
            (Self::Admin, _) => true,
            (Self::Manager, Action::Read | Action::Create | Action::Update) => true,
            (Self::Manager, Action::Delete) => false,
            (Self::Resident, Action::Read) => true,
            (Self::Resident, Action::Create | Action::Update | Action::Delete) => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ADMIN" => Ok(Self::Admin),
            "MANAGER" => Ok(Self::Manager),
            "RESIDENT" => Ok(Self::Resident),
            other => Err(RoleParseError {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Admin, Action::Delete, true)]
    #[case(Role::Admin, Action::Create, true)]
    #[case(Role::Manager, Action::Create, true)]
    #[case(Role::Manager, Action::Update, true)]
    #[case(Role::Manager, Action::Delete, false)]
    #[case(Role::Resident, Action::Read, true)]
    #[case(Role::Resident, Action::Create, false)]
    #[case(Role::Resident, Action::Update, false)]
    #[case(Role::Resident, Action::Delete, false)]
    fn capability_matrix(#[case] role: Role, #[case] action: Action, #[case] allowed: bool) {
        assert_eq!(role.permits(action), allowed);
    }

    #[rstest]
    #[case("ADMIN", Role::Admin)]
    #[case("MANAGER", Role::Manager)]
    #[case("RESIDENT", Role::Resident)]
    fn parse_round_trips(#[case] text: &str, #[case] role: Role) {
        assert_eq!(text.parse::<Role>().expect("known role"), role);
        assert_eq!(role.as_str(), text);
    }

    #[test]
    fn parse_rejects_unknown_roles() {
        let err = "SUPERUSER".parse::<Role>().expect_err("unknown role");
        assert_eq!(err.value, "SUPERUSER");
    }

    #[test]
    fn serializes_screaming_snake_case() {
        let json = serde_json::to_value(Role::Manager).expect("serialize role");
        assert_eq!(json, "MANAGER");
    }
}
