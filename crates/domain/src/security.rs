use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use clubhouse_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Fine-grained capability name granted by the backend, e.g. `teams.view.all`.
///
/// Names are opaque to this crate: anything the backend grants is kept, known
/// or not.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionName(NonEmptyString);

impl PermissionName {
    /// Creates a validated permission name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value).map(Self)
    }

    /// Returns the permission name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for PermissionName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl Display for PermissionName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Permission names the legacy role projections are computed from.
pub mod well_known {
    /// Read access to every team in the club.
    pub const TEAMS_VIEW_ALL: &str = "teams.view.all";
    /// Create and edit teams and their rosters.
    pub const TEAMS_MANAGE: &str = "teams.manage";
    /// Create and edit events for accessible teams.
    pub const EVENTS_MANAGE: &str = "events.manage";
    /// Record attendance for accessible teams.
    pub const ATTENDANCE_MANAGE: &str = "attendance.manage";
    /// Read the caller's own children and their RSVPs.
    pub const CHILDREN_VIEW_OWN: &str = "children.view.own";
}

/// Coarse-grained role kept for compatibility with earlier access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Guardian of one or more players.
    Parent,
    /// Runs training and events for assigned teams.
    Coach,
    /// Administers teams and rosters.
    Manager,
    /// Club-wide administrator.
    Admin,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Coach => "coach",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[Role::Parent, Role::Coach, Role::Manager, Role::Admin];

        ALL
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "parent" => Ok(Self::Parent),
            "coach" => Ok(Self::Coach),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
