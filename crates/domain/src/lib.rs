//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod ids;
mod record;
mod security;

pub use access::AccessRequirement;
pub use ids::{TeamId, UserId};
pub use record::{LegacyRoleFlags, PermissionRecord};
pub use security::{PermissionName, Role, well_known};
