use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::security::well_known;
use crate::{PermissionName, Role, TeamId};

/// Resolved permissions, accessible teams and roles of one principal.
///
/// Records are immutable once built; a refetch produces a new record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    permissions: BTreeSet<PermissionName>,
    accessible_teams: BTreeSet<TeamId>,
    roles: BTreeSet<Role>,
}

impl PermissionRecord {
    /// Returns the record of a principal holding nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Joins the three independently fetched facets into one record.
    ///
    /// Duplicates collapse.
    #[must_use]
    pub fn from_facets(
        permissions: impl IntoIterator<Item = PermissionName>,
        accessible_teams: impl IntoIterator<Item = TeamId>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
            accessible_teams: accessible_teams.into_iter().collect(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Granted permission names.
    #[must_use]
    pub fn permissions(&self) -> &BTreeSet<PermissionName> {
        &self.permissions
    }

    /// Teams the principal may view or manage.
    #[must_use]
    pub fn accessible_teams(&self) -> &BTreeSet<TeamId> {
        &self.accessible_teams
    }

    /// Active role assignments.
    #[must_use]
    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    /// Returns whether all three facets are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty() && self.accessible_teams.is_empty() && self.roles.is_empty()
    }

    /// Returns whether the permission is granted.
    #[must_use]
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.contains(name)
    }

    /// Returns whether any of the permissions is granted. False for an empty list.
    #[must_use]
    pub fn has_any_permission<I, S>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .any(|name| self.has_permission(name.as_ref()))
    }

    /// Returns whether every permission is granted. True for an empty list.
    #[must_use]
    pub fn has_all_permissions<I, S>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .all(|name| self.has_permission(name.as_ref()))
    }

    /// Returns whether the role is actively assigned.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Returns whether any of the roles is assigned. False for an empty list.
    #[must_use]
    pub fn has_any_role(&self, roles: impl IntoIterator<Item = Role>) -> bool {
        roles.into_iter().any(|role| self.has_role(role))
    }

    /// Returns whether every role is assigned. True for an empty list.
    #[must_use]
    pub fn has_all_roles(&self, roles: impl IntoIterator<Item = Role>) -> bool {
        roles.into_iter().all(|role| self.has_role(role))
    }

    /// Returns whether the team is accessible.
    #[must_use]
    pub fn can_access_team(&self, team_id: &str) -> bool {
        self.accessible_teams.contains(team_id)
    }

    /// Legacy admin projection: club-wide team visibility.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_permission(well_known::TEAMS_VIEW_ALL)
    }

    /// Legacy manager projection.
    #[must_use]
    pub fn is_manager(&self) -> bool {
        self.has_permission(well_known::TEAMS_MANAGE)
    }

    /// Legacy coach projection.
    #[must_use]
    pub fn is_coach(&self) -> bool {
        self.has_any_permission([well_known::EVENTS_MANAGE, well_known::ATTENDANCE_MANAGE])
    }

    /// Legacy parent projection.
    #[must_use]
    pub fn is_parent(&self) -> bool {
        self.has_permission(well_known::CHILDREN_VIEW_OWN)
    }

    /// Evaluates all legacy projections against the current contents.
    #[must_use]
    pub fn legacy_roles(&self) -> LegacyRoleFlags {
        LegacyRoleFlags {
            is_admin: self.is_admin(),
            is_manager: self.is_manager(),
            is_coach: self.is_coach(),
            is_parent: self.is_parent(),
        }
    }
}

/// Snapshot of the legacy role projections of one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyRoleFlags {
    /// See [`PermissionRecord::is_admin`].
    pub is_admin: bool,
    /// See [`PermissionRecord::is_manager`].
    pub is_manager: bool,
    /// See [`PermissionRecord::is_coach`].
    pub is_coach: bool,
    /// See [`PermissionRecord::is_parent`].
    pub is_parent: bool,
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{LegacyRoleFlags, PermissionRecord};
    use crate::security::well_known;
    use crate::{PermissionName, Role, TeamId};

    fn permission(value: &str) -> PermissionName {
        PermissionName::new(value).unwrap_or_else(|_| unreachable!("valid permission name"))
    }

    fn team(value: &str) -> TeamId {
        TeamId::new(value).unwrap_or_else(|_| unreachable!("valid team id"))
    }

    fn record_with(permissions: &[&str]) -> PermissionRecord {
        PermissionRecord::from_facets(
            permissions.iter().map(|value| permission(value)),
            [team("team-a")],
            [Role::Coach],
        )
    }

    #[test]
    fn any_and_all_follow_boolean_semantics() {
        let record = record_with(&["events.create", "events.edit"]);

        assert!(record.has_all_permissions(["events.create", "events.edit"]));
        assert!(!record.has_all_permissions(["events.create", "players.delete"]));
        assert!(record.has_any_permission(["events.create", "players.delete"]));
        assert!(!record.has_any_permission(["players.delete"]));
    }

    #[test]
    fn empty_lists_use_vacuous_truth() {
        let record = record_with(&["events.create"]);
        let none: [&str; 0] = [];

        assert!(record.has_all_permissions(none));
        assert!(!record.has_any_permission(none));
        assert!(record.has_all_roles(Vec::<Role>::new()));
        assert!(!record.has_any_role(Vec::<Role>::new()));
    }

    #[test]
    fn team_access_is_membership() {
        let record = record_with(&[]);

        assert!(record.can_access_team("team-a"));
        assert!(!record.can_access_team("team-b"));
    }

    #[test]
    fn duplicate_facet_values_collapse() {
        let record = PermissionRecord::from_facets(
            [permission("teams.manage"), permission("teams.manage")],
            [team("team-a"), team("team-a")],
            [Role::Admin, Role::Admin],
        );

        assert_eq!(record.permissions().len(), 1);
        assert_eq!(record.accessible_teams().len(), 1);
        assert_eq!(record.roles().len(), 1);
    }

    #[test]
    fn legacy_projections_follow_permission_names() {
        let admin = record_with(&[well_known::TEAMS_VIEW_ALL]);
        let coach = record_with(&[well_known::ATTENDANCE_MANAGE]);
        let parent = record_with(&[well_known::CHILDREN_VIEW_OWN]);

        assert!(admin.is_admin());
        assert!(!admin.is_coach());
        assert!(coach.is_coach());
        assert!(!coach.is_admin());
        assert!(parent.is_parent());
        assert!(!parent.is_manager());
    }

    #[test]
    fn legacy_projections_ignore_assigned_roles() {
        let record = PermissionRecord::from_facets([], [], [Role::Admin]);

        assert!(record.has_role(Role::Admin));
        assert!(!record.is_admin());
    }

    #[test]
    fn empty_record_denies_everything() {
        let record = PermissionRecord::empty();

        assert!(record.is_empty());
        assert!(!record.has_permission(well_known::TEAMS_VIEW_ALL));
        assert!(!record.has_role(Role::Parent));
        assert!(!record.can_access_team("team-a"));
        assert_eq!(record.legacy_roles(), LegacyRoleFlags::default());
    }

    proptest! {
        #[test]
        fn all_implies_any_for_non_empty_queries(
            granted in proptest::collection::btree_set("[a-c]\\.[a-c]", 0..6),
            queried in proptest::collection::vec("[a-c]\\.[a-c]", 1..6),
        ) {
            let record = PermissionRecord::from_facets(
                granted.iter().map(|value| permission(value)),
                [],
                [],
            );

            if record.has_all_permissions(&queried) {
                prop_assert!(record.has_any_permission(&queried));
            }
            prop_assert_eq!(
                record.has_any_permission(&queried),
                queried.iter().any(|value| granted.contains(value))
            );
        }
    }
}
