use clubhouse_domain::AccessRequirement;

use crate::PermissionStatus;

/// Decision of one gate for the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Permissions of the current principal are not known yet.
    Loading,
    /// The requirement holds.
    Granted,
    /// The requirement does not hold.
    Denied,
}

impl GateState {
    /// Evaluates a requirement against a published status.
    #[must_use]
    pub fn evaluate(requirement: &AccessRequirement, status: &PermissionStatus) -> Self {
        match status.record() {
            None => Self::Loading,
            Some(record) if requirement.is_satisfied_by(record) => Self::Granted,
            Some(_) => Self::Denied,
        }
    }
}

/// What a gate renders for one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutput<'a, V> {
    /// Protected content.
    Children(&'a V),
    /// Content shown when access is denied.
    Fallback(&'a V),
    /// Custom content shown while loading.
    Loading(&'a V),
    /// Neutral placeholder shown while loading when no custom content is set.
    Placeholder,
    /// Nothing is rendered.
    Nothing,
}

impl<'a, V> GateOutput<'a, V> {
    /// Returns the view to render, if the output carries one.
    #[must_use]
    pub fn view(self) -> Option<&'a V> {
        match self {
            Self::Children(view) | Self::Fallback(view) | Self::Loading(view) => Some(view),
            Self::Placeholder | Self::Nothing => None,
        }
    }
}

/// Declarative wrapper that renders `children` only when a requirement holds.
///
/// Gates keep no state of their own: every [`Gate::render`] call re-evaluates
/// the status it is given.
#[derive(Debug, Clone)]
pub struct Gate<V> {
    requirement: AccessRequirement,
    children: V,
    fallback: Option<V>,
    loading_fallback: Option<V>,
}

impl<V> Gate<V> {
    /// Creates a gate with no fallback and the neutral loading placeholder.
    #[must_use]
    pub fn new(requirement: AccessRequirement, children: V) -> Self {
        Self {
            requirement,
            children,
            fallback: None,
            loading_fallback: None,
        }
    }

    /// Sets the content rendered when access is denied.
    #[must_use]
    pub fn with_fallback(mut self, fallback: V) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Sets the content rendered while permissions are loading.
    #[must_use]
    pub fn with_loading_fallback(mut self, loading_fallback: V) -> Self {
        self.loading_fallback = Some(loading_fallback);
        self
    }

    /// Returns the requirement this gate enforces.
    #[must_use]
    pub fn requirement(&self) -> &AccessRequirement {
        &self.requirement
    }

    /// Evaluates the gate against a status.
    #[must_use]
    pub fn state(&self, status: &PermissionStatus) -> GateState {
        GateState::evaluate(&self.requirement, status)
    }

    /// Picks the branch to render for a status.
    #[must_use]
    pub fn render(&self, status: &PermissionStatus) -> GateOutput<'_, V> {
        match self.state(status) {
            GateState::Granted => GateOutput::Children(&self.children),
            GateState::Denied => self
                .fallback
                .as_ref()
                .map_or(GateOutput::Nothing, GateOutput::Fallback),
            GateState::Loading => self
                .loading_fallback
                .as_ref()
                .map_or(GateOutput::Placeholder, GateOutput::Loading),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use clubhouse_core::AppResult;
    use clubhouse_domain::{
        AccessRequirement, PermissionName, PermissionRecord, Role, TeamId, UserId,
    };
    use tokio::sync::Mutex;

    use super::{Gate, GateOutput, GateState};
    use crate::{
        PermissionCache, PermissionContext, PermissionResolver, PermissionSource, PermissionStatus,
    };

    fn permission(value: &str) -> PermissionName {
        PermissionName::new(value).unwrap_or_else(|_| unreachable!("valid permission name"))
    }

    fn team(value: &str) -> TeamId {
        TeamId::new(value).unwrap_or_else(|_| unreachable!("valid team id"))
    }

    fn ready(record: PermissionRecord) -> PermissionStatus {
        PermissionStatus::Ready(Arc::new(record))
    }

    fn coach_status() -> PermissionStatus {
        ready(PermissionRecord::from_facets(
            [permission("events.manage")],
            [team("u10-hawks")],
            [Role::Coach],
        ))
    }

    #[test]
    fn loading_status_renders_placeholder_by_default() {
        let gate = Gate::new(
            AccessRequirement::permission(permission("events.manage")),
            "roster",
        );

        assert_eq!(gate.state(&PermissionStatus::Loading), GateState::Loading);
        assert_eq!(gate.render(&PermissionStatus::Loading), GateOutput::Placeholder);
    }

    #[test]
    fn loading_status_renders_custom_loading_fallback() {
        let gate = Gate::new(
            AccessRequirement::permission(permission("events.manage")),
            "roster",
        )
        .with_loading_fallback("spinner");

        assert_eq!(
            gate.render(&PermissionStatus::Loading),
            GateOutput::Loading(&"spinner")
        );
    }

    #[test]
    fn denied_gate_renders_fallback_or_nothing() {
        let status = coach_status();
        let bare = Gate::new(
            AccessRequirement::permission(permission("subscriptions.manage")),
            "billing",
        );
        let with_fallback = bare.clone().with_fallback("upgrade prompt");

        assert_eq!(bare.render(&status), GateOutput::Nothing);
        assert_eq!(
            with_fallback.render(&status),
            GateOutput::Fallback(&"upgrade prompt")
        );
        assert_eq!(with_fallback.render(&status).view(), Some(&"upgrade prompt"));
    }

    #[test]
    fn team_scoped_gate_checks_team_access() {
        let status = coach_status();
        let own_team = Gate::new(
            AccessRequirement::team_permission(permission("events.manage"), team("u10-hawks")),
            "event editor",
        );
        let other_team = Gate::new(
            AccessRequirement::team_permission(permission("events.manage"), team("u16-bears")),
            "event editor",
        );

        assert_eq!(own_team.state(&status), GateState::Granted);
        assert_eq!(other_team.state(&status), GateState::Denied);
    }

    #[test]
    fn role_gate_uses_and_or_semantics() {
        let status = coach_status();
        let any = Gate::new(AccessRequirement::any_role([Role::Admin, Role::Coach]), ());
        let all = Gate::new(AccessRequirement::all_roles([Role::Admin, Role::Coach]), ());

        assert_eq!(any.state(&status), GateState::Granted);
        assert_eq!(all.state(&status), GateState::Denied);
    }

    struct SlowPermissionSource {
        granted: HashMap<String, Vec<&'static str>>,
    }

    #[async_trait]
    impl PermissionSource for SlowPermissionSource {
        async fn user_permissions(&self, user_id: &UserId) -> AppResult<Vec<PermissionName>> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(self
                .granted
                .get(user_id.as_str())
                .map(|names| names.iter().map(|name| permission(name)).collect())
                .unwrap_or_default())
        }

        async fn accessible_teams(&self, _user_id: &UserId) -> AppResult<Vec<TeamId>> {
            Ok(Vec::new())
        }

        async fn active_roles(&self, _user_id: &UserId) -> AppResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn has_permission(&self, _user_id: &UserId, _permission: &str) -> AppResult<bool> {
            Ok(false)
        }
    }

    #[derive(Default)]
    struct MapPermissionCache {
        entries: Mutex<HashMap<UserId, Arc<PermissionRecord>>>,
    }

    #[async_trait]
    impl PermissionCache for MapPermissionCache {
        async fn get(&self, user_id: &UserId) -> AppResult<Option<Arc<PermissionRecord>>> {
            Ok(self.entries.lock().await.get(user_id).cloned())
        }

        async fn put(&self, user_id: &UserId, record: Arc<PermissionRecord>) -> AppResult<()> {
            self.entries.lock().await.insert(user_id.clone(), record);
            Ok(())
        }

        async fn evict(&self, user_id: &UserId) -> AppResult<()> {
            self.entries.lock().await.remove(user_id);
            Ok(())
        }

        async fn clear(&self) -> AppResult<()> {
            self.entries.lock().await.clear();
            Ok(())
        }

        async fn remaining_ttl(&self, _user_id: &UserId) -> AppResult<Option<Duration>> {
            Ok(None)
        }
    }

    fn attendance_gate() -> Gate<&'static str> {
        Gate::new(
            AccessRequirement::permission(permission("attendance.manage")),
            "attendance sheet",
        )
        .with_fallback("ask your coach")
    }

    async fn render_sequence<'a>(
        gate: &'a Gate<&'static str>,
        principal: &str,
    ) -> Vec<GateOutput<'a, &'static str>> {
        let source = SlowPermissionSource {
            granted: HashMap::from([("coach-1".to_owned(), vec!["attendance.manage"])]),
        };
        let context = Arc::new(PermissionContext::new(PermissionResolver::new(
            Arc::new(source),
            Arc::new(MapPermissionCache::default()),
        )));
        let mut receiver = context.subscribe();
        let initial = receiver.borrow_and_update().clone();
        let mut rendered = vec![gate.render(&initial)];

        let principal = UserId::new(principal).ok();
        let resolving = {
            let context = context.clone();
            tokio::spawn(async move { context.set_principal(principal).await })
        };

        while receiver.changed().await.is_ok() {
            let status = receiver.borrow_and_update().clone();
            rendered.push(gate.render(&status));
            if !status.is_loading() {
                break;
            }
        }
        assert!(resolving.await.is_ok());

        rendered
    }

    #[tokio::test(start_paused = true)]
    async fn mounted_gate_shows_placeholder_then_children_when_granted() {
        let gate = attendance_gate();
        let rendered = render_sequence(&gate, "coach-1").await;

        assert_eq!(rendered.first(), Some(&GateOutput::Placeholder));
        assert_eq!(
            rendered.last(),
            Some(&GateOutput::Children(&"attendance sheet"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn mounted_gate_shows_placeholder_then_fallback_when_denied() {
        let gate = attendance_gate();
        let rendered = render_sequence(&gate, "parent-1").await;

        assert_eq!(rendered.first(), Some(&GateOutput::Placeholder));
        assert_eq!(
            rendered.last(),
            Some(&GateOutput::Fallback(&"ask your coach"))
        );
    }
}
