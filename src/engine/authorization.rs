use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use serde::Serialize;

use crate::config::Config;
use crate::db::models::timesheet::Item;
use crate::db::store::{StoreError, TimesheetStore};

/// ✅ **Supervision scope cache using `moka`**
pub type ScopeCache = Arc<Cache<i32, SupervisionScope>>;

/// ✅ **Initialize the `moka` cache** (TTL from config)
pub fn create_scope_cache() -> ScopeCache {
    let config = Config::get();
    Arc::new(
        Cache::builder()
            .max_capacity(config.scope_cache_capacity)
            .time_to_live(Duration::from_secs(config.scope_cache_ttl_secs))
            .build(),
    )
}

/// Everything a supervisor may act on, derived transitively from the project
/// and team hierarchies at resolution time.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisionScope {
    pub project_ids: HashSet<i32>,
    pub team_ids: HashSet<i32>,
    pub user_ids: HashSet<i32>,
}

impl SupervisionScope {
    pub fn supervises_user(&self, user_id: i32) -> bool {
        self.user_ids.contains(&user_id)
    }

    /// Item-level check: an item tied to a project or team is actionable when
    /// the supervisor runs that specific project/team, or supervises the
    /// owning employee through either hierarchy. Items tied to neither fall
    /// back to the employee-level check alone. This is what lets an org-wide
    /// team supervisor approve cross-project entries without being assigned
    /// to every project.
    pub fn permits_item(&self, owner_id: i32, item: &Item) -> bool {
        match (item.project_id, item.team_id) {
            (None, None) => self.supervises_user(owner_id),
            (project, team) => {
                project.is_some_and(|id| self.project_ids.contains(&id))
                    || team.is_some_and(|id| self.team_ids.contains(&id))
                    || self.supervises_user(owner_id)
            }
        }
    }
}

/// Resolve the scope for a supervisor, consulting the cache first.
pub async fn resolve_scope(
    store: &dyn TimesheetStore,
    cache: &ScopeCache,
    supervisor_id: i32,
) -> Result<SupervisionScope, StoreError> {
    if let Some(scope) = cache.get(&supervisor_id) {
        return Ok(scope);
    }

    let mut scope = SupervisionScope::default();
    for project in store.find_projects_by_supervisor(supervisor_id).await? {
        scope.project_ids.insert(project.id);
        scope.user_ids.extend(project.employees);
    }
    for team in store.find_teams_by_supervisor(supervisor_id).await? {
        scope.team_ids.insert(team.id);
        scope.user_ids.extend(team.members);
    }

    cache.insert(supervisor_id, scope.clone());
    Ok(scope)
}

/// Reverse lookup: every distinct supervisor responsible for an employee via
/// any project they work on or team they belong to. The employee themself is
/// excluded so self-supervised setups cannot self-approve.
pub async fn supervisors_of(
    store: &dyn TimesheetStore,
    employee_id: i32,
) -> Result<Vec<i32>, StoreError> {
    let mut supervisors = HashSet::new();
    for project in store.find_projects_by_member(employee_id).await? {
        if let Some(id) = project.supervisor {
            supervisors.insert(id);
        }
    }
    for team in store.find_teams_by_member(employee_id).await? {
        if let Some(id) = team.supervisor {
            supervisors.insert(id);
        }
    }
    supervisors.remove(&employee_id);

    let mut list: Vec<i32> = supervisors.into_iter().collect();
    list.sort_unstable();
    Ok(list)
}
