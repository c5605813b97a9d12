use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    entities::{
        project::{JobTitle, Project, ProjectStatus},
        relationship::{Relationship, RelationshipChange, RelationshipStatus, RelationshipUpsert},
        search::SearchCriteria,
    },
    errors::AppError,
    repositories::{
        project::ProjectRepository,
        relationship::{not_linked, RelationshipRepository},
        user::UserDirectory,
    },
};

/// Process-local store implementing every repository contract.
///
/// Filtering and ordering match the Postgres repositories. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Default)]
struct StoreState {
    projects: BTreeMap<i64, Project>,
    job_titles: Vec<JobTitle>,
    users: BTreeSet<i64>,
    relationships: HashMap<(i64, i64), Relationship>,
    last_relationship_id: i64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_project(&self, project: Project) {
        self.state.write().projects.insert(project.id, project);
    }

    pub fn insert_user(&self, id: i64) {
        self.state.write().users.insert(id);
    }

    pub fn insert_job_title(&self, job_title: JobTitle) {
        self.state.write().job_titles.push(job_title);
    }

    pub fn relationship_count(&self) -> usize {
        self.state.read().relationships.len()
    }
}

fn newest_first(relationships: &mut [Relationship]) {
    relationships.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Project, AppError> {
        self.state
            .read()
            .projects
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))
    }

    async fn list_all(&self) -> Result<Vec<Project>, AppError> {
        Ok(self.state.read().projects.values().rev().cloned().collect())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Project>, AppError> {
        let state = self.state.read();
        Ok(ids
            .iter()
            .filter_map(|id| state.projects.get(id).cloned())
            .collect())
    }

    async fn search(&self, criteria: &SearchCriteria) -> Result<(Vec<Project>, u64), AppError> {
        let state = self.state.read();
        let matching: Vec<&Project> = state
            .projects
            .values()
            .rev()
            .filter(|project| criteria.matches(project))
            .collect();

        let total = matching.len() as u64;
        let rows = matching
            .into_iter()
            .skip(criteria.offset() as usize)
            .take(criteria.size as usize)
            .cloned()
            .collect();

        Ok((rows, total))
    }

    async fn list_job_titles(&self) -> Result<Vec<JobTitle>, AppError> {
        Ok(self.state.read().job_titles.clone())
    }

    async fn list_by_organization(
        &self,
        organization_id: i64,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Project>, AppError> {
        Ok(self
            .state
            .read()
            .projects
            .values()
            .rev()
            .filter(|p| p.organization_id == organization_id)
            .filter(|p| status.is_none_or(|s| p.status == s))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RelationshipRepository for InMemoryStore {
    async fn upsert(&self, relationship: &RelationshipUpsert) -> Result<Relationship, AppError> {
        let mut state = self.state.write();

        if !state.users.contains(&relationship.user_id)
            || !state.projects.contains_key(&relationship.project_id)
        {
            return Err(AppError::NotFound(
                "Referenced user or project does not exist".to_string(),
            ));
        }

        let key = (relationship.user_id, relationship.project_id);
        let id = match state.relationships.get(&key) {
            Some(existing) => existing.id,
            None => {
                state.last_relationship_id += 1;
                state.last_relationship_id
            }
        };

        let stored = Relationship {
            id,
            user_id: relationship.user_id,
            project_id: relationship.project_id,
            status: relationship.status,
            comment: relationship.comment.clone(),
            resume_flag: relationship.resume_flag,
            created_at: relationship.created_at,
            updated_at: relationship.updated_at,
        };
        state.relationships.insert(key, stored.clone());

        Ok(stored)
    }

    async fn update(&self, change: &RelationshipChange) -> Result<Relationship, AppError> {
        let mut state = self.state.write();
        let stored = state
            .relationships
            .get_mut(&(change.user_id, change.project_id))
            .ok_or_else(|| not_linked(change.user_id, change.project_id))?;

        stored.status = change.status;
        stored.comment = change.comment.clone();
        stored.resume_flag = change.resume_flag;
        stored.updated_at = change.updated_at;

        Ok(stored.clone())
    }

    async fn list_by_project(&self, project_id: i64) -> Result<Vec<Relationship>, AppError> {
        let mut relationships: Vec<Relationship> = self
            .state
            .read()
            .relationships
            .values()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect();
        newest_first(&mut relationships);

        Ok(relationships)
    }

    async fn list_by_user_and_status(
        &self,
        user_id: i64,
        status: Option<RelationshipStatus>,
    ) -> Result<Vec<Relationship>, AppError> {
        let mut relationships: Vec<Relationship> = self
            .state
            .read()
            .relationships
            .values()
            .filter(|r| r.user_id == user_id)
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        newest_first(&mut relationships);

        Ok(relationships)
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn user_exists(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.state.read().users.contains(&id))
    }
}
