use std::sync::Arc;

use crate::repositories::{
    memory::InMemoryStore,
    project::ProjectRepository,
    relationship::RelationshipRepository,
    sqlx_repo::{SqlxProjectRepo, SqlxRelationshipRepo, SqlxUserRepo},
    user::UserDirectory,
};

pub type SharedProjectRepo = Arc<dyn ProjectRepository>;
pub type SharedRelationshipRepo = Arc<dyn RelationshipRepository>;
pub type SharedUserDirectory = Arc<dyn UserDirectory>;

#[derive(Clone)]
pub struct SharedRepositories {
    pub project_repo: SharedProjectRepo,
    pub relationship_repo: SharedRelationshipRepo,
    pub user_directory: SharedUserDirectory,
}

impl SharedRepositories {
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        SharedRepositories {
            project_repo: Arc::new(SqlxProjectRepo::new(pool.clone())),
            relationship_repo: Arc::new(SqlxRelationshipRepo::new(pool.clone())),
            user_directory: Arc::new(SqlxUserRepo::new(pool)),
        }
    }

    pub fn in_memory(store: InMemoryStore) -> Self {
        SharedRepositories {
            project_repo: Arc::new(store.clone()),
            relationship_repo: Arc::new(store.clone()),
            user_directory: Arc::new(store),
        }
    }
}
