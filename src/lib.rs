mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod shared_repos;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{db, telemetry};

use shared_repos::{SharedProjectRepo, SharedRelationshipRepo, SharedRepositories, SharedUserDirectory};
use use_cases::{project::ProjectHandler, relationship::RelationshipHandler};

pub struct AppState {
    pub project_handler: AppProjectHandler,
    pub relationship_handler: AppRelationshipHandler,
}

pub type AppProjectHandler = ProjectHandler<SharedProjectRepo>;
pub type AppRelationshipHandler =
    RelationshipHandler<SharedRelationshipRepo, SharedProjectRepo, SharedUserDirectory>;

impl AppState {
    pub fn new(repos: SharedRepositories) -> Self {
        let project_handler = ProjectHandler::new(repos.project_repo.clone());
        let relationship_handler = RelationshipHandler::new(
            repos.relationship_repo,
            repos.project_repo,
            repos.user_directory,
        );

        AppState {
            project_handler,
            relationship_handler,
        }
    }
}
