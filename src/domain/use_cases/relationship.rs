use std::collections::HashMap;
use std::str::FromStr;

use chrono::Utc;
use validator::Validate;

use crate::{
    entities::{
        project::Project,
        relationship::{
            parse_optional_status, Applicant, ApplicationUpdate, NewRelationship, Relationship,
            RelationshipChange, RelationshipStatus, RelationshipUpsert,
        },
    },
    errors::AppError,
    repositories::{
        project::ProjectRepository, relationship::RelationshipRepository, user::UserDirectory,
    },
};

/// Owns bookmarks and applications binding one user to one project.
pub struct RelationshipHandler<R, P, U>
where
    R: RelationshipRepository,
    P: ProjectRepository,
    U: UserDirectory,
{
    pub relationship_repo: R,
    pub project_repo: P,
    pub user_directory: U,
}

impl<R, P, U> RelationshipHandler<R, P, U>
where
    R: RelationshipRepository,
    P: ProjectRepository,
    U: UserDirectory,
{
    pub fn new(relationship_repo: R, project_repo: P, user_directory: U) -> Self {
        RelationshipHandler {
            relationship_repo,
            project_repo,
            user_directory,
        }
    }

    /// Bookmarks a project or applies to it.
    ///
    /// A repeat call for the same user and project overwrites the existing record and
    /// refreshes its timestamp. Bookmarks drop any comment or resume flag.
    pub async fn create(&self, request: NewRelationship) -> Result<Relationship, AppError> {
        request.validate()?;
        let status = RelationshipStatus::from_str(&request.status)?;

        self.ensure_user_exists(request.user_id).await?;
        self.project_repo.find_by_id(request.project_id).await?;

        let now = Utc::now();
        let (comment, resume_flag) = match status {
            RelationshipStatus::Bookmarked => (None, false),
            _ => (request.comment, request.resume_flag),
        };

        let relationship = self
            .relationship_repo
            .upsert(&RelationshipUpsert {
                user_id: request.user_id,
                project_id: request.project_id,
                status,
                comment,
                resume_flag,
                created_at: now,
                updated_at: now,
            })
            .await
            .inspect_err(|e| tracing::error!("Failed to save user-project relationship: {}", e))?;

        tracing::info!(
            user_id = relationship.user_id,
            project_id = relationship.project_id,
            status = %relationship.status,
            "User-project relationship saved"
        );

        Ok(relationship)
    }

    /// Moves an existing relationship to a new status. Any status may follow any other.
    pub async fn update(&self, application: ApplicationUpdate) -> Result<Relationship, AppError> {
        application.validate()?;
        let status = RelationshipStatus::from_str(&application.status)?;

        let (comment, resume_flag) = match status {
            RelationshipStatus::Bookmarked => (None, false),
            _ => (application.comment, application.resume_flag),
        };

        // Missing records surface as NotFound from the same statement that writes
        let relationship = self
            .relationship_repo
            .update(&RelationshipChange {
                user_id: application.user_id,
                project_id: application.project_id,
                status,
                comment,
                resume_flag,
                updated_at: Utc::now(),
            })
            .await
            .inspect_err(|e| tracing::error!("Failed to update user-project relationship: {}", e))?;

        tracing::info!(
            user_id = relationship.user_id,
            project_id = relationship.project_id,
            status = %relationship.status,
            "User-project relationship updated"
        );

        Ok(relationship)
    }

    /// Users who applied to a project, most recent first. Bookmarks are left out.
    pub async fn get_applicants(&self, project_id: i64) -> Result<Vec<Applicant>, AppError> {
        self.project_repo.find_by_id(project_id).await?;

        let applicants = self
            .relationship_repo
            .list_by_project(project_id)
            .await?
            .into_iter()
            .filter(|r| r.status.is_application())
            .map(Applicant::from)
            .collect();

        Ok(applicants)
    }

    /// Projects bound to a user, most recently bound first.
    ///
    /// `None` returns every linked project. A blank or unknown status is rejected.
    pub async fn get_user_projects(
        &self,
        user_id: i64,
        status: Option<&str>,
    ) -> Result<Vec<Project>, AppError> {
        let status = parse_optional_status(status)?;
        self.ensure_user_exists(user_id).await?;

        let relationships = self
            .relationship_repo
            .list_by_user_and_status(user_id, status)
            .await?;

        let ids: Vec<i64> = relationships.iter().map(|r| r.project_id).collect();
        let mut projects: HashMap<i64, Project> = self
            .project_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(ids.iter().filter_map(|id| projects.remove(id)).collect())
    }

    async fn ensure_user_exists(&self, user_id: i64) -> Result<(), AppError> {
        if self.user_directory.user_exists(user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("User {} not found", user_id)))
        }
    }
}
