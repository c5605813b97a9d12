use std::str::FromStr;

use crate::{
    entities::{
        page::Page,
        project::{JobTitle, Project, ProjectStatus},
        search::{ProjectSearchQuery, SearchCriteria},
    },
    errors::AppError,
    repositories::project::ProjectRepository,
};

pub struct ProjectHandler<P>
where
    P: ProjectRepository,
{
    pub project_repo: P,
}

impl<P> ProjectHandler<P>
where
    P: ProjectRepository,
{
    pub fn new(project_repo: P) -> Self {
        ProjectHandler { project_repo }
    }

    /// Searches projects. The query is fully validated before the store is touched.
    pub async fn search(&self, query: ProjectSearchQuery) -> Result<Page<Project>, AppError> {
        let criteria = SearchCriteria::try_from(query)?;

        let (projects, total) = self.project_repo.search(&criteria).await?;

        tracing::debug!(
            total,
            page = criteria.page,
            size = criteria.size,
            "Project search completed"
        );

        Ok(Page::new(projects, total, criteria.page, criteria.size))
    }

    /// All projects, newest id first
    pub async fn get_projects(&self) -> Result<Vec<Project>, AppError> {
        self.project_repo.list_all().await
    }

    /// Retrieves a project by its ID
    pub async fn get_project(&self, id: i64) -> Result<Project, AppError> {
        self.project_repo.find_by_id(id).await
    }

    /// Projects of one organization, optionally narrowed to a status code (N, A or C)
    pub async fn get_projects_by_organization(
        &self,
        organization_id: i64,
        status: Option<&str>,
    ) -> Result<Vec<Project>, AppError> {
        let status = status
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ProjectStatus::from_str)
            .transpose()?;

        self.project_repo
            .list_by_organization(organization_id, status)
            .await
    }

    pub async fn get_job_titles(&self) -> Result<Vec<JobTitle>, AppError> {
        self.project_repo.list_job_titles().await
    }
}
