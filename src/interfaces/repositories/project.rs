use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{self, PgPool, Postgres, QueryBuilder};

use crate::{
    entities::{
        project::{JobTitle, Project, ProjectRow, ProjectStatus},
        search::SearchCriteria,
    },
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

const PROJECT_COLUMNS: &str = "id, title, description, organization_id, status, remote, \
     job_title_ids, skill_ids, image_url, created_at, updated_at";

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;

    /// Fails with `NotFound` when no project has this id.
    async fn find_by_id(&self, id: i64) -> Result<Project, AppError>;

    /// Every project regardless of status, ordered by id descending.
    async fn list_all(&self) -> Result<Vec<Project>, AppError>;

    /// Unknown ids are skipped; order is unspecified.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Project>, AppError>;

    /// Returns the requested page, ordered by id descending, and the total match count.
    async fn search(&self, criteria: &SearchCriteria) -> Result<(Vec<Project>, u64), AppError>;

    async fn list_job_titles(&self) -> Result<Vec<JobTitle>, AppError>;

    async fn list_by_organization(
        &self,
        organization_id: i64,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Project>, AppError>;
}

#[async_trait]
impl<T> ProjectRepository for Arc<T>
where
    T: ProjectRepository + ?Sized,
{
    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Project, AppError> {
        (**self).find_by_id(id).await
    }

    async fn list_all(&self) -> Result<Vec<Project>, AppError> {
        (**self).list_all().await
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Project>, AppError> {
        (**self).find_by_ids(ids).await
    }

    async fn search(&self, criteria: &SearchCriteria) -> Result<(Vec<Project>, u64), AppError> {
        (**self).search(criteria).await
    }

    async fn list_job_titles(&self) -> Result<Vec<JobTitle>, AppError> {
        (**self).list_job_titles().await
    }

    async fn list_by_organization(
        &self,
        organization_id: i64,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Project>, AppError> {
        (**self).list_by_organization(organization_id, status).await
    }
}

impl SqlxProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, id: i64) -> Result<Project, AppError> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;

        Project::try_from(row)
    }

    async fn list_all(&self) -> Result<Vec<Project>, AppError> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Project::try_from).collect()
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Project>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Project::try_from).collect()
    }

    async fn search(&self, criteria: &SearchCriteria) -> Result<(Vec<Project>, u64), AppError> {
        // Count and rows share one predicate and one snapshot so pages always add up to the total
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM projects");
        push_search_filters(&mut count_builder, criteria);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&mut *tx)
            .await?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PROJECT_COLUMNS} FROM projects"));
        push_search_filters(&mut builder, criteria);
        builder.push(" ORDER BY id DESC LIMIT ").push_bind(i64::from(criteria.size));
        builder.push(" OFFSET ").push_bind(criteria.offset() as i64);

        let rows: Vec<ProjectRow> = builder
            .build_query_as::<ProjectRow>()
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        let projects = rows
            .into_iter()
            .map(Project::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((projects, total.max(0) as u64))
    }

    async fn list_job_titles(&self) -> Result<Vec<JobTitle>, AppError> {
        let titles = sqlx::query_as::<_, JobTitle>(
            "SELECT id, name FROM job_titles ORDER BY display_order, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(titles)
    }

    async fn list_by_organization(
        &self,
        organization_id: i64,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Project>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PROJECT_COLUMNS} FROM projects"));
        builder.push(" WHERE organization_id = ").push_bind(organization_id);

        if let Some(status) = status {
            builder.push(" AND status = ").push_bind(status.code());
        }

        builder.push(" ORDER BY id DESC");

        let rows: Vec<ProjectRow> = builder
            .build_query_as::<ProjectRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Project::try_from).collect()
    }
}

fn push_search_filters(builder: &mut QueryBuilder<'_, Postgres>, criteria: &SearchCriteria) {
    builder.push(" WHERE status = ").push_bind(criteria.status.code());

    if let Some(remote) = criteria.remote {
        builder.push(" AND remote = ").push_bind(remote);
    }

    if let Some(keyword) = &criteria.keyword {
        let pattern = format!("%{}%", escape_like(keyword));
        builder.push(" AND (title ILIKE ").push_bind(pattern.clone());
        builder.push(" OR description ILIKE ").push_bind(pattern);
        builder.push(")");
    }

    if !criteria.job_titles.is_empty() {
        let ids: Vec<i64> = criteria.job_titles.iter().copied().collect();
        builder.push(" AND job_title_ids && ").push_bind(ids);
    }

    if !criteria.skills.is_empty() {
        let ids: Vec<i64> = criteria.skills.iter().copied().collect();
        builder.push(" AND skill_ids && ").push_bind(ids);
    }
}

/// Escapes `ILIKE` wildcards so user keywords match literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
