use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{self, PgPool, Postgres, QueryBuilder};

use crate::{
    entities::relationship::{
        Relationship, RelationshipChange, RelationshipRow, RelationshipStatus, RelationshipUpsert,
    },
    errors::AppError,
    repositories::sqlx_repo::SqlxRelationshipRepo,
};

const RELATIONSHIP_COLUMNS: &str =
    "id, user_id, project_id, status, comment, resume_flag, created_at, updated_at";

#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Inserts or overwrites in place the record for `(user_id, project_id)`.
    ///
    /// An overwrite keeps the record id. The write is a single atomic statement.
    async fn upsert(&self, relationship: &RelationshipUpsert) -> Result<Relationship, AppError>;

    /// Rewrites an existing record in one statement; `NotFound` when the pair has none.
    async fn update(&self, change: &RelationshipChange) -> Result<Relationship, AppError>;

    /// All records of a project, most recent `created_at` first.
    async fn list_by_project(&self, project_id: i64) -> Result<Vec<Relationship>, AppError>;

    /// Records of a user, optionally narrowed to one status, most recent `created_at` first.
    async fn list_by_user_and_status(
        &self,
        user_id: i64,
        status: Option<RelationshipStatus>,
    ) -> Result<Vec<Relationship>, AppError>;
}

#[async_trait]
impl<T> RelationshipRepository for Arc<T>
where
    T: RelationshipRepository + ?Sized,
{
    async fn upsert(&self, relationship: &RelationshipUpsert) -> Result<Relationship, AppError> {
        (**self).upsert(relationship).await
    }

    async fn update(&self, change: &RelationshipChange) -> Result<Relationship, AppError> {
        (**self).update(change).await
    }

    async fn list_by_project(&self, project_id: i64) -> Result<Vec<Relationship>, AppError> {
        (**self).list_by_project(project_id).await
    }

    async fn list_by_user_and_status(
        &self,
        user_id: i64,
        status: Option<RelationshipStatus>,
    ) -> Result<Vec<Relationship>, AppError> {
        (**self).list_by_user_and_status(user_id, status).await
    }
}

impl SqlxRelationshipRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxRelationshipRepo { pool }
    }
}

#[async_trait]
impl RelationshipRepository for SqlxRelationshipRepo {
    async fn upsert(&self, relationship: &RelationshipUpsert) -> Result<Relationship, AppError> {
        let row = sqlx::query_as::<_, RelationshipRow>(&format!(
            r#"
            INSERT INTO user_projects (
                user_id, project_id, status, comment, resume_flag, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, project_id) DO UPDATE SET
                status = EXCLUDED.status,
                comment = EXCLUDED.comment,
                resume_flag = EXCLUDED.resume_flag,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at
            RETURNING {RELATIONSHIP_COLUMNS}
            "#
        ))
        .bind(relationship.user_id)
        .bind(relationship.project_id)
        .bind(relationship.status.code())
        .bind(relationship.comment.as_deref())
        .bind(relationship.resume_flag)
        .bind(relationship.created_at)
        .bind(relationship.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Relationship::try_from(row)
    }

    async fn update(&self, change: &RelationshipChange) -> Result<Relationship, AppError> {
        let row = sqlx::query_as::<_, RelationshipRow>(&format!(
            r#"
            UPDATE user_projects
            SET status = $3, comment = $4, resume_flag = $5, updated_at = $6
            WHERE user_id = $1 AND project_id = $2
            RETURNING {RELATIONSHIP_COLUMNS}
            "#
        ))
        .bind(change.user_id)
        .bind(change.project_id)
        .bind(change.status.code())
        .bind(change.comment.as_deref())
        .bind(change.resume_flag)
        .bind(change.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_linked(change.user_id, change.project_id))?;

        Relationship::try_from(row)
    }

    async fn list_by_project(&self, project_id: i64) -> Result<Vec<Relationship>, AppError> {
        let rows = sqlx::query_as::<_, RelationshipRow>(&format!(
            r#"
            SELECT {RELATIONSHIP_COLUMNS} FROM user_projects
            WHERE project_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Relationship::try_from).collect()
    }

    async fn list_by_user_and_status(
        &self,
        user_id: i64,
        status: Option<RelationshipStatus>,
    ) -> Result<Vec<Relationship>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {RELATIONSHIP_COLUMNS} FROM user_projects"
        ));
        builder.push(" WHERE user_id = ").push_bind(user_id);

        if let Some(status) = status {
            builder.push(" AND status = ").push_bind(status.code());
        }

        builder.push(" ORDER BY created_at DESC, id DESC");

        let rows: Vec<RelationshipRow> = builder
            .build_query_as::<RelationshipRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Relationship::try_from).collect()
    }
}

pub(crate) fn not_linked(user_id: i64, project_id: i64) -> AppError {
    AppError::NotFound(format!(
        "No relationship of user {} for project {}",
        user_id, project_id
    ))
}
