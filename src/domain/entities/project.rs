use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Lifecycle of a project. Transitions are owned by project management, not by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[display("N")]
    #[serde(rename = "N")]
    New,

    #[display("A")]
    #[serde(rename = "A")]
    Active,

    #[display("C")]
    #[serde(rename = "C")]
    Closed,
}

impl ProjectStatus {
    pub fn code(&self) -> &'static str {
        match self {
            ProjectStatus::New => "N",
            ProjectStatus::Active => "A",
            ProjectStatus::Closed => "C",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" => Ok(ProjectStatus::New),
            "A" => Ok(ProjectStatus::Active),
            "C" => Ok(ProjectStatus::Closed),
            _ => Err(AppError::BadRequest(format!("Invalid project status: {:?}", s))),
        }
    }
}

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub organization_id: i64,
    pub status: String,
    pub remote: bool,
    pub job_title_ids: Vec<i64>,
    pub skill_ids: Vec<i64>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub organization_id: i64,
    pub status: ProjectStatus,
    pub remote: bool,
    pub job_title_ids: Vec<i64>,
    pub skill_ids: Vec<i64>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = AppError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let status = ProjectStatus::from_str(&row.status).map_err(|_| {
            AppError::StoreError(format!("Project {} has unknown status {:?}", row.id, row.status))
        })?;

        Ok(Project {
            id: row.id,
            title: row.title,
            description: row.description,
            organization_id: row.organization_id,
            status,
            remote: row.remote,
            job_title_ids: row.job_title_ids,
            skill_ids: row.skill_ids,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct JobTitle {
    pub id: i64,
    pub name: String,
}

// ───── Input ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OrganizationProjectsQuery {
    pub organization_id: i64,
    pub status: Option<String>,
}
