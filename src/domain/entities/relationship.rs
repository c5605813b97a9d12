use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::AppError;

const MAX_COMMENT_LENGTH: u64 = 2000;

/// State of a user-project relationship.
///
/// Any status may follow any other; the organization decides, this service records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum RelationshipStatus {
    #[display("B")]
    #[serde(rename = "B")]
    Bookmarked,

    #[display("A")]
    #[serde(rename = "A")]
    Applied,

    #[display("C")]
    #[serde(rename = "C")]
    Accepted,

    #[display("D")]
    #[serde(rename = "D")]
    Declined,
}

impl RelationshipStatus {
    pub fn code(&self) -> &'static str {
        match self {
            RelationshipStatus::Bookmarked => "B",
            RelationshipStatus::Applied => "A",
            RelationshipStatus::Accepted => "C",
            RelationshipStatus::Declined => "D",
        }
    }

    /// Applied, Accepted and Declined all count as an application.
    pub fn is_application(&self) -> bool {
        !matches!(self, RelationshipStatus::Bookmarked)
    }
}

impl FromStr for RelationshipStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "B" => Ok(RelationshipStatus::Bookmarked),
            "A" => Ok(RelationshipStatus::Applied),
            "C" => Ok(RelationshipStatus::Accepted),
            "D" => Ok(RelationshipStatus::Declined),
            _ => Err(AppError::BadRequest(format!(
                "Invalid user-project status {:?}, expected one of A, B, C, D",
                s
            ))),
        }
    }
}

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
pub struct RelationshipRow {
    pub id: i64,
    pub user_id: i64,
    pub project_id: i64,
    pub status: String,
    pub comment: Option<String>,
    pub resume_flag: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    pub id: i64,
    pub user_id: i64,
    pub project_id: i64,
    pub status: RelationshipStatus,
    pub comment: Option<String>,
    pub resume_flag: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RelationshipRow> for Relationship {
    type Error = AppError;

    fn try_from(row: RelationshipRow) -> Result<Self, Self::Error> {
        let status = RelationshipStatus::from_str(&row.status).map_err(|_| {
            AppError::StoreError(format!(
                "Relationship {} has unknown status {:?}",
                row.id, row.status
            ))
        })?;

        Ok(Relationship {
            id: row.id,
            user_id: row.user_id,
            project_id: row.project_id,
            status,
            comment: row.comment,
            resume_flag: row.resume_flag,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Full replacement of the record keyed by `(user_id, project_id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipUpsert {
    pub user_id: i64,
    pub project_id: i64,
    pub status: RelationshipStatus,
    pub comment: Option<String>,
    pub resume_flag: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New state for a record that must already exist. Identity and `created_at` are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipChange {
    pub user_id: i64,
    pub project_id: i64,
    pub status: RelationshipStatus,
    pub comment: Option<String>,
    pub resume_flag: bool,
    pub updated_at: DateTime<Utc>,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Applicant {
    pub user_id: i64,
    pub project_id: i64,
    pub status: RelationshipStatus,
    pub comment: Option<String>,
    pub resume_flag: bool,
    pub applied_at: DateTime<Utc>,
}

impl From<Relationship> for Applicant {
    fn from(rel: Relationship) -> Self {
        Applicant {
            user_id: rel.user_id,
            project_id: rel.project_id,
            status: rel.status,
            comment: rel.comment,
            resume_flag: rel.resume_flag,
            applied_at: rel.created_at,
        }
    }
}

// ───── Input & Validation Requests ──────────────────────────────────

/// Bookmark or application request. `status` stays a raw code until the use case parses it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewRelationship {
    pub user_id: i64,
    pub project_id: i64,
    pub status: String,

    #[validate(length(max = MAX_COMMENT_LENGTH, message = "Comment is too long"))]
    pub comment: Option<String>,

    #[serde(default)]
    pub resume_flag: bool,
}

/// Body of `POST /projects/{id}/users/{user_id}`; ids come from the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipBody {
    pub status: String,
    pub comment: Option<String>,
    #[serde(default)]
    pub resume_flag: bool,
}

impl RelationshipBody {
    pub fn into_new_relationship(self, user_id: i64, project_id: i64) -> NewRelationship {
        NewRelationship {
            user_id,
            project_id,
            status: self.status,
            comment: self.comment,
            resume_flag: self.resume_flag,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplicationUpdate {
    pub user_id: i64,
    pub project_id: i64,
    pub status: String,

    #[validate(length(max = MAX_COMMENT_LENGTH, message = "Comment is too long"))]
    pub comment: Option<String>,

    #[serde(default)]
    pub resume_flag: bool,
}

#[derive(Debug, Deserialize)]
pub struct UserProjectsQuery {
    pub user_id: i64,
    pub status: Option<String>,
}

/// Parses an optional status filter. Omitted means "no filter"; present but blank is rejected.
pub fn parse_optional_status(status: Option<&str>) -> Result<Option<RelationshipStatus>, AppError> {
    match status {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Err(AppError::BadRequest(
            "User-project status must not be empty".to_string(),
        )),
        Some(raw) => RelationshipStatus::from_str(raw.trim()).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_legal_code() {
        for (code, status) in [
            ("B", RelationshipStatus::Bookmarked),
            ("A", RelationshipStatus::Applied),
            ("C", RelationshipStatus::Accepted),
            ("D", RelationshipStatus::Declined),
        ] {
            assert_eq!(code.parse::<RelationshipStatus>().unwrap(), status);
            assert_eq!(status.code(), code);
            assert_eq!(status.to_string(), code);
        }
    }

    #[test]
    fn rejects_unknown_and_lowercase_codes() {
        assert!("Z".parse::<RelationshipStatus>().unwrap_err().is_bad_request());
        assert!("a".parse::<RelationshipStatus>().is_err());
        assert!("".parse::<RelationshipStatus>().is_err());
    }

    #[test]
    fn only_bookmark_is_not_an_application() {
        assert!(!RelationshipStatus::Bookmarked.is_application());
        assert!(RelationshipStatus::Applied.is_application());
        assert!(RelationshipStatus::Accepted.is_application());
        assert!(RelationshipStatus::Declined.is_application());
    }

    #[test]
    fn optional_status_distinguishes_missing_from_blank() {
        assert_eq!(parse_optional_status(None).unwrap(), None);
        assert_eq!(
            parse_optional_status(Some("C")).unwrap(),
            Some(RelationshipStatus::Accepted)
        );
        assert!(parse_optional_status(Some("  ")).unwrap_err().is_bad_request());
        assert!(parse_optional_status(Some("X")).unwrap_err().is_bad_request());
    }

    #[test]
    fn status_serializes_as_code() {
        let json = serde_json::to_string(&RelationshipStatus::Declined).unwrap();
        assert_eq!(json, "\"D\"");
    }
}
