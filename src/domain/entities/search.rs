use std::borrow::Cow;
use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    entities::project::{Project, ProjectStatus},
    errors::AppError,
};

static SEARCH_STATUS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[AC]$").expect("static pattern"));
static REMOTE_FLAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[YN]$").expect("static pattern"));

// ───── Input & Validation ───────────────────────────────────────────

/// Raw search parameters as they arrive from a caller.
///
/// Id lists are comma separated (`job_titles=3,7`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProjectSearchQuery {
    pub keyword: Option<String>,

    #[validate(custom(function = "validate_id_list"))]
    pub job_titles: Option<String>,

    #[validate(custom(function = "validate_id_list"))]
    pub skills: Option<String>,

    #[validate(regex(path = *SEARCH_STATUS, message = "Status must be A or C"))]
    pub status: Option<String>,

    #[validate(regex(path = *REMOTE_FLAG, message = "Remote must be Y or N"))]
    pub remote: Option<String>,

    pub page: Option<u32>,

    #[validate(range(min = 1, max = MAX_PAGE_SIZE, message = "Size must be between 1 and 100"))]
    pub size: Option<u32>,
}

fn validate_id_list(raw: &str) -> Result<(), ValidationError> {
    parse_id_list(raw)
        .map(|_| ())
        .map_err(|_| new_validation_error("invalid_id_list", "Expected a comma separated list of ids"))
}

fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}

fn parse_id_list(raw: &str) -> Result<BTreeSet<i64>, std::num::ParseIntError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<i64>)
        .collect()
}

// ───── Resolved criteria ────────────────────────────────────────────

/// Validated search criteria with defaults applied.
///
/// Filters combine with AND; inside `job_titles` and `skills` any overlap matches.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    pub keyword: Option<String>,
    pub job_titles: BTreeSet<i64>,
    pub skills: BTreeSet<i64>,
    pub status: ProjectStatus,
    pub remote: Option<bool>,
    pub page: u32,
    pub size: u32,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        SearchCriteria {
            keyword: None,
            job_titles: BTreeSet::new(),
            skills: BTreeSet::new(),
            status: ProjectStatus::Active,
            remote: None,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TryFrom<ProjectSearchQuery> for SearchCriteria {
    type Error = AppError;

    fn try_from(query: ProjectSearchQuery) -> Result<Self, Self::Error> {
        query.validate()?;

        let status = match query.status.as_deref() {
            Some("C") => ProjectStatus::Closed,
            _ => ProjectStatus::Active,
        };
        let remote = query.remote.as_deref().map(|flag| flag == "Y");
        let keyword = query
            .keyword
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Ok(SearchCriteria {
            keyword,
            job_titles: id_set(query.job_titles.as_deref())?,
            skills: id_set(query.skills.as_deref())?,
            status,
            remote,
            page: query.page.unwrap_or(0),
            size: query.size.unwrap_or(DEFAULT_PAGE_SIZE),
        })
    }
}

fn id_set(raw: Option<&str>) -> Result<BTreeSet<i64>, AppError> {
    match raw {
        None => Ok(BTreeSet::new()),
        Some(raw) => parse_id_list(raw)
            .map_err(|e| AppError::BadRequest(format!("Invalid id list {:?}: {}", raw, e))),
    }
}

impl SearchCriteria {
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// The search predicate, for stores that filter in process.
    pub fn matches(&self, project: &Project) -> bool {
        if project.status != self.status {
            return false;
        }
        if let Some(remote) = self.remote {
            if project.remote != remote {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            let needle = keyword.to_lowercase();
            if !project.title.to_lowercase().contains(&needle)
                && !project.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if !self.job_titles.is_empty()
            && !project.job_title_ids.iter().any(|id| self.job_titles.contains(id))
        {
            return false;
        }
        if !self.skills.is_empty()
            && !project.skill_ids.iter().any(|id| self.skills.contains(id))
        {
            return false;
        }
        true
    }
}
