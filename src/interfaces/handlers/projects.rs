use actix_web::{http::header, web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{
        project::OrganizationProjectsQuery,
        relationship::{ApplicationUpdate, NewRelationship, RelationshipBody, UserProjectsQuery},
        search::ProjectSearchQuery,
    },
    errors::AppError,
    AppState,
};

#[instrument(skip(state, query))]
pub async fn search_projects(
    state: web::Data<AppState>,
    query: web::Query<ProjectSearchQuery>,
) -> Result<impl Responder, AppError> {
    let page = state
        .project_handler
        .search(query.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

#[instrument(skip(state))]
pub async fn get_projects(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let projects = state.project_handler.get_projects().await?;
    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(skip(state))]
pub async fn get_project(
    project_id: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let project = state
        .project_handler
        .get_project(project_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(state, query))]
pub async fn get_projects_by_organization(
    state: web::Data<AppState>,
    query: web::Query<OrganizationProjectsQuery>,
) -> Result<impl Responder, AppError> {
    let query = query.into_inner();
    let projects = state
        .project_handler
        .get_projects_by_organization(query.organization_id, query.status.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(skip(state))]
pub async fn get_job_titles(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let job_titles = state.project_handler.get_job_titles().await?;
    Ok(HttpResponse::Ok().json(job_titles))
}

#[instrument(skip(state))]
pub async fn get_applicants(
    project_id: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let applicants = state
        .relationship_handler
        .get_applicants(project_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(applicants))
}

#[instrument(skip(state, query))]
pub async fn get_user_projects(
    state: web::Data<AppState>,
    query: web::Query<UserProjectsQuery>,
) -> Result<impl Responder, AppError> {
    let query = query.into_inner();
    let projects = state
        .relationship_handler
        .get_user_projects(query.user_id, query.status.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(skip(state, data))]
pub async fn create_application(
    state: web::Data<AppState>,
    data: web::Json<NewRelationship>,
) -> Result<impl Responder, AppError> {
    let relationship = state
        .relationship_handler
        .create(data.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(relationship))
}

#[instrument(skip(state, data))]
pub async fn update_application(
    state: web::Data<AppState>,
    data: web::Json<ApplicationUpdate>,
) -> Result<impl Responder, AppError> {
    let relationship = state
        .relationship_handler
        .update(data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(relationship))
}

#[instrument(skip(state, data))]
pub async fn create_user_project(
    path: web::Path<(i64, i64)>,
    state: web::Data<AppState>,
    data: web::Json<RelationshipBody>,
) -> Result<impl Responder, AppError> {
    let (project_id, user_id) = path.into_inner();
    let request = data.into_inner().into_new_relationship(user_id, project_id);

    let relationship = state.relationship_handler.create(request).await?;

    Ok(HttpResponse::Created()
        .insert_header((
            header::LOCATION,
            format!("/api/projects/{}/users/{}", project_id, user_id),
        ))
        .json(relationship))
}
