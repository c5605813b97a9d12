use actix_web::web;

use crate::handlers::projects;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    // Literal segments are registered before `/{project_id}`
    cfg.service(
        web::scope("/projects")
            .service(
                web::resource("")
                    .route(web::get().to(projects::get_projects))
            )
            .service(
                web::resource("/search")
                    .route(web::get().to(projects::search_projects))
            )
            .service(
                web::resource("/job-titles")
                    .route(web::get().to(projects::get_job_titles))
            )
            .service(
                web::resource("/organization")
                    .route(web::get().to(projects::get_projects_by_organization))
            )
            .service(
                web::resource("/user")
                    .route(web::get().to(projects::get_user_projects))
            )
            .service(
                web::resource("/applications")
                    .route(web::post().to(projects::create_application))
                    .route(web::put().to(projects::update_application))
            )
            .service(
                web::resource("/{project_id}")
                    .route(web::get().to(projects::get_project))
            )
            .service(
                web::resource("/{project_id}/applicants")
                    .route(web::get().to(projects::get_applicants))
            )
            .service(
                web::resource("/{project_id}/users/{user_id}")
                    .route(web::post().to(projects::create_user_project))
            )
    );
}
