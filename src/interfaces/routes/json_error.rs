use actix_web::{
    error::InternalError,
    http::StatusCode,
    web,
};

use crate::handlers::json_error::json_error;

/// Malformed bodies, query strings and path segments become JSON 400 responses.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let details = err.to_string();
        InternalError::from_response(err, json_error(StatusCode::BAD_REQUEST, "Invalid JSON payload", &details)).into()
    }));

    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let details = err.to_string();
        InternalError::from_response(err, json_error(StatusCode::BAD_REQUEST, "Invalid query parameters", &details)).into()
    }));

    cfg.app_data(web::PathConfig::default().error_handler(|err, _req| {
        let details = err.to_string();
        InternalError::from_response(err, json_error(StatusCode::BAD_REQUEST, "Invalid path parameter", &details)).into()
    }));
}
