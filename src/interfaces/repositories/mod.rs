pub mod memory;
pub mod project;
pub mod relationship;
pub mod sqlx_repo;
pub mod user;
