pub mod project;
pub mod relationship;
