pub mod page;
pub mod project;
pub mod relationship;
pub mod search;
