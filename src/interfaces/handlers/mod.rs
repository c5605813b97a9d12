pub mod home;
pub mod json_error;
pub mod projects;
pub mod system;
