pub mod home;
pub mod json_error;
pub mod students;
pub mod system;
