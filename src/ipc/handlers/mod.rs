pub mod attendance;
pub mod auth;
pub mod backup;
pub mod core;
pub mod exams;
pub mod fees;
pub mod students;
