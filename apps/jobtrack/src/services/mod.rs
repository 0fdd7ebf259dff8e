//! Typed wrappers per backend area. Each call checks its outbound payload,
//! goes through the gateway, and returns only contract-checked data.

pub mod auth;
pub mod interview;
pub mod jobs;
pub mod resumes;

pub use auth::AuthService;
pub use interview::InterviewService;
pub use jobs::JobService;
pub use resumes::ResumeService;
