pub mod admission_service;
pub mod aggregation;
pub mod attendance_service;
pub mod auth;
pub mod calendar;
pub mod report_service;
pub mod user_service;
pub mod verifier;
