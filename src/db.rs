pub mod attendance_repo;
pub use attendance_repo::{AttendanceRepository, PgAttendanceRepository};
pub mod user_repo;
pub use user_repo::{AccountRepository, UserProfileRepository, UserRepository};

#[cfg(test)]
pub use attendance_repo::MockAttendanceRepository;
#[cfg(test)]
pub use user_repo::{MockAccountRepository, MockUserProfileRepository};
