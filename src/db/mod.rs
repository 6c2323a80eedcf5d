pub mod colleges;
pub mod listing;
pub mod programs;
pub mod students;
pub mod users;

pub use colleges::*;
pub use listing::{ListParams, SortOrder};
pub use programs::*;
pub use students::*;
pub use users::*;

/// Reserved code of the fallback parent rows that orphaned programs and students move to.
pub const SENTINEL_CODE: &str = "N/A";
pub const SENTINEL_COLLEGE_NAME: &str = "No College Assigned";
pub const SENTINEL_PROGRAM_NAME: &str = "No Program Assigned";
