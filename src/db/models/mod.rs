pub mod edit_request;
pub mod project;
pub mod reject_reason;
pub mod team;
pub mod timesheet;
pub mod user;
