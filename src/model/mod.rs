pub mod expense;
pub mod leave_balance;
pub mod leave_request;
pub mod role;
pub mod team_assignment;
pub mod user;
