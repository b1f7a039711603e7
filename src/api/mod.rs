pub mod admin;
pub mod expense;
pub mod leave_request;
pub mod manager;
