pub mod expense;
pub mod leave_ledger;
pub mod leave_lifecycle;
pub mod team;
