pub mod payroll;
pub mod profile;
pub mod role;
