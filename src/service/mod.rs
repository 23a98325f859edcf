pub mod admin;
pub mod latest;
pub mod viewer;
