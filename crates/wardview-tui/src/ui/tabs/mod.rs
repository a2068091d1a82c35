pub mod departments;
pub mod detail;
pub mod error_page;
pub mod help;
pub mod patients;
pub mod profile;
