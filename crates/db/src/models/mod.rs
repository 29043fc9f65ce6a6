//! Row types and input DTOs, one module per table.

pub mod question;
