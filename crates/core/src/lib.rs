//! Domain building blocks shared by the SAT question service crates.

pub mod error;
pub mod image_key;
pub mod question;
pub mod types;
