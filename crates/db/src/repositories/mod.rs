//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept any Postgres executor (a pool or an open transaction) as the
//! first argument.

pub mod question_repo;

pub use question_repo::QuestionRepo;
