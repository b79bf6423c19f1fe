// src/repository/mod.rs
//
// Data access. Every function takes the connection it runs on, so callers
// decide whether a group of calls shares a transaction.

pub mod academics;
pub mod exams;
pub mod questions;
pub mod users;
