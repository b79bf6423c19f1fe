// src/handlers/mod.rs

pub mod academics;
pub mod ai;
pub mod auth;
pub mod exams;
