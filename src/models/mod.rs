// src/models/mod.rs

pub mod academic;
pub mod ai;
pub mod exam;
pub mod question;
pub mod user;
