// src/models/mod.rs

pub mod admin;
pub mod answer;
pub mod exam;
pub mod question;
pub mod session;
pub mod user;
