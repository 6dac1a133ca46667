// src/models/mod.rs

pub mod exam_result;
pub mod question;
pub mod schedule;
pub mod session;
pub mod settings;
pub mod student;
