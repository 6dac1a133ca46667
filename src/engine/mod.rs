// src/engine/mod.rs

//! Exam Session Engine: question materialization, answer tracking, the
//! countdown and scoring. Synchronous and free of I/O.

pub mod scoring;
pub mod session;
pub mod shuffle;

pub use session::{ExamSession, SessionState};
