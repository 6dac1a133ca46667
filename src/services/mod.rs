// src/services/mod.rs

pub mod availability;
pub mod runner;
