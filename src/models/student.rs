// src/models/student.rs

use serde::{Deserialize, Serialize};

/// A student record, as kept under the `students` key.
/// Managed elsewhere; read here only to resolve the student's class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub nis: String,
    pub name: String,
    pub class_id: String,
}
