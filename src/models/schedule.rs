// src/models/schedule.rs

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// An administrator-defined exam instance, as kept under the `schedules` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ScheduleDefinition {
    pub id: String,
    pub name: String,
    pub subject_id: String,
    pub class_id: String,

    /// Calendar day of the exam, `YYYY-MM-DD`.
    #[validate(custom(function = validate_date))]
    pub date: String,

    /// Window opening time, `HH:MM`.
    #[validate(custom(function = validate_time))]
    pub start_time: String,

    /// Window closing time, `HH:MM`.
    #[validate(custom(function = validate_time))]
    pub end_time: String,

    #[validate(range(min = 1, message = "question_count must be at least 1"))]
    pub question_count: u32,

    #[validate(range(min = 1, message = "duration_minutes must be at least 1"))]
    pub duration_minutes: u32,
}

impl ScheduleDefinition {
    /// Countdown length in seconds.
    pub fn duration_secs(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }

    /// The `[start, end]` window as local date-times, or `None` when the
    /// stored strings do not parse.
    pub fn window(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let date = parse_date(&self.date)?;
        let start = parse_time(&self.start_time)?;
        let end = parse_time(&self.end_time)?;
        Some((date.and_time(start), date.and_time(end)))
    }

    pub fn is_open_at(&self, now: NaiveDateTime) -> bool {
        match self.window() {
            Some((start, end)) => now >= start && now <= end,
            None => false,
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M").ok()
}

fn validate_date(raw: &str) -> Result<(), validator::ValidationError> {
    if parse_date(raw).is_none() {
        return Err(validator::ValidationError::new("invalid_date"));
    }
    Ok(())
}

fn validate_time(raw: &str) -> Result<(), validator::ValidationError> {
    if parse_time(raw).is_none() {
        return Err(validator::ValidationError::new("invalid_time"));
    }
    Ok(())
}
