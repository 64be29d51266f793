// libs/schedule-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc, NaiveDate};

use crate::time::ClockTime;

fn default_true() -> bool {
    true
}

// ==============================================================================
// SPECIALTIES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Specialty {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtyInput {
    pub name: String,
    pub description: String,
}

// ==============================================================================
// WEEKLY SCHEDULE AND EXCEPTIONS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSlot {
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

impl TimeSlot {
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailySchedule {
    pub day_of_week: u8, // 0 = Sunday, 1 = Monday, etc.
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    #[serde(default = "default_true")]
    pub is_working_day: bool,
}

/// Date-specific override of the weekly template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleException {
    pub date: NaiveDate,
    pub reason: Option<String>,
    #[serde(default)]
    pub is_available: bool,
    pub custom_time_slots: Option<Vec<TimeSlot>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorSchedule {
    pub id: Uuid,
    pub doctor_id: String,
    pub specialty_ids: Vec<Uuid>,
    pub weekly_schedule: Vec<DailySchedule>,
    #[serde(default)]
    pub exceptions: Vec<ScheduleException>,
    pub is_active: bool,
    /// Bumped by the store on every successful replace.
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DoctorSchedule {
    pub fn daily_schedule_for(&self, day_of_week: u8) -> Option<&DailySchedule> {
        self.weekly_schedule
            .iter()
            .find(|day| day.day_of_week == day_of_week)
    }

    /// First exception recorded for the date.
    pub fn exception_for(&self, date: NaiveDate) -> Option<&ScheduleException> {
        self.exceptions.iter().find(|exception| exception.date == date)
    }

    pub fn offers_specialty(&self, specialty_id: Uuid) -> bool {
        self.specialty_ids.contains(&specialty_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorScheduleRequest {
    pub doctor_id: String,
    pub specialty_ids: Vec<Uuid>,
    pub weekly_schedule: Vec<DailySchedule>,
}

/// Omitted fields are left untouched; provided ones replace the stored value
/// wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDoctorScheduleRequest {
    pub specialty_ids: Option<Vec<Uuid>>,
    pub weekly_schedule: Option<Vec<DailySchedule>>,
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailableSlot {
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub doctor_id: String,
    pub specialty_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorAvailability {
    pub doctor_id: String,
    pub specialty_id: Uuid,
    pub available_slots: Vec<AvailableSlot>,
}

/// Key of a live (non-cancelled) appointment as seen by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BookedSlot {
    pub date: NaiveDate,
    pub start_time: ClockTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
