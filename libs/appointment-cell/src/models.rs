// libs/appointment-cell/src/models.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use schedule_cell::{ClockTime, ScheduleError};
use shared_database::DatabaseError;
use shared_models::error::AppError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: String,
    pub patient_id: String,
    pub specialty_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Anything but a cancelled appointment holds its slot.
    pub fn is_live(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }

    pub fn occupies(&self, doctor_id: &str, date: NaiveDate, start_time: ClockTime) -> bool {
        self.is_live()
            && self.doctor_id == doctor_id
            && self.appointment_date == date
            && self.start_time == start_time
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Cancelled,
    Completed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppointmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            other => Err(AppointmentError::Validation(format!(
                "Unknown appointment status '{}', expected one of scheduled, confirmed, cancelled, completed",
                other
            ))),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: String,
    /// Defaults to the requester.
    pub patient_id: Option<String>,
    pub specialty_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub notes: Option<String>,
}

/// Status arrives as a raw string so unknown values surface as a validation
/// error rather than a body rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentSearchQuery {
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
}

/// Parsed form of `AppointmentSearchQuery` handed to the stores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.doctor_id.as_deref().map_or(true, |id| appointment.doctor_id == id)
            && self.patient_id.as_deref().map_or(true, |id| appointment.patient_id == id)
            && self.start_date.map_or(true, |start| appointment.appointment_date >= start)
            && self.end_date.map_or(true, |end| appointment.appointment_date <= end)
            && self.status.map_or(true, |status| appointment.status == status)
    }
}

impl TryFrom<AppointmentSearchQuery> for AppointmentFilter {
    type Error = AppointmentError;

    fn try_from(query: AppointmentSearchQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            doctor_id: query.doctor_id,
            patient_id: query.patient_id,
            start_date: query.start_date,
            end_date: query.end_date,
            status: query.status.as_deref().map(str::parse::<AppointmentStatus>).transpose()?,
        })
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Cannot move appointment from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Database error: {0}")]
    Database(String),
}

impl AppointmentError {
    pub fn slot_not_available() -> Self {
        AppointmentError::Conflict("slot not available".to_string())
    }
}

impl From<DatabaseError> for AppointmentError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Conflict(msg) => AppointmentError::Conflict(msg),
            DatabaseError::NotFound(msg) => AppointmentError::NotFound(msg),
            other => AppointmentError::Database(other.to_string()),
        }
    }
}

impl From<ScheduleError> for AppointmentError {
    fn from(error: ScheduleError) -> Self {
        match error {
            ScheduleError::Validation(msg) => AppointmentError::Validation(msg),
            ScheduleError::NotFound(msg) => AppointmentError::NotFound(msg),
            ScheduleError::Conflict(msg) => AppointmentError::Conflict(msg),
            ScheduleError::Unauthorized(msg) => AppointmentError::Unauthorized(msg),
            ScheduleError::Database(msg) => AppointmentError::Database(msg),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(error: AppointmentError) -> Self {
        match error {
            AppointmentError::Validation(msg) => AppError::ValidationError(msg),
            AppointmentError::NotFound(msg) => AppError::NotFound(msg),
            AppointmentError::Conflict(msg) => AppError::Conflict(msg),
            AppointmentError::Unauthorized(msg) => AppError::Forbidden(msg),
            error @ AppointmentError::InvalidTransition { .. } => {
                AppError::InvalidTransition(error.to_string())
            }
            AppointmentError::Database(msg) => AppError::Database(msg),
        }
    }
}
