//! Repository ports for the schedule side of the agenda.
//!
//! Stores own the invariants that must hold under concurrent writers: unique
//! specialty names, a single active schedule per doctor, and compare-and-swap
//! replacement of schedules on their `version` token.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use shared_database::DatabaseError;

use crate::models::{BookedSlot, DoctorSchedule, Specialty};

pub mod memory;
pub mod supabase;

pub use memory::{InMemoryScheduleStore, InMemorySpecialtyStore};
pub use supabase::{SupabaseScheduleStore, SupabaseSpecialtyStore};

#[async_trait]
pub trait SpecialtyStore: Send + Sync {
    /// Fails with `DatabaseError::Conflict` when the name is taken.
    async fn insert(&self, specialty: Specialty) -> Result<Specialty, DatabaseError>;

    async fn get(&self, id: Uuid) -> Result<Option<Specialty>, DatabaseError>;

    async fn list(&self) -> Result<Vec<Specialty>, DatabaseError>;

    /// Fails with `Conflict` on a name clash and `NotFound` for an unknown id.
    async fn update(&self, specialty: Specialty) -> Result<Specialty, DatabaseError>;
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Fails with `Conflict` when the doctor already has an active schedule.
    async fn insert(&self, schedule: DoctorSchedule) -> Result<DoctorSchedule, DatabaseError>;

    async fn find_active(&self, doctor_id: &str) -> Result<Option<DoctorSchedule>, DatabaseError>;

    async fn list_active(&self) -> Result<Vec<DoctorSchedule>, DatabaseError>;

    async fn list_active_for_specialty(&self, specialty_id: Uuid) -> Result<Vec<DoctorSchedule>, DatabaseError>;

    /// Writes `schedule` only if the stored version still equals
    /// `schedule.version`, returning the stored copy with the version bumped.
    /// A stale version fails with `Conflict`.
    async fn replace(&self, schedule: DoctorSchedule) -> Result<DoctorSchedule, DatabaseError>;
}

/// Read-side view of the appointment ledger used by the availability resolver.
#[async_trait]
pub trait BookingLookup: Send + Sync {
    /// Live (non-cancelled) bookings of the doctor with dates in `[start, end]`.
    async fn booked_slots(
        &self,
        doctor_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BookedSlot>, DatabaseError>;
}
