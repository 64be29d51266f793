//! Persistence for the appointment ledger.
//!
//! Every store also implements `schedule_cell::store::BookingLookup`, which
//! is how the availability resolver sees live bookings.

use async_trait::async_trait;
use uuid::Uuid;

use shared_database::DatabaseError;

use crate::models::{Appointment, AppointmentFilter, AppointmentStatus};

pub mod memory;
pub mod supabase;

pub use memory::InMemoryAppointmentStore;
pub use supabase::SupabaseAppointmentStore;

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Inserts unless a live appointment already holds the same doctor, date
    /// and start time, in which case it fails with `Conflict`. The check and
    /// the write are one atomic step.
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, DatabaseError>;

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError>;

    /// Matching appointments ordered by date, then start time.
    async fn search(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, DatabaseError>;

    /// Moves the appointment to `next` only while it is still in `expected`.
    /// A status that changed underneath fails with `Conflict`.
    async fn transition(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
        notes: Option<String>,
    ) -> Result<Appointment, DatabaseError>;
}
