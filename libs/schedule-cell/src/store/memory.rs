use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_database::DatabaseError;

use crate::models::{DoctorSchedule, Specialty};
use super::{ScheduleStore, SpecialtyStore};

/// Process-local specialty store. Uniqueness is checked under the write lock.
#[derive(Default)]
pub struct InMemorySpecialtyStore {
    specialties: RwLock<Vec<Specialty>>,
}

impl InMemorySpecialtyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SpecialtyStore for InMemorySpecialtyStore {
    async fn insert(&self, specialty: Specialty) -> Result<Specialty, DatabaseError> {
        let mut specialties = self.specialties.write().await;

        if specialties.iter().any(|existing| existing.name == specialty.name) {
            return Err(DatabaseError::Conflict(format!(
                "Specialty '{}' already exists",
                specialty.name
            )));
        }

        specialties.push(specialty.clone());
        Ok(specialty)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Specialty>, DatabaseError> {
        let specialties = self.specialties.read().await;
        Ok(specialties.iter().find(|specialty| specialty.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Specialty>, DatabaseError> {
        Ok(self.specialties.read().await.clone())
    }

    async fn update(&self, specialty: Specialty) -> Result<Specialty, DatabaseError> {
        let mut specialties = self.specialties.write().await;

        if specialties
            .iter()
            .any(|existing| existing.id != specialty.id && existing.name == specialty.name)
        {
            return Err(DatabaseError::Conflict(format!(
                "Specialty '{}' already exists",
                specialty.name
            )));
        }

        let slot = specialties
            .iter_mut()
            .find(|existing| existing.id == specialty.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Specialty {} not found", specialty.id)))?;

        *slot = specialty.clone();
        Ok(specialty)
    }
}

/// Process-local schedule store. The one-active-schedule rule and the version
/// check both run under the write lock.
#[derive(Default)]
pub struct InMemoryScheduleStore {
    schedules: RwLock<Vec<DoctorSchedule>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn insert(&self, schedule: DoctorSchedule) -> Result<DoctorSchedule, DatabaseError> {
        let mut schedules = self.schedules.write().await;

        if schedule.is_active
            && schedules
                .iter()
                .any(|existing| existing.is_active && existing.doctor_id == schedule.doctor_id)
        {
            return Err(DatabaseError::Conflict(format!(
                "An active schedule already exists for doctor {}",
                schedule.doctor_id
            )));
        }

        schedules.push(schedule.clone());
        Ok(schedule)
    }

    async fn find_active(&self, doctor_id: &str) -> Result<Option<DoctorSchedule>, DatabaseError> {
        let schedules = self.schedules.read().await;
        Ok(schedules
            .iter()
            .find(|schedule| schedule.is_active && schedule.doctor_id == doctor_id)
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<DoctorSchedule>, DatabaseError> {
        let schedules = self.schedules.read().await;
        Ok(schedules.iter().filter(|schedule| schedule.is_active).cloned().collect())
    }

    async fn list_active_for_specialty(&self, specialty_id: Uuid) -> Result<Vec<DoctorSchedule>, DatabaseError> {
        let schedules = self.schedules.read().await;
        Ok(schedules
            .iter()
            .filter(|schedule| schedule.is_active && schedule.offers_specialty(specialty_id))
            .cloned()
            .collect())
    }

    async fn replace(&self, schedule: DoctorSchedule) -> Result<DoctorSchedule, DatabaseError> {
        let mut schedules = self.schedules.write().await;

        if schedule.is_active
            && schedules.iter().any(|existing| {
                existing.id != schedule.id && existing.is_active && existing.doctor_id == schedule.doctor_id
            })
        {
            return Err(DatabaseError::Conflict(format!(
                "An active schedule already exists for doctor {}",
                schedule.doctor_id
            )));
        }

        let stored = schedules
            .iter_mut()
            .find(|existing| existing.id == schedule.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Schedule {} not found", schedule.id)))?;

        if stored.version != schedule.version {
            return Err(DatabaseError::Conflict(format!(
                "Schedule {} was modified concurrently (expected version {}, found {})",
                schedule.id, schedule.version, stored.version
            )));
        }

        *stored = DoctorSchedule {
            version: schedule.version + 1,
            ..schedule
        };

        Ok(stored.clone())
    }
}
