// libs/schedule-cell/src/services/schedule.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::auth::User;
use shared_utils::policy::{can_perform, Action, Resource};

use crate::error::ScheduleError;
use crate::models::{
    CreateDoctorScheduleRequest, DailySchedule, DoctorSchedule, ScheduleException,
    TimeSlot, UpdateDoctorScheduleRequest,
};
use crate::store::{ScheduleStore, SpecialtyStore};

/// Weekly templates and their date exceptions, one active schedule per doctor.
pub struct ScheduleService {
    schedules: Arc<dyn ScheduleStore>,
    specialties: Arc<dyn SpecialtyStore>,
}

impl ScheduleService {
    pub fn new(schedules: Arc<dyn ScheduleStore>, specialties: Arc<dyn SpecialtyStore>) -> Self {
        Self { schedules, specialties }
    }

    pub async fn get_schedule(&self, doctor_id: &str) -> Result<Option<DoctorSchedule>, ScheduleError> {
        Ok(self.schedules.find_active(doctor_id).await?)
    }

    pub async fn list_schedules(&self) -> Result<Vec<DoctorSchedule>, ScheduleError> {
        Ok(self.schedules.list_active().await?)
    }

    pub async fn daily_schedule_for(
        &self,
        doctor_id: &str,
        day_of_week: u8,
    ) -> Result<Option<DailySchedule>, ScheduleError> {
        Ok(self.get_schedule(doctor_id).await?
            .and_then(|schedule| schedule.daily_schedule_for(day_of_week).cloned()))
    }

    pub async fn exception_for(
        &self,
        doctor_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ScheduleException>, ScheduleError> {
        Ok(self.get_schedule(doctor_id).await?
            .and_then(|schedule| schedule.exception_for(date).cloned()))
    }

    pub async fn create_schedule(
        &self,
        user: &User,
        request: CreateDoctorScheduleRequest,
    ) -> Result<DoctorSchedule, ScheduleError> {
        authorize(user, Action::CreateSchedule, &request.doctor_id)?;
        debug!("Creating schedule for doctor: {}", request.doctor_id);

        if request.doctor_id.trim().is_empty() {
            return Err(ScheduleError::Validation("doctor_id is required".to_string()));
        }

        let weekly_schedule = normalize_weekly_schedule(request.weekly_schedule)?;
        self.ensure_specialties_exist(&request.specialty_ids).await?;

        let now = Utc::now();
        let schedule = DoctorSchedule {
            id: Uuid::new_v4(),
            doctor_id: request.doctor_id,
            specialty_ids: request.specialty_ids,
            weekly_schedule,
            exceptions: Vec::new(),
            is_active: true,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        let created = self.schedules.insert(schedule).await.map_err(|e| {
            if e.is_conflict() {
                ScheduleError::Conflict("An active schedule already exists for this doctor".to_string())
            } else {
                e.into()
            }
        })?;

        info!("Schedule {} created for doctor {}", created.id, created.doctor_id);
        Ok(created)
    }

    pub async fn update_schedule(
        &self,
        user: &User,
        doctor_id: &str,
        request: UpdateDoctorScheduleRequest,
    ) -> Result<DoctorSchedule, ScheduleError> {
        authorize(user, Action::UpdateSchedule, doctor_id)?;
        debug!("Updating schedule for doctor: {}", doctor_id);

        let mut schedule = self.require_active(doctor_id).await?;

        if let Some(specialty_ids) = request.specialty_ids {
            self.ensure_specialties_exist(&specialty_ids).await?;
            schedule.specialty_ids = specialty_ids;
        }
        if let Some(weekly_schedule) = request.weekly_schedule {
            schedule.weekly_schedule = normalize_weekly_schedule(weekly_schedule)?;
        }

        self.write(schedule).await
    }

    /// Appends a date exception. A date can carry at most one exception.
    pub async fn add_exception(
        &self,
        user: &User,
        doctor_id: &str,
        exception: ScheduleException,
    ) -> Result<DoctorSchedule, ScheduleError> {
        authorize(user, Action::AddScheduleException, doctor_id)?;
        debug!("Adding exception for doctor {} on {}", doctor_id, exception.date);

        if let Some(slots) = &exception.custom_time_slots {
            validate_time_slots(slots)
                .map_err(|msg| ScheduleError::Validation(format!("Exception {}: {}", exception.date, msg)))?;
        }

        let mut schedule = self.require_active(doctor_id).await?;

        if schedule.exception_for(exception.date).is_some() {
            return Err(ScheduleError::Conflict(format!(
                "An exception already exists for {}",
                exception.date
            )));
        }

        schedule.exceptions.push(exception);
        self.write(schedule).await
    }

    /// Deactivates the doctor's active schedule. The record is kept; a new
    /// schedule may be registered afterwards.
    pub async fn delete_schedule(&self, user: &User, doctor_id: &str) -> Result<DoctorSchedule, ScheduleError> {
        authorize(user, Action::DeleteSchedule, doctor_id)?;

        let mut schedule = self.require_active(doctor_id).await?;
        schedule.is_active = false;

        let deactivated = self.write(schedule).await?;
        info!("Schedule {} for doctor {} deactivated", deactivated.id, doctor_id);
        Ok(deactivated)
    }

    async fn require_active(&self, doctor_id: &str) -> Result<DoctorSchedule, ScheduleError> {
        self.schedules.find_active(doctor_id).await?
            .ok_or_else(|| ScheduleError::NotFound(format!("Schedule not found for doctor {}", doctor_id)))
    }

    async fn write(&self, mut schedule: DoctorSchedule) -> Result<DoctorSchedule, ScheduleError> {
        schedule.updated_at = Utc::now();
        let schedule_id = schedule.id;

        self.schedules.replace(schedule).await.map_err(|e| {
            if e.is_conflict() {
                warn!("Concurrent modification of schedule {}", schedule_id);
                ScheduleError::Conflict(
                    "Schedule was modified concurrently, reload and retry".to_string(),
                )
            } else {
                e.into()
            }
        })
    }

    async fn ensure_specialties_exist(&self, specialty_ids: &[Uuid]) -> Result<(), ScheduleError> {
        for (index, id) in specialty_ids.iter().enumerate() {
            if specialty_ids[..index].contains(id) {
                return Err(ScheduleError::Validation(format!("Specialty {} listed twice", id)));
            }
            if self.specialties.get(*id).await?.is_none() {
                return Err(ScheduleError::NotFound(format!("Specialty {} not found", id)));
            }
        }
        Ok(())
    }
}

fn authorize(user: &User, action: Action, doctor_id: &str) -> Result<(), ScheduleError> {
    if can_perform(user, action, Resource::DoctorSchedule { doctor_id }) {
        Ok(())
    } else {
        Err(ScheduleError::Unauthorized("you can only modify your own schedule".to_string()))
    }
}

/// Checks that every day 0..=6 appears exactly once with well-formed slots,
/// and returns the days ordered Sunday first.
pub fn normalize_weekly_schedule(mut days: Vec<DailySchedule>) -> Result<Vec<DailySchedule>, ScheduleError> {
    let mut seen = [false; 7];

    for day in &days {
        let index = usize::from(day.day_of_week);
        if index > 6 {
            return Err(ScheduleError::Validation(format!(
                "Day of week must be between 0 (Sunday) and 6 (Saturday), got {}",
                day.day_of_week
            )));
        }
        if seen[index] {
            return Err(ScheduleError::Validation(format!(
                "Day of week {} is defined more than once",
                day.day_of_week
            )));
        }
        seen[index] = true;

        validate_time_slots(&day.time_slots)
            .map_err(|msg| ScheduleError::Validation(format!("Day {}: {}", day.day_of_week, msg)))?;
    }

    if let Some(missing) = seen.iter().position(|present| !present) {
        return Err(ScheduleError::Validation(format!(
            "Weekly schedule is missing day of week {}",
            missing
        )));
    }

    days.sort_by_key(|day| day.day_of_week);
    Ok(days)
}

/// Slots must run forwards and must not overlap one another.
pub fn validate_time_slots(slots: &[TimeSlot]) -> Result<(), String> {
    for slot in slots {
        if slot.start_time >= slot.end_time {
            return Err(format!(
                "slot {}-{} must start before it ends",
                slot.start_time, slot.end_time
            ));
        }
    }

    let mut ordered: Vec<&TimeSlot> = slots.iter().collect();
    ordered.sort_by_key(|slot| slot.start_time);

    for pair in ordered.windows(2) {
        if pair[0].overlaps(pair[1]) {
            return Err(format!(
                "slots {}-{} and {}-{} overlap",
                pair[0].start_time, pair[0].end_time, pair[1].start_time, pair[1].end_time
            ));
        }
    }

    Ok(())
}
