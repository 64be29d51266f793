use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::{DatabaseError, SupabaseClient};

use crate::models::{DoctorSchedule, Specialty};
use super::{ScheduleStore, SpecialtyStore};

/// Specialties backed by the `specialties` table. The unique index on `name`
/// turns duplicates into HTTP 409.
pub struct SupabaseSpecialtyStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseSpecialtyStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl SpecialtyStore for SupabaseSpecialtyStore {
    async fn insert(&self, specialty: Specialty) -> Result<Specialty, DatabaseError> {
        let result: Vec<Specialty> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/specialties",
            Some(json!(specialty)),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        result.into_iter().next()
            .ok_or_else(|| DatabaseError::NotFound("Failed to create specialty".to_string()))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Specialty>, DatabaseError> {
        let path = format!("/rest/v1/specialties?id=eq.{}", id);
        let result: Vec<Specialty> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(result.into_iter().next())
    }

    async fn list(&self) -> Result<Vec<Specialty>, DatabaseError> {
        self.supabase.request(Method::GET, "/rest/v1/specialties?order=name.asc", None).await
    }

    async fn update(&self, specialty: Specialty) -> Result<Specialty, DatabaseError> {
        let path = format!("/rest/v1/specialties?id=eq.{}", specialty.id);
        let result: Vec<Specialty> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(json!({
                "name": specialty.name,
                "description": specialty.description,
                "is_active": specialty.is_active,
                "updated_at": specialty.updated_at,
            })),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        result.into_iter().next()
            .ok_or_else(|| DatabaseError::NotFound(format!("Specialty {} not found", specialty.id)))
    }
}

/// Doctor schedules backed by the `doctor_schedules` table. Weekly template
/// and exceptions live in jsonb columns; the partial unique index on
/// `doctor_id where is_active` enforces one active schedule per doctor.
pub struct SupabaseScheduleStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseScheduleStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl ScheduleStore for SupabaseScheduleStore {
    async fn insert(&self, schedule: DoctorSchedule) -> Result<DoctorSchedule, DatabaseError> {
        debug!("Inserting schedule for doctor {}", schedule.doctor_id);

        let result: Vec<DoctorSchedule> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/doctor_schedules",
            Some(json!(schedule)),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        result.into_iter().next()
            .ok_or_else(|| DatabaseError::NotFound("Failed to create schedule".to_string()))
    }

    async fn find_active(&self, doctor_id: &str) -> Result<Option<DoctorSchedule>, DatabaseError> {
        let path = format!(
            "/rest/v1/doctor_schedules?doctor_id=eq.{}&is_active=is.true",
            urlencoding::encode(doctor_id)
        );
        let result: Vec<DoctorSchedule> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(result.into_iter().next())
    }

    async fn list_active(&self) -> Result<Vec<DoctorSchedule>, DatabaseError> {
        self.supabase.request(
            Method::GET,
            "/rest/v1/doctor_schedules?is_active=is.true&order=created_at.asc",
            None,
        ).await
    }

    async fn list_active_for_specialty(&self, specialty_id: Uuid) -> Result<Vec<DoctorSchedule>, DatabaseError> {
        let path = format!(
            "/rest/v1/doctor_schedules?is_active=is.true&specialty_ids=cs.%7B{}%7D&order=created_at.asc",
            specialty_id
        );
        self.supabase.request(Method::GET, &path, None).await
    }

    async fn replace(&self, schedule: DoctorSchedule) -> Result<DoctorSchedule, DatabaseError> {
        let expected_version = schedule.version;
        let path = format!(
            "/rest/v1/doctor_schedules?id=eq.{}&version=eq.{}",
            schedule.id, expected_version
        );

        let body = json!({
            "specialty_ids": schedule.specialty_ids,
            "weekly_schedule": schedule.weekly_schedule,
            "exceptions": schedule.exceptions,
            "is_active": schedule.is_active,
            "version": expected_version + 1,
            "updated_at": schedule.updated_at,
        });

        let result: Vec<DoctorSchedule> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(body),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        // The filter matched nothing: either the row is gone or another writer
        // bumped the version first.
        result.into_iter().next().ok_or_else(|| {
            warn!("Stale write rejected for schedule {} at version {}", schedule.id, expected_version);
            DatabaseError::Conflict(format!(
                "Schedule {} was modified concurrently",
                schedule.id
            ))
        })
    }
}
