use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::{ValidatedJson, ValidatedQuery};

use crate::models::{
    AvailabilityQuery, AvailableSlot, CreateDoctorScheduleRequest, DoctorAvailability,
    DoctorSchedule, ScheduleException, Specialty, SpecialtyInput, UpdateDoctorScheduleRequest,
};
use crate::state::ScheduleCellState;

// ==============================================================================
// SPECIALTIES
// ==============================================================================

pub async fn list_specialties(
    State(state): State<Arc<ScheduleCellState>>,
) -> Result<Json<Vec<Specialty>>, AppError> {
    let specialties = state.specialty_service().list_specialties().await?;
    Ok(Json(specialties))
}

pub async fn get_specialty(
    State(state): State<Arc<ScheduleCellState>>,
    Path(specialty_id): Path<Uuid>,
) -> Result<Json<Specialty>, AppError> {
    let specialty = state.specialty_service().get_specialty(specialty_id).await?
        .ok_or_else(|| AppError::NotFound(format!("Specialty {} not found", specialty_id)))?;

    Ok(Json(specialty))
}

pub async fn create_specialty(
    State(state): State<Arc<ScheduleCellState>>,
    Extension(user): Extension<User>,
    ValidatedJson(input): ValidatedJson<SpecialtyInput>,
) -> Result<(StatusCode, Json<Specialty>), AppError> {
    let specialty = state.specialty_service().create_specialty(&user, input).await?;
    Ok((StatusCode::CREATED, Json(specialty)))
}

pub async fn update_specialty(
    State(state): State<Arc<ScheduleCellState>>,
    Extension(user): Extension<User>,
    Path(specialty_id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<SpecialtyInput>,
) -> Result<Json<Specialty>, AppError> {
    let specialty = state.specialty_service().update_specialty(&user, specialty_id, input).await?;
    Ok(Json(specialty))
}

pub async fn deactivate_specialty(
    State(state): State<Arc<ScheduleCellState>>,
    Extension(user): Extension<User>,
    Path(specialty_id): Path<Uuid>,
) -> Result<Json<Specialty>, AppError> {
    let specialty = state.specialty_service().deactivate_specialty(&user, specialty_id).await?;
    Ok(Json(specialty))
}

// ==============================================================================
// DOCTOR SCHEDULES
// ==============================================================================

pub async fn list_schedules(
    State(state): State<Arc<ScheduleCellState>>,
) -> Result<Json<Vec<DoctorSchedule>>, AppError> {
    let schedules = state.schedule_service().list_schedules().await?;
    Ok(Json(schedules))
}

pub async fn get_schedule(
    State(state): State<Arc<ScheduleCellState>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<DoctorSchedule>, AppError> {
    let schedule = state.schedule_service().get_schedule(&doctor_id).await?
        .ok_or_else(|| AppError::NotFound(format!("Schedule not found for doctor {}", doctor_id)))?;

    Ok(Json(schedule))
}

pub async fn create_schedule(
    State(state): State<Arc<ScheduleCellState>>,
    Extension(user): Extension<User>,
    ValidatedJson(request): ValidatedJson<CreateDoctorScheduleRequest>,
) -> Result<(StatusCode, Json<DoctorSchedule>), AppError> {
    let schedule = state.schedule_service().create_schedule(&user, request).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

pub async fn update_schedule(
    State(state): State<Arc<ScheduleCellState>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateDoctorScheduleRequest>,
) -> Result<Json<DoctorSchedule>, AppError> {
    let schedule = state.schedule_service().update_schedule(&user, &doctor_id, request).await?;
    Ok(Json(schedule))
}

pub async fn add_schedule_exception(
    State(state): State<Arc<ScheduleCellState>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<String>,
    ValidatedJson(exception): ValidatedJson<ScheduleException>,
) -> Result<(StatusCode, Json<DoctorSchedule>), AppError> {
    let schedule = state.schedule_service().add_exception(&user, &doctor_id, exception).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

pub async fn delete_schedule(
    State(state): State<Arc<ScheduleCellState>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let schedule = state.schedule_service().delete_schedule(&user, &doctor_id).await?;

    Ok(Json(json!({
        "deleted": true,
        "schedule_id": schedule.id,
        "doctor_id": schedule.doctor_id,
    })))
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

pub async fn availability_by_doctor(
    State(state): State<Arc<ScheduleCellState>>,
    Path(doctor_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<AvailabilityQuery>,
) -> Result<Json<Vec<AvailableSlot>>, AppError> {
    let slots = state.resolver()
        .availability_by_doctor(&doctor_id, query.start_date, query.end_date)
        .await?;

    Ok(Json(slots))
}

pub async fn availability_by_specialty(
    State(state): State<Arc<ScheduleCellState>>,
    Path(specialty_id): Path<Uuid>,
    ValidatedQuery(query): ValidatedQuery<AvailabilityQuery>,
) -> Result<Json<Vec<DoctorAvailability>>, AppError> {
    let groups = state.resolver()
        .availability_by_specialty(specialty_id, query.start_date, query.end_date)
        .await?;

    Ok(Json(groups))
}
