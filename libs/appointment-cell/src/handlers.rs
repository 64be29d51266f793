use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::{ValidatedJson, ValidatedQuery};

use crate::models::{
    Appointment, AppointmentSearchQuery, CancelAppointmentRequest, CreateAppointmentRequest,
    UpdateStatusRequest,
};
use crate::state::AppointmentCellState;

pub async fn search_appointments(
    State(state): State<Arc<AppointmentCellState>>,
    ValidatedQuery(query): ValidatedQuery<AppointmentSearchQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = state.booking_service().search_appointments(query).await?;
    Ok(Json(appointments))
}

pub async fn get_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state.booking_service().get_appointment(appointment_id).await?
        .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", appointment_id)))?;

    Ok(Json(appointment))
}

pub async fn book_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    ValidatedJson(request): ValidatedJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment = state.booking_service().book_appointment(&user, request).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn update_appointment_status(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateStatusRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state.booking_service()
        .update_status(&user, appointment_id, &request.status)
        .await?;

    Ok(Json(appointment))
}

pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    request: Option<ValidatedJson<CancelAppointmentRequest>>,
) -> Result<Json<Appointment>, AppError> {
    let request = request.map(|ValidatedJson(request)| request).unwrap_or_default();
    let appointment = state.booking_service()
        .cancel_appointment(&user, appointment_id, request)
        .await?;

    Ok(Json(appointment))
}
