// libs/appointment-cell/tests/supabase_store_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{Appointment, AppointmentStatus};
use appointment_cell::store::{AppointmentStore, SupabaseAppointmentStore};
use schedule_cell::store::BookingLookup;
use schedule_cell::ClockTime;
use shared_database::{DatabaseError, SupabaseClient};
use shared_utils::test_utils::TestConfig;

fn store(server: &MockServer) -> SupabaseAppointmentStore {
    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    SupabaseAppointmentStore::new(Arc::new(SupabaseClient::new(&config)))
}

fn appointment(status: AppointmentStatus) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        doctor_id: "doc-1".to_string(),
        patient_id: "patient-1".to_string(),
        specialty_id: Uuid::new_v4(),
        appointment_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        start_time: "08:00".parse().unwrap(),
        end_time: "09:00".parse().unwrap(),
        status,
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_unique_violation_becomes_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"appointments_live_slot\""
        })))
        .mount(&server)
        .await;

    let result = store(&server).insert(appointment(AppointmentStatus::Scheduled)).await;
    assert_matches!(result, Err(DatabaseError::Conflict(_)));
}

#[tokio::test]
async fn test_booked_slots_skip_cancelled_rows() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", "eq.doc-1"))
        .and(query_param("status", "neq.cancelled"))
        .and(query_param("select", "appointment_date,start_time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "appointment_date": "2024-06-03", "start_time": "08:00" },
            { "appointment_date": "2024-06-04", "start_time": "14:30" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let booked = store(&server).booked_slots("doc-1", start, end).await.unwrap();

    assert_eq!(booked.len(), 2);
    assert_eq!(booked[1].start_time, ClockTime::new(14, 30).unwrap());
}

#[tokio::test]
async fn test_transition_guards_on_current_status() {
    let server = MockServer::start().await;
    let current = appointment(AppointmentStatus::Scheduled);
    let mut confirmed = current.clone();
    confirmed.status = AppointmentStatus::Confirmed;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", current.id)))
        .and(query_param("status", "eq.scheduled"))
        .and(body_partial_json(json!({ "status": "confirmed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([confirmed])))
        .mount(&server)
        .await;

    let updated = store(&server)
        .transition(current.id, AppointmentStatus::Scheduled, AppointmentStatus::Confirmed, None)
        .await
        .unwrap();

    assert_eq!(updated.status, AppointmentStatus::Confirmed);
}

#[tokio::test]
async fn test_lost_status_race_is_a_conflict() {
    let server = MockServer::start().await;
    let now_cancelled = appointment(AppointmentStatus::Cancelled);

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", now_cancelled.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([now_cancelled])))
        .mount(&server)
        .await;

    let result = store(&server)
        .transition(now_cancelled.id, AppointmentStatus::Scheduled, AppointmentStatus::Confirmed, None)
        .await;

    assert_matches!(result, Err(DatabaseError::Conflict(_)));
}

#[tokio::test]
async fn test_transition_on_missing_row_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = store(&server)
        .transition(Uuid::new_v4(), AppointmentStatus::Scheduled, AppointmentStatus::Confirmed, None)
        .await;

    assert_matches!(result, Err(DatabaseError::NotFound(_)));
}
