// libs/schedule-cell/tests/supabase_store_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use schedule_cell::models::{DoctorSchedule, Specialty};
use schedule_cell::store::{ScheduleStore, SpecialtyStore, SupabaseScheduleStore, SupabaseSpecialtyStore};
use shared_database::{DatabaseError, SupabaseClient};
use shared_utils::test_utils::TestConfig;

fn client(server: &MockServer) -> Arc<SupabaseClient> {
    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    Arc::new(SupabaseClient::new(&config))
}

fn schedule(version: u64) -> DoctorSchedule {
    DoctorSchedule {
        id: Uuid::new_v4(),
        doctor_id: "doc-1".to_string(),
        specialty_ids: vec![Uuid::new_v4()],
        weekly_schedule: vec![],
        exceptions: vec![],
        is_active: true,
        version,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_find_active_filters_by_doctor() {
    let server = MockServer::start().await;
    let stored = schedule(3);

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_schedules"))
        .and(query_param("doctor_id", "eq.doc-1"))
        .and(query_param("is_active", "is.true"))
        .and(header("apikey", "test-anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored])))
        .expect(1)
        .mount(&server)
        .await;

    let store = SupabaseScheduleStore::new(client(&server));
    let found = store.find_active("doc-1").await.unwrap().unwrap();

    assert_eq!(found.id, stored.id);
    assert_eq!(found.version, 3);
}

#[tokio::test]
async fn test_replace_sends_version_guard_and_bumps() {
    let server = MockServer::start().await;
    let current = schedule(2);
    let mut written = current.clone();
    written.version = 3;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctor_schedules"))
        .and(query_param("id", format!("eq.{}", current.id)))
        .and(query_param("version", "eq.2"))
        .and(header("Prefer", "return=representation"))
        .and(body_partial_json(json!({ "version": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([written])))
        .mount(&server)
        .await;

    let store = SupabaseScheduleStore::new(client(&server));
    let result = store.replace(current).await.unwrap();

    assert_eq!(result.version, 3);
}

#[tokio::test]
async fn test_replace_with_stale_version_conflicts() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctor_schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = SupabaseScheduleStore::new(client(&server));
    let result = store.replace(schedule(0)).await;

    assert_matches!(result, Err(DatabaseError::Conflict(_)));
}

#[tokio::test]
async fn test_duplicate_active_schedule_maps_to_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctor_schedules"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"doctor_schedules_one_active\""
        })))
        .mount(&server)
        .await;

    let store = SupabaseScheduleStore::new(client(&server));
    let result = store.insert(schedule(0)).await;

    assert_matches!(result, Err(DatabaseError::Conflict(_)));
}

#[tokio::test]
async fn test_specialty_insert_returns_representation() {
    let server = MockServer::start().await;
    let specialty = Specialty {
        id: Uuid::new_v4(),
        name: "Cardiology".to_string(),
        description: "Heart".to_string(),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    Mock::given(method("POST"))
        .and(path("/rest/v1/specialties"))
        .and(header("Prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([specialty])))
        .mount(&server)
        .await;

    let store = SupabaseSpecialtyStore::new(client(&server));
    let created = store.insert(specialty.clone()).await.unwrap();

    assert_eq!(created, specialty);
}
