use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::ScheduleCellState;

pub fn specialty_routes(state: Arc<ScheduleCellState>) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::list_specialties))
        .route("/{specialty_id}", get(handlers::get_specialty));

    // Admin only; the role check happens in the service
    let protected_routes = Router::new()
        .route("/", post(handlers::create_specialty))
        .route("/{specialty_id}", put(handlers::update_specialty))
        .route("/{specialty_id}/deactivate", patch(handlers::deactivate_specialty))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

pub fn schedule_routes(state: Arc<ScheduleCellState>) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::list_schedules))
        .route("/{doctor_id}", get(handlers::get_schedule));

    let protected_routes = Router::new()
        .route("/", post(handlers::create_schedule))
        .route(
            "/{doctor_id}",
            put(handlers::update_schedule).delete(handlers::delete_schedule),
        )
        .route("/{doctor_id}/exceptions", post(handlers::add_schedule_exception))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

pub fn availability_routes(state: Arc<ScheduleCellState>) -> Router {
    Router::new()
        .route("/doctors/{doctor_id}", get(handlers::availability_by_doctor))
        .route("/specialties/{specialty_id}", get(handlers::availability_by_specialty))
        .with_state(state)
}
