// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{AppointmentError, AppointmentStatus};

/// Allowed next statuses. Cancelled and completed are terminal.
pub fn valid_transitions(current_status: AppointmentStatus) -> &'static [AppointmentStatus] {
    match current_status {
        AppointmentStatus::Scheduled => &[AppointmentStatus::Confirmed, AppointmentStatus::Cancelled],
        AppointmentStatus::Confirmed => &[AppointmentStatus::Completed, AppointmentStatus::Cancelled],
        AppointmentStatus::Cancelled | AppointmentStatus::Completed => &[],
    }
}

pub fn validate_status_transition(
    current_status: AppointmentStatus,
    new_status: AppointmentStatus,
) -> Result<(), AppointmentError> {
    debug!("Validating status transition from {} to {}", current_status, new_status);

    if !valid_transitions(current_status).contains(&new_status) {
        warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
        return Err(AppointmentError::InvalidTransition {
            from: current_status,
            to: new_status,
        });
    }

    Ok(())
}
