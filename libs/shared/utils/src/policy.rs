use shared_models::auth::{Role, User};

/// Mutations guarded by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateSpecialty,
    UpdateSpecialty,
    DeactivateSpecialty,
    CreateSchedule,
    UpdateSchedule,
    DeleteSchedule,
    AddScheduleException,
    CreateAppointment,
    /// Confirm or complete. Doctor-side actions.
    ChangeAppointmentStatus,
    CancelAppointment,
}

/// What the action targets, carrying only the ownership data the rules need.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Specialty,
    DoctorSchedule { doctor_id: &'a str },
    NewAppointment,
    Appointment { doctor_id: &'a str, patient_id: &'a str },
}

pub fn can_perform(identity: &User, action: Action, resource: Resource<'_>) -> bool {
    let role = identity.role();

    match action {
        Action::CreateSpecialty | Action::UpdateSpecialty | Action::DeactivateSpecialty => {
            role == Role::Admin
        }
        Action::CreateSchedule | Action::UpdateSchedule | Action::DeleteSchedule => true,
        Action::AddScheduleException => match (role, resource) {
            (Role::Doctor, Resource::DoctorSchedule { doctor_id }) => identity.id == doctor_id,
            (Role::Doctor, _) => false,
            _ => true,
        },
        Action::CreateAppointment => true,
        Action::ChangeAppointmentStatus | Action::CancelAppointment => {
            let Resource::Appointment { doctor_id, patient_id } = resource else {
                return false;
            };

            match role {
                Role::Admin => true,
                Role::Doctor => identity.id == doctor_id,
                Role::Patient => action == Action::CancelAppointment && identity.id == patient_id,
                Role::Other => identity.id == doctor_id || identity.id == patient_id,
            }
        }
    }
}
