use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use shared_database::DatabaseError;

use crate::models::{DailySchedule, DoctorSchedule, Specialty, TimeSlot};
use crate::store::{ScheduleStore, SpecialtyStore};
use crate::time::ClockTime;

pub const DEMO_DOCTOR_ID: &str = "doctor123";

const DEMO_SPECIALTIES: [(&str, &str); 5] = [
    ("Cardiology", "Diagnosis and treatment of diseases of the heart"),
    ("Neurology", "Disorders of the nervous system"),
    ("Pediatrics", "Medical care of infants, children and adolescents"),
    ("Dermatology", "The skin and its diseases"),
    ("Gynecology", "The female reproductive system"),
];

/// Loads the demo specialties and a schedule for `DEMO_DOCTOR_ID` offering the
/// first two of them. Writes go straight to the stores; entries that already
/// exist are left alone.
pub async fn seed_demo_data(
    specialties: &dyn SpecialtyStore,
    schedules: &dyn ScheduleStore,
) -> Result<(), DatabaseError> {
    let existing = specialties.list().await?;
    let mut offered = Vec::new();

    for (index, (name, description)) in DEMO_SPECIALTIES.iter().enumerate() {
        let specialty = match existing.iter().find(|specialty| specialty.name == *name) {
            Some(specialty) => specialty.clone(),
            None => {
                let now = Utc::now();
                specialties.insert(Specialty {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    description: description.to_string(),
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                }).await?
            }
        };

        if index < 2 {
            offered.push(specialty.id);
        }
    }
    info!("Seeded {} demo specialties", DEMO_SPECIALTIES.len());

    if schedules.find_active(DEMO_DOCTOR_ID).await?.is_some() {
        warn!("Demo doctor {} already has a schedule, skipping", DEMO_DOCTOR_ID);
        return Ok(());
    }

    let now = Utc::now();
    schedules.insert(DoctorSchedule {
        id: Uuid::new_v4(),
        doctor_id: DEMO_DOCTOR_ID.to_string(),
        specialty_ids: offered,
        weekly_schedule: demo_week(),
        exceptions: Vec::new(),
        is_active: true,
        version: 0,
        created_at: now,
        updated_at: now,
    }).await?;

    info!("Seeded demo schedule for doctor {}", DEMO_DOCTOR_ID);
    Ok(())
}

fn hourly(hours: &[u32]) -> Vec<TimeSlot> {
    hours
        .iter()
        .filter_map(|&hour| {
            Some(TimeSlot {
                start_time: ClockTime::new(hour, 0)?,
                end_time: ClockTime::new(hour + 1, 0)?,
                is_available: true,
            })
        })
        .collect()
}

fn day(day_of_week: u8, hours: &[u32]) -> DailySchedule {
    DailySchedule {
        day_of_week,
        time_slots: hourly(hours),
        is_working_day: !hours.is_empty(),
    }
}

fn demo_week() -> Vec<DailySchedule> {
    vec![
        day(0, &[]),
        day(1, &[8, 9, 10, 14, 15]),
        day(2, &[8, 9, 10]),
        day(3, &[14, 15, 16]),
        day(4, &[8, 9]),
        day(5, &[8, 9, 10]),
        day(6, &[]),
    ]
}
