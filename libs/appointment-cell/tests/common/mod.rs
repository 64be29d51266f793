use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use appointment_cell::store::InMemoryAppointmentStore;
use appointment_cell::AppointmentCellState;
use schedule_cell::models::{DailySchedule, DoctorSchedule, Specialty, TimeSlot};
use schedule_cell::store::{InMemoryScheduleStore, InMemorySpecialtyStore, ScheduleStore, SpecialtyStore};
use schedule_cell::ClockTime;
use shared_utils::test_utils::TestConfig;

pub const DOCTOR_ID: &str = "doc-1";

/// 2024-06-03 is a Monday.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

pub fn time(value: &str) -> ClockTime {
    value.parse().unwrap()
}

pub struct Fixture {
    pub state: AppointmentCellState,
    pub specialty_id: Uuid,
}

/// In-memory stores with one specialty and a doctor working Mondays
/// 08:00-10:00 in hourly slots.
pub async fn fixture() -> Fixture {
    let specialties = Arc::new(InMemorySpecialtyStore::new());
    let schedules = Arc::new(InMemoryScheduleStore::new());
    let appointments = Arc::new(InMemoryAppointmentStore::new());

    let now = Utc::now();
    let specialty = specialties
        .insert(Specialty {
            id: Uuid::new_v4(),
            name: "Cardiology".to_string(),
            description: "Heart".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();

    let weekly_schedule = (0..7u8)
        .map(|day_of_week| DailySchedule {
            day_of_week,
            time_slots: if day_of_week == 1 {
                vec![
                    TimeSlot { start_time: time("08:00"), end_time: time("09:00"), is_available: true },
                    TimeSlot { start_time: time("09:00"), end_time: time("10:00"), is_available: true },
                ]
            } else {
                vec![]
            },
            is_working_day: day_of_week == 1,
        })
        .collect();

    schedules
        .insert(DoctorSchedule {
            id: Uuid::new_v4(),
            doctor_id: DOCTOR_ID.to_string(),
            specialty_ids: vec![specialty.id],
            weekly_schedule,
            exceptions: vec![],
            is_active: true,
            version: 0,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();

    let state = AppointmentCellState {
        config: TestConfig::default().to_arc(),
        appointments: appointments.clone(),
        bookings: appointments,
        schedules,
        specialties,
    };

    Fixture { state, specialty_id: specialty.id }
}
