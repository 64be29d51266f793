// libs/schedule-cell/src/services/availability.rs
use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::try_join_all;
use tracing::debug;
use uuid::Uuid;

use crate::error::ScheduleError;
use crate::models::{AvailableSlot, BookedSlot, DoctorAvailability, DoctorSchedule, TimeSlot};
use crate::store::{BookingLookup, ScheduleStore};
use crate::time::{day_of_week, ClockTime, DateRange};

/// Widest window a single availability query may cover, in days.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Computes open slots from the weekly template, the date exceptions and the
/// live bookings. Holds no state between calls.
pub struct AvailabilityResolver {
    schedules: Arc<dyn ScheduleStore>,
    bookings: Arc<dyn BookingLookup>,
}

impl AvailabilityResolver {
    pub fn new(schedules: Arc<dyn ScheduleStore>, bookings: Arc<dyn BookingLookup>) -> Self {
        Self { schedules, bookings }
    }

    /// Open slots of one doctor, once per specialty on the schedule, in the
    /// schedule's specialty order. No active schedule means no slots.
    pub async fn availability_by_doctor(
        &self,
        doctor_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<AvailableSlot>, ScheduleError> {
        debug!("Resolving availability for doctor {} from {} to {}", doctor_id, start_date, end_date);
        check_range(start_date, end_date)?;

        let Some(schedule) = self.schedules.find_active(doctor_id).await? else {
            return Ok(Vec::new());
        };

        let booked = self.booked_keys(&schedule.doctor_id, start_date, end_date).await?;

        let slots: Vec<AvailableSlot> = schedule
            .specialty_ids
            .iter()
            .flat_map(|specialty_id| expand_slots(&schedule, *specialty_id, start_date, end_date, &booked))
            .collect();

        debug!("Found {} open slots for doctor {}", slots.len(), doctor_id);
        Ok(slots)
    }

    /// One group per active doctor offering the specialty who has at least one
    /// open slot in the range.
    pub async fn availability_by_specialty(
        &self,
        specialty_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DoctorAvailability>, ScheduleError> {
        debug!("Resolving availability for specialty {} from {} to {}", specialty_id, start_date, end_date);
        check_range(start_date, end_date)?;

        let schedules = self.schedules.list_active_for_specialty(specialty_id).await?;

        let groups = try_join_all(schedules.iter().map(|schedule| async move {
            let booked = self.booked_keys(&schedule.doctor_id, start_date, end_date).await?;
            let available_slots: Vec<AvailableSlot> =
                expand_slots(schedule, specialty_id, start_date, end_date, &booked).collect();

            Ok::<_, ScheduleError>(DoctorAvailability {
                doctor_id: schedule.doctor_id.clone(),
                specialty_id,
                available_slots,
            })
        }))
        .await?;

        Ok(groups
            .into_iter()
            .filter(|group| !group.available_slots.is_empty())
            .collect())
    }

    /// True when no live appointment holds `(doctor_id, date, start_time)`.
    /// Advisory only: the appointment store's unique insert is what settles a
    /// race between two bookings.
    pub async fn is_slot_free(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        start_time: ClockTime,
    ) -> Result<bool, ScheduleError> {
        let booked = self.booked_keys(doctor_id, date, date).await?;
        Ok(!booked.contains(&BookedSlot { date, start_time }))
    }

    async fn booked_keys(
        &self,
        doctor_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<HashSet<BookedSlot>, ScheduleError> {
        if start_date > end_date {
            return Ok(HashSet::new());
        }

        Ok(self.bookings
            .booked_slots(doctor_id, start_date, end_date)
            .await?
            .into_iter()
            .collect())
    }
}

/// Rejects windows wider than [`MAX_RANGE_DAYS`]. An inverted range passes and
/// resolves to nothing.
pub fn check_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), ScheduleError> {
    if (end_date - start_date).num_days() >= MAX_RANGE_DAYS {
        return Err(ScheduleError::Validation(format!(
            "Date range {} to {} exceeds {} days",
            start_date, end_date, MAX_RANGE_DAYS
        )));
    }
    Ok(())
}

/// Slots the template offers for `date` before bookings are considered. An
/// exception replaces the weekly day entirely.
pub fn candidate_slots(schedule: &DoctorSchedule, date: NaiveDate) -> &[TimeSlot] {
    match schedule.exception_for(date) {
        Some(exception) if !exception.is_available => &[],
        Some(exception) => exception.custom_time_slots.as_deref().unwrap_or(&[]),
        None => match schedule.daily_schedule_for(day_of_week(date)) {
            Some(day) if day.is_working_day => day.time_slots.as_slice(),
            _ => &[],
        },
    }
}

/// Lazily expands a schedule over `[start_date, end_date]`, day by day and in
/// slot-list order, skipping unavailable slots and booked keys.
pub fn expand_slots<'a>(
    schedule: &'a DoctorSchedule,
    specialty_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    booked: &'a HashSet<BookedSlot>,
) -> SlotExpansion<'a> {
    SlotExpansion {
        schedule,
        specialty_id,
        booked,
        days: DateRange::inclusive(start_date, end_date),
        current: None,
    }
}

pub struct SlotExpansion<'a> {
    schedule: &'a DoctorSchedule,
    specialty_id: Uuid,
    booked: &'a HashSet<BookedSlot>,
    days: DateRange,
    current: Option<(NaiveDate, std::slice::Iter<'a, TimeSlot>)>,
}

impl Iterator for SlotExpansion<'_> {
    type Item = AvailableSlot;

    fn next(&mut self) -> Option<AvailableSlot> {
        loop {
            if let Some((date, slots)) = self.current.as_mut() {
                let date = *date;
                for slot in slots.by_ref() {
                    let key = BookedSlot { date, start_time: slot.start_time };
                    if slot.is_available && !self.booked.contains(&key) {
                        return Some(AvailableSlot {
                            date,
                            start_time: slot.start_time,
                            end_time: slot.end_time,
                            doctor_id: self.schedule.doctor_id.clone(),
                            specialty_id: self.specialty_id,
                        });
                    }
                }
            }

            let date = self.days.next()?;
            self.current = Some((date, candidate_slots(self.schedule, date).iter()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::{DailySchedule, ScheduleException};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(value: &str) -> ClockTime {
        value.parse().unwrap()
    }

    fn slot(start: &str, end: &str, is_available: bool) -> TimeSlot {
        TimeSlot { start_time: time(start), end_time: time(end), is_available }
    }

    /// Monday: 09:00, 08:00 (deliberately out of order), 10:00 unavailable.
    /// Tuesday: 10:00 but not a working day. Everything else empty.
    fn schedule() -> DoctorSchedule {
        let weekly_schedule = (0..7u8)
            .map(|day_of_week| match day_of_week {
                1 => DailySchedule {
                    day_of_week,
                    time_slots: vec![
                        slot("09:00", "10:00", true),
                        slot("08:00", "09:00", true),
                        slot("10:00", "11:00", false),
                    ],
                    is_working_day: true,
                },
                2 => DailySchedule {
                    day_of_week,
                    time_slots: vec![slot("10:00", "11:00", true)],
                    is_working_day: false,
                },
                _ => DailySchedule { day_of_week, time_slots: vec![], is_working_day: true },
            })
            .collect();

        DoctorSchedule {
            id: Uuid::new_v4(),
            doctor_id: "doc-1".to_string(),
            specialty_ids: vec![Uuid::new_v4()],
            weekly_schedule,
            exceptions: vec![],
            is_active: true,
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn starts(slots: &[AvailableSlot]) -> Vec<(NaiveDate, String)> {
        slots.iter().map(|slot| (slot.date, slot.start_time.to_string())).collect()
    }

    #[test]
    fn test_template_order_is_preserved() {
        let schedule = schedule();
        let booked = HashSet::new();
        let specialty = schedule.specialty_ids[0];

        // 2024-06-03 is a Monday.
        let slots: Vec<_> = expand_slots(&schedule, specialty, date(2024, 6, 3), date(2024, 6, 3), &booked).collect();

        assert_eq!(
            starts(&slots),
            vec![(date(2024, 6, 3), "09:00".to_string()), (date(2024, 6, 3), "08:00".to_string())]
        );
        assert!(slots.iter().all(|slot| slot.specialty_id == specialty && slot.doctor_id == "doc-1"));
    }

    #[test]
    fn test_non_working_day_ignores_its_slots() {
        let schedule = schedule();
        let booked = HashSet::new();

        let slots: Vec<_> =
            expand_slots(&schedule, Uuid::new_v4(), date(2024, 6, 4), date(2024, 6, 4), &booked).collect();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_booked_keys_are_skipped() {
        let schedule = schedule();
        let booked: HashSet<_> = [BookedSlot { date: date(2024, 6, 3), start_time: time("09:00") }].into();

        let slots: Vec<_> =
            expand_slots(&schedule, Uuid::new_v4(), date(2024, 6, 3), date(2024, 6, 10), &booked).collect();

        assert_eq!(
            starts(&slots),
            vec![
                (date(2024, 6, 3), "08:00".to_string()),
                (date(2024, 6, 10), "09:00".to_string()),
                (date(2024, 6, 10), "08:00".to_string()),
            ]
        );
    }

    #[test]
    fn test_unavailable_exception_suppresses_the_day() {
        let mut schedule = schedule();
        schedule.exceptions.push(ScheduleException {
            date: date(2024, 6, 3),
            reason: Some("Conference".to_string()),
            is_available: false,
            // Ignored because the day is closed.
            custom_time_slots: Some(vec![slot("12:00", "13:00", true)]),
        });

        assert!(candidate_slots(&schedule, date(2024, 6, 3)).is_empty());
        assert_eq!(candidate_slots(&schedule, date(2024, 6, 10)).len(), 3);
    }

    #[test]
    fn test_available_exception_uses_custom_slots_even_on_closed_days() {
        let mut schedule = schedule();
        schedule.exceptions.push(ScheduleException {
            date: date(2024, 6, 4),
            reason: None,
            is_available: true,
            custom_time_slots: Some(vec![slot("15:00", "16:00", true)]),
        });
        let booked = HashSet::new();

        let slots: Vec<_> =
            expand_slots(&schedule, Uuid::new_v4(), date(2024, 6, 4), date(2024, 6, 4), &booked).collect();
        assert_eq!(starts(&slots), vec![(date(2024, 6, 4), "15:00".to_string())]);
    }

    #[test]
    fn test_available_exception_without_custom_slots_yields_nothing() {
        let mut schedule = schedule();
        schedule.exceptions.push(ScheduleException {
            date: date(2024, 6, 3),
            reason: None,
            is_available: true,
            custom_time_slots: None,
        });

        assert!(candidate_slots(&schedule, date(2024, 6, 3)).is_empty());
    }

    #[test]
    fn test_expansion_is_restartable() {
        let schedule = schedule();
        let booked = HashSet::new();
        let specialty = schedule.specialty_ids[0];

        let first: Vec<_> = expand_slots(&schedule, specialty, date(2024, 6, 1), date(2024, 6, 30), &booked).collect();
        let second: Vec<_> = expand_slots(&schedule, specialty, date(2024, 6, 1), date(2024, 6, 30), &booked).collect();

        assert_eq!(first, second);
        // Four Mondays in June 2024, two open slots each.
        assert_eq!(first.len(), 8);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let schedule = schedule();
        let booked = HashSet::new();

        assert_eq!(
            expand_slots(&schedule, Uuid::new_v4(), date(2024, 6, 10), date(2024, 6, 3), &booked).count(),
            0
        );
    }

    #[test]
    fn test_range_is_capped_at_a_leap_year() {
        assert!(check_range(date(2024, 1, 1), date(2024, 12, 31)).is_ok());
        assert!(matches!(
            check_range(date(2024, 1, 1), date(2025, 1, 1)),
            Err(ScheduleError::Validation(_))
        ));
        assert!(check_range(date(1, 1, 1), date(9999, 12, 31)).is_err());
        assert!(check_range(date(2024, 6, 10), date(2024, 6, 3)).is_ok());
    }
}
