//! Appointment scheduling validation: timing, duration, and conflicts.
//!
//! Intervals are half-open `[start, end)`, so back-to-back bookings are
//! legal. Conflict detection runs against the active appointments the query
//! layer prefetched around the candidate window.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::database::models::Appointment;
use crate::errors::ApiError;

pub const MIN_DURATION_MINUTES: i32 = 5;
pub const MAX_DURATION_MINUTES: i32 = 240;
pub const DEFAULT_DURATION_MINUTES: i32 = 30;

/// Resolves the effective duration: explicit request wins, then the chosen
/// procedure's default, then the clinic default.
pub fn resolve_duration(
    requested: Option<i32>,
    procedure_default: Option<i32>,
) -> Result<i32, ApiError> {
    let minutes = requested
        .or(procedure_default)
        .unwrap_or(DEFAULT_DURATION_MINUTES);
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes) {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            format!(
                "duration_minutes must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES}"
            ),
        ));
    }
    Ok(minutes)
}

pub fn ensure_future(scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), ApiError> {
    if scheduled_at <= now {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "scheduled_at must be in the future".into(),
        ));
    }
    Ok(())
}

/// First active appointment whose interval intersects `[start, end)`,
/// ignoring `exclude` (the appointment being rescheduled).
pub fn find_conflict<'a>(
    existing: &'a [Appointment],
    start: DateTime<Utc>,
    duration_minutes: i32,
    exclude: Option<Uuid>,
) -> Option<&'a Appointment> {
    let end = start + Duration::minutes(i64::from(duration_minutes));
    existing.iter().find(|other| {
        if Some(other.id) == exclude || !other.status.is_active() {
            return false;
        }
        other.scheduled_at < end && start < other.end_time()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::AppointmentStatus;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 10, hour, minute, 0).unwrap()
    }

    fn appointment(start: DateTime<Utc>, minutes: i32, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            procedure_id: None,
            scheduled_at: start,
            duration_minutes: minutes,
            status,
            notes: None,
            reminder_sent_at: None,
            created_at: start - Duration::days(1),
            updated_at: start - Duration::days(1),
        }
    }

    #[test]
    fn overlapping_interval_conflicts() {
        let existing = [appointment(at(10, 0), 30, AppointmentStatus::Scheduled)];
        assert!(find_conflict(&existing, at(10, 15), 30, None).is_some());
        assert!(find_conflict(&existing, at(9, 45), 30, None).is_some());
        // Candidate fully containing the existing slot.
        assert!(find_conflict(&existing, at(9, 0), 180, None).is_some());
    }

    #[test]
    fn touching_intervals_do_not_conflict() {
        let existing = [appointment(at(10, 0), 30, AppointmentStatus::Confirmed)];
        assert!(find_conflict(&existing, at(10, 30), 30, None).is_none());
        assert!(find_conflict(&existing, at(9, 30), 30, None).is_none());
    }

    #[test]
    fn inactive_appointments_are_ignored() {
        let existing = [
            appointment(at(10, 0), 30, AppointmentStatus::Cancelled),
            appointment(at(10, 0), 30, AppointmentStatus::Completed),
        ];
        assert!(find_conflict(&existing, at(10, 0), 30, None).is_none());
    }

    #[test]
    fn reschedule_excludes_itself() {
        let existing = [appointment(at(10, 0), 30, AppointmentStatus::Scheduled)];
        let own_id = existing[0].id;
        assert!(find_conflict(&existing, at(10, 10), 30, Some(own_id)).is_none());
        assert!(find_conflict(&existing, at(10, 10), 30, Some(Uuid::new_v4())).is_some());
    }

    #[test]
    fn duration_resolution_precedence() {
        assert_eq!(resolve_duration(Some(45), Some(60)).unwrap(), 45);
        assert_eq!(resolve_duration(None, Some(60)).unwrap(), 60);
        assert_eq!(resolve_duration(None, None).unwrap(), DEFAULT_DURATION_MINUTES);
    }

    #[test]
    fn duration_bounds_are_enforced() {
        assert!(resolve_duration(Some(4), None).is_err());
        assert!(resolve_duration(Some(241), None).is_err());
        assert!(resolve_duration(Some(5), None).is_ok());
        assert!(resolve_duration(Some(240), None).is_ok());
    }

    #[test]
    fn past_times_are_rejected() {
        let now = at(12, 0);
        assert!(ensure_future(at(11, 59), now).is_err());
        assert!(ensure_future(now, now).is_err());
        assert!(ensure_future(at(12, 1), now).is_ok());
    }
}
