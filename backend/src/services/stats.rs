//! Logic for assembling the dashboard statistics response.
//!
//! The handler fetches narrow row sets; the aggregation itself is pure so
//! the numbers can be tested against fixed fixtures.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;

use crate::database::models::{
    Appointment, AppointmentStatus, RegistrationStatus, RegistrationToken,
};
use crate::services::registration::{token_standing, TokenStanding};

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct PatientBreakdown {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub denied: u64,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct AppointmentBreakdown {
    pub scheduled: u64,
    pub confirmed: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub no_show: u64,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub patients: PatientBreakdown,
    pub appointments_today: u64,
    pub appointments_next_seven_days: u64,
    pub appointments_by_status: AppointmentBreakdown,
    pub treatments_in_progress: u64,
    pub registration_tokens_usable: u64,
    pub notifications_sent_last_seven_days: u64,
}

/// Midnight UTC at the start of `now`'s day.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// Aggregates the dashboard numbers from prefetched rows.
///
/// `appointments` is expected to cover `[start_of_day(now), +8 days)`; the
/// status breakdown is computed over that same window.
pub fn aggregate(
    patient_statuses: &[RegistrationStatus],
    appointments: &[Appointment],
    tokens: &[RegistrationToken],
    treatments_in_progress: u64,
    notifications_sent_last_seven_days: u64,
    now: DateTime<Utc>,
) -> DashboardStats {
    let mut patients = PatientBreakdown { total: patient_statuses.len() as u64, ..Default::default() };
    for status in patient_statuses {
        match status {
            RegistrationStatus::Pending => patients.pending += 1,
            RegistrationStatus::Approved => patients.approved += 1,
            RegistrationStatus::Denied => patients.denied += 1,
        }
    }

    let today_start = start_of_day(now);
    let today_end = today_start + Duration::days(1);
    let week_end = today_start + Duration::days(8);

    let mut by_status = AppointmentBreakdown::default();
    let mut appointments_today = 0;
    let mut appointments_next_seven_days = 0;
    for appointment in appointments {
        match appointment.status {
            AppointmentStatus::Scheduled => by_status.scheduled += 1,
            AppointmentStatus::Confirmed => by_status.confirmed += 1,
            AppointmentStatus::Completed => by_status.completed += 1,
            AppointmentStatus::Cancelled => by_status.cancelled += 1,
            AppointmentStatus::NoShow => by_status.no_show += 1,
        }
        let when = appointment.scheduled_at;
        if when >= today_start && when < today_end {
            appointments_today += 1;
        } else if when >= today_end && when < week_end && appointment.status.is_active() {
            appointments_next_seven_days += 1;
        }
    }

    let registration_tokens_usable = tokens
        .iter()
        .filter(|token| token_standing(token, now) == TokenStanding::Usable)
        .count() as u64;

    DashboardStats {
        patients,
        appointments_today,
        appointments_next_seven_days,
        appointments_by_status: by_status,
        treatments_in_progress,
        registration_tokens_usable,
        notifications_sent_last_seven_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::TokenKind;
    use uuid::Uuid;

    fn appointment(offset_hours: i64, status: AppointmentStatus) -> Appointment {
        let base = Utc.with_ymd_and_hms(2026, 8, 10, 0, 0, 0).unwrap();
        let start = base + Duration::hours(offset_hours);
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            procedure_id: None,
            scheduled_at: start,
            duration_minutes: 30,
            status,
            notes: None,
            reminder_sent_at: None,
            created_at: base,
            updated_at: base,
        }
    }

    fn token(expires_in_hours: i64, used: bool) -> RegistrationToken {
        let now = Utc.with_ymd_and_hms(2026, 8, 10, 9, 0, 0).unwrap();
        RegistrationToken {
            id: Uuid::new_v4(),
            token: "cafe".into(),
            kind: TokenKind::SingleUse,
            label: None,
            expires_at: now + Duration::hours(expires_in_hours),
            used_at: used.then_some(now),
            created_at: now,
        }
    }

    #[test]
    fn aggregate_counts_everything() {
        let now = Utc.with_ymd_and_hms(2026, 8, 10, 9, 0, 0).unwrap();
        let statuses = [
            RegistrationStatus::Pending,
            RegistrationStatus::Approved,
            RegistrationStatus::Approved,
            RegistrationStatus::Denied,
        ];
        let appointments = [
            appointment(10, AppointmentStatus::Scheduled), // today 10:00
            appointment(15, AppointmentStatus::Completed), // today, but completed still counts for "today"
            appointment(30, AppointmentStatus::Confirmed), // tomorrow
            appointment(30, AppointmentStatus::Cancelled), // tomorrow, inactive: not "upcoming"
        ];
        let tokens = [token(1, false), token(-1, false), token(1, true)];

        let stats = aggregate(&statuses, &appointments, &tokens, 2, 5, now);

        assert_eq!(stats.patients.total, 4);
        assert_eq!(stats.patients.pending, 1);
        assert_eq!(stats.patients.approved, 2);
        assert_eq!(stats.appointments_today, 2);
        assert_eq!(stats.appointments_next_seven_days, 1);
        assert_eq!(stats.appointments_by_status.scheduled, 1);
        assert_eq!(stats.appointments_by_status.cancelled, 1);
        assert_eq!(stats.treatments_in_progress, 2);
        assert_eq!(stats.registration_tokens_usable, 1);
        assert_eq!(stats.notifications_sent_last_seven_days, 5);
    }

    #[test]
    fn start_of_day_truncates_to_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 8, 10, 23, 59, 59).unwrap();
        let start = start_of_day(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn empty_inputs_produce_zeroes() {
        let stats = aggregate(&[], &[], &[], 0, 0, Utc::now());
        assert_eq!(stats.patients, PatientBreakdown::default());
        assert_eq!(stats.appointments_by_status, AppointmentBreakdown::default());
        assert_eq!(stats.appointments_today, 0);
    }
}
