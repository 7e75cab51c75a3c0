//! Status lifecycle tables for patients, appointments and treatments.
//!
//! Each action names the statuses it may start from and the status it lands
//! on. The query layer re-checks the same precondition in the update filter,
//! so a concurrent transition loses cleanly instead of overwriting.

use serde_json::json;

use crate::database::models::{AppointmentStatus, RegistrationStatus, TreatmentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentAction {
    Confirm,
    Complete,
    Cancel,
    NoShow,
}

impl AppointmentAction {
    pub fn allowed_from(&self) -> &'static [AppointmentStatus] {
        match self {
            AppointmentAction::Confirm => &[AppointmentStatus::Scheduled],
            AppointmentAction::Complete
            | AppointmentAction::Cancel
            | AppointmentAction::NoShow => {
                &[AppointmentStatus::Scheduled, AppointmentStatus::Confirmed]
            }
        }
    }

    pub fn target(&self) -> AppointmentStatus {
        match self {
            AppointmentAction::Confirm => AppointmentStatus::Confirmed,
            AppointmentAction::Complete => AppointmentStatus::Completed,
            AppointmentAction::Cancel => AppointmentStatus::Cancelled,
            AppointmentAction::NoShow => AppointmentStatus::NoShow,
        }
    }

    pub fn permits(&self, from: AppointmentStatus) -> bool {
        self.allowed_from().contains(&from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreatmentAction {
    Start,
    Complete,
    Cancel,
}

impl TreatmentAction {
    pub fn allowed_from(&self) -> &'static [TreatmentStatus] {
        match self {
            TreatmentAction::Start => &[TreatmentStatus::Planned],
            TreatmentAction::Complete => &[TreatmentStatus::InProgress],
            TreatmentAction::Cancel => &[TreatmentStatus::Planned, TreatmentStatus::InProgress],
        }
    }

    pub fn target(&self) -> TreatmentStatus {
        match self {
            TreatmentAction::Start => TreatmentStatus::InProgress,
            TreatmentAction::Complete => TreatmentStatus::Completed,
            TreatmentAction::Cancel => TreatmentStatus::Cancelled,
        }
    }

    pub fn permits(&self, from: TreatmentStatus) -> bool {
        self.allowed_from().contains(&from)
    }

    /// Timestamp columns the transition stamps alongside the status change.
    pub fn stamp(&self, now: chrono::DateTime<chrono::Utc>) -> serde_json::Value {
        match self {
            TreatmentAction::Start => json!({ "started_at": now }),
            TreatmentAction::Complete => json!({ "completed_at": now }),
            TreatmentAction::Cancel => json!({}),
        }
    }
}

/// Registration decisions only ever move a patient out of `pending`.
pub fn registration_decision_allowed(from: RegistrationStatus, to: RegistrationStatus) -> bool {
    from == RegistrationStatus::Pending
        && matches!(to, RegistrationStatus::Approved | RegistrationStatus::Denied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_only_from_scheduled() {
        assert!(AppointmentAction::Confirm.permits(AppointmentStatus::Scheduled));
        for blocked in [
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ] {
            assert!(!AppointmentAction::Confirm.permits(blocked), "{blocked:?}");
        }
    }

    #[test]
    fn terminal_appointment_statuses_admit_no_action() {
        for action in [
            AppointmentAction::Confirm,
            AppointmentAction::Complete,
            AppointmentAction::Cancel,
            AppointmentAction::NoShow,
        ] {
            for terminal in [
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ] {
                assert!(!action.permits(terminal), "{action:?} from {terminal:?}");
            }
        }
    }

    #[test]
    fn complete_allowed_from_confirmed_and_scheduled() {
        assert!(AppointmentAction::Complete.permits(AppointmentStatus::Scheduled));
        assert!(AppointmentAction::Complete.permits(AppointmentStatus::Confirmed));
        assert_eq!(AppointmentAction::Complete.target(), AppointmentStatus::Completed);
    }

    #[test]
    fn treatment_flow_is_linear() {
        assert!(TreatmentAction::Start.permits(TreatmentStatus::Planned));
        assert!(!TreatmentAction::Start.permits(TreatmentStatus::InProgress));
        assert!(TreatmentAction::Complete.permits(TreatmentStatus::InProgress));
        assert!(!TreatmentAction::Complete.permits(TreatmentStatus::Planned));
        assert!(TreatmentAction::Cancel.permits(TreatmentStatus::Planned));
        assert!(TreatmentAction::Cancel.permits(TreatmentStatus::InProgress));
        assert!(!TreatmentAction::Cancel.permits(TreatmentStatus::Completed));
    }

    #[test]
    fn treatment_stamps_match_action() {
        let now = chrono::Utc::now();
        assert!(TreatmentAction::Start.stamp(now).get("started_at").is_some());
        assert!(TreatmentAction::Complete.stamp(now).get("completed_at").is_some());
        assert_eq!(TreatmentAction::Cancel.stamp(now), json!({}));
    }

    #[test]
    fn registration_decisions_leave_pending_only() {
        use RegistrationStatus::*;
        assert!(registration_decision_allowed(Pending, Approved));
        assert!(registration_decision_allowed(Pending, Denied));
        assert!(!registration_decision_allowed(Approved, Denied));
        assert!(!registration_decision_allowed(Denied, Approved));
        assert!(!registration_decision_allowed(Pending, Pending));
    }
}
