//! Notification dispatch: compose, send, record.
//!
//! Every outbound email leaves a `notifications` row, success or not, so
//! the admin UI can show delivery history. Reminder failures surface to the
//! caller; welcome emails are best-effort.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use adapters::{EmailMessage, Mailer};

use crate::database::models::{Appointment, Notification, NotificationStatus, Patient};
use crate::database::queries::{self, NewNotification};
use crate::database::Db;
use crate::errors::ApiError;

pub struct NotificationService {
    db: Db,
    mailer: Arc<dyn Mailer>,
}

/// Outcome of a mailer dispatch, before the row is recorded.
#[derive(Debug, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub status: NotificationStatus,
    pub error: Option<String>,
}

impl NotificationService {
    pub fn new(db: Db, mailer: Arc<dyn Mailer>) -> Self {
        Self { db, mailer }
    }

    /// Sends an appointment reminder and records the attempt.
    pub async fn send_appointment_reminder(
        &self,
        patient: &Patient,
        appointment: &Appointment,
    ) -> Result<Notification, ApiError> {
        let message = compose_reminder(patient, appointment);
        self.send_and_record(patient, Some(appointment.id), message).await
    }

    /// Sends the post-approval welcome. Failures are recorded and logged but
    /// never fail the approval itself.
    pub async fn send_welcome(&self, patient: &Patient) {
        let message = compose_welcome(patient);
        if let Err(err) = self.send_and_record(patient, None, message).await {
            warn!(patient = %patient.id, "welcome email could not be recorded: {err}");
        }
    }

    async fn send_and_record(
        &self,
        patient: &Patient,
        appointment_id: Option<uuid::Uuid>,
        message: EmailMessage,
    ) -> Result<Notification, ApiError> {
        let outcome = dispatch(self.mailer.as_ref(), &message).await;
        if outcome.status == NotificationStatus::Sent {
            info!(patient = %patient.id, subject = %message.subject, "notification sent");
        } else {
            warn!(patient = %patient.id, error = ?outcome.error, "notification failed");
        }

        let row = NewNotification {
            patient_id: patient.id,
            appointment_id,
            channel: "email".into(),
            recipient: message.to,
            subject: message.subject,
            body: message.text,
            sent_at: (outcome.status == NotificationStatus::Sent).then(Utc::now),
            status: outcome.status,
            error: outcome.error,
        };
        queries::insert_notification(&self.db, &row).await
    }
}

/// Runs the mailer and folds the result into a recordable outcome.
pub async fn dispatch(mailer: &dyn Mailer, message: &EmailMessage) -> DispatchOutcome {
    match mailer.send(message).await {
        Ok(()) => DispatchOutcome { status: NotificationStatus::Sent, error: None },
        Err(err) => {
            DispatchOutcome { status: NotificationStatus::Failed, error: Some(err.to_string()) }
        }
    }
}

pub fn compose_reminder(patient: &Patient, appointment: &Appointment) -> EmailMessage {
    let when = appointment.scheduled_at.format("%A, %d %B %Y at %H:%M UTC");
    EmailMessage {
        to: patient.email.clone(),
        subject: "Appointment reminder".into(),
        text: format!(
            "Hello {},\n\nThis is a reminder of your upcoming appointment on {}.\n\
             Duration: {} minutes.\n\nIf you cannot attend, please contact the clinic.\n",
            patient.full_name(),
            when,
            appointment.duration_minutes,
        ),
    }
}

pub fn compose_welcome(patient: &Patient) -> EmailMessage {
    EmailMessage {
        to: patient.email.clone(),
        subject: "Your registration is approved".into(),
        text: format!(
            "Hello {},\n\nYour registration with the clinic has been approved.\n\
             You can now book appointments.\n",
            patient.full_name(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{AppointmentStatus, RegistrationStatus};
    use adapters::MemoryMailer;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn patient() -> Patient {
        let now = Utc::now();
        Patient {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@clinic.example".into(),
            phone: "+44".into(),
            date_of_birth: None,
            address: None,
            notes: None,
            registration_status: RegistrationStatus::Approved,
            registration_token_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn appointment() -> Appointment {
        let start = Utc.with_ymd_and_hms(2026, 8, 14, 9, 30, 0).unwrap();
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            procedure_id: None,
            scheduled_at: start,
            duration_minutes: 45,
            status: AppointmentStatus::Confirmed,
            notes: None,
            reminder_sent_at: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn reminder_mentions_patient_and_time() {
        let message = compose_reminder(&patient(), &appointment());
        assert_eq!(message.to, "ada@clinic.example");
        assert!(message.text.contains("Ada Lovelace"));
        assert!(message.text.contains("Friday, 14 August 2026 at 09:30 UTC"));
        assert!(message.text.contains("45 minutes"));
    }

    #[tokio::test]
    async fn dispatch_reports_success() {
        let mailer = MemoryMailer::default();
        let outcome = dispatch(&mailer, &compose_welcome(&patient())).await;
        assert_eq!(outcome.status, NotificationStatus::Sent);
        assert!(outcome.error.is_none());
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn dispatch_captures_provider_failure() {
        let mailer = MemoryMailer::default();
        mailer.fail_next();
        let outcome = dispatch(&mailer, &compose_welcome(&patient())).await;
        assert_eq!(outcome.status, NotificationStatus::Failed);
        assert!(outcome.error.unwrap().contains("500"));
        assert!(mailer.sent().is_empty());
    }
}
