//! Booking form state and its local validation.

use chrono::NaiveDate;

use crate::error::{ClientError, ClientResult, ValidationErrors};
use crate::models::{parse_calendar_date, Appointment, AppointmentPayload, ConsultationType, TimeSlot};

/// Raw values of the create/edit appointment form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentForm {
    /// `YYYY-MM-DD`, empty when not picked yet
    pub date: String,
    /// One of the [`TimeSlot`] labels
    pub time: String,
    /// One of the [`ConsultationType`] labels
    pub consultation_type: String,
    pub reminder_enabled: bool,
    pub practitioner_id: Option<i64>,
}

impl AppointmentForm {
    /// Pre-fill the edit form from an existing appointment.
    pub fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            date: appointment.date.format("%Y-%m-%d").to_string(),
            time: appointment
                .time
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default(),
            consultation_type: appointment.consultation_type.clone(),
            reminder_enabled: appointment.reminder_enabled,
            practitioner_id: appointment.practitioner_id(),
        }
    }

    /// Check every field and build the request body.
    ///
    /// `today` is the patient's current calendar date; dates before it are refused.
    pub fn validate(&self, today: NaiveDate) -> ClientResult<AppointmentPayload> {
        let mut errors = ValidationErrors::new();

        let date = if self.date.trim().is_empty() {
            errors.push("date", "Date is required.");
            None
        } else {
            match parse_calendar_date(&self.date) {
                Some(date) if date < today => {
                    errors.push("date", "Date cannot be in the past.");
                    None
                }
                Some(date) => Some(date),
                None => {
                    errors.push("date", "Date must be formatted YYYY-MM-DD.");
                    None
                }
            }
        };

        let time = if self.time.trim().is_empty() {
            errors.push("time", "Time is required.");
            None
        } else {
            let slot = TimeSlot::parse(&self.time);
            if slot.is_none() {
                errors.push("time", "Time must be one of the available slots.");
            }
            slot
        };

        let consultation_type = if self.consultation_type.trim().is_empty() {
            errors.push("consultation_type", "Reason for visit is required.");
            None
        } else {
            let reason = ConsultationType::parse(&self.consultation_type);
            if reason.is_none() {
                errors.push("consultation_type", "Unknown reason for visit.");
            }
            reason
        };

        if self.practitioner_id.is_none() {
            errors.push("practitioner", "Select a practitioner.");
        }

        match (date, time, consultation_type, self.practitioner_id) {
            (Some(date), Some(time), Some(consultation_type), Some(practitioner_id))
                if errors.is_empty() =>
            {
                Ok(AppointmentPayload {
                    date,
                    time,
                    consultation_type,
                    reminder_enabled: self.reminder_enabled,
                    practitioner_id,
                })
            }
            _ => Err(ClientError::Validation(errors)),
        }
    }
}
