//! Appointment models.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::catalog::{ConsultationType, TimeSlot};

/// Booking status as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppointmentStatus {
    #[serde(rename = "confirme")]
    Confirmed,
    #[serde(rename = "en_attente")]
    Pending,
    #[serde(rename = "annule")]
    Cancelled,
    /// Any status this client does not know about yet
    #[serde(other)]
    Unknown,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "confirme",
            AppointmentStatus::Pending => "en_attente",
            AppointmentStatus::Cancelled => "annule",
            AppointmentStatus::Unknown => "unknown",
        }
    }
}

/// Minimal user card embedded in practitioner and patient references.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    #[serde(rename = "nom", default, deserialize_with = "super::null_as_empty")]
    pub last_name: String,
    #[serde(rename = "prenom", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserSummary {
    /// "First Last", or whichever part is known.
    pub fn display_name(&self) -> String {
        match self.first_name.as_deref().map(str::trim) {
            Some(first) if !first.is_empty() => format!("{} {}", first, self.last_name.trim())
                .trim()
                .to_string(),
            _ => self.last_name.trim().to_string(),
        }
    }
}

/// The practitioner an appointment is booked with.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PractitionerRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "utilisateur", default)]
    pub user: UserSummary,
    #[serde(rename = "specialite", default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
}

impl PractitionerRef {
    pub fn display_name(&self) -> String {
        self.user.display_name()
    }
}

/// The patient owning an appointment (the session owner).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "utilisateur", default)]
    pub user: UserSummary,
}

/// An appointment record as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Appointment {
    /// Backend identifier
    pub id: i64,
    /// Calendar date of the visit
    #[serde(with = "wire_date")]
    pub date: NaiveDate,
    /// Time of day; `None` when the backend sent nothing usable
    #[serde(rename = "heure", default, with = "wire_time")]
    pub time: Option<NaiveTime>,
    /// Reason for visit label
    #[serde(rename = "typeConsultation", default, deserialize_with = "super::null_as_empty")]
    pub consultation_type: String,
    /// Whether the patient asked for a reminder
    #[serde(rename = "rappel", default)]
    pub reminder_enabled: bool,
    #[serde(rename = "statut", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    /// Flat practitioner id, sent by the single-appointment endpoint
    #[serde(rename = "medecinId", default, skip_serializing_if = "Option::is_none")]
    pub practitioner_id: Option<i64>,
    #[serde(rename = "medecin", default, skip_serializing_if = "Option::is_none")]
    pub practitioner: Option<PractitionerRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientRef>,
}

impl Appointment {
    /// Point in time used for filtering and sorting.
    ///
    /// Appointments without a time are placed at midnight.
    pub fn scheduled_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time.unwrap_or(NaiveTime::MIN))
    }

    /// Practitioner id, from either the flat field or the embedded reference.
    pub fn practitioner_id(&self) -> Option<i64> {
        self.practitioner_id
            .or_else(|| self.practitioner.as_ref().and_then(|p| p.id))
    }

    /// Practitioner display name, empty when unknown.
    pub fn practitioner_name(&self) -> String {
        self.practitioner
            .as_ref()
            .map(PractitionerRef::display_name)
            .unwrap_or_default()
    }

    /// `dd/mm/yyyy à HH:MM` as shown in the appointment list.
    pub fn formatted_schedule(&self) -> String {
        let time = self.time.unwrap_or(NaiveTime::MIN);
        format!("{} à {}", self.date.format("%d/%m/%Y"), time.format("%H:%M"))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.status, Some(AppointmentStatus::Cancelled))
    }
}

/// Validated body for creating or updating an appointment.
///
/// Only produced by form validation, so every field is known to be present.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AppointmentPayload {
    #[serde(with = "wire_date")]
    pub date: NaiveDate,
    #[serde(rename = "heure")]
    pub time: TimeSlot,
    #[serde(rename = "typeConsultation")]
    pub consultation_type: ConsultationType,
    #[serde(rename = "rappel")]
    pub reminder_enabled: bool,
    #[serde(rename = "medecinId")]
    pub practitioner_id: i64,
}

/// `YYYY-MM-DD` on the way out; anything with a leading calendar date on the way in.
pub(crate) mod wire_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::models::parse_calendar_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid calendar date: {raw:?}")))
    }
}

/// `HH:MM` time of day. Null, empty or unparseable values read as `None`.
pub(crate) mod wire_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_str(&t.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
    }
}
