//! Fixed catalogues offered by the booking forms: time slots and reasons for visit.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Bookable time-of-day slots (hourly, 09:00 to 16:00).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeSlot {
    #[serde(rename = "09:00")]
    H09,
    #[serde(rename = "10:00")]
    H10,
    #[serde(rename = "11:00")]
    H11,
    #[serde(rename = "12:00")]
    H12,
    #[serde(rename = "13:00")]
    H13,
    #[serde(rename = "14:00")]
    H14,
    #[serde(rename = "15:00")]
    H15,
    #[serde(rename = "16:00")]
    H16,
}

impl TimeSlot {
    /// All slots in chronological order.
    pub const ALL: [TimeSlot; 8] = [
        TimeSlot::H09,
        TimeSlot::H10,
        TimeSlot::H11,
        TimeSlot::H12,
        TimeSlot::H13,
        TimeSlot::H14,
        TimeSlot::H15,
        TimeSlot::H16,
    ];

    /// Wire label, `HH:MM`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::H09 => "09:00",
            TimeSlot::H10 => "10:00",
            TimeSlot::H11 => "11:00",
            TimeSlot::H12 => "12:00",
            TimeSlot::H13 => "13:00",
            TimeSlot::H14 => "14:00",
            TimeSlot::H15 => "15:00",
            TimeSlot::H16 => "16:00",
        }
    }

    /// Look up a slot by its wire label.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|slot| slot.as_str() == label)
    }

    pub fn hour(&self) -> u32 {
        9 + Self::ALL.iter().position(|s| s == self).unwrap_or(0) as u32
    }

    pub fn to_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), 0, 0).unwrap_or(NaiveTime::MIN)
    }
}

/// Reasons for visit offered when booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ConsultationType {
    #[serde(rename = "Urgence")]
    Emergency,
    #[serde(rename = "Vaccin")]
    Vaccination,
    #[serde(rename = "Contrôle")]
    CheckUp,
    #[serde(rename = "Dépistage")]
    Screening,
    #[serde(rename = "Suivi")]
    FollowUp,
    #[serde(rename = "Bilan")]
    Assessment,
    #[serde(rename = "Consultation")]
    Consultation,
    #[serde(rename = "Renouvellement prescription")]
    PrescriptionRenewal,
    #[serde(rename = "Naissance")]
    Birth,
    #[serde(rename = "Contraception")]
    Contraception,
    #[serde(rename = "Grossesse")]
    Pregnancy,
    #[serde(rename = "Allaitement")]
    Breastfeeding,
    #[serde(rename = "Examen")]
    Examination,
    #[serde(rename = "Certificat")]
    Certificate,
    #[serde(rename = "Orientation")]
    Orientation,
    #[serde(rename = "Surveillance")]
    Monitoring,
    #[serde(rename = "Diagnostic")]
    Diagnosis,
    #[serde(rename = "Intervention")]
    Procedure,
    #[serde(rename = "Retrait")]
    Removal,
    #[serde(rename = "Traitement")]
    Treatment,
    #[serde(rename = "Référence")]
    Referral,
    #[serde(rename = "Détresse")]
    Distress,
    #[serde(rename = "Autres")]
    Other,
}

impl ConsultationType {
    /// All reasons, in the order the booking form lists them.
    pub const ALL: [ConsultationType; 23] = [
        ConsultationType::Emergency,
        ConsultationType::Vaccination,
        ConsultationType::CheckUp,
        ConsultationType::Screening,
        ConsultationType::FollowUp,
        ConsultationType::Assessment,
        ConsultationType::Consultation,
        ConsultationType::PrescriptionRenewal,
        ConsultationType::Birth,
        ConsultationType::Contraception,
        ConsultationType::Pregnancy,
        ConsultationType::Breastfeeding,
        ConsultationType::Examination,
        ConsultationType::Certificate,
        ConsultationType::Orientation,
        ConsultationType::Monitoring,
        ConsultationType::Diagnosis,
        ConsultationType::Procedure,
        ConsultationType::Removal,
        ConsultationType::Treatment,
        ConsultationType::Referral,
        ConsultationType::Distress,
        ConsultationType::Other,
    ];

    /// Label as sent to and shown by the backend.
    pub fn label(&self) -> &'static str {
        match self {
            ConsultationType::Emergency => "Urgence",
            ConsultationType::Vaccination => "Vaccin",
            ConsultationType::CheckUp => "Contrôle",
            ConsultationType::Screening => "Dépistage",
            ConsultationType::FollowUp => "Suivi",
            ConsultationType::Assessment => "Bilan",
            ConsultationType::Consultation => "Consultation",
            ConsultationType::PrescriptionRenewal => "Renouvellement prescription",
            ConsultationType::Birth => "Naissance",
            ConsultationType::Contraception => "Contraception",
            ConsultationType::Pregnancy => "Grossesse",
            ConsultationType::Breastfeeding => "Allaitement",
            ConsultationType::Examination => "Examen",
            ConsultationType::Certificate => "Certificat",
            ConsultationType::Orientation => "Orientation",
            ConsultationType::Monitoring => "Surveillance",
            ConsultationType::Diagnosis => "Diagnostic",
            ConsultationType::Procedure => "Intervention",
            ConsultationType::Removal => "Retrait",
            ConsultationType::Treatment => "Traitement",
            ConsultationType::Referral => "Référence",
            ConsultationType::Distress => "Détresse",
            ConsultationType::Other => "Autres",
        }
    }

    /// Look up a reason by its label.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|t| t.label() == label)
    }
}
