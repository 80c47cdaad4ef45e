//! Practitioner directory entries.

use serde::{Deserialize, Serialize};

use super::appointment::UserSummary;

/// A practitioner as listed by the public directory endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Practitioner {
    pub id: i64,
    #[serde(rename = "specialite", default, deserialize_with = "super::null_as_empty")]
    pub specialty: String,
    #[serde(rename = "utilisateur", default)]
    pub user: UserSummary,
}

impl Practitioner {
    pub fn display_name(&self) -> String {
        self.user.display_name()
    }

    /// Picker label, e.g. "Claire Martin (Pédiatrie)".
    pub fn picker_label(&self) -> String {
        if self.specialty.trim().is_empty() {
            self.display_name()
        } else {
            format!("{} ({})", self.display_name(), self.specialty.trim())
        }
    }
}
