//! Patient profile models.

use serde::{Deserialize, Serialize};

use super::parse_calendar_date;

/// Patient profile as exchanged with `/api/patient/profil`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    #[serde(rename = "nom", default, deserialize_with = "super::null_as_empty")]
    pub last_name: String,
    #[serde(rename = "prenom", default, deserialize_with = "super::null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub email: String,
    #[serde(rename = "telephone", default, deserialize_with = "super::null_as_empty")]
    pub phone: String,
    #[serde(rename = "adresse", default, deserialize_with = "super::null_as_empty")]
    pub address: String,
    /// `YYYY-MM-DD` once normalized, empty when unknown
    #[serde(rename = "dateNaissance", default, deserialize_with = "super::null_as_empty")]
    pub birth_date: String,
}

impl UserProfile {
    /// Reduce the birth date to its calendar part.
    ///
    /// The backend may answer with a full timestamp; anything that does not
    /// start with a calendar date becomes empty.
    pub fn normalized(mut self) -> Self {
        self.birth_date = parse_calendar_date(&self.birth_date)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        self
    }
}

/// Profile edit, optionally carrying a password change.
#[derive(Clone, Default, Serialize, PartialEq, Eq)]
pub struct ProfileUpdate {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(rename = "currentPassword", skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    #[serde(rename = "newPassword", skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
    #[serde(rename = "newPasswordConfirm", skip_serializing_if = "Option::is_none")]
    pub new_password_confirm: Option<String>,
}

impl ProfileUpdate {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            ..Default::default()
        }
    }

    /// True when the edit asks for a password change.
    pub fn changes_password(&self) -> bool {
        self.new_password
            .as_deref()
            .is_some_and(|p| !p.is_empty())
    }
}

impl std::fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("profile", &self.profile)
            .field("changes_password", &self.changes_password())
            .finish()
    }
}

/// Backend reply to a profile update.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ProfileUpdateReply {
    #[serde(rename = "passwordChanged", default)]
    pub password_changed: bool,
    #[serde(flatten)]
    pub profile: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_iso_birth_date() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"nom": "Diallo", "prenom": "Awa", "email": "awa@mail.com", "dateNaissance": "1990-04-12T00:00:00.000Z"}"#,
        )
        .unwrap();
        let profile = profile.normalized();
        assert_eq!(profile.birth_date, "1990-04-12");
        assert_eq!(profile.phone, "");
        assert_eq!(profile.first_name, "Awa");
    }

    #[test]
    fn test_normalize_garbage_birth_date() {
        let profile = UserProfile {
            birth_date: "unknown".into(),
            ..Default::default()
        };
        assert_eq!(profile.normalized().birth_date, "");
    }

    #[test]
    fn test_nulls_read_as_empty() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"nom": "Diallo", "telephone": null, "adresse": null}"#).unwrap();
        assert_eq!(profile.phone, "");
        assert_eq!(profile.address, "");
    }

    #[test]
    fn test_update_omits_absent_password_fields() {
        let update = ProfileUpdate::new(UserProfile {
            last_name: "Diallo".into(),
            ..Default::default()
        });
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["nom"], "Diallo");
        assert!(value.get("newPassword").is_none());
        assert!(!update.changes_password());
    }

    #[test]
    fn test_update_debug_hides_passwords() {
        let update = ProfileUpdate {
            current_password: Some("old-secret".into()),
            new_password: Some("new-secret".into()),
            new_password_confirm: Some("new-secret".into()),
            ..Default::default()
        };
        let debug = format!("{:?}", update);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("changes_password: true"));
    }

    #[test]
    fn test_update_reply_flag() {
        let reply: ProfileUpdateReply = serde_json::from_str(
            r#"{"passwordChanged": true, "nom": "Diallo", "prenom": "Awa"}"#,
        )
        .unwrap();
        assert!(reply.password_changed);
        assert_eq!(reply.profile.first_name, "Awa");
    }
}
