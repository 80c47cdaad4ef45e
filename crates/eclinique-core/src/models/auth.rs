//! Authentication models: credentials, registration and the backend's auth reply.

use serde::{Deserialize, Serialize};

/// Role of the authenticated user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    #[serde(rename = "patient")]
    Patient,
    #[serde(rename = "medecin")]
    Practitioner,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Practitioner => "medecin",
            Role::Admin => "admin",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "patient" => Some(Role::Patient),
            "medecin" | "practitioner" => Some(Role::Practitioner),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Login form.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    #[serde(rename = "motDePasse")]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sign-up form.
#[derive(Clone, Default, Serialize, PartialEq, Eq)]
pub struct Registration {
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "nom")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "motDePasse")]
    pub password: String,
    #[serde(rename = "dateNaissance")]
    pub birth_date: String,
    #[serde(rename = "adresse")]
    pub address: String,
    #[serde(rename = "telephone")]
    pub phone: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// User card returned alongside a token.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "nom", default)]
    pub last_name: Option<String>,
    #[serde(rename = "prenom", default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Raw role string; see [`Role::parse`]
    #[serde(default)]
    pub role: Option<String>,
    #[serde(rename = "telephone", default)]
    pub phone: Option<String>,
    #[serde(rename = "adresse", default)]
    pub address: Option<String>,
    #[serde(rename = "dateNaissance", default)]
    pub birth_date: Option<String>,
}

/// Reply to login and sign-up.
///
/// Every field is optional on the wire; [`AuthResponse::into_session`]
/// decides whether the reply is usable.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(rename = "utilisateur", default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthResponse {
    /// Split into token and user, or `None` if either is missing.
    pub fn into_session(self) -> Option<(String, AuthUser)> {
        let token = self.token.filter(|t| !t.trim().is_empty())?;
        Some((token, self.user?))
    }
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .field("message", &self.message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("patient"), Some(Role::Patient));
        assert_eq!(Role::parse("Medecin"), Some(Role::Practitioner));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("nurse"), None);
    }

    #[test]
    fn test_credentials_wire_names() {
        let value = serde_json::to_value(Credentials::new("a@b.fr", "secret1")).unwrap();
        assert_eq!(value, serde_json::json!({"email": "a@b.fr", "motDePasse": "secret1"}));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new("a@b.fr", "hunter22");
        assert!(!format!("{:?}", creds).contains("hunter22"));

        let reply: AuthResponse =
            serde_json::from_str(r#"{"token": "tok-123", "utilisateur": {"nom": "Diallo"}}"#).unwrap();
        assert!(!format!("{:?}", reply).contains("tok-123"));
    }

    #[test]
    fn test_into_session_requires_token_and_user() {
        let full: AuthResponse = serde_json::from_str(
            r#"{"token": "tok", "utilisateur": {"nom": "Diallo", "role": "patient"}}"#,
        )
        .unwrap();
        let (token, user) = full.into_session().unwrap();
        assert_eq!(token, "tok");
        assert_eq!(user.role.as_deref(), Some("patient"));

        let no_user: AuthResponse = serde_json::from_str(r#"{"token": "tok"}"#).unwrap();
        assert!(no_user.into_session().is_none());

        let blank_token: AuthResponse =
            serde_json::from_str(r#"{"token": " ", "utilisateur": {}}"#).unwrap();
        assert!(blank_token.into_session().is_none());

        assert!(AuthResponse::default().into_session().is_none());
    }
}
