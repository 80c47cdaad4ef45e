//! Backend contract.
//!
//! Every remote operation the app needs is a method on [`Backend`].
//! [`HttpBackend`] talks to the real REST API; [`MockBackend`] keeps
//! everything in memory and records calls.

mod http;
mod mock;

pub use http::*;
pub use mock::*;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::{ClientError, ClientResult};
use crate::models::{
    Appointment, AppointmentPayload, AuthResponse, Credentials, Practitioner, ProfileUpdate,
    ProfileUpdateReply, Registration, UserProfile,
};

pub const LOGIN_PATH: &str = "/api/patient/login";
pub const SIGNUP_PATH: &str = "/api/patient/signup";
pub const APPOINTMENTS_PATH: &str = "/api/patient/rendezvous";
pub const PRACTITIONERS_PATH: &str = "/api/medecin";
pub const PROFILE_PATH: &str = "/api/patient/profil";

/// Remote operations. Authenticated calls take the bearer token explicitly.
pub trait Backend: Send + Sync {
    fn login(&self, credentials: &Credentials) -> ClientResult<AuthResponse>;

    fn register(&self, registration: &Registration) -> ClientResult<AuthResponse>;

    fn list_appointments(&self, token: &str) -> ClientResult<Vec<Appointment>>;

    fn get_appointment(&self, token: &str, id: i64) -> ClientResult<Appointment>;

    fn create_appointment(
        &self,
        token: &str,
        payload: &AppointmentPayload,
    ) -> ClientResult<Appointment>;

    fn update_appointment(
        &self,
        token: &str,
        id: i64,
        payload: &AppointmentPayload,
    ) -> ClientResult<Appointment>;

    fn delete_appointment(&self, token: &str, id: i64) -> ClientResult<()>;

    fn list_practitioners(&self) -> ClientResult<Vec<Practitioner>>;

    fn get_profile(&self, token: &str) -> ClientResult<UserProfile>;

    fn update_profile(&self, token: &str, update: &ProfileUpdate)
        -> ClientResult<ProfileUpdateReply>;
}

/// Structured error body: `{message}` or `{error}`, both optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Parse an error body. Anything that is not a JSON object reads as `{}`.
    pub fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_default()
    }

    /// Backend text (`message`, then `error`), or `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        [&self.message, &self.error]
            .into_iter()
            .flatten()
            .map(|m| m.trim())
            .find(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// A JSON array decoded record by record; unreadable records are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lenient<T>(pub Vec<T>);

impl<'de, T: DeserializeOwned> Deserialize<'de> for Lenient<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
        let total = raw.len();
        let items: Vec<T> = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping unreadable record");
                    None
                }
            })
            .collect();
        if items.len() < total {
            tracing::warn!(kept = items.len(), total, "Partially readable list");
        }
        Ok(Lenient(items))
    }
}

/// A backend reply, before it becomes a `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    /// 2xx with a usable payload
    Success(T),
    /// Non-2xx
    Failure { status: u16, body: ErrorBody },
    /// 2xx whose body does not fit the expected shape
    Malformed { status: u16 },
}

impl<T: DeserializeOwned> Reply<T> {
    /// Classify a raw status and body.
    ///
    /// A success body must decode as `T`; anything else (an HTML page from a
    /// proxy, an empty body) is `Malformed`.
    pub fn parse(status: u16, text: &str) -> Self {
        if !is_success(status) {
            return Reply::Failure {
                status,
                body: ErrorBody::parse(text),
            };
        }
        match serde_json::from_str::<T>(text) {
            Ok(value) => Reply::Success(value),
            Err(e) => {
                tracing::warn!(status, error = %e, "Success body does not decode");
                Reply::Malformed { status }
            }
        }
    }
}

impl Reply<()> {
    /// Classify a reply whose success body carries nothing (e.g. `204`).
    pub fn ack(status: u16, text: &str) -> Self {
        if is_success(status) {
            Reply::Success(())
        } else {
            Reply::Failure {
                status,
                body: ErrorBody::parse(text),
            }
        }
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

impl<T> Reply<T> {
    /// Map onto the error taxonomy; `fallback` is used when the backend gave no text.
    pub fn into_result(self, fallback: &str) -> ClientResult<T> {
        match self {
            Reply::Success(value) => Ok(value),
            Reply::Failure { status, body } => Err(status_error(status, body.message_or(fallback))),
            Reply::Malformed { status } => Err(ClientError::Server {
                status,
                message: UNEXPECTED_RESPONSE.to_string(),
            }),
        }
    }
}

pub const UNEXPECTED_RESPONSE: &str = "Unexpected response from the server.";

/// 401 and 403 are authorization failures, everything else a server error.
pub fn status_error(status: u16, message: String) -> ClientError {
    match status {
        401 | 403 => ClientError::Unauthorized(message),
        _ => ClientError::Server { status, message },
    }
}
